use std::collections::VecDeque;

use super::{Cursor, EngineError, Nullability, TypeInfo, Value};

/// Plain-data snapshot of one column of a cursor's descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub alias: String,
    pub type_info: TypeInfo,
    pub nullability: Nullability,
}

impl ColumnDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, type_info: TypeInfo) -> Self {
        let name = name.into();
        Self {
            alias: name.clone(),
            name,
            type_info,
            nullability: Nullability::Unknown,
        }
    }

    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    #[must_use]
    pub fn with_nullability(mut self, nullability: Nullability) -> Self {
        self.nullability = nullability;
        self
    }

    /// Read the descriptor of every visible column of `cursor`.
    #[must_use]
    pub fn describe(cursor: &dyn Cursor) -> Vec<ColumnDescriptor> {
        (0..cursor.visible_column_count())
            .map(|i| ColumnDescriptor {
                name: cursor.column_name(i),
                alias: cursor.column_alias(i),
                type_info: cursor.column_type(i),
                nullability: cursor.column_nullable(i),
            })
            .collect()
    }
}

/// A cursor over rows that are already materialized in memory.
///
/// Engines whose native result is fully buffered (local results, `SQLite` row collection,
/// generated keys) hand one of these back.
#[derive(Debug, Clone)]
pub struct MemoryCursor {
    columns: Vec<ColumnDescriptor>,
    rows: VecDeque<Vec<Value>>,
    current: Vec<Value>,
    closed: bool,
}

impl MemoryCursor {
    #[must_use]
    pub fn new(columns: Vec<ColumnDescriptor>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns,
            rows: rows.into(),
            current: Vec::new(),
            closed: false,
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Cursor for MemoryCursor {
    fn visible_column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, index: usize) -> String {
        self.columns
            .get(index)
            .map(|c| c.name.clone())
            .unwrap_or_default()
    }

    fn column_alias(&self, index: usize) -> String {
        self.columns
            .get(index)
            .map(|c| c.alias.clone())
            .unwrap_or_default()
    }

    fn column_type(&self, index: usize) -> TypeInfo {
        self.columns
            .get(index)
            .map_or(TypeInfo::of(super::TypeTag::Null), |c| c.type_info)
    }

    fn column_nullable(&self, index: usize) -> Nullability {
        self.columns
            .get(index)
            .map_or(Nullability::Unknown, |c| c.nullability)
    }

    fn has_next(&mut self) -> Result<bool, EngineError> {
        Ok(!self.closed && !self.rows.is_empty())
    }

    fn advance(&mut self) -> Result<(), EngineError> {
        match self.rows.pop_front() {
            Some(row) => {
                self.current = row;
                Ok(())
            }
            None => Err(EngineError::general("cursor has no more rows")),
        }
    }

    fn current_row_values(&self) -> Vec<Value> {
        self.current.clone()
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.closed = true;
        self.rows.clear();
        Ok(())
    }
}

use std::collections::HashMap;

use crate::codecs::CodecRegistry;
use crate::engine::{ColumnDescriptor, Nullability, TypeInfo, TypeTag};
use crate::error::BridgeError;
use crate::types::HostType;

/// Description of one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    name: String,
    type_info: TypeInfo,
    nullability: Nullability,
    preferred_type: Option<HostType>,
}

impl ColumnMetadata {
    /// Build from an engine descriptor; the alias wins over the base name.
    #[must_use]
    pub fn from_descriptor(descriptor: &ColumnDescriptor, codecs: &CodecRegistry) -> Self {
        let name = if descriptor.alias.is_empty() {
            descriptor.name.clone()
        } else {
            descriptor.alias.clone()
        };
        Self {
            name,
            type_info: descriptor.type_info,
            nullability: descriptor.nullability,
            preferred_type: codecs.preferred_type(descriptor.type_info.tag),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn native_type(&self) -> TypeTag {
        self.type_info.tag
    }

    #[must_use]
    pub fn precision(&self) -> i64 {
        self.type_info.precision
    }

    #[must_use]
    pub fn scale(&self) -> i32 {
        self.type_info.scale
    }

    #[must_use]
    pub fn nullability(&self) -> Nullability {
        self.nullability
    }

    /// Host type the registry picks for this column's native type, if any codec claims it.
    #[must_use]
    pub fn preferred_type(&self) -> Option<HostType> {
        self.preferred_type
    }
}

/// Columns of a result, in select-list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMetadata {
    columns: Vec<ColumnMetadata>,
    // upper-cased name -> first index with that name
    by_name: HashMap<String, usize>,
}

impl RowMetadata {
    #[must_use]
    pub fn new(columns: Vec<ColumnMetadata>) -> Self {
        let mut by_name = HashMap::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            by_name.entry(column.name.to_uppercase()).or_insert(i);
        }
        Self { columns, by_name }
    }

    #[must_use]
    pub fn from_descriptors(descriptors: &[ColumnDescriptor], codecs: &CodecRegistry) -> Self {
        Self::new(
            descriptors
                .iter()
                .map(|d| ColumnMetadata::from_descriptor(d, codecs))
                .collect(),
        )
    }

    /// # Errors
    /// `InvalidArgument` if `index` is out of range.
    pub fn column(&self, index: usize) -> Result<&ColumnMetadata, BridgeError> {
        self.columns.get(index).ok_or_else(|| {
            BridgeError::InvalidArgument(format!(
                "Column index {index} is larger than the number of columns {}",
                self.columns.len()
            ))
        })
    }

    /// Case-insensitive lookup by name.
    ///
    /// # Errors
    /// `InvalidArgument` if no column has that name.
    pub fn column_by_name(&self, name: &str) -> Result<&ColumnMetadata, BridgeError> {
        let index = self.index_of(name)?;
        self.column(index)
    }

    /// # Errors
    /// `InvalidArgument` if no column has that name.
    pub fn index_of(&self, name: &str) -> Result<usize, BridgeError> {
        let key = name.to_uppercase();
        self.by_name.get(&key).copied().ok_or_else(|| {
            BridgeError::InvalidArgument(format!(
                "Column name '{key}' does not exist in column names [{}]",
                self.column_names().join(", ")
            ))
        })
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnMetadata] {
        &self.columns
    }

    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(ColumnMetadata::name).collect()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(&name.to_uppercase())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> RowMetadata {
        let codecs = CodecRegistry::default();
        RowMetadata::from_descriptors(
            &[
                ColumnDescriptor::new("TEST-NAME-1", TypeInfo::of(TypeTag::Integer)),
                ColumnDescriptor::new("BASE", TypeInfo::new(TypeTag::Boolean, 300, 600))
                    .with_alias("TEST-NAME-2")
                    .with_nullability(Nullability::Nullable),
            ],
            &codecs,
        )
    }

    #[test]
    fn alias_wins_and_preferred_type_is_resolved() {
        let md = metadata();
        let second = md.column(1).unwrap();
        assert_eq!(second.name(), "TEST-NAME-2");
        assert_eq!(second.native_type(), TypeTag::Boolean);
        assert_eq!(second.precision(), 300);
        assert_eq!(second.scale(), 600);
        assert_eq!(second.nullability(), Nullability::Nullable);
        assert_eq!(second.preferred_type(), Some(HostType::Bool));
        assert_eq!(md.column_names(), vec!["TEST-NAME-1", "TEST-NAME-2"]);
    }

    #[test]
    fn index_out_of_range() {
        let err = metadata().column(2).unwrap_err();
        assert_eq!(
            err,
            BridgeError::InvalidArgument(
                "Column index 2 is larger than the number of columns 2".into()
            )
        );
    }

    #[test]
    fn name_lookup_ignores_case() {
        let md = metadata();
        assert_eq!(md.column_by_name("test-name-1").unwrap().name(), "TEST-NAME-1");
        assert!(md.contains("Test-Name-2"));
        let err = md.column_by_name("test-name-3").unwrap_err();
        assert_eq!(
            err,
            BridgeError::InvalidArgument(
                concat!(
                    "Column name 'TEST-NAME-3' does not exist in column names ",
                    "[TEST-NAME-1, TEST-NAME-2]"
                )
                .into()
            )
        );
    }
}

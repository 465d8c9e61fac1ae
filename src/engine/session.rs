use chrono::FixedOffset;

use super::{EngineError, TypeInfo, Value};

/// Nullability of a result column as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Nullability {
    Nullable,
    NonNull,
    #[default]
    Unknown,
}

/// Which engine-assigned values an update should hand back.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GeneratedKeys {
    /// No key retrieval.
    #[default]
    None,
    /// Every generated column.
    AllColumns,
    /// An explicit list of column names.
    Columns(Vec<String>),
}

impl GeneratedKeys {
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, GeneratedKeys::None)
    }
}

/// Session-scoped settings codecs may consult (zoned vs. zoneless temporal semantics).
///
/// Passed explicitly into encode/decode calls; codecs never hold on to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionContext {
    time_zone: Option<FixedOffset>,
}

impl SessionContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_time_zone(mut self, time_zone: FixedOffset) -> Self {
        self.time_zone = Some(time_zone);
        self
    }

    /// Time zone used to interpret zoneless timestamps, if the session has one.
    #[must_use]
    pub fn time_zone(&self) -> Option<FixedOffset> {
        self.time_zone
    }
}

/// Product information reported by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionMetadata {
    pub product_name: String,
    pub version: String,
}

/// Result of [`Command::execute_update`].
pub struct UpdateOutcome {
    pub update_count: u64,
    pub generated_keys: Option<Box<dyn Cursor>>,
}

impl UpdateOutcome {
    #[must_use]
    pub fn count(update_count: u64) -> Self {
        Self {
            update_count,
            generated_keys: None,
        }
    }

    #[must_use]
    pub fn with_generated_keys(update_count: u64, keys: Box<dyn Cursor>) -> Self {
        Self {
            update_count,
            generated_keys: Some(keys),
        }
    }
}

impl std::fmt::Debug for UpdateOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateOutcome")
            .field("update_count", &self.update_count)
            .field("generated_keys", &self.generated_keys.is_some())
            .finish()
    }
}

/// A blocking, synchronous engine session.
///
/// Every call may block on engine I/O; the crate only ever invokes a session from its own
/// dedicated worker thread.
pub trait Session: Send {
    /// Prepare `sql` with positional `params` (index 0 is the first placeholder).
    ///
    /// # Errors
    /// Malformed SQL, unknown objects, or parameter type mismatches.
    fn prepare<'s>(
        &'s mut self,
        sql: &str,
        params: &[Value],
    ) -> Result<Box<dyn Command + 's>, EngineError>;

    /// Session-scoped settings handed to codecs.
    fn context(&self) -> SessionContext {
        SessionContext::default()
    }

    fn metadata(&self) -> ConnectionMetadata;

    /// Release the session.
    ///
    /// # Errors
    /// Whatever the engine reports while shutting down.
    fn close(&mut self) -> Result<(), EngineError> {
        Ok(())
    }
}

/// A prepared command bound to one set of parameter values.
pub trait Command {
    /// The engine's own query/update classification.
    fn is_query(&self) -> bool;

    /// Run a query. `max_rows == 0` means unbounded.
    ///
    /// # Errors
    /// Any engine failure raised while executing.
    fn execute_query(&mut self, max_rows: usize) -> Result<Box<dyn Cursor>, EngineError>;

    /// Run an update, optionally collecting generated keys.
    ///
    /// # Errors
    /// Any engine failure raised while executing.
    fn execute_update(&mut self, keys: &GeneratedKeys) -> Result<UpdateOutcome, EngineError>;
}

/// Pull-based, forward-only engine cursor.
pub trait Cursor: Send {
    fn visible_column_count(&self) -> usize;

    fn column_name(&self, index: usize) -> String;

    /// Alias of the column; equal to the name when none was given.
    fn column_alias(&self, index: usize) -> String {
        self.column_name(index)
    }

    fn column_type(&self, index: usize) -> TypeInfo;

    fn column_nullable(&self, index: usize) -> Nullability {
        let _ = index;
        Nullability::Unknown
    }

    /// # Errors
    /// Engine failure while looking ahead.
    fn has_next(&mut self) -> Result<bool, EngineError>;

    /// Move to the next row.
    ///
    /// # Errors
    /// Engine failure while advancing.
    fn advance(&mut self) -> Result<(), EngineError>;

    /// Values of the row the cursor is positioned on.
    fn current_row_values(&self) -> Vec<Value>;

    /// # Errors
    /// Engine failure while releasing the cursor.
    fn close(&mut self) -> Result<(), EngineError> {
        Ok(())
    }
}

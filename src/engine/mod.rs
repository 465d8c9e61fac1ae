//! Boundary with the external SQL engine.
//!
//! The engine is a collaborator: it prepares SQL against bound values, classifies the command,
//! and returns either an update count or a pull-based cursor. This module defines the value
//! model and the traits an engine has to implement; nothing here executes SQL itself.

mod cursor;
mod session;
mod value;

use thiserror::Error;

pub use cursor::{ColumnDescriptor, MemoryCursor};
pub use session::{
    Command, ConnectionMetadata, Cursor, GeneratedKeys, Nullability, Session, SessionContext,
    UpdateOutcome,
};
pub use value::{EnumValue, Interval, IntervalQualifier, OffsetTime, TypeInfo, TypeTag, Value};

/// Failure raised by the engine, classified by SQLSTATE.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} [{code}-{sql_state}]")]
pub struct EngineError {
    pub sql_state: String,
    pub code: i32,
    pub message: String,
}

impl EngineError {
    pub fn new(sql_state: impl Into<String>, code: i32, message: impl Into<String>) -> Self {
        Self {
            sql_state: sql_state.into(),
            code,
            message: message.into(),
        }
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new("42000", 42000, message)
    }

    pub fn constraint(message: impl Into<String>) -> Self {
        Self::new("23000", 23000, message)
    }

    pub fn data_conversion(message: impl Into<String>) -> Self {
        Self::new("22018", 22018, message)
    }

    pub fn numeric_out_of_range(value: impl std::fmt::Display) -> Self {
        Self::new("22003", 22003, format!("Numeric value out of range: \"{value}\""))
    }

    pub fn feature_not_supported(message: impl Into<String>) -> Self {
        Self::new("0A000", 50100, message)
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new("08000", 90067, message)
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self::new("HY000", 50000, message)
    }
}

use thiserror::Error;

use crate::engine::EngineError;

/// Coarse error taxonomy of the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed caller input.
    InvalidArgument,
    /// Protocol misuse (unfinished binding, missing segment mapper, ...).
    InvalidState,
    /// No codec claims the requested type.
    UnsupportedType,
    /// Anything the engine raised.
    EngineFailure,
}

/// Engine failures, subdivided by the SQLSTATE class the engine reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineFailureKind {
    /// Class 42: syntax errors, unknown tables/columns.
    BadGrammar,
    /// Classes 22 and 23: data exceptions and constraint violations.
    DataIntegrityViolation,
    /// Class 08: connection failures.
    NonTransientResource,
    /// Lock and resource contention that may succeed on retry.
    TransientResource,
    /// Statement cancelled or timed out.
    Timeout,
    /// Class 28 and `42501`: authorization failures.
    PermissionDenied,
    /// Class 40: transaction rolled back.
    Rollback,
    /// Everything else.
    NonTransient,
}

impl EngineFailureKind {
    /// Classify a SQLSTATE code.
    #[must_use]
    pub fn from_sql_state(sql_state: &str) -> Self {
        match sql_state {
            "42501" => return Self::PermissionDenied,
            "57014" | "HYT00" => return Self::Timeout,
            "40001" | "HYT01" => return Self::TransientResource,
            _ => {}
        }
        match sql_state.get(..2).unwrap_or_default() {
            "42" => Self::BadGrammar,
            "22" | "23" => Self::DataIntegrityViolation,
            "08" => Self::NonTransientResource,
            "28" => Self::PermissionDenied,
            "40" => Self::Rollback,
            _ => Self::NonTransient,
        }
    }
}

/// The single error type surfaced by this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("{message} [{code}-{sql_state}]")]
    Engine {
        kind: EngineFailureKind,
        sql_state: String,
        code: i32,
        message: String,
    },
}

impl BridgeError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            BridgeError::InvalidState(_) => ErrorKind::InvalidState,
            BridgeError::UnsupportedType(_) => ErrorKind::UnsupportedType,
            BridgeError::Engine { .. } => ErrorKind::EngineFailure,
        }
    }

    /// Engine sub-classification, for [`ErrorKind::EngineFailure`] only.
    #[must_use]
    pub fn engine_kind(&self) -> Option<EngineFailureKind> {
        match self {
            BridgeError::Engine { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub(crate) fn worker_closed(context: &str) -> Self {
        EngineError::connection(format!("Session worker closed {context}")).into()
    }
}

/// Translate an engine failure into the bridge taxonomy.
#[must_use]
pub fn translate(err: EngineError) -> BridgeError {
    BridgeError::Engine {
        kind: EngineFailureKind::from_sql_state(&err.sql_state),
        sql_state: err.sql_state,
        code: err.code,
        message: err.message,
    }
}

impl From<EngineError> for BridgeError {
    fn from(err: EngineError) -> Self {
        translate(err)
    }
}

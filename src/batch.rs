use std::sync::Arc;

use crate::engine::GeneratedKeys;
use crate::error::BridgeError;
use crate::executor::{self, ExecutionContext, Job, ResultStream};

/// Parameterless statements executed one after another.
///
/// Each added string is sent to the engine as-is: it is neither split nor bound.
#[derive(Debug)]
pub struct Batch {
    ctx: Arc<ExecutionContext>,
    statements: Vec<String>,
}

impl Batch {
    pub(crate) fn new(ctx: Arc<ExecutionContext>) -> Self {
        Self {
            ctx,
            statements: Vec::new(),
        }
    }

    /// # Errors
    /// `InvalidArgument` for blank SQL.
    pub fn add(&mut self, sql: impl Into<String>) -> Result<&mut Self, BridgeError> {
        let sql = sql.into();
        if sql.trim().is_empty() {
            return Err(BridgeError::InvalidArgument("SQL must not be empty".into()));
        }
        self.statements.push(sql);
        Ok(self)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// One result per added statement, in insertion order.
    #[must_use]
    pub fn execute(&self) -> ResultStream {
        let jobs = self
            .statements
            .iter()
            .map(|sql| Job {
                sql: sql.clone(),
                params: Vec::new(),
            })
            .collect();
        executor::run(Arc::clone(&self.ctx), jobs, GeneratedKeys::None)
    }
}

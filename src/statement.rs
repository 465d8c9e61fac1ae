use std::sync::Arc;

use tracing::debug;

use crate::binding::{Bindings, parse_index};
use crate::engine::GeneratedKeys;
use crate::error::BridgeError;
use crate::executor::{self, ExecutionContext, Job, ResultStream};
use crate::translation::split_statements;
use crate::types::{HostType, HostValue};

/// A parameterized statement body, possibly holding several `;`-separated statements.
///
/// Values are encoded through the connection's codec registry at bind time; execution runs
/// every embedded statement against every binding group.
///
/// ```rust,no_run
/// use sql_stream_bridge::prelude::*;
///
/// # async fn demo(conn: Connection) -> Result<(), BridgeError> {
/// let mut stmt = conn.create_statement("INSERT INTO t (id, name) VALUES ($1, $2)")?;
/// stmt.bind(0, 1_i32)?.bind(1, "one")?.add()?;
/// stmt.bind(0, 2_i32)?.bind_null(1, HostType::String)?;
/// let mut results = stmt.execute()?;
/// while let Some(result) = results.next().await {
///     assert_eq!(result?.rows_updated(), Some(1));
/// }
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct Statement {
    ctx: Arc<ExecutionContext>,
    sql: String,
    bindings: Bindings,
    generated_keys: GeneratedKeys,
}

impl Statement {
    pub(crate) fn new(
        ctx: Arc<ExecutionContext>,
        sql: impl Into<String>,
    ) -> Result<Self, BridgeError> {
        let sql = sql.into();
        if sql.trim().is_empty() {
            return Err(BridgeError::InvalidArgument("SQL must not be empty".into()));
        }
        Ok(Self {
            ctx,
            sql,
            bindings: Bindings::new(),
            generated_keys: GeneratedKeys::None,
        })
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Bind `value` to the zero-based parameter `index` of the current group.
    ///
    /// # Errors
    /// `UnsupportedType` if no codec encodes the value, or the codec's own failure.
    pub fn bind(
        &mut self,
        index: usize,
        value: impl Into<HostValue>,
    ) -> Result<&mut Self, BridgeError> {
        let encoded = self.ctx.codecs.encode(&value.into(), &self.ctx.session)?;
        self.bindings.bind(index, encoded);
        Ok(self)
    }

    /// Bind by `$N` / `?N` identifier (1-based).
    ///
    /// # Errors
    /// `InvalidArgument` for a malformed identifier; otherwise as [`Statement::bind`].
    pub fn bind_name(
        &mut self,
        name: &str,
        value: impl Into<HostValue>,
    ) -> Result<&mut Self, BridgeError> {
        let index = parse_index(name)?;
        self.bind(index, value)
    }

    /// Bind a typed `NULL`.
    ///
    /// # Errors
    /// `UnsupportedType` if no codec encodes nulls of `host_type`.
    pub fn bind_null(
        &mut self,
        index: usize,
        host_type: HostType,
    ) -> Result<&mut Self, BridgeError> {
        let encoded = self.ctx.codecs.encode_null(host_type)?;
        self.bindings.bind(index, encoded);
        Ok(self)
    }

    /// # Errors
    /// As [`Statement::bind_name`] and [`Statement::bind_null`].
    pub fn bind_null_name(
        &mut self,
        name: &str,
        host_type: HostType,
    ) -> Result<&mut Self, BridgeError> {
        let index = parse_index(name)?;
        self.bind_null(index, host_type)
    }

    /// Finish the current binding group; the next bind starts a new one.
    ///
    /// # Errors
    /// `InvalidState` if nothing was bound since the last `add`.
    pub fn add(&mut self) -> Result<&mut Self, BridgeError> {
        self.bindings.add()?;
        Ok(self)
    }

    /// Ask updates to hand back generated values. No columns means every generated column.
    pub fn return_generated_values<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        self.generated_keys = if columns.is_empty() {
            GeneratedKeys::AllColumns
        } else {
            GeneratedKeys::Columns(columns)
        };
        self
    }

    /// Execute every embedded statement once per binding group, statement-major.
    ///
    /// Nothing reaches the engine until the returned stream is polled.
    ///
    /// # Errors
    /// `InvalidState` for an unfinished binding group or a parameter gap.
    pub fn execute(&self) -> Result<ResultStream, BridgeError> {
        let groups = self.bindings.for_execution()?;
        let params = groups
            .iter()
            .map(crate::binding::Binding::to_params)
            .collect::<Result<Vec<_>, _>>()?;

        let jobs: Vec<Job> = split_statements(&self.sql)
            .into_iter()
            .flat_map(|sql| {
                params.iter().map(move |params| Job {
                    sql: sql.to_string(),
                    params: params.clone(),
                })
            })
            .collect();
        debug!(
            statements = jobs.len() / params.len().max(1),
            groups = params.len(),
            "executing statement"
        );
        Ok(executor::run(
            Arc::clone(&self.ctx),
            jobs,
            self.generated_keys.clone(),
        ))
    }
}

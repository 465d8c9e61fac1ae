use std::path::Path;

use chrono::FixedOffset;
use rusqlite::{Connection, ErrorCode};
use tracing::debug;

use crate::engine::{
    ColumnDescriptor, Command, ConnectionMetadata, Cursor, EngineError, GeneratedKeys,
    MemoryCursor, Session, SessionContext, TypeInfo, TypeTag, UpdateOutcome, Value,
};
use crate::translation::{PlaceholderStyle, translate_placeholders};

use super::params::{from_sqlite_value, to_sqlite_value};

/// Blocking [`Session`] over a `rusqlite` connection.
///
/// `$N` placeholders are rewritten to `?N`. Query results are collected into a
/// [`MemoryCursor`] and typed by storage class (`BIGINT`, `DOUBLE`, `VARCHAR`, `VARBINARY`).
///
/// Generated keys come from `last_insert_rowid()`, so an insert reports at most one key
/// row: a multi-row `INSERT ... VALUES (..), (..)` yields only the last ROWID.
#[derive(Debug)]
pub struct SqliteSession {
    conn: Option<Connection>,
    time_zone: Option<FixedOffset>,
}

impl SqliteSession {
    /// # Errors
    /// Returns an `Engine` error if `SQLite` cannot open the database.
    pub fn open_in_memory() -> Result<Self, EngineError> {
        Connection::open_in_memory()
            .map(Self::from_connection)
            .map_err(engine_error)
    }

    /// # Errors
    /// Returns an `Engine` error if `SQLite` cannot open `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        Connection::open(path)
            .map(Self::from_connection)
            .map_err(engine_error)
    }

    #[must_use]
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Some(conn),
            time_zone: None,
        }
    }

    /// Time zone used for zoneless timestamps by session-aware codecs.
    #[must_use]
    pub fn with_time_zone(mut self, time_zone: FixedOffset) -> Self {
        self.time_zone = Some(time_zone);
        self
    }

    fn connection(&self) -> Result<&Connection, EngineError> {
        self.conn
            .as_ref()
            .ok_or_else(|| EngineError::connection("The SQLite session is closed"))
    }
}

impl Session for SqliteSession {
    fn prepare<'s>(
        &'s mut self,
        sql: &str,
        params: &[Value],
    ) -> Result<Box<dyn Command + 's>, EngineError> {
        let conn = self.connection()?;
        let translated = translate_placeholders(sql, PlaceholderStyle::Question);
        let mut stmt = conn.prepare(&translated).map_err(engine_error)?;

        let expected = stmt.parameter_count();
        if params.len() > expected {
            return Err(EngineError::new(
                "07001",
                90008,
                format!(
                    "Invalid parameter count: statement takes {expected}, {} given",
                    params.len()
                ),
            ));
        }
        if params.len() < expected {
            return Err(EngineError::new(
                "07001",
                90012,
                format!("Parameter \"#{}\" is not set", params.len() + 1),
            ));
        }
        for (i, value) in params.iter().enumerate() {
            stmt.raw_bind_parameter(i + 1, to_sqlite_value(value)?)
                .map_err(engine_error)?;
        }

        let inserts = is_insert(sql);
        Ok(Box::new(SqliteCommand { conn, stmt, inserts }))
    }

    fn context(&self) -> SessionContext {
        match self.time_zone {
            Some(tz) => SessionContext::new().with_time_zone(tz),
            None => SessionContext::new(),
        }
    }

    fn metadata(&self) -> ConnectionMetadata {
        ConnectionMetadata {
            product_name: "SQLite".to_string(),
            version: rusqlite::version().to_string(),
        }
    }

    fn close(&mut self) -> Result<(), EngineError> {
        match self.conn.take() {
            Some(conn) => conn.close().map_err(|(_, err)| engine_error(err)),
            None => Ok(()),
        }
    }
}

struct SqliteCommand<'s> {
    conn: &'s Connection,
    stmt: rusqlite::Statement<'s>,
    inserts: bool,
}

impl Command for SqliteCommand<'_> {
    fn is_query(&self) -> bool {
        self.stmt.column_count() > 0
    }

    fn execute_query(&mut self, max_rows: usize) -> Result<Box<dyn Cursor>, EngineError> {
        let names: Vec<String> = self
            .stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let mut rows = self.stmt.raw_query();
        let mut collected: Vec<Vec<Value>> = Vec::new();
        while let Some(row) = rows.next().map_err(engine_error)? {
            if max_rows > 0 && collected.len() >= max_rows {
                break;
            }
            let values = (0..names.len())
                .map(|i| {
                    row.get_ref(i)
                        .map_err(engine_error)
                        .and_then(from_sqlite_value)
                })
                .collect::<Result<Vec<_>, _>>()?;
            collected.push(values);
        }
        debug!(rows = collected.len(), "sqlite query materialized");

        let columns = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| ColumnDescriptor::new(name, TypeInfo::of(column_tag(&collected, i))))
            .collect();
        Ok(Box::new(MemoryCursor::new(columns, collected)))
    }

    fn execute_update(&mut self, keys: &GeneratedKeys) -> Result<UpdateOutcome, EngineError> {
        let count = self.stmt.raw_execute().map_err(engine_error)?;
        let count = u64::try_from(count).unwrap_or(u64::MAX);
        let column = match keys {
            GeneratedKeys::None => return Ok(UpdateOutcome::count(count)),
            GeneratedKeys::AllColumns => "ROWID".to_string(),
            GeneratedKeys::Columns(names) => names
                .first()
                .cloned()
                .unwrap_or_else(|| "ROWID".to_string()),
        };
        let rows = if self.inserts && count > 0 {
            if count > 1 {
                debug!(count, "sqlite reports only the last generated ROWID");
            }
            vec![vec![Value::BigInt(self.conn.last_insert_rowid())]]
        } else {
            Vec::new()
        };
        let cursor = MemoryCursor::new(
            vec![ColumnDescriptor::new(column, TypeInfo::of(TypeTag::BigInt))],
            rows,
        );
        Ok(UpdateOutcome::with_generated_keys(count, Box::new(cursor)))
    }
}

fn is_insert(sql: &str) -> bool {
    let head = sql.trim_start();
    ["INSERT", "REPLACE"].iter().any(|kw| {
        head.get(..kw.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(kw))
    })
}

// SQLite is dynamically typed; describe a column by the first non-null value it holds.
fn column_tag(rows: &[Vec<Value>], index: usize) -> TypeTag {
    rows.iter()
        .filter_map(|row| row.get(index))
        .find(|v| !v.is_null())
        .map_or(TypeTag::Null, Value::type_tag)
}

/// Classify a `rusqlite` failure by SQLSTATE.
pub(crate) fn engine_error(err: rusqlite::Error) -> EngineError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, message) => {
            let message = message.clone().unwrap_or_else(|| err.to_string());
            EngineError::new(sql_state(failure.code), failure.extended_code, message)
        }
        // prepare-time errors that point at an input token, e.g. syntax errors
        rusqlite::Error::SqlInputError { error, msg, .. } => {
            EngineError::new(sql_state(error.code), error.extended_code, msg.clone())
        }
        _ => EngineError::general(err.to_string()),
    }
}

fn sql_state(code: ErrorCode) -> &'static str {
    match code {
        // SQLITE_ERROR: syntax errors and unknown tables/columns
        ErrorCode::Unknown => "42000",
        ErrorCode::ConstraintViolation => "23000",
        ErrorCode::TypeMismatch => "22018",
        ErrorCode::TooBig => "22001",
        ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => "40001",
        ErrorCode::OperationInterrupted => "57014",
        ErrorCode::PermissionDenied | ErrorCode::AuthorizationForStatementDenied => "42501",
        ErrorCode::CannotOpen | ErrorCode::NotADatabase => "08001",
        _ => "HY000",
    }
}

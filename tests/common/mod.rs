#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::TryStreamExt;
use sql_stream_bridge::engine::{
    ColumnDescriptor, Command, ConnectionMetadata, Cursor, EngineError, GeneratedKeys, Session,
    SessionContext, TypeInfo, TypeTag, UpdateOutcome, Value,
};
use sql_stream_bridge::{
    BridgeError, Connection, ConnectionOptions, QueryResult, Row, Statement,
};

/// What the stub engine does with one prepared statement.
#[derive(Debug, Clone)]
pub enum Reply {
    Rows {
        columns: Vec<ColumnDescriptor>,
        rows: Vec<Vec<Value>>,
        fail_at: Option<(usize, EngineError)>,
    },
    Update {
        count: u64,
        keys: Option<(Vec<ColumnDescriptor>, Vec<Vec<Value>>)>,
    },
    /// Fails at prepare time.
    Fail(EngineError),
}

impl Reply {
    pub fn rows(columns: &[(&str, TypeTag)], rows: Vec<Vec<Value>>) -> Self {
        Reply::Rows {
            columns: descriptors(columns),
            rows,
            fail_at: None,
        }
    }

    /// Rows, then `error` from the advance that would deliver row `fail_at`.
    pub fn failing_rows(
        columns: &[(&str, TypeTag)],
        rows: Vec<Vec<Value>>,
        fail_at: usize,
        error: EngineError,
    ) -> Self {
        Reply::Rows {
            columns: descriptors(columns),
            rows,
            fail_at: Some((fail_at, error)),
        }
    }

    pub fn update(count: u64) -> Self {
        Reply::Update { count, keys: None }
    }

    /// An update whose engine always reports generated keys, requested or not.
    pub fn update_with_keys(count: u64, column: &str, keys: &[i64]) -> Self {
        Reply::Update {
            count,
            keys: Some((
                descriptors(&[(column, TypeTag::BigInt)]),
                keys.iter().map(|k| vec![Value::BigInt(*k)]).collect(),
            )),
        }
    }
}

fn descriptors(columns: &[(&str, TypeTag)]) -> Vec<ColumnDescriptor> {
    columns
        .iter()
        .map(|(name, tag)| ColumnDescriptor::new(*name, TypeInfo::of(*tag)))
        .collect()
}

/// One statement the stub actually executed.
#[derive(Debug, Clone, PartialEq)]
pub struct Executed {
    pub sql: String,
    pub params: Vec<Value>,
    pub keys: GeneratedKeys,
}

/// Shared view into what the stub engine did.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    executed: Arc<Mutex<Vec<Executed>>>,
    cursors_closed: Arc<AtomicUsize>,
    session_closed: Arc<AtomicBool>,
}

impl Recorder {
    pub fn executed(&self) -> Vec<Executed> {
        self.executed.lock().unwrap().clone()
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.executed().into_iter().map(|e| e.sql).collect()
    }

    pub fn cursors_closed(&self) -> usize {
        self.cursors_closed.load(Ordering::SeqCst)
    }

    pub fn session_closed(&self) -> bool {
        self.session_closed.load(Ordering::SeqCst)
    }
}

type Responder = Box<dyn FnMut(&str, &[Value]) -> Reply + Send>;

/// Scripted engine: `respond` decides the reply for every prepared statement.
pub struct StubSession {
    respond: Responder,
    recorder: Recorder,
    fail_close: bool,
    context: SessionContext,
}

impl StubSession {
    pub fn new(respond: impl FnMut(&str, &[Value]) -> Reply + Send + 'static) -> (Self, Recorder) {
        let recorder = Recorder::default();
        let session = Self {
            respond: Box::new(respond),
            recorder: recorder.clone(),
            fail_close: false,
            context: SessionContext::new(),
        };
        (session, recorder)
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn with_context(mut self, context: SessionContext) -> Self {
        self.context = context;
        self
    }
}

impl Session for StubSession {
    fn prepare<'s>(
        &'s mut self,
        sql: &str,
        params: &[Value],
    ) -> Result<Box<dyn Command + 's>, EngineError> {
        match (self.respond)(sql, params) {
            Reply::Fail(err) => Err(err),
            reply => Ok(Box::new(StubCommand {
                sql: sql.to_string(),
                params: params.to_vec(),
                reply,
                recorder: self.recorder.clone(),
            })),
        }
    }

    fn context(&self) -> SessionContext {
        self.context
    }

    fn metadata(&self) -> ConnectionMetadata {
        ConnectionMetadata {
            product_name: "Stub".into(),
            version: "1.0".into(),
        }
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.recorder.session_closed.store(true, Ordering::SeqCst);
        if self.fail_close {
            return Err(EngineError::connection("session close failed"));
        }
        Ok(())
    }
}

struct StubCommand {
    sql: String,
    params: Vec<Value>,
    reply: Reply,
    recorder: Recorder,
}

impl StubCommand {
    fn record(&self, keys: &GeneratedKeys) {
        self.recorder.executed.lock().unwrap().push(Executed {
            sql: self.sql.clone(),
            params: self.params.clone(),
            keys: keys.clone(),
        });
    }
}

impl Command for StubCommand {
    fn is_query(&self) -> bool {
        matches!(self.reply, Reply::Rows { .. })
    }

    fn execute_query(&mut self, max_rows: usize) -> Result<Box<dyn Cursor>, EngineError> {
        self.record(&GeneratedKeys::None);
        match self.reply.clone() {
            Reply::Rows {
                columns,
                mut rows,
                fail_at,
            } => {
                if max_rows > 0 {
                    rows.truncate(max_rows);
                }
                Ok(Box::new(StubCursor::new(
                    columns,
                    rows,
                    fail_at,
                    self.recorder.clone(),
                )))
            }
            _ => Err(EngineError::general("not a query")),
        }
    }

    fn execute_update(&mut self, keys: &GeneratedKeys) -> Result<UpdateOutcome, EngineError> {
        self.record(keys);
        match self.reply.clone() {
            Reply::Update {
                count,
                keys: Some((columns, rows)),
            } => Ok(UpdateOutcome::with_generated_keys(
                count,
                Box::new(StubCursor::new(columns, rows, None, self.recorder.clone())),
            )),
            Reply::Update { count, keys: None } => Ok(UpdateOutcome::count(count)),
            _ => Err(EngineError::general("not an update")),
        }
    }
}

struct StubCursor {
    columns: Vec<ColumnDescriptor>,
    rows: VecDeque<Vec<Value>>,
    current: Vec<Value>,
    delivered: usize,
    fail_at: Option<(usize, EngineError)>,
    recorder: Recorder,
}

impl StubCursor {
    fn new(
        columns: Vec<ColumnDescriptor>,
        rows: Vec<Vec<Value>>,
        fail_at: Option<(usize, EngineError)>,
        recorder: Recorder,
    ) -> Self {
        Self {
            columns,
            rows: rows.into(),
            current: Vec::new(),
            delivered: 0,
            fail_at,
            recorder,
        }
    }

    fn failure_due(&self) -> Option<&EngineError> {
        self.fail_at
            .as_ref()
            .filter(|(at, _)| *at == self.delivered)
            .map(|(_, err)| err)
    }
}

impl Cursor for StubCursor {
    fn visible_column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, index: usize) -> String {
        self.columns[index].name.clone()
    }

    fn column_type(&self, index: usize) -> TypeInfo {
        self.columns[index].type_info
    }

    fn has_next(&mut self) -> Result<bool, EngineError> {
        Ok(!self.rows.is_empty() || self.failure_due().is_some())
    }

    fn advance(&mut self) -> Result<(), EngineError> {
        if let Some(err) = self.failure_due() {
            return Err(err.clone());
        }
        self.current = self
            .rows
            .pop_front()
            .ok_or_else(|| EngineError::general("no more rows"))?;
        self.delivered += 1;
        Ok(())
    }

    fn current_row_values(&self) -> Vec<Value> {
        self.current.clone()
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.recorder.cursors_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn options() -> ConnectionOptions {
    ConnectionOptions::builder().geometry(false).finish()
}

pub fn connect(
    respond: impl FnMut(&str, &[Value]) -> Reply + Send + 'static,
) -> (Connection, Recorder) {
    let (session, recorder) = StubSession::new(respond);
    let conn = Connection::open(session, options()).unwrap();
    (conn, recorder)
}

/// Execute and collect every result.
pub async fn run(statement: &Statement) -> Result<Vec<QueryResult>, BridgeError> {
    statement.execute()?.try_collect().await
}

/// Drain the rows of one result.
pub async fn rows(result: QueryResult) -> Result<Vec<Row>, BridgeError> {
    result.map(|row, _| row).try_collect().await
}

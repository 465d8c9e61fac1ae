use std::collections::HashMap;
use std::sync::mpsc::Receiver;

use tracing::{debug, trace, warn};

use crate::engine::{ColumnDescriptor, Cursor, Session, Value};
use crate::error::BridgeError;

use super::channel::{Command, CursorId, ExecuteRequest, Outcome};

/// State owned by the worker thread: the session and every cursor it has handed out.
struct WorkerState {
    session: Box<dyn Session>,
    cursors: HashMap<CursorId, Box<dyn Cursor>>,
    // never leaves this thread; u64 won't exhaust in practice
    next_cursor: CursorId,
}

pub(super) fn run_session_worker(
    session: Box<dyn Session>,
    receiver: &Receiver<Command>,
    close_on_drop: bool,
) {
    let mut state = WorkerState {
        session,
        cursors: HashMap::new(),
        next_cursor: 1,
    };

    while let Ok(command) = receiver.recv() {
        match command {
            Command::Execute {
                request,
                respond_to,
            } => {
                let _ = respond_to.send(state.execute(request));
            }
            Command::Fetch { cursor, respond_to } => {
                let _ = respond_to.send(state.fetch(cursor));
            }
            Command::OpenCursors { respond_to } => {
                let _ = respond_to.send(Ok(state.cursors.len()));
            }
            Command::Close { respond_to } => {
                let _ = respond_to.send(state.shutdown());
                return;
            }
            Command::Shutdown => break,
        }
    }

    if close_on_drop && let Err(err) = state.shutdown() {
        debug!(error = %err, "session close on drop failed");
    }
}

impl WorkerState {
    fn execute(&mut self, request: ExecuteRequest) -> Result<Outcome, BridgeError> {
        debug!(
            sql = %request.sql,
            params = request.params.len(),
            keys = ?request.keys,
            "Request"
        );
        let mut command = self.session.prepare(&request.sql, &request.params)?;
        if command.is_query() {
            let cursor = command.execute_query(request.max_rows)?;
            drop(command);
            let columns = ColumnDescriptor::describe(cursor.as_ref());
            let id = self.register(cursor);
            debug!(cursor = id, columns = columns.len(), "Response: rows");
            return Ok(Outcome::Rows {
                cursor: id,
                columns,
            });
        }

        let outcome = command.execute_update(&request.keys)?;
        drop(command);
        let count = outcome.update_count;
        match outcome.generated_keys {
            Some(keys) if !request.keys.is_none() => {
                let columns = ColumnDescriptor::describe(keys.as_ref());
                let id = self.register(keys);
                debug!(count, cursor = id, "Response: update with generated keys");
                Ok(Outcome::UpdateWithKeys {
                    cursor: id,
                    count,
                    columns,
                })
            }
            Some(mut unrequested) => {
                if let Err(err) = unrequested.close() {
                    debug!(error = %err, "closing unrequested generated keys failed");
                }
                debug!(count, "Response: update");
                Ok(Outcome::Update { count })
            }
            None => {
                debug!(count, "Response: update");
                Ok(Outcome::Update { count })
            }
        }
    }

    fn register(&mut self, cursor: Box<dyn Cursor>) -> CursorId {
        let id = self.next_cursor;
        self.next_cursor = self.next_cursor.saturating_add(1);
        self.cursors.insert(id, cursor);
        id
    }

    /// Advance `id` by one row. An exhausted or failed cursor is closed and forgotten.
    fn fetch(&mut self, id: CursorId) -> Result<Option<Vec<Value>>, BridgeError> {
        let Some(cursor) = self.cursors.get_mut(&id) else {
            return Err(BridgeError::InvalidState(format!("Cursor {id} is closed")));
        };
        let step = cursor
            .has_next()
            .and_then(|more| if more { cursor.advance().map(|()| true) } else { Ok(false) });
        match step {
            Ok(true) => {
                trace!(cursor = id, "advance");
                Ok(Some(cursor.current_row_values()))
            }
            Ok(false) => {
                trace!(cursor = id, "exhausted");
                self.release(id)?;
                Ok(None)
            }
            Err(err) => {
                if let Err(close_err) = self.release(id) {
                    debug!(cursor = id, error = %close_err, "closing failed cursor");
                }
                Err(err.into())
            }
        }
    }

    fn release(&mut self, id: CursorId) -> Result<(), BridgeError> {
        match self.cursors.remove(&id) {
            Some(mut cursor) => cursor.close().map_err(BridgeError::from),
            None => Ok(()),
        }
    }

    /// Close leftover cursors, then the session. Only the session's failure is reported.
    fn shutdown(&mut self) -> Result<(), BridgeError> {
        if !self.cursors.is_empty() {
            warn!(open = self.cursors.len(), "closing cursors left open by the caller");
        }
        for (id, mut cursor) in self.cursors.drain() {
            if let Err(err) = cursor.close() {
                debug!(cursor = id, error = %err, "cursor close failed");
            }
        }
        debug!("closing session");
        self.session.close().map_err(BridgeError::from)
    }
}

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::debug;

use crate::engine::{ConnectionMetadata, EngineError, Session, SessionContext, Value};
use crate::error::BridgeError;

use super::channel::{Command, CursorId, ExecuteRequest, Outcome};
use super::dispatcher::run_session_worker;

static NEXT_WORKER: AtomicU64 = AtomicU64::new(1);

/// Owns the thread that owns the session. Dropping it asks the thread to stop.
pub(crate) struct SessionWorker {
    sender: Sender<Command>,
    name: String,
    metadata: ConnectionMetadata,
    context: SessionContext,
}

impl SessionWorker {
    pub(crate) fn spawn(
        session: Box<dyn Session>,
        name: Option<String>,
        close_on_drop: bool,
    ) -> Result<Self, BridgeError> {
        let (sender, receiver) = mpsc::channel::<Command>();
        let name = name.unwrap_or_else(|| {
            format!("session-worker-{}", NEXT_WORKER.fetch_add(1, Ordering::Relaxed))
        });
        let metadata = session.metadata();
        let context = session.context();
        let handle = Handle::try_current().ok();
        thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                let runtime_guard = handle.as_ref().map(|h| h.enter());
                run_session_worker(session, &receiver, close_on_drop);
                drop(runtime_guard);
            })
            .map_err(|err| {
                BridgeError::from(EngineError::connection(format!(
                    "failed to spawn session worker thread: {err}"
                )))
            })?;
        debug!(worker = %name, "session worker started");

        Ok(Self {
            sender,
            name,
            metadata,
            context,
        })
    }

    pub(crate) fn metadata(&self) -> &ConnectionMetadata {
        &self.metadata
    }

    pub(crate) fn context(&self) -> SessionContext {
        self.context
    }

    fn send_command(&self, command: Command) -> Result<(), BridgeError> {
        self.sender
            .send(command)
            .map_err(|_| BridgeError::worker_closed("before the request was sent"))
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T, BridgeError>>) -> Command,
        drop_context: &'static str,
    ) -> Result<T, BridgeError> {
        let (tx, rx) = oneshot::channel();
        self.send_command(build(tx))?;
        rx.await
            .map_err(|_| BridgeError::worker_closed(drop_context))?
    }

    pub(crate) async fn execute(&self, request: ExecuteRequest) -> Result<Outcome, BridgeError> {
        self.request(
            |respond_to| Command::Execute {
                request,
                respond_to,
            },
            "while executing a statement",
        )
        .await
    }

    pub(crate) async fn fetch(&self, cursor: CursorId) -> Result<Option<Vec<Value>>, BridgeError> {
        self.request(
            |respond_to| Command::Fetch { cursor, respond_to },
            "while fetching a row",
        )
        .await
    }

    pub(crate) async fn open_cursors(&self) -> Result<usize, BridgeError> {
        self.request(
            |respond_to| Command::OpenCursors { respond_to },
            "while counting cursors",
        )
        .await
    }

    pub(crate) async fn close(&self) -> Result<(), BridgeError> {
        self.request(
            |respond_to| Command::Close { respond_to },
            "while closing the session",
        )
        .await
    }
}

impl Drop for SessionWorker {
    fn drop(&mut self) {
        debug!(worker = %self.name, "session worker stopping");
        let _ = self.sender.send(Command::Shutdown);
    }
}

impl std::fmt::Debug for SessionWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionWorker")
            .field("name", &self.name)
            .field("product", &self.metadata.product_name)
            .finish()
    }
}

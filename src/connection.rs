use std::sync::Arc;

use tracing::info;

use crate::batch::Batch;
use crate::codecs::CodecRegistry;
use crate::config::ConnectionOptions;
use crate::engine::{ConnectionMetadata, Session, SessionContext};
use crate::error::BridgeError;
use crate::executor::ExecutionContext;
use crate::statement::Statement;
use crate::worker::SessionWorker;

/// Async handle to one engine session.
///
/// Cheap to clone; every clone, statement and open row stream shares the same session worker.
/// The worker stops once the last of them is dropped.
#[derive(Debug, Clone)]
pub struct Connection {
    inner: Arc<ExecutionContext>,
}

impl Connection {
    /// Hand `session` to a new worker thread.
    ///
    /// # Errors
    /// Returns an `Engine` error if the worker thread cannot be spawned.
    pub fn open<S>(session: S, options: ConnectionOptions) -> Result<Self, BridgeError>
    where
        S: Session + 'static,
    {
        Self::open_boxed(Box::new(session), options)
    }

    /// Like [`Connection::open`], for an already boxed session.
    ///
    /// # Errors
    /// Returns an `Engine` error if the worker thread cannot be spawned.
    pub fn open_boxed(
        session: Box<dyn Session>,
        options: ConnectionOptions,
    ) -> Result<Self, BridgeError> {
        let codecs = Arc::new(CodecRegistry::new(&options.codecs));
        let worker = SessionWorker::spawn(
            session,
            options.worker_name,
            options.close_session_on_drop,
        )?;
        let session = worker.context();
        info!(
            product = %worker.metadata().product_name,
            version = %worker.metadata().version,
            codecs = codecs.codec_names().len(),
            "connection opened"
        );
        Ok(Self {
            inner: Arc::new(ExecutionContext {
                worker,
                codecs,
                session,
                max_rows: options.max_rows,
            }),
        })
    }

    /// # Errors
    /// `InvalidArgument` for blank SQL.
    pub fn create_statement(&self, sql: impl Into<String>) -> Result<Statement, BridgeError> {
        Statement::new(Arc::clone(&self.inner), sql)
    }

    #[must_use]
    pub fn create_batch(&self) -> Batch {
        Batch::new(Arc::clone(&self.inner))
    }

    #[must_use]
    pub fn metadata(&self) -> &ConnectionMetadata {
        self.inner.worker.metadata()
    }

    #[must_use]
    pub fn codecs(&self) -> &CodecRegistry {
        &self.inner.codecs
    }

    #[must_use]
    pub fn session_context(&self) -> SessionContext {
        self.inner.session
    }

    /// Cursors the worker still holds: row streams dropped before exhaustion stay counted here.
    ///
    /// # Errors
    /// Returns an `Engine` error if the worker is gone.
    pub async fn open_cursors(&self) -> Result<usize, BridgeError> {
        self.inner.worker.open_cursors().await
    }

    /// Close leftover cursors and the session, and stop the worker.
    ///
    /// # Errors
    /// Whatever the engine reports while closing the session.
    pub async fn close(&self) -> Result<(), BridgeError> {
        self.inner.worker.close().await
    }
}

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::stream::{self, BoxStream};
use futures_util::{Stream, StreamExt, future};

use crate::error::BridgeError;
use crate::executor::ExecutionContext;
use crate::worker::CursorId;

use super::metadata::RowMetadata;
use super::row::Row;

/// Lazily fetched rows of one engine cursor.
///
/// Each poll asks the session worker for exactly one row. The cursor is closed when the
/// worker finds it exhausted or an advance fails; dropping the stream before that leaves it
/// open until the connection closes.
pub struct RowStream {
    metadata: Arc<RowMetadata>,
    inner: BoxStream<'static, Result<Row, BridgeError>>,
}

struct Fetch {
    ctx: Arc<ExecutionContext>,
    cursor: CursorId,
    metadata: Arc<RowMetadata>,
    done: bool,
}

impl RowStream {
    pub(crate) fn new(
        ctx: Arc<ExecutionContext>,
        cursor: CursorId,
        metadata: Arc<RowMetadata>,
    ) -> Self {
        let state = Fetch {
            ctx,
            cursor,
            metadata: Arc::clone(&metadata),
            done: false,
        };
        let inner = stream::unfold(state, |mut state| async move {
            if state.done {
                return None;
            }
            match state.ctx.worker.fetch(state.cursor).await {
                Ok(Some(values)) => {
                    let row = Row::new(
                        values,
                        Arc::clone(&state.metadata),
                        Arc::clone(&state.ctx.codecs),
                        state.ctx.session,
                    );
                    Some((Ok(row), state))
                }
                Ok(None) => None,
                Err(err) => {
                    state.done = true;
                    Some((Err(err), state))
                }
            }
        })
        .boxed();
        Self { metadata, inner }
    }

    #[must_use]
    pub fn metadata(&self) -> &RowMetadata {
        &self.metadata
    }

    pub(crate) fn shared_metadata(&self) -> Arc<RowMetadata> {
        Arc::clone(&self.metadata)
    }
}

impl Stream for RowStream {
    type Item = Result<Row, BridgeError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl fmt::Debug for RowStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowStream")
            .field("columns", &self.metadata.column_names())
            .finish_non_exhaustive()
    }
}

/// End `stream` right after its first error.
pub(crate) fn stop_after_error<T, S>(stream: S) -> BoxStream<'static, Result<T, BridgeError>>
where
    T: Send + 'static,
    S: Stream<Item = Result<T, BridgeError>> + Send + 'static,
{
    stream
        .scan(false, |failed, item| {
            if *failed {
                return future::ready(None);
            }
            *failed = item.is_err();
            future::ready(Some(item))
        })
        .boxed()
}

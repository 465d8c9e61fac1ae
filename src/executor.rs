use std::collections::VecDeque;
use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use tracing::debug;

use crate::codecs::CodecRegistry;
use crate::engine::{GeneratedKeys, SessionContext, Value};
use crate::error::BridgeError;
use crate::results::{QueryResult, RowMetadata, RowStream};
use crate::worker::{ExecuteRequest, Outcome, SessionWorker};

/// Lazy sequence of results produced by one `execute()` call.
pub type ResultStream = BoxStream<'static, Result<QueryResult, BridgeError>>;

/// Everything an execution needs, shared by a connection and every stream it hands out.
#[derive(Debug)]
pub(crate) struct ExecutionContext {
    pub worker: SessionWorker,
    pub codecs: Arc<CodecRegistry>,
    pub session: SessionContext,
    pub max_rows: usize,
}

/// One prepare + execute: a single statement with one binding group.
#[derive(Debug, Clone)]
pub(crate) struct Job {
    pub sql: String,
    pub params: Vec<Value>,
}

struct Pending {
    ctx: Arc<ExecutionContext>,
    jobs: VecDeque<Job>,
    keys: GeneratedKeys,
    failed: bool,
}

/// Run `jobs` in order, one per poll. The first failure ends the stream.
pub(crate) fn run(ctx: Arc<ExecutionContext>, jobs: Vec<Job>, keys: GeneratedKeys) -> ResultStream {
    debug!(jobs = jobs.len(), "scheduling executions");
    let pending = Pending {
        ctx,
        jobs: jobs.into(),
        keys,
        failed: false,
    };
    stream::unfold(pending, |mut pending| async move {
        if pending.failed {
            return None;
        }
        let job = pending.jobs.pop_front()?;
        let request = ExecuteRequest {
            sql: job.sql,
            params: job.params,
            keys: pending.keys.clone(),
            max_rows: pending.ctx.max_rows,
        };
        match pending.ctx.worker.execute(request).await {
            Ok(outcome) => {
                let result = into_result(&pending.ctx, outcome);
                Some((Ok(result), pending))
            }
            Err(err) => {
                pending.failed = true;
                Some((Err(err), pending))
            }
        }
    })
    .boxed()
}

fn into_result(ctx: &Arc<ExecutionContext>, outcome: Outcome) -> QueryResult {
    match outcome {
        Outcome::Rows { cursor, columns } => {
            let metadata = Arc::new(RowMetadata::from_descriptors(&columns, &ctx.codecs));
            QueryResult::rows(RowStream::new(Arc::clone(ctx), cursor, metadata))
        }
        Outcome::Update { count } => QueryResult::update(count),
        Outcome::UpdateWithKeys {
            count,
            cursor,
            columns,
        } => {
            let metadata = Arc::new(RowMetadata::from_descriptors(&columns, &ctx.codecs));
            QueryResult::update_with_keys(count, RowStream::new(Arc::clone(ctx), cursor, metadata))
        }
    }
}

use tokio::sync::oneshot;

use crate::engine::{ColumnDescriptor, GeneratedKeys, Value};
use crate::error::BridgeError;

/// Worker-side handle of an open cursor.
pub(crate) type CursorId = u64;

/// One prepare + execute round trip.
#[derive(Debug, Clone)]
pub(crate) struct ExecuteRequest {
    pub sql: String,
    pub params: Vec<Value>,
    pub keys: GeneratedKeys,
    pub max_rows: usize,
}

/// What the worker reports back for an [`ExecuteRequest`].
#[derive(Debug)]
pub(crate) enum Outcome {
    Rows {
        cursor: CursorId,
        columns: Vec<ColumnDescriptor>,
    },
    Update {
        count: u64,
    },
    UpdateWithKeys {
        count: u64,
        cursor: CursorId,
        columns: Vec<ColumnDescriptor>,
    },
}

pub(crate) enum Command {
    Execute {
        request: ExecuteRequest,
        respond_to: oneshot::Sender<Result<Outcome, BridgeError>>,
    },
    Fetch {
        cursor: CursorId,
        respond_to: oneshot::Sender<Result<Option<Vec<Value>>, BridgeError>>,
    },
    OpenCursors {
        respond_to: oneshot::Sender<Result<usize, BridgeError>>,
    },
    Close {
        respond_to: oneshot::Sender<Result<(), BridgeError>>,
    },
    Shutdown,
}

//! Dedicated thread that owns a blocking [`Session`](crate::engine::Session).
//!
//! Callers talk to it over a command channel and await replies on oneshot channels, so no
//! engine call ever runs on an async executor thread.

mod channel;
mod dispatcher;
mod manager;

pub(crate) use channel::{CursorId, ExecuteRequest, Outcome};
pub(crate) use manager::SessionWorker;

//! Async, streaming statement and result layer over a synchronous, cursor-based SQL engine.
//!
//! An engine implements [`engine::Session`]; [`Connection::open`] hands it to a dedicated worker
//! thread. Statements bind host values through a [`CodecRegistry`], execute lazily, and yield a
//! stream of [`QueryResult`]s whose rows are pulled from the engine cursor one at a time.
//!
//! ```rust,no_run
//! use sql_stream_bridge::prelude::*;
//!
//! # async fn demo() -> Result<(), BridgeError> {
//! let conn = Connection::open(SqliteSession::open_in_memory()?, ConnectionOptions::default())?;
//! let mut results = conn.create_statement("SELECT 1 AS one; SELECT 2 AS two")?.execute()?;
//! while let Some(result) = results.next().await {
//!     let mut rows = result?.map(|row, _| row.get::<i64>(0));
//!     while let Some(value) = rows.next().await {
//!         println!("{:?}", value??);
//!     }
//! }
//! conn.close().await?;
//! # Ok(()) }
//! ```

mod batch;
pub mod binding;
pub mod codecs;
pub mod config;
mod connection;
pub mod engine;
pub mod error;
mod executor;
pub mod prelude;
pub mod results;
mod statement;
pub mod translation;
pub mod types;
mod worker;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use batch::Batch;
pub use codecs::{Codec, CodecRegistry};
pub use config::{CodecOptions, ConnectionOptions, ConnectionOptionsBuilder};
pub use connection::Connection;
pub use error::{BridgeError, EngineFailureKind, ErrorKind, translate};
pub use executor::ResultStream;
pub use results::{ColumnMetadata, QueryResult, Row, RowMetadata, RowStream, Segment};
pub use statement::Statement;
pub use types::{FromHostValue, HostType, HostValue, Parameter, SqlEnum};

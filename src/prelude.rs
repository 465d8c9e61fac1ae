//! Convenient imports for common functionality.
//!
//! Re-exports the connection and statement surface, the result types, and `StreamExt` so result
//! streams can be driven with `.next().await`.

pub use futures_util::StreamExt;

pub use crate::binding::{Binding, BindingState, Bindings};
pub use crate::codecs::{Codec, CodecRegistry};
pub use crate::config::{CodecOptions, ConnectionOptions};
pub use crate::engine::{
    ConnectionMetadata, EngineError, GeneratedKeys, Session, SessionContext, TypeTag, Value,
};
pub use crate::error::{BridgeError, EngineFailureKind, ErrorKind};
pub use crate::results::{ColumnMetadata, QueryResult, Row, RowMetadata, RowStream, Segment};
pub use crate::translation::{PlaceholderStyle, split_statements, translate_placeholders};
pub use crate::types::{FromHostValue, HostType, HostValue, Parameter, SqlEnum};
pub use crate::{Batch, Connection, ResultStream, Statement};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteSession;

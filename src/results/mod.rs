//! Results, rows and row metadata.

mod metadata;
mod result;
mod row;
mod stream;

pub use metadata::{ColumnMetadata, RowMetadata};
pub use result::{QueryResult, Segment};
pub use row::Row;
pub use stream::RowStream;

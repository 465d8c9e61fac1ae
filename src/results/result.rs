use std::fmt;

use futures_util::stream::{self, BoxStream};
use futures_util::{Stream, StreamExt, future};

use crate::error::BridgeError;

use super::metadata::RowMetadata;
use super::row::Row;
use super::stream::{RowStream, stop_after_error};

/// A logical piece of a result: one row, or the update count.
#[derive(Debug, Clone)]
pub enum Segment {
    Row(Row),
    UpdateCount(u64),
}

impl Segment {
    #[must_use]
    pub fn is_row(&self) -> bool {
        matches!(self, Segment::Row(_))
    }

    #[must_use]
    pub fn is_update_count(&self) -> bool {
        matches!(self, Segment::UpdateCount(_))
    }

    #[must_use]
    pub fn into_row(self) -> Option<Row> {
        match self {
            Segment::Row(row) => Some(row),
            Segment::UpdateCount(_) => None,
        }
    }

    #[must_use]
    pub fn update_count(&self) -> Option<u64> {
        match self {
            Segment::UpdateCount(count) => Some(*count),
            Segment::Row(_) => None,
        }
    }
}

type SegmentFilter = Box<dyn FnMut(&Segment) -> bool + Send>;

enum Body {
    Rows(RowStream),
    Update(u64),
    UpdateWithKeys { count: u64, keys: RowStream },
}

/// Outcome of one statement execution against one binding group.
///
/// Consumed by value: row data can be read once.
pub struct QueryResult {
    body: Body,
    filter: Option<SegmentFilter>,
}

impl QueryResult {
    pub(crate) fn rows(rows: RowStream) -> Self {
        Self::from_body(Body::Rows(rows))
    }

    pub(crate) fn update(count: u64) -> Self {
        Self::from_body(Body::Update(count))
    }

    pub(crate) fn update_with_keys(count: u64, keys: RowStream) -> Self {
        Self::from_body(Body::UpdateWithKeys { count, keys })
    }

    fn from_body(body: Body) -> Self {
        Self { body, filter: None }
    }

    /// The update count, or `None` for a query.
    #[must_use]
    pub fn rows_updated(&self) -> Option<u64> {
        match &self.body {
            Body::Rows(_) => None,
            Body::Update(count) | Body::UpdateWithKeys { count, .. } => Some(*count),
        }
    }

    /// Columns of the row data (query rows or generated keys), if there is any.
    #[must_use]
    pub fn metadata(&self) -> Option<&RowMetadata> {
        match &self.body {
            Body::Rows(rows) | Body::UpdateWithKeys { keys: rows, .. } => Some(rows.metadata()),
            Body::Update(_) => None,
        }
    }

    /// Apply `f` to every row. Segment filters do not apply here.
    pub fn map<T, F>(self, mut f: F) -> BoxStream<'static, Result<T, BridgeError>>
    where
        T: Send + 'static,
        F: FnMut(Row, &RowMetadata) -> T + Send + 'static,
    {
        match self.body {
            Body::Rows(rows) | Body::UpdateWithKeys { keys: rows, .. } => {
                let metadata = rows.shared_metadata();
                rows.map(move |row| row.map(|row| f(row, &metadata)))
                    .boxed()
            }
            Body::Update(_) => stream::empty().boxed(),
        }
    }

    /// Keep only the segments accepted by `predicate`. Nothing runs until a terminal call.
    #[must_use]
    pub fn filter<P>(self, mut predicate: P) -> Self
    where
        P: FnMut(&Segment) -> bool + Send + 'static,
    {
        let filter: SegmentFilter = match self.filter {
            Some(mut previous) => Box::new(move |s| previous(s) && predicate(s)),
            None => Box::new(predicate),
        };
        Self {
            body: self.body,
            filter: Some(filter),
        }
    }

    /// Segments in order: rows first, then the update count. Filters apply.
    pub fn segments(self) -> BoxStream<'static, Result<Segment, BridgeError>> {
        let raw: BoxStream<'static, Result<Segment, BridgeError>> = match self.body {
            Body::Rows(rows) => rows.map(|row| row.map(Segment::Row)).boxed(),
            Body::Update(count) => {
                stream::once(future::ready(Ok(Segment::UpdateCount(count)))).boxed()
            }
            Body::UpdateWithKeys { count, keys } => keys
                .map(|row| row.map(Segment::Row))
                .chain(stream::once(future::ready(Ok(Segment::UpdateCount(count)))))
                .boxed(),
        };
        let raw = stop_after_error(raw);
        match self.filter {
            Some(mut keep) => raw
                .filter(move |item| future::ready(item.as_ref().map_or(true, |s| keep(s))))
                .boxed(),
            None => raw,
        }
    }

    /// Map every segment to a stream and concatenate them.
    ///
    /// A `None` from `f` fails the whole stream with `InvalidState`.
    pub fn flat_map<T, S, F>(self, mut f: F) -> BoxStream<'static, Result<T, BridgeError>>
    where
        T: Send + 'static,
        S: Stream<Item = T> + Send + 'static,
        F: FnMut(Segment) -> Option<S> + Send + 'static,
    {
        let mapped = self
            .segments()
            .map(move |segment| -> BoxStream<'static, Result<T, BridgeError>> {
                match segment.map(&mut f) {
                    Ok(Some(items)) => items.map(Ok).boxed(),
                    Ok(None) => stream::once(future::ready(Err(BridgeError::InvalidState(
                        "The mapper returned no stream".into(),
                    ))))
                    .boxed(),
                    Err(err) => stream::once(future::ready(Err(err))).boxed(),
                }
            })
            .flatten();
        stop_after_error(mapped)
    }
}

impl fmt::Debug for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("QueryResult");
        match &self.body {
            Body::Rows(rows) => d.field("rows", rows),
            Body::Update(count) => d.field("rows_updated", count),
            Body::UpdateWithKeys { count, keys } => {
                d.field("rows_updated", count).field("generated_keys", keys)
            }
        };
        d.field("filtered", &self.filter.is_some()).finish()
    }
}

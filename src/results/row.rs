use std::sync::Arc;

use crate::codecs::CodecRegistry;
use crate::engine::{SessionContext, Value};
use crate::error::BridgeError;
use crate::types::{FromHostValue, HostType, HostValue};

use super::metadata::RowMetadata;

/// One result row. Values stay native until a column is read.
#[derive(Debug, Clone)]
pub struct Row {
    values: Vec<Value>,
    metadata: Arc<RowMetadata>,
    codecs: Arc<CodecRegistry>,
    session: SessionContext,
}

impl Row {
    #[must_use]
    pub fn new(
        values: Vec<Value>,
        metadata: Arc<RowMetadata>,
        codecs: Arc<CodecRegistry>,
        session: SessionContext,
    ) -> Self {
        Self {
            values,
            metadata,
            codecs,
            session,
        }
    }

    #[must_use]
    pub fn metadata(&self) -> &RowMetadata {
        &self.metadata
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The undecoded native value at `index`.
    ///
    /// # Errors
    /// `InvalidArgument` if `index` is out of range.
    pub fn native(&self, index: usize) -> Result<&Value, BridgeError> {
        self.values.get(index).ok_or_else(|| {
            BridgeError::InvalidArgument(format!(
                "Column index {index} is larger than the number of columns {}",
                self.values.len()
            ))
        })
    }

    /// Decode column `index` as `T`; `None` for SQL `NULL`.
    ///
    /// # Errors
    /// `InvalidArgument` for a bad index, `UnsupportedType` when no codec turns the column into
    /// `T`, or the codec's own conversion failure.
    pub fn get<T: FromHostValue>(&self, index: usize) -> Result<Option<T>, BridgeError> {
        self.decode(index, T::HOST_TYPE)?
            .map(T::from_host)
            .transpose()
    }

    /// Decode the column named `name` (case-insensitive) as `T`.
    ///
    /// # Errors
    /// See [`Row::get`]; an unknown name is `InvalidArgument`.
    pub fn get_by_name<T: FromHostValue>(&self, name: &str) -> Result<Option<T>, BridgeError> {
        self.get(self.metadata.index_of(name)?)
    }

    /// Decode column `index` into whatever host type the registry prefers for it.
    ///
    /// # Errors
    /// See [`Row::get`].
    pub fn get_value(&self, index: usize) -> Result<Option<HostValue>, BridgeError> {
        self.decode(index, HostType::Any)
    }

    /// # Errors
    /// See [`Row::get_by_name`].
    pub fn get_value_by_name(&self, name: &str) -> Result<Option<HostValue>, BridgeError> {
        self.get_value(self.metadata.index_of(name)?)
    }

    fn decode(&self, index: usize, target: HostType) -> Result<Option<HostValue>, BridgeError> {
        let value = self.native(index)?;
        self.codecs
            .decode(value, value.type_tag(), target, &self.session)
    }
}

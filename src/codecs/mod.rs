//! Conversion between native engine values and host values.
//!
//! A [`CodecRegistry`] is an ordered list of [`Codec`]s scanned front to back; the first codec
//! that claims a request handles it. Composite codecs (arrays, parameters) recurse back into the
//! registry, so they sit after every scalar codec.

mod composite;
mod numeric;
mod temporal;
mod text;

use std::fmt;

use tracing::debug;

use crate::config::CodecOptions;
use crate::engine::{SessionContext, TypeTag, Value};
use crate::error::BridgeError;
use crate::types::{HostType, HostValue};

pub use composite::{ArrayCodec, EnumCodec, GeometryCodec, ParameterCodec};
pub use numeric::{
    BoolCodec, DecimalCodec, F32Codec, F64Codec, I8Codec, I16Codec, I32Codec, I64Codec,
};
pub use temporal::{
    DateCodec, DateTimeCodec, DurationCodec, InstantCodec, IntervalCodec, OffsetDateTimeCodec,
    OffsetTimeCodec, PeriodCodec, TimeCodec,
};
pub use text::{BlobCodec, BytesCodec, ClobCodec, JsonCodec, StringCodec, UuidCodec};

/// What a codec gets to see besides the value: the registry (for element types) and the
/// session settings.
#[derive(Clone, Copy)]
pub struct CodecContext<'a> {
    pub registry: &'a CodecRegistry,
    pub session: &'a SessionContext,
}

/// Converts between one host type and the native tags it understands.
///
/// Implementors provide the `do_*` primitives; null handling and type matching are shared.
pub trait Codec: Send + Sync {
    /// Short, unique name used in diagnostics.
    fn name(&self) -> &'static str;

    /// The one host type this codec produces and consumes.
    fn host_type(&self) -> HostType;

    fn do_can_decode(&self, tag: TypeTag) -> bool;

    /// Decode a non-null value.
    ///
    /// # Errors
    /// Engine conversion failures, or `InvalidArgument` when the session lacks a capability.
    fn do_decode(&self, value: &Value, ctx: CodecContext<'_>) -> Result<HostValue, BridgeError>;

    /// # Errors
    /// `UnsupportedType` if `value` is not this codec's host type, or any conversion failure.
    fn do_encode(&self, value: &HostValue, ctx: CodecContext<'_>) -> Result<Value, BridgeError>;

    fn can_decode(&self, tag: TypeTag, target: HostType) -> bool {
        target.is_assignable_from(self.host_type()) && self.do_can_decode(tag)
    }

    fn can_encode(&self, value: &HostValue) -> bool {
        value.host_type() == self.host_type()
    }

    fn can_encode_null(&self, target: HostType) -> bool {
        self.host_type().is_assignable_from(target)
    }

    /// Decode `value`, short-circuiting native nulls to `None`.
    ///
    /// # Errors
    /// See [`Codec::do_decode`].
    fn decode(
        &self,
        value: &Value,
        ctx: CodecContext<'_>,
    ) -> Result<Option<HostValue>, BridgeError> {
        if value.is_null() {
            return Ok(None);
        }
        self.do_decode(value, ctx).map(Some)
    }

    /// # Errors
    /// See [`Codec::do_encode`].
    fn encode(&self, value: &HostValue, ctx: CodecContext<'_>) -> Result<Value, BridgeError> {
        self.do_encode(value, ctx)
    }

    fn encode_null(&self) -> Value {
        Value::Null
    }
}

impl fmt::Debug for dyn Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}>", self.name(), self.host_type())
    }
}

pub(crate) fn unexpected(codec: &dyn Codec, value: &HostValue) -> BridgeError {
    BridgeError::UnsupportedType(format!(
        "{} cannot encode a value of type {}",
        codec.name(),
        value.host_type()
    ))
}

/// Ordered, immutable list of codecs.
#[derive(Debug)]
pub struct CodecRegistry {
    codecs: Vec<Box<dyn Codec>>,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new(&CodecOptions::default())
    }
}

impl CodecRegistry {
    /// Baseline codecs, then whatever `options` enables, then the composite codecs.
    #[must_use]
    pub fn new(options: &CodecOptions) -> Self {
        let mut codecs = baseline_codecs();
        codecs.extend(optional_codecs(options));
        codecs.extend(composite_codecs());
        debug!(codecs = codecs.len(), geometry = options.geometry, "codec registry built");
        Self { codecs }
    }

    /// A registry with exactly these codecs, in this priority order.
    #[must_use]
    pub fn from_codecs(codecs: Vec<Box<dyn Codec>>) -> Self {
        Self { codecs }
    }

    /// Codec names in priority order.
    #[must_use]
    pub fn codec_names(&self) -> Vec<&'static str> {
        self.codecs.iter().map(|c| c.name()).collect()
    }

    fn context<'a>(&'a self, session: &'a SessionContext) -> CodecContext<'a> {
        CodecContext {
            registry: self,
            session,
        }
    }

    /// Decode `value` (whose native type is `tag`) into `target`.
    ///
    /// Native nulls decode to `None` without consulting any codec.
    ///
    /// # Errors
    /// `UnsupportedType` if no codec claims `(tag, target)`; otherwise the codec's failure.
    pub fn decode(
        &self,
        value: &Value,
        tag: TypeTag,
        target: HostType,
        session: &SessionContext,
    ) -> Result<Option<HostValue>, BridgeError> {
        if value.is_null() {
            return Ok(None);
        }
        let codec = self
            .codecs
            .iter()
            .find(|c| c.can_decode(tag, target))
            .ok_or_else(|| {
                BridgeError::UnsupportedType(format!(
                    "Cannot decode value of native type {tag} into {target}"
                ))
            })?;
        codec.decode(value, self.context(session))
    }

    /// Encode a host value.
    ///
    /// # Errors
    /// `UnsupportedType` if no codec claims the value's type.
    pub fn encode(
        &self,
        value: &HostValue,
        session: &SessionContext,
    ) -> Result<Value, BridgeError> {
        let codec = self
            .codecs
            .iter()
            .find(|c| c.can_encode(value))
            .ok_or_else(|| {
                BridgeError::UnsupportedType(format!(
                    "Cannot encode parameter of type {}",
                    value.host_type()
                ))
            })?;
        codec.encode(value, self.context(session))
    }

    /// Native null for a declared host type.
    ///
    /// # Errors
    /// `UnsupportedType` if no codec claims `target`.
    pub fn encode_null(&self, target: HostType) -> Result<Value, BridgeError> {
        self.codecs
            .iter()
            .find(|c| c.can_encode_null(target))
            .map(|c| c.encode_null())
            .ok_or_else(|| {
                BridgeError::UnsupportedType(format!(
                    "Cannot encode null parameter of type {target}"
                ))
            })
    }

    /// Canonical host type for a native tag when the caller has no preference.
    #[must_use]
    pub fn preferred_type(&self, tag: TypeTag) -> Option<HostType> {
        if tag == TypeTag::Null {
            return Some(HostType::Void);
        }
        self.codecs
            .iter()
            .find(|c| c.can_decode(tag, HostType::Any))
            .map(|c| c.host_type())
    }
}

fn baseline_codecs() -> Vec<Box<dyn Codec>> {
    vec![
        Box::new(DecimalCodec),
        Box::new(BoolCodec),
        Box::new(I8Codec),
        Box::new(BytesCodec),
        Box::new(BlobCodec),
        Box::new(F64Codec),
        Box::new(F32Codec),
        Box::new(I32Codec),
        Box::new(JsonCodec),
        Box::new(DateCodec),
        Box::new(DateTimeCodec),
        Box::new(TimeCodec),
        Box::new(I64Codec),
        Box::new(OffsetDateTimeCodec),
        Box::new(OffsetTimeCodec),
        Box::new(I16Codec),
        Box::new(StringCodec),
        Box::new(ClobCodec),
        Box::new(UuidCodec),
        Box::new(InstantCodec),
        Box::new(IntervalCodec),
        Box::new(PeriodCodec),
        Box::new(DurationCodec),
        Box::new(EnumCodec),
    ]
}

fn optional_codecs(options: &CodecOptions) -> Vec<Box<dyn Codec>> {
    let mut codecs: Vec<Box<dyn Codec>> = Vec::new();
    if options.geometry {
        codecs.push(Box::new(GeometryCodec));
    }
    codecs
}

// must stay last: both recurse into the registry
fn composite_codecs() -> Vec<Box<dyn Codec>> {
    vec![Box::new(ArrayCodec), Box::new(ParameterCodec)]
}

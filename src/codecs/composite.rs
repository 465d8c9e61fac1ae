use super::{Codec, CodecContext, unexpected};
use crate::engine::{EnumValue, TypeTag, Value};
use crate::error::BridgeError;
use crate::types::{EnumHost, Geometry, HostType, HostValue};

/// `ENUM` <-> [`EnumHost`].
///
/// The native enum value is keyed by the complete member list plus an ordinal, so encoding
/// needs every declared member, not just the selected one.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumCodec;

impl Codec for EnumCodec {
    fn name(&self) -> &'static str {
        "enum"
    }

    fn host_type(&self) -> HostType {
        HostType::Enum
    }

    fn do_can_decode(&self, tag: TypeTag) -> bool {
        tag == TypeTag::Enum
    }

    fn do_decode(&self, value: &Value, _ctx: CodecContext<'_>) -> Result<HostValue, BridgeError> {
        match value {
            Value::Enum(e) => Ok(HostValue::Enum(EnumHost {
                name: e.label().to_string(),
                members: e.members().to_vec(),
            })),
            other => Err(other.conversion_error("ENUM").into()),
        }
    }

    fn do_encode(&self, value: &HostValue, _ctx: CodecContext<'_>) -> Result<Value, BridgeError> {
        let HostValue::Enum(host) = value else {
            return Err(unexpected(self, value));
        };
        let native = EnumValue::from_members(host.members.iter().cloned(), &host.name)?;
        Ok(Value::Enum(native))
    }
}

/// `ARRAY` <-> `Vec<Option<HostValue>>`; elements go back through the registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayCodec;

impl Codec for ArrayCodec {
    fn name(&self) -> &'static str {
        "array"
    }

    fn host_type(&self) -> HostType {
        HostType::Array
    }

    fn do_can_decode(&self, tag: TypeTag) -> bool {
        tag == TypeTag::Array
    }

    fn do_decode(&self, value: &Value, ctx: CodecContext<'_>) -> Result<HostValue, BridgeError> {
        let Value::Array(items) = value else {
            return Err(value.conversion_error("ARRAY").into());
        };
        items
            .iter()
            .map(|item| {
                ctx.registry
                    .decode(item, item.type_tag(), HostType::Any, ctx.session)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(HostValue::Array)
    }

    fn do_encode(&self, value: &HostValue, ctx: CodecContext<'_>) -> Result<Value, BridgeError> {
        let HostValue::Array(items) = value else {
            return Err(unexpected(self, value));
        };
        items
            .iter()
            .map(|item| match item {
                Some(v) => ctx.registry.encode(v, ctx.session),
                None => Ok(Value::Null),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

/// Unwraps a [`Parameter`](crate::types::Parameter): its value is encoded by whichever codec
/// claims it, a typed null by whichever codec claims the declared type. Decodes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterCodec;

impl Codec for ParameterCodec {
    fn name(&self) -> &'static str {
        "parameter"
    }

    fn host_type(&self) -> HostType {
        HostType::Parameter
    }

    fn do_can_decode(&self, _tag: TypeTag) -> bool {
        false
    }

    fn do_decode(&self, value: &Value, _ctx: CodecContext<'_>) -> Result<HostValue, BridgeError> {
        Err(BridgeError::UnsupportedType(format!(
            "parameter codec cannot decode {}",
            value.type_tag()
        )))
    }

    fn do_encode(&self, value: &HostValue, ctx: CodecContext<'_>) -> Result<Value, BridgeError> {
        let HostValue::Parameter(parameter) = value else {
            return Err(unexpected(self, value));
        };
        match &parameter.value {
            Some(inner) => ctx.registry.encode(inner, ctx.session),
            None => ctx.registry.encode_null(parameter.host_type),
        }
    }
}

/// `GEOMETRY` <-> [`Geometry`] (WKT). Registered only when enabled in
/// [`CodecOptions`](crate::config::CodecOptions).
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometryCodec;

impl Codec for GeometryCodec {
    fn name(&self) -> &'static str {
        "geometry"
    }

    fn host_type(&self) -> HostType {
        HostType::Geometry
    }

    fn do_can_decode(&self, tag: TypeTag) -> bool {
        tag == TypeTag::Geometry
    }

    fn do_decode(&self, value: &Value, _ctx: CodecContext<'_>) -> Result<HostValue, BridgeError> {
        Ok(HostValue::Geometry(Geometry::new(value.get_string()?)))
    }

    fn do_encode(&self, value: &HostValue, _ctx: CodecContext<'_>) -> Result<Value, BridgeError> {
        match value {
            HostValue::Geometry(g) => Ok(Value::Geometry(g.wkt.clone())),
            other => Err(unexpected(self, other)),
        }
    }
}

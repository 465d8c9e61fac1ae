//! Boolean and numeric codecs.
//!
//! Decoding goes through the engine's own accessors (`get_int`, `get_double`, ...), so any
//! widening, narrowing, or range failure is exactly what the engine defines.

use super::{Codec, CodecContext, unexpected};
use crate::engine::{TypeTag, Value};
use crate::error::BridgeError;
use crate::types::{HostType, HostValue};

macro_rules! scalar_codec {
    (
        $(#[$meta:meta])*
        $codec:ident, $name:literal, $variant:ident, [$($tag:ident),+],
        $accessor:ident, $native:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $codec;

        impl Codec for $codec {
            fn name(&self) -> &'static str {
                $name
            }

            fn host_type(&self) -> HostType {
                HostType::$variant
            }

            fn do_can_decode(&self, tag: TypeTag) -> bool {
                matches!(tag, $(TypeTag::$tag)|+)
            }

            fn do_decode(
                &self,
                value: &Value,
                _ctx: CodecContext<'_>,
            ) -> Result<HostValue, BridgeError> {
                Ok(HostValue::$variant(value.$accessor()?))
            }

            fn do_encode(
                &self,
                value: &HostValue,
                _ctx: CodecContext<'_>,
            ) -> Result<Value, BridgeError> {
                match value {
                    HostValue::$variant(v) => Ok(Value::$native(*v)),
                    other => Err(unexpected(self, other)),
                }
            }
        }
    };
}

scalar_codec!(
    /// `BOOLEAN` <-> `bool`.
    BoolCodec, "bool", Bool, [Boolean], get_boolean, Boolean
);
scalar_codec!(
    /// `TINYINT` <-> `i8`.
    I8Codec, "i8", I8, [TinyInt], get_byte, TinyInt
);
scalar_codec!(I16Codec, "i16", I16, [SmallInt], get_short, SmallInt);
scalar_codec!(I32Codec, "i32", I32, [Integer], get_int, Integer);
scalar_codec!(I64Codec, "i64", I64, [BigInt], get_long, BigInt);
scalar_codec!(F32Codec, "f32", F32, [Real], get_float, Real);
scalar_codec!(
    /// `DOUBLE PRECISION` <-> `f64`.
    F64Codec, "f64", F64, [Double], get_double, Double
);
scalar_codec!(
    /// `NUMERIC` <-> [`rust_decimal::Decimal`], exact at the engine's scale.
    DecimalCodec, "decimal", Decimal, [Numeric], get_decimal, Numeric
);

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::codecs::CodecRegistry;
    use crate::engine::SessionContext;

    fn round_trip(codec: &dyn Codec, value: HostValue, tag: TypeTag) {
        let registry = CodecRegistry::default();
        let session = SessionContext::new();
        let ctx = CodecContext {
            registry: &registry,
            session: &session,
        };
        let encoded = codec.encode(&value, ctx).unwrap();
        assert_eq!(encoded.type_tag(), tag);
        assert!(codec.can_decode(tag, codec.host_type()));
        assert_eq!(codec.decode(&encoded, ctx).unwrap(), Some(value));
        assert_eq!(codec.decode(&Value::Null, ctx).unwrap(), None);
        assert_eq!(codec.encode_null(), Value::Null);
    }

    #[test]
    fn numeric_round_trips() {
        round_trip(&BoolCodec, HostValue::Bool(true), TypeTag::Boolean);
        round_trip(&I8Codec, HostValue::I8(i8::MIN), TypeTag::TinyInt);
        round_trip(&I16Codec, HostValue::I16(i16::MAX), TypeTag::SmallInt);
        round_trip(&I32Codec, HostValue::I32(-100), TypeTag::Integer);
        round_trip(&I64Codec, HostValue::I64(i64::MAX), TypeTag::BigInt);
        round_trip(&F32Codec, HostValue::F32(1.5), TypeTag::Real);
        round_trip(&F64Codec, HostValue::F64(-0.25), TypeTag::Double);
        round_trip(
            &DecimalCodec,
            HostValue::Decimal(Decimal::new(123_456, 3)),
            TypeTag::Numeric,
        );
    }

    #[test]
    fn decode_only_claims_its_own_tag() {
        assert!(I32Codec.can_decode(TypeTag::Integer, HostType::Any));
        assert!(!I32Codec.can_decode(TypeTag::BigInt, HostType::Any));
        assert!(!I32Codec.can_decode(TypeTag::Integer, HostType::I64));
    }

    #[test]
    fn encode_rejects_foreign_host_values() {
        let registry = CodecRegistry::default();
        let session = SessionContext::new();
        let ctx = CodecContext {
            registry: &registry,
            session: &session,
        };
        assert!(!I64Codec.can_encode(&HostValue::I32(1)));
        let err = I64Codec.encode(&HostValue::I32(1), ctx).unwrap_err();
        assert!(matches!(err, BridgeError::UnsupportedType(_)));
    }
}

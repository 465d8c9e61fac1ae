use uuid::Uuid;

use super::{Codec, CodecContext, unexpected};
use crate::engine::{EngineError, TypeTag, Value};
use crate::error::BridgeError;
use crate::types::{HostType, HostValue};

/// `CHAR`/`VARCHAR` <-> `String`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCodec;

impl Codec for StringCodec {
    fn name(&self) -> &'static str {
        "string"
    }

    fn host_type(&self) -> HostType {
        HostType::String
    }

    fn do_can_decode(&self, tag: TypeTag) -> bool {
        matches!(tag, TypeTag::Char | TypeTag::Varchar)
    }

    fn do_decode(&self, value: &Value, _ctx: CodecContext<'_>) -> Result<HostValue, BridgeError> {
        Ok(HostValue::String(value.get_string()?))
    }

    fn do_encode(&self, value: &HostValue, _ctx: CodecContext<'_>) -> Result<Value, BridgeError> {
        match value {
            HostValue::String(s) => Ok(Value::Varchar(s.clone())),
            other => Err(unexpected(self, other)),
        }
    }
}

/// `CLOB` -> `String`. Strings encode through [`StringCodec`], which sits earlier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClobCodec;

impl Codec for ClobCodec {
    fn name(&self) -> &'static str {
        "clob"
    }

    fn host_type(&self) -> HostType {
        HostType::String
    }

    fn do_can_decode(&self, tag: TypeTag) -> bool {
        tag == TypeTag::Clob
    }

    fn do_decode(&self, value: &Value, _ctx: CodecContext<'_>) -> Result<HostValue, BridgeError> {
        Ok(HostValue::String(value.get_string()?))
    }

    fn do_encode(&self, value: &HostValue, _ctx: CodecContext<'_>) -> Result<Value, BridgeError> {
        match value {
            HostValue::String(s) => Ok(Value::Clob(s.clone())),
            other => Err(unexpected(self, other)),
        }
    }
}

/// `BINARY`/`VARBINARY` <-> `Vec<u8>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesCodec;

impl Codec for BytesCodec {
    fn name(&self) -> &'static str {
        "bytes"
    }

    fn host_type(&self) -> HostType {
        HostType::Bytes
    }

    fn do_can_decode(&self, tag: TypeTag) -> bool {
        matches!(tag, TypeTag::Binary | TypeTag::Varbinary)
    }

    fn do_decode(&self, value: &Value, _ctx: CodecContext<'_>) -> Result<HostValue, BridgeError> {
        Ok(HostValue::Bytes(value.get_bytes()?))
    }

    fn do_encode(&self, value: &HostValue, _ctx: CodecContext<'_>) -> Result<Value, BridgeError> {
        match value {
            HostValue::Bytes(b) => Ok(Value::Varbinary(b.clone())),
            other => Err(unexpected(self, other)),
        }
    }
}

/// `BLOB` -> `Vec<u8>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlobCodec;

impl Codec for BlobCodec {
    fn name(&self) -> &'static str {
        "blob"
    }

    fn host_type(&self) -> HostType {
        HostType::Bytes
    }

    fn do_can_decode(&self, tag: TypeTag) -> bool {
        tag == TypeTag::Blob
    }

    fn do_decode(&self, value: &Value, _ctx: CodecContext<'_>) -> Result<HostValue, BridgeError> {
        Ok(HostValue::Bytes(value.get_bytes()?))
    }

    fn do_encode(&self, value: &HostValue, _ctx: CodecContext<'_>) -> Result<Value, BridgeError> {
        match value {
            HostValue::Bytes(b) => Ok(Value::Blob(b.clone())),
            other => Err(unexpected(self, other)),
        }
    }
}

/// `JSON` <-> `serde_json::Value`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn host_type(&self) -> HostType {
        HostType::Json
    }

    fn do_can_decode(&self, tag: TypeTag) -> bool {
        tag == TypeTag::Json
    }

    fn do_decode(&self, value: &Value, _ctx: CodecContext<'_>) -> Result<HostValue, BridgeError> {
        let text = value.get_string()?;
        let json = serde_json::from_str(&text)
            .map_err(|e| EngineError::data_conversion(format!("Invalid JSON document: {e}")))?;
        Ok(HostValue::Json(json))
    }

    fn do_encode(&self, value: &HostValue, _ctx: CodecContext<'_>) -> Result<Value, BridgeError> {
        match value {
            HostValue::Json(json) => Ok(Value::Json(json.to_string())),
            other => Err(unexpected(self, other)),
        }
    }
}

/// `UUID` <-> `uuid::Uuid`. Textual and 16-byte binary forms also decode.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidCodec;

impl Codec for UuidCodec {
    fn name(&self) -> &'static str {
        "uuid"
    }

    fn host_type(&self) -> HostType {
        HostType::Uuid
    }

    fn do_can_decode(&self, tag: TypeTag) -> bool {
        tag == TypeTag::Uuid
    }

    fn do_decode(&self, value: &Value, _ctx: CodecContext<'_>) -> Result<HostValue, BridgeError> {
        let uuid = match value {
            Value::Uuid(u) => *u,
            Value::Binary(b) | Value::Varbinary(b) => Uuid::from_slice(b)
                .map_err(|e| EngineError::data_conversion(e.to_string()))?,
            other => Uuid::parse_str(other.get_string()?.trim())
                .map_err(|e| EngineError::data_conversion(e.to_string()))?,
        };
        Ok(HostValue::Uuid(uuid))
    }

    fn do_encode(&self, value: &HostValue, _ctx: CodecContext<'_>) -> Result<Value, BridgeError> {
        match value {
            HostValue::Uuid(u) => Ok(Value::Uuid(*u)),
            other => Err(unexpected(self, other)),
        }
    }
}

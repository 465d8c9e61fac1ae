use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::engine::{Interval, OffsetTime};
use crate::error::BridgeError;

/// Host-side types a codec can produce or consume.
///
/// `Any` is the "no preference" target: every codec's type is assignable to it. `Void` is what
/// a native `NULL` column type maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostType {
    Any,
    Void,
    Bool,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Decimal,
    String,
    Bytes,
    Date,
    Time,
    OffsetTime,
    DateTime,
    OffsetDateTime,
    Instant,
    Uuid,
    Json,
    Interval,
    Period,
    Duration,
    Enum,
    Array,
    Geometry,
    Parameter,
}

impl HostType {
    /// Whether a value of type `other` may be handed out where `self` was requested.
    #[must_use]
    pub fn is_assignable_from(self, other: HostType) -> bool {
        self == HostType::Any || self == other
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HostType::Any => "any",
            HostType::Void => "void",
            HostType::Bool => "bool",
            HostType::I8 => "i8",
            HostType::I16 => "i16",
            HostType::I32 => "i32",
            HostType::I64 => "i64",
            HostType::F32 => "f32",
            HostType::F64 => "f64",
            HostType::Decimal => "rust_decimal::Decimal",
            HostType::String => "String",
            HostType::Bytes => "Vec<u8>",
            HostType::Date => "chrono::NaiveDate",
            HostType::Time => "chrono::NaiveTime",
            HostType::OffsetTime => "OffsetTime",
            HostType::DateTime => "chrono::NaiveDateTime",
            HostType::OffsetDateTime => "chrono::DateTime<FixedOffset>",
            HostType::Instant => "chrono::DateTime<Utc>",
            HostType::Uuid => "uuid::Uuid",
            HostType::Json => "serde_json::Value",
            HostType::Interval => "Interval",
            HostType::Period => "Period",
            HostType::Duration => "chrono::TimeDelta",
            HostType::Enum => "enum",
            HostType::Array => "array",
            HostType::Geometry => "Geometry",
            HostType::Parameter => "Parameter",
        };
        f.write_str(name)
    }
}

/// A year/month amount (`INTERVAL YEAR TO MONTH` family).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Period {
    pub years: i64,
    pub months: i64,
}

impl Period {
    #[must_use]
    pub fn new(years: i64, months: i64) -> Self {
        Self { years, months }
    }

    /// `None` when the month count does not fit an `i64`.
    #[must_use]
    pub fn total_months(&self) -> Option<i64> {
        self.years.checked_mul(12)?.checked_add(self.months)
    }
}

/// Geometry in (E)WKT text form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Geometry {
    pub wkt: String,
}

impl Geometry {
    #[must_use]
    pub fn new(wkt: impl Into<String>) -> Self {
        Self { wkt: wkt.into() }
    }
}

/// An enum member together with the full ordered member list of its type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumHost {
    pub name: String,
    pub members: Vec<String>,
}

/// Rust enums that map onto an SQL `ENUM` type.
///
/// ```rust
/// use sql_stream_bridge::types::SqlEnum;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Mood { Sad, Happy }
///
/// impl SqlEnum for Mood {
///     const MEMBERS: &'static [&'static str] = &["SAD", "HAPPY"];
///     fn ordinal(&self) -> usize { *self as usize }
///     fn from_ordinal(ordinal: usize) -> Option<Self> {
///         [Mood::Sad, Mood::Happy].get(ordinal).copied()
///     }
/// }
///
/// assert_eq!(Mood::from_name("HAPPY"), Some(Mood::Happy));
/// ```
pub trait SqlEnum: Sized {
    /// Member names in declaration order.
    const MEMBERS: &'static [&'static str];

    fn ordinal(&self) -> usize;

    fn from_ordinal(ordinal: usize) -> Option<Self>;

    fn name(&self) -> &'static str {
        Self::MEMBERS.get(self.ordinal()).copied().unwrap_or_default()
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::MEMBERS
            .iter()
            .position(|m| *m == name)
            .and_then(Self::from_ordinal)
    }
}

/// A bind value paired with its declared type; `value: None` is a typed null.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub value: Option<HostValue>,
    pub host_type: HostType,
}

impl Parameter {
    #[must_use]
    pub fn new(value: impl Into<HostValue>) -> Self {
        let value = value.into();
        Self {
            host_type: value.host_type(),
            value: Some(value),
        }
    }

    #[must_use]
    pub fn null(host_type: HostType) -> Self {
        Self {
            value: None,
            host_type,
        }
    }
}

/// A strongly-typed host value.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    String(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    OffsetTime(OffsetTime),
    DateTime(NaiveDateTime),
    OffsetDateTime(DateTime<FixedOffset>),
    Instant(DateTime<Utc>),
    Uuid(Uuid),
    Json(JsonValue),
    Interval(Interval),
    Period(Period),
    Duration(TimeDelta),
    Enum(EnumHost),
    Array(Vec<Option<HostValue>>),
    Geometry(Geometry),
    Parameter(Box<Parameter>),
}

impl HostValue {
    #[must_use]
    pub fn host_type(&self) -> HostType {
        match self {
            HostValue::Bool(_) => HostType::Bool,
            HostValue::I8(_) => HostType::I8,
            HostValue::I16(_) => HostType::I16,
            HostValue::I32(_) => HostType::I32,
            HostValue::I64(_) => HostType::I64,
            HostValue::F32(_) => HostType::F32,
            HostValue::F64(_) => HostType::F64,
            HostValue::Decimal(_) => HostType::Decimal,
            HostValue::String(_) => HostType::String,
            HostValue::Bytes(_) => HostType::Bytes,
            HostValue::Date(_) => HostType::Date,
            HostValue::Time(_) => HostType::Time,
            HostValue::OffsetTime(_) => HostType::OffsetTime,
            HostValue::DateTime(_) => HostType::DateTime,
            HostValue::OffsetDateTime(_) => HostType::OffsetDateTime,
            HostValue::Instant(_) => HostType::Instant,
            HostValue::Uuid(_) => HostType::Uuid,
            HostValue::Json(_) => HostType::Json,
            HostValue::Interval(_) => HostType::Interval,
            HostValue::Period(_) => HostType::Period,
            HostValue::Duration(_) => HostType::Duration,
            HostValue::Enum(_) => HostType::Enum,
            HostValue::Array(_) => HostType::Array,
            HostValue::Geometry(_) => HostType::Geometry,
            HostValue::Parameter(_) => HostType::Parameter,
        }
    }

    /// Host value for a Rust enum, carrying the whole member list.
    #[must_use]
    pub fn from_enum<E: SqlEnum>(value: &E) -> Self {
        HostValue::Enum(EnumHost {
            name: value.name().to_string(),
            members: E::MEMBERS.iter().map(|m| (*m).to_string()).collect(),
        })
    }

    fn mismatch(self, wanted: HostType) -> BridgeError {
        BridgeError::UnsupportedType(format!(
            "Cannot convert {} into {wanted}",
            self.host_type()
        ))
    }
}

impl From<Parameter> for HostValue {
    fn from(value: Parameter) -> Self {
        HostValue::Parameter(Box::new(value))
    }
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        HostValue::String(value.to_string())
    }
}

impl From<&[u8]> for HostValue {
    fn from(value: &[u8]) -> Self {
        HostValue::Bytes(value.to_vec())
    }
}

/// Typed extraction of a decoded [`HostValue`].
pub trait FromHostValue: Sized {
    /// The decode target requested from the codec registry.
    const HOST_TYPE: HostType;

    /// # Errors
    /// `UnsupportedType` when the decoded value has a different host type.
    fn from_host(value: HostValue) -> Result<Self, BridgeError>;
}

impl FromHostValue for HostValue {
    const HOST_TYPE: HostType = HostType::Any;

    fn from_host(value: HostValue) -> Result<Self, BridgeError> {
        Ok(value)
    }
}

impl FromHostValue for EnumHost {
    const HOST_TYPE: HostType = HostType::Enum;

    fn from_host(value: HostValue) -> Result<Self, BridgeError> {
        match value {
            HostValue::Enum(v) => Ok(v),
            other => Err(other.mismatch(Self::HOST_TYPE)),
        }
    }
}

impl<T: FromHostValue> FromHostValue for Vec<Option<T>> {
    const HOST_TYPE: HostType = HostType::Array;

    fn from_host(value: HostValue) -> Result<Self, BridgeError> {
        match value {
            HostValue::Array(items) => items
                .into_iter()
                .map(|item| item.map(T::from_host).transpose())
                .collect(),
            other => Err(other.mismatch(Self::HOST_TYPE)),
        }
    }
}

macro_rules! host_value_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for HostValue {
                fn from(value: $ty) -> Self {
                    HostValue::$variant(value)
                }
            }

            impl FromHostValue for $ty {
                const HOST_TYPE: HostType = HostType::$variant;

                fn from_host(value: HostValue) -> Result<Self, BridgeError> {
                    match value {
                        HostValue::$variant(v) => Ok(v),
                        other => Err(other.mismatch(Self::HOST_TYPE)),
                    }
                }
            }
        )*
    };
}

host_value_conversions!(
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    String => String,
    Vec<u8> => Bytes,
    NaiveDate => Date,
    NaiveTime => Time,
    OffsetTime => OffsetTime,
    NaiveDateTime => DateTime,
    DateTime<FixedOffset> => OffsetDateTime,
    DateTime<Utc> => Instant,
    Uuid => Uuid,
    JsonValue => Json,
    Interval => Interval,
    Period => Period,
    TimeDelta => Duration,
    Geometry => Geometry,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Suit {
        Hearts,
        Spades,
    }

    impl SqlEnum for Suit {
        const MEMBERS: &'static [&'static str] = &["HEARTS", "SPADES"];

        fn ordinal(&self) -> usize {
            *self as usize
        }

        fn from_ordinal(ordinal: usize) -> Option<Self> {
            [Suit::Hearts, Suit::Spades].get(ordinal).copied()
        }
    }

    #[test]
    fn any_accepts_every_host_type() {
        assert!(HostType::Any.is_assignable_from(HostType::I32));
        assert!(HostType::I32.is_assignable_from(HostType::I32));
        assert!(!HostType::I64.is_assignable_from(HostType::I32));
    }

    #[test]
    fn typed_extraction_is_strict() {
        assert_eq!(i32::from_host(HostValue::I32(5)).unwrap(), 5);
        let err = i64::from_host(HostValue::I32(5)).unwrap_err();
        assert!(matches!(err, BridgeError::UnsupportedType(_)));
    }

    #[test]
    fn arrays_extract_element_wise() {
        let value = HostValue::Array(vec![Some(HostValue::I32(1)), None]);
        let items = Vec::<Option<i32>>::from_host(value).unwrap();
        assert_eq!(items, vec![Some(1), None]);
    }

    #[test]
    fn enum_host_values_carry_every_member() {
        let HostValue::Enum(host) = HostValue::from_enum(&Suit::Spades) else {
            panic!("expected an enum host value");
        };
        assert_eq!(host.name, "SPADES");
        assert_eq!(host.members, vec!["HEARTS", "SPADES"]);
        assert_eq!(Suit::from_name("HEARTS"), Some(Suit::Hearts));
    }

    #[test]
    fn parameters_remember_their_type() {
        let p = Parameter::new(7_i64);
        assert_eq!(p.host_type, HostType::I64);
        assert_eq!(Parameter::null(HostType::Date).value, None);
    }
}

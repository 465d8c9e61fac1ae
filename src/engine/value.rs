use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use uuid::Uuid;

use super::EngineError;

/// Qualifier of an SQL interval value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalQualifier {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    YearToMonth,
    DayToHour,
    DayToMinute,
    DayToSecond,
    HourToMinute,
    HourToSecond,
    MinuteToSecond,
}

impl IntervalQualifier {
    /// `true` for the year/month family, `false` for the day/time family.
    #[must_use]
    pub fn is_year_month(self) -> bool {
        matches!(self, Self::Year | Self::Month | Self::YearToMonth)
    }
}

/// Runtime type tag of a native [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Null,
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Numeric,
    Char,
    Varchar,
    Clob,
    Binary,
    Varbinary,
    Blob,
    Date,
    Time,
    TimeTz,
    Timestamp,
    TimestampTz,
    Interval(IntervalQualifier),
    Json,
    Uuid,
    Enum,
    Array,
    Geometry,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Interval(q) => write!(f, "INTERVAL {q:?}"),
            other => write!(f, "{}", format!("{other:?}").to_uppercase()),
        }
    }
}

/// Native type tag plus precision and scale, as reported by a column descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    pub tag: TypeTag,
    pub precision: i64,
    pub scale: i32,
}

impl TypeInfo {
    #[must_use]
    pub fn new(tag: TypeTag, precision: i64, scale: i32) -> Self {
        Self {
            tag,
            precision,
            scale,
        }
    }

    /// Default precision/scale the engine reports for a tag.
    #[must_use]
    pub fn of(tag: TypeTag) -> Self {
        let (precision, scale) = match tag {
            TypeTag::Null => (1, 0),
            TypeTag::Boolean => (1, 0),
            TypeTag::TinyInt => (8, 0),
            TypeTag::SmallInt => (16, 0),
            TypeTag::Integer => (32, 0),
            TypeTag::BigInt => (64, 0),
            TypeTag::Real => (24, 0),
            TypeTag::Double => (53, 0),
            TypeTag::Numeric => (100_000, 0),
            TypeTag::Date => (10, 0),
            TypeTag::Time => (18, 9),
            TypeTag::TimeTz => (24, 9),
            TypeTag::Timestamp => (29, 9),
            TypeTag::TimestampTz => (35, 9),
            TypeTag::Interval(_) => (18, 9),
            TypeTag::Uuid => (16, 0),
            TypeTag::Char
            | TypeTag::Varchar
            | TypeTag::Clob
            | TypeTag::Binary
            | TypeTag::Varbinary
            | TypeTag::Blob
            | TypeTag::Json
            | TypeTag::Enum
            | TypeTag::Array
            | TypeTag::Geometry => (i64::from(i32::MAX), 0),
        };
        Self::new(tag, precision, scale)
    }
}

/// Interval value: sign, leading field and remaining (sub-field) part.
///
/// The `remaining` part is measured in the qualifier's trailing field; for qualifiers that end
/// in `SECOND` it is nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub qualifier: IntervalQualifier,
    pub negative: bool,
    pub leading: i64,
    pub remaining: i64,
}

const NANOS_PER_SECOND: i128 = 1_000_000_000;
const NANOS_PER_MINUTE: i128 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: i128 = 60 * NANOS_PER_MINUTE;
const NANOS_PER_DAY: i128 = 24 * NANOS_PER_HOUR;

impl Interval {
    #[must_use]
    pub fn new(qualifier: IntervalQualifier, negative: bool, leading: i64, remaining: i64) -> Self {
        Self {
            qualifier,
            negative,
            leading,
            remaining,
        }
    }

    /// Total length in months for year/month qualifiers.
    ///
    /// # Errors
    /// Fails for day/time qualifiers and when the month count overflows an `i64`.
    pub fn to_months(&self) -> Result<i64, EngineError> {
        let months = match self.qualifier {
            IntervalQualifier::Year => self.leading.checked_mul(12),
            IntervalQualifier::Month => Some(self.leading),
            IntervalQualifier::YearToMonth => self
                .leading
                .checked_mul(12)
                .and_then(|m| m.checked_add(self.remaining)),
            other => {
                return Err(EngineError::data_conversion(format!(
                    "INTERVAL {other:?} cannot be converted to months"
                )));
            }
        };
        let months = if self.negative {
            months.and_then(i64::checked_neg)
        } else {
            months
        };
        months.ok_or_else(|| EngineError::numeric_out_of_range("interval month count"))
    }

    /// Total length in nanoseconds for day/time qualifiers.
    ///
    /// # Errors
    /// Fails for year/month qualifiers.
    pub fn to_nanos(&self) -> Result<i128, EngineError> {
        let leading = i128::from(self.leading);
        let remaining = i128::from(self.remaining);
        let nanos = match self.qualifier {
            IntervalQualifier::Day => leading * NANOS_PER_DAY,
            IntervalQualifier::Hour => leading * NANOS_PER_HOUR,
            IntervalQualifier::Minute => leading * NANOS_PER_MINUTE,
            IntervalQualifier::Second => leading * NANOS_PER_SECOND + remaining,
            IntervalQualifier::DayToHour => (leading * 24 + remaining) * NANOS_PER_HOUR,
            IntervalQualifier::DayToMinute => (leading * 24 * 60 + remaining) * NANOS_PER_MINUTE,
            IntervalQualifier::DayToSecond => leading * NANOS_PER_DAY + remaining,
            IntervalQualifier::HourToMinute => (leading * 60 + remaining) * NANOS_PER_MINUTE,
            IntervalQualifier::HourToSecond => leading * NANOS_PER_HOUR + remaining,
            IntervalQualifier::MinuteToSecond => leading * NANOS_PER_MINUTE + remaining,
            other => {
                return Err(EngineError::data_conversion(format!(
                    "INTERVAL {other:?} cannot be converted to a duration"
                )));
            }
        };
        Ok(if self.negative { -nanos } else { nanos })
    }

    /// Build a `DAY TO SECOND` interval from a signed nanosecond count.
    ///
    /// # Errors
    /// Fails when the day count does not fit the leading field.
    pub fn day_to_second(nanos: i128) -> Result<Self, EngineError> {
        let negative = nanos < 0;
        let abs = nanos.unsigned_abs();
        let day = NANOS_PER_DAY.unsigned_abs();
        let leading = i64::try_from(abs / day)
            .map_err(|_| EngineError::numeric_out_of_range("interval day count"))?;
        let remaining = i64::try_from(abs % day)
            .map_err(|_| EngineError::numeric_out_of_range("interval remainder"))?;
        Ok(Self::new(
            IntervalQualifier::DayToSecond,
            negative,
            leading,
            remaining,
        ))
    }
}

/// Time of day with a fixed UTC offset (`TIME WITH TIME ZONE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetTime {
    pub time: NaiveTime,
    pub offset: FixedOffset,
}

impl OffsetTime {
    #[must_use]
    pub fn new(time: NaiveTime, offset: FixedOffset) -> Self {
        Self { time, offset }
    }
}

/// Enum value keyed by the closed, ordered member list of its column type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    label: String,
    ordinal: usize,
    members: Arc<[String]>,
}

impl EnumValue {
    /// Resolve `label` against the declared members of an enum type.
    ///
    /// Matching is exact first, then case-insensitive.
    ///
    /// # Errors
    /// Fails with a data-conversion error if `label` is not one of `members`.
    pub fn from_members<I, S>(members: I, label: &str) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members: Arc<[String]> = members.into_iter().map(Into::into).collect();
        let wanted = label.trim();
        let ordinal = members
            .iter()
            .position(|m| m == wanted)
            .or_else(|| members.iter().position(|m| m.eq_ignore_ascii_case(wanted)))
            .ok_or_else(|| {
                EngineError::data_conversion(format!(
                    "Value '{label}' is not permitted, expected one of ({})",
                    members.join(", ")
                ))
            })?;
        Ok(Self {
            label: members[ordinal].clone(),
            ordinal,
            members,
        })
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    #[must_use]
    pub fn members(&self) -> &[String] {
        &self.members
    }
}

/// A native engine value: runtime type tag plus payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    TinyInt(i8),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    Real(f32),
    Double(f64),
    Numeric(Decimal),
    Char(String),
    Varchar(String),
    Clob(String),
    Binary(Vec<u8>),
    Varbinary(Vec<u8>),
    Blob(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    TimeTz(OffsetTime),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<FixedOffset>),
    Interval(Interval),
    /// JSON document in its textual form.
    Json(String),
    Uuid(Uuid),
    Enum(EnumValue),
    Array(Vec<Value>),
    /// Geometry in (E)WKT form.
    Geometry(String),
}

impl Value {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Null => TypeTag::Null,
            Value::Boolean(_) => TypeTag::Boolean,
            Value::TinyInt(_) => TypeTag::TinyInt,
            Value::SmallInt(_) => TypeTag::SmallInt,
            Value::Integer(_) => TypeTag::Integer,
            Value::BigInt(_) => TypeTag::BigInt,
            Value::Real(_) => TypeTag::Real,
            Value::Double(_) => TypeTag::Double,
            Value::Numeric(_) => TypeTag::Numeric,
            Value::Char(_) => TypeTag::Char,
            Value::Varchar(_) => TypeTag::Varchar,
            Value::Clob(_) => TypeTag::Clob,
            Value::Binary(_) => TypeTag::Binary,
            Value::Varbinary(_) => TypeTag::Varbinary,
            Value::Blob(_) => TypeTag::Blob,
            Value::Date(_) => TypeTag::Date,
            Value::Time(_) => TypeTag::Time,
            Value::TimeTz(_) => TypeTag::TimeTz,
            Value::Timestamp(_) => TypeTag::Timestamp,
            Value::TimestampTz(_) => TypeTag::TimestampTz,
            Value::Interval(i) => TypeTag::Interval(i.qualifier),
            Value::Json(_) => TypeTag::Json,
            Value::Uuid(_) => TypeTag::Uuid,
            Value::Enum(_) => TypeTag::Enum,
            Value::Array(_) => TypeTag::Array,
            Value::Geometry(_) => TypeTag::Geometry,
        }
    }

    /// Engine accessor: value as `BOOLEAN`.
    ///
    /// # Errors
    /// Fails if the value has no boolean interpretation.
    pub fn get_boolean(&self) -> Result<bool, EngineError> {
        match self {
            Value::Boolean(b) => Ok(*b),
            Value::Char(s) | Value::Varchar(s) | Value::Clob(s) => {
                match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "t" | "yes" | "y" | "1" => Ok(true),
                    "false" | "f" | "no" | "n" | "0" => Ok(false),
                    _ => Err(self.conversion_error("BOOLEAN")),
                }
            }
            other => other.get_long().map(|v| v != 0),
        }
    }

    /// Engine accessor: value as `TINYINT`.
    ///
    /// # Errors
    /// Fails on non-numeric values or when the value is out of range.
    pub fn get_byte(&self) -> Result<i8, EngineError> {
        let v = self.get_long()?;
        i8::try_from(v).map_err(|_| EngineError::numeric_out_of_range(v.to_string()))
    }

    /// Engine accessor: value as `SMALLINT`.
    ///
    /// # Errors
    /// Fails on non-numeric values or when the value is out of range.
    pub fn get_short(&self) -> Result<i16, EngineError> {
        let v = self.get_long()?;
        i16::try_from(v).map_err(|_| EngineError::numeric_out_of_range(v.to_string()))
    }

    /// Engine accessor: value as `INTEGER`.
    ///
    /// # Errors
    /// Fails on non-numeric values or when the value is out of range.
    pub fn get_int(&self) -> Result<i32, EngineError> {
        let v = self.get_long()?;
        i32::try_from(v).map_err(|_| EngineError::numeric_out_of_range(v.to_string()))
    }

    /// Engine accessor: value as `BIGINT`. Fractional values are truncated.
    ///
    /// # Errors
    /// Fails on non-numeric values or when the value is out of range.
    pub fn get_long(&self) -> Result<i64, EngineError> {
        match self {
            Value::Boolean(b) => Ok(i64::from(*b)),
            Value::TinyInt(v) => Ok(i64::from(*v)),
            Value::SmallInt(v) => Ok(i64::from(*v)),
            Value::Integer(v) => Ok(i64::from(*v)),
            Value::BigInt(v) => Ok(*v),
            Value::Real(v) => float_to_long(f64::from(*v)),
            Value::Double(v) => float_to_long(*v),
            Value::Numeric(d) => d
                .trunc()
                .to_i64()
                .ok_or_else(|| EngineError::numeric_out_of_range(d.to_string())),
            Value::Char(s) | Value::Varchar(s) | Value::Clob(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| self.conversion_error("BIGINT")),
            _ => Err(self.conversion_error("BIGINT")),
        }
    }

    /// Engine accessor: value as `REAL`.
    ///
    /// # Errors
    /// Fails on non-numeric values.
    #[allow(clippy::cast_possible_truncation)]
    pub fn get_float(&self) -> Result<f32, EngineError> {
        match self {
            Value::Real(v) => Ok(*v),
            other => other.get_double().map(|v| v as f32),
        }
    }

    /// Engine accessor: value as `DOUBLE PRECISION`.
    ///
    /// # Errors
    /// Fails on non-numeric values.
    #[allow(clippy::cast_precision_loss)]
    pub fn get_double(&self) -> Result<f64, EngineError> {
        match self {
            Value::Real(v) => Ok(f64::from(*v)),
            Value::Double(v) => Ok(*v),
            Value::Numeric(d) => d
                .to_f64()
                .ok_or_else(|| EngineError::numeric_out_of_range(d.to_string())),
            Value::Char(s) | Value::Varchar(s) | Value::Clob(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| self.conversion_error("DOUBLE PRECISION")),
            other => other.get_long().map(|v| v as f64),
        }
    }

    /// Engine accessor: value as `NUMERIC`.
    ///
    /// # Errors
    /// Fails on non-numeric values.
    pub fn get_decimal(&self) -> Result<Decimal, EngineError> {
        match self {
            Value::Numeric(d) => Ok(*d),
            Value::Real(v) => Decimal::from_f32(*v).ok_or_else(|| self.conversion_error("NUMERIC")),
            Value::Double(v) => {
                Decimal::from_f64(*v).ok_or_else(|| self.conversion_error("NUMERIC"))
            }
            Value::Char(s) | Value::Varchar(s) | Value::Clob(s) => s
                .trim()
                .parse::<Decimal>()
                .map_err(|_| self.conversion_error("NUMERIC")),
            other => other.get_long().map(Decimal::from),
        }
    }

    /// Engine accessor: textual form of the value.
    ///
    /// # Errors
    /// Fails for binary and array values.
    pub fn get_string(&self) -> Result<String, EngineError> {
        Ok(match self {
            Value::Char(s)
            | Value::Varchar(s)
            | Value::Clob(s)
            | Value::Json(s)
            | Value::Geometry(s) => s.clone(),
            Value::Boolean(b) => b.to_string().to_uppercase(),
            Value::TinyInt(v) => v.to_string(),
            Value::SmallInt(v) => v.to_string(),
            Value::Integer(v) => v.to_string(),
            Value::BigInt(v) => v.to_string(),
            Value::Real(v) => v.to_string(),
            Value::Double(v) => v.to_string(),
            Value::Numeric(d) => d.to_string(),
            Value::Date(d) => d.format("%F").to_string(),
            Value::Time(t) => t.format("%T%.f").to_string(),
            Value::TimeTz(t) => format!("{}{}", t.time.format("%T%.f"), t.offset),
            Value::Timestamp(ts) => ts.format("%F %T%.f").to_string(),
            Value::TimestampTz(ts) => ts.format("%F %T%.f%:z").to_string(),
            Value::Uuid(u) => u.hyphenated().to_string(),
            Value::Enum(e) => e.label().to_string(),
            Value::Null | Value::Binary(_) | Value::Varbinary(_) | Value::Blob(_) => {
                return Err(self.conversion_error("CHARACTER VARYING"));
            }
            Value::Interval(_) | Value::Array(_) => {
                return Err(self.conversion_error("CHARACTER VARYING"));
            }
        })
    }

    /// Engine accessor: raw bytes of a binary value.
    ///
    /// # Errors
    /// Fails for non-binary values.
    pub fn get_bytes(&self) -> Result<Vec<u8>, EngineError> {
        match self {
            Value::Binary(b) | Value::Varbinary(b) | Value::Blob(b) => Ok(b.clone()),
            Value::Char(s) | Value::Varchar(s) | Value::Clob(s) => Ok(s.as_bytes().to_vec()),
            Value::Uuid(u) => Ok(u.as_bytes().to_vec()),
            _ => Err(self.conversion_error("BINARY VARYING")),
        }
    }

    pub(crate) fn conversion_error(&self, target: &str) -> EngineError {
        EngineError::data_conversion(format!(
            "Data conversion error converting {} to {target}",
            self.type_tag()
        ))
    }
}

#[allow(clippy::cast_possible_truncation)]
fn float_to_long(v: f64) -> Result<i64, EngineError> {
    let truncated = v.trunc();
    if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
        Ok(truncated as i64)
    } else {
        Err(EngineError::numeric_out_of_range(v.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_accessors_widen_and_range_check() {
        assert_eq!(Value::TinyInt(7).get_long().unwrap(), 7);
        assert_eq!(Value::BigInt(300).get_short().unwrap(), 300);
        assert!(Value::BigInt(300).get_byte().is_err());
        assert_eq!(Value::Double(2.9).get_int().unwrap(), 2);
        assert_eq!(Value::Varchar(" 42 ".into()).get_int().unwrap(), 42);
    }

    #[test]
    fn enum_value_resolves_against_members() {
        let value = EnumValue::from_members(["RED", "GREEN", "BLUE"], "green").unwrap();
        assert_eq!(value.label(), "GREEN");
        assert_eq!(value.ordinal(), 1);
        assert_eq!(value.members().len(), 3);
        assert!(EnumValue::from_members(["RED"], "PURPLE").is_err());
    }

    #[test]
    fn interval_lengths() {
        let ym = Interval::new(IntervalQualifier::YearToMonth, true, 1, 2);
        assert_eq!(ym.to_months().unwrap(), -14);
        assert!(ym.to_nanos().is_err());
        let huge = Interval::new(IntervalQualifier::Year, false, i64::MAX / 6, 0);
        assert_eq!(huge.to_months().unwrap_err().sql_state, "22003");

        let ds = Interval::day_to_second(NANOS_PER_DAY + 5).unwrap();
        assert_eq!(ds.leading, 1);
        assert_eq!(ds.remaining, 5);
        assert_eq!(ds.to_nanos().unwrap(), NANOS_PER_DAY + 5);
    }

    #[test]
    fn type_tags_follow_payload() {
        assert_eq!(Value::Null.type_tag(), TypeTag::Null);
        assert_eq!(
            Value::Interval(Interval::new(IntervalQualifier::Hour, false, 3, 0)).type_tag(),
            TypeTag::Interval(IntervalQualifier::Hour)
        );
        assert_eq!(TypeInfo::of(TypeTag::Integer).precision, 32);
    }
}

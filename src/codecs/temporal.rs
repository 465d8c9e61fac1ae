//! Date, time, timestamp and interval codecs.
//!
//! Zoned targets (`Instant`, `DateTime<FixedOffset>`) can also read zoneless `TIMESTAMP`
//! values, but only when the session supplies a time zone.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta, Utc};

use super::{Codec, CodecContext, unexpected};
use crate::engine::{EngineError, Interval, IntervalQualifier, TypeTag, Value};
use crate::error::BridgeError;
use crate::types::{HostType, HostValue, Period};

const NANOS_PER_SECOND: i128 = 1_000_000_000;

fn session_zone(ctx: CodecContext<'_>) -> Result<FixedOffset, BridgeError> {
    ctx.session.time_zone().ok_or_else(|| {
        BridgeError::InvalidArgument(
            "The session must provide a time zone to interpret zoneless timestamps".into(),
        )
    })
}

fn zoned(value: &Value, ctx: CodecContext<'_>) -> Result<DateTime<FixedOffset>, BridgeError> {
    match value {
        Value::TimestampTz(ts) => Ok(*ts),
        Value::Timestamp(ts) => attach_zone(*ts, session_zone(ctx)?),
        other => Err(other.conversion_error("TIMESTAMP WITH TIME ZONE").into()),
    }
}

fn attach_zone(ts: NaiveDateTime, zone: FixedOffset) -> Result<DateTime<FixedOffset>, BridgeError> {
    ts.and_local_timezone(zone).single().ok_or_else(|| {
        EngineError::data_conversion(format!("{ts} does not exist in time zone {zone}")).into()
    })
}

/// `DATE` <-> `chrono::NaiveDate`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateCodec;

impl Codec for DateCodec {
    fn name(&self) -> &'static str {
        "date"
    }

    fn host_type(&self) -> HostType {
        HostType::Date
    }

    fn do_can_decode(&self, tag: TypeTag) -> bool {
        tag == TypeTag::Date
    }

    fn do_decode(&self, value: &Value, _ctx: CodecContext<'_>) -> Result<HostValue, BridgeError> {
        let date = match value {
            Value::Date(d) => *d,
            Value::Timestamp(ts) => ts.date(),
            Value::TimestampTz(ts) => ts.date_naive(),
            other => return Err(other.conversion_error("DATE").into()),
        };
        Ok(HostValue::Date(date))
    }

    fn do_encode(&self, value: &HostValue, _ctx: CodecContext<'_>) -> Result<Value, BridgeError> {
        match value {
            HostValue::Date(d) => Ok(Value::Date(*d)),
            other => Err(unexpected(self, other)),
        }
    }
}

/// `TIMESTAMP` <-> `chrono::NaiveDateTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeCodec;

impl Codec for DateTimeCodec {
    fn name(&self) -> &'static str {
        "datetime"
    }

    fn host_type(&self) -> HostType {
        HostType::DateTime
    }

    fn do_can_decode(&self, tag: TypeTag) -> bool {
        tag == TypeTag::Timestamp
    }

    fn do_decode(&self, value: &Value, _ctx: CodecContext<'_>) -> Result<HostValue, BridgeError> {
        let ts = match value {
            Value::Timestamp(ts) => *ts,
            Value::TimestampTz(ts) => ts.naive_local(),
            Value::Date(d) => d.and_time(chrono::NaiveTime::MIN),
            other => return Err(other.conversion_error("TIMESTAMP").into()),
        };
        Ok(HostValue::DateTime(ts))
    }

    fn do_encode(&self, value: &HostValue, _ctx: CodecContext<'_>) -> Result<Value, BridgeError> {
        match value {
            HostValue::DateTime(ts) => Ok(Value::Timestamp(*ts)),
            other => Err(unexpected(self, other)),
        }
    }
}

/// `TIME` <-> `chrono::NaiveTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeCodec;

impl Codec for TimeCodec {
    fn name(&self) -> &'static str {
        "time"
    }

    fn host_type(&self) -> HostType {
        HostType::Time
    }

    fn do_can_decode(&self, tag: TypeTag) -> bool {
        tag == TypeTag::Time
    }

    fn do_decode(&self, value: &Value, _ctx: CodecContext<'_>) -> Result<HostValue, BridgeError> {
        let time = match value {
            Value::Time(t) => *t,
            Value::TimeTz(t) => t.time,
            Value::Timestamp(ts) => ts.time(),
            other => return Err(other.conversion_error("TIME").into()),
        };
        Ok(HostValue::Time(time))
    }

    fn do_encode(&self, value: &HostValue, _ctx: CodecContext<'_>) -> Result<Value, BridgeError> {
        match value {
            HostValue::Time(t) => Ok(Value::Time(*t)),
            other => Err(unexpected(self, other)),
        }
    }
}

/// `TIME WITH TIME ZONE` <-> [`OffsetTime`](crate::engine::OffsetTime).
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetTimeCodec;

impl Codec for OffsetTimeCodec {
    fn name(&self) -> &'static str {
        "offset_time"
    }

    fn host_type(&self) -> HostType {
        HostType::OffsetTime
    }

    fn do_can_decode(&self, tag: TypeTag) -> bool {
        tag == TypeTag::TimeTz
    }

    fn do_decode(&self, value: &Value, _ctx: CodecContext<'_>) -> Result<HostValue, BridgeError> {
        match value {
            Value::TimeTz(t) => Ok(HostValue::OffsetTime(*t)),
            other => Err(other.conversion_error("TIME WITH TIME ZONE").into()),
        }
    }

    fn do_encode(&self, value: &HostValue, _ctx: CodecContext<'_>) -> Result<Value, BridgeError> {
        match value {
            HostValue::OffsetTime(t) => Ok(Value::TimeTz(*t)),
            other => Err(unexpected(self, other)),
        }
    }
}

/// `TIMESTAMP WITH TIME ZONE` <-> `chrono::DateTime<FixedOffset>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetDateTimeCodec;

impl Codec for OffsetDateTimeCodec {
    fn name(&self) -> &'static str {
        "offset_datetime"
    }

    fn host_type(&self) -> HostType {
        HostType::OffsetDateTime
    }

    fn do_can_decode(&self, tag: TypeTag) -> bool {
        matches!(tag, TypeTag::TimestampTz | TypeTag::Timestamp)
    }

    fn do_decode(&self, value: &Value, ctx: CodecContext<'_>) -> Result<HostValue, BridgeError> {
        zoned(value, ctx).map(HostValue::OffsetDateTime)
    }

    fn do_encode(&self, value: &HostValue, _ctx: CodecContext<'_>) -> Result<Value, BridgeError> {
        match value {
            HostValue::OffsetDateTime(ts) => Ok(Value::TimestampTz(*ts)),
            other => Err(unexpected(self, other)),
        }
    }
}

/// `TIMESTAMP WITH TIME ZONE` <-> `chrono::DateTime<Utc>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantCodec;

impl Codec for InstantCodec {
    fn name(&self) -> &'static str {
        "instant"
    }

    fn host_type(&self) -> HostType {
        HostType::Instant
    }

    fn do_can_decode(&self, tag: TypeTag) -> bool {
        matches!(tag, TypeTag::TimestampTz | TypeTag::Timestamp)
    }

    fn do_decode(&self, value: &Value, ctx: CodecContext<'_>) -> Result<HostValue, BridgeError> {
        zoned(value, ctx).map(|ts| HostValue::Instant(ts.with_timezone(&Utc)))
    }

    fn do_encode(&self, value: &HostValue, _ctx: CodecContext<'_>) -> Result<Value, BridgeError> {
        match value {
            HostValue::Instant(ts) => Ok(Value::TimestampTz(ts.fixed_offset())),
            other => Err(unexpected(self, other)),
        }
    }
}

/// Any `INTERVAL` <-> [`Interval`], unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalCodec;

impl Codec for IntervalCodec {
    fn name(&self) -> &'static str {
        "interval"
    }

    fn host_type(&self) -> HostType {
        HostType::Interval
    }

    fn do_can_decode(&self, tag: TypeTag) -> bool {
        matches!(tag, TypeTag::Interval(_))
    }

    fn do_decode(&self, value: &Value, _ctx: CodecContext<'_>) -> Result<HostValue, BridgeError> {
        match value {
            Value::Interval(i) => Ok(HostValue::Interval(*i)),
            other => Err(other.conversion_error("INTERVAL").into()),
        }
    }

    fn do_encode(&self, value: &HostValue, _ctx: CodecContext<'_>) -> Result<Value, BridgeError> {
        match value {
            HostValue::Interval(i) => Ok(Value::Interval(*i)),
            other => Err(unexpected(self, other)),
        }
    }
}

/// `INTERVAL YEAR`, `MONTH` and `YEAR TO MONTH` <-> [`Period`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodCodec;

impl Codec for PeriodCodec {
    fn name(&self) -> &'static str {
        "period"
    }

    fn host_type(&self) -> HostType {
        HostType::Period
    }

    fn do_can_decode(&self, tag: TypeTag) -> bool {
        matches!(tag, TypeTag::Interval(q) if q.is_year_month())
    }

    fn do_decode(&self, value: &Value, _ctx: CodecContext<'_>) -> Result<HostValue, BridgeError> {
        let Value::Interval(interval) = value else {
            return Err(value.conversion_error("INTERVAL YEAR TO MONTH").into());
        };
        let signed = |n: i64| -> Result<i64, BridgeError> {
            if interval.negative {
                n.checked_neg()
                    .ok_or_else(|| EngineError::numeric_out_of_range(n).into())
            } else {
                Ok(n)
            }
        };
        let period = match interval.qualifier {
            IntervalQualifier::Year => Period::new(signed(interval.leading)?, 0),
            IntervalQualifier::Month => Period::new(0, signed(interval.leading)?),
            IntervalQualifier::YearToMonth => {
                Period::new(signed(interval.leading)?, signed(interval.remaining)?)
            }
            _ => return Err(value.conversion_error("INTERVAL YEAR TO MONTH").into()),
        };
        Ok(HostValue::Period(period))
    }

    fn do_encode(&self, value: &HostValue, _ctx: CodecContext<'_>) -> Result<Value, BridgeError> {
        let HostValue::Period(period) = value else {
            return Err(unexpected(self, value));
        };
        let out_of_range = || {
            EngineError::numeric_out_of_range(format!(
                "{} years {} months",
                period.years, period.months
            ))
        };
        let total = period.total_months().ok_or_else(out_of_range)?;
        let abs = total.checked_abs().ok_or_else(out_of_range)?;
        let negative = total < 0;
        let interval = if period.months == 0 {
            Interval::new(IntervalQualifier::Year, negative, abs / 12, 0)
        } else if period.years == 0 {
            Interval::new(IntervalQualifier::Month, negative, abs, 0)
        } else {
            Interval::new(IntervalQualifier::YearToMonth, negative, abs / 12, abs % 12)
        };
        Ok(Value::Interval(interval))
    }
}

/// Day/time `INTERVAL`s <-> `chrono::TimeDelta`. Encodes as `INTERVAL DAY TO SECOND`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationCodec;

impl Codec for DurationCodec {
    fn name(&self) -> &'static str {
        "duration"
    }

    fn host_type(&self) -> HostType {
        HostType::Duration
    }

    fn do_can_decode(&self, tag: TypeTag) -> bool {
        matches!(tag, TypeTag::Interval(q) if !q.is_year_month())
    }

    fn do_decode(&self, value: &Value, _ctx: CodecContext<'_>) -> Result<HostValue, BridgeError> {
        let Value::Interval(interval) = value else {
            return Err(value.conversion_error("INTERVAL DAY TO SECOND").into());
        };
        let nanos = interval.to_nanos()?;
        let seconds = i64::try_from(nanos.div_euclid(NANOS_PER_SECOND))
            .map_err(|_| EngineError::numeric_out_of_range(nanos))?;
        let subsec = u32::try_from(nanos.rem_euclid(NANOS_PER_SECOND))
            .map_err(|_| EngineError::numeric_out_of_range(nanos))?;
        TimeDelta::new(seconds, subsec)
            .map(HostValue::Duration)
            .ok_or_else(|| EngineError::numeric_out_of_range(nanos).into())
    }

    fn do_encode(&self, value: &HostValue, _ctx: CodecContext<'_>) -> Result<Value, BridgeError> {
        let HostValue::Duration(delta) = value else {
            return Err(unexpected(self, value));
        };
        let nanos = i128::from(delta.num_seconds()) * NANOS_PER_SECOND
            + i128::from(delta.subsec_nanos());
        Ok(Value::Interval(Interval::day_to_second(nanos)?))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime, TimeZone};

    use super::*;
    use crate::codecs::CodecRegistry;
    use crate::engine::{OffsetTime, SessionContext};
    use crate::error::ErrorKind;

    fn check(session: SessionContext, f: impl FnOnce(CodecContext<'_>)) {
        let registry = CodecRegistry::default();
        f(CodecContext {
            registry: &registry,
            session: &session,
        });
    }

    fn round_trip(codec: &dyn Codec, value: HostValue, ctx: CodecContext<'_>) {
        let encoded = codec.encode(&value, ctx).unwrap();
        assert!(codec.can_decode(encoded.type_tag(), codec.host_type()));
        assert_eq!(codec.decode(&encoded, ctx).unwrap(), Some(value));
        assert_eq!(codec.decode(&Value::Null, ctx).unwrap(), None);
    }

    #[test]
    fn local_temporal_round_trips() {
        check(SessionContext::new(), |ctx| {
            let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
            let time = NaiveTime::from_hms_nano_opt(23, 59, 59, 123_456_789).unwrap();
            round_trip(&DateCodec, HostValue::Date(date), ctx);
            round_trip(&TimeCodec, HostValue::Time(time), ctx);
            round_trip(&DateTimeCodec, HostValue::DateTime(date.and_time(time)), ctx);
            let offset = FixedOffset::east_opt(3600).unwrap();
            round_trip(
                &OffsetTimeCodec,
                HostValue::OffsetTime(OffsetTime::new(time, offset)),
                ctx,
            );
        });
    }

    #[test]
    fn zoned_timestamps_round_trip_without_session_zone() {
        check(SessionContext::new(), |ctx| {
            let offset = FixedOffset::west_opt(5 * 3600).unwrap();
            let ts = offset.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap();
            round_trip(&OffsetDateTimeCodec, HostValue::OffsetDateTime(ts), ctx);
            round_trip(&InstantCodec, HostValue::Instant(ts.with_timezone(&Utc)), ctx);
        });
    }

    #[test]
    fn zoneless_timestamp_needs_session_zone() {
        let naive = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        check(SessionContext::new(), |ctx| {
            let err = InstantCodec
                .decode(&Value::Timestamp(naive), ctx)
                .unwrap_err();
            assert!(matches!(err, BridgeError::InvalidArgument(_)));
        });

        let zone = FixedOffset::east_opt(2 * 3600).unwrap();
        check(SessionContext::new().with_time_zone(zone), |ctx| {
            let decoded = InstantCodec.decode(&Value::Timestamp(naive), ctx).unwrap();
            let expected = Utc.with_ymd_and_hms(2020, 1, 1, 10, 0, 0).unwrap();
            assert_eq!(decoded, Some(HostValue::Instant(expected)));
        });
    }

    #[test]
    fn periods_keep_their_qualifier() {
        check(SessionContext::new(), |ctx| {
            let years = PeriodCodec
                .encode(&HostValue::Period(Period::new(3, 0)), ctx)
                .unwrap();
            assert_eq!(years.type_tag(), TypeTag::Interval(IntervalQualifier::Year));
            let months = PeriodCodec
                .encode(&HostValue::Period(Period::new(0, -4)), ctx)
                .unwrap();
            assert_eq!(
                months,
                Value::Interval(Interval::new(IntervalQualifier::Month, true, 4, 0))
            );
            round_trip(&PeriodCodec, HostValue::Period(Period::new(1, 6)), ctx);
            round_trip(&PeriodCodec, HostValue::Period(Period::new(-2, -3)), ctx);
        });
    }

    #[test]
    fn oversized_periods_fail_instead_of_overflowing() {
        check(SessionContext::new(), |ctx| {
            for period in [
                Period::new(i64::MAX / 2, 1),
                Period::new(i64::MIN, 0),
                Period::new(0, i64::MIN),
            ] {
                let err = PeriodCodec
                    .encode(&HostValue::Period(period), ctx)
                    .unwrap_err();
                assert_eq!(err.kind(), ErrorKind::EngineFailure, "{period:?}");
            }
            let err = PeriodCodec
                .decode(
                    &Value::Interval(Interval::new(IntervalQualifier::Month, true, i64::MIN, 0)),
                    ctx,
                )
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::EngineFailure);
        });
    }

    #[test]
    fn durations_round_trip_through_day_to_second() {
        check(SessionContext::new(), |ctx| {
            round_trip(
                &DurationCodec,
                HostValue::Duration(TimeDelta::days(2) + TimeDelta::nanoseconds(15)),
                ctx,
            );
            round_trip(
                &DurationCodec,
                HostValue::Duration(-TimeDelta::milliseconds(1500)),
                ctx,
            );
            let hours = Value::Interval(Interval::new(IntervalQualifier::Hour, false, 5, 0));
            assert_eq!(
                DurationCodec.decode(&hours, ctx).unwrap(),
                Some(HostValue::Duration(TimeDelta::hours(5)))
            );
        });
    }

    #[test]
    fn interval_families_do_not_overlap() {
        let ym = TypeTag::Interval(IntervalQualifier::YearToMonth);
        let ds = TypeTag::Interval(IntervalQualifier::DayToSecond);
        assert!(PeriodCodec.can_decode(ym, HostType::Any));
        assert!(!PeriodCodec.can_decode(ds, HostType::Any));
        assert!(DurationCodec.can_decode(ds, HostType::Any));
        assert!(!DurationCodec.can_decode(ym, HostType::Any));
        assert!(IntervalCodec.can_decode(ym, HostType::Interval));
    }
}

// Host -> literal

use crate::rex::{RelType, RexLiteral, RexValue, SqlType};
use strait_core::adapter::unrepresentable;
use strait_core::decimal::Decimal;
use strait_core::error::{AdapterError, Direction, LiteralError, Result};
use strait_core::time::{Date, IntervalDayTime, TimeOfDay, TimeUnit, Timestamp};
use strait_core::{Literal, Type};

/// Fractional precision given to every lifted day-time interval; the host
/// only keeps milliseconds, so anything finer would be invented.
pub const LIFTED_INTERVAL_PRECISION: u8 = 6;

fn host_mismatch(rex: &RexLiteral) -> AdapterError {
    AdapterError::HostMismatch {
        host_type: rex.ty.to_string(),
        value: format!("{:?}", rex.value),
    }
}

fn out_of_range(rex: &RexLiteral, reason: &str) -> AdapterError {
    unrepresentable(rex.ty.to_string(), Direction::Lift, reason)
}

/// `unscaled * 10^-from` re-expressed at scale `to`, if that is exact
fn rescale_exact(unscaled: i128, from: u8, to: u8) -> Option<i128> {
    if from <= to {
        let factor = 10i128.checked_pow(u32::from(to - from))?;
        unscaled.checked_mul(factor)
    } else {
        let divisor = 10i128.checked_pow(u32::from(from - to))?;
        (unscaled % divisor == 0).then(|| unscaled / divisor)
    }
}

fn integer<T: TryFrom<i128>>(rex: &RexLiteral, unscaled: i128, scale: u8) -> Result<T> {
    let whole = rescale_exact(unscaled, scale, 0)
        .ok_or_else(|| out_of_range(rex, "value has a fractional part"))?;
    T::try_from(whole).map_err(|_| out_of_range(rex, "value does not fit the declared width").into())
}

/// Map a host type to a type descriptor
pub fn lift_type(ty: &RelType) -> Result<Type> {
    let n = ty.nullable;
    let lifted = match &ty.sql {
        SqlType::Boolean => Type::bool(n),
        SqlType::TinyInt => Type::i8(n),
        SqlType::SmallInt => Type::i16(n),
        SqlType::Integer => Type::i32(n),
        SqlType::BigInt => Type::i64(n),
        SqlType::Real => Type::fp32(n),
        SqlType::Float | SqlType::Double => Type::fp64(n),
        SqlType::Decimal { precision, scale } => Type::decimal(*precision, *scale, n)?,
        SqlType::Char { length } => Type::fixed_char(*length, n),
        SqlType::VarChar { length: None } => Type::string(n),
        SqlType::VarChar {
            length: Some(length),
        } => Type::var_char(*length, n),
        SqlType::Binary { length } => Type::fixed_binary(*length, n),
        SqlType::VarBinary => Type::binary(n),
        SqlType::Date => Type::date(n),
        SqlType::Time { .. } => Type::time(n),
        SqlType::Timestamp { .. } => Type::timestamp(n),
        SqlType::Interval(qualifier) if qualifier.is_year_month() => Type::interval_year(n),
        SqlType::Interval(_) => Type::interval_day(n),
        SqlType::Array(element) => Type::list(lift_type(element)?, n),
        SqlType::Map(key, value) => Type::map(lift_type(key)?, lift_type(value)?, n),
        SqlType::Row(fields) => {
            let fields = fields
                .iter()
                .map(|(_, field)| lift_type(field))
                .collect::<Result<Vec<_>>>()?;
            Type::strukt(fields, n)
        }
        SqlType::Symbol => {
            return Err(unrepresentable("SYMBOL", Direction::Lift, "flag keywords are not values").into())
        }
    };
    Ok(lifted)
}

/// Map a host literal to a literal, recursing through composites in order
pub fn lift_literal(rex: &RexLiteral) -> Result<Literal> {
    let n = rex.ty.nullable;
    let literal = match (&rex.ty.sql, &rex.value) {
        (SqlType::Symbol, _) | (_, RexValue::Symbol(_)) => {
            return Err(out_of_range(rex, "flag keywords are not values").into())
        }
        (_, RexValue::Null) => Literal::typed_null(lift_type(&rex.ty)?)?,
        (SqlType::Boolean, RexValue::Boolean(v)) => Literal::bool(n, *v),
        (SqlType::TinyInt, RexValue::Exact { unscaled, scale }) => {
            Literal::i8(n, integer(rex, *unscaled, *scale)?)
        }
        (SqlType::SmallInt, RexValue::Exact { unscaled, scale }) => {
            Literal::i16(n, integer(rex, *unscaled, *scale)?)
        }
        (SqlType::Integer, RexValue::Exact { unscaled, scale }) => {
            Literal::i32(n, integer(rex, *unscaled, *scale)?)
        }
        (SqlType::BigInt, RexValue::Exact { unscaled, scale }) => {
            Literal::i64(n, integer(rex, *unscaled, *scale)?)
        }
        (SqlType::Real, RexValue::Approx(v)) => {
            let narrow = *v as f32;
            if v.is_finite() && !narrow.is_finite() {
                return Err(out_of_range(rex, "value does not fit REAL").into());
            }
            Literal::fp32(n, narrow)
        }
        (SqlType::Float | SqlType::Double, RexValue::Approx(v)) => Literal::fp64(n, *v),
        (SqlType::Decimal { precision, scale }, RexValue::Exact { unscaled, scale: from }) => {
            let unscaled = rescale_exact(*unscaled, *from, *scale)
                .ok_or_else(|| out_of_range(rex, "value does not fit the declared scale"))?;
            Literal::decimal(n, Decimal::new(unscaled, *precision, *scale)?)
        }
        (SqlType::Char { length }, RexValue::Char(v)) => {
            if v.chars().count() != *length as usize {
                return Err(host_mismatch(rex).into());
            }
            Literal::fixed_char(n, v.clone())?
        }
        (SqlType::VarChar { length: None }, RexValue::Char(v)) => Literal::string(n, v.clone()),
        (
            SqlType::VarChar {
                length: Some(length),
            },
            RexValue::Char(v),
        ) => Literal::var_char(n, v.clone(), *length)?,
        (SqlType::Binary { length }, RexValue::Binary(v)) => {
            if v.len() != *length as usize {
                return Err(host_mismatch(rex).into());
            }
            Literal::fixed_binary(n, v.clone())?
        }
        (SqlType::VarBinary, RexValue::Binary(v)) => Literal::binary(n, v.clone()),
        (SqlType::Date, RexValue::Date(days)) => Literal::date(n, Date::from_epoch_day(*days)),
        (SqlType::Time { .. }, RexValue::Time(nanos)) => {
            Literal::time(n, TimeOfDay::from_unit(*nanos, TimeUnit::Nanosecond)?)
        }
        (SqlType::Timestamp { .. }, RexValue::Timestamp { seconds, nanos }) => {
            if *nanos >= 1_000_000_000 {
                return Err(host_mismatch(rex).into());
            }
            if nanos % 1_000 != 0 {
                tracing::trace!(seconds, nanos, "truncating timestamp to microseconds");
            }
            let micros = seconds
                .checked_mul(1_000_000)
                .and_then(|m| m.checked_add(i64::from(nanos / 1_000)))
                .ok_or_else(|| out_of_range(rex, "timestamp overflows microseconds"))?;
            Literal::timestamp(n, Timestamp::from_micros(micros))
        }
        (SqlType::Interval(qualifier), RexValue::Interval(months)) if qualifier.is_year_month() => {
            Literal::interval_year_from_months(n, *months)?
        }
        (SqlType::Interval(_), RexValue::Interval(millis)) => {
            let micros = millis
                .checked_mul(1_000)
                .ok_or_else(|| out_of_range(rex, "interval overflows microseconds"))?;
            let interval = IntervalDayTime::from_total_micros(micros, LIFTED_INTERVAL_PRECISION)?;
            Literal::interval_day(n, interval)
        }
        (SqlType::Array(element), RexValue::Array(items)) => {
            let items = items.iter().map(lift_literal).collect::<Result<Vec<_>>>()?;
            Literal::list_of(n, lift_type(element)?, items)?
        }
        (SqlType::Map(key, value), RexValue::Map(entries)) => {
            let entries = entries
                .iter()
                .map(|(k, v)| Ok((lift_literal(k)?, lift_literal(v)?)))
                .collect::<Result<Vec<_>>>()?;
            Literal::map_of(n, lift_type(key)?, lift_type(value)?, entries)?
        }
        (SqlType::Row(fields), RexValue::Row(values)) => {
            if fields.len() != values.len() {
                return Err(LiteralError::ArityMismatch {
                    expected: fields.len(),
                    actual: values.len(),
                }
                .into());
            }
            let types = fields
                .iter()
                .map(|(_, field)| lift_type(field))
                .collect::<Result<Vec<_>>>()?;
            let values = values.iter().map(lift_literal).collect::<Result<Vec<_>>>()?;
            Literal::struct_of(n, &types, values)?
        }
        _ => return Err(host_mismatch(rex).into()),
    };
    Ok(literal)
}

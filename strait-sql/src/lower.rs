// Literal -> host

use crate::rex::{IntervalQualifier, RelType, RexLiteral, RexValue, SqlType};
use strait_core::adapter::unrepresentable;
use strait_core::error::{Direction, Result};
use strait_core::literal::Value;
use strait_core::time::{TimeUnit, MICROS_PER_SECOND};
use strait_core::{Kind, Literal, Type};

/// Fractional precision used for time types when no hint says otherwise
pub const DEFAULT_TIME_PRECISION: u8 = 6;

fn hinted(hint: Option<&RelType>) -> Option<&SqlType> {
    hint.map(|h| &h.sql)
}

fn element_hint(hint: Option<&RelType>) -> Option<&RelType> {
    match hinted(hint) {
        Some(SqlType::Array(element)) => Some(element),
        _ => None,
    }
}

fn map_hints(hint: Option<&RelType>) -> (Option<&RelType>, Option<&RelType>) {
    match hinted(hint) {
        Some(SqlType::Map(key, value)) => (Some(key), Some(value)),
        _ => (None, None),
    }
}

fn field_hint(hint: Option<&RelType>, index: usize) -> Option<&(String, RelType)> {
    match hinted(hint) {
        Some(SqlType::Row(fields)) => fields.get(index),
        _ => None,
    }
}

fn zoned(ty: &Type) -> strait_core::Error {
    unrepresentable(ty.to_string(), Direction::Lower, "host has no zoned timestamp literal").into()
}

/// Map a type descriptor to a host type.
///
/// `hint` supplies what the descriptor cannot say: `FLOAT` versus `DOUBLE`,
/// time precision, interval qualifier and row field names.
pub fn lower_type(ty: &Type, hint: Option<&RelType>) -> Result<RelType> {
    let sql = match ty.kind() {
        Kind::Bool => SqlType::Boolean,
        Kind::I8 => SqlType::TinyInt,
        Kind::I16 => SqlType::SmallInt,
        Kind::I32 => SqlType::Integer,
        Kind::I64 => SqlType::BigInt,
        Kind::Fp32 => SqlType::Real,
        Kind::Fp64 => match hinted(hint) {
            Some(SqlType::Float) => SqlType::Float,
            _ => SqlType::Double,
        },
        Kind::String => SqlType::VarChar { length: None },
        Kind::Binary => SqlType::VarBinary,
        Kind::FixedChar { length } => SqlType::Char { length: *length },
        Kind::VarChar { length } => SqlType::VarChar {
            length: Some(*length),
        },
        Kind::FixedBinary { length } => SqlType::Binary { length: *length },
        Kind::Decimal { precision, scale } => SqlType::Decimal {
            precision: *precision,
            scale: *scale,
        },
        Kind::Date => SqlType::Date,
        Kind::Time => SqlType::Time {
            precision: match hinted(hint) {
                Some(SqlType::Time { precision }) => *precision,
                _ => DEFAULT_TIME_PRECISION,
            },
        },
        Kind::Timestamp => SqlType::Timestamp {
            precision: match hinted(hint) {
                Some(SqlType::Timestamp { precision }) => *precision,
                _ => DEFAULT_TIME_PRECISION,
            },
        },
        Kind::TimestampTz => return Err(zoned(ty)),
        Kind::IntervalYear => SqlType::Interval(match hinted(hint) {
            Some(SqlType::Interval(q)) if q.is_year_month() => *q,
            _ => IntervalQualifier::YearToMonth,
        }),
        Kind::IntervalDay => SqlType::Interval(match hinted(hint) {
            Some(SqlType::Interval(q)) if !q.is_year_month() => *q,
            _ => IntervalQualifier::DayToSecond {
                precision: DEFAULT_TIME_PRECISION,
            },
        }),
        Kind::List { element } => {
            SqlType::Array(Box::new(lower_type(element, element_hint(hint))?))
        }
        Kind::Map { key, value } => {
            let (key_hint, value_hint) = map_hints(hint);
            SqlType::Map(
                Box::new(lower_type(key, key_hint)?),
                Box::new(lower_type(value, value_hint)?),
            )
        }
        Kind::Struct { fields } => {
            let fields = fields
                .iter()
                .enumerate()
                .map(|(i, field)| {
                    let hint = field_hint(hint, i);
                    let name = hint.map_or_else(|| format!("f{i}"), |(name, _)| name.clone());
                    Ok((name, lower_type(field, hint.map(|(_, ty)| ty))?))
                })
                .collect::<Result<Vec<_>>>()?;
            SqlType::Row(fields)
        }
    };
    Ok(RelType::new(sql, ty.is_nullable()))
}

/// Map a literal to a host literal, recursing through composites in order
pub fn lower_literal(literal: &Literal, hint: Option<&RelType>) -> Result<RexLiteral> {
    let ty = lower_type(&literal.ty(), hint)?;
    let exact = |unscaled: i128| RexValue::Exact { unscaled, scale: 0 };
    let value = match literal.value() {
        Value::Null(_) => RexValue::Null,
        Value::Bool(v) => RexValue::Boolean(*v),
        Value::I8(v) => exact(i128::from(*v)),
        Value::I16(v) => exact(i128::from(*v)),
        Value::I32(v) => exact(i128::from(*v)),
        Value::I64(v) => exact(i128::from(*v)),
        Value::Fp32(v) => RexValue::Approx(f64::from(*v)),
        Value::Fp64(v) => RexValue::Approx(*v),
        Value::String(v) | Value::FixedChar(v) | Value::VarChar { value: v, .. } => {
            RexValue::Char(v.clone())
        }
        Value::Binary(v) | Value::FixedBinary(v) => RexValue::Binary(v.clone()),
        Value::Decimal(d) => RexValue::Exact {
            unscaled: d.unscaled(),
            scale: d.scale(),
        },
        Value::Date(d) => RexValue::Date(d.epoch_day()),
        Value::Time(t) => RexValue::Time(t.to_unit(TimeUnit::Nanosecond)),
        Value::Timestamp(ts) => {
            let micros = ts.micros();
            RexValue::Timestamp {
                seconds: micros.div_euclid(MICROS_PER_SECOND),
                // rem_euclid keeps this in [0, 10^6), so the product fits u32
                nanos: (micros.rem_euclid(MICROS_PER_SECOND) * 1_000) as u32,
            }
        }
        Value::TimestampTz(_) => return Err(zoned(&literal.ty())),
        Value::IntervalYear(i) => RexValue::Interval(i.total_months()),
        Value::IntervalDay(i) => {
            let micros = i.total_micros().map_err(|_| {
                let reason = "interval overflows microseconds";
                unrepresentable(literal.ty().to_string(), Direction::Lower, reason)
            })?;
            if micros % 1_000 != 0 {
                tracing::trace!(micros, "truncating interval to milliseconds");
            }
            RexValue::Interval(micros.div_euclid(1_000))
        }
        Value::List { items, .. } => {
            let element = element_hint(Some(&ty));
            RexValue::Array(
                items
                    .iter()
                    .map(|item| lower_literal(item, element))
                    .collect::<Result<_>>()?,
            )
        }
        Value::Map { entries, .. } => {
            let (key, value) = map_hints(Some(&ty));
            RexValue::Map(
                entries
                    .iter()
                    .map(|(k, v)| Ok((lower_literal(k, key)?, lower_literal(v, value)?)))
                    .collect::<Result<_>>()?,
            )
        }
        Value::Struct(fields) => RexValue::Row(
            fields
                .iter()
                .enumerate()
                .map(|(i, field)| lower_literal(field, field_hint(Some(&ty), i).map(|(_, t)| t)))
                .collect::<Result<_>>()?,
        ),
    };
    Ok(RexLiteral::new(value, ty))
}

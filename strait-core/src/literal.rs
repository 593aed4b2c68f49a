// Literal tree - validated, immutable typed values

use crate::decimal::Decimal;
use crate::error::{LiteralError, Result};
use crate::time::{Date, IntervalDayTime, IntervalYearMonth, TimeOfDay, Timestamp};
use crate::types::{Kind, Type};
use bstr::ByteSlice;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payload of a literal
///
/// Children of composites are themselves validated literals, so a `Value`
/// only needs its own level checked when it is wrapped by [`Literal::new`].
///
/// Equality is structural, except floats compare by bit pattern: NaN equals
/// an identical NaN and `-0.0` differs from `0.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Fp32(f32),
    Fp64(f64),
    String(String),
    Binary(Vec<u8>),
    /// Fixed-length character string; the length is its character count.
    FixedChar(String),
    VarChar { value: String, length: u32 },
    /// Fixed-length byte string; the length is its byte count.
    FixedBinary(Vec<u8>),
    Decimal(Decimal),
    Date(Date),
    Time(TimeOfDay),
    Timestamp(Timestamp),
    TimestampTz(Timestamp),
    IntervalYear(IntervalYearMonth),
    IntervalDay(IntervalDayTime),
    List { element: Type, items: Vec<Literal> },
    Map {
        key: Type,
        value: Type,
        entries: Vec<(Literal, Literal)>,
    },
    Struct(Vec<Literal>),
    /// Typed absence. The carried type is always nullable.
    Null(Type),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Fp32(a), Value::Fp32(b)) => a.to_bits() == b.to_bits(),
            (Value::Fp64(a), Value::Fp64(b)) => a.to_bits() == b.to_bits(),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::FixedChar(a), Value::FixedChar(b)) => a == b,
            (Value::Binary(a), Value::Binary(b)) => a == b,
            (Value::FixedBinary(a), Value::FixedBinary(b)) => a == b,
            (
                Value::VarChar { value, length },
                Value::VarChar {
                    value: other_value,
                    length: other_length,
                },
            ) => value == other_value && length == other_length,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::TimestampTz(a), Value::TimestampTz(b)) => a == b,
            (Value::IntervalYear(a), Value::IntervalYear(b)) => a == b,
            (Value::IntervalDay(a), Value::IntervalDay(b)) => a == b,
            (
                Value::List { element, items },
                Value::List {
                    element: other_element,
                    items: other_items,
                },
            ) => element == other_element && items == other_items,
            (
                Value::Map { key, value, entries },
                Value::Map {
                    key: other_key,
                    value: other_value,
                    entries: other_entries,
                },
            ) => key == other_key && value == other_value && entries == other_entries,
            (Value::Struct(a), Value::Struct(b)) => a == b,
            (Value::Null(a), Value::Null(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

/// A typed constant: a payload plus its nullable marker
///
/// Fields are private; every `Literal` in existence went through a
/// validating constructor, including those produced by the wire and JSON
/// decoders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LiteralRepr")]
pub struct Literal {
    nullable: bool,
    value: Value,
}

#[derive(Deserialize)]
struct LiteralRepr {
    nullable: bool,
    value: Value,
}

impl TryFrom<LiteralRepr> for Literal {
    type Error = LiteralError;

    fn try_from(repr: LiteralRepr) -> std::result::Result<Self, Self::Error> {
        Literal::new(repr.nullable, repr.value)
    }
}

fn mismatch(expected: &Type, actual: &Type) -> LiteralError {
    LiteralError::TypeMismatch {
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}

fn length_of(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

fn check_items(element: &Type, items: &[Literal]) -> std::result::Result<(), LiteralError> {
    for item in items {
        let actual = item.ty();
        if &actual != element {
            return Err(mismatch(element, &actual));
        }
    }
    Ok(())
}

fn check_entries(
    key: &Type,
    value: &Type,
    entries: &[(Literal, Literal)],
) -> std::result::Result<(), LiteralError> {
    for (k, v) in entries {
        let actual = k.ty();
        if &actual != key {
            return Err(mismatch(key, &actual));
        }
        let actual = v.ty();
        if &actual != value {
            return Err(mismatch(value, &actual));
        }
    }
    Ok(())
}

impl Value {
    /// Check this level of the payload against its own declared types
    fn validate(&self, nullable: bool) -> std::result::Result<(), LiteralError> {
        match self {
            Value::VarChar { value, length } => {
                let actual = value.chars().count();
                if actual > *length as usize {
                    return Err(LiteralError::LengthExceeded {
                        kind: "varchar",
                        length: *length,
                        actual,
                    });
                }
                Ok(())
            }
            Value::FixedChar(value) if value.chars().count() > u32::MAX as usize => {
                Err(LiteralError::LengthExceeded {
                    kind: "fixedchar",
                    length: u32::MAX,
                    actual: value.chars().count(),
                })
            }
            Value::FixedBinary(bytes) if bytes.len() > u32::MAX as usize => {
                Err(LiteralError::LengthExceeded {
                    kind: "fixedbinary",
                    length: u32::MAX,
                    actual: bytes.len(),
                })
            }
            Value::List { element, items } => check_items(element, items),
            Value::Map {
                key,
                value,
                entries,
            } => check_entries(key, value, entries),
            Value::Null(ty) if !ty.is_nullable() || !nullable => {
                Err(LiteralError::NonNullableNull(ty.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Kind implied by the payload
    pub fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Bool,
            Value::I8(_) => Kind::I8,
            Value::I16(_) => Kind::I16,
            Value::I32(_) => Kind::I32,
            Value::I64(_) => Kind::I64,
            Value::Fp32(_) => Kind::Fp32,
            Value::Fp64(_) => Kind::Fp64,
            Value::String(_) => Kind::String,
            Value::Binary(_) => Kind::Binary,
            Value::FixedChar(value) => Kind::FixedChar {
                length: length_of(value.chars().count()),
            },
            Value::VarChar { length, .. } => Kind::VarChar { length: *length },
            Value::FixedBinary(bytes) => Kind::FixedBinary {
                length: length_of(bytes.len()),
            },
            Value::Decimal(d) => Kind::Decimal {
                precision: d.precision(),
                scale: d.scale(),
            },
            Value::Date(_) => Kind::Date,
            Value::Time(_) => Kind::Time,
            Value::Timestamp(_) => Kind::Timestamp,
            Value::TimestampTz(_) => Kind::TimestampTz,
            Value::IntervalYear(_) => Kind::IntervalYear,
            Value::IntervalDay(_) => Kind::IntervalDay,
            Value::List { element, .. } => Kind::List {
                element: Box::new(element.clone()),
            },
            Value::Map { key, value, .. } => Kind::Map {
                key: Box::new(key.clone()),
                value: Box::new(value.clone()),
            },
            Value::Struct(fields) => Kind::Struct {
                fields: fields.iter().map(Literal::ty).collect(),
            },
            Value::Null(ty) => ty.kind().clone(),
        }
    }
}

impl Literal {
    /// Wrap a raw payload, validating it.
    ///
    /// Typed nulls must be marked nullable and carry a nullable type.
    pub fn new(nullable: bool, value: Value) -> std::result::Result<Self, LiteralError> {
        value.validate(nullable)?;
        Ok(Literal { nullable, value })
    }

    // Scalar payloads are valid by construction of their field types.
    fn scalar(nullable: bool, value: Value) -> Self {
        Literal { nullable, value }
    }

    pub fn bool(nullable: bool, value: bool) -> Self {
        Self::scalar(nullable, Value::Bool(value))
    }

    pub fn i8(nullable: bool, value: i8) -> Self {
        Self::scalar(nullable, Value::I8(value))
    }

    pub fn i16(nullable: bool, value: i16) -> Self {
        Self::scalar(nullable, Value::I16(value))
    }

    pub fn i32(nullable: bool, value: i32) -> Self {
        Self::scalar(nullable, Value::I32(value))
    }

    pub fn i64(nullable: bool, value: i64) -> Self {
        Self::scalar(nullable, Value::I64(value))
    }

    pub fn fp32(nullable: bool, value: f32) -> Self {
        Self::scalar(nullable, Value::Fp32(value))
    }

    pub fn fp64(nullable: bool, value: f64) -> Self {
        Self::scalar(nullable, Value::Fp64(value))
    }

    pub fn string(nullable: bool, value: impl Into<String>) -> Self {
        Self::scalar(nullable, Value::String(value.into()))
    }

    pub fn binary(nullable: bool, value: impl Into<Vec<u8>>) -> Self {
        Self::scalar(nullable, Value::Binary(value.into()))
    }

    /// Fixed-length string whose declared length is its character count
    pub fn fixed_char(nullable: bool, value: impl Into<String>) -> Result<Self> {
        Ok(Self::new(nullable, Value::FixedChar(value.into()))?)
    }

    /// Bounded string; fails when `value` has more than `length` characters
    pub fn var_char(nullable: bool, value: impl Into<String>, length: u32) -> Result<Self> {
        let value = Value::VarChar {
            value: value.into(),
            length,
        };
        Ok(Self::new(nullable, value)?)
    }

    pub fn fixed_binary(nullable: bool, value: impl Into<Vec<u8>>) -> Result<Self> {
        Ok(Self::new(nullable, Value::FixedBinary(value.into()))?)
    }

    pub fn decimal(nullable: bool, value: Decimal) -> Self {
        Self::scalar(nullable, Value::Decimal(value))
    }

    pub fn date(nullable: bool, value: Date) -> Self {
        Self::scalar(nullable, Value::Date(value))
    }

    pub fn date_ymd(nullable: bool, year: i32, month: u32, day: u32) -> Result<Self> {
        Ok(Self::date(nullable, Date::from_ymd(year, month, day)?))
    }

    pub fn time(nullable: bool, value: TimeOfDay) -> Self {
        Self::scalar(nullable, Value::Time(value))
    }

    pub fn timestamp(nullable: bool, value: Timestamp) -> Self {
        Self::scalar(nullable, Value::Timestamp(value))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn timestamp_from_components(
        nullable: bool,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        micros: u32,
    ) -> Result<Self> {
        let ts = Timestamp::from_components(year, month, day, hour, minute, second, micros)?;
        Ok(Self::timestamp(nullable, ts))
    }

    /// UTC instant; no zone name is carried
    pub fn timestamp_tz(nullable: bool, value: Timestamp) -> Self {
        Self::scalar(nullable, Value::TimestampTz(value))
    }

    pub fn interval_year(nullable: bool, value: IntervalYearMonth) -> Self {
        Self::scalar(nullable, Value::IntervalYear(value))
    }

    pub fn interval_year_from_months(nullable: bool, total_months: i64) -> Result<Self> {
        let interval = IntervalYearMonth::from_total_months(total_months)?;
        Ok(Self::interval_year(nullable, interval))
    }

    pub fn interval_day(nullable: bool, value: IntervalDayTime) -> Self {
        Self::scalar(nullable, Value::IntervalDay(value))
    }

    /// List whose element type is taken from the first item
    pub fn list(nullable: bool, items: Vec<Literal>) -> Result<Self> {
        let element = items
            .first()
            .map(Literal::ty)
            .ok_or(LiteralError::EmptyComposite("list"))?;
        Self::list_of(nullable, element, items)
    }

    pub fn list_of(nullable: bool, element: Type, items: Vec<Literal>) -> Result<Self> {
        Ok(Self::new(nullable, Value::List { element, items })?)
    }

    pub fn empty_list(nullable: bool, element: Type) -> Self {
        Self::scalar(
            nullable,
            Value::List {
                element,
                items: Vec::new(),
            },
        )
    }

    /// Map whose key and value types are taken from the first entry
    pub fn map(nullable: bool, entries: Vec<(Literal, Literal)>) -> Result<Self> {
        let (key, value) = entries
            .first()
            .map(|(k, v)| (k.ty(), v.ty()))
            .ok_or(LiteralError::EmptyComposite("map"))?;
        Self::map_of(nullable, key, value, entries)
    }

    pub fn map_of(
        nullable: bool,
        key: Type,
        value: Type,
        entries: Vec<(Literal, Literal)>,
    ) -> Result<Self> {
        Ok(Self::new(
            nullable,
            Value::Map {
                key,
                value,
                entries,
            },
        )?)
    }

    pub fn empty_map(nullable: bool, key: Type, value: Type) -> Self {
        Self::scalar(
            nullable,
            Value::Map {
                key,
                value,
                entries: Vec::new(),
            },
        )
    }

    /// Struct whose field types are those of the supplied values
    pub fn struct_(nullable: bool, fields: Vec<Literal>) -> Self {
        Self::scalar(nullable, Value::Struct(fields))
    }

    /// Struct checked against declared field types, by position
    pub fn struct_of(nullable: bool, types: &[Type], fields: Vec<Literal>) -> Result<Self> {
        if types.len() != fields.len() {
            return Err(LiteralError::ArityMismatch {
                expected: types.len(),
                actual: fields.len(),
            }
            .into());
        }
        for (declared, field) in types.iter().zip(&fields) {
            let actual = field.ty();
            if &actual != declared {
                return Err(mismatch(declared, &actual).into());
            }
        }
        Ok(Self::struct_(nullable, fields))
    }

    pub fn typed_null(ty: Type) -> Result<Self> {
        Ok(Self::new(true, Value::Null(ty))?)
    }

    /// Type descriptor derived from the payload and the nullable marker
    pub fn ty(&self) -> Type {
        match &self.value {
            Value::Null(ty) => ty.clone(),
            // kinds derived from a valid payload carry valid parameters
            value => Type::from_valid(value.kind(), self.nullable),
        }
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, Value::Null(_))
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

fn write_seq<T>(
    f: &mut fmt::Formatter<'_>,
    items: impl IntoIterator<Item = T>,
    mut each: impl FnMut(&mut fmt::Formatter<'_>, T) -> fmt::Result,
) -> fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        each(f, item)?;
    }
    Ok(())
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::Bool(v) => write!(f, "{v}"),
            Value::I8(v) => write!(f, "{v}i8"),
            Value::I16(v) => write!(f, "{v}i16"),
            Value::I32(v) => write!(f, "{v}i32"),
            Value::I64(v) => write!(f, "{v}i64"),
            Value::Fp32(v) => write!(f, "{v}f32"),
            Value::Fp64(v) => write!(f, "{v}f64"),
            Value::String(v) | Value::FixedChar(v) | Value::VarChar { value: v, .. } => {
                write!(f, "{v:?}")
            }
            Value::Binary(v) | Value::FixedBinary(v) => write!(f, "b{:?}", v.as_bstr()),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Date(d) => write!(f, "date '{d}'"),
            Value::Time(t) => write!(f, "time '{t}'"),
            Value::Timestamp(ts) => write!(f, "timestamp '{ts}'"),
            Value::TimestampTz(ts) => write!(f, "timestamptz '{ts} UTC'"),
            Value::IntervalYear(i) => write!(f, "interval '{i}'"),
            Value::IntervalDay(i) => write!(f, "interval '{i}'"),
            Value::List { items, .. } => {
                write!(f, "[")?;
                write_seq(f, items, |f, item| write!(f, "{item}"))?;
                write!(f, "]")
            }
            Value::Map { entries, .. } => {
                write!(f, "{{")?;
                write_seq(f, entries, |f, (k, v)| write!(f, "{k}: {v}"))?;
                write!(f, "}}")
            }
            Value::Struct(fields) => {
                write!(f, "(")?;
                write_seq(f, fields, |f, field| write!(f, "{field}"))?;
                write!(f, ")")
            }
            Value::Null(ty) => write!(f, "null::{ty}"),
        }
    }
}

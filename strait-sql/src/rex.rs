// Host literal model of a loosely typed SQL engine
//
// Exact numerics are an unscaled value plus a scale, approximate numerics are
// all f64, time is nanoseconds of day, timestamps are epoch seconds plus
// nanos, and intervals are one magnitude whose unit comes from the qualifier
// (months for year-month qualifiers, milliseconds for day-time ones).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Interval qualifier, e.g. `YEAR TO MONTH` or `DAY TO SECOND(3)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntervalQualifier {
    Year,
    YearToMonth,
    Month,
    Day,
    DayToHour,
    DayToMinute,
    DayToSecond { precision: u8 },
    Hour,
    HourToMinute,
    HourToSecond { precision: u8 },
    Minute,
    MinuteToSecond { precision: u8 },
    Second { precision: u8 },
}

impl IntervalQualifier {
    /// Whether the magnitude counts months rather than milliseconds
    pub fn is_year_month(&self) -> bool {
        matches!(
            self,
            IntervalQualifier::Year | IntervalQualifier::YearToMonth | IntervalQualifier::Month
        )
    }
}

impl fmt::Display for IntervalQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntervalQualifier::Year => write!(f, "YEAR"),
            IntervalQualifier::YearToMonth => write!(f, "YEAR TO MONTH"),
            IntervalQualifier::Month => write!(f, "MONTH"),
            IntervalQualifier::Day => write!(f, "DAY"),
            IntervalQualifier::DayToHour => write!(f, "DAY TO HOUR"),
            IntervalQualifier::DayToMinute => write!(f, "DAY TO MINUTE"),
            IntervalQualifier::DayToSecond { precision } => write!(f, "DAY TO SECOND({precision})"),
            IntervalQualifier::Hour => write!(f, "HOUR"),
            IntervalQualifier::HourToMinute => write!(f, "HOUR TO MINUTE"),
            IntervalQualifier::HourToSecond { precision } => {
                write!(f, "HOUR TO SECOND({precision})")
            }
            IntervalQualifier::Minute => write!(f, "MINUTE"),
            IntervalQualifier::MinuteToSecond { precision } => {
                write!(f, "MINUTE TO SECOND({precision})")
            }
            IntervalQualifier::Second { precision } => write!(f, "SECOND({precision})"),
        }
    }
}

/// SQL type names with their parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlType {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    /// Spelled `FLOAT` by the producer; stored the same as `DOUBLE`
    Float,
    Double,
    Decimal { precision: u8, scale: u8 },
    Char { length: u32 },
    /// `None` is an unbounded `VARCHAR`
    VarChar { length: Option<u32> },
    Binary { length: u32 },
    VarBinary,
    Date,
    Time { precision: u8 },
    Timestamp { precision: u8 },
    Interval(IntervalQualifier),
    Array(Box<RelType>),
    Map(Box<RelType>, Box<RelType>),
    /// Named fields; names do not take part in literal conversion
    Row(Vec<(String, RelType)>),
    /// Flag keywords such as `TRIM(LEADING ...)`
    Symbol,
}

/// A SQL type plus nullability
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelType {
    pub sql: SqlType,
    pub nullable: bool,
}

impl RelType {
    pub fn new(sql: SqlType, nullable: bool) -> Self {
        RelType { sql, nullable }
    }

    pub fn not_null(sql: SqlType) -> Self {
        Self::new(sql, false)
    }

    pub fn nullable(sql: SqlType) -> Self {
        Self::new(sql, true)
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::Boolean => write!(f, "BOOLEAN"),
            SqlType::TinyInt => write!(f, "TINYINT"),
            SqlType::SmallInt => write!(f, "SMALLINT"),
            SqlType::Integer => write!(f, "INTEGER"),
            SqlType::BigInt => write!(f, "BIGINT"),
            SqlType::Real => write!(f, "REAL"),
            SqlType::Float => write!(f, "FLOAT"),
            SqlType::Double => write!(f, "DOUBLE"),
            SqlType::Decimal { precision, scale } => write!(f, "DECIMAL({precision}, {scale})"),
            SqlType::Char { length } => write!(f, "CHAR({length})"),
            SqlType::VarChar { length: None } => write!(f, "VARCHAR"),
            SqlType::VarChar {
                length: Some(length),
            } => write!(f, "VARCHAR({length})"),
            SqlType::Binary { length } => write!(f, "BINARY({length})"),
            SqlType::VarBinary => write!(f, "VARBINARY"),
            SqlType::Date => write!(f, "DATE"),
            SqlType::Time { precision } => write!(f, "TIME({precision})"),
            SqlType::Timestamp { precision } => write!(f, "TIMESTAMP({precision})"),
            SqlType::Interval(qualifier) => write!(f, "INTERVAL {qualifier}"),
            SqlType::Array(element) => write!(f, "{element} ARRAY"),
            SqlType::Map(key, value) => write!(f, "({key}, {value}) MAP"),
            SqlType::Row(fields) => {
                write!(f, "RecordType(")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{ty} {name}")?;
                }
                write!(f, ")")
            }
            SqlType::Symbol => write!(f, "SYMBOL"),
        }
    }
}

impl fmt::Display for RelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql)?;
        if !self.nullable {
            write!(f, " NOT NULL")?;
        }
        Ok(())
    }
}

/// Host literal payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RexValue {
    Null,
    Boolean(bool),
    /// Every exact numeric, integers included: `unscaled * 10^-scale`
    Exact { unscaled: i128, scale: u8 },
    Approx(f64),
    Char(String),
    Binary(Vec<u8>),
    /// Days since 1970-01-01
    Date(i32),
    /// Nanoseconds since midnight
    Time(i64),
    Timestamp { seconds: i64, nanos: u32 },
    /// Months or milliseconds, depending on the qualifier
    Interval(i64),
    Array(Vec<RexLiteral>),
    Map(Vec<(RexLiteral, RexLiteral)>),
    Row(Vec<RexLiteral>),
    Symbol(String),
}

/// A host literal: payload and declared type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RexLiteral {
    pub value: RexValue,
    pub ty: RelType,
}

impl RexLiteral {
    pub fn new(value: RexValue, ty: RelType) -> Self {
        RexLiteral { value, ty }
    }

    /// Typed null; the type is forced nullable
    pub fn null(sql: SqlType) -> Self {
        RexLiteral {
            value: RexValue::Null,
            ty: RelType::nullable(sql),
        }
    }

    /// Non-null exact integer of the given integer type
    pub fn integer(value: i64, sql: SqlType) -> Self {
        Self::new(
            RexValue::Exact {
                unscaled: i128::from(value),
                scale: 0,
            },
            RelType::not_null(sql),
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, RexValue::Null)
    }
}

impl fmt::Display for RexLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            RexValue::Null => write!(f, "null")?,
            RexValue::Boolean(v) => write!(f, "{v}")?,
            RexValue::Exact { unscaled, scale } => write!(f, "{unscaled}E-{scale}")?,
            RexValue::Approx(v) => write!(f, "{v:e}")?,
            RexValue::Char(v) => write!(f, "'{v}'")?,
            RexValue::Binary(v) => {
                write!(f, "X'")?;
                for byte in v {
                    write!(f, "{byte:02X}")?;
                }
                write!(f, "'")?;
            }
            RexValue::Date(days) => write!(f, "DATE {days}")?,
            RexValue::Time(nanos) => write!(f, "TIME {nanos}ns")?,
            RexValue::Timestamp { seconds, nanos } => write!(f, "TIMESTAMP {seconds}s+{nanos}ns")?,
            RexValue::Interval(magnitude) => write!(f, "INTERVAL {magnitude}")?,
            RexValue::Array(items) | RexValue::Row(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")?;
            }
            RexValue::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")?;
            }
            RexValue::Symbol(name) => write!(f, "{name}")?,
        }
        write!(f, ":{}", self.ty)
    }
}

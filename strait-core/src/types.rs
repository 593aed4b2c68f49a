// Type descriptors for literals

use crate::error::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest decimal precision the 16-byte encoding can hold.
pub const MAX_DECIMAL_PRECISION: u8 = 38;

/// Logical kind of a literal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Fp32,
    Fp64,
    String,
    Binary,
    FixedChar { length: u32 },
    VarChar { length: u32 },
    FixedBinary { length: u32 },
    Decimal { precision: u8, scale: u8 },
    Date,
    Time,
    Timestamp,
    TimestampTz,
    IntervalYear,
    IntervalDay,
    List { element: Box<Type> },
    Map { key: Box<Type>, value: Box<Type> },
    /// Fields are positional; repeated field types are fine.
    Struct { fields: Vec<Type> },
}

/// A kind plus its nullability.
///
/// Only obtainable through validating constructors, so decimal parameters
/// are always in range once a `Type` exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TypeRepr")]
pub struct Type {
    kind: Kind,
    nullable: bool,
}

#[derive(Deserialize)]
struct TypeRepr {
    kind: Kind,
    nullable: bool,
}

impl TryFrom<TypeRepr> for Type {
    type Error = TypeError;

    fn try_from(repr: TypeRepr) -> Result<Self, Self::Error> {
        Type::new(repr.kind, repr.nullable)
    }
}

impl Kind {
    /// Check the parameters carried by this kind
    pub fn validate(&self) -> Result<(), TypeError> {
        match self {
            Kind::Decimal { precision, scale } => validate_decimal(*precision, *scale),
            _ => Ok(()),
        }
    }

    /// Short lowercase name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::I8 => "i8",
            Kind::I16 => "i16",
            Kind::I32 => "i32",
            Kind::I64 => "i64",
            Kind::Fp32 => "fp32",
            Kind::Fp64 => "fp64",
            Kind::String => "string",
            Kind::Binary => "binary",
            Kind::FixedChar { .. } => "fixedchar",
            Kind::VarChar { .. } => "varchar",
            Kind::FixedBinary { .. } => "fixedbinary",
            Kind::Decimal { .. } => "decimal",
            Kind::Date => "date",
            Kind::Time => "time",
            Kind::Timestamp => "timestamp",
            Kind::TimestampTz => "timestamp_tz",
            Kind::IntervalYear => "interval_year",
            Kind::IntervalDay => "interval_day",
            Kind::List { .. } => "list",
            Kind::Map { .. } => "map",
            Kind::Struct { .. } => "struct",
        }
    }
}

pub(crate) fn validate_decimal(precision: u8, scale: u8) -> Result<(), TypeError> {
    if precision == 0 || precision > MAX_DECIMAL_PRECISION {
        return Err(TypeError::PrecisionOutOfRange(precision));
    }
    if scale > precision {
        return Err(TypeError::ScaleOutOfRange { precision, scale });
    }
    Ok(())
}

impl Type {
    /// Build a type, validating any parameters on the kind.
    pub fn new(kind: Kind, nullable: bool) -> Result<Self, TypeError> {
        kind.validate()?;
        Ok(Type { kind, nullable })
    }

    // Parameterless kinds and already-validated children need no checks.
    pub(crate) const fn from_valid(kind: Kind, nullable: bool) -> Self {
        Type { kind, nullable }
    }

    pub const fn bool(nullable: bool) -> Self {
        Self::from_valid(Kind::Bool, nullable)
    }

    pub const fn i8(nullable: bool) -> Self {
        Self::from_valid(Kind::I8, nullable)
    }

    pub const fn i16(nullable: bool) -> Self {
        Self::from_valid(Kind::I16, nullable)
    }

    pub const fn i32(nullable: bool) -> Self {
        Self::from_valid(Kind::I32, nullable)
    }

    pub const fn i64(nullable: bool) -> Self {
        Self::from_valid(Kind::I64, nullable)
    }

    pub const fn fp32(nullable: bool) -> Self {
        Self::from_valid(Kind::Fp32, nullable)
    }

    pub const fn fp64(nullable: bool) -> Self {
        Self::from_valid(Kind::Fp64, nullable)
    }

    pub const fn string(nullable: bool) -> Self {
        Self::from_valid(Kind::String, nullable)
    }

    pub const fn binary(nullable: bool) -> Self {
        Self::from_valid(Kind::Binary, nullable)
    }

    pub const fn fixed_char(length: u32, nullable: bool) -> Self {
        Self::from_valid(Kind::FixedChar { length }, nullable)
    }

    pub const fn var_char(length: u32, nullable: bool) -> Self {
        Self::from_valid(Kind::VarChar { length }, nullable)
    }

    pub const fn fixed_binary(length: u32, nullable: bool) -> Self {
        Self::from_valid(Kind::FixedBinary { length }, nullable)
    }

    pub fn decimal(precision: u8, scale: u8, nullable: bool) -> Result<Self, TypeError> {
        Self::new(Kind::Decimal { precision, scale }, nullable)
    }

    pub const fn date(nullable: bool) -> Self {
        Self::from_valid(Kind::Date, nullable)
    }

    pub const fn time(nullable: bool) -> Self {
        Self::from_valid(Kind::Time, nullable)
    }

    pub const fn timestamp(nullable: bool) -> Self {
        Self::from_valid(Kind::Timestamp, nullable)
    }

    pub const fn timestamp_tz(nullable: bool) -> Self {
        Self::from_valid(Kind::TimestampTz, nullable)
    }

    pub const fn interval_year(nullable: bool) -> Self {
        Self::from_valid(Kind::IntervalYear, nullable)
    }

    pub const fn interval_day(nullable: bool) -> Self {
        Self::from_valid(Kind::IntervalDay, nullable)
    }

    pub fn list(element: Type, nullable: bool) -> Self {
        Self::from_valid(
            Kind::List {
                element: Box::new(element),
            },
            nullable,
        )
    }

    pub fn map(key: Type, value: Type, nullable: bool) -> Self {
        Self::from_valid(
            Kind::Map {
                key: Box::new(key),
                value: Box::new(value),
            },
            nullable,
        )
    }

    pub fn strukt(fields: Vec<Type>, nullable: bool) -> Self {
        Self::from_valid(Kind::Struct { fields }, nullable)
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Same kind with a different nullability
    pub fn with_nullable(&self, nullable: bool) -> Self {
        Type {
            kind: self.kind.clone(),
            nullable,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::FixedChar { length } | Kind::VarChar { length } | Kind::FixedBinary { length } => {
                write!(f, "{}<{}>", self.kind.name(), length)?
            }
            Kind::Decimal { precision, scale } => write!(f, "decimal<{precision},{scale}>")?,
            Kind::List { element } => write!(f, "list<{element}>")?,
            Kind::Map { key, value } => write!(f, "map<{key},{value}>")?,
            Kind::Struct { fields } => {
                write!(f, "struct<")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{field}")?;
                }
                write!(f, ">")?;
            }
            kind => write!(f, "{}", kind.name())?,
        }
        if self.nullable {
            write!(f, "?")?;
        }
        Ok(())
    }
}

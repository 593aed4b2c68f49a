// Wire codec - self-describing tagged binary encoding of literals
//
// Every literal and every type descriptor starts with a one-byte kind tag and
// a nullable byte. Multi-byte integers are little-endian. Lengths and counts
// are u32. Composites carry their declared types ahead of their children: a
// list its element type, a map its key and value types, a struct the count
// and the type of every field.

use crate::decimal::{Decimal, ENCODED_LEN};
use crate::error::{Result, WireError};
use crate::literal::{Literal, Value};
use crate::time::{Date, IntervalDayTime, IntervalYearMonth, TimeOfDay, Timestamp};
use crate::types::{Kind, Type};
use std::io::{Cursor, Read, Write};

/// Nesting limit shared by encoder and decoder, so anything written can be read back
pub const MAX_DEPTH: usize = 128;

// Upper bound on speculative allocation from an untrusted count
pub(crate) const PREALLOCATE_LIMIT: usize = 1024;

/// Stable one-byte tag per kind
///
/// Values are part of the wire format and must never be renumbered.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindTag {
    Bool = 0x01,
    I8 = 0x02,
    I16 = 0x03,
    I32 = 0x04,
    I64 = 0x05,
    Fp32 = 0x06,
    Fp64 = 0x07,
    String = 0x08,
    Binary = 0x09,
    FixedChar = 0x0A,
    VarChar = 0x0B,
    FixedBinary = 0x0C,
    Decimal = 0x0D,
    Date = 0x0E,
    Time = 0x0F,
    Timestamp = 0x10,
    TimestampTz = 0x11,
    IntervalYear = 0x12,
    IntervalDay = 0x13,
    List = 0x20,
    Map = 0x21,
    Struct = 0x22,
    /// Typed null; followed by the type it stands for
    Null = 0xFF,
}

impl KindTag {
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    pub const fn from_u8(byte: u8) -> Option<Self> {
        Some(match byte {
            0x01 => Self::Bool,
            0x02 => Self::I8,
            0x03 => Self::I16,
            0x04 => Self::I32,
            0x05 => Self::I64,
            0x06 => Self::Fp32,
            0x07 => Self::Fp64,
            0x08 => Self::String,
            0x09 => Self::Binary,
            0x0A => Self::FixedChar,
            0x0B => Self::VarChar,
            0x0C => Self::FixedBinary,
            0x0D => Self::Decimal,
            0x0E => Self::Date,
            0x0F => Self::Time,
            0x10 => Self::Timestamp,
            0x11 => Self::TimestampTz,
            0x12 => Self::IntervalYear,
            0x13 => Self::IntervalDay,
            0x20 => Self::List,
            0x21 => Self::Map,
            0x22 => Self::Struct,
            0xFF => Self::Null,
            _ => return None,
        })
    }

    pub fn of_kind(kind: &Kind) -> Self {
        match kind {
            Kind::Bool => Self::Bool,
            Kind::I8 => Self::I8,
            Kind::I16 => Self::I16,
            Kind::I32 => Self::I32,
            Kind::I64 => Self::I64,
            Kind::Fp32 => Self::Fp32,
            Kind::Fp64 => Self::Fp64,
            Kind::String => Self::String,
            Kind::Binary => Self::Binary,
            Kind::FixedChar { .. } => Self::FixedChar,
            Kind::VarChar { .. } => Self::VarChar,
            Kind::FixedBinary { .. } => Self::FixedBinary,
            Kind::Decimal { .. } => Self::Decimal,
            Kind::Date => Self::Date,
            Kind::Time => Self::Time,
            Kind::Timestamp => Self::Timestamp,
            Kind::TimestampTz => Self::TimestampTz,
            Kind::IntervalYear => Self::IntervalYear,
            Kind::IntervalDay => Self::IntervalDay,
            Kind::List { .. } => Self::List,
            Kind::Map { .. } => Self::Map,
            Kind::Struct { .. } => Self::Struct,
        }
    }

    pub fn of_value(value: &Value) -> Self {
        match value {
            Value::Null(_) => Self::Null,
            other => Self::of_kind(&other.kind()),
        }
    }
}

impl TryFrom<u8> for KindTag {
    type Error = WireError;

    fn try_from(byte: u8) -> std::result::Result<Self, Self::Error> {
        Self::from_u8(byte).ok_or(WireError::UnsupportedKind(byte))
    }
}

/// Serialize a single literal
pub fn to_wire(literal: &Literal) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_literal(&mut buffer, literal)?;
    Ok(buffer)
}

/// Deserialize exactly one literal; trailing bytes are an error
pub fn from_wire(bytes: &[u8]) -> Result<Literal> {
    let mut reader = Cursor::new(bytes);
    let literal = read_literal(&mut reader)?;
    let remaining = bytes.len() - reader.position() as usize;
    if remaining != 0 {
        return Err(WireError::TrailingBytes(remaining).into());
    }
    Ok(literal)
}

/// Write a type descriptor
pub fn write_type<W: Write>(writer: &mut W, ty: &Type) -> Result<()> {
    write_type_at(writer, ty, 0)
}

fn write_type_at<W: Write>(writer: &mut W, ty: &Type, depth: usize) -> Result<()> {
    check_depth(depth)?;
    write_u8(writer, KindTag::of_kind(ty.kind()).to_u8())?;
    write_bool(writer, ty.is_nullable())?;
    match ty.kind() {
        Kind::FixedChar { length } | Kind::VarChar { length } | Kind::FixedBinary { length } => {
            write_u32(writer, *length)?
        }
        Kind::Decimal { precision, scale } => {
            write_u8(writer, *precision)?;
            write_u8(writer, *scale)?;
        }
        Kind::List { element } => write_type_at(writer, element, depth + 1)?,
        Kind::Map { key, value } => {
            write_type_at(writer, key, depth + 1)?;
            write_type_at(writer, value, depth + 1)?;
        }
        Kind::Struct { fields } => {
            write_count(writer, fields.len())?;
            for field in fields {
                write_type_at(writer, field, depth + 1)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Read a type descriptor
pub fn read_type<R: Read>(reader: &mut R) -> Result<Type> {
    read_type_at(reader, 0)
}

fn read_type_at<R: Read>(reader: &mut R, depth: usize) -> Result<Type> {
    check_depth(depth)?;
    let byte = read_u8(reader)?;
    let tag = KindTag::try_from(byte)?;
    let nullable = read_bool(reader)?;
    let kind = match tag {
        KindTag::Bool => Kind::Bool,
        KindTag::I8 => Kind::I8,
        KindTag::I16 => Kind::I16,
        KindTag::I32 => Kind::I32,
        KindTag::I64 => Kind::I64,
        KindTag::Fp32 => Kind::Fp32,
        KindTag::Fp64 => Kind::Fp64,
        KindTag::String => Kind::String,
        KindTag::Binary => Kind::Binary,
        KindTag::FixedChar => Kind::FixedChar {
            length: read_u32(reader)?,
        },
        KindTag::VarChar => Kind::VarChar {
            length: read_u32(reader)?,
        },
        KindTag::FixedBinary => Kind::FixedBinary {
            length: read_u32(reader)?,
        },
        KindTag::Decimal => Kind::Decimal {
            precision: read_u8(reader)?,
            scale: read_u8(reader)?,
        },
        KindTag::Date => Kind::Date,
        KindTag::Time => Kind::Time,
        KindTag::Timestamp => Kind::Timestamp,
        KindTag::TimestampTz => Kind::TimestampTz,
        KindTag::IntervalYear => Kind::IntervalYear,
        KindTag::IntervalDay => Kind::IntervalDay,
        KindTag::List => Kind::List {
            element: Box::new(read_type_at(reader, depth + 1)?),
        },
        KindTag::Map => Kind::Map {
            key: Box::new(read_type_at(reader, depth + 1)?),
            value: Box::new(read_type_at(reader, depth + 1)?),
        },
        KindTag::Struct => {
            let count = read_u32(reader)? as usize;
            let mut fields = Vec::with_capacity(count.min(PREALLOCATE_LIMIT));
            for _ in 0..count {
                fields.push(read_type_at(reader, depth + 1)?);
            }
            Kind::Struct { fields }
        }
        // a null marker describes a value, never a type
        KindTag::Null => return Err(WireError::UnsupportedKind(byte).into()),
    };
    Ok(Type::new(kind, nullable)?)
}

/// Write one literal: tag, nullable marker, then the payload
pub fn write_literal<W: Write>(writer: &mut W, literal: &Literal) -> Result<()> {
    write_literal_at(writer, literal, 0)
}

fn write_literal_at<W: Write>(writer: &mut W, literal: &Literal, depth: usize) -> Result<()> {
    check_depth(depth)?;
    let value = literal.value();
    write_u8(writer, KindTag::of_value(value).to_u8())?;
    write_bool(writer, literal.is_nullable())?;
    match value {
        Value::Bool(v) => write_bool(writer, *v)?,
        Value::I8(v) => writer.write_all(&v.to_le_bytes())?,
        Value::I16(v) => writer.write_all(&v.to_le_bytes())?,
        Value::I32(v) => write_i32(writer, *v)?,
        Value::I64(v) => write_i64(writer, *v)?,
        Value::Fp32(v) => writer.write_all(&v.to_le_bytes())?,
        Value::Fp64(v) => writer.write_all(&v.to_le_bytes())?,
        Value::String(v) | Value::FixedChar(v) => write_string(writer, v)?,
        Value::VarChar { value, length } => {
            write_u32(writer, *length)?;
            write_string(writer, value)?;
        }
        Value::Binary(v) | Value::FixedBinary(v) => write_sized_bytes(writer, v)?,
        Value::Decimal(d) => {
            write_u8(writer, d.precision())?;
            write_u8(writer, d.scale())?;
            writer.write_all(&d.to_bytes())?;
        }
        Value::Date(d) => write_i32(writer, d.epoch_day())?,
        Value::Time(t) => write_i64(writer, t.micros())?,
        Value::Timestamp(ts) | Value::TimestampTz(ts) => write_i64(writer, ts.micros())?,
        Value::IntervalYear(i) => {
            write_i32(writer, i.years())?;
            write_i32(writer, i.months())?;
        }
        Value::IntervalDay(i) => {
            write_i32(writer, i.days())?;
            write_i32(writer, i.seconds())?;
            write_i32(writer, i.micros())?;
            write_u8(writer, i.precision())?;
        }
        Value::List { element, items } => {
            write_type_at(writer, element, depth + 1)?;
            write_count(writer, items.len())?;
            for item in items {
                write_literal_at(writer, item, depth + 1)?;
            }
        }
        Value::Map {
            key,
            value,
            entries,
        } => {
            write_type_at(writer, key, depth + 1)?;
            write_type_at(writer, value, depth + 1)?;
            write_count(writer, entries.len())?;
            for (k, v) in entries {
                write_literal_at(writer, k, depth + 1)?;
                write_literal_at(writer, v, depth + 1)?;
            }
        }
        Value::Struct(fields) => {
            write_count(writer, fields.len())?;
            for field in fields {
                write_type_at(writer, &field.ty(), depth + 1)?;
            }
            for field in fields {
                write_literal_at(writer, field, depth + 1)?;
            }
        }
        Value::Null(ty) => write_type_at(writer, ty, depth + 1)?,
    }
    Ok(())
}

/// Read one literal, re-validating it on the way in
pub fn read_literal<R: Read>(reader: &mut R) -> Result<Literal> {
    read_literal_at(reader, 0)
}

fn read_literal_at<R: Read>(reader: &mut R, depth: usize) -> Result<Literal> {
    check_depth(depth)?;
    let byte = read_u8(reader)?;
    let tag = KindTag::try_from(byte).map_err(|e| {
        tracing::debug!(tag = byte, "unknown kind tag on decode");
        e
    })?;
    let nullable = read_bool(reader)?;
    let value = match tag {
        KindTag::Bool => Value::Bool(read_bool(reader)?),
        KindTag::I8 => Value::I8(i8::from_le_bytes(read_array(reader)?)),
        KindTag::I16 => Value::I16(i16::from_le_bytes(read_array(reader)?)),
        KindTag::I32 => Value::I32(read_i32(reader)?),
        KindTag::I64 => Value::I64(read_i64(reader)?),
        KindTag::Fp32 => Value::Fp32(f32::from_le_bytes(read_array(reader)?)),
        KindTag::Fp64 => Value::Fp64(f64::from_le_bytes(read_array(reader)?)),
        KindTag::String => Value::String(read_string(reader)?),
        KindTag::Binary => Value::Binary(read_sized_bytes(reader)?),
        KindTag::FixedChar => Value::FixedChar(read_string(reader)?),
        KindTag::VarChar => {
            let length = read_u32(reader)?;
            Value::VarChar {
                value: read_string(reader)?,
                length,
            }
        }
        KindTag::FixedBinary => Value::FixedBinary(read_sized_bytes(reader)?),
        KindTag::Decimal => {
            let precision = read_u8(reader)?;
            let scale = read_u8(reader)?;
            let bytes: [u8; ENCODED_LEN] = read_array(reader)?;
            Value::Decimal(Decimal::from_bytes(&bytes, precision, scale)?)
        }
        KindTag::Date => Value::Date(Date::from_epoch_day(read_i32(reader)?)),
        KindTag::Time => Value::Time(TimeOfDay::from_micros(read_i64(reader)?)?),
        KindTag::Timestamp => Value::Timestamp(Timestamp::from_micros(read_i64(reader)?)),
        KindTag::TimestampTz => Value::TimestampTz(Timestamp::from_micros(read_i64(reader)?)),
        KindTag::IntervalYear => {
            let years = read_i32(reader)?;
            let months = read_i32(reader)?;
            Value::IntervalYear(IntervalYearMonth::new(years, months)?)
        }
        KindTag::IntervalDay => {
            let days = read_i32(reader)?;
            let seconds = read_i32(reader)?;
            let micros = read_i32(reader)?;
            let precision = read_u8(reader)?;
            Value::IntervalDay(IntervalDayTime::from_micros(
                days, seconds, micros, precision,
            )?)
        }
        KindTag::List => {
            let element = read_type_at(reader, depth + 1)?;
            let count = read_u32(reader)? as usize;
            let mut items = Vec::with_capacity(count.min(PREALLOCATE_LIMIT));
            for _ in 0..count {
                items.push(read_literal_at(reader, depth + 1)?);
            }
            Value::List { element, items }
        }
        KindTag::Map => {
            let key = read_type_at(reader, depth + 1)?;
            let value = read_type_at(reader, depth + 1)?;
            let count = read_u32(reader)? as usize;
            let mut entries = Vec::with_capacity(count.min(PREALLOCATE_LIMIT));
            for _ in 0..count {
                let k = read_literal_at(reader, depth + 1)?;
                let v = read_literal_at(reader, depth + 1)?;
                entries.push((k, v));
            }
            Value::Map {
                key,
                value,
                entries,
            }
        }
        KindTag::Struct => {
            let count = read_u32(reader)? as usize;
            let mut types = Vec::with_capacity(count.min(PREALLOCATE_LIMIT));
            for _ in 0..count {
                types.push(read_type_at(reader, depth + 1)?);
            }
            let mut fields = Vec::with_capacity(types.len());
            for _ in 0..count {
                fields.push(read_literal_at(reader, depth + 1)?);
            }
            return Literal::struct_of(nullable, &types, fields);
        }
        KindTag::Null => Value::Null(read_type_at(reader, depth + 1)?),
    };
    Ok(Literal::new(nullable, value)?)
}

fn check_depth(depth: usize) -> std::result::Result<(), WireError> {
    if depth > MAX_DEPTH {
        return Err(WireError::CorruptedData(format!(
            "nesting deeper than {MAX_DEPTH} levels"
        )));
    }
    Ok(())
}

// Primitive helpers

pub(crate) fn write_u8<W: Write>(writer: &mut W, value: u8) -> std::result::Result<(), WireError> {
    writer.write_all(&[value])?;
    Ok(())
}

pub(crate) fn read_u8<R: Read>(reader: &mut R) -> std::result::Result<u8, WireError> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub(crate) fn write_bool<W: Write>(writer: &mut W, value: bool) -> std::result::Result<(), WireError> {
    write_u8(writer, u8::from(value))
}

pub(crate) fn read_bool<R: Read>(reader: &mut R) -> std::result::Result<bool, WireError> {
    match read_u8(reader)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(WireError::InvalidBool(other)),
    }
}

pub(crate) fn write_u32<W: Write>(writer: &mut W, value: u32) -> std::result::Result<(), WireError> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub(crate) fn read_u32<R: Read>(reader: &mut R) -> std::result::Result<u32, WireError> {
    Ok(u32::from_le_bytes(read_array(reader)?))
}

pub(crate) fn write_count<W: Write>(writer: &mut W, count: usize) -> std::result::Result<(), WireError> {
    let count = u32::try_from(count).map_err(|_| WireError::LengthOverflow(count))?;
    write_u32(writer, count)
}

pub(crate) fn write_u64<W: Write>(writer: &mut W, value: u64) -> std::result::Result<(), WireError> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub(crate) fn read_u64<R: Read>(reader: &mut R) -> std::result::Result<u64, WireError> {
    Ok(u64::from_le_bytes(read_array(reader)?))
}

fn write_i32<W: Write>(writer: &mut W, value: i32) -> std::result::Result<(), WireError> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn read_i32<R: Read>(reader: &mut R) -> std::result::Result<i32, WireError> {
    Ok(i32::from_le_bytes(read_array(reader)?))
}

fn write_i64<W: Write>(writer: &mut W, value: i64) -> std::result::Result<(), WireError> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn read_i64<R: Read>(reader: &mut R) -> std::result::Result<i64, WireError> {
    Ok(i64::from_le_bytes(read_array(reader)?))
}

fn read_array<R: Read, const N: usize>(reader: &mut R) -> std::result::Result<[u8; N], WireError> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

pub(crate) fn write_sized_bytes<W: Write>(writer: &mut W, data: &[u8]) -> std::result::Result<(), WireError> {
    write_count(writer, data.len())?;
    writer.write_all(data)?;
    Ok(())
}

pub(crate) fn read_sized_bytes<R: Read>(reader: &mut R) -> std::result::Result<Vec<u8>, WireError> {
    let len = read_u32(reader)? as usize;
    let mut data = Vec::with_capacity(len.min(PREALLOCATE_LIMIT));
    // take() bounds the read so a bogus length cannot force a huge allocation
    reader.take(len as u64).read_to_end(&mut data)?;
    if data.len() != len {
        return Err(WireError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("expected {len} bytes, found {}", data.len()),
        )));
    }
    Ok(data)
}

pub(crate) fn write_string<W: Write>(writer: &mut W, s: &str) -> std::result::Result<(), WireError> {
    write_sized_bytes(writer, s.as_bytes())
}

pub(crate) fn read_string<R: Read>(reader: &mut R) -> std::result::Result<String, WireError> {
    Ok(String::from_utf8(read_sized_bytes(reader)?)?)
}

//! Typed literal model for portable query plans.
//!
//! Literals are exact, validated and immutable. They serialize to a
//! self-describing little-endian wire format ([`wire`]), batch into
//! optionally compressed frames ([`compression`]), and convert to and from a
//! host engine's own literal model through [`adapter::LiteralAdapter`].

pub mod adapter;
pub mod compression;
pub mod decimal;
pub mod error;
pub mod extension;
pub mod file_format;
pub mod literal;
pub mod time;
pub mod types;
pub mod wire;

pub use adapter::{round_trip, LiteralAdapter};
pub use compression::{CompressionAlgorithm, Frame, FrameConfig, FrameHeader};
pub use decimal::Decimal;
pub use error::{Direction, Error, ErrorKind, Result};
pub use literal::{Literal, Value};
pub use time::{Date, IntervalDayTime, IntervalYearMonth, TimeOfDay, TimeUnit, Timestamp};
pub use types::{Kind, Type};
pub use wire::{from_wire, to_wire};

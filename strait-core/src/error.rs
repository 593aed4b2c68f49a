// Error types for strait

use thiserror::Error as ThisError;

/// Result alias used across strait-core
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse failure category shared by every layer.
///
/// Callers use this to decide whether to abort a whole plan conversion or
/// skip the offending subtree; the layered variants below carry the detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed construction input: wrong child count, out-of-range fields.
    Validation,
    /// Decimal magnitude exceeds what its precision can hold.
    OutOfRange,
    /// Wire decode met a tag it does not know.
    UnsupportedKind,
    /// The adapter cannot map a value in the requested direction.
    Unrepresentable,
    /// Declared type disagrees with the supplied payload.
    TypeMismatch,
}

/// Core conversion errors across strait layers
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Type descriptor error: {0}")]
    Type(#[from] TypeError),
    #[error("Decimal error: {0}")]
    Decimal(#[from] DecimalError),
    #[error("Temporal error: {0}")]
    Time(#[from] TimeError),
    #[error("Literal error: {0}")]
    Literal(#[from] LiteralError),
    #[error("Wire format error: {0}")]
    Wire(#[from] WireError),
    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),
    #[error("Extension error: {0}")]
    Extension(#[from] ExtensionError),
}

/// Type descriptor parameter errors
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum TypeError {
    #[error("decimal precision {0} outside [1, 38]")]
    PrecisionOutOfRange(u8),
    #[error("decimal scale {scale} exceeds precision {precision}")]
    ScaleOutOfRange { precision: u8, scale: u8 },
}

/// Fixed-point decimal codec errors
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum DecimalError {
    #[error("unscaled value {unscaled} does not fit in {precision} digits")]
    OutOfRange { unscaled: i128, precision: u8 },
    #[error("value carries {actual} fractional digits but scale is {expected}")]
    ScaleMismatch { expected: u8, actual: u32 },
    #[error("cannot read {length} bytes at offset {offset} from a buffer of {available}")]
    BufferBounds {
        offset: usize,
        length: usize,
        available: usize,
    },
    #[error("decimal buffer length must be between 1 and 16 bytes, got {0}")]
    InvalidLength(usize),
    #[error("cannot parse {0:?} as a decimal")]
    Parse(String),
    #[error(transparent)]
    InvalidParameters(#[from] TypeError),
}

/// Temporal normalization errors
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum TimeError {
    #[error("time of day {0} micros outside [0, 86400000000)")]
    TimeOfDayOutOfRange(i64),
    #[error("{year:04}-{month:02}-{day:02} is not a valid calendar date")]
    InvalidCalendarDate { year: i32, month: u32, day: u32 },
    #[error("{hour:02}:{minute:02}:{second:02}.{micros:06} is not a valid time of day")]
    InvalidClock {
        hour: u32,
        minute: u32,
        second: u32,
        micros: u32,
    },
    #[error("epoch day {0} is outside the supported calendar")]
    DateOutOfRange(i64),
    #[error("{0} overflows the microsecond range")]
    Overflow(String),
    #[error("interval {years} years {months} months is not normalized")]
    IntervalYearMonth { years: i32, months: i32 },
    #[error("interval field {field} = {value} outside [0, {bound})")]
    IntervalField {
        field: &'static str,
        value: i64,
        bound: i64,
    },
    #[error("fractional second precision {0} outside [1, 9]")]
    PrecisionOutOfRange(u8),
}

/// Literal tree construction errors
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum LiteralError {
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },
    #[error("struct declares {expected} fields but {actual} values were supplied")]
    ArityMismatch { expected: usize, actual: usize },
    #[error("cannot infer the type of an empty {0} without a declared type")]
    EmptyComposite(&'static str),
    #[error("{kind} literal of {actual} characters/bytes exceeds declared length {length}")]
    LengthExceeded {
        kind: &'static str,
        length: u32,
        actual: usize,
    },
    #[error("typed null requires a nullable type, got {0}")]
    NonNullableNull(String),
}

/// Wire format encoding/decoding errors
#[derive(Debug, ThisError)]
pub enum WireError {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid frame magic number")]
    InvalidMagicNumber,
    #[error("Unsupported kind tag {0:#04x}")]
    UnsupportedKind(u8),
    #[error("Unknown compression tag {0:#04x}")]
    UnknownCompression(u8),
    #[error("Invalid boolean byte {0:#04x}")]
    InvalidBool(u8),
    #[error("Invalid UTF-8 in string payload: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("{0} trailing bytes after literal")]
    TrailingBytes(usize),
    #[error("Length {0} does not fit the wire format")]
    LengthOverflow(usize),
    #[error("Compression failed: {0}")]
    CompressionError(String),
    #[error("Decompression failed: {0}")]
    DecompressionError(String),
    #[error("Corrupted data: {0}")]
    CorruptedData(String),
}

/// External adapter errors
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum AdapterError {
    #[error("{kind} has no equivalent on the {direction} side: {reason}")]
    Unrepresentable {
        kind: String,
        direction: Direction,
        reason: String,
    },
    #[error("host type {host_type} does not match value {value}")]
    HostMismatch { host_type: String, value: String },
}

/// Extension envelope and file format option errors
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ExtensionError {
    #[error("extension type url must not be empty")]
    EmptyTypeUrl,
    #[error("invalid {field}: {reason}")]
    InvalidOption { field: &'static str, reason: String },
}

/// Which way a conversion was heading when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Lift,
    Lower,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Lift => write!(f, "IR"),
            Direction::Lower => write!(f, "host"),
        }
    }
}

impl Error {
    /// Coarse category of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Type(_) => ErrorKind::Validation,
            Error::Decimal(e) => match e {
                DecimalError::OutOfRange { .. } => ErrorKind::OutOfRange,
                DecimalError::ScaleMismatch { .. } => ErrorKind::TypeMismatch,
                _ => ErrorKind::Validation,
            },
            Error::Time(_) => ErrorKind::Validation,
            Error::Literal(e) => match e {
                LiteralError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
                _ => ErrorKind::Validation,
            },
            Error::Wire(e) => match e {
                WireError::UnsupportedKind(_) => ErrorKind::UnsupportedKind,
                _ => ErrorKind::Validation,
            },
            Error::Adapter(e) => match e {
                AdapterError::Unrepresentable { .. } => ErrorKind::Unrepresentable,
                AdapterError::HostMismatch { .. } => ErrorKind::TypeMismatch,
            },
            Error::Extension(_) => ErrorKind::Validation,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Wire(WireError::Io(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_layers() {
        let err: Error = DecimalError::OutOfRange {
            unscaled: 1000,
            precision: 3,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);

        let err: Error = WireError::UnsupportedKind(0x7f).into();
        assert_eq!(err.kind(), ErrorKind::UnsupportedKind);

        let err: Error = LiteralError::ArityMismatch {
            expected: 2,
            actual: 3,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn io_errors_land_in_wire_layer() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short");
        let err: Error = io.into();
        assert!(matches!(err, Error::Wire(WireError::Io(_))));
        assert!(err.to_string().starts_with("Wire format error"));
    }
}

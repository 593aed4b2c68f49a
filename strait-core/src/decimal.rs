// Fixed-point decimal codec
//
// Encoded form: 16 bytes, little-endian two's complement, sign-extended.
// This is the layout the wire format embeds for every decimal literal.

use crate::error::DecimalError;
use crate::types::validate_decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of an encoded decimal buffer
pub const ENCODED_LEN: usize = 16;

/// Exact fixed-point number: `unscaled * 10^-scale`
///
/// Equality is structural. `10.0` at scale 1 and `10.00` at scale 2 are
/// different literals even though they are arithmetically equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DecimalRepr", into = "DecimalRepr")]
pub struct Decimal {
    unscaled: i128,
    precision: u8,
    scale: u8,
}

/// Human-editable form: the exact value as text plus its parameters
#[derive(Serialize, Deserialize)]
struct DecimalRepr {
    value: String,
    precision: u8,
    scale: u8,
}

impl TryFrom<DecimalRepr> for Decimal {
    type Error = DecimalError;

    fn try_from(repr: DecimalRepr) -> Result<Self, Self::Error> {
        Decimal::parse(&repr.value, repr.precision, repr.scale)
    }
}

impl From<Decimal> for DecimalRepr {
    fn from(decimal: Decimal) -> Self {
        DecimalRepr {
            value: decimal.to_string(),
            precision: decimal.precision,
            scale: decimal.scale,
        }
    }
}

/// `10^exp` for `exp <= 38`
pub(crate) const fn pow10(exp: u8) -> i128 {
    let mut value = 1i128;
    let mut i = 0;
    while i < exp {
        value *= 10;
        i += 1;
    }
    value
}

/// Largest unscaled magnitude a precision can hold
pub const fn max_unscaled(precision: u8) -> i128 {
    pow10(precision) - 1
}

fn check_range(unscaled: i128, precision: u8) -> Result<(), DecimalError> {
    // unsigned_abs keeps i128::MIN from overflowing
    if unscaled.unsigned_abs() > max_unscaled(precision) as u128 {
        return Err(DecimalError::OutOfRange {
            unscaled,
            precision,
        });
    }
    Ok(())
}

fn check_parameters(precision: u8, scale: u8) -> Result<(), DecimalError> {
    Ok(validate_decimal(precision, scale)?)
}

/// Encode an unscaled value into the 16-byte two's-complement layout.
///
/// Fails with `OutOfRange` when the value needs more than `precision` digits.
pub fn encode(unscaled: i128, precision: u8, scale: u8) -> Result<[u8; ENCODED_LEN], DecimalError> {
    check_parameters(precision, scale)?;
    check_range(unscaled, precision)?;
    Ok(unscaled.to_le_bytes())
}

/// Decode `length` little-endian bytes starting at `offset`, sign-extending
/// from the last byte read.
pub fn decode(buffer: &[u8], offset: usize, length: usize) -> Result<i128, DecimalError> {
    if length == 0 || length > ENCODED_LEN {
        return Err(DecimalError::InvalidLength(length));
    }
    let end = offset
        .checked_add(length)
        .filter(|end| *end <= buffer.len())
        .ok_or(DecimalError::BufferBounds {
            offset,
            length,
            available: buffer.len(),
        })?;
    let bytes = &buffer[offset..end];

    let fill = if bytes[length - 1] & 0x80 != 0 { 0xff } else { 0x00 };
    let mut wide = [fill; ENCODED_LEN];
    wide[..length].copy_from_slice(bytes);
    Ok(i128::from_le_bytes(wide))
}

impl Decimal {
    /// Build from an unscaled value that already matches `scale`.
    pub fn new(unscaled: i128, precision: u8, scale: u8) -> Result<Self, DecimalError> {
        check_parameters(precision, scale)?;
        check_range(unscaled, precision)?;
        Ok(Decimal {
            unscaled,
            precision,
            scale,
        })
    }

    /// Parse decimal text such as `-123.45` at the given precision and scale.
    ///
    /// Fewer fractional digits than `scale` are padded with zeros. More are a
    /// scale mismatch; no rounding ever happens.
    pub fn parse(text: &str, precision: u8, scale: u8) -> Result<Self, DecimalError> {
        check_parameters(precision, scale)?;

        let trimmed = text.trim();
        let (negative, digits) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };
        let well_formed = !(whole.is_empty() && fraction.is_empty())
            && whole.bytes().all(|b| b.is_ascii_digit())
            && fraction.bytes().all(|b| b.is_ascii_digit());
        if !well_formed {
            return Err(DecimalError::Parse(text.to_string()));
        }
        if fraction.len() > usize::from(scale) {
            return Err(DecimalError::ScaleMismatch {
                expected: scale,
                actual: fraction.len() as u32,
            });
        }

        let mut unscaled: i128 = 0;
        let padding = usize::from(scale) - fraction.len();
        let all_digits = whole
            .bytes()
            .chain(fraction.bytes())
            .chain(std::iter::repeat(b'0').take(padding));
        for digit in all_digits {
            unscaled = unscaled
                .checked_mul(10)
                .and_then(|v| v.checked_add(i128::from(digit - b'0')))
                .ok_or_else(|| DecimalError::Parse(text.to_string()))?;
        }
        if negative {
            unscaled = -unscaled;
        }
        Decimal::new(unscaled, precision, scale)
    }

    pub fn unscaled(&self) -> i128 {
        self.unscaled
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Encoded 16-byte form
    pub fn to_bytes(&self) -> [u8; ENCODED_LEN] {
        self.unscaled.to_le_bytes()
    }

    /// Decode a 16-byte buffer under the given parameters
    pub fn from_bytes(
        bytes: &[u8; ENCODED_LEN],
        precision: u8,
        scale: u8,
    ) -> Result<Self, DecimalError> {
        let unscaled = decode(bytes, 0, ENCODED_LEN)?;
        Decimal::new(unscaled, precision, scale)
    }

    /// Re-express at a larger scale without changing the value.
    ///
    /// Lowering the scale would need rounding and is refused.
    pub fn rescale(&self, precision: u8, scale: u8) -> Result<Self, DecimalError> {
        if scale < self.scale {
            return Err(DecimalError::ScaleMismatch {
                expected: scale,
                actual: u32::from(self.scale),
            });
        }
        check_parameters(precision, scale)?;
        let unscaled = self
            .unscaled
            .checked_mul(pow10(scale - self.scale))
            .ok_or(DecimalError::OutOfRange {
                unscaled: self.unscaled,
                precision,
            })?;
        Decimal::new(unscaled, precision, scale)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.unscaled.unsigned_abs().to_string();
        let sign = if self.unscaled < 0 { "-" } else { "" };
        let scale = usize::from(self.scale);
        if scale == 0 {
            return write!(f, "{sign}{magnitude}");
        }
        let padded = if magnitude.len() <= scale {
            format!("{}{}", "0".repeat(scale - magnitude.len() + 1), magnitude)
        } else {
            magnitude
        };
        let (whole, fraction) = padded.split_at(padded.len() - scale);
        write!(f, "{sign}{whole}.{fraction}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_extension() {
        let bytes = encode(-1, 10, 0).unwrap();
        assert_eq!(bytes, [0xff; 16]);
        // a 2-byte slice of -1 still decodes to -1
        assert_eq!(decode(&bytes, 0, 2).unwrap(), -1);
        assert_eq!(decode(&[0x7f, 0x00], 0, 2).unwrap(), 127);
        assert_eq!(decode(&[0x00, 0x80], 0, 2).unwrap(), -32768);
    }

    #[test]
    fn test_decode_bounds() {
        assert_eq!(decode(&[0u8; 4], 0, 0), Err(DecimalError::InvalidLength(0)));
        assert_eq!(
            decode(&[0u8; 4], 2, 4),
            Err(DecimalError::BufferBounds {
                offset: 2,
                length: 4,
                available: 4
            })
        );
    }

    #[test]
    fn test_display() {
        let d = Decimal::new(-123_457_890, 32, 6).unwrap();
        assert_eq!(d.to_string(), "-123.457890");
        let d = Decimal::new(5, 3, 3).unwrap();
        assert_eq!(d.to_string(), "0.005");
        let d = Decimal::new(-5, 3, 2).unwrap();
        assert_eq!(d.to_string(), "-0.05");
        let d = Decimal::new(42, 2, 0).unwrap();
        assert_eq!(d.to_string(), "42");
    }

    #[test]
    fn test_parse() {
        let d = Decimal::parse("123.45", 32, 6).unwrap();
        assert_eq!(d.unscaled(), 123_450_000);
        let d = Decimal::parse("-99.123456789123456789123456789123456789", 38, 36).unwrap();
        assert_eq!(d.to_string(), "-99.123456789123456789123456789123456789");
        assert!(matches!(
            Decimal::parse("1.234", 5, 2),
            Err(DecimalError::ScaleMismatch { .. })
        ));
        assert!(matches!(
            Decimal::parse("12a", 5, 0),
            Err(DecimalError::Parse(_))
        ));
        assert!(matches!(
            Decimal::parse("1000", 3, 0),
            Err(DecimalError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_rescale() {
        let d = Decimal::new(12345, 5, 2).unwrap();
        let wider = d.rescale(10, 6).unwrap();
        assert_eq!(wider.unscaled(), 123_450_000);
        assert!(wider.rescale(10, 2).is_err());
    }
}

// Extension envelope - opaque typed payloads carried through untouched

use crate::error::{ExtensionError, Result, WireError};
use crate::wire::{read_bool, read_sized_bytes, read_string, read_u32, write_bool, write_count};
use crate::wire::{write_sized_bytes, write_string};
use bstr::ByteSlice;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};

/// A typed blob: a type URL naming the schema and the encoded message
///
/// The payload is never introspected; it is carried for whoever understands
/// the type URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "AnyRepr")]
pub struct Any {
    type_url: String,
    value: Vec<u8>,
}

#[derive(Deserialize)]
struct AnyRepr {
    type_url: String,
    value: Vec<u8>,
}

impl TryFrom<AnyRepr> for Any {
    type Error = ExtensionError;

    fn try_from(repr: AnyRepr) -> std::result::Result<Self, Self::Error> {
        Any::new(repr.type_url, repr.value)
    }
}

impl Any {
    pub fn new(
        type_url: impl Into<String>,
        value: impl Into<Vec<u8>>,
    ) -> std::result::Result<Self, ExtensionError> {
        let type_url = type_url.into();
        if type_url.is_empty() {
            return Err(ExtensionError::EmptyTypeUrl);
        }
        Ok(Any {
            type_url,
            value: value.into(),
        })
    }

    pub fn type_url(&self) -> &str {
        &self.type_url
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_string(writer, &self.type_url)?;
        write_sized_bytes(writer, &self.value)?;
        Ok(())
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let type_url = read_string(reader)?;
        let value = read_sized_bytes(reader)?;
        Ok(Any::new(type_url, value)?)
    }
}

impl fmt::Display for Any {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.type_url, self.value.as_bstr())
    }
}

/// Producer-specific hints attached to a plan node
///
/// Optimizations may be ignored by a consumer; an enhancement changes
/// semantics and must be understood to be honored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdvancedExtension {
    pub optimizations: Vec<Any>,
    pub enhancement: Option<Any>,
}

impl AdvancedExtension {
    pub fn new(optimizations: Vec<Any>, enhancement: Option<Any>) -> Self {
        AdvancedExtension {
            optimizations,
            enhancement,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.optimizations.is_empty() && self.enhancement.is_none()
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Vec::new();
        self.write_to(&mut writer)?;
        Ok(writer)
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_count(writer, self.optimizations.len())?;
        for optimization in &self.optimizations {
            optimization.write_to(writer)?;
        }
        write_bool(writer, self.enhancement.is_some())?;
        if let Some(enhancement) = &self.enhancement {
            enhancement.write_to(writer)?;
        }
        Ok(())
    }

    /// Read from bytes; trailing bytes are an error
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut reader = std::io::Cursor::new(data);
        let extension = Self::read_from(&mut reader)?;
        let remaining = data.len() - reader.position() as usize;
        if remaining != 0 {
            return Err(WireError::TrailingBytes(remaining).into());
        }
        Ok(extension)
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let count = read_u32(reader)?;
        let mut optimizations = Vec::new();
        for _ in 0..count {
            optimizations.push(Any::read_from(reader)?);
        }
        let enhancement = if read_bool(reader)? {
            Some(Any::read_from(reader)?)
        } else {
            None
        };
        Ok(AdvancedExtension {
            optimizations,
            enhancement,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_requires_type_url() {
        assert_eq!(Any::new("", vec![1]), Err(ExtensionError::EmptyTypeUrl));
        let any = Any::new("type.example/Hint", b"\x01\x02".to_vec()).unwrap();
        assert_eq!(any.type_url(), "type.example/Hint");
        assert_eq!(any.value(), &[1, 2]);
    }

    #[test]
    fn test_advanced_extension_passthrough() {
        let ext = AdvancedExtension::new(
            vec![
                Any::new("type.example/A", b"opaque".to_vec()).unwrap(),
                Any::new("type.example/B", Vec::new()).unwrap(),
            ],
            Some(Any::new("type.example/E", vec![0xde, 0xad]).unwrap()),
        );
        let bytes = ext.to_bytes().unwrap();
        assert_eq!(AdvancedExtension::from_bytes(&bytes).unwrap(), ext);

        let empty = AdvancedExtension::default();
        assert!(empty.is_empty());
        assert_eq!(empty.to_bytes().unwrap(), vec![0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_json_rejects_empty_type_url() {
        let json = r#"{"type_url":"","value":[1]}"#;
        assert!(serde_json::from_str::<Any>(json).is_err());
    }
}

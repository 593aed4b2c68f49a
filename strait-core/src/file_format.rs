// File format variants for read relations

use crate::error::{ExtensionError, Result, WireError};
use crate::extension::Any;
use crate::wire::{read_bool, read_string, read_u64, read_u8, write_bool, write_string};
use crate::wire::{write_u64, write_u8};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Storage format of a scanned file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    Parquet,
    Arrow,
    Orc,
    Dwrf,
    DelimiterSeparatedText(DelimiterSeparatedTextOptions),
    /// Producer-defined format described by an opaque envelope
    Extension(Any),
}

/// Options for CSV-like formats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TextOptionsRepr")]
pub struct DelimiterSeparatedTextOptions {
    field_delimiter: String,
    max_line_size: u64,
    quote: String,
    header_lines_to_skip: u64,
    escape: String,
    value_treated_as_null: Option<String>,
}

#[derive(Deserialize)]
struct TextOptionsRepr {
    field_delimiter: String,
    max_line_size: u64,
    quote: String,
    header_lines_to_skip: u64,
    escape: String,
    value_treated_as_null: Option<String>,
}

impl TryFrom<TextOptionsRepr> for DelimiterSeparatedTextOptions {
    type Error = ExtensionError;

    fn try_from(repr: TextOptionsRepr) -> std::result::Result<Self, Self::Error> {
        DelimiterSeparatedTextOptions::new(
            repr.field_delimiter,
            repr.max_line_size,
            repr.quote,
            repr.header_lines_to_skip,
            repr.escape,
            repr.value_treated_as_null,
        )
    }
}

fn single_char(field: &'static str, value: &str) -> std::result::Result<(), ExtensionError> {
    if value.chars().count() == 1 {
        Ok(())
    } else {
        Err(ExtensionError::InvalidOption {
            field,
            reason: format!("expected a single character, got {value:?}"),
        })
    }
}

impl DelimiterSeparatedTextOptions {
    pub fn new(
        field_delimiter: impl Into<String>,
        max_line_size: u64,
        quote: impl Into<String>,
        header_lines_to_skip: u64,
        escape: impl Into<String>,
        value_treated_as_null: Option<String>,
    ) -> std::result::Result<Self, ExtensionError> {
        let field_delimiter = field_delimiter.into();
        let quote = quote.into();
        let escape = escape.into();
        if field_delimiter.is_empty() {
            return Err(ExtensionError::InvalidOption {
                field: "field_delimiter",
                reason: "must not be empty".to_string(),
            });
        }
        single_char("quote", &quote)?;
        single_char("escape", &escape)?;
        Ok(DelimiterSeparatedTextOptions {
            field_delimiter,
            max_line_size,
            quote,
            header_lines_to_skip,
            escape,
            value_treated_as_null,
        })
    }

    pub fn field_delimiter(&self) -> &str {
        &self.field_delimiter
    }

    pub fn max_line_size(&self) -> u64 {
        self.max_line_size
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    pub fn header_lines_to_skip(&self) -> u64 {
        self.header_lines_to_skip
    }

    pub fn escape(&self) -> &str {
        &self.escape
    }

    pub fn value_treated_as_null(&self) -> Option<&str> {
        self.value_treated_as_null.as_deref()
    }
}

impl FileFormat {
    fn tag(&self) -> u8 {
        match self {
            FileFormat::Parquet => 0,
            FileFormat::Arrow => 1,
            FileFormat::Orc => 2,
            FileFormat::Dwrf => 3,
            FileFormat::DelimiterSeparatedText(_) => 4,
            FileFormat::Extension(_) => 5,
        }
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Vec::new();
        self.write_to(&mut writer)?;
        Ok(writer)
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_u8(writer, self.tag())?;
        match self {
            FileFormat::DelimiterSeparatedText(options) => {
                write_string(writer, &options.field_delimiter)?;
                write_u64(writer, options.max_line_size)?;
                write_string(writer, &options.quote)?;
                write_u64(writer, options.header_lines_to_skip)?;
                write_string(writer, &options.escape)?;
                write_bool(writer, options.value_treated_as_null.is_some())?;
                if let Some(null) = &options.value_treated_as_null {
                    write_string(writer, null)?;
                }
            }
            FileFormat::Extension(any) => any.write_to(writer)?,
            _ => {}
        }
        Ok(())
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut reader = std::io::Cursor::new(data);
        let format = Self::read_from(&mut reader)?;
        let remaining = data.len() - reader.position() as usize;
        if remaining != 0 {
            return Err(WireError::TrailingBytes(remaining).into());
        }
        Ok(format)
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let format = match read_u8(reader)? {
            0 => FileFormat::Parquet,
            1 => FileFormat::Arrow,
            2 => FileFormat::Orc,
            3 => FileFormat::Dwrf,
            4 => {
                let field_delimiter = read_string(reader)?;
                let max_line_size = read_u64(reader)?;
                let quote = read_string(reader)?;
                let header_lines_to_skip = read_u64(reader)?;
                let escape = read_string(reader)?;
                let value_treated_as_null = if read_bool(reader)? {
                    Some(read_string(reader)?)
                } else {
                    None
                };
                FileFormat::DelimiterSeparatedText(DelimiterSeparatedTextOptions::new(
                    field_delimiter,
                    max_line_size,
                    quote,
                    header_lines_to_skip,
                    escape,
                    value_treated_as_null,
                )?)
            }
            5 => FileFormat::Extension(Any::read_from(reader)?),
            other => return Err(WireError::UnsupportedKind(other).into()),
        };
        Ok(format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn csv() -> DelimiterSeparatedTextOptions {
        DelimiterSeparatedTextOptions::new(",", 1 << 20, "\"", 1, "\\", Some("NULL".to_string()))
            .unwrap()
    }

    #[test]
    fn test_options_validated_eagerly() {
        assert!(DelimiterSeparatedTextOptions::new("", 10, "\"", 0, "\\", None).is_err());
        assert!(DelimiterSeparatedTextOptions::new("|", 10, "''", 0, "\\", None).is_err());
        assert!(DelimiterSeparatedTextOptions::new("|", 10, "'", 0, "", None).is_err());
        // multi-character delimiters are allowed
        assert!(DelimiterSeparatedTextOptions::new("||", 10, "'", 0, "\\", None).is_ok());
    }

    #[test]
    fn test_format_passthrough() {
        let formats = [
            FileFormat::Parquet,
            FileFormat::Orc,
            FileFormat::DelimiterSeparatedText(csv()),
            FileFormat::Extension(Any::new("type.example/Avro", b"cfg".to_vec()).unwrap()),
        ];
        for format in formats {
            let bytes = format.to_bytes().unwrap();
            assert_eq!(FileFormat::from_bytes(&bytes).unwrap(), format);
        }
    }

    #[test]
    fn test_unknown_format_tag() {
        let err = FileFormat::from_bytes(&[42]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedKind);
    }

    #[test]
    fn test_json_revalidates_options() {
        let json = serde_json::to_string(&FileFormat::DelimiterSeparatedText(csv())).unwrap();
        let back: FileFormat = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FileFormat::DelimiterSeparatedText(csv()));
        let bad = json.replace(r#""quote":"\"""#, r#""quote":"""#);
        assert!(serde_json::from_str::<FileFormat>(&bad).is_err());
    }
}

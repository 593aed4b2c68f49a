// Framing for batches of wire-encoded literals
//
// Frame layout:
// ```text
// [Magic Number: 16 bytes] "||STRAIT||0001||"
// [Compression: 1 byte] 0 = none, 1 = zstd (followed by level, i32 LE)
// [Uncompressed Size: 4 bytes] u32 LE
// [Compressed Size: 4 bytes] u32 LE
// [Payload: N bytes] literal count (u32 LE) then each literal, optionally compressed
// ```

use crate::error::{Result, WireError};
use crate::literal::Literal;
use crate::wire::{
    read_literal, read_u32, read_u8, write_count, write_literal, write_u32, write_u8,
    PREALLOCATE_LIMIT,
};
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read, Write};

/// The format version is embedded in the magic number.
const MAGIC_NUMBER: &[u8; 16] = b"||STRAIT||0001||";

const TAG_NONE: u8 = 0;
const TAG_ZSTD: u8 = 1;

/// Compression applied to a frame payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionAlgorithm {
    /// No compression
    None,
    /// Zstd compression with configurable level (1-22)
    Zstd { level: i32 },
}

/// Settings for writing frames
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameConfig {
    pub compression: CompressionAlgorithm,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            compression: CompressionAlgorithm::Zstd { level: 3 },
        }
    }
}

/// What a frame header says about its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub compression: CompressionAlgorithm,
    pub uncompressed_size: u32,
    pub compressed_size: u32,
}

/// A batch of literals written as one unit
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    literals: Vec<Literal>,
}

impl Frame {
    pub fn new(literals: Vec<Literal>) -> Self {
        Frame { literals }
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn into_literals(self) -> Vec<Literal> {
        self.literals
    }

    /// Serialize to bytes
    pub fn to_bytes(&self, config: &FrameConfig) -> Result<Vec<u8>> {
        let mut writer = Vec::new();
        self.write_to(&mut writer, config)?;
        Ok(writer)
    }

    /// Write to a writer
    pub fn write_to<W: Write>(&self, writer: &mut W, config: &FrameConfig) -> Result<FrameHeader> {
        let mut payload = Vec::new();
        write_count(&mut payload, self.literals.len())?;
        for literal in &self.literals {
            write_literal(&mut payload, literal)?;
        }
        let compressed = compress(&payload, &config.compression)?;

        let header = FrameHeader {
            compression: config.compression,
            uncompressed_size: size_of(payload.len())?,
            compressed_size: size_of(compressed.len())?,
        };
        tracing::debug!(
            literals = self.literals.len(),
            uncompressed = header.uncompressed_size,
            compressed = header.compressed_size,
            "writing frame"
        );

        writer.write_all(MAGIC_NUMBER)?;
        match config.compression {
            CompressionAlgorithm::None => write_u8(writer, TAG_NONE)?,
            CompressionAlgorithm::Zstd { level } => {
                write_u8(writer, TAG_ZSTD)?;
                writer.write_all(&level.to_le_bytes())?;
            }
        }
        write_u32(writer, header.uncompressed_size)?;
        write_u32(writer, header.compressed_size)?;
        writer.write_all(&compressed)?;
        Ok(header)
    }

    /// Read from bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut reader = Cursor::new(data);
        let (_, frame) = Self::read_from(&mut reader)?;
        Ok(frame)
    }

    /// Read from a reader, returning the header alongside the literals
    pub fn read_from<R: Read>(reader: &mut R) -> Result<(FrameHeader, Self)> {
        let mut magic = [0u8; 16];
        reader.read_exact(&mut magic)?;
        if &magic != MAGIC_NUMBER {
            return Err(WireError::InvalidMagicNumber.into());
        }

        let compression = match read_u8(reader)? {
            TAG_NONE => CompressionAlgorithm::None,
            TAG_ZSTD => {
                let mut level = [0u8; 4];
                reader.read_exact(&mut level)?;
                CompressionAlgorithm::Zstd {
                    level: i32::from_le_bytes(level),
                }
            }
            other => return Err(WireError::UnknownCompression(other).into()),
        };
        let header = FrameHeader {
            compression,
            uncompressed_size: read_u32(reader)?,
            compressed_size: read_u32(reader)?,
        };

        let mut compressed = Vec::new();
        reader
            .take(u64::from(header.compressed_size))
            .read_to_end(&mut compressed)?;
        if compressed.len() != header.compressed_size as usize {
            return Err(WireError::CorruptedData(format!(
                "frame declares {} payload bytes but only {} remain",
                header.compressed_size,
                compressed.len()
            ))
            .into());
        }
        let payload = decompress(&compressed, &compression, header.uncompressed_size as usize)?;

        let mut cursor = Cursor::new(payload.as_slice());
        let count = read_u32(&mut cursor)? as usize;
        let mut literals = Vec::with_capacity(count.min(PREALLOCATE_LIMIT));
        for _ in 0..count {
            literals.push(read_literal(&mut cursor)?);
        }
        if cursor.position() as usize != payload.len() {
            return Err(WireError::CorruptedData(format!(
                "{} bytes left over after {count} literals",
                payload.len() - cursor.position() as usize
            ))
            .into());
        }
        tracing::debug!(literals = literals.len(), "read frame");
        Ok((header, Frame { literals }))
    }
}

fn size_of(len: usize) -> std::result::Result<u32, WireError> {
    u32::try_from(len).map_err(|_| WireError::LengthOverflow(len))
}

/// Compress a payload using the specified algorithm
pub fn compress(data: &[u8], algorithm: &CompressionAlgorithm) -> Result<Vec<u8>> {
    match algorithm {
        CompressionAlgorithm::None => Ok(data.to_vec()),
        CompressionAlgorithm::Zstd { level } => zstd::bulk::compress(data, *level)
            .map_err(|e| WireError::CompressionError(format!("Zstd compression failed: {e}")).into()),
    }
}

/// Decompress a payload whose original size is known from the frame header
pub fn decompress(
    data: &[u8],
    algorithm: &CompressionAlgorithm,
    uncompressed_size: usize,
) -> Result<Vec<u8>> {
    let output = match algorithm {
        CompressionAlgorithm::None => data.to_vec(),
        CompressionAlgorithm::Zstd { .. } => {
            let failed = |e: std::io::Error| {
                WireError::DecompressionError(format!("Zstd decompression failed: {e}"))
            };
            // the header size is untrusted: grow as data arrives, stop one byte past it
            let mut output = Vec::with_capacity(uncompressed_size.min(PREALLOCATE_LIMIT));
            zstd::stream::read::Decoder::with_buffer(data)
                .map_err(failed)?
                .take(uncompressed_size as u64 + 1)
                .read_to_end(&mut output)
                .map_err(failed)?;
            output
        }
    };
    if output.len() != uncompressed_size {
        return Err(WireError::CorruptedData(format!(
            "payload is {} bytes, header says {uncompressed_size}",
            output.len()
        ))
        .into());
    }
    Ok(output)
}

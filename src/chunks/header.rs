//! The 12 byte RIFF container header.
use std::fmt::{Display, Formatter};

#[cfg(feature = "colored")]
use colored::Colorize;

use crate::{
    chunks::{put_le, put_str, Chunk, EncodeChunk, BW64, RF64, RIFF, WAVE},
    options::DecodeOptions,
    reader::CursorReader,
    WavChunksError, WavChunksResult,
};

pub const HEADER_SIZE: usize = 12;

/// ``RIFF``/``RF64``/``BW64``, the container size, and the ``WAVE`` form type.
///
/// RF64 and BW64 files set ``size`` to ``0xFFFFFFFF`` and carry the real sizes in a ``ds64`` chunk,
/// so the size is recorded but never used to bound the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderChunk {
    pub chunk_id: String,
    pub size: u32,
    pub format: String,
}

impl HeaderChunk {
    /// A plain ``RIFF``/``WAVE`` header for a file of ``size + 8`` bytes.
    pub fn new(size: u32) -> Self {
        HeaderChunk {
            size,
            ..Default::default()
        }
    }

    pub fn is_rf64(&self) -> bool {
        self.chunk_id.as_bytes() != RIFF
    }
}

impl Default for HeaderChunk {
    fn default() -> Self {
        HeaderChunk {
            chunk_id: "RIFF".to_string(),
            size: 0,
            format: "WAVE".to_string(),
        }
    }
}

impl Chunk for HeaderChunk {
    fn id(&self) -> &[u8; 4] {
        match self.chunk_id.as_bytes() {
            b"RF64" => &RF64,
            b"BW64" => &BW64,
            _ => &RIFF,
        }
    }

    fn decode(reader: &mut CursorReader, _options: &DecodeOptions) -> WavChunksResult<Self> {
        let chunk_id = reader.read_tag()?;
        if ![RIFF, RF64, BW64].iter().any(|id| id == chunk_id.as_bytes()) {
            return Err(WavChunksError::InvalidHeader {
                expected: "'RIFF', 'RF64', or 'BW64'",
                found: chunk_id,
            });
        }
        let size = reader.read_u32(true)?;
        let format = reader.read_tag()?;
        if format.as_bytes() != WAVE {
            return Err(WavChunksError::InvalidHeader {
                expected: "'WAVE'",
                found: format,
            });
        }
        Ok(HeaderChunk {
            chunk_id,
            size,
            format,
        })
    }
}

impl EncodeChunk for HeaderChunk {
    fn size(&self) -> u32 {
        self.size
    }

    fn as_bytes(&self) -> Box<[u8]> {
        let mut buf = [0u8; HEADER_SIZE];
        put_str(&mut buf, 0, &self.chunk_id, 4);
        put_le(&mut buf, 4, self.size);
        put_str(&mut buf, 8, &self.format, 4);
        Box::new(buf)
    }
}

#[cfg(feature = "colored")]
impl Display for HeaderChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n\t{} {}\n\t{} {}\n\t{} {}",
            "HeaderChunk: ".white().bold().underline(),
            "chunk_id:".green().bold(),
            self.chunk_id.white(),
            "size:".green().bold(),
            self.size.to_string().white(),
            "format:".green().bold(),
            self.format.white()
        )
    }
}

#[cfg(not(feature = "colored"))]
impl Display for HeaderChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "HeaderChunk: chunk_id: {}, size: {}, format: {}",
            self.chunk_id, self.size, self.format
        )
    }
}

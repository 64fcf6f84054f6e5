use std::fmt::{Display, Formatter};

#[cfg(feature = "colored")]
use colored::Colorize;

use crate::{
    chunks::{read_chunk_header, Chunk, FmtChunk, DATA},
    log,
    options::DecodeOptions,
    reader::CursorReader,
    WavChunksResult,
};

/// The ``data`` chunk. Samples are left in the record's raw bytes, only their extent is decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct DataChunk {
    /// Declared body size.
    pub size: u32,
    /// Body bytes actually present after padding and clamping.
    pub data_len: usize,
    /// Playback length in seconds. ``None`` until a format chunk supplies the byte rate.
    pub duration: Option<f64>,
}

impl DataChunk {
    /// Fills in ``duration`` from the byte rate of ``format``.
    pub fn with_format(mut self, format: &FmtChunk) -> Self {
        self.duration = format.duration_of(self.data_len);
        self
    }
}

impl Chunk for DataChunk {
    fn id(&self) -> &[u8; 4] {
        &DATA
    }

    fn decode(reader: &mut CursorReader, _options: &DecodeOptions) -> WavChunksResult<Self> {
        let (_id, size) = read_chunk_header(reader)?;
        let data_len = reader.remaining_bytes();
        log!(log::Level::Debug, "decode data: {} data bytes", data_len);
        Ok(DataChunk {
            size,
            data_len,
            duration: None,
        })
    }
}

#[cfg(feature = "colored")]
impl Display for DataChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let duration = self
            .duration
            .map_or_else(|| "unknown".to_string(), |d| format!("{:.3}s", d));
        write!(
            f,
            "{}\n\t{} {}\n\t{} {}",
            "DataChunk: ".white().bold().underline(),
            "bytes:".green().bold(),
            self.data_len.to_string().white(),
            "duration:".green().bold(),
            duration.white()
        )
    }
}

#[cfg(not(feature = "colored"))]
impl Display for DataChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.duration {
            Some(duration) => write!(
                f,
                "DataChunk: bytes: {}, duration: {:.3}s",
                self.data_len, duration
            ),
            None => write!(f, "DataChunk: bytes: {}, duration: unknown", self.data_len),
        }
    }
}

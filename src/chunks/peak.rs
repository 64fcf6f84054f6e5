use std::fmt::{Display, Formatter};

use crate::{
    chunks::{read_chunk_header, Chunk, PEAK},
    options::DecodeOptions,
    reader::CursorReader,
    WavChunksResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeakChunk {
    pub version: u32,
    /// Unix timestamp of creation.
    pub timestamp: u32,
    /// Sample frame of the peak.
    pub peak_pointer: u32,
    pub bit_align: u32,
}

impl Chunk for PeakChunk {
    fn id(&self) -> &[u8; 4] {
        &PEAK
    }

    fn decode(reader: &mut CursorReader, _options: &DecodeOptions) -> WavChunksResult<Self> {
        read_chunk_header(reader)?;
        Ok(PeakChunk {
            version: reader.read_u32(true)?,
            timestamp: reader.read_u32(true)?,
            peak_pointer: reader.read_u32(true)?,
            bit_align: reader.read_u32(true)?,
        })
    }
}

impl Display for PeakChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PeakChunk: version: {}, timestamp: {}, peak_pointer: {}",
            self.version, self.timestamp, self.peak_pointer
        )
    }
}

use std::fmt::{Display, Formatter};

#[cfg(feature = "colored")]
use colored::Colorize;

use crate::{
    chunks::{read_chunk_header, Chunk, CUE},
    log,
    options::DecodeOptions,
    reader::CursorReader,
    WavChunksResult,
};

/// The ``cue `` chunk: numbered positions in the sample data. ``LIST``/``adtl`` entries attach
/// text to them by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueChunk {
    pub number_cue_points: u32,
    pub points: Vec<CuePoint>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CuePoint {
    pub id: u32,
    /// Sample position in the play order, 0 without a playlist.
    pub position: u32,
    /// ``data`` or ``slnt``.
    pub chunk_id: String,
    pub chunk_start: u32,
    pub block_start: u32,
    /// Sample offset into the block at ``block_start``.
    pub sample_offset: u32,
}

impl Chunk for CueChunk {
    fn id(&self) -> &[u8; 4] {
        &CUE
    }

    fn decode(reader: &mut CursorReader, _options: &DecodeOptions) -> WavChunksResult<Self> {
        read_chunk_header(reader)?;
        let number_cue_points = reader.read_u32(true)?;
        let mut points = Vec::new();
        for _ in 0..number_cue_points {
            points.push(CuePoint {
                id: reader.read_u32(true)?,
                position: reader.read_u32(true)?,
                chunk_id: reader.read_tag()?,
                chunk_start: reader.read_u32(true)?,
                block_start: reader.read_u32(true)?,
                sample_offset: reader.read_u32(true)?,
            });
        }
        if reader.remaining_bytes() > 0 {
            log!(
                log::Level::Debug,
                "cue: {} bytes left over after {} points",
                reader.remaining_bytes(),
                number_cue_points
            );
        }
        Ok(CueChunk {
            number_cue_points,
            points,
        })
    }
}

#[cfg(feature = "colored")]
impl Display for CueChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", "CueChunk: ".white().bold().underline())?;
        for point in &self.points {
            write!(
                f,
                "\n\t{} {} ({} @ {})",
                "cue".green().bold(),
                point.id.to_string().white(),
                point.chunk_id,
                point.sample_offset
            )?;
        }
        Ok(())
    }
}

#[cfg(not(feature = "colored"))]
impl Display for CueChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "CueChunk:")?;
        for point in &self.points {
            write!(
                f,
                "\n\tcue {} ({} @ {})",
                point.id, point.chunk_id, point.sample_offset
            )?;
        }
        Ok(())
    }
}

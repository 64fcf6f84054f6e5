use std::fmt::{Display, Formatter};

use crate::{
    chunks::{read_chunk_header, Chunk, JUNK, PAD},
    options::DecodeOptions,
    reader::CursorReader,
    WavChunksResult,
};

/// ``JUNK`` and ``PAD `` chunks: filler that reserves space or aligns the data chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaddingChunk {
    pub id: [u8; 4],
    /// Body size, including the pad byte when odd sizes are rounded.
    pub size: u32,
}

impl Chunk for PaddingChunk {
    fn id(&self) -> &[u8; 4] {
        &self.id
    }

    fn decode(reader: &mut CursorReader, options: &DecodeOptions) -> WavChunksResult<Self> {
        let (id, mut size) = read_chunk_header(reader)?;
        if options.round_odd_chunks() && size % 2 != 0 {
            size = size.saturating_add(1);
        }
        let id = match id.as_bytes() {
            tag if tag == PAD => PAD,
            _ => JUNK,
        };
        Ok(PaddingChunk { id, size })
    }
}

impl Display for PaddingChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PaddingChunk ({}): {} bytes",
            crate::chunks::tag_str(&self.id),
            self.size
        )
    }
}

use std::fmt::{Display, Formatter};

use crate::{
    chunks::{read_chunk_header, Chunk, DISP},
    options::DecodeOptions,
    reader::CursorReader,
    WavChunksResult,
};

/// Clipboard format of the data a ``DISP`` chunk attaches to the file. ``CF_TEXT`` is 1.
pub const CF_TEXT: u32 = 1;

/// The ``DISP`` chunk: how the file should be shown, as one of the Windows clipboard formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayChunk {
    pub display_type: u32,
    pub data: u16,
}

impl Chunk for DisplayChunk {
    fn id(&self) -> &[u8; 4] {
        &DISP
    }

    fn decode(reader: &mut CursorReader, _options: &DecodeOptions) -> WavChunksResult<Self> {
        read_chunk_header(reader)?;
        Ok(DisplayChunk {
            display_type: reader.read_u32(true)?,
            data: reader.read_u16(true)?,
        })
    }
}

impl Display for DisplayChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "DisplayChunk: type: {}, data: {}", self.display_type, self.data)
    }
}

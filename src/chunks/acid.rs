use std::fmt::{Display, Formatter};

use crate::{
    chunks::{read_chunk_header, Chunk, ACID},
    options::DecodeOptions,
    reader::CursorReader,
    WavChunksResult,
};

pub const ACID_ONE_SHOT: u32 = 0x01;
pub const ACID_ROOT_NOTE_SET: u32 = 0x02;
pub const ACID_STRETCH: u32 = 0x04;
pub const ACID_DISK_BASED: u32 = 0x08;

/// The ``acid`` chunk written by Acid Pro and friends: loop and tempo metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcidChunk {
    /// Bit flags, see the ``ACID_*`` constants.
    pub type_flags: u32,
    pub root_note: u16,
    pub unknown1: u16,
    pub unknown2: u32,
    pub beats: u32,
    pub meter_denominator: u16,
    pub meter_numerator: u16,
    pub tempo: u32,
}

impl AcidChunk {
    pub fn is_one_shot(&self) -> bool {
        self.type_flags & ACID_ONE_SHOT != 0
    }
}

impl Chunk for AcidChunk {
    fn id(&self) -> &[u8; 4] {
        &ACID
    }

    fn decode(reader: &mut CursorReader, _options: &DecodeOptions) -> WavChunksResult<Self> {
        read_chunk_header(reader)?;
        Ok(AcidChunk {
            type_flags: reader.read_u32(true)?,
            root_note: reader.read_u16(true)?,
            unknown1: reader.read_u16(true)?,
            unknown2: reader.read_u32(true)?,
            beats: reader.read_u32(true)?,
            meter_denominator: reader.read_u16(true)?,
            meter_numerator: reader.read_u16(true)?,
            tempo: reader.read_u32(true)?,
        })
    }
}

impl Display for AcidChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AcidChunk: flags: {:#x}, root_note: {}, beats: {}, meter: {}/{}, tempo: {}",
            self.type_flags,
            self.root_note,
            self.beats,
            self.meter_numerator,
            self.meter_denominator,
            self.tempo
        )
    }
}

use std::fmt::{Display, Formatter};

use crate::{
    chunks::{read_chunk_header, Chunk, INST},
    options::DecodeOptions,
    reader::CursorReader,
    WavChunksResult,
};

/// The ``inst`` chunk: how a sampler should map the sample onto the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstrumentChunk {
    /// MIDI note of the original, unshifted pitch (0 - 127).
    pub unshifted_note: u8,
    /// Fine tuning in cents (-50 - 50).
    pub fine_tuning: i8,
    /// Suggested gain in decibels.
    pub gain: i8,
    pub low_note: u8,
    pub high_note: u8,
    pub low_velocity: u8,
    pub high_velocity: u8,
}

impl Chunk for InstrumentChunk {
    fn id(&self) -> &[u8; 4] {
        &INST
    }

    fn decode(reader: &mut CursorReader, _options: &DecodeOptions) -> WavChunksResult<Self> {
        read_chunk_header(reader)?;
        Ok(InstrumentChunk {
            unshifted_note: reader.read_u8()?,
            fine_tuning: reader.read_i8()?,
            gain: reader.read_i8()?,
            low_note: reader.read_u8()?,
            high_note: reader.read_u8()?,
            low_velocity: reader.read_u8()?,
            high_velocity: reader.read_u8()?,
        })
    }
}

impl Display for InstrumentChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "InstrumentChunk: note: {}, fine_tuning: {}, gain: {}, notes: {}-{}, velocities: {}-{}",
            self.unshifted_note,
            self.fine_tuning,
            self.gain,
            self.low_note,
            self.high_note,
            self.low_velocity,
            self.high_velocity
        )
    }
}

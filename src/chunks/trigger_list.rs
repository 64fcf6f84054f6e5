use std::fmt::{Display, Formatter};

use crate::{
    chunks::{read_chunk_header, Chunk, TLST},
    options::DecodeOptions,
    reader::CursorReader,
    WavChunksResult,
};

/// The ``tlst`` chunk written by Sound Forge: a trigger that starts playback of cue points or
/// playlist entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerListChunk {
    /// The list this entry references, cue or playlist.
    pub list: u32,
    /// Cue point name or playlist entry, by index.
    pub name: String,
    /// 0 SMPTE, 1 MIDI command, 2 MIDI SysEx.
    pub trigger_type: u32,
    /// Hours, minutes, seconds, frames for SMPTE; channel, command and two params for MIDI.
    pub trigger_on: [u8; 4],
    /// 0 play, 1 stop, 2 queue.
    pub function: u32,
    pub extra: u32,
    pub extra_data: u32,
}

impl Chunk for TriggerListChunk {
    fn id(&self) -> &[u8; 4] {
        &TLST
    }

    fn decode(reader: &mut CursorReader, _options: &DecodeOptions) -> WavChunksResult<Self> {
        read_chunk_header(reader)?;
        let list = reader.read_u32(true)?;
        let name = reader.read_tag()?;
        let trigger_type = reader.read_u32(true)?;
        let mut trigger_on = [0u8; 4];
        for byte in trigger_on.iter_mut() {
            *byte = reader.read_u8()?;
        }
        Ok(TriggerListChunk {
            list,
            name,
            trigger_type,
            trigger_on,
            function: reader.read_u32(true)?,
            extra: reader.read_u32(true)?,
            extra_data: reader.read_u32(true)?,
        })
    }
}

impl Display for TriggerListChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TriggerListChunk: list: {}, name: {}, type: {}, on: {:?}, function: {}",
            self.list, self.name, self.trigger_type, self.trigger_on, self.function
        )
    }
}

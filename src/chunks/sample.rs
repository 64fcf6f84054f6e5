//! The ``smpl`` chunk: MIDI sampler settings and loop points.
use std::fmt::{Display, Formatter};

#[cfg(feature = "colored")]
use colored::Colorize;

use crate::{
    chunks::{read_chunk_header, Chunk, SMPL},
    options::DecodeOptions,
    reader::CursorReader,
    WavChunksResult,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleChunk {
    /// MMA manufacturer code. The high byte says how many of the low bytes are relevant.
    pub manufacturer: u32,
    pub product: u32,
    /// Period of one sample in nanoseconds.
    pub sample_period: u32,
    /// MIDI note that plays the sample at its recorded pitch.
    pub midi_unity_note: u32,
    /// Fraction of a semitone up from ``midi_unity_note``, 0x80000000 is one half.
    pub midi_pitch_fraction: u32,
    /// 0, 24, 25, 29 or 30.
    pub smpte_format: u32,
    /// Hours (signed), minutes, seconds and frames.
    pub smpte_offset: [u8; 4],
    pub loop_count: u32,
    pub sampler_data_size: u32,
    pub loops: Vec<SampleLoop>,
    pub sampler_data: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleLoop {
    pub id: u32,
    /// 0 forward, 1 alternating, 2 backward.
    pub loop_type: u32,
    pub start: u32,
    /// Inclusive.
    pub end: u32,
    pub fraction: u32,
    /// 0 loops forever.
    pub play_count: u32,
}

impl Chunk for SampleChunk {
    fn id(&self) -> &[u8; 4] {
        &SMPL
    }

    fn decode(reader: &mut CursorReader, _options: &DecodeOptions) -> WavChunksResult<Self> {
        read_chunk_header(reader)?;
        let manufacturer = reader.read_u32(true)?;
        let product = reader.read_u32(true)?;
        let sample_period = reader.read_u32(true)?;
        let midi_unity_note = reader.read_u32(true)?;
        let midi_pitch_fraction = reader.read_u32(true)?;
        let smpte_format = reader.read_u32(true)?;
        let mut smpte_offset = [0u8; 4];
        for byte in smpte_offset.iter_mut() {
            *byte = reader.read_u8()?;
        }
        let loop_count = reader.read_u32(true)?;
        let sampler_data_size = reader.read_u32(true)?;

        let mut loops = Vec::new();
        for _ in 0..loop_count {
            loops.push(SampleLoop {
                id: reader.read_u32(true)?,
                loop_type: reader.read_u32(true)?,
                start: reader.read_u32(true)?,
                end: reader.read_u32(true)?,
                fraction: reader.read_u32(true)?,
                play_count: reader.read_u32(true)?,
            });
        }

        let sampler_data = match sampler_data_size {
            0 => None,
            size => Some(reader.read_block(size as usize)?.to_vec()),
        };

        Ok(SampleChunk {
            manufacturer,
            product,
            sample_period,
            midi_unity_note,
            midi_pitch_fraction,
            smpte_format,
            smpte_offset,
            loop_count,
            sampler_data_size,
            loops,
            sampler_data,
        })
    }
}

#[cfg(feature = "colored")]
impl Display for SampleChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n\t{} {}\n\t{} {}",
            "SampleChunk: ".white().bold().underline(),
            "midi_unity_note:".green().bold(),
            self.midi_unity_note.to_string().white(),
            "loops:".green().bold(),
            self.loop_count.to_string().white()
        )?;
        for l in &self.loops {
            write!(
                f,
                "\n\t\t{} {}-{} x{}",
                l.id.to_string().green(),
                l.start,
                l.end,
                l.play_count
            )?;
        }
        Ok(())
    }
}

#[cfg(not(feature = "colored"))]
impl Display for SampleChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SampleChunk: midi_unity_note: {}, loops: {}",
            self.midi_unity_note, self.loop_count
        )?;
        for l in &self.loops {
            write!(f, "\n\t{} {}-{} x{}", l.id, l.start, l.end, l.play_count)?;
        }
        Ok(())
    }
}

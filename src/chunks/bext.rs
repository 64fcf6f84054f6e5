//! Broadcast Wave Format extension (EBU Tech 3285).
use std::fmt::{Display, Formatter};

#[cfg(feature = "colored")]
use colored::Colorize;

use crate::{
    chunks::{read_chunk_header, read_text, Chunk, BEXT},
    options::DecodeOptions,
    reader::{CursorReader, Encoding},
    WavChunksResult,
};

pub const UMID_SIZE: usize = 64;
pub const BEXT_RESERVED_SIZE: usize = 180;

/// The ``bext`` chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BextChunk {
    pub description: String,
    pub originator: String,
    pub originator_reference: String,
    /// ``yyyy:mm:dd``
    pub origination_date: String,
    /// ``hh:mm:ss``
    pub origination_time: String,
    pub time_reference_low: u32,
    pub time_reference_high: u32,
    pub version: u16,
    /// SMPTE ST 330 UMID, zero filled when absent.
    pub umid: Vec<u8>,
    /// Loudness words are stored as hundredths (LUFS, LU or dBTP).
    pub loudness_value: u16,
    pub loudness_range: u16,
    pub max_true_peak_level: u16,
    pub max_momentary_loudness: u16,
    pub max_short_term_loudness: u16,
    pub reserved: Vec<u8>,
    pub coding_history: String,
}

impl BextChunk {
    /// Sample count since midnight of the first sample.
    pub fn time_reference(&self) -> u64 {
        (u64::from(self.time_reference_high) << 32) | u64::from(self.time_reference_low)
    }
}

impl Chunk for BextChunk {
    fn id(&self) -> &[u8; 4] {
        &BEXT
    }

    fn decode(reader: &mut CursorReader, _options: &DecodeOptions) -> WavChunksResult<Self> {
        read_chunk_header(reader)?;
        let description = read_text(reader, 256)?;
        let originator = read_text(reader, 32)?;
        let originator_reference = read_text(reader, 32)?;
        let origination_date = read_text(reader, 10)?;
        let origination_time = read_text(reader, 8)?;
        let time_reference_low = reader.read_u32(true)?;
        let time_reference_high = reader.read_u32(true)?;
        let version = reader.read_u16(true)?;
        let umid = reader.read_block(UMID_SIZE)?.to_vec();
        let loudness_value = reader.read_u16(true)?;
        let loudness_range = reader.read_u16(true)?;
        let max_true_peak_level = reader.read_u16(true)?;
        let max_momentary_loudness = reader.read_u16(true)?;
        let max_short_term_loudness = reader.read_u16(true)?;
        let reserved = reader.read_block(BEXT_RESERVED_SIZE)?.to_vec();
        let coding_history = reader
            .read_string(Some(reader.remaining_bytes()), Encoding::Latin1)?
            .replace('\0', "");

        Ok(BextChunk {
            description,
            originator,
            originator_reference,
            origination_date,
            origination_time,
            time_reference_low,
            time_reference_high,
            version,
            umid,
            loudness_value,
            loudness_range,
            max_true_peak_level,
            max_momentary_loudness,
            max_short_term_loudness,
            reserved,
            coding_history,
        })
    }
}

#[cfg(feature = "colored")]
impl Display for BextChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n\t{} {}\n\t{} {}\n\t{} {} {}\n\t{} {}",
            "BextChunk: ".white().bold().underline(),
            "description:".green().bold(),
            self.description.white(),
            "originator:".green().bold(),
            self.originator.white(),
            "originated:".green().bold(),
            self.origination_date.white(),
            self.origination_time.white(),
            "time_reference:".green().bold(),
            self.time_reference().to_string().white()
        )
    }
}

#[cfg(not(feature = "colored"))]
impl Display for BextChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BextChunk: description: {}, originator: {}, originated: {} {}, time_reference: {}",
            self.description,
            self.originator,
            self.origination_date,
            self.origination_time,
            self.time_reference()
        )
    }
}

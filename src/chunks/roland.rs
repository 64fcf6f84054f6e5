//! Roland ``RLND`` chunk written by the SP-404SX Wave Converter. It pins a sample to a pad.
use std::fmt::{Display, Formatter};

#[cfg(feature = "colored")]
use colored::Colorize;

use crate::{
    chunks::{put_le, put_str, read_chunk_header, read_text, Chunk, EncodeChunk, RLND},
    options::DecodeOptions,
    reader::CursorReader,
    WavChunksResult,
};

/// Device string of the SP-404SX, the only device whose pad labels are known.
pub const SP404SX: &str = "roifspsx";
pub const RLND_SIZE: u32 = 458;
const BANKS: u8 = 10;
const PADS_PER_BANK: u8 = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolandChunk {
    pub device: String,
    pub unknown: [u8; 4],
    /// ``A1`` is 0 and each bank adds 12, up to ``J12`` at 119.
    pub sample_index: u8,
    pub sample_label: Option<String>,
}

/// ``A1``..``J12`` for indices below 120.
pub fn sp404_label(index: u8) -> Option<String> {
    if index >= BANKS * PADS_PER_BANK {
        return None;
    }
    let bank = (b'A' + index / PADS_PER_BANK) as char;
    Some(format!("{}{}", bank, index % PADS_PER_BANK + 1))
}

/// Inverse of [`sp404_label`], case-insensitive.
pub fn sp404_index(label: &str) -> Option<u8> {
    let label = label.trim().to_ascii_uppercase();
    let mut chars = label.chars();
    let bank = chars.next()?;
    if !('A'..='J').contains(&bank) {
        return None;
    }
    let pad: u8 = chars.as_str().parse().ok()?;
    if !(1..=PADS_PER_BANK).contains(&pad) {
        return None;
    }
    Some((bank as u8 - b'A') * PADS_PER_BANK + pad - 1)
}

impl RolandChunk {
    pub fn new(device: &str, sample_index: u8) -> Self {
        let sample_label = match device == SP404SX {
            true => sp404_label(sample_index),
            false => None,
        };
        RolandChunk {
            device: device.to_string(),
            unknown: [4, 0, 0, 0],
            sample_index,
            sample_label,
        }
    }

    /// Pad given by label. Labels other devices use, or that name no pad, fall back to ``A1``.
    pub fn with_label(device: &str, label: &str) -> Self {
        let index = match device == SP404SX {
            true => sp404_index(label).unwrap_or(0),
            false => 0,
        };
        RolandChunk::new(device, index)
    }
}

impl Chunk for RolandChunk {
    fn id(&self) -> &[u8; 4] {
        &RLND
    }

    fn decode(reader: &mut CursorReader, _options: &DecodeOptions) -> WavChunksResult<Self> {
        read_chunk_header(reader)?;
        let device = read_text(reader, 8)?;
        let mut unknown = [0u8; 4];
        for byte in unknown.iter_mut() {
            *byte = reader.read_u8()?;
        }
        let sample_index = reader.read_u8()?;
        Ok(RolandChunk {
            unknown,
            ..RolandChunk::new(&device, sample_index)
        })
    }
}

impl EncodeChunk for RolandChunk {
    fn size(&self) -> u32 {
        RLND_SIZE
    }

    fn as_bytes(&self) -> Box<[u8]> {
        let mut buf = vec![0u8; RLND_SIZE as usize + 8];
        buf[0..4].copy_from_slice(&RLND);
        put_le(&mut buf, 4, self.size());
        put_str(&mut buf, 8, &self.device, 8);
        buf[16..20].copy_from_slice(&self.unknown);
        buf[20] = self.sample_index;
        buf.into_boxed_slice()
    }
}

#[cfg(feature = "colored")]
impl Display for RolandChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n\t{} {}\n\t{} {} ({})",
            "RolandChunk: ".white().bold().underline(),
            "device:".green().bold(),
            self.device.white(),
            "sample_index:".green().bold(),
            self.sample_index.to_string().white(),
            self.sample_label.as_deref().unwrap_or("-")
        )
    }
}

#[cfg(not(feature = "colored"))]
impl Display for RolandChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RolandChunk: device: {}, sample_index: {} ({})",
            self.device,
            self.sample_index,
            self.sample_label.as_deref().unwrap_or("-")
        )
    }
}

use std::fmt::{Display, Formatter};

#[cfg(feature = "colored")]
use colored::Colorize;

use crate::{
    chunks::{put_le, read_chunk_header, Chunk, EncodeChunk, FMT},
    format_code::{audio_format_name, channel_mask_label, FormatCode},
    log,
    options::DecodeOptions,
    reader::CursorReader,
    WavChunksResult,
};

pub const FMT_SIZE_BASE_SIZE: usize = 16; // Standard wav file format size
pub const FMT_CB_SIZE: usize = 18; // Base plus the 2 byte extension size field
pub const FMT_ENCODED_SIZE: usize = 26; // 8 byte chunk header plus FMT_CB_SIZE
pub const EXT_FORMAT_CODE: u16 = 0xFFFE;

/// The ``fmt `` chunk: how the samples in ``data`` are encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FmtChunk {
    /// Declared body size.
    pub size: u32,
    /// Format of the audio data. 1 for PCM, 3 for IEEE float, 0xFFFE for extensible.
    pub audio_format_value: u16,
    /// Registered vendor name of ``audio_format_value``.
    pub audio_format: String,
    /// Number of channels in the audio data.
    pub channels: u16,
    /// Sample rate of the audio data.
    pub sample_rate: u32,
    /// Byte rate of the audio data.
    pub byte_rate: u32,
    /// Block align of the audio data.
    pub block_align: u16,
    /// Bits per sample of the audio data.
    pub bits_per_sample: u16,
    /// Present when the chunk is longer than the 16 byte base layout.
    pub extension: Option<FmtExtension>,
}

/// Whatever follows the 16 byte base layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FmtExtension {
    /// WAVE_FORMAT_EXTENSIBLE fields.
    Extensible(ExtFmtChunkInfo),
    /// Codec specific parameters, kept as they are.
    Params {
        extra_param_size: u16,
        extra_params: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtFmtChunkInfo {
    pub extra_param_size: u16,
    /// Valid bits per sample i.e. 8, 16, 20, 24
    pub valid_bits_per_sample: u16,
    pub channel_mask: u32,
    pub channel_mask_label: String,
    /// The sub-format GUID as its five little-endian parts.
    pub sub_format: (u32, u16, u16, u32, u32),
}

impl ExtFmtChunkInfo {
    /// The actual sample format, taken from the first two bytes of the sub-format GUID.
    pub fn sub_format_code(&self) -> u16 {
        (self.sub_format.0 & 0xFFFF) as u16
    }
}

impl FmtChunk {
    /// Constructs a new FmtChunk using the provided format, number of channels, sample rate and bits per sample.
    /// The remaining fields are calculating using these arguments
    pub fn new(format: FormatCode, channels: u16, sample_rate: u32, bits_per_sample: u16) -> Self {
        let block_align = (channels * bits_per_sample) / 8;
        let byte_rate = sample_rate * (block_align as u32);
        FmtChunk {
            size: FMT_CB_SIZE as u32,
            audio_format_value: format as u16,
            audio_format: audio_format_name(format as u16),
            channels,
            sample_rate,
            byte_rate,
            block_align,
            bits_per_sample,
            extension: None,
        }
    }

    pub fn is_extended_format(&self) -> bool {
        self.audio_format_value == EXT_FORMAT_CODE
    }

    /// The effective format code, looking through WAVE_FORMAT_EXTENSIBLE. ``None`` for codes
    /// outside ``FormatCode``.
    pub fn format(&self) -> Option<FormatCode> {
        let code = match &self.extension {
            Some(FmtExtension::Extensible(ext)) if self.is_extended_format() => {
                ext.sub_format_code()
            }
            _ => self.audio_format_value,
        };
        FormatCode::try_from(code).ok()
    }

    /// Seconds of audio held by ``data_bytes`` bytes of sample data.
    pub fn duration_of(&self, data_bytes: usize) -> Option<f64> {
        match self.byte_rate {
            0 => None,
            byte_rate => Some(data_bytes as f64 / byte_rate as f64),
        }
    }

    /// Extra parameter bytes written after the base layout by ``as_bytes``.
    fn extra_params(&self) -> Vec<u8> {
        match &self.extension {
            None => Vec::new(),
            Some(FmtExtension::Params {
                extra_param_size,
                extra_params,
            }) => {
                let mut params = extra_params.clone();
                params.resize(*extra_param_size as usize, 0);
                params
            }
            Some(FmtExtension::Extensible(ext)) => {
                let mut params = vec![0u8; 22];
                put_le(&mut params, 0, ext.valid_bits_per_sample);
                put_le(&mut params, 2, ext.channel_mask);
                put_le(&mut params, 6, ext.sub_format.0);
                put_le(&mut params, 10, ext.sub_format.1);
                put_le(&mut params, 12, ext.sub_format.2);
                put_le(&mut params, 14, ext.sub_format.3);
                put_le(&mut params, 18, ext.sub_format.4);
                params
            }
        }
    }
}

/// Red Book CD audio: PCM, stereo, 44.1 kHz, 16 bit.
impl Default for FmtChunk {
    fn default() -> Self {
        FmtChunk::new(FormatCode::WAV_FORMAT_PCM, 2, 44100, 16)
    }
}

impl Chunk for FmtChunk {
    /// Returns the ID of the FmtChunk - "fmt ".
    fn id(&self) -> &[u8; 4] {
        &FMT
    }

    fn decode(reader: &mut CursorReader, _options: &DecodeOptions) -> WavChunksResult<Self> {
        let (_id, size) = read_chunk_header(reader)?;
        let audio_format_value = reader.read_u16(true)?;
        let mut chunk = FmtChunk {
            size,
            audio_format_value,
            audio_format: audio_format_name(audio_format_value),
            channels: reader.read_u16(true)?,
            sample_rate: reader.read_u32(true)?,
            byte_rate: reader.read_u32(true)?,
            block_align: reader.read_u16(true)?,
            bits_per_sample: reader.read_u16(true)?,
            extension: None,
        };

        // Not all formats carry the extension size field.
        if reader.remaining_bytes() > 0 {
            let extra_param_size = reader.read_u16(true)?;
            let extension = if chunk.is_extended_format() {
                let valid_bits_per_sample = reader.read_u16(true)?;
                let channel_mask = reader.read_u32(true)?;
                FmtExtension::Extensible(ExtFmtChunkInfo {
                    extra_param_size,
                    valid_bits_per_sample,
                    channel_mask,
                    channel_mask_label: channel_mask_label(channel_mask),
                    sub_format: (
                        reader.read_u32(true)?,
                        reader.read_u16(true)?,
                        reader.read_u16(true)?,
                        reader.read_u32(true)?,
                        reader.read_u32(true)?,
                    ),
                })
            } else {
                FmtExtension::Params {
                    extra_param_size,
                    extra_params: reader.read_block(extra_param_size as usize)?.to_vec(),
                }
            };
            chunk.extension = Some(extension);
        }
        log!(log::Level::Debug, "Fmt Chunk: {:?}", chunk);
        Ok(chunk)
    }
}

impl EncodeChunk for FmtChunk {
    fn size(&self) -> u32 {
        (FMT_CB_SIZE + self.extra_params().len()) as u32
    }

    /// Always writes the extension size field, followed by any extension bytes.
    fn as_bytes(&self) -> Box<[u8]> {
        let extra_params = self.extra_params();
        let mut buf = vec![0u8; FMT_ENCODED_SIZE + extra_params.len()];
        buf[0..4].copy_from_slice(&FMT);
        put_le(&mut buf, 4, self.size());
        put_le(&mut buf, 8, self.audio_format_value);
        put_le(&mut buf, 10, self.channels);
        put_le(&mut buf, 12, self.sample_rate);
        put_le(&mut buf, 16, self.byte_rate);
        put_le(&mut buf, 20, self.block_align);
        put_le(&mut buf, 22, self.bits_per_sample);
        put_le(&mut buf, 24, extra_params.len() as u16);
        buf[FMT_ENCODED_SIZE..].copy_from_slice(&extra_params);
        buf.into_boxed_slice()
    }
}

#[cfg(feature = "colored")]
impl Display for FmtChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n\t{} {} ({})\n\t{} {}\n\t{} {}\n\t{} {}\n\t{} {}\n\t{} {}",
            "FmtChunk: ".white().bold().underline(),
            "format:".green().bold(),
            self.audio_format.white(),
            self.audio_format_value.to_string().white(),
            "channels:".green().bold(),
            self.channels.to_string().white(),
            "sample_rate:".green().bold(),
            self.sample_rate.to_string().white(),
            "byte_rate:".green().bold(),
            self.byte_rate.to_string().white(),
            "block_align:".green().bold(),
            self.block_align.to_string().white(),
            "bits_per_sample:".green().bold(),
            self.bits_per_sample.to_string().white()
        )?;
        if let Some(FmtExtension::Extensible(ext)) = &self.extension {
            write!(
                f,
                "\n\t{} {}\n\t{} {}",
                "valid_bits_per_sample:".green().bold(),
                ext.valid_bits_per_sample.to_string().white(),
                "channel_mask:".green().bold(),
                ext.channel_mask_label.white()
            )?;
        }
        Ok(())
    }
}

#[cfg(not(feature = "colored"))]
impl Display for FmtChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FmtChunk: format: {} ({}), channels: {}, sample_rate: {}, byte_rate: {}, block_align: {}, bits_per_sample: {}",
            self.audio_format,
            self.audio_format_value,
            self.channels,
            self.sample_rate,
            self.byte_rate,
            self.block_align,
            self.bits_per_sample
        )?;
        if let Some(FmtExtension::Extensible(ext)) = &self.extension {
            write!(
                f,
                ", valid_bits_per_sample: {}, channel_mask: {}",
                ext.valid_bits_per_sample, ext.channel_mask_label
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod fmt_tests {
    use super::*;
    use crate::{block::ByteBlock, chunks::read_chunk};

    fn decode(bytes: &[u8]) -> WavChunksResult<FmtChunk> {
        read_chunk(&ByteBlock::from(bytes), &DecodeOptions::default())
    }

    #[test]
    fn encodes_cd_audio_defaults() {
        let bytes = FmtChunk::default().as_bytes();
        assert_eq!(bytes.len(), 26);
        assert_eq!(&bytes[0..4], b"fmt ");
        assert_eq!(&bytes[4..8], &18u32.to_le_bytes());
        assert_eq!(&bytes[8..10], &1u16.to_le_bytes());
        assert_eq!(&bytes[10..12], &2u16.to_le_bytes());
        assert_eq!(&bytes[12..16], &44100u32.to_le_bytes());
        assert_eq!(&bytes[16..20], &176400u32.to_le_bytes());
        assert_eq!(&bytes[20..22], &4u16.to_le_bytes());
        assert_eq!(&bytes[22..24], &16u16.to_le_bytes());
        assert_eq!(&bytes[24..26], &0u16.to_le_bytes());
    }

    #[test]
    fn decodes_base_layout() {
        let mut bytes = b"fmt \x10\x00\x00\x00".to_vec();
        bytes.extend_from_slice(&FmtChunk::default().as_bytes()[8..24]);
        let chunk = decode(&bytes).unwrap();
        assert_eq!(chunk.size, 16);
        assert_eq!(
            chunk.audio_format,
            "Microsoft Pulse Code Modulation (PCM) / Uncompressed"
        );
        assert_eq!(chunk.channels, 2);
        assert_eq!(chunk.sample_rate, 44100);
        assert_eq!(chunk.byte_rate, 176400);
        assert_eq!(chunk.block_align, 4);
        assert_eq!(chunk.bits_per_sample, 16);
        assert_eq!(chunk.extension, None);
        assert_eq!(chunk.format(), Some(FormatCode::WAV_FORMAT_PCM));
    }

    #[test]
    fn decodes_codec_params() {
        let mut chunk = FmtChunk::new(FormatCode::WAV_FORMAT_IEEE_FLOAT, 1, 48000, 32);
        chunk.audio_format_value = 0x0002;
        chunk.audio_format = audio_format_name(0x0002);
        chunk.extension = Some(FmtExtension::Params {
            extra_param_size: 4,
            extra_params: vec![1, 2, 3, 4],
        });
        let bytes = chunk.as_bytes();
        assert_eq!(bytes.len(), 30);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.size, 22);
        assert_eq!(decoded.audio_format, "Microsoft ADPCM");
        assert_eq!(decoded.extension, chunk.extension);
        assert_eq!(decoded.format(), None);
    }

    #[test]
    fn decodes_extensible_layout() {
        let mut chunk = FmtChunk::new(FormatCode::WAVE_FORMAT_EXTENSIBLE, 1, 96000, 24);
        chunk.extension = Some(FmtExtension::Extensible(ExtFmtChunkInfo {
            extra_param_size: 22,
            valid_bits_per_sample: 24,
            channel_mask: 0x4,
            channel_mask_label: "speaker_front_center".into(),
            sub_format: (0x0000_0003, 0x0000, 0x0010, 0xAA00_0080, 0x719B_3800),
        }));
        let decoded = decode(&chunk.as_bytes()).unwrap();
        assert_eq!(decoded.audio_format, "Extensible");
        assert!(decoded.is_extended_format());
        assert_eq!(decoded.extension, chunk.extension);
        assert_eq!(decoded.format(), Some(FormatCode::WAV_FORMAT_IEEE_FLOAT));
    }

    #[test]
    fn truncated_chunk_underflows() {
        let bytes = &FmtChunk::default().as_bytes()[..20];
        assert!(decode(bytes).unwrap_err().is_underflow());
    }

    #[test]
    fn duration_needs_a_byte_rate() {
        let mut chunk = FmtChunk::default();
        assert_eq!(chunk.duration_of(176400 * 2), Some(2.0));
        chunk.byte_rate = 0;
        assert_eq!(chunk.duration_of(10), None);
    }
}

//! # WavChunks
//!
//! WavChunks walks the chunk structure of RIFF/WAVE files (including RF64 and BW64) and decodes
//! every chunk it knows into a typed value. It never touches the samples themselves: a ``data``
//! chunk is reported with its extent and playback duration, nothing more.
//!
//! Real-world WAV files are messy. Sizes are odd, truncated or zero, and vendors add chunks no
//! one documented. WavChunks keeps going where it can:
//!
//! - a chunk declaring more bytes than remain is clamped to what is left,
//! - odd sizes are rounded up to the RIFF pad byte (configurable),
//! - a zero size or NUL tag ends the walk with one ``(broken)`` record holding the rest,
//! - a chunk whose body fails to decode is kept as raw bytes with the reason attached.
//!
//! Only a bad container header (not ``RIFF``/``RF64``/``BW64`` + ``WAVE``) is an error.
//!
//! ## Supported chunks
//!
//! ``fmt ``, ``fact``, ``data``, ``LIST`` (``INFO`` and ``adtl``), ``cue ``, ``smpl``, ``inst``,
//! ``bext``, ``ds64``, ``acid``, ``strc``, ``tlst``, ``PEAK``, ``DISP``, ``JUNK``/``PAD ``,
//! Roland ``RLND`` and Logic Pro ``ResU``. macOS and ProTools private chunks are recognised and
//! kept raw.
//!
//! ## Example
//!
//! ```no_run
//! use wavchunks::{parse, ChunkValue};
//!
//! let bytes = std::fs::read("input.wav").unwrap();
//! for record in parse(&bytes).unwrap() {
//!     if let ChunkValue::Data(data) = &record.value {
//!         println!("{} bytes, {:?}s", data.data_len, data.duration);
//!     }
//! }
//! ```
//!
//! ## Features
//!
//! - `logging`: debug output through the ``log`` crate, and a working [`LogObserver`].
//! - `colored`: coloured ``Display`` output for records and chunk values.
pub mod block;
pub mod chain;
pub mod chunks;
pub mod decoder;
pub mod error;
pub mod format_code;
pub mod observer;
pub mod options;
pub mod reader;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use crate::block::ByteBlock;
pub use crate::chain::BlockChain;
pub use crate::chunks::{Chunk, EncodeChunk, FmtChunk, HeaderChunk, RolandChunk};
pub use crate::decoder::{ChunkDecoder, ChunkRecord, ChunkValue};
pub use crate::error::{WavChunksError, WavChunksResult};
pub use crate::format_code::{audio_format_name, channel_mask_label, FormatCode};
pub use crate::observer::{LogObserver, NoopObserver, ParseEvent, ParseObserver};
pub use crate::options::DecodeOptions;
pub use crate::reader::{CursorReader, Encoding};

/// A macro for logging messages if the logging feature is enabled.
#[macro_export]
macro_rules! log {
    ($level:expr, $($arg:tt)+) => {
        #[cfg(feature = "logging")]
        log::log!($level, $($arg)+);
    };
}

/// Walks ``data`` with the default options and returns every chunk record, header first.
///
/// # Examples
///
/// ```no_run
/// let bytes = std::fs::read("input.wav").unwrap();
/// let chunks = wavchunks::parse(&bytes).unwrap();
/// assert_eq!(chunks[0].chunk_type, "header");
/// ```
#[inline(always)]
pub fn parse(data: &[u8]) -> WavChunksResult<Vec<ChunkRecord>> {
    parse_with(data, DecodeOptions::default())
}

/// Walks ``data`` with the given options.
pub fn parse_with(data: &[u8], options: DecodeOptions) -> WavChunksResult<Vec<ChunkRecord>> {
    let mut decoder = ChunkDecoder::from_bytes(data, options);
    decoder.parse()?;
    log!(
        log::Level::Debug,
        "Parsed {} bytes into {} chunks",
        data.len(),
        decoder.chunks().len()
    );
    Ok(decoder.into_chunks())
}

/// Encodes a 12 byte container header.
pub fn encode_header(header: &HeaderChunk) -> Box<[u8]> {
    header.as_bytes()
}

/// Encodes a ``fmt `` chunk, header included.
pub fn encode_fmt(format: &FmtChunk) -> Box<[u8]> {
    format.as_bytes()
}

/// Encodes a Roland ``RLND`` chunk, header included.
pub fn encode_rlnd(roland: &RolandChunk) -> Box<[u8]> {
    roland.as_bytes()
}

#[cfg(test)]
mod lib_tests {
    use super::*;
    use crate::test_fixtures::RiffBuilder;

    #[test]
    fn encoders_assemble_a_parseable_file() {
        let format = encode_fmt(&FmtChunk::default());
        let roland = encode_rlnd(&RolandChunk::with_label("roifspsx", "C3"));
        let body_len = 4 + format.len() + roland.len();

        let mut bytes = encode_header(&HeaderChunk::new(body_len as u32)).to_vec();
        bytes.extend_from_slice(&format);
        bytes.extend_from_slice(&roland);

        let chunks = parse(&bytes).unwrap();
        let types: Vec<&str> = chunks.iter().map(|c| c.chunk_type.as_str()).collect();
        assert_eq!(types, vec!["header", "format", "roland"]);
        let ChunkValue::Roland(decoded) = &chunks[2].value else {
            panic!("expected roland");
        };
        assert_eq!(decoded.sample_index, 26);
        assert_eq!(decoded.sample_label.as_deref(), Some("C3"));
    }

    #[test]
    fn parse_with_honours_options() {
        let bytes = RiffBuilder::new().chunk(b"JUNK", &[0u8; 1]).build();
        assert_eq!(parse(&bytes).unwrap().len(), 2);
        let chunks = parse_with(&bytes, DecodeOptions::default().with_round_odd_chunks(false)).unwrap();
        assert_eq!(chunks.len(), 3);
        assert!(chunks[2].is_broken());
    }

    #[test]
    fn rf64_container_is_accepted() {
        let bytes = RiffBuilder::new().container(b"RF64").pcm_format().build();
        let chunks = parse(&bytes).unwrap();
        let ChunkValue::Header(header) = &chunks[0].value else {
            panic!("expected header");
        };
        assert!(header.is_rf64());
    }
}

pub mod acid;
pub mod bext;
pub mod cue;
pub mod data;
pub mod display;
pub mod ds64;
pub mod fact;
pub mod fmt;
pub mod header;
pub mod instrument;
pub mod list;
pub mod padding;
pub mod peak;
pub mod resu;
pub mod roland;
pub mod sample;
pub mod strc;
pub mod trigger_list;

use std::fmt::Display;

use num_traits::ToBytes;

pub use crate::chunks::acid::AcidChunk;
pub use crate::chunks::bext::BextChunk;
pub use crate::chunks::cue::{CueChunk, CuePoint};
pub use crate::chunks::data::DataChunk;
pub use crate::chunks::display::DisplayChunk;
pub use crate::chunks::ds64::{Ds64Chunk, Ds64Entry};
pub use crate::chunks::fact::FactChunk;
pub use crate::chunks::fmt::{ExtFmtChunkInfo, FmtChunk, FmtExtension};
pub use crate::chunks::header::HeaderChunk;
pub use crate::chunks::instrument::InstrumentChunk;
pub use crate::chunks::list::{AdtlEntry, InfoEntry, ListChunk, ListData};
pub use crate::chunks::padding::PaddingChunk;
pub use crate::chunks::peak::PeakChunk;
pub use crate::chunks::resu::{decompress, parse_text, ResuChunk};
pub use crate::chunks::roland::RolandChunk;
pub use crate::chunks::sample::{SampleChunk, SampleLoop};
pub use crate::chunks::strc::{StrcChunk, StrcSlice};
pub use crate::chunks::trigger_list::TriggerListChunk;
use crate::{
    block::ByteBlock, chain::BlockChain, options::DecodeOptions, reader::CursorReader,
    reader::Encoding, WavChunksResult,
};

// Container tags
pub const RIFF: [u8; 4] = *b"RIFF";
pub const RF64: [u8; 4] = *b"RF64";
pub const BW64: [u8; 4] = *b"BW64";
pub const WAVE: [u8; 4] = *b"WAVE";

// Chunks with a decoder
pub const FMT: [u8; 4] = *b"fmt ";
pub const FACT: [u8; 4] = *b"fact";
pub const DATA: [u8; 4] = *b"data";
pub const LIST: [u8; 4] = *b"LIST";
pub const INST: [u8; 4] = *b"inst";
pub const DISP: [u8; 4] = *b"DISP";
pub const SMPL: [u8; 4] = *b"smpl";
pub const TLST: [u8; 4] = *b"tlst";
pub const RLND: [u8; 4] = *b"RLND";
pub const JUNK: [u8; 4] = *b"JUNK";
pub const PAD: [u8; 4] = *b"PAD ";
pub const PEAK: [u8; 4] = *b"PEAK";
pub const ACID: [u8; 4] = *b"acid";
pub const STRC: [u8; 4] = *b"strc";
pub const CUE: [u8; 4] = *b"cue ";
pub const BEXT: [u8; 4] = *b"bext";
pub const RESU: [u8; 4] = *b"ResU";
pub const DS64: [u8; 4] = *b"ds64";

// LIST types and their entries
pub const INFO: [u8; 4] = *b"INFO";
pub const ADTL: [u8; 4] = *b"adtl";
pub const LABL: [u8; 4] = *b"labl";
pub const NOTE: [u8; 4] = *b"note";
pub const LTXT: [u8; 4] = *b"ltxt";

// Kept raw
pub const CART: [u8; 4] = *b"cart";
pub const MACOS_CHUNKS: [[u8; 4]; 2] = [*b"AFAn", *b"AFmd"];
pub const PROTOOLS_CHUNKS: [[u8; 4]; 5] = [*b"minf", *b"elm1", *b"regn", *b"ovwf", *b"umid"];

pub const MACOS_DESCRIPTION: &str = "macOS Special Binary Chunk";
pub const PROTOOLS_DESCRIPTION: &str = "ProTools Special Chunk";

/// A decodable chunk. ``decode`` is handed a reader over the chunk's own bytes, 8 byte header
/// included, so every chunk is self-describing.
pub trait Chunk: Display {
    fn id(&self) -> &[u8; 4];
    fn decode(reader: &mut CursorReader, options: &DecodeOptions) -> WavChunksResult<Self>
    where
        Self: Sized;
}

/// A chunk that can also be written back out.
pub trait EncodeChunk: Chunk {
    /// Size of the chunk body, excluding the 8 byte tag and size fields.
    fn size(&self) -> u32;
    /// The full chunk, header included.
    fn as_bytes(&self) -> Box<[u8]>;
}

/// Decodes ``chunk`` (header and body) as a ``T``.
pub fn read_chunk<T: Chunk>(chunk: &ByteBlock, options: &DecodeOptions) -> WavChunksResult<T> {
    let chain = BlockChain::from(chunk.clone());
    let mut reader = CursorReader::with_scratch_size(chain, options.scratch_size());
    T::decode(&mut reader, options)
}

/// Reads a chunk's own tag and declared size.
pub(crate) fn read_chunk_header(reader: &mut CursorReader) -> WavChunksResult<(String, u32)> {
    let id = reader.read_tag()?;
    let size = reader.read_u32(true)?;
    Ok((id, size))
}

/// Reads a fixed-width single-byte text field, dropping the NUL padding writers leave at the end.
pub(crate) fn read_text(reader: &mut CursorReader, length: usize) -> WavChunksResult<String> {
    let text = reader.read_string(Some(length), Encoding::Latin1)?;
    Ok(text.trim_end_matches('\0').to_string())
}

/// Writes ``value`` little-endian at ``offset``.
pub(crate) fn put_le<T: ToBytes>(buf: &mut [u8], offset: usize, value: T) {
    let bytes = value.to_le_bytes();
    let bytes = bytes.as_ref();
    buf[offset..offset + bytes.len()].copy_from_slice(bytes);
}

/// Writes at most ``max_len`` bytes of ``text`` at ``offset``; the rest of the field stays zeroed.
pub(crate) fn put_str(buf: &mut [u8], offset: usize, text: &str, max_len: usize) {
    let bytes = text.as_bytes();
    let len = bytes.len().min(max_len);
    buf[offset..offset + len].copy_from_slice(&bytes[..len]);
}

pub(crate) fn tag_str(tag: &[u8; 4]) -> &str {
    std::str::from_utf8(tag).unwrap_or("[ERROR]")
}

#[cfg(test)]
mod chunk_tests {
    use super::*;

    #[test]
    fn put_helpers_pack_little_endian() {
        let mut buf = [0u8; 12];
        put_str(&mut buf, 0, "fmt extra", 4);
        put_le(&mut buf, 4, 0x0102_0304u32);
        put_le(&mut buf, 8, 0xFFFEu16);
        put_le(&mut buf, 10, -2i16);
        assert_eq!(&buf[0..4], b"fmt ");
        assert_eq!(&buf[4..8], &[4, 3, 2, 1]);
        assert_eq!(&buf[8..10], &[0xFE, 0xFF]);
        assert_eq!(&buf[10..12], &[0xFE, 0xFF]);
    }

    #[test]
    fn text_fields_drop_nul_padding() {
        let mut reader = CursorReader::from_bytes(b"Mic A\0\0\0rest");
        assert_eq!(read_text(&mut reader, 8).unwrap(), "Mic A");
        assert_eq!(reader.offset(), 8);
    }

    #[test]
    fn read_chunk_header_reads_tag_and_size() {
        let mut reader = CursorReader::from_bytes(b"fact\x04\x00\x00\x00");
        let (id, size) = read_chunk_header(&mut reader).unwrap();
        assert_eq!(id, "fact");
        assert_eq!(size, 4);
        assert_eq!(tag_str(&FACT), "fact");
    }
}

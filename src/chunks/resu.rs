//! Logic Pro's ``ResU`` chunk: a zlib stream holding a JSON document with tempo, key and
//! time signature.
use std::{
    fmt::{Display, Formatter},
    io::Read,
};

use flate2::read::ZlibDecoder;
use serde_json::Value;

use crate::{
    chunks::{read_chunk_header, Chunk, RESU},
    log,
    options::DecodeOptions,
    reader::CursorReader,
    WavChunksResult,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ResuChunk {
    pub size: u32,
    /// ``None`` when the payload does not inflate or is not JSON.
    pub data: Option<Value>,
}

/// Inflates a zlib stream.
pub fn decompress(data: &[u8]) -> WavChunksResult<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Parses a JSON document.
pub fn parse_text(text: &[u8]) -> WavChunksResult<Value> {
    Ok(serde_json::from_slice(text)?)
}

impl Chunk for ResuChunk {
    fn id(&self) -> &[u8; 4] {
        &RESU
    }

    fn decode(reader: &mut CursorReader, _options: &DecodeOptions) -> WavChunksResult<Self> {
        let (_id, size) = read_chunk_header(reader)?;
        let length = reader.remaining_bytes().min(size as usize);
        let payload = reader.read_block(length)?;

        let data = match decompress(&payload) {
            Ok(inflated) => {
                log!(log::Level::Debug, "ResU inflated to {} bytes", inflated.len());
                match parse_text(&inflated) {
                    Ok(value) => Some(value),
                    Err(_err) => {
                        log!(log::Level::Debug, "ResU payload is not JSON: {}", _err);
                        None
                    }
                }
            }
            Err(_err) => {
                log!(log::Level::Debug, "ResU payload did not inflate: {}", _err);
                None
            }
        };

        Ok(ResuChunk { size, data })
    }
}

impl Display for ResuChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.data {
            Some(value) => write!(f, "ResuChunk: {}", value),
            None => write!(f, "ResuChunk: {} bytes, unreadable", self.size),
        }
    }
}

#[cfg(test)]
mod resu_tests {
    use std::io::Write;

    use flate2::{write::ZlibEncoder, Compression};
    use serde_json::json;

    use super::*;
    use crate::{block::ByteBlock, chunks::read_chunk, test_fixtures::sub_chunk};

    fn deflate(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn inflates_json_payload() {
        let document = json!({"tempo": 120.0, "timeSignatureNumerator": 4, "keySignature": "C"});
        let payload = deflate(document.to_string().as_bytes());
        let block = ByteBlock::from(sub_chunk(b"ResU", &payload));
        let chunk: ResuChunk = read_chunk(&block, &DecodeOptions::default()).unwrap();
        assert_eq!(chunk.size as usize, payload.len());
        assert_eq!(chunk.data, Some(document));
    }

    #[test]
    fn bad_payloads_decode_to_none() {
        let block = ByteBlock::from(sub_chunk(b"ResU", b"not zlib at all"));
        let chunk: ResuChunk = read_chunk(&block, &DecodeOptions::default()).unwrap();
        assert_eq!(chunk.data, None);

        let block = ByteBlock::from(sub_chunk(b"ResU", &deflate(b"{broken")));
        let chunk: ResuChunk = read_chunk(&block, &DecodeOptions::default()).unwrap();
        assert_eq!(chunk.data, None);
    }

    #[test]
    fn helpers_report_errors() {
        assert!(matches!(
            decompress(b"\x00\x01"),
            Err(crate::WavChunksError::Decompression(_))
        ));
        assert!(matches!(
            parse_text(b"]"),
            Err(crate::WavChunksError::Parse(_))
        ));
        assert_eq!(parse_text(b"[1]").unwrap(), json!([1]));
    }
}

//! Byte-stream builders shared by the unit tests.
use crate::chunks::{EncodeChunk, FmtChunk};

/// A complete sub-chunk: tag, little-endian body size, body and the pad byte for odd bodies.
pub fn sub_chunk(tag: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(body.len() + 9);
    bytes.extend_from_slice(tag);
    bytes.extend_from_slice(&(body.len() as u32).to_le_bytes());
    bytes.extend_from_slice(body);
    if body.len() % 2 != 0 {
        bytes.push(0);
    }
    bytes
}

/// Assembles a RIFF/WAVE stream chunk by chunk.
pub struct RiffBuilder {
    container: [u8; 4],
    body: Vec<u8>,
}

impl RiffBuilder {
    pub fn new() -> Self {
        RiffBuilder {
            container: *b"RIFF",
            body: Vec::new(),
        }
    }

    pub fn container(mut self, tag: &[u8; 4]) -> Self {
        self.container = *tag;
        self
    }

    pub fn chunk(self, tag: &[u8; 4], body: &[u8]) -> Self {
        let bytes = sub_chunk(tag, body);
        self.raw(&bytes)
    }

    /// CD-audio ``fmt `` chunk.
    pub fn pcm_format(self) -> Self {
        let bytes = FmtChunk::default().as_bytes();
        self.raw(&bytes)
    }

    /// Appends bytes verbatim, for malformed framing.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut bytes = self.container.to_vec();
        bytes.extend_from_slice(&(self.body.len() as u32 + 4).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend(self.body);
        bytes
    }
}

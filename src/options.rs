//! Runtime knobs for a parse.
use std::fmt::{Display, Formatter};

use crate::reader::{scratch_size_for, MIN_SCRATCH_SIZE};

/// Options controlling how a ``ChunkDecoder`` walks its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    round_odd_chunks: bool,
    scratch_size: usize,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an odd declared chunk size is rounded up to the next even number, the RIFF padding rule.
    /// Some writers omit the pad byte, those files walk correctly only with this turned off.
    pub fn with_round_odd_chunks(mut self, round_odd_chunks: bool) -> Self {
        self.round_odd_chunks = round_odd_chunks;
        self
    }

    /// Size of the reader's scratch buffer. Clamped to at least 16 and rounded up to a multiple of 8.
    pub fn with_scratch_size(mut self, scratch_size: usize) -> Self {
        self.scratch_size = scratch_size_for(scratch_size);
        self
    }

    #[inline(always)]
    pub fn round_odd_chunks(&self) -> bool {
        self.round_odd_chunks
    }

    #[inline(always)]
    pub fn scratch_size(&self) -> usize {
        self.scratch_size
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            round_odd_chunks: true,
            scratch_size: MIN_SCRATCH_SIZE,
        }
    }
}

impl Display for DecodeOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DecodeOptions: round_odd_chunks: {}, scratch_size: {}",
            self.round_odd_chunks, self.scratch_size
        )
    }
}

#[cfg(test)]
mod options_tests {
    use super::*;

    #[test]
    fn defaults_follow_riff_padding() {
        let options = DecodeOptions::default();
        assert!(options.round_odd_chunks());
        assert_eq!(options.scratch_size(), 16);
    }

    #[test]
    fn scratch_size_is_normalised() {
        assert_eq!(DecodeOptions::new().with_scratch_size(1).scratch_size(), 16);
        assert_eq!(DecodeOptions::new().with_scratch_size(30).scratch_size(), 32);
        let options = DecodeOptions::new()
            .with_round_odd_chunks(false)
            .with_scratch_size(64);
        assert!(!options.round_odd_chunks());
        assert_eq!(options.scratch_size(), 64);
    }
}

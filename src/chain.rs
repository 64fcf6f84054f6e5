//! Contains the ``BlockChain`` struct, a rewindable list of ``ByteBlock``s that together form the input.
use std::fmt::{Display, Formatter};

use crate::block::ByteBlock;
use crate::log;

/// A sequence of ``ByteBlock``s with a movable "current block".
///
/// The chain never copies or drops the blocks it holds. Advancing past a block only shrinks
/// the available window, rewinding grows it again. ``available_bytes`` always equals the sum
/// of the lengths of the blocks from the current one to the last one.
///
/// The current block index may sit one past the last block. That is the exhausted state,
/// reached by advancing off the final block, and ``rewind`` can leave it again.
#[derive(Debug, Clone, Default)]
pub struct BlockChain {
    blocks: Vec<ByteBlock>,
    current: usize,
    available_bytes: usize,
    available_blocks: usize,
}

impl BlockChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a block at the tail and returns the total number of blocks held.
    /// Empty blocks carry no bytes to walk over and are skipped.
    pub fn append(&mut self, block: ByteBlock) -> usize {
        if block.is_empty() {
            log!(log::Level::Debug, "append: skipping empty block");
            return self.blocks.len();
        }
        self.available_bytes += block.len();
        self.available_blocks += 1;
        self.blocks.push(block);
        log!(log::Level::Trace, "append: {}", self.blocks.len());
        self.blocks.len()
    }

    /// Moves to the next block. The consumed block's bytes leave the available window.
    ///
    /// Returns false when there is no next block. The chain is then exhausted.
    pub fn advance(&mut self) -> bool {
        if let Some(block) = self.blocks.get(self.current) {
            self.available_bytes -= block.len();
            self.available_blocks -= 1;
            self.current += 1;
        }
        self.current < self.blocks.len()
    }

    /// Moves back to the previous block, restoring its bytes to the available window.
    ///
    /// Returns false when already at the first block.
    pub fn rewind(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        self.available_bytes += self.blocks[self.current].len();
        self.available_blocks += 1;
        true
    }

    /// True iff there is a block after the current one.
    pub fn more_available(&self) -> bool {
        self.current + 1 < self.blocks.len()
    }

    /// Rewinds to the first block.
    pub fn reset(&mut self) {
        while self.rewind() {
            continue;
        }
    }

    /// The block holding the cursor, ``None`` once the chain is exhausted or before any append.
    pub fn current(&self) -> Option<&ByteBlock> {
        self.blocks.get(self.current)
    }

    /// Length of the current block, 0 once exhausted.
    pub fn current_len(&self) -> usize {
        self.current().map_or(0, ByteBlock::len)
    }

    /// Iterates the blocks from the current one to the tail.
    pub fn remaining_blocks(&self) -> impl Iterator<Item = &ByteBlock> {
        self.blocks.iter().skip(self.current)
    }

    pub fn available_bytes(&self) -> usize {
        self.available_bytes
    }

    pub fn available_blocks(&self) -> usize {
        self.available_blocks
    }

    pub fn total_blocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn total_bytes(&self) -> usize {
        self.blocks.iter().map(ByteBlock::len).sum()
    }
}

impl From<ByteBlock> for BlockChain {
    fn from(block: ByteBlock) -> Self {
        let mut chain = BlockChain::new();
        chain.append(block);
        chain
    }
}

impl FromIterator<ByteBlock> for BlockChain {
    fn from_iter<I: IntoIterator<Item = ByteBlock>>(iter: I) -> Self {
        let mut chain = BlockChain::new();
        for block in iter {
            chain.append(block);
        }
        chain
    }
}

impl Display for BlockChain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BlockChain: block {}/{}, {} bytes available",
            self.current,
            self.blocks.len(),
            self.available_bytes
        )
    }
}

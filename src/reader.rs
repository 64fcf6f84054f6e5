//! Contains the ``CursorReader``, a stateful binary cursor over a ``BlockChain``.
//!
//! All ``read_*`` methods consume input and move the cursor forward. All ``peek_*`` methods leave
//! the cursor where it is. Peek offsets are measured from the start of the block that currently
//! holds the cursor, which for a single backing block is the absolute offset into the input.
//!
//! Multi-byte values are assembled one byte at a time into a scratch buffer: forwards for
//! little-endian reads, backwards for big-endian ones. The filled buffer is then reinterpreted as
//! the requested width, so every read gives the same answer no matter how the input is split
//! across blocks.
use std::char::REPLACEMENT_CHARACTER;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::block::ByteBlock;
use crate::chain::BlockChain;
use crate::error::{WavChunksError, WavChunksResult};
use crate::log;

/// Smallest scratch buffer a reader will allocate.
pub const MIN_SCRATCH_SIZE: usize = 16;

/// Rounds a requested scratch size up to at least ``MIN_SCRATCH_SIZE`` and a multiple of 8.
#[inline(always)]
pub(crate) fn scratch_size_for(size: usize) -> usize {
    let size = size.max(MIN_SCRATCH_SIZE);
    (size + 7) / 8 * 8
}

/// Text encodings understood by ``read_string`` and ``peek_string``.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Ascii,
    Latin1,
    Utf8,
    Utf16Le,
    Utf16Be,
    /// UTF-16 whose byte order is given by a leading byte-order mark.
    Utf16Bom,
}

impl FromStr for Encoding {
    type Err = WavChunksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascii" => Ok(Encoding::Ascii),
            "latin1" => Ok(Encoding::Latin1),
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "utf16le" | "utf16-le" => Ok(Encoding::Utf16Le),
            "utf16be" | "utf16-be" => Ok(Encoding::Utf16Be),
            "utf16bom" | "utf16-bom" => Ok(Encoding::Utf16Bom),
            _ => Err(WavChunksError::UnsupportedEncoding(s.to_string())),
        }
    }
}

impl Display for Encoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Encoding::Ascii => "ascii",
            Encoding::Latin1 => "latin1",
            Encoding::Utf8 => "utf8",
            Encoding::Utf16Le => "utf16le",
            Encoding::Utf16Be => "utf16be",
            Encoding::Utf16Bom => "utf16bom",
        };
        write!(f, "{}", name)
    }
}

/// A binary reading cursor over a ``BlockChain``.
#[derive(Debug, Clone)]
pub struct CursorReader {
    chain: BlockChain,
    local_offset: usize,
    offset: usize,
    scratch: Box<[u8]>,
}

macro_rules! fixed_width {
    ($($read:ident, $peek:ident => $T:ty, $N:literal;)*) => {
        $(
            #[doc = concat!("Reads a ``", stringify!($T), "`` in the given byte order and advances the cursor.")]
            #[inline]
            pub fn $read(&mut self, little_endian: bool) -> WavChunksResult<$T> {
                self.fill($N, little_endian)?;
                Ok(<$T>::from_le_bytes(self.scratch_array::<$N>()))
            }

            #[doc = concat!("Peeks a ``", stringify!($T), "`` at ``offset`` in the given byte order.")]
            #[inline]
            pub fn $peek(&mut self, offset: usize, little_endian: bool) -> WavChunksResult<$T> {
                self.fill_peek($N, offset, little_endian)?;
                Ok(<$T>::from_le_bytes(self.scratch_array::<$N>()))
            }
        )*
    };
}

impl CursorReader {
    pub fn new(chain: BlockChain) -> Self {
        Self::with_scratch_size(chain, MIN_SCRATCH_SIZE)
    }

    /// Creates a reader whose scratch buffer holds at least ``size`` bytes.
    pub fn with_scratch_size(chain: BlockChain, size: usize) -> Self {
        CursorReader {
            chain,
            local_offset: 0,
            offset: 0,
            scratch: vec![0u8; scratch_size_for(size)].into_boxed_slice(),
        }
    }

    pub fn from_block(block: ByteBlock) -> Self {
        Self::new(BlockChain::from(block))
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        Self::from_block(ByteBlock::from(data))
    }

    /// Total bytes consumed since construction (or the last ``reset``).
    #[inline(always)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Position of the cursor inside the current block.
    #[inline(always)]
    pub fn local_offset(&self) -> usize {
        self.local_offset
    }

    pub fn chain(&self) -> &BlockChain {
        &self.chain
    }

    pub fn scratch_size(&self) -> usize {
        self.scratch.len()
    }

    #[inline(always)]
    pub fn remaining_bytes(&self) -> usize {
        self.chain.available_bytes().saturating_sub(self.local_offset)
    }

    #[inline(always)]
    pub fn available(&self, bytes: usize) -> bool {
        bytes <= self.remaining_bytes()
    }

    /// True iff ``bytes`` can be peeked starting at the block-relative ``offset``.
    #[inline(always)]
    pub fn available_at(&self, bytes: usize, offset: usize) -> bool {
        self.chain
            .available_bytes()
            .checked_sub(offset)
            .is_some_and(|left| bytes <= left)
    }

    /// Moves the cursor back to the very start of the input.
    pub fn reset(&mut self) {
        self.chain.reset();
        self.local_offset = 0;
        self.offset = 0;
    }

    /// Returns an independent reader at the same position over the same blocks.
    pub fn copy(&self) -> CursorReader {
        self.clone()
    }

    pub fn advance(&mut self, bytes: usize) -> WavChunksResult<&mut Self> {
        if !self.available(bytes) {
            return Err(WavChunksError::underflow(bytes, self.remaining_bytes()));
        }
        self.local_offset += bytes;
        self.offset += bytes;
        while self.chain.current().is_some()
            && self.local_offset >= self.chain.current_len()
            && self.chain.more_available()
        {
            self.local_offset -= self.chain.current_len();
            self.chain.advance();
        }
        Ok(self)
    }

    pub fn rewind(&mut self, bytes: usize) -> WavChunksResult<&mut Self> {
        if bytes > self.offset {
            return Err(WavChunksError::underflow(bytes, self.offset));
        }
        let mut left = bytes;
        while left > self.local_offset {
            left -= self.local_offset;
            if !self.chain.rewind() {
                return Err(WavChunksError::underflow(bytes, self.offset));
            }
            self.local_offset = self.chain.current_len();
        }
        self.local_offset -= left;
        self.offset -= bytes;
        Ok(self)
    }

    /// Moves the cursor to the absolute ``position``.
    pub fn seek(&mut self, position: usize) -> WavChunksResult<&mut Self> {
        if position > self.offset {
            let delta = position - self.offset;
            return self.advance(delta);
        }
        if position < self.offset {
            let delta = self.offset - position;
            return self.rewind(delta);
        }
        Ok(self)
    }

    pub fn read_u8(&mut self) -> WavChunksResult<u8> {
        if !self.available(1) {
            return Err(WavChunksError::underflow(1, self.remaining_bytes()));
        }
        let (value, block_len) = match self.chain.current() {
            Some(block) => (block[self.local_offset], block.len()),
            None => return Err(WavChunksError::underflow(1, 0)),
        };
        self.local_offset += 1;
        self.offset += 1;
        if self.local_offset == block_len {
            self.local_offset = 0;
            self.chain.advance();
        }
        Ok(value)
    }

    pub fn peek_u8(&self, offset: usize) -> WavChunksResult<u8> {
        if !self.available_at(1, offset) {
            return Err(WavChunksError::underflow(
                offset + 1,
                self.chain.available_bytes(),
            ));
        }
        let mut offset = offset;
        for block in self.chain.remaining_blocks() {
            if block.len() > offset {
                return Ok(block[offset]);
            }
            offset -= block.len();
        }
        Err(WavChunksError::underflow(offset + 1, 0))
    }

    pub fn read_i8(&mut self) -> WavChunksResult<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn peek_i8(&self, offset: usize) -> WavChunksResult<i8> {
        Ok(self.peek_u8(offset)? as i8)
    }

    /// Reads ``bytes`` bytes, least significant first: input order for little-endian,
    /// reversed for big-endian.
    pub fn read(&mut self, bytes: usize, little_endian: bool) -> WavChunksResult<Vec<u8>> {
        self.fill(bytes, little_endian)?;
        Ok(self.scratch[..bytes].to_vec())
    }

    /// The non-consuming counterpart of ``read``.
    pub fn peek(
        &mut self,
        bytes: usize,
        offset: usize,
        little_endian: bool,
    ) -> WavChunksResult<Vec<u8>> {
        self.fill_peek(bytes, offset, little_endian)?;
        Ok(self.scratch[..bytes].to_vec())
    }

    fixed_width! {
        read_u16, peek_u16 => u16, 2;
        read_i16, peek_i16 => i16, 2;
        read_u32, peek_u32 => u32, 4;
        read_i32, peek_i32 => i32, 4;
        read_f32, peek_f32 => f32, 4;
        read_f64, peek_f64 => f64, 8;
    }

    pub fn read_u24(&mut self, little_endian: bool) -> WavChunksResult<u32> {
        if !self.available(3) {
            return Err(WavChunksError::underflow(3, self.remaining_bytes()));
        }
        if little_endian {
            let low = self.read_u16(true)? as u32;
            Ok(low + ((self.read_u8()? as u32) << 16))
        } else {
            let high = self.read_u16(false)? as u32;
            Ok((high << 8) + self.read_u8()? as u32)
        }
    }

    pub fn peek_u24(&mut self, offset: usize, little_endian: bool) -> WavChunksResult<u32> {
        if little_endian {
            let low = self.peek_u16(offset, true)? as u32;
            Ok(low + ((self.peek_u8(offset + 2)? as u32) << 16))
        } else {
            let high = self.peek_u16(offset, false)? as u32;
            Ok((high << 8) + self.peek_u8(offset + 2)? as u32)
        }
    }

    pub fn read_i24(&mut self, little_endian: bool) -> WavChunksResult<i32> {
        if !self.available(3) {
            return Err(WavChunksError::underflow(3, self.remaining_bytes()));
        }
        if little_endian {
            let low = self.read_u16(true)? as i32;
            Ok(low + ((self.read_i8()? as i32) << 16))
        } else {
            let high = self.read_i16(false)? as i32;
            Ok((high << 8) + self.read_u8()? as i32)
        }
    }

    pub fn peek_i24(&mut self, offset: usize, little_endian: bool) -> WavChunksResult<i32> {
        if little_endian {
            let low = self.peek_u16(offset, true)? as i32;
            Ok(low + ((self.peek_i8(offset + 2)? as i32) << 16))
        } else {
            let high = self.peek_i16(offset, false)? as i32;
            Ok((high << 8) + self.peek_u8(offset + 2)? as i32)
        }
    }

    /// Reads a 48-bit Turbo Pascal ``Real``, rounded to 4 decimal places.
    pub fn read_f48(&mut self, little_endian: bool) -> WavChunksResult<f64> {
        self.fill(6, little_endian)?;
        Ok(real48(self.scratch_array::<6>()))
    }

    pub fn peek_f48(&mut self, offset: usize, little_endian: bool) -> WavChunksResult<f64> {
        self.fill_peek(6, offset, little_endian)?;
        Ok(real48(self.scratch_array::<6>()))
    }

    /// Reads an 80-bit x87 extended precision float, as found in sampler and AIFF metadata.
    pub fn read_f80(&mut self, little_endian: bool) -> WavChunksResult<f64> {
        self.fill(10, little_endian)?;
        Ok(extended80(self.scratch_array::<10>()))
    }

    pub fn peek_f80(&mut self, offset: usize, little_endian: bool) -> WavChunksResult<f64> {
        self.fill_peek(10, offset, little_endian)?;
        Ok(extended80(self.scratch_array::<10>()))
    }

    /// Extracts ``length`` bits starting at bit ``position`` of the byte at ``offset``,
    /// where bit 0 is the most significant.
    pub fn peek_bit(&self, position: u32, length: u32, offset: usize) -> WavChunksResult<u8> {
        if position > 7 {
            return Err(WavChunksError::InvalidArgument(format!(
                "peek_bit position is invalid: {}, must be an Integer between 0 and 7",
                position
            )));
        }
        if !(1..=8).contains(&length) {
            return Err(WavChunksError::InvalidArgument(format!(
                "peek_bit length is invalid: {}, must be an Integer between 1 and 8",
                length
            )));
        }
        let value = self.peek_u8(offset)? as u32;
        Ok((((value << position) & 0xFF) >> (8 - length)) as u8)
    }

    /// Copies ``length`` bytes into a new block and advances past them.
    pub fn read_block(&mut self, length: usize) -> WavChunksResult<ByteBlock> {
        if !self.available(length) {
            return Err(WavChunksError::underflow(length, self.remaining_bytes()));
        }
        let mut out = Vec::with_capacity(length);
        let mut left = length;
        while left > 0 {
            let take = match self.chain.current() {
                Some(block) => {
                    let take = (block.len() - self.local_offset).min(left);
                    out.extend_from_slice(&block[self.local_offset..self.local_offset + take]);
                    take
                }
                None => return Err(WavChunksError::underflow(left, 0)),
            };
            self.advance(take)?;
            left -= take;
        }
        Ok(ByteBlock::from(out))
    }

    /// Copies ``length`` bytes starting at the block-relative ``offset`` into a new block.
    pub fn peek_block(&self, offset: usize, length: usize) -> WavChunksResult<ByteBlock> {
        if !self.available_at(length, offset) {
            return Err(WavChunksError::underflow(
                offset + length,
                self.chain.available_bytes(),
            ));
        }
        let mut out = Vec::with_capacity(length);
        let mut skip = offset;
        for block in self.chain.remaining_blocks() {
            if out.len() == length {
                break;
            }
            if skip >= block.len() {
                skip -= block.len();
                continue;
            }
            let take = (block.len() - skip).min(length - out.len());
            out.extend_from_slice(&block[skip..skip + take]);
            skip = 0;
        }
        Ok(ByteBlock::from(out))
    }

    /// Returns a zero-copy slice of at most ``length`` bytes from the current block only,
    /// and advances past it.
    pub fn read_single_block(&mut self, length: Option<usize>) -> WavChunksResult<ByteBlock> {
        let result = match self.chain.current() {
            Some(block) => block.slice(self.local_offset, length),
            None => return Err(WavChunksError::underflow(length.unwrap_or(1), 0)),
        };
        self.advance(result.len())?;
        Ok(result)
    }

    /// Zero-copy slice of the current block starting at the block-relative ``offset``.
    pub fn peek_single_block(
        &self,
        offset: usize,
        length: Option<usize>,
    ) -> WavChunksResult<ByteBlock> {
        match self.chain.current() {
            Some(block) => Ok(block.slice(offset, length)),
            None => Err(WavChunksError::underflow(length.unwrap_or(1), 0)),
        }
    }

    /// Reads ``length`` bytes, sharing the current block when they all sit inside it and
    /// copying only when they span blocks.
    pub fn read_shared_block(&mut self, length: usize) -> WavChunksResult<ByteBlock> {
        if length > 0 && self.chain.current_len().saturating_sub(self.local_offset) >= length {
            return self.read_single_block(Some(length));
        }
        self.read_block(length)
    }

    /// Decodes a string and advances past it.
    ///
    /// With ``Some(length)`` exactly ``length`` bytes are decoded and consumed. With ``None``
    /// decoding stops at the first zero code unit (which is consumed too) or when the input ends.
    pub fn read_string(
        &mut self,
        length: Option<usize>,
        encoding: Encoding,
    ) -> WavChunksResult<String> {
        let start = self.local_offset;
        let (text, consumed) = self.decode_string(start, length, encoding, None)?;
        self.advance(consumed)?;
        Ok(text)
    }

    /// Decodes an unbounded single-byte string that also ends at ``terminator``, which is
    /// consumed like the zero byte.
    pub fn read_string_until(
        &mut self,
        encoding: Encoding,
        terminator: u8,
    ) -> WavChunksResult<String> {
        let start = self.local_offset;
        let (text, consumed) = self.decode_string(start, None, encoding, Some(terminator))?;
        self.advance(consumed)?;
        Ok(text)
    }

    /// Decodes a string at the block-relative ``offset`` without moving the cursor.
    pub fn peek_string(
        &self,
        offset: usize,
        length: Option<usize>,
        encoding: Encoding,
    ) -> WavChunksResult<String> {
        Ok(self.decode_string(offset, length, encoding, None)?.0)
    }

    /// [`peek_string`](Self::peek_string) for an unbounded string ending at ``terminator``.
    pub fn peek_string_until(
        &self,
        offset: usize,
        encoding: Encoding,
        terminator: u8,
    ) -> WavChunksResult<String> {
        Ok(self.decode_string(offset, None, encoding, Some(terminator))?.0)
    }

    /// Shorthand for a fixed-length single-byte string, the shape of every RIFF tag.
    pub fn read_tag(&mut self) -> WavChunksResult<String> {
        self.read_string(Some(4), Encoding::Ascii)
    }

    /// True iff the upcoming bytes equal ``expected``. Never consumes and never fails.
    pub fn next(&self, expected: &[u8]) -> bool {
        if expected.is_empty() {
            return false;
        }
        if !self.available(expected.len()) {
            log!(
                log::Level::Trace,
                "next: insufficient bytes: {} > {}",
                expected.len(),
                self.remaining_bytes()
            );
            return false;
        }
        expected
            .iter()
            .enumerate()
            .all(|(i, byte)| self.peek_u8(self.local_offset + i).ok() == Some(*byte))
    }

    /// Byte-wise comparison of this reader against ``other``, both starting at ``offset``.
    /// Consumes both readers.
    pub fn compare(&mut self, other: &mut CursorReader, offset: usize) -> bool {
        let mut available = other.chain.available_bytes();
        if available == 0 {
            return false;
        }
        if offset > 0 {
            available = available.saturating_sub(offset);
            if self.seek(offset).is_err() || other.seek(offset).is_err() {
                return false;
            }
        }
        for _ in 0..available {
            match (self.read_u8(), other.read_u8()) {
                (Ok(local), Ok(external)) if local == external => continue,
                _ => return false,
            }
        }
        true
    }

    fn ensure_scratch(&mut self, bytes: usize) {
        if bytes > self.scratch.len() {
            self.scratch = vec![0u8; scratch_size_for(bytes)].into_boxed_slice();
        }
    }

    fn fill(&mut self, bytes: usize, little_endian: bool) -> WavChunksResult<()> {
        if !self.available(bytes) {
            return Err(WavChunksError::underflow(bytes, self.remaining_bytes()));
        }
        self.ensure_scratch(bytes);
        if little_endian {
            for i in 0..bytes {
                self.scratch[i] = self.read_u8()?;
            }
        } else {
            for i in (0..bytes).rev() {
                self.scratch[i] = self.read_u8()?;
            }
        }
        Ok(())
    }

    fn fill_peek(&mut self, bytes: usize, offset: usize, little_endian: bool) -> WavChunksResult<()> {
        self.ensure_scratch(bytes);
        for i in 0..bytes {
            let byte = self.peek_u8(offset + i)?;
            if little_endian {
                self.scratch[i] = byte;
            } else {
                self.scratch[bytes - i - 1] = byte;
            }
        }
        Ok(())
    }

    #[inline(always)]
    fn scratch_array<const N: usize>(&self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.scratch[..N]);
        out
    }

    /// Returns the decoded text and the number of bytes the cursor should move past it.
    fn decode_string(
        &self,
        start: usize,
        length: Option<usize>,
        encoding: Encoding,
        terminator: Option<u8>,
    ) -> WavChunksResult<(String, usize)> {
        let null_terminated = length.is_none();
        let ends_text = |byte: u8| null_terminated && (byte == 0 || Some(byte) == terminator);
        let end = match length {
            Some(length) => {
                if !self.available_at(length, start) {
                    return Err(WavChunksError::underflow(
                        start + length,
                        self.chain.available_bytes(),
                    ));
                }
                start + length
            }
            None => self.chain.available_bytes().max(start),
        };

        let mut pos = start;
        let mut result = String::new();
        match encoding {
            Encoding::Ascii | Encoding::Latin1 => {
                while pos < end {
                    let byte = self.peek_u8(pos)?;
                    pos += 1;
                    if ends_text(byte) {
                        break;
                    }
                    result.push(char::from(byte));
                }
            }
            Encoding::Utf8 => {
                while pos < end {
                    let lead = self.peek_u8(pos)?;
                    pos += 1;
                    if ends_text(lead) {
                        break;
                    }
                    let b1 = lead as u32;
                    let (continuations, lead_bits) = if b1 & 0x80 == 0 {
                        (0, b1)
                    } else if b1 & 0xE0 == 0xC0 {
                        (1, b1 & 0x1F)
                    } else if b1 & 0xF0 == 0xE0 {
                        (2, b1 & 0x0F)
                    } else if b1 & 0xF8 == 0xF0 {
                        (3, b1 & 0x07)
                    } else {
                        result.push(REPLACEMENT_CHARACTER);
                        continue;
                    };
                    // A sequence cut off by the end of the range is not completed from beyond it.
                    if pos + continuations > end {
                        result.push(REPLACEMENT_CHARACTER);
                        pos = end;
                        break;
                    }
                    let mut code_point = lead_bits;
                    for i in 0..continuations {
                        code_point = code_point << 6 | (self.peek_u8(pos + i)? as u32 & 0x3F);
                    }
                    pos += continuations;
                    result.push(char::from_u32(code_point).unwrap_or(REPLACEMENT_CHARACTER));
                }
            }
            Encoding::Utf16Le | Encoding::Utf16Be | Encoding::Utf16Bom => {
                let little_endian = match encoding {
                    Encoding::Utf16Le => true,
                    Encoding::Utf16Be => false,
                    _ => {
                        if end - pos < 2 {
                            return Ok((result, end - start));
                        }
                        let bom = self.peek_u16_be(pos)?;
                        pos += 2;
                        if null_terminated && bom == 0 {
                            return Ok((result, pos - start));
                        }
                        bom == 0xFFFE
                    }
                };
                while pos + 2 <= end {
                    let w1 = self.peek_u16_ordered(pos, little_endian)?;
                    pos += 2;
                    if null_terminated && w1 == 0 {
                        break;
                    }
                    if !(0xD800..=0xDFFF).contains(&w1) {
                        result.push(char::from_u32(w1 as u32).unwrap_or(REPLACEMENT_CHARACTER));
                        continue;
                    }
                    if w1 >= 0xDC00 {
                        return Err(WavChunksError::InvalidUtf16(pos - 2));
                    }
                    let w2 = self.peek_u16_ordered(pos, little_endian)?;
                    if !(0xDC00..=0xDFFF).contains(&w2) {
                        return Err(WavChunksError::InvalidUtf16(pos));
                    }
                    pos += 2;
                    let code_point =
                        0x10000 + (((w1 as u32) - 0xD800) << 10) + ((w2 as u32) - 0xDC00);
                    result.push(char::from_u32(code_point).unwrap_or(REPLACEMENT_CHARACTER));
                }
            }
        }

        let consumed = match length {
            Some(length) => length,
            None => pos.min(end) - start,
        };
        Ok((result, consumed))
    }

    fn peek_u16_be(&self, offset: usize) -> WavChunksResult<u16> {
        self.peek_u16_ordered(offset, false)
    }

    // Text decoding peeks without touching the scratch buffer so that it can stay ``&self``.
    fn peek_u16_ordered(&self, offset: usize, little_endian: bool) -> WavChunksResult<u16> {
        let bytes = [self.peek_u8(offset)?, self.peek_u8(offset + 1)?];
        Ok(match little_endian {
            true => u16::from_le_bytes(bytes),
            false => u16::from_be_bytes(bytes),
        })
    }
}

impl Display for CursorReader {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CursorReader: offset {}, local offset {}, {} bytes remaining",
            self.offset,
            self.local_offset,
            self.remaining_bytes()
        )
    }
}

/// Decodes a 6 byte Turbo Pascal ``Real`` laid out least significant byte first.
fn real48(bytes: [u8; 6]) -> f64 {
    if bytes[0] == 0 {
        return 0.0;
    }
    let exponent = bytes[0] as i32 - 0x81;
    let mut mantissa = 0.0f64;
    for byte in &bytes[1..5] {
        mantissa += *byte as f64;
        mantissa /= 256.0;
    }
    mantissa += (bytes[5] & 0x7F) as f64;
    mantissa /= 128.0;
    mantissa += 1.0;
    if bytes[5] & 0x80 != 0 {
        mantissa = -mantissa;
    }
    let output = mantissa * 2f64.powi(exponent);
    (output * 10_000.0).round() / 10_000.0
}

/// Decodes a 10 byte x87 extended float laid out least significant byte first.
fn extended80(bytes: [u8; 10]) -> f64 {
    let mantissa_low = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let mantissa_high = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    let sign = if bytes[9] & 0x80 != 0 { -1.0 } else { 1.0 };
    let exponent = ((bytes[9] as i32 & 0x7F) << 8) | bytes[8] as i32;

    if exponent == 0 && mantissa_low == 0 && mantissa_high == 0 {
        return 0.0;
    }
    if exponent == 0x7FFF {
        if mantissa_low == 0 && mantissa_high & 0x7FFF_FFFF == 0 {
            return sign * f64::INFINITY;
        }
        return f64::NAN;
    }
    let exponent = exponent - 0x3FFF;
    let out = mantissa_high as f64 * 2f64.powi(exponent - 31)
        + mantissa_low as f64 * 2f64.powi(exponent - 63);
    sign * out
}

#[cfg(test)]
mod reader_tests {
    use super::*;
    use approx_eq::assert_approx_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const SEED: u64 = 0x5249_4646;

    /// Splits ``bytes`` into blocks at the given cut points.
    fn chain_with_cuts(bytes: &[u8], cuts: &[usize]) -> BlockChain {
        let mut chain = BlockChain::new();
        let mut last = 0;
        for &cut in cuts.iter().chain(std::iter::once(&bytes.len())) {
            chain.append(ByteBlock::from(&bytes[last..cut]));
            last = cut;
        }
        chain
    }

    fn random_chain(bytes: &[u8], rng: &mut StdRng) -> BlockChain {
        let mut cuts: Vec<usize> = (0..rng.gen_range(0..6))
            .map(|_| rng.gen_range(0..=bytes.len()))
            .collect();
        cuts.sort_unstable();
        chain_with_cuts(bytes, &cuts)
    }

    fn random_bytes(rng: &mut StdRng, len: usize) -> Vec<u8> {
        (0..len).map(|_| rng.gen()).collect()
    }

    macro_rules! int_width_tests {
        ($($T:ident: $read:ident, $peek:ident, $N:literal;)*) => {
            $(
                paste::item! {
                    #[test]
                    fn [<read_ $T _matches_manual_decoding>]() {
                        let mut rng = StdRng::seed_from_u64(SEED);
                        for _ in 0..32 {
                            let bytes = random_bytes(&mut rng, 24);
                            let chain = random_chain(&bytes, &mut rng);
                            for i in 0..=bytes.len() - $N {
                                let window: [u8; $N] = bytes[i..i + $N].try_into().unwrap();

                                let mut reader = CursorReader::new(chain.clone());
                                reader.seek(i).unwrap();
                                assert_eq!(reader.$read(true).unwrap(), $T::from_le_bytes(window));
                                assert_eq!(reader.offset(), i + $N);

                                reader.seek(i).unwrap();
                                assert_eq!(reader.$read(false).unwrap(), $T::from_be_bytes(window));
                            }
                        }
                    }

                    #[test]
                    fn [<peek_ $T _matches_manual_decoding>]() {
                        let mut rng = StdRng::seed_from_u64(SEED + 1);
                        for _ in 0..32 {
                            let bytes = random_bytes(&mut rng, 24);
                            let mut reader = CursorReader::new(random_chain(&bytes, &mut rng));
                            for i in 0..=bytes.len() - $N {
                                let window: [u8; $N] = bytes[i..i + $N].try_into().unwrap();
                                assert_eq!(reader.$peek(i, true).unwrap(), $T::from_le_bytes(window));
                                assert_eq!(reader.$peek(i, false).unwrap(), $T::from_be_bytes(window));
                            }
                            assert_eq!(reader.offset(), 0);
                        }
                    }

                    #[test]
                    fn [<read_ $T _underflows_at_end>]() {
                        let mut reader = CursorReader::from_bytes(&[0u8; $N - 1]);
                        assert!(reader.$read(true).unwrap_err().is_underflow());
                        // A failed read consumes nothing.
                        assert_eq!(reader.offset(), 0);
                    }
                }
            )*
        };
    }

    int_width_tests! {
        u16: read_u16, peek_u16, 2;
        i16: read_i16, peek_i16, 2;
        u32: read_u32, peek_u32, 4;
        i32: read_i32, peek_i32, 4;
    }

    #[test]
    fn read_u8_walks_across_blocks() {
        let mut reader = CursorReader::new(chain_with_cuts(&[1, 2, 3, 4], &[1, 3]));
        let read: Vec<u8> = (0..4).map(|_| reader.read_u8().unwrap()).collect();
        assert_eq!(read, vec![1, 2, 3, 4]);
        assert_eq!(reader.remaining_bytes(), 0);
        assert!(reader.read_u8().unwrap_err().is_underflow());
    }

    #[test]
    fn floats_match_manual_decoding() {
        let mut rng = StdRng::seed_from_u64(SEED + 2);
        for _ in 0..32 {
            let bytes = random_bytes(&mut rng, 16);
            let mut reader = CursorReader::new(random_chain(&bytes, &mut rng));
            let f32_window: [u8; 4] = bytes[3..7].try_into().unwrap();
            let f64_window: [u8; 8] = bytes[5..13].try_into().unwrap();
            assert_eq!(
                reader.peek_f32(3, true).unwrap().to_bits(),
                f32::from_le_bytes(f32_window).to_bits()
            );
            assert_eq!(
                reader.peek_f64(5, false).unwrap().to_bits(),
                f64::from_be_bytes(f64_window).to_bits()
            );
            reader.seek(5).unwrap();
            assert_eq!(
                reader.read_f64(true).unwrap().to_bits(),
                f64::from_le_bytes(f64_window).to_bits()
            );
        }
    }

    #[test]
    fn u24_and_i24_match_manual_decoding() {
        let mut rng = StdRng::seed_from_u64(SEED + 3);
        for _ in 0..64 {
            let bytes = random_bytes(&mut rng, 3);
            let le = bytes[0] as u32 | (bytes[1] as u32) << 8 | (bytes[2] as u32) << 16;
            let be = bytes[2] as u32 | (bytes[1] as u32) << 8 | (bytes[0] as u32) << 16;
            let sign_extend = |v: u32| ((v << 8) as i32) >> 8;

            let mut reader = CursorReader::new(random_chain(&bytes, &mut rng));
            assert_eq!(reader.peek_u24(0, true).unwrap(), le);
            assert_eq!(reader.peek_u24(0, false).unwrap(), be);
            assert_eq!(reader.peek_i24(0, true).unwrap(), sign_extend(le));
            assert_eq!(reader.peek_i24(0, false).unwrap(), sign_extend(be));
            assert_eq!(reader.read_u24(true).unwrap(), le);
            reader.rewind(3).unwrap();
            assert_eq!(reader.read_i24(false).unwrap(), sign_extend(be));
        }
    }

    #[test]
    fn reads_extended_80_bit_floats() {
        // 44100.0 as stored in an AIFF COMM chunk (big-endian).
        let bytes = [0x40, 0x0E, 0xAC, 0x44, 0, 0, 0, 0, 0, 0];
        let mut reader = CursorReader::from_bytes(&bytes);
        assert_approx_eq!(reader.peek_f80(0, false).unwrap(), 44100.0);
        let mut reversed = bytes;
        reversed.reverse();
        let mut reader = CursorReader::from_bytes(&reversed);
        assert_approx_eq!(reader.read_f80(true).unwrap(), 44100.0);

        let mut zero = CursorReader::from_bytes(&[0u8; 10]);
        assert_eq!(zero.read_f80(true).unwrap(), 0.0);

        let mut infinity = CursorReader::from_bytes(&[0xFF, 0xFF, 0x80, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(infinity.read_f80(false).unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn reads_48_bit_reals() {
        let mut reader = CursorReader::from_bytes(&[
            0x81, 0, 0, 0, 0, 0x00, // 1.0
            0x82, 0, 0, 0, 0, 0xA0, // -2.5
            0x00, 9, 9, 9, 9, 0x09, // zero exponent means zero
        ]);
        assert_approx_eq!(reader.peek_f48(6, true).unwrap(), -2.5);
        assert_eq!(reader.offset(), 0);
        assert_approx_eq!(reader.read_f48(true).unwrap(), 1.0);
        assert_approx_eq!(reader.read_f48(true).unwrap(), -2.5);
        assert_eq!(reader.read_f48(true).unwrap(), 0.0);
    }

    #[test]
    fn advance_then_rewind_is_identity() {
        let mut rng = StdRng::seed_from_u64(SEED + 4);
        for _ in 0..32 {
            let bytes = random_bytes(&mut rng, 40);
            let mut reader = CursorReader::new(random_chain(&bytes, &mut rng));
            let start = rng.gen_range(0..bytes.len());
            reader.seek(start).unwrap();
            for n in 0..=reader.remaining_bytes() {
                reader.advance(n).unwrap();
                reader.rewind(n).unwrap();
                assert_eq!(reader.offset(), start);
                assert_eq!(reader.remaining_bytes(), bytes.len() - start);
                let mut probe = reader.copy();
                assert_eq!(probe.read_u8().unwrap(), bytes[start]);
            }
        }
    }

    #[test]
    fn rewind_crosses_several_blocks() {
        let bytes: Vec<u8> = (0..10).collect();
        let mut reader = CursorReader::new(chain_with_cuts(&bytes, &[2, 4, 5, 8]));
        reader.advance(10).unwrap();
        assert_eq!(reader.remaining_bytes(), 0);
        reader.rewind(9).unwrap();
        assert_eq!(reader.offset(), 1);
        assert_eq!(reader.read_u8().unwrap(), 1);

        // After reading the very last byte the chain is exhausted, rewinding must still work.
        reader.seek(9).unwrap();
        assert_eq!(reader.read_u8().unwrap(), 9);
        assert!(reader.chain().current().is_none());
        reader.rewind(6).unwrap();
        assert_eq!(reader.read_u8().unwrap(), 4);
    }

    #[test]
    fn advance_and_rewind_reject_overruns() {
        let mut reader = CursorReader::from_bytes(&[1, 2, 3]);
        assert!(reader.advance(4).unwrap_err().is_underflow());
        assert!(reader.rewind(1).unwrap_err().is_underflow());
        reader.advance(2).unwrap();
        assert!(reader.rewind(3).unwrap_err().is_underflow());
        assert_eq!(reader.offset(), 2);
    }

    #[test]
    fn peek_never_moves_the_cursor() {
        let bytes: Vec<u8> = (10..30).collect();
        let mut reader = CursorReader::new(chain_with_cuts(&bytes, &[3, 7, 15]));
        for k in 0..bytes.len() {
            assert_eq!(reader.peek_u8(k).unwrap(), bytes[k]);
            assert_eq!(reader.offset(), 0);
            assert_eq!(reader.local_offset(), 0);
        }
        assert!(reader.peek_u8(bytes.len()).unwrap_err().is_underflow());

        // Peek offsets are relative to the block holding the cursor.
        reader.advance(4).unwrap();
        assert_eq!(reader.local_offset(), 1);
        assert_eq!(reader.peek_u8(0).unwrap(), bytes[3]);
    }

    #[test]
    fn seek_moves_both_ways() {
        let mut reader = CursorReader::new(chain_with_cuts(&[0, 1, 2, 3, 4, 5], &[2, 4]));
        reader.seek(5).unwrap();
        assert_eq!(reader.read_u8().unwrap(), 5);
        reader.seek(1).unwrap();
        assert_eq!(reader.read_u8().unwrap(), 1);
        reader.seek(2).unwrap();
        assert_eq!(reader.offset(), 2);
    }

    #[test]
    fn peek_bit_extracts_msb_first() {
        let reader = CursorReader::from_bytes(&[0b1011_0010]);
        assert_eq!(reader.peek_bit(0, 1, 0).unwrap(), 1);
        assert_eq!(reader.peek_bit(1, 1, 0).unwrap(), 0);
        assert_eq!(reader.peek_bit(2, 2, 0).unwrap(), 0b11);
        assert_eq!(reader.peek_bit(4, 4, 0).unwrap(), 0b0010);
        assert_eq!(reader.peek_bit(0, 8, 0).unwrap(), 0b1011_0010);
        assert!(matches!(
            reader.peek_bit(8, 1, 0),
            Err(WavChunksError::InvalidArgument(_))
        ));
        assert!(matches!(
            reader.peek_bit(0, 0, 0),
            Err(WavChunksError::InvalidArgument(_))
        ));
        assert!(matches!(
            reader.peek_bit(0, 9, 0),
            Err(WavChunksError::InvalidArgument(_))
        ));
    }

    #[test]
    fn read_block_copies_across_boundaries() {
        let bytes: Vec<u8> = (0..12).collect();
        let mut reader = CursorReader::new(chain_with_cuts(&bytes, &[5, 6]));
        reader.advance(3).unwrap();
        let block = reader.read_block(6).unwrap();
        assert_eq!(block.as_slice(), &bytes[3..9]);
        assert_eq!(reader.offset(), 9);
        assert_eq!(reader.peek_block(0, 2).unwrap().as_slice(), &[6, 7]);
        assert!(reader.read_block(4).unwrap_err().is_underflow());
    }

    #[test]
    fn single_block_reads_stop_at_the_block_edge() {
        let mut reader = CursorReader::new(chain_with_cuts(&[1, 2, 3, 4, 5], &[3]));
        reader.advance(1).unwrap();
        let first = reader.read_single_block(None).unwrap();
        assert_eq!(first.as_slice(), &[2, 3]);
        assert_eq!(reader.offset(), 3);
        // Offsets count from the start of the current block, like every other peek.
        assert_eq!(reader.local_offset(), 0);
        assert_eq!(reader.peek_single_block(1, Some(1)).unwrap().as_slice(), &[5]);
        assert_eq!(reader.peek_u8(1).unwrap(), 5);
        reader.advance(1).unwrap();
        assert_eq!(reader.peek_single_block(0, None).unwrap().as_slice(), &[4, 5]);
    }

    #[test]
    fn shared_block_reads_avoid_copies_inside_one_block() {
        let backing = ByteBlock::from(vec![1u8, 2, 3, 4, 5, 6]);
        let mut reader = CursorReader::from_block(backing.clone());
        reader.advance(1).unwrap();
        let shared = reader.read_shared_block(4).unwrap();
        assert_eq!(shared.as_slice(), &[2, 3, 4, 5]);
        assert_eq!(shared.as_slice().as_ptr(), backing.as_slice()[1..].as_ptr());
        assert_eq!(reader.offset(), 5);

        let mut split = CursorReader::new(chain_with_cuts(&[1, 2, 3, 4, 5, 6], &[3]));
        split.advance(1).unwrap();
        assert_eq!(split.read_shared_block(4).unwrap().as_slice(), &[2, 3, 4, 5]);
        assert_eq!(split.offset(), 5);
        assert!(split.read_shared_block(2).unwrap_err().is_underflow());
    }

    #[test]
    fn custom_terminators_end_unbounded_strings() {
        let mut reader = CursorReader::new(chain_with_cuts(b"name;rest", &[3]));
        assert_eq!(reader.peek_string_until(0, Encoding::Ascii, b';').unwrap(), "name");
        assert_eq!(reader.read_string_until(Encoding::Latin1, b';').unwrap(), "name");
        // The terminator is consumed like a zero byte.
        assert_eq!(reader.offset(), 5);
        assert_eq!(reader.read_string_until(Encoding::Utf8, b';').unwrap(), "rest");
        assert_eq!(reader.remaining_bytes(), 0);

        let mut zero_first = CursorReader::from_bytes(b"ab\0c;d");
        assert_eq!(zero_first.read_string_until(Encoding::Ascii, b';').unwrap(), "ab");
        assert_eq!(zero_first.offset(), 3);
    }

    #[test]
    fn fixed_length_utf8_stays_inside_its_range() {
        let mut reader = CursorReader::from_bytes(&[0x61, 0xC3, 0xA9, 0x7A]);
        assert_eq!(reader.read_string(Some(2), Encoding::Utf8).unwrap(), "a\u{FFFD}");
        assert_eq!(reader.offset(), 2);
        assert_eq!(reader.read_u8().unwrap(), 0xA9);

        let mut cut = CursorReader::from_bytes(&[0x61, 0xC3]);
        assert_eq!(cut.read_string(Some(2), Encoding::Utf8).unwrap(), "a\u{FFFD}");
        assert_eq!(cut.remaining_bytes(), 0);

        let mut whole = CursorReader::from_bytes(&[0x61, 0xC3, 0xA9, 0x7A]);
        assert_eq!(whole.read_string(Some(4), Encoding::Utf8).unwrap(), "a\u{e9}z");
    }

    #[test]
    fn encodings_parse_by_name() {
        assert_eq!("UTF-8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("utf16-bom".parse::<Encoding>().unwrap(), Encoding::Utf16Bom);
        assert!(matches!(
            "ebcdic".parse::<Encoding>(),
            Err(WavChunksError::UnsupportedEncoding(name)) if name == "ebcdic"
        ));
    }

    #[test]
    fn fixed_length_ascii_keeps_every_byte() {
        let mut reader = CursorReader::from_bytes(b"ab\0dWAVE");
        assert_eq!(reader.read_string(Some(4), Encoding::Ascii).unwrap(), "ab\0d");
        assert_eq!(reader.read_tag().unwrap(), "WAVE");
        assert_eq!(reader.remaining_bytes(), 0);
    }

    #[test]
    fn unbounded_strings_stop_at_the_terminator() {
        let mut reader = CursorReader::new(chain_with_cuts(b"riff\0rest", &[2]));
        assert_eq!(reader.read_string(None, Encoding::Latin1).unwrap(), "riff");
        // The terminator is consumed, the rest is not.
        assert_eq!(reader.offset(), 5);
        assert_eq!(reader.read_string(None, Encoding::Ascii).unwrap(), "rest");
        assert_eq!(reader.remaining_bytes(), 0);
    }

    #[test]
    fn latin1_maps_high_bytes() {
        let mut reader = CursorReader::from_bytes(&[0xE9, 0x74, 0xE9]);
        assert_eq!(reader.read_string(Some(3), Encoding::Latin1).unwrap(), "été");
    }

    #[test]
    fn utf8_decodes_multi_byte_sequences() {
        let text = "aé€😀";
        let mut reader = CursorReader::from_bytes(text.as_bytes());
        assert_eq!(
            reader.read_string(Some(text.len()), Encoding::Utf8).unwrap(),
            text
        );
        assert_eq!(reader.remaining_bytes(), 0);

        let mut bytes = text.as_bytes().to_vec();
        bytes.extend_from_slice(b"\0tail");
        let mut reader = CursorReader::from_bytes(&bytes);
        assert_eq!(reader.read_string(None, Encoding::Utf8).unwrap(), text);
        assert_eq!(reader.offset(), text.len() + 1);
    }

    #[test]
    fn utf16_decodes_both_orders_and_surrogates() {
        let text = "hi😀";
        let le: Vec<u8> = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
        let be: Vec<u8> = text.encode_utf16().flat_map(u16::to_be_bytes).collect();

        let reader = CursorReader::from_bytes(&le);
        assert_eq!(
            reader.peek_string(0, Some(le.len()), Encoding::Utf16Le).unwrap(),
            text
        );
        let reader = CursorReader::from_bytes(&be);
        assert_eq!(
            reader.peek_string(0, Some(be.len()), Encoding::Utf16Be).unwrap(),
            text
        );
    }

    #[test]
    fn utf16_bom_selects_byte_order() {
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend("ok".encode_utf16().flat_map(u16::to_le_bytes));
        bytes.extend_from_slice(&[0, 0, 0x41, 0]);
        let mut reader = CursorReader::from_bytes(&bytes);
        assert_eq!(reader.read_string(None, Encoding::Utf16Bom).unwrap(), "ok");
        // BOM + 2 code units + terminator.
        assert_eq!(reader.offset(), 8);

        let mut bytes = vec![0xFE, 0xFF];
        bytes.extend("ok".encode_utf16().flat_map(u16::to_be_bytes));
        let mut reader = CursorReader::from_bytes(&bytes);
        assert_eq!(
            reader.read_string(Some(bytes.len()), Encoding::Utf16Bom).unwrap(),
            "ok"
        );
    }

    #[test]
    fn utf16_rejects_lone_surrogates() {
        let bytes: Vec<u8> = [0xD800u16, 0x0041]
            .iter()
            .flat_map(|w| w.to_le_bytes())
            .collect();
        let reader = CursorReader::from_bytes(&bytes);
        assert!(matches!(
            reader.peek_string(0, Some(4), Encoding::Utf16Le),
            Err(WavChunksError::InvalidUtf16(2))
        ));
    }

    #[test]
    fn fixed_length_strings_underflow_without_moving() {
        let mut reader = CursorReader::from_bytes(b"abc");
        assert!(reader
            .read_string(Some(4), Encoding::Ascii)
            .unwrap_err()
            .is_underflow());
        assert_eq!(reader.offset(), 0);
    }

    #[test]
    fn next_checks_without_consuming() {
        let reader = CursorReader::new(chain_with_cuts(b"RIFFWAVE", &[3]));
        assert!(reader.next(b"RIFF"));
        assert!(reader.next(b"RIFFWAVE"));
        assert!(!reader.next(b"RIFX"));
        assert!(!reader.next(b"RIFFWAVE!"));
        assert!(!reader.next(b""));
        assert_eq!(reader.offset(), 0);
    }

    #[test]
    fn compare_walks_two_independent_readers() {
        let bytes: Vec<u8> = (0..20).collect();
        let mut rng = StdRng::seed_from_u64(SEED + 5);
        let mut left = CursorReader::new(random_chain(&bytes, &mut rng));
        let mut right = CursorReader::new(random_chain(&bytes, &mut rng));
        assert!(left.compare(&mut right, 0));

        let mut left = CursorReader::from_bytes(&bytes);
        let mut changed = bytes.clone();
        changed[15] = 0;
        let mut right = CursorReader::from_bytes(&changed);
        assert!(!left.compare(&mut right, 0));

        let mut left = CursorReader::from_bytes(&bytes);
        let mut right = CursorReader::from_bytes(&changed);
        right.advance(0).unwrap();
        assert!(!left.compare(&mut right, 4));

        let mut left = CursorReader::from_bytes(&bytes);
        let mut empty = CursorReader::new(BlockChain::new());
        assert!(!left.compare(&mut empty, 0));
    }

    #[test]
    fn reset_returns_to_the_start() {
        let mut reader = CursorReader::new(chain_with_cuts(&[7, 8, 9], &[1, 2]));
        reader.advance(3).unwrap();
        reader.reset();
        assert_eq!(reader.offset(), 0);
        assert_eq!(reader.remaining_bytes(), 3);
        assert_eq!(reader.read_u8().unwrap(), 7);
    }

    #[test]
    fn scratch_is_sized_in_multiples_of_eight() {
        assert_eq!(scratch_size_for(0), 16);
        assert_eq!(scratch_size_for(17), 24);
        assert_eq!(scratch_size_for(24), 24);
        let mut reader = CursorReader::with_scratch_size(BlockChain::from(ByteBlock::from(vec![1u8; 40])), 3);
        assert_eq!(reader.scratch_size(), 16);
        assert_eq!(reader.read(33, true).unwrap().len(), 33);
        assert_eq!(reader.scratch_size(), 40);
    }
}

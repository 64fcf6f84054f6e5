//! The chunk walker.
//!
//! [`ChunkDecoder`] validates the 12 byte container header, then reads one tag and size at a
//! time, cuts the chunk out of the input and hands it to the decoder for its tag. The result is
//! an append-only list of [`ChunkRecord`]s in input order, header first.
//!
//! Only a bad container header stops a parse. Damaged chunks are recorded as
//! [`ChunkValue::Failed`] with their raw bytes, and a damaged tail is swallowed into one
//! ``(broken)`` record.
use std::fmt::{Debug, Display, Formatter};

#[cfg(feature = "colored")]
use colored::Colorize;

use crate::{
    block::ByteBlock,
    chain::BlockChain,
    chunks::{
        read_chunk, AcidChunk, BextChunk, Chunk, CueChunk, DataChunk, DisplayChunk, Ds64Chunk,
        FactChunk, FmtChunk, HeaderChunk, InstrumentChunk, ListChunk, PaddingChunk, PeakChunk,
        ResuChunk, RolandChunk, SampleChunk, StrcChunk, TriggerListChunk, ACID, BEXT, CART, CUE,
        DATA, DISP, DS64, FACT, FMT, INST, JUNK, LIST, MACOS_CHUNKS, MACOS_DESCRIPTION, PAD, PEAK,
        PROTOOLS_CHUNKS, PROTOOLS_DESCRIPTION, RESU, RLND, SMPL, STRC, TLST,
    },
    log,
    observer::{NoopObserver, ParseEvent, ParseObserver},
    options::DecodeOptions,
    reader::CursorReader,
    WavChunksResult,
};

const CHUNK_HEADER_SIZE: usize = 8;
pub const BROKEN_TYPE: &str = "(broken)";

/// One entry of the parse result.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkRecord {
    /// ``format``, ``data``, ``cue_points`` and so on, or the raw tag when no decoder applies.
    pub chunk_type: String,
    pub value: ChunkValue,
    /// The chunk's bytes, header included. ``None`` only for the container header.
    pub raw_chunk: Option<ByteBlock>,
    /// Set when no decoder recognised the tag.
    pub unknown: bool,
}

impl ChunkRecord {
    pub fn is_broken(&self) -> bool {
        matches!(self.value, ChunkValue::Broken)
    }

    /// Length of the raw chunk, 0 for the container header.
    pub fn raw_len(&self) -> usize {
        self.raw_chunk.as_ref().map_or(0, |raw| raw.len())
    }
}

/// Decoded body of a chunk, one variant per chunk family.
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkValue {
    Header(HeaderChunk),
    Format(FmtChunk),
    Fact(FactChunk),
    Instrument(InstrumentChunk),
    Display(DisplayChunk),
    Sample(SampleChunk),
    TriggerList(TriggerListChunk),
    Data(DataChunk),
    List(ListChunk),
    Roland(RolandChunk),
    Junk(PaddingChunk),
    Padding(PaddingChunk),
    Peak(PeakChunk),
    Acid(AcidChunk),
    Strc(StrcChunk),
    CuePoints(CueChunk),
    BroadcastExtension(BextChunk),
    LogicResu(ResuChunk),
    DataSize64(Ds64Chunk),
    /// Known vendor chunk with no public layout. Only the raw bytes are kept.
    Vendor { description: &'static str },
    /// Unrecognised tag. Only the raw bytes are kept.
    Unknown,
    /// The remainder of a damaged input.
    Broken,
    /// The chunk was framed correctly but its body did not decode.
    Failed { reason: String },
}

pub struct ChunkDecoder {
    reader: CursorReader,
    options: DecodeOptions,
    observer: Box<dyn ParseObserver>,
    chunks: Vec<ChunkRecord>,
}

impl ChunkDecoder {
    pub fn new(chain: BlockChain, options: DecodeOptions) -> Self {
        ChunkDecoder {
            reader: CursorReader::with_scratch_size(chain, options.scratch_size()),
            options,
            observer: Box::new(NoopObserver),
            chunks: Vec::new(),
        }
    }

    pub fn from_block(block: ByteBlock, options: DecodeOptions) -> Self {
        ChunkDecoder::new(BlockChain::from(block), options)
    }

    /// Copies ``data`` into a single block.
    pub fn from_bytes(data: &[u8], options: DecodeOptions) -> Self {
        ChunkDecoder::from_block(ByteBlock::from(data), options)
    }

    pub fn with_observer<O: ParseObserver + 'static>(mut self, observer: O) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Absolute read position.
    pub fn offset(&self) -> usize {
        self.reader.offset()
    }

    pub fn remaining_bytes(&self) -> usize {
        self.reader.remaining_bytes()
    }

    pub fn chunks(&self) -> &[ChunkRecord] {
        &self.chunks
    }

    pub fn into_chunks(self) -> Vec<ChunkRecord> {
        self.chunks
    }

    /// The first decoded format chunk.
    pub fn format(&self) -> Option<&FmtChunk> {
        self.chunks.iter().find_map(|record| match &record.value {
            ChunkValue::Format(format) => Some(format),
            _ => None,
        })
    }

    /// Walks the whole input. Fails only if the container header is invalid or truncated.
    pub fn parse(&mut self) -> WavChunksResult<&[ChunkRecord]> {
        if self.chunks.is_empty() {
            self.decode_header()?;
        }
        while self.reader.remaining_bytes() > 0 {
            self.decode_chunk()?;
        }
        log!(log::Level::Debug, "parsed {} chunks", self.chunks.len());
        Ok(&self.chunks)
    }

    /// Reads and validates ``RIFF``/``RF64``/``BW64``, the size and ``WAVE``.
    pub fn decode_header(&mut self) -> WavChunksResult<&ChunkRecord> {
        let header = HeaderChunk::decode(&mut self.reader, &self.options)?;
        log!(log::Level::Debug, "header: {:?}", header);
        Ok(self.push(ChunkRecord {
            chunk_type: "header".to_string(),
            value: ChunkValue::Header(header),
            raw_chunk: None,
            unknown: false,
        }))
    }

    /// Reads the next chunk and appends its record.
    pub fn decode_chunk(&mut self) -> WavChunksResult<&ChunkRecord> {
        let offset = self.reader.offset();
        let remaining = self.reader.remaining_bytes();
        if remaining < CHUNK_HEADER_SIZE {
            return self.broken(offset);
        }

        let mut tag = [0u8; 4];
        for byte in tag.iter_mut() {
            *byte = self.reader.read_u8()?;
        }
        let name: String = tag.iter().map(|&b| char::from(b)).collect();
        let declared = self.reader.read_u32(true)?;

        let mut size = declared as usize;
        if self.options.round_odd_chunks() && size % 2 != 0 {
            size += 1;
            self.emit(ParseEvent::OddSizeRounded {
                tag: name.clone(),
                declared,
            });
        }
        let available = self.reader.remaining_bytes();
        if size > available {
            self.emit(ParseEvent::SizeClamped {
                tag: name.clone(),
                declared: declared as usize,
                available,
            });
            size = available;
        }

        self.reader.rewind(CHUNK_HEADER_SIZE)?;
        if size == 0 || tag.iter().all(|&b| b == 0) {
            return self.broken(offset);
        }

        self.emit(ParseEvent::ChunkFound {
            tag: name.clone(),
            offset,
            size,
        });
        let raw = self.reader.read_shared_block(CHUNK_HEADER_SIZE + size)?;
        let record = self.dispatch(tag, name, raw, offset);
        Ok(self.push(record))
    }

    fn dispatch(&mut self, tag: [u8; 4], name: String, raw: ByteBlock, offset: usize) -> ChunkRecord {
        let options = self.options;
        let decoded = match tag {
            FMT => Some(("format", decode_as(&raw, &options, ChunkValue::Format))),
            FACT => Some(("fact", decode_as(&raw, &options, ChunkValue::Fact))),
            INST => Some(("instrument", decode_as(&raw, &options, ChunkValue::Instrument))),
            DISP => Some(("display", decode_as(&raw, &options, ChunkValue::Display))),
            SMPL => Some(("sample", decode_as(&raw, &options, ChunkValue::Sample))),
            TLST => Some(("trigger_list", decode_as(&raw, &options, ChunkValue::TriggerList))),
            DATA => Some((
                "data",
                read_chunk::<DataChunk>(&raw, &options).map(|data| self.with_duration(data, offset)),
            )),
            LIST => Some(("list", decode_as(&raw, &options, ChunkValue::List))),
            RLND => Some(("roland", decode_as(&raw, &options, ChunkValue::Roland))),
            JUNK => Some(("junk", decode_as(&raw, &options, ChunkValue::Junk))),
            PAD => Some(("padding", decode_as(&raw, &options, ChunkValue::Padding))),
            PEAK => Some(("peak", decode_as(&raw, &options, ChunkValue::Peak))),
            ACID => Some(("acid", decode_as(&raw, &options, ChunkValue::Acid))),
            STRC => Some(("strc", decode_as(&raw, &options, ChunkValue::Strc))),
            CUE => Some(("cue_points", decode_as(&raw, &options, ChunkValue::CuePoints))),
            BEXT => Some((
                "broadcast_extension",
                decode_as(&raw, &options, ChunkValue::BroadcastExtension),
            )),
            RESU => Some(("logic_resu", decode_as(&raw, &options, ChunkValue::LogicResu))),
            DS64 => Some(("data_size_64", decode_as(&raw, &options, ChunkValue::DataSize64))),
            _ => None,
        };

        let (chunk_type, value, unknown) = match decoded {
            Some((chunk_type, Ok(value))) => (chunk_type.to_string(), value, false),
            Some((chunk_type, Err(err))) => {
                let reason = err.to_string();
                self.emit(ParseEvent::ChunkFailed {
                    tag: name,
                    reason: reason.clone(),
                });
                (chunk_type.to_string(), ChunkValue::Failed { reason }, false)
            }
            None if tag == CART => (name, ChunkValue::Unknown, true),
            None if MACOS_CHUNKS.contains(&tag) => (
                name,
                ChunkValue::Vendor {
                    description: MACOS_DESCRIPTION,
                },
                false,
            ),
            None if PROTOOLS_CHUNKS.contains(&tag) => (
                name,
                ChunkValue::Vendor {
                    description: PROTOOLS_DESCRIPTION,
                },
                false,
            ),
            None => {
                log!(
                    log::Level::Debug,
                    "Unsupported Chunk: '{}' with {} bytes",
                    name,
                    raw.len() - CHUNK_HEADER_SIZE
                );
                (name, ChunkValue::Unknown, true)
            }
        };

        ChunkRecord {
            chunk_type,
            value,
            raw_chunk: Some(raw),
            unknown,
        }
    }

    fn with_duration(&mut self, data: DataChunk, offset: usize) -> ChunkValue {
        let data = match self.format() {
            Some(format) => data.with_format(format),
            None => data,
        };
        if data.duration.is_none() {
            self.emit(ParseEvent::MissingFormat { offset });
        }
        ChunkValue::Data(data)
    }

    /// Swallows everything from ``offset`` on into one record.
    fn broken(&mut self, offset: usize) -> WavChunksResult<&ChunkRecord> {
        let remaining = self.reader.remaining_bytes();
        self.emit(ParseEvent::Broken { offset, remaining });
        let raw = self.reader.read_shared_block(remaining)?;
        Ok(self.push(ChunkRecord {
            chunk_type: BROKEN_TYPE.to_string(),
            value: ChunkValue::Broken,
            raw_chunk: Some(raw),
            unknown: true,
        }))
    }

    fn emit(&mut self, event: ParseEvent) {
        self.observer.on_event(&event);
    }

    fn push(&mut self, record: ChunkRecord) -> &ChunkRecord {
        self.chunks.push(record);
        &self.chunks[self.chunks.len() - 1]
    }
}

fn decode_as<T: Chunk>(
    raw: &ByteBlock,
    options: &DecodeOptions,
    wrap: fn(T) -> ChunkValue,
) -> WavChunksResult<ChunkValue> {
    read_chunk::<T>(raw, options).map(wrap)
}

impl Debug for ChunkDecoder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkDecoder")
            .field("offset", &self.reader.offset())
            .field("options", &self.options)
            .field("chunks", &self.chunks.len())
            .finish()
    }
}

impl Display for ChunkValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkValue::Header(chunk) => write!(f, "{}", chunk),
            ChunkValue::Format(chunk) => write!(f, "{}", chunk),
            ChunkValue::Fact(chunk) => write!(f, "{}", chunk),
            ChunkValue::Instrument(chunk) => write!(f, "{}", chunk),
            ChunkValue::Display(chunk) => write!(f, "{}", chunk),
            ChunkValue::Sample(chunk) => write!(f, "{}", chunk),
            ChunkValue::TriggerList(chunk) => write!(f, "{}", chunk),
            ChunkValue::Data(chunk) => write!(f, "{}", chunk),
            ChunkValue::List(chunk) => write!(f, "{}", chunk),
            ChunkValue::Roland(chunk) => write!(f, "{}", chunk),
            ChunkValue::Junk(chunk) | ChunkValue::Padding(chunk) => write!(f, "{}", chunk),
            ChunkValue::Peak(chunk) => write!(f, "{}", chunk),
            ChunkValue::Acid(chunk) => write!(f, "{}", chunk),
            ChunkValue::Strc(chunk) => write!(f, "{}", chunk),
            ChunkValue::CuePoints(chunk) => write!(f, "{}", chunk),
            ChunkValue::BroadcastExtension(chunk) => write!(f, "{}", chunk),
            ChunkValue::LogicResu(chunk) => write!(f, "{}", chunk),
            ChunkValue::DataSize64(chunk) => write!(f, "{}", chunk),
            ChunkValue::Vendor { description } => write!(f, "{}", description),
            ChunkValue::Unknown => write!(f, "[UNKNOWN]"),
            ChunkValue::Broken => write!(f, "[BROKEN]"),
            ChunkValue::Failed { reason } => write!(f, "[FAILED] {}", reason),
        }
    }
}

#[cfg(feature = "colored")]
impl Display for ChunkRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let kind = match self.unknown {
            true => self.chunk_type.red().bold(),
            false => self.chunk_type.green().bold(),
        };
        write!(
            f,
            "{} ({} bytes)\n{}",
            kind,
            self.raw_len().to_string().white(),
            self.value
        )
    }
}

#[cfg(not(feature = "colored"))]
impl Display for ChunkRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} bytes)\n{}",
            self.chunk_type,
            self.raw_len(),
            self.value
        )
    }
}

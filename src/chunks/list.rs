//! List Chunk - a chunk that contains a list of other chunks. Each chunk in the list is identified by a 4 byte ID, followed by a 4 byte size, and then the data.
//!
//! Two list types are understood: ``INFO`` (text metadata such as ``INAM`` or ``IART``) and
//! ``adtl`` (text attached to cue points). Sub-chunk bodies are padded to an even length and
//! the declared size never includes the pad byte.
use std::fmt::{Display, Formatter};

#[cfg(feature = "colored")]
use colored::Colorize;

use crate::{
    chunks::{read_chunk_header, read_text, Chunk, ADTL, INFO, LABL, LIST, LTXT, NOTE},
    log,
    options::DecodeOptions,
    reader::CursorReader,
    WavChunksResult,
};

/// Cue id, sample length, purpose and four u16 locale fields.
const LTXT_FIXED_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListChunk {
    pub size: u32,
    pub list_type: String,
    pub data: ListData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListData {
    Info(Vec<InfoEntry>),
    Adtl(Vec<AdtlEntry>),
    /// A list type without a decoder. The entries stay in the record's raw bytes.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoEntry {
    pub id: String,
    pub size: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdtlEntry {
    Label {
        cue_id: u32,
        text: String,
    },
    Note {
        cue_id: u32,
        text: String,
    },
    LabeledText {
        cue_id: u32,
        sample_length: u32,
        purpose: String,
        country: u16,
        language: u16,
        dialect: u16,
        code_page: u16,
        text: String,
    },
    /// An entry id without a decoder; its body is skipped.
    Other {
        id: String,
        size: u32,
    },
}

impl ListChunk {
    /// Looks up an INFO entry by id, e.g. ``"INAM"``.
    pub fn info(&self, id: &str) -> Option<&str> {
        match &self.data {
            ListData::Info(entries) => entries
                .iter()
                .find(|entry| entry.id == id)
                .map(|entry| entry.text.as_str()),
            _ => None,
        }
    }

    fn decode_info(reader: &mut CursorReader) -> WavChunksResult<Vec<InfoEntry>> {
        let mut entries = Vec::new();
        while reader.remaining_bytes() >= 8 {
            let (id, size) = read_chunk_header(reader)?;
            let text = read_text(reader, size as usize)?;
            skip_pad_byte(reader, size)?;
            log!(log::Level::Trace, "INFO {}: {}", id, text);
            entries.push(InfoEntry { id, size, text });
        }
        Ok(entries)
    }

    fn decode_adtl(reader: &mut CursorReader) -> WavChunksResult<Vec<AdtlEntry>> {
        let mut entries = Vec::new();
        while reader.remaining_bytes() >= 8 {
            let (id, size) = read_chunk_header(reader)?;
            // Each entry decodes from its own body so a short size cannot reach the next entry.
            let length = (size as usize).min(reader.remaining_bytes());
            let mut body = CursorReader::from_block(reader.read_shared_block(length)?);
            let text_len = |fixed: usize| length.saturating_sub(fixed);
            let entry = match id.as_bytes() {
                tag if (tag == LABL || tag == NOTE) && length >= 4 => {
                    let cue_id = body.read_u32(true)?;
                    let text = read_text(&mut body, text_len(4))?;
                    match tag == LABL {
                        true => AdtlEntry::Label { cue_id, text },
                        false => AdtlEntry::Note { cue_id, text },
                    }
                }
                tag if tag == LTXT && length >= LTXT_FIXED_SIZE => AdtlEntry::LabeledText {
                    cue_id: body.read_u32(true)?,
                    sample_length: body.read_u32(true)?,
                    purpose: body.read_tag()?,
                    country: body.read_u16(true)?,
                    language: body.read_u16(true)?,
                    dialect: body.read_u16(true)?,
                    code_page: body.read_u16(true)?,
                    text: read_text(&mut body, text_len(LTXT_FIXED_SIZE))?,
                },
                _ => {
                    log!(log::Level::Debug, "Unknown or short adtl ID: {} ({} bytes)", id, size);
                    AdtlEntry::Other { id, size }
                }
            };
            skip_pad_byte(reader, size)?;
            entries.push(entry);
        }
        Ok(entries)
    }
}

/// Skips the alignment byte after an odd sized sub-chunk. Writers sometimes drop it at the very end.
fn skip_pad_byte(reader: &mut CursorReader, size: u32) -> WavChunksResult<()> {
    if size % 2 != 0 && reader.remaining_bytes() > 0 {
        reader.advance(1)?;
    }
    Ok(())
}

impl Chunk for ListChunk {
    /// Returns the ID of the ListChunk - "LIST".
    fn id(&self) -> &[u8; 4] {
        &LIST
    }

    fn decode(reader: &mut CursorReader, _options: &DecodeOptions) -> WavChunksResult<Self> {
        let (_id, size) = read_chunk_header(reader)?;
        let list_type = reader.read_tag()?;
        let data = match list_type.as_bytes() {
            tag if tag == INFO => ListData::Info(ListChunk::decode_info(reader)?),
            tag if tag == ADTL => ListData::Adtl(ListChunk::decode_adtl(reader)?),
            _ => {
                log!(log::Level::Debug, "Unknown LIST Type: {}", list_type);
                ListData::Other
            }
        };
        log!(log::Level::Debug, "List Chunk Data: {:?}", data);
        Ok(ListChunk {
            size,
            list_type,
            data,
        })
    }
}

impl Display for AdtlEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AdtlEntry::Label { cue_id, text } => write!(f, "labl [{}]: {}", cue_id, text),
            AdtlEntry::Note { cue_id, text } => write!(f, "note [{}]: {}", cue_id, text),
            AdtlEntry::LabeledText {
                cue_id,
                sample_length,
                purpose,
                text,
                ..
            } => write!(
                f,
                "ltxt [{}]: {} samples, {}: {}",
                cue_id, sample_length, purpose, text
            ),
            AdtlEntry::Other { id, size } => write!(f, "{}: {} bytes", id, size),
        }
    }
}

#[cfg(feature = "colored")]
impl Display for ListChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({})",
            "ListChunk:".white().bold(),
            self.list_type.white().underline()
        )?;
        match &self.data {
            ListData::Info(entries) => {
                for entry in entries {
                    write!(f, "\n\t{}: ", entry.id.green().bold())?;
                    write!(f, "{}", entry.text.white())?;
                }
            }
            ListData::Adtl(entries) => {
                for entry in entries {
                    write!(f, "\n\t{}", entry.to_string().white())?;
                }
            }
            ListData::Other => write!(f, "\n\t{}", "[UNKNOWN]".red().bold().underline())?,
        }
        Ok(())
    }
}

#[cfg(not(feature = "colored"))]
impl Display for ListChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ListChunk: {}", self.list_type)?;
        match &self.data {
            ListData::Info(entries) => {
                for entry in entries {
                    write!(f, "\n\t{}: {}", entry.id, entry.text)?;
                }
            }
            ListData::Adtl(entries) => {
                for entry in entries {
                    write!(f, "\n\t{}", entry)?;
                }
            }
            ListData::Other => write!(f, "\n\t[UNKNOWN]")?,
        }
        Ok(())
    }
}

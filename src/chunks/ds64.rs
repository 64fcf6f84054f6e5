//! RF64/BW64 ``ds64`` chunk (EBU Tech 3306): 64-bit sizes for files past 4 GiB.
use std::fmt::{Display, Formatter};

use crate::{
    chunks::{read_chunk_header, Chunk, DS64},
    options::DecodeOptions,
    reader::CursorReader,
    WavChunksResult,
};

const TABLE_ENTRY_SIZE: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ds64Chunk {
    pub riff_size_low: u32,
    pub riff_size_high: u32,
    pub data_size_low: u32,
    pub data_size_high: u32,
    pub sample_count_low: u32,
    pub sample_count_high: u32,
    pub table_length: u32,
    pub table: Vec<Ds64Entry>,
}

/// 64-bit size of some other chunk whose 32-bit size field reads ``0xFFFFFFFF``.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ds64Entry {
    pub chunk_id: String,
    pub chunk_size_low: u32,
    pub chunk_size_high: u32,
}

fn join(high: u32, low: u32) -> u64 {
    (u64::from(high) << 32) | u64::from(low)
}

impl Ds64Chunk {
    pub fn riff_size(&self) -> u64 {
        join(self.riff_size_high, self.riff_size_low)
    }

    pub fn data_size(&self) -> u64 {
        join(self.data_size_high, self.data_size_low)
    }

    pub fn sample_count(&self) -> u64 {
        join(self.sample_count_high, self.sample_count_low)
    }
}

impl Ds64Entry {
    pub fn chunk_size(&self) -> u64 {
        join(self.chunk_size_high, self.chunk_size_low)
    }
}

impl Chunk for Ds64Chunk {
    fn id(&self) -> &[u8; 4] {
        &DS64
    }

    fn decode(reader: &mut CursorReader, _options: &DecodeOptions) -> WavChunksResult<Self> {
        read_chunk_header(reader)?;
        let riff_size_low = reader.read_u32(true)?;
        let riff_size_high = reader.read_u32(true)?;
        let data_size_low = reader.read_u32(true)?;
        let data_size_high = reader.read_u32(true)?;
        let sample_count_low = reader.read_u32(true)?;
        let sample_count_high = reader.read_u32(true)?;
        let table_length = reader.read_u32(true)?;

        // Some writers declare a table they never write.
        let mut table = Vec::new();
        while (table.len() as u64) < u64::from(table_length)
            && reader.remaining_bytes() >= TABLE_ENTRY_SIZE
        {
            table.push(Ds64Entry {
                chunk_id: reader.read_tag()?,
                chunk_size_low: reader.read_u32(true)?,
                chunk_size_high: reader.read_u32(true)?,
            });
        }

        Ok(Ds64Chunk {
            riff_size_low,
            riff_size_high,
            data_size_low,
            data_size_high,
            sample_count_low,
            sample_count_high,
            table_length,
            table,
        })
    }
}

impl Display for Ds64Chunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ds64Chunk: riff_size: {}, data_size: {}, sample_count: {}",
            self.riff_size(),
            self.data_size(),
            self.sample_count()
        )?;
        for entry in &self.table {
            write!(f, "\n\t{}: {}", entry.chunk_id, entry.chunk_size())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod ds64_tests {
    use super::*;
    use crate::{block::ByteBlock, chunks::read_chunk, test_fixtures::sub_chunk};

    fn body(table_length: u32, entries: &[(&[u8; 4], u32, u32)]) -> Vec<u8> {
        let mut bytes: Vec<u8> = [0x10u32, 1, 0x20, 1, 0x30, 0, table_length]
            .iter()
            .flat_map(|w| w.to_le_bytes())
            .collect();
        for (id, low, high) in entries {
            bytes.extend_from_slice(*id);
            bytes.extend_from_slice(&low.to_le_bytes());
            bytes.extend_from_slice(&high.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn joins_64_bit_sizes() {
        let block = ByteBlock::from(sub_chunk(b"ds64", &body(1, &[(b"axml", 5, 2)])));
        let chunk: Ds64Chunk = read_chunk(&block, &DecodeOptions::default()).unwrap();
        assert_eq!(chunk.riff_size(), 0x1_0000_0010);
        assert_eq!(chunk.data_size(), 0x1_0000_0020);
        assert_eq!(chunk.sample_count(), 0x30);
        assert_eq!(chunk.table.len(), 1);
        assert_eq!(chunk.table[0].chunk_id, "axml");
        assert_eq!(chunk.table[0].chunk_size(), 0x2_0000_0005);
    }

    #[test]
    fn table_stops_at_end_of_chunk() {
        let block = ByteBlock::from(sub_chunk(b"ds64", &body(3, &[(b"axml", 5, 0)])));
        let chunk: Ds64Chunk = read_chunk(&block, &DecodeOptions::default()).unwrap();
        assert_eq!(chunk.table_length, 3);
        assert_eq!(chunk.table.len(), 1);
    }
}

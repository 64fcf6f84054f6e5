use std::fmt::{Display, Formatter};

use crate::{
    chunks::{read_chunk_header, Chunk, STRC},
    options::DecodeOptions,
    reader::CursorReader,
    WavChunksResult,
};

/// The ``strc`` chunk: slice markers written by Acid style loop editors.
///
/// The header is seven words, the second of which counts the 32 byte slice records that follow,
/// plus one. Most fields have no published meaning and are kept under their position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrcChunk {
    pub unknown1: u32,
    pub number_of_slices: u32,
    pub unknown2: u32,
    pub unknown3: u32,
    pub unknown4: u32,
    pub unknown5: u32,
    pub unknown6: u32,
    pub slices: Vec<StrcSlice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrcSlice {
    pub header: u32,
    pub id1: u32,
    pub sample_position_upper: u32,
    pub sample_position_lower: u32,
    pub sample_position2_upper: u32,
    pub sample_position2_lower: u32,
    pub data3: u32,
    pub id2: u32,
}

impl Chunk for StrcChunk {
    fn id(&self) -> &[u8; 4] {
        &STRC
    }

    fn decode(reader: &mut CursorReader, _options: &DecodeOptions) -> WavChunksResult<Self> {
        read_chunk_header(reader)?;
        let unknown1 = reader.read_u32(true)?;
        let number_of_slices = reader.read_u32(true)?;
        let unknown2 = reader.read_u32(true)?;
        let unknown3 = reader.read_u32(true)?;
        let unknown4 = reader.read_u32(true)?;
        let unknown5 = reader.read_u32(true)?;
        let unknown6 = reader.read_u32(true)?;

        let mut slices = Vec::new();
        for _ in 0..number_of_slices.saturating_sub(1) {
            slices.push(StrcSlice {
                header: reader.read_u32(true)?,
                id1: reader.read_u32(true)?,
                sample_position_upper: reader.read_u32(true)?,
                sample_position_lower: reader.read_u32(true)?,
                sample_position2_upper: reader.read_u32(true)?,
                sample_position2_lower: reader.read_u32(true)?,
                data3: reader.read_u32(true)?,
                id2: reader.read_u32(true)?,
            });
        }

        Ok(StrcChunk {
            unknown1,
            number_of_slices,
            unknown2,
            unknown3,
            unknown4,
            unknown5,
            unknown6,
            slices,
        })
    }
}

impl Display for StrcChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "StrcChunk: {} slices", self.slices.len())
    }
}

#[cfg(test)]
mod strc_tests {
    use super::*;
    use crate::{block::ByteBlock, chunks::read_chunk, test_fixtures::sub_chunk};

    fn strc(number_of_slices: u32, slices: usize) -> ByteBlock {
        let mut words = vec![28u32, number_of_slices, 25, 10, 1, 0, 2];
        for i in 0..slices as u32 {
            words.extend_from_slice(&[2, 0xAB, 0, i * 100, 0, 0, 77, 0xCD]);
        }
        let body: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        ByteBlock::from(sub_chunk(b"strc", &body))
    }

    #[test]
    fn reads_one_fewer_slice_than_counted() {
        let chunk: StrcChunk = read_chunk(&strc(3, 2), &DecodeOptions::default()).unwrap();
        assert_eq!(chunk.unknown1, 28);
        assert_eq!(chunk.slices.len(), 2);
        assert_eq!(chunk.slices[1].sample_position_lower, 100);
        assert_eq!(chunk.slices[1].id2, 0xCD);
    }

    #[test]
    fn zero_slices_is_not_an_error() {
        let chunk: StrcChunk = read_chunk(&strc(0, 0), &DecodeOptions::default()).unwrap();
        assert!(chunk.slices.is_empty());
    }
}

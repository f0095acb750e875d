//! Offset table section (NOF0)
//!
//! The compact relocation table: every pointer slot the runtime must patch
//! after loading, delta-encoded by the codec in [`crate::relocation`].
//! Body is the stream byte count, four reserved bytes, then the stream.

use super::{SectionHeader, write_framed};
use crate::cursor::{ReadCursor, WriteCursor};
use crate::relocation::{decode_offsets, encode_offsets};
use crate::{Result, TAG_OFFSET_TABLE};

#[derive(Debug, Default, Clone)]
pub struct OffsetTableSection {
    pub header: SectionHeader,
    /// Root-relative pointer-slot positions, sorted ascending
    pub entries: Vec<u32>,
}

impl OffsetTableSection {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn read(cursor: &mut ReadCursor) -> Result<Self> {
        let header = SectionHeader::read(cursor)?;
        let stream_size = cursor.read::<u32>()?;
        cursor.skip(4);
        let stream = cursor.read_vec(stream_size as usize)?;
        let entries = decode_offsets(&stream)?;
        Ok(Self { header, entries })
    }

    pub(crate) fn write(&mut self, cursor: &mut WriteCursor) -> Result<()> {
        let stream = encode_offsets(&self.entries, 0);
        self.header = write_framed(cursor, TAG_OFFSET_TABLE, |cursor, _| {
            cursor.write::<u32>(stream.len() as u32);
            cursor.write_zeros(4);
            cursor.write_stream(&stream);
            Ok(())
        })?;
        Ok(())
    }
}

//! Info section
//!
//! The 32-byte record every container opens with. Declares how many
//! interior sections follow and where the root node sits; three of its
//! fields describe the offset table, which does not exist until the very
//! end of a write, so they are back-patched by [`InfoSection::patch`].
//!
//! ```text
//! +0x00: tag
//! +0x04: body size
//! +0x08: interior section count
//! +0x0C: root node offset (always 32)
//! +0x10: offset table pointer (root-relative, patched)
//! +0x14: offset table address (absolute, patched)
//! +0x18: offset table byte size (patched)
//! +0x1C: version word (1)
//! ```

use super::{SectionHeader, write_framed};
use crate::cursor::{ReadCursor, WriteCursor};
use crate::variant::FormatVariant;
use crate::{Result, ROOT_NODE_OFFSET};

#[derive(Debug, Clone)]
pub struct InfoSection {
    pub header: SectionHeader,
    pub section_count: u32,
    pub root_node_address: u32,
    pub offset_table_address: u32,
    pub offset_table_size: u32,
}

impl Default for InfoSection {
    fn default() -> Self {
        Self {
            header: SectionHeader::default(),
            section_count: 0,
            root_node_address: ROOT_NODE_OFFSET,
            offset_table_address: 0,
            offset_table_size: 0,
        }
    }
}

impl InfoSection {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn read(cursor: &mut ReadCursor) -> Result<Self> {
        let header = SectionHeader::read(cursor)?;
        let section_count = cursor.read::<u32>()?;
        let root_node_address = cursor.read_address()?;
        Ok(Self {
            header,
            section_count,
            root_node_address,
            offset_table_address: 0,
            offset_table_size: 0,
        })
    }

    pub(crate) fn write(&mut self, cursor: &mut WriteCursor, variant: FormatVariant) -> Result<()> {
        let section_count = self.section_count;
        self.root_node_address = ROOT_NODE_OFFSET;
        self.header = write_framed(cursor, variant.magic().info, |cursor, _| {
            cursor.write::<u32>(section_count);
            cursor.write::<u32>(ROOT_NODE_OFFSET);
            cursor.write_zeros(12);
            cursor.write::<u32>(1);
            Ok(())
        })?;
        Ok(())
    }

    /// Record where the offset table ended up. Runs after the table is
    /// written, patching by direct seeks; the slots sit before the root
    /// node, so they are plain stored offsets, never relocation entries.
    pub(crate) fn patch(&mut self, cursor: &mut WriteCursor, table_address: u32, table_size: u32) {
        self.offset_table_address = table_address;
        self.offset_table_size = table_size;

        let stored = table_address - cursor.root_node_address();
        cursor.write_u32_at(self.header.head + 16, stored);
        cursor.write_u32_at(self.header.head + 20, table_address);
        cursor.write_u32_at(self.header.head + 24, table_size);
    }
}

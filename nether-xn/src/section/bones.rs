//! Bone-name list section
//!
//! Maps bone names to node indices so animation data can address the
//! skeleton by name. The bone math itself lives with the object importer.

use super::{SectionHeader, write_framed};
use crate::cursor::{ReadCursor, WriteCursor};
use crate::variant::FormatVariant;
use crate::{Result, SECTION_PADDING};

#[derive(Debug, Default, Clone)]
pub struct BonesSection {
    pub header: SectionHeader,
    /// Node index per bone, parallel to `names`
    pub indices: Vec<u32>,
    pub names: Vec<String>,
}

impl BonesSection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_bone(&mut self, name: &str, index: u32) {
        self.names.push(name.to_string());
        self.indices.push(index);
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub(crate) fn read(cursor: &mut ReadCursor) -> Result<Self> {
        let header = SectionHeader::read(cursor)?;

        let table_address = cursor.read_address()?;
        cursor.seek(table_address + 4);
        let count = cursor.read::<u32>()?;
        let entries_address = cursor.read_address()?;

        let mut indices = Vec::with_capacity(count as usize);
        let mut names = Vec::with_capacity(count as usize);
        for i in 0..count {
            cursor.seek(entries_address + i * 8);
            indices.push(cursor.read::<u32>()?);
            let name_address = cursor.read_address()?;
            cursor.seek(name_address);
            names.push(cursor.read_null_terminated_string()?);
        }

        Ok(Self {
            header,
            indices,
            names,
        })
    }

    pub(crate) fn write(&mut self, cursor: &mut WriteCursor, variant: FormatVariant) -> Result<()> {
        let indices = self.indices.clone();
        let names = self.names.clone();

        self.header = write_framed(cursor, variant.magic().bones, |cursor, head| {
            cursor.fix_padding(SECTION_PADDING);

            let entry_table = cursor.position();
            cursor.write_zeros(names.len() * 8);

            let table = cursor.position();
            cursor.write_zeros(4);
            cursor.write::<u32>(names.len() as u32);
            cursor.write_address(entry_table);

            let mut name_addresses = Vec::with_capacity(names.len());
            for name in &names {
                name_addresses.push(cursor.position());
                cursor.write_null_terminated_string(name);
            }

            let bookmark = cursor.position();

            cursor.seek(head + 8);
            cursor.write_address(table);

            for (i, &address) in name_addresses.iter().enumerate() {
                cursor.seek(entry_table + i as u32 * 8);
                cursor.write::<u32>(indices[i]);
                cursor.write_address(address);
            }

            cursor.seek(bookmark);
            Ok(())
        })?;
        Ok(())
    }
}

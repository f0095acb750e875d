//! Texture list section
//!
//! Names and flags of the texture units the object section indexes into.
//! The body is one pointer to a `{count, table pointer}` pair; table
//! entries are 20 bytes (8 in the YNO layout) holding a name pointer and a
//! flags word, with the strings packed after the table.

use super::{SectionHeader, write_framed};
use crate::cursor::{ReadCursor, WriteCursor};
use crate::variant::FormatVariant;
use crate::{Result, SECTION_PADDING};

/// Flags every texture added by tooling gets; shipping files carry the
/// same value
const DEFAULT_TEXTURE_FLAGS: u32 = 0x010004;

#[derive(Debug, Default, Clone)]
pub struct TextureSection {
    pub header: SectionHeader,
    pub names: Vec<String>,
    pub flags: Vec<u32>,
}

impl TextureSection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a texture name, reusing the slot if it is already present.
    /// Returns the unit index.
    pub fn add_texture(&mut self, name: &str) -> u32 {
        if let Some(index) = self.names.iter().position(|n| n == name) {
            return index as u32;
        }
        self.names.push(name.to_string());
        self.flags.push(DEFAULT_TEXTURE_FLAGS);
        (self.names.len() - 1) as u32
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn entry_size(variant: FormatVariant) -> u32 {
        if variant == FormatVariant::Yno { 8 } else { 20 }
    }

    fn entry_offset(variant: FormatVariant) -> u32 {
        if variant == FormatVariant::Yno { 0 } else { 4 }
    }

    pub(crate) fn read(cursor: &mut ReadCursor, variant: FormatVariant) -> Result<Self> {
        let header = SectionHeader::read(cursor)?;

        let table_info_address = cursor.read_address()?;
        cursor.seek(table_info_address);
        let count = cursor.read::<u32>()?;
        let table_address = cursor.read_address()?;

        let table_end = if variant == FormatVariant::Yno {
            table_address + count * 8
        } else {
            table_address + count * 20 + 4
        };
        cursor.add_label("texture table", table_address, table_end);

        let mut names = Vec::with_capacity(count as usize);
        let mut flags = Vec::with_capacity(count as usize);
        for i in 0..count {
            cursor.seek(table_address + i * Self::entry_size(variant) + Self::entry_offset(variant));
            let name_address = cursor.read_address()?;
            let flag = cursor.read::<u32>()?;

            cursor.seek(name_address);
            let name = cursor.read_null_terminated_string()?;
            log::debug!("texture unit {i}: {name} (flags {flag:#x})");

            names.push(name);
            flags.push(flag);
        }

        Ok(Self { header, names, flags })
    }

    pub(crate) fn write(&mut self, cursor: &mut WriteCursor, variant: FormatVariant) -> Result<()> {
        let names = self.names.clone();
        let flags = self.flags.clone();
        let entry_size = Self::entry_size(variant);
        let entry_offset = Self::entry_offset(variant);

        self.header = write_framed(cursor, variant.magic().texture, |cursor, head| {
            cursor.fix_padding(SECTION_PADDING);

            // Entry table first, zeroed; the name pointers inside it are
            // forward references patched once the strings are placed
            let entry_table = cursor.position();
            cursor.write_zeros(names.len() * entry_size as usize);

            let table_info = cursor.position();
            cursor.write::<u32>(names.len() as u32);
            cursor.write_address(entry_table);

            let mut name_addresses = Vec::with_capacity(names.len());
            for name in &names {
                name_addresses.push(cursor.position());
                cursor.write_null_terminated_string(name);
            }

            let bookmark = cursor.position();

            cursor.seek(head + 8);
            cursor.write_address(table_info);

            for (i, &name_address) in name_addresses.iter().enumerate() {
                cursor.seek(entry_table + i as u32 * entry_size + entry_offset);
                cursor.write_address(name_address);
                cursor.write::<u32>(flags[i]);
            }

            cursor.seek(bookmark);
            Ok(())
        })?;
        Ok(())
    }
}

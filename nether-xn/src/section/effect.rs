//! Effect list section
//!
//! Shader names, material names with their shader indices, and a list of
//! u16 extras. Three zeroed tables go out first; string pointers are
//! patched in after the strings exist.

use super::{SectionHeader, write_framed};
use crate::cursor::{ReadCursor, WriteCursor};
use crate::variant::FormatVariant;
use crate::{Result, SECTION_PADDING};

const NO_SHADER: u32 = 0xFFFF_FFFF;

#[derive(Debug, Default, Clone)]
pub struct EffectSection {
    pub header: SectionHeader,
    pub shaders: Vec<String>,
    pub material_names: Vec<String>,
    /// Shader index per material name, parallel to `material_names`
    pub material_indices: Vec<u32>,
    pub extras: Vec<u16>,
}

impl EffectSection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a material name, reusing its slot if already present.
    /// Returns the material index.
    pub fn add_material(&mut self, name: &str, shader_index: u32) -> u32 {
        if let Some(index) = self.material_names.iter().position(|n| n == name) {
            return index as u32;
        }
        if shader_index != NO_SHADER {
            self.material_indices.push(shader_index);
        }
        self.material_names.push(name.to_string());
        (self.material_names.len() - 1) as u32
    }

    /// Register a shader name, reusing its slot if already present.
    /// Returns the shader index.
    pub fn add_shader(&mut self, name: &str) -> u32 {
        if let Some(index) = self.shaders.iter().position(|n| n == name) {
            return index as u32;
        }
        self.shaders.push(name.to_string());
        (self.shaders.len() - 1) as u32
    }

    pub(crate) fn read(cursor: &mut ReadCursor) -> Result<Self> {
        let header = SectionHeader::read(cursor)?;

        let table_address = cursor.read_address()?;
        cursor.seek(table_address + 4);
        let shader_count = cursor.read::<u32>()?;
        let shader_address = cursor.read_address()?;
        let name_count = cursor.read::<u32>()?;
        let name_address = cursor.read_address()?;
        let extras_count = cursor.read::<u32>()?;
        let extras_address = cursor.read_address()?;

        let mut shaders = Vec::with_capacity(shader_count as usize);
        for i in 0..shader_count {
            cursor.seek(shader_address + i * 8 + 4);
            let string_address = cursor.read_address()?;
            cursor.seek(string_address);
            shaders.push(cursor.read_null_terminated_string()?);
        }

        let mut material_names = Vec::with_capacity(name_count as usize);
        let mut material_indices = Vec::with_capacity(name_count as usize);
        for i in 0..name_count {
            cursor.seek(name_address + i * 12 + 4);
            material_indices.push(cursor.read::<u32>()?);
            let string_address = cursor.read_address()?;
            cursor.seek(string_address);
            material_names.push(cursor.read_null_terminated_string()?);
        }

        let mut extras = Vec::with_capacity(extras_count as usize);
        for i in 0..extras_count {
            cursor.seek(extras_address + i * 2);
            extras.push(cursor.read::<u16>()?);
        }

        Ok(Self {
            header,
            shaders,
            material_names,
            material_indices,
            extras,
        })
    }

    pub(crate) fn write(&mut self, cursor: &mut WriteCursor, variant: FormatVariant) -> Result<()> {
        let shaders = self.shaders.clone();
        let material_names = self.material_names.clone();
        let material_indices = self.material_indices.clone();
        let extras = self.extras.clone();

        self.header = write_framed(cursor, variant.magic().effect, |cursor, head| {
            cursor.fix_padding(SECTION_PADDING);

            let shader_table = cursor.position();
            cursor.write_zeros(shaders.len() * 8);
            let name_table = cursor.position();
            cursor.write_zeros(material_names.len() * 12);
            let extras_table = cursor.position();
            cursor.write_zeros(extras.len() * 2);
            cursor.fix_padding(4);

            let table = cursor.position();
            cursor.write_zeros(4);
            cursor.write::<u32>(shaders.len() as u32);
            cursor.write_address(shader_table);
            cursor.write::<u32>(material_names.len() as u32);
            cursor.write_address(name_table);
            cursor.write::<u32>(extras.len() as u32);
            cursor.write_address(extras_table);

            let mut shader_addresses = Vec::with_capacity(shaders.len());
            for shader in &shaders {
                shader_addresses.push(cursor.position());
                cursor.write_null_terminated_string(shader);
            }

            let mut name_addresses = Vec::with_capacity(material_names.len());
            for name in &material_names {
                name_addresses.push(cursor.position());
                cursor.write_null_terminated_string(name);
            }

            let bookmark = cursor.position();

            cursor.seek(head + 8);
            cursor.write_address(table);

            for (i, &address) in shader_addresses.iter().enumerate() {
                cursor.seek(shader_table + i as u32 * 8 + 4);
                cursor.write_address(address);
            }

            for (i, &address) in name_addresses.iter().enumerate() {
                cursor.seek(name_table + i as u32 * 12 + 4);
                cursor.write::<u32>(material_indices[i]);
                cursor.write_address(address);
            }

            for (i, &extra) in extras.iter().enumerate() {
                cursor.seek(extras_table + i as u32 * 2);
                cursor.write::<u16>(extra);
            }

            cursor.seek(bookmark);
            Ok(())
        })?;
        Ok(())
    }
}

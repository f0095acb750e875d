//! Container reading, writing and section bookkeeping
//!
//! A container is an ordered run of sections: info first (it declares the
//! interior count and the root node address), then the interior sections
//! in file order, then the offset table, footer and end marker. Reading
//! follows that order strictly; any unexpected tag is a format error.
//!
//! Writing replays the same order and finishes with the one patch the
//! format forces: the info section describes the offset table, but the
//! offset table can only be written after every pointer slot has been
//! registered, so its address and size are seeked back in last.


use std::path::Path;

use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::XnError;
use crate::section::{
    BonesSection, EffectSection, EndSection, FooterSection, InfoSection, OffsetTableSection,
    RawSection, Section, TextureSection,
};
use crate::trace::TraceTree;
use crate::variant::FormatVariant;
use crate::{Result, ROOT_NODE_OFFSET, TAG_END, TAG_FOOTER, TAG_OFFSET_TABLE};

/// Cross-check of the decoded offset table against the addresses actually
/// read, for auditing layouts that are not fully understood yet
#[derive(Debug, Default)]
pub struct OffsetTableAudit {
    /// Table entries no reader ever touched
    pub unread_entries: Vec<u32>,
    /// Addresses read at positions the table does not list, with the call
    /// sites that read them
    pub untabled_reads: Vec<(u32, String)>,
}

/// One parsed container: the mandatory sections by name, the interior
/// sections in file order, and (after a read) the source cursor retained
/// for the audit views
pub struct XnContainer {
    variant: FormatVariant,
    pub info: InfoSection,
    pub offset_table: OffsetTableSection,
    pub footer: FooterSection,
    pub end: EndSection,
    sections: Vec<Section>,
    cursor: Option<ReadCursor>,
}

impl XnContainer {
    /// Empty container of the given variant with its mandatory sections
    pub fn new(variant: FormatVariant) -> Self {
        Self {
            variant,
            info: InfoSection::new(),
            offset_table: OffsetTableSection::new(),
            footer: FooterSection::default(),
            end: EndSection::default(),
            sections: Vec::new(),
            cursor: None,
        }
    }

    /// Open a container, detecting the variant from the file name
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, None)
    }

    /// Open a container with an explicit variant override
    pub fn open_with(path: impl AsRef<Path>, variant: Option<FormatVariant>) -> Result<Self> {
        let path = path.as_ref();
        let name = path.to_string_lossy();
        let variant = variant
            .or_else(|| FormatVariant::from_path(&name))
            .ok_or_else(|| XnError::UnknownExtension(name.into_owned()))?;
        let cursor = ReadCursor::open(path, variant.endianness())?;
        Self::read_from(cursor, variant)
    }

    pub fn from_bytes(bytes: Vec<u8>, variant: FormatVariant) -> Result<Self> {
        Self::read_from(ReadCursor::from_bytes(bytes, variant.endianness()), variant)
    }

    pub fn variant(&self) -> FormatVariant {
        self.variant
    }

    /// Retarget every held section to another variant's tags. Section
    /// bodies are not converted; this mirrors how the tooling has always
    /// moved assets between consoles, one concern at a time.
    pub fn set_variant(&mut self, variant: FormatVariant) {
        self.variant = variant;
    }

    // =========================================================================
    // Reading
    // =========================================================================

    fn read_from(mut cursor: ReadCursor, variant: FormatVariant) -> Result<Self> {
        let magic = variant.magic();

        expect_tag(&mut cursor, magic.info)?;
        let info = InfoSection::read(&mut cursor)?;
        cursor.set_root_node_address(info.root_node_address)?;
        info.header.goto_end(&mut cursor);

        let mut sections = Vec::with_capacity(info.section_count as usize);
        for _ in 0..info.section_count {
            let tag = cursor.read_tag()?;
            let section = if tag == magic.texture {
                Section::Texture(TextureSection::read(&mut cursor, variant)?)
            } else if tag == magic.effect {
                Section::Effect(EffectSection::read(&mut cursor)?)
            } else if tag == magic.bones {
                Section::Bones(BonesSection::read(&mut cursor)?)
            } else if tag == magic.object {
                Section::Object(RawSection::read(&mut cursor)?)
            } else if tag == magic.motion {
                Section::Motion(RawSection::read(&mut cursor)?)
            } else {
                return Err(unknown_tag(tag, cursor.position() - 4));
            };
            section.header().goto_end(&mut cursor);
            sections.push(section);
        }

        expect_tag(&mut cursor, TAG_OFFSET_TABLE)?;
        let offset_table = OffsetTableSection::read(&mut cursor)?;
        offset_table.header.goto_end(&mut cursor);

        expect_tag(&mut cursor, TAG_FOOTER)?;
        let footer = FooterSection::read(&mut cursor)?;
        footer.header.goto_end(&mut cursor);

        expect_tag(&mut cursor, TAG_END)?;
        let end = EndSection::read(&mut cursor)?;
        end.header.goto_end(&mut cursor);

        // Opaque sections keep their share of the relocation entries so a
        // rewrite can re-register them
        let root = cursor.root_node_address();
        for section in &mut sections {
            if let Section::Object(raw) | Section::Motion(raw) = section {
                raw.adopt_pointer_slots(&offset_table.entries, root);
            }
        }

        Ok(Self {
            variant,
            info,
            offset_table,
            footer,
            end,
            sections,
            cursor: Some(cursor),
        })
    }

    // =========================================================================
    // Writing
    // =========================================================================

    /// Serialize the container into a fresh byte buffer
    pub fn write_to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut cursor = WriteCursor::new(self.variant.endianness());
        self.write(&mut cursor)?;
        Ok(cursor.into_bytes())
    }

    /// Serialize and save. The active variant decides the byte order; call
    /// [`XnContainer::set_variant`] first to convert.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let mut cursor = WriteCursor::new(self.variant.endianness());
        self.write(&mut cursor)?;
        cursor.save(path)
    }

    fn write(&mut self, cursor: &mut WriteCursor) -> Result<()> {
        cursor.set_root_node_address(ROOT_NODE_OFFSET)?;

        self.info.section_count = self.sections.len() as u32;
        self.info.write(cursor, self.variant)?;

        for section in &mut self.sections {
            section.write(cursor, self.variant)?;
        }

        self.offset_table.entries = cursor.take_relocations();
        self.offset_table.write(cursor)?;
        self.info.patch(
            cursor,
            self.offset_table.header.head,
            self.offset_table.header.size + 8,
        );

        self.footer.write(cursor)?;
        self.end.write(cursor)?;
        Ok(())
    }

    // =========================================================================
    // Section access
    // =========================================================================

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section_by_tag(&self, tag: [u8; 4]) -> Option<&Section> {
        self.sections.iter().find(|s| s.tag(self.variant) == tag)
    }

    pub fn texture(&self) -> Option<&TextureSection> {
        self.sections.iter().find_map(|s| match s {
            Section::Texture(section) => Some(section),
            _ => None,
        })
    }

    pub fn effect(&self) -> Option<&EffectSection> {
        self.sections.iter().find_map(|s| match s {
            Section::Effect(section) => Some(section),
            _ => None,
        })
    }

    pub fn bones(&self) -> Option<&BonesSection> {
        self.sections.iter().find_map(|s| match s {
            Section::Bones(section) => Some(section),
            _ => None,
        })
    }

    pub fn object(&self) -> Option<&RawSection> {
        self.sections.iter().find_map(|s| match s {
            Section::Object(section) => Some(section),
            _ => None,
        })
    }

    pub fn motion(&self) -> Option<&RawSection> {
        self.sections.iter().find_map(|s| match s {
            Section::Motion(section) => Some(section),
            _ => None,
        })
    }

    /// Replace the texture section, or append one
    pub fn set_texture(&mut self, texture: TextureSection) {
        self.replace_or(Section::Texture(texture), Placement::Append);
    }

    /// Replace the effect section, or insert one just before the object
    /// section so the object's material indices stay resolvable
    pub fn set_effect(&mut self, effect: EffectSection) {
        self.replace_or(Section::Effect(effect), Placement::BeforeObject);
    }

    /// Replace the bone-name section, or insert one just before the object
    pub fn set_bones(&mut self, bones: BonesSection) {
        self.replace_or(Section::Bones(bones), Placement::BeforeObject);
    }

    /// Replace the motion section, or append one
    pub fn set_motion(&mut self, motion: RawSection) {
        self.replace_or(Section::Motion(motion), Placement::Append);
    }

    fn replace_or(&mut self, section: Section, placement: Placement) {
        let kind = std::mem::discriminant(&section);
        if let Some(existing) = self
            .sections
            .iter_mut()
            .find(|s| std::mem::discriminant(*s) == kind)
        {
            *existing = section;
            return;
        }

        let before_object = self
            .sections
            .iter()
            .position(|s| matches!(s, Section::Object(_)));
        match (placement, before_object) {
            (Placement::BeforeObject, Some(index)) => self.sections.insert(index, section),
            _ => self.sections.push(section),
        }
    }

    // =========================================================================
    // Audit views
    // =========================================================================

    /// The bytes this container was read from
    pub fn raw_bytes(&self) -> Option<&[u8]> {
        self.cursor.as_ref().map(|c| c.data())
    }

    pub fn read_coverage(&self) -> Option<&[bool]> {
        self.cursor.as_ref().map(|c| c.coverage())
    }

    /// Byte ranges no reader touched
    pub fn unread_ranges(&self) -> Vec<(u32, u32)> {
        self.cursor
            .as_ref()
            .map(|c| c.unread_ranges())
            .unwrap_or_default()
    }

    /// Containment tree of everything read, labeled by reader
    pub fn build_trace(&self) -> Option<TraceTree> {
        self.cursor.as_ref().map(|c| c.build_trace(&self.footer.name))
    }

    /// Cross-reference the offset table against the addresses actually read
    pub fn offset_table_audit(&self) -> OffsetTableAudit {
        let Some(cursor) = &self.cursor else {
            return OffsetTableAudit::default();
        };
        let reads = cursor.address_reads();

        let unread_entries = self
            .offset_table
            .entries
            .iter()
            .copied()
            .filter(|entry| !reads.contains_key(entry))
            .collect();

        let untabled_reads = reads
            .iter()
            .filter(|(position, _)| !self.offset_table.entries.contains(position))
            .map(|(position, site)| (*position, site.clone()))
            .collect();

        OffsetTableAudit {
            unread_entries,
            untabled_reads,
        }
    }
}

#[derive(Clone, Copy)]
enum Placement {
    Append,
    BeforeObject,
}

fn expect_tag(cursor: &mut ReadCursor, expected: [u8; 4]) -> Result<()> {
    let tag = cursor.read_tag()?;
    if tag != expected {
        return Err(unknown_tag(tag, cursor.position() - 4));
    }
    Ok(())
}

fn unknown_tag(tag: [u8; 4], offset: u32) -> XnError {
    XnError::UnknownSectionTag {
        tag: String::from_utf8_lossy(&tag).into_owned(),
        offset,
    }
}

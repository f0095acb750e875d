//! Tagged, length-prefixed sections
//!
//! Every record in a container is framed the same way: a 4-byte ASCII tag,
//! a u32 body size counted from just after the size field, the body, then
//! zero padding to a 16-byte boundary. Body sizes are unknown until the
//! body exists, so writing is two-pass: a placeholder size goes out first
//! and is patched by a direct seek once the body and padding are down.

mod bones;
mod effect;
mod footer;
mod info;
mod offset_table;
mod raw;
mod texture;
#[cfg(test)]
mod tests;

pub use bones::BonesSection;
pub use effect::EffectSection;
pub use footer::FooterSection;
pub use info::InfoSection;
pub use offset_table::OffsetTableSection;
pub use raw::RawSection;
pub use texture::TextureSection;

use crate::cursor::{ReadCursor, WriteCursor};
use crate::variant::FormatVariant;
use crate::{Result, SECTION_HEADER_SIZE, SECTION_PADDING, TAG_END};

/// Section identity and extent
///
/// `head` is where the reader or writer anchored the section: the tag
/// position when writing, the size-field position (just past the tag) when
/// reading. `size` likewise holds the stored value plus 4 after a read, so
/// that `head + size` is always the next section's tag in both modes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeader {
    pub head: u32,
    pub size: u32,
}

impl SectionHeader {
    /// Read the size field (the tag has already been consumed by dispatch)
    pub(crate) fn read(cursor: &mut ReadCursor) -> Result<Self> {
        let head = cursor.position();
        let size = cursor.read::<u32>()? + 4;
        Ok(Self { head, size })
    }

    pub fn end(&self) -> u32 {
        self.head + self.size
    }

    /// Skip whatever the body reader left unread; reserved fields are
    /// normal, not errors
    pub(crate) fn goto_end(&self, cursor: &mut ReadCursor) {
        cursor.seek(self.end());
    }
}

/// Frame a section body: tag, size placeholder, body, padding, then seek
/// back and patch the real size. The body writer receives the head (tag)
/// address so it can patch its own forward references.
pub(crate) fn write_framed(
    cursor: &mut WriteCursor,
    tag: [u8; 4],
    body: impl FnOnce(&mut WriteCursor, u32) -> Result<()>,
) -> Result<SectionHeader> {
    let head = cursor.position();
    cursor.write_stream(&tag);
    cursor.write_zeros(4);

    body(cursor, head)?;

    cursor.fix_padding(SECTION_PADDING);
    let size = cursor.position() - head - SECTION_HEADER_SIZE;
    cursor.write_u32_at(head + 4, size);

    Ok(SectionHeader { head, size })
}

/// The empty end marker closing every container
#[derive(Debug, Default, Clone)]
pub struct EndSection {
    pub header: SectionHeader,
}

impl EndSection {
    pub(crate) fn read(cursor: &mut ReadCursor) -> Result<Self> {
        Ok(Self {
            header: SectionHeader::read(cursor)?,
        })
    }

    pub(crate) fn write(&mut self, cursor: &mut WriteCursor) -> Result<()> {
        self.header = write_framed(cursor, TAG_END, |_, _| Ok(()))?;
        Ok(())
    }
}

/// An interior section, dispatched by tag against the active variant
///
/// Texture, effect and bone-name lists are decoded; object and motion
/// bodies belong to the mesh/animation importers and pass through opaque.
#[derive(Debug, Clone)]
pub enum Section {
    Texture(TextureSection),
    Effect(EffectSection),
    Bones(BonesSection),
    Object(RawSection),
    Motion(RawSection),
}

impl Section {
    pub fn tag(&self, variant: FormatVariant) -> [u8; 4] {
        let magic = variant.magic();
        match self {
            Self::Texture(_) => magic.texture,
            Self::Effect(_) => magic.effect,
            Self::Bones(_) => magic.bones,
            Self::Object(_) => magic.object,
            Self::Motion(_) => magic.motion,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Texture(_) => "texture",
            Self::Effect(_) => "effect",
            Self::Bones(_) => "bones",
            Self::Object(_) => "object",
            Self::Motion(_) => "motion",
        }
    }

    pub fn header(&self) -> SectionHeader {
        match self {
            Self::Texture(section) => section.header,
            Self::Effect(section) => section.header,
            Self::Bones(section) => section.header,
            Self::Object(section) => section.header,
            Self::Motion(section) => section.header,
        }
    }

    pub(crate) fn write(&mut self, cursor: &mut WriteCursor, variant: FormatVariant) -> Result<()> {
        let tag = self.tag(variant);
        match self {
            Self::Texture(section) => section.write(cursor, variant),
            Self::Effect(section) => section.write(cursor, variant),
            Self::Bones(section) => section.write(cursor, variant),
            Self::Object(section) | Self::Motion(section) => section.write(cursor, tag),
        }
    }
}

//! Nether-XN: XN container format codec for Nethercore tooling
//!
//! This crate reads and writes the XN family of binary containers used to
//! ship 3D scene assets (geometry, materials, bone names, animation,
//! texture lists) on a generation of console titles. Six variants exist,
//! differing in endianness and magic tags; all share the same skeleton:
//! a 32-byte info header, a run of tagged length-prefixed sections, a
//! compact relocation table, a footer with a display name, and an end
//! marker.
//!
//! # Key Features
//!
//! - **All six variants**: XNO/ZNO/INO (little-endian), GNO/ENO/YNO
//!   (big-endian), selected from the file extension or an explicit override
//! - **Relative addressing**: every stored pointer is decoded against the
//!   container's root node address; writes collect the pointer slots that
//!   the runtime must relocate at load time
//! - **Compact relocation table**: variable-width delta codec (1/2/4-byte
//!   runs) for the NOF0 section
//! - **Two-pass writing**: section sizes and the info header's
//!   offset-table fields are back-patched after their contents exist
//! - **Audit tooling**: read-coverage bitmap, byte-range tracing tree and
//!   an offset-table cross-check for reverse-engineering unknown layouts
//!
//! # Container Layout
//!
//! ```text
//! 0x00: info section (NXIF/NZIF/NIIF/NGIF/NEIF/NYIF), root node at 0x20
//! 0x20: N interior sections (texture/effect/bones/object/motion)
//! var:  offset table (NOF0) - compact relocation stream
//! var:  footer (NFN0) - display name
//! var:  end marker (NEND)
//! ```
//!
//! Every section is framed as a 4-byte ASCII tag, a u32 body size counted
//! from just after the size field, the body, and zero padding to a 16-byte
//! boundary.
//!
//! # Usage
//!
//! ```ignore
//! use nether_xn::XnContainer;
//!
//! let container = XnContainer::open("sonic_Root.xno")?;
//!
//! println!("Name: {}", container.footer.name);
//! println!("Sections: {}", container.sections().len());
//! if let Some(texture) = container.texture() {
//!     for name in &texture.names {
//!         println!("  Texture: {}", name);
//!     }
//! }
//!
//! container.save("sonic_Root_out.xno")?;
//! ```

mod container;
mod cursor;
mod endian;
mod error;
mod relocation;
mod resolver;
mod section;
mod trace;
mod value;
mod variant;

pub use container::{OffsetTableAudit, XnContainer};
pub use cursor::{CursorDiagnostics, ReadCursor, WriteCursor};
pub use endian::Endianness;
pub use error::XnError;
pub use relocation::{decode_offsets, encode_offsets};
pub use resolver::AddressResolver;
pub use section::{
    BonesSection, EffectSection, EndSection, FooterSection, InfoSection, OffsetTableSection,
    RawSection, Section, SectionHeader, TextureSection,
};
pub use trace::{TraceNode, TraceTree};
pub use value::CursorValue;
pub use variant::{FormatVariant, VariantMagic};

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, XnError>;

// =============================================================================
// Constants
// =============================================================================

/// Offset table magic "NOF0" (shared by all variants)
pub const TAG_OFFSET_TABLE: [u8; 4] = *b"NOF0";

/// Footer magic "NFN0" (shared by all variants)
pub const TAG_FOOTER: [u8; 4] = *b"NFN0";

/// End marker magic "NEND" (shared by all variants)
pub const TAG_END: [u8; 4] = *b"NEND";

/// Bytes occupied by a section head (4-byte tag + 4-byte size)
pub const SECTION_HEADER_SIZE: u32 = 8;

/// Sections are zero-padded to this alignment
pub const SECTION_PADDING: u32 = 16;

/// Root node address every known container uses (end of the info section)
pub const ROOT_NODE_OFFSET: u32 = 32;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(TAG_OFFSET_TABLE.len(), 4);
        assert_eq!(TAG_FOOTER.len(), 4);
        assert_eq!(TAG_END.len(), 4);
        assert_eq!(SECTION_HEADER_SIZE, 8);
        assert_eq!(ROOT_NODE_OFFSET % SECTION_PADDING, 0);
    }
}

//! Opaque interior sections
//!
//! Object and motion bodies are decoded by the mesh and animation
//! importers, not here; the container carries them through as raw bytes.
//! What the codec does own is their relocation entries: the pointer-slot
//! positions falling inside the body are captured from the decoded offset
//! table on read and re-registered on write, so a round trip preserves the
//! table without understanding the payload.

use super::{SectionHeader, write_framed};
use crate::cursor::{ReadCursor, WriteCursor};
use crate::Result;

#[derive(Debug, Default, Clone)]
pub struct RawSection {
    pub header: SectionHeader,
    payload: Vec<u8>,
    /// Pointer-slot positions relative to the section's tag
    pointer_slots: Vec<u32>,
}

impl RawSection {
    pub fn from_payload(payload: Vec<u8>) -> Self {
        Self {
            header: SectionHeader::default(),
            payload,
            pointer_slots: Vec::new(),
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub(crate) fn read(cursor: &mut ReadCursor) -> Result<Self> {
        let header = SectionHeader::read(cursor)?;
        let payload = cursor.read_vec((header.size - 4) as usize)?;
        Ok(Self {
            header,
            payload,
            pointer_slots: Vec::new(),
        })
    }

    /// Claim the offset-table entries that land inside this section's body
    pub(crate) fn adopt_pointer_slots(&mut self, entries: &[u32], root: u32) {
        let tag_address = self.header.head - 4;
        let body_start = self.header.head + 4;
        let body_end = body_start + self.payload.len() as u32;

        self.pointer_slots = entries
            .iter()
            .map(|&relative| relative.wrapping_add(root))
            .filter(|&absolute| absolute >= body_start && absolute < body_end)
            .map(|absolute| absolute - tag_address)
            .collect();
    }

    pub(crate) fn write(&mut self, cursor: &mut WriteCursor, tag: [u8; 4]) -> Result<()> {
        let payload = std::mem::take(&mut self.payload);
        let slots = self.pointer_slots.clone();
        let endianness = cursor.endianness();

        let header = write_framed(cursor, tag, |cursor, head| {
            cursor.write_stream(&payload);
            for &slot in &slots {
                cursor.note_pointer_slot(head + slot, endianness);
            }
            Ok(())
        })?;

        self.payload = payload;
        self.header = header;
        Ok(())
    }
}

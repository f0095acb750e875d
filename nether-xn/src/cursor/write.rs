//! Write-mode cursor

use std::path::Path;

use glam::Vec4;
use half::f16;

use crate::endian::Endianness;
use crate::error::XnError;
use crate::resolver::AddressResolver;
use crate::value::CursorValue;
use crate::Result;

const COLOR_SCALE: f32 = 255.0;

/// Growable, seekable output buffer with typed endian-aware writes
///
/// Stays in memory until [`WriteCursor::save`] so that section sizes and
/// forward references can be back-patched by direct seeks.
pub struct WriteCursor {
    data: Vec<u8>,
    position: usize,
    endianness: Endianness,
    resolver: AddressResolver,
}

impl WriteCursor {
    pub fn new(endianness: Endianness) -> Self {
        Self {
            data: Vec::new(),
            position: 0,
            endianness,
            resolver: AddressResolver::new(),
        }
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    // =========================================================================
    // Typed writes
    // =========================================================================

    pub fn write<T: CursorValue>(&mut self, value: T) {
        let endianness = self.endianness;
        value.write_to(self, endianness);
    }

    pub fn write_with<T: CursorValue>(&mut self, value: T, endianness: Endianness) {
        value.write_to(self, endianness);
    }

    /// f32 narrowed to a half float
    pub fn write_f16(&mut self, value: f32) {
        let endianness = self.endianness;
        self.write_f16_with(value, endianness);
    }

    pub fn write_f16_with(&mut self, value: f32, endianness: Endianness) {
        self.write_with::<u16>(f16::from_f32(value).to_bits(), endianness);
    }

    pub fn write_rgba8(&mut self, value: Vec4) {
        self.write::<u8>((value.x * COLOR_SCALE) as u8);
        self.write::<u8>((value.y * COLOR_SCALE) as u8);
        self.write::<u8>((value.z * COLOR_SCALE) as u8);
        self.write::<u8>((value.w * COLOR_SCALE) as u8);
    }

    pub fn write_abgr8(&mut self, value: Vec4) {
        self.write::<u8>((value.w * COLOR_SCALE) as u8);
        self.write::<u8>((value.z * COLOR_SCALE) as u8);
        self.write::<u8>((value.y * COLOR_SCALE) as u8);
        self.write::<u8>((value.x * COLOR_SCALE) as u8);
    }

    pub fn write_argb8(&mut self, value: Vec4) {
        self.write::<u8>((value.w * COLOR_SCALE) as u8);
        self.write::<u8>((value.x * COLOR_SCALE) as u8);
        self.write::<u8>((value.y * COLOR_SCALE) as u8);
        self.write::<u8>((value.z * COLOR_SCALE) as u8);
    }

    // =========================================================================
    // Strings and raw blocks
    // =========================================================================

    /// Always emits exactly one trailing zero byte, whatever the variant's
    /// endianness
    pub fn write_null_terminated_string(&mut self, text: &str) {
        self.emit(text.as_bytes());
        self.emit(&[0]);
    }

    pub fn write_stream(&mut self, bytes: &[u8]) {
        self.emit(bytes);
    }

    pub fn write_zeros(&mut self, count: usize) {
        for _ in 0..count {
            self.emit(&[0]);
        }
    }

    // =========================================================================
    // Addressing
    // =========================================================================

    /// Store `virtual_address` relative to the root node. Only the
    /// big-endian path records the slot for the relocation table; the
    /// little-endian path is used by in-engine-resident formats that are
    /// never relocated.
    pub fn write_address(&mut self, virtual_address: u32) {
        let endianness = self.endianness;
        self.write_address_with(virtual_address, endianness);
    }

    pub fn write_address_with(&mut self, virtual_address: u32, endianness: Endianness) {
        self.note_pointer_slot(self.position as u32, endianness);
        let stored = self.resolver.unresolve(virtual_address);
        self.write_with::<u32>(stored, endianness);
    }

    /// Register a pointer-slot position without writing anything, through
    /// the same big-endian-only gate as [`WriteCursor::write_address`]
    pub fn note_pointer_slot(&mut self, position: u32, endianness: Endianness) {
        if endianness != Endianness::Big {
            return;
        }
        match position.checked_sub(self.resolver.root()) {
            Some(relative) => self.resolver.record(relative),
            None => log::warn!("pointer slot at {position:#x} precedes the root node"),
        }
    }

    /// Set the root node address. Allowed exactly once per write pass.
    pub fn set_root_node_address(&mut self, address: u32) -> Result<()> {
        self.resolver.set_root(address)
    }

    pub fn root_node_address(&self) -> u32 {
        self.resolver.root()
    }

    pub fn pending_relocations(&self) -> &[u32] {
        self.resolver.pending()
    }

    /// Drain the pending pointer slots, sorted and deduplicated
    pub fn take_relocations(&mut self) -> Vec<u32> {
        self.resolver.take_sorted()
    }

    // =========================================================================
    // Positioning and patching
    // =========================================================================

    pub fn seek(&mut self, address: u32) {
        self.position = address as usize;
    }

    pub fn skip(&mut self, delta: i64) {
        self.position = self.position.saturating_add_signed(delta as isize);
    }

    pub fn goto_end(&mut self) {
        self.position = self.data.len();
    }

    pub fn position(&self) -> u32 {
        self.position as u32
    }

    pub fn len(&self) -> u32 {
        self.data.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Zero-fill to the next multiple of `multiple`; returns the bytes
    /// emitted
    pub fn fix_padding(&mut self, multiple: u32) -> u32 {
        let address = self.position as u32;
        let padding = multiple - (address % multiple);
        if padding == multiple {
            return 0;
        }
        self.write_zeros(padding as usize);
        padding
    }

    /// Patch a u32 at `address` and restore the previous position. Debug
    /// builds verify the patch by reading it back.
    pub fn write_u32_at(&mut self, address: u32, value: u32) {
        let endianness = self.endianness;
        self.write_u32_at_with(address, value, endianness);
    }

    pub fn write_u32_at_with(&mut self, address: u32, value: u32, endianness: Endianness) {
        let bookmark = self.position;
        self.position = address as usize;
        self.write_with::<u32>(value, endianness);
        #[cfg(debug_assertions)]
        {
            let raw: [u8; 4] = self.data[address as usize..address as usize + 4]
                .try_into()
                .expect("patched slot must be in bounds");
            assert_eq!(
                u32::from_ne_bytes(crate::endian::correct_bytes(raw, endianness)),
                value,
                "patch read-back mismatch at {address:#x}"
            );
        }
        self.position = bookmark;
    }

    // =========================================================================
    // Output
    // =========================================================================

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, &self.data).map_err(|source| XnError::Io {
            path: path.to_path_buf(),
            mode: "writing",
            source,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    // =========================================================================
    // Internals
    // =========================================================================

    pub(crate) fn emit(&mut self, bytes: &[u8]) {
        let end = self.position + bytes.len();
        if self.position == self.data.len() {
            self.data.extend_from_slice(bytes);
        } else {
            if end > self.data.len() {
                self.data.resize(end, 0);
            }
            self.data[self.position..end].copy_from_slice(bytes);
        }
        self.position = end;
    }
}

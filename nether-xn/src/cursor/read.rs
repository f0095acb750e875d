//! Read-mode cursor

use std::collections::BTreeMap;
use std::path::Path;

use glam::{Vec3, Vec4};
use half::f16;

use super::CursorDiagnostics;
use crate::endian::{Endianness, correct_bytes};
use crate::error::XnError;
use crate::resolver::AddressResolver;
use crate::trace::{TraceRange, TraceTree};
use crate::value::CursorValue;
use crate::Result;

const COLOR_SCALE: f32 = 255.0;

/// Owned, seekable byte buffer with typed endian-aware reads
///
/// Every read marks its bytes in the coverage bitmap; once the root node
/// address is set, reads also record labeled ranges for the tracing
/// overlay and address reads are logged for the offset-table audit.
pub struct ReadCursor {
    data: Vec<u8>,
    position: usize,
    endianness: Endianness,
    coverage: Vec<bool>,
    resolver: AddressResolver,
    ranges: Vec<TraceRange>,
    address_reads: BTreeMap<u32, String>,
    diagnostics: CursorDiagnostics,
}

impl ReadCursor {
    /// Load a whole file. A path that cannot be opened is a hard failure;
    /// the container cannot be constructed without it.
    pub fn open(path: impl AsRef<Path>, endianness: Endianness) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| XnError::Io {
            path: path.to_path_buf(),
            mode: "reading",
            source,
        })?;
        Ok(Self::from_bytes(data, endianness))
    }

    pub fn from_bytes(data: Vec<u8>, endianness: Endianness) -> Self {
        let coverage = vec![false; data.len()];
        Self {
            data,
            position: 0,
            endianness,
            coverage,
            resolver: AddressResolver::new(),
            ranges: Vec::new(),
            address_reads: BTreeMap::new(),
            diagnostics: CursorDiagnostics::default(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: CursorDiagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    // =========================================================================
    // Typed reads
    // =========================================================================

    pub fn read<T: CursorValue>(&mut self) -> Result<T> {
        let endianness = self.endianness;
        T::read_from(self, endianness)
    }

    pub fn read_with<T: CursorValue>(&mut self, endianness: Endianness) -> Result<T> {
        T::read_from(self, endianness)
    }

    /// Half float widened to f32
    pub fn read_f16(&mut self) -> Result<f32> {
        let endianness = self.endianness;
        self.read_f16_with(endianness)
    }

    pub fn read_f16_with(&mut self, endianness: Endianness) -> Result<f32> {
        let bits = self.read_with::<u16>(endianness)?;
        Ok(f16::from_bits(bits).to_f32())
    }

    pub fn read_rgba8(&mut self) -> Result<Vec4> {
        let r = self.read::<u8>()? as f32 / COLOR_SCALE;
        let g = self.read::<u8>()? as f32 / COLOR_SCALE;
        let b = self.read::<u8>()? as f32 / COLOR_SCALE;
        let a = self.read::<u8>()? as f32 / COLOR_SCALE;
        Ok(Vec4::new(r, g, b, a))
    }

    pub fn read_abgr8(&mut self) -> Result<Vec4> {
        let a = self.read::<u8>()? as f32 / COLOR_SCALE;
        let b = self.read::<u8>()? as f32 / COLOR_SCALE;
        let g = self.read::<u8>()? as f32 / COLOR_SCALE;
        let r = self.read::<u8>()? as f32 / COLOR_SCALE;
        Ok(Vec4::new(r, g, b, a))
    }

    pub fn read_argb8(&mut self) -> Result<Vec4> {
        let a = self.read::<u8>()? as f32 / COLOR_SCALE;
        let r = self.read::<u8>()? as f32 / COLOR_SCALE;
        let g = self.read::<u8>()? as f32 / COLOR_SCALE;
        let b = self.read::<u8>()? as f32 / COLOR_SCALE;
        Ok(Vec4::new(r, g, b, a))
    }

    /// Normal packed into a u32 as three sign+8-bit fraction fields
    pub fn read_packed_normal(&mut self) -> Result<Vec3> {
        let endianness = self.endianness;
        self.read_packed_normal_with(endianness)
    }

    pub fn read_packed_normal_with(&mut self, endianness: Endianness) -> Result<Vec3> {
        let value = self.read_with::<u32>(endianness)?;

        let field = |sign_bit: u32, shift: u32| {
            let sign = if value & sign_bit != 0 { -1.0 } else { 0.0 };
            sign + ((value >> shift) & 0xFF) as f32 / 256.0
        };

        Ok(Vec3::new(
            field(0x0000_0400, 2),
            field(0x0020_0000, 13),
            field(0x8000_0000, 23),
        ))
    }

    // =========================================================================
    // Strings and raw blocks
    // =========================================================================

    /// Fixed-length string (lossy UTF-8)
    pub fn read_string(&mut self, len: usize) -> Result<String> {
        let start = self.begin_read(len)?;
        let text = String::from_utf8_lossy(&self.data[start..start + len]).into_owned();
        self.note_trace("string", start, len);
        Ok(text)
    }

    /// Raw 4-byte section tag
    pub fn read_tag(&mut self) -> Result<[u8; 4]> {
        self.consume::<4>("tag")
    }

    /// String up to and including the terminating zero byte
    pub fn read_null_terminated_string(&mut self) -> Result<String> {
        let start = self.position;
        let nul = self.data[start..]
            .iter()
            .position(|&b| b == 0)
            .ok_or(XnError::UnexpectedEof {
                offset: start as u32,
                needed: 1,
                len: self.data.len(),
            })?;
        let text = String::from_utf8_lossy(&self.data[start..start + nul]).into_owned();
        self.begin_read(nul + 1)?;
        self.note_trace("string", start, nul + 1);
        Ok(text)
    }

    pub fn read_stream(&mut self, dst: &mut [u8]) -> Result<()> {
        let start = self.begin_read(dst.len())?;
        dst.copy_from_slice(&self.data[start..start + dst.len()]);
        self.note_trace("stream", start, dst.len());
        Ok(())
    }

    pub fn read_vec(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; len];
        self.read_stream(&mut buffer)?;
        Ok(buffer)
    }

    // =========================================================================
    // Addressing
    // =========================================================================

    /// Read a stored offset and resolve it against the root node address.
    /// The reading call site is logged for the offset-table audit.
    #[track_caller]
    pub fn read_address(&mut self) -> Result<u32> {
        let endianness = self.endianness;
        self.read_address_with(endianness)
    }

    #[track_caller]
    pub fn read_address_with(&mut self, endianness: Endianness) -> Result<u32> {
        let caller = std::panic::Location::caller();
        let context = format!("{}:{}", caller.file(), caller.line());
        if self.resolver.is_rooted() {
            let slot = (self.position as u32).wrapping_sub(self.resolver.root());
            self.address_reads.insert(slot, context.clone());
        }
        let raw = self.consume::<4>(&context)?;
        let stored = u32::from_ne_bytes(correct_bytes(raw, endianness));
        Ok(self.resolver.resolve(stored))
    }

    /// Set the root node address. Allowed exactly once per read pass;
    /// reads performed before this contribute no tracing.
    pub fn set_root_node_address(&mut self, address: u32) -> Result<()> {
        self.resolver.set_root(address)
    }

    pub fn root_node_address(&self) -> u32 {
        self.resolver.root()
    }

    // =========================================================================
    // Positioning
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

    /// Skip to the next multiple of `multiple`; returns the bytes skipped
    pub fn fix_padding(&mut self, multiple: u32) -> u32 {
        let address = self.position as u32;
        let padding = multiple - (address % multiple);
        if padding == multiple {
            return 0;
        }
        self.seek(address + padding);
        padding
    }

    // =========================================================================
    // Diagnostics and views
    // =========================================================================

    /// Record a semantic byte range for the tracing overlay
    pub fn add_label(&mut self, label: &str, start: u32, end: u32) {
        self.ranges.push(TraceRange {
            label: label.to_string(),
            start,
            end,
        });
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn coverage(&self) -> &[bool] {
        &self.coverage
    }

    /// Byte ranges never touched by any read
    pub fn unread_ranges(&self) -> Vec<(u32, u32)> {
        let mut gaps = Vec::new();
        let mut run_start = None;
        for (index, &consumed) in self.coverage.iter().enumerate() {
            match (consumed, run_start) {
                (false, None) => run_start = Some(index as u32),
                (true, Some(start)) => {
                    gaps.push((start, index as u32));
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            gaps.push((start, self.coverage.len() as u32));
        }
        gaps
    }

    /// Root-relative positions read as addresses, keyed to their call sites
    pub fn address_reads(&self) -> &BTreeMap<u32, String> {
        &self.address_reads
    }

    /// Build the containment tree from the ranges recorded so far. Ranges
    /// that partially overlap are logged and dropped rather than placed.
    pub fn build_trace(&self, label: &str) -> TraceTree {
        let mut tree = TraceTree::new(label, 0, self.data.len() as u32);
        let mut ranges = self.ranges.clone();
        ranges.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then((b.end - b.start).cmp(&(a.end - a.start)))
        });
        for range in ranges {
            if let Err(error) = tree.place(&range.label, range.start, range.end) {
                log::warn!("dropping trace range: {error}");
            }
        }
        tree.sort();
        tree.assign_depths();
        tree
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Bounds-check a read of `len` bytes, mark coverage, advance, and
    /// return the start position
    fn begin_read(&mut self, len: usize) -> Result<usize> {
        let start = self.position;
        if start + len > self.data.len() {
            return Err(XnError::UnexpectedEof {
                offset: start as u32,
                needed: len,
                len: self.data.len(),
            });
        }
        if let Some(watch) = self.diagnostics.watch_position {
            let watch = watch as usize;
            if watch >= start && watch < start + len {
                log::warn!("read of {len} bytes at {start:#x} touched watch position {watch:#x}");
            }
        }
        self.coverage[start..start + len].fill(true);
        self.position = start + len;
        Ok(start)
    }

    fn note_trace(&mut self, label: &str, start: usize, len: usize) {
        if self.diagnostics.trace_reads && self.resolver.is_rooted() {
            self.ranges.push(TraceRange {
                label: label.to_string(),
                start: start as u32,
                end: (start + len) as u32,
            });
        }
    }

    pub(crate) fn consume<const N: usize>(&mut self, label: &str) -> Result<[u8; N]> {
        let start = self.begin_read(N)?;
        let mut raw = [0u8; N];
        raw.copy_from_slice(&self.data[start..start + N]);
        self.note_trace(label, start, N);
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_reads_both_orders() {
        let cursor_bytes = vec![0x44, 0x33, 0x22, 0x11, 0x11, 0x22, 0x33, 0x44];
        let mut cursor = ReadCursor::from_bytes(cursor_bytes, Endianness::Little);
        assert_eq!(cursor.read::<u32>().unwrap(), 0x11223344);
        assert_eq!(cursor.read_with::<u32>(Endianness::Big).unwrap(), 0x11223344);
    }

    #[test]
    fn test_eof_is_an_error() {
        let mut cursor = ReadCursor::from_bytes(vec![0x01, 0x02], Endianness::Little);
        assert!(matches!(
            cursor.read::<u32>(),
            Err(XnError::UnexpectedEof { needed: 4, .. })
        ));
    }

    #[test]
    fn test_coverage_and_gaps() {
        let mut cursor = ReadCursor::from_bytes(vec![0u8; 12], Endianness::Little);
        cursor.read::<u32>().unwrap();
        cursor.seek(8);
        cursor.read::<u16>().unwrap();
        assert_eq!(cursor.unread_ranges(), vec![(4, 8), (10, 12)]);
    }

    #[test]
    fn test_null_terminated_string() {
        let mut cursor =
            ReadCursor::from_bytes(b"gravel\0tail".to_vec(), Endianness::Little);
        assert_eq!(cursor.read_null_terminated_string().unwrap(), "gravel");
        assert_eq!(cursor.position(), 7);
    }

    #[test]
    fn test_fix_padding() {
        let mut cursor = ReadCursor::from_bytes(vec![0u8; 32], Endianness::Little);
        cursor.seek(5);
        assert_eq!(cursor.fix_padding(16), 11);
        assert_eq!(cursor.position(), 16);
        assert_eq!(cursor.fix_padding(16), 0);
    }

    #[test]
    fn test_address_resolution() {
        let mut cursor =
            ReadCursor::from_bytes(vec![0x10, 0x00, 0x00, 0x00], Endianness::Little);
        cursor.set_root_node_address(32).unwrap();
        assert_eq!(cursor.read_address().unwrap(), 0x30);
        assert_eq!(cursor.address_reads().len(), 1);
    }

    #[test]
    fn test_address_before_root_is_untracked() {
        let mut cursor =
            ReadCursor::from_bytes(vec![0x20, 0x00, 0x00, 0x00], Endianness::Little);
        assert_eq!(cursor.read_address().unwrap(), 0x20);
        assert!(cursor.address_reads().is_empty());
    }

    #[test]
    fn test_packed_normal_negative_axis() {
        let value: u32 = 0x8000_0000 | (0x80 << 23);
        let mut cursor = ReadCursor::from_bytes(value.to_le_bytes().to_vec(), Endianness::Little);
        let normal = cursor.read_packed_normal().unwrap();
        assert_eq!(normal.z, -0.5);
    }
}

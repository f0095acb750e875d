//! Endian-aware typed cursors over container bytes
//!
//! Reading and writing are split the way the replay codec splits them:
//! [`ReadCursor`] owns the whole file as a byte buffer and tracks which
//! bytes have been consumed; [`WriteCursor`] owns a growable output buffer
//! that stays seekable so section sizes and forward references can be
//! patched after their targets exist.

mod read;
mod write;

pub use read::ReadCursor;
pub use write::WriteCursor;

/// Diagnostic switches consulted by the read cursor, passed at construction
#[derive(Debug, Clone)]
pub struct CursorDiagnostics {
    /// Log a warning whenever a read touches this position
    pub watch_position: Option<u32>,
    /// Record labeled byte ranges for the tracing overlay
    pub trace_reads: bool,
}

impl Default for CursorDiagnostics {
    fn default() -> Self {
        Self {
            watch_position: None,
            trace_reads: true,
        }
    }
}

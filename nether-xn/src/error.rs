//! Error types for container reading and writing

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while decoding or encoding an XN container
#[derive(Debug, Error)]
pub enum XnError {
    /// File could not be opened or written
    #[error("couldn't open {} for {mode}: {source}", path.display())]
    Io {
        path: PathBuf,
        mode: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Variant could not be determined from the file name
    #[error("no format variant matches \"{0}\" (expected .xno/.zno/.ino/.gno/.eno family)")]
    UnknownExtension(String),

    /// Read ran past the end of the buffer
    #[error("unexpected end of data: {needed} bytes at offset {offset:#x}, buffer is {len:#x}")]
    UnexpectedEof { offset: u32, needed: usize, len: usize },

    /// Section tag not in the active variant's magic table
    #[error("unrecognized section tag \"{tag}\" at offset {offset:#x}")]
    UnknownSectionTag { tag: String, offset: u32 },

    /// Relocation stream byte with neither width bit set
    #[error("malformed relocation stream: byte {byte:#04x} at stream offset {offset}")]
    MalformedRelocation { byte: u8, offset: usize },

    /// The root node address may only be set once per container pass
    #[error("root node address set twice")]
    RootAddressAlreadySet,

    /// A byte range partially overlaps an existing trace node
    #[error(
        "trace range {start:#x}..{end:#x} (\"{label}\") partially overlaps {other_start:#x}..{other_end:#x} (\"{other_label}\")"
    )]
    TraceOverlap {
        label: String,
        start: u32,
        end: u32,
        other_label: String,
        other_start: u32,
        other_end: u32,
    },

    /// A mandatory section is absent from the container
    #[error("container is missing its {0} section")]
    MissingSection(&'static str),
}

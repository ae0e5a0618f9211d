//! Error types for archive navigation.

use thiserror::Error;

use crate::HeaderError;

/// Errors that can occur while navigating an archive.
///
/// Variants fall into three groups:
///
/// - **Structural** failures mean the archive itself cannot be interpreted:
///   [`Header`](NavError::Header) (bad magic, version or checksum) and
///   [`Truncated`](NavError::Truncated). Retrying cannot change the
///   outcome for a static byte stream.
/// - **Lookup** negatives are ordinary answers to a query about a valid
///   archive: [`NotFound`](NavError::NotFound),
///   [`NotADirectory`](NavError::NotADirectory),
///   [`NotAFile`](NavError::NotAFile) and
///   [`OffsetOutOfRange`](NavError::OffsetOutOfRange). Use
///   [`is_lookup`](NavError::is_lookup) to branch on "absent" vs "corrupt".
/// - **Resource** failures come verbatim from the underlying stream:
///   [`Io`](NavError::Io) and [`Seek`](NavError::Seek).
///
/// [`LinkLoop`](NavError::LinkLoop) stands alone: the link indirection
/// bound was hit, which is neither absence nor corruption of a single
/// header.
#[derive(Debug, Error)]
pub enum NavError {
    /// A header block failed structural validation.
    #[error("header error: {0}")]
    Header(#[from] HeaderError),

    /// The stream ended before the end-of-archive sentinel.
    #[error("truncated archive at offset {pos}")]
    Truncated {
        /// Stream offset at which the short read occurred.
        pos: u64,
    },

    /// No entry exists at the given path.
    #[error("no entry at path {path:?}")]
    NotFound {
        /// The path that was looked up, lossily decoded.
        path: String,
    },

    /// The entry exists but is not a directory.
    #[error("not a directory: {path:?}")]
    NotADirectory {
        /// The path that was looked up, lossily decoded.
        path: String,
    },

    /// The entry exists but is not a regular file.
    #[error("not a file: {path:?}")]
    NotAFile {
        /// The path that was looked up, lossily decoded.
        path: String,
    },

    /// The read offset lies at or past the end of the file.
    #[error("offset {offset} out of range for file of {size} bytes")]
    OffsetOutOfRange {
        /// The requested start offset.
        offset: u64,
        /// The file's total size.
        size: u64,
    },

    /// Link resolution exceeded the configured indirection bound.
    #[error("link resolution exceeded {limit} hops at {path:?}")]
    LinkLoop {
        /// The path at which the bound was exceeded.
        path: String,
        /// The configured maximum indirection depth.
        limit: usize,
    },

    /// Read failure from the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The underlying stream could not honor a seek.
    #[error("seek failed: {0}")]
    Seek(#[source] std::io::Error),
}

impl NavError {
    /// Whether this is an expected lookup negative rather than a
    /// structural, resource or resolution failure.
    #[must_use]
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            NavError::NotFound { .. }
                | NavError::NotADirectory { .. }
                | NavError::NotAFile { .. }
                | NavError::OffsetOutOfRange { .. }
        )
    }
}

/// Result type for navigation operations.
pub type Result<T> = std::result::Result<T, NavError>;

/// Lossy decode for paths carried in error variants.
pub(crate) fn display_path(path: &[u8]) -> String {
    String::from_utf8_lossy(path).into_owned()
}

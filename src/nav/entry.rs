//! Owned archive entry descriptor.

use std::borrow::Cow;

use crate::{EntryType, Header, HeaderError};

/// One archive entry, decoded from its header block.
///
/// Descriptors are transient: each scan rebuilds them from the raw stream
/// and nothing is shared between calls. The path and link target are owned
/// copies of the header's fixed-width fields (at most 100 bytes each, a
/// format constraint validated at decode time by the field widths
/// themselves).
///
/// Archives may contain duplicate paths; the scanner hands back entries in
/// archive order and lookups take the first match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The entry's path, exactly as stored in the name field.
    pub path: Vec<u8>,

    /// The entry type (Regular, Directory, Symlink, ...).
    pub kind: EntryType,

    /// Payload length in bytes. Meaningful for regular files; other kinds
    /// store whatever the archive wrote (usually zero).
    pub size: u64,

    /// Link target path. `Some` only when [`kind`](Entry::kind) is
    /// [`EntryType::Symlink`] or [`EntryType::Link`].
    pub link_target: Option<Vec<u8>>,

    /// Absolute stream offset of the first payload byte (the byte right
    /// after this entry's header block).
    pub payload_offset: u64,

    /// File mode/permissions.
    pub mode: u32,

    /// Owner user ID.
    pub uid: u64,

    /// Owner group ID.
    pub gid: u64,

    /// Modification time as a Unix timestamp.
    pub mtime: u64,
}

impl Entry {
    /// Decode a validated header block into an owned descriptor.
    ///
    /// The caller is expected to have run [`Header::validate`] first; this
    /// only parses the numeric fields and copies the string fields out.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidOctal`] if a numeric field is
    /// malformed.
    pub fn decode(header: &Header, payload_offset: u64) -> Result<Self, HeaderError> {
        let kind = header.entry_type();
        let link_name = header.link_name_bytes();
        let link_target = if kind.is_link() && !link_name.is_empty() {
            Some(link_name.to_vec())
        } else {
            None
        };

        Ok(Entry {
            path: header.name_bytes().to_vec(),
            kind,
            size: header.size()?,
            link_target,
            payload_offset,
            mode: header.mode()?,
            uid: header.uid()?,
            gid: header.gid()?,
            mtime: header.mtime()?,
        })
    }

    /// Get the path as a lossy UTF-8 string.
    #[must_use]
    pub fn path_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.path)
    }

    /// Check if this entry holds regular file content.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Check if this is a directory entry.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Check if this entry is a symbolic or hard link.
    #[must_use]
    pub fn is_link(&self) -> bool {
        self.kind.is_link()
    }

    /// Get the payload length rounded up to the block boundary.
    ///
    /// This is the number of bytes between this entry's header and the
    /// next header, regardless of whether the payload is read.
    #[must_use]
    pub fn padded_size(&self) -> u64 {
        self.size.next_multiple_of(crate::BLOCK_SIZE as u64)
    }
}

/// Outcome of a bounded partial read of a regular file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileRead {
    /// Number of bytes written into the caller's buffer.
    pub bytes_written: usize,

    /// Bytes left between the end of this read and the end of the file.
    /// Zero means the read reached end-of-file.
    pub bytes_remaining: u64,
}

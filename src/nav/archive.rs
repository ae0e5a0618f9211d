//! Sequential archive traversal and the public query operations.

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use log::{debug, trace};

use crate::{Header, BLOCK_SIZE};

use super::entry::{Entry, FileRead};
use super::error::{display_path, NavError, Result};
use super::limits::Limits;

/// Handle over a seekable stream containing a UStar archive.
///
/// Offset 0 of the stream must be the first archive header. The handle
/// owns the read/seek capability but not the stream's lifecycle: opening
/// and closing belong to the caller, and [`into_inner`](Archive::into_inner)
/// gives the stream back.
///
/// Every public operation rewinds to offset 0 and scans forward; no
/// descriptor or position survives between calls. Failures never leave
/// partial state behind, so any call may be retried as-is.
#[derive(Debug)]
pub struct Archive<F> {
    stream: F,
    limits: Limits,
}

impl<F: Read + Seek> Archive<F> {
    /// Create a navigator over the given stream with default limits.
    pub fn new(stream: F) -> Self {
        Self::with_limits(stream, Limits::default())
    }

    /// Create a navigator with explicit limits.
    pub fn with_limits(stream: F, limits: Limits) -> Self {
        Self { stream, limits }
    }

    /// Get the configured limits.
    #[must_use]
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Consume the navigator and return the underlying stream.
    pub fn into_inner(self) -> F {
        self.stream
    }

    /// Check the archive's structural integrity.
    ///
    /// Scans every header up to the end-of-archive sentinel, validating
    /// magic, version and checksum on each, and returns the number of
    /// non-sentinel headers. The count is stable across repeated calls.
    ///
    /// # Errors
    ///
    /// Propagates the first structural failure in scan order:
    /// [`HeaderError`] wrapped in [`NavError::Header`] for a bad header,
    /// or [`NavError::Truncated`] if the stream ends before the sentinel.
    ///
    /// [`HeaderError`]: crate::HeaderError
    pub fn validate(&mut self) -> Result<u64> {
        let mut count: u64 = 0;
        self.for_each_entry(|_| {
            count += 1;
            None::<()>
        })?;
        debug!("archive valid: {count} entries");
        Ok(count)
    }

    /// Look up an entry by exact path.
    ///
    /// Matching is byte-equality against the full path, neither prefix nor
    /// normalized; with duplicate paths the first match in archive order
    /// wins. Absence is `Ok(None)`, not an error.
    ///
    /// The returned descriptor is the entry as stored: a symlink stays a
    /// symlink. Use [`resolve`](Archive::resolve) to follow links.
    pub fn find(&mut self, path: &[u8]) -> Result<Option<Entry>> {
        self.for_each_entry(|entry| (entry.path == path).then_some(entry))
    }

    /// Look up an entry by path, following symlink and hardlink targets.
    ///
    /// Indirection is followed up to [`Limits::max_link_depth`] hops; a
    /// chain still pointing at a link past that bound (a cycle, or a
    /// pathological chain) fails with [`NavError::LinkLoop`]. A link whose
    /// target path has no entry resolves to `Ok(None)`.
    pub fn resolve(&mut self, path: &[u8]) -> Result<Option<Entry>> {
        let mut current = path.to_vec();
        for depth in 0..=self.limits.max_link_depth {
            let Some(entry) = self.find(&current)? else {
                return Ok(None);
            };
            if !entry.kind.is_link() {
                return Ok(Some(entry));
            }
            match entry.link_target {
                Some(target) => {
                    trace!(
                        "hop {depth}: {:?} -> {:?}",
                        display_path(&current),
                        display_path(&target)
                    );
                    current = target;
                }
                // A link entry with an empty target can never resolve.
                None => return Ok(None),
            }
        }
        Err(NavError::LinkLoop {
            path: display_path(path),
            limit: self.limits.max_link_depth,
        })
    }

    /// Whether a directory exists at the given path.
    ///
    /// Links are resolved first, so a symlink pointing at a directory
    /// answers true. Absence and non-directory kinds answer false;
    /// structural and stream failures propagate as errors.
    pub fn is_dir(&mut self, path: &[u8]) -> Result<bool> {
        Ok(self.resolve(path)?.is_some_and(|e| e.is_dir()))
    }

    /// Whether a regular file exists at the given path.
    ///
    /// Links are resolved first. Both regular and contiguous entries
    /// count as files.
    pub fn is_file(&mut self, path: &[u8]) -> Result<bool> {
        Ok(self.resolve(path)?.is_some_and(|e| e.is_file()))
    }

    /// Whether the entry at the given path is itself a symlink or
    /// hardlink.
    ///
    /// This classifies the unresolved entry: resolving first would hide
    /// exactly the property being asked about.
    pub fn is_symlink(&mut self, path: &[u8]) -> Result<bool> {
        Ok(self.find(path)?.is_some_and(|e| e.is_link()))
    }

    /// List the immediate (non-recursive) children of a directory.
    ///
    /// The path is resolved through links first. Children are the entries
    /// whose path extends the directory's own path by one component, with
    /// an optional trailing `/` marking directory children. Results keep
    /// archive scan order and preserve duplicates; a childless directory
    /// yields an empty vec.
    ///
    /// # Errors
    ///
    /// [`NavError::NotFound`] if no entry exists at the path, and
    /// [`NavError::NotADirectory`] if the resolved entry is not a
    /// directory.
    pub fn list(&mut self, path: &[u8]) -> Result<Vec<Vec<u8>>> {
        let dir = self.resolve(path)?.ok_or_else(|| NavError::NotFound {
            path: display_path(path),
        })?;
        if !dir.is_dir() {
            return Err(NavError::NotADirectory {
                path: display_path(path),
            });
        }

        let prefix = dir.path;
        let mut children = Vec::new();
        self.for_each_entry(|entry| {
            let is_child = matches!(
                entry.path.strip_prefix(prefix.as_slice()),
                Some(rest) if !rest.is_empty() && immediate(rest)
            );
            if is_child {
                children.push(entry.path);
            }
            None::<()>
        })?;
        Ok(children)
    }

    /// Read a byte range of a regular file into the caller's buffer.
    ///
    /// The path is resolved through links first. Reading starts `offset`
    /// bytes into the payload and fills at most `dest.len()` bytes; the
    /// result reports how many bytes were written and how many remain
    /// between the end of the read and the end of the file.
    ///
    /// # Errors
    ///
    /// [`NavError::NotFound`] if no entry exists at the path,
    /// [`NavError::NotAFile`] if the resolved entry is not a regular file,
    /// and [`NavError::OffsetOutOfRange`] if `offset` is at or past the
    /// end of the file (a zero-length read at end-of-file is not valid).
    /// A payload cut short by the end of the stream is
    /// [`NavError::Truncated`], not a partial success.
    pub fn read_file(&mut self, path: &[u8], offset: u64, dest: &mut [u8]) -> Result<FileRead> {
        let entry = self.resolve(path)?.ok_or_else(|| NavError::NotFound {
            path: display_path(path),
        })?;
        if !entry.is_file() {
            return Err(NavError::NotAFile {
                path: display_path(path),
            });
        }
        if offset >= entry.size {
            return Err(NavError::OffsetOutOfRange {
                offset,
                size: entry.size,
            });
        }

        let pos = entry.payload_offset + offset;
        let want = u64::min(dest.len() as u64, entry.size - offset) as usize;
        self.stream
            .seek(SeekFrom::Start(pos))
            .map_err(NavError::Seek)?;
        self.stream
            .read_exact(&mut dest[..want])
            .map_err(|e| match e.kind() {
                ErrorKind::UnexpectedEof => NavError::Truncated { pos },
                _ => NavError::Io(e),
            })?;

        Ok(FileRead {
            bytes_written: want,
            bytes_remaining: entry.size - offset - want as u64,
        })
    }

    // =========================================================================
    // Scanning engine
    // =========================================================================

    /// Drive one full scan, yielding each entry in archive order.
    ///
    /// The stream is repositioned to offset 0 first. Each header is
    /// validated and decoded, then the stream is advanced past the
    /// payload's `ceil(size / 512)` blocks whether or not the payload was
    /// of interest. The visitor short-circuits the scan by returning
    /// `Some`; reaching the sentinel yields `Ok(None)`.
    fn for_each_entry<T>(&mut self, mut visitor: impl FnMut(Entry) -> Option<T>) -> Result<Option<T>> {
        self.stream
            .seek(SeekFrom::Start(0))
            .map_err(NavError::Seek)?;

        let mut block = [0u8; BLOCK_SIZE];
        let mut pos: u64 = 0;
        loop {
            self.read_block(&mut block, pos)?;
            let header = Header::from_block(&block);
            if header.is_sentinel() {
                return Ok(None);
            }
            header.validate()?;
            pos += BLOCK_SIZE as u64;

            let entry = Entry::decode(header, pos)?;
            trace!("entry {:?} at {pos}", entry.path_lossy());
            let padded = entry.padded_size();
            if let Some(out) = visitor(entry) {
                return Ok(Some(out));
            }
            self.advance_past_payload(padded)?;
            pos += padded;
        }
    }

    /// Read exactly one block at stream offset `pos`.
    ///
    /// Any end-of-stream here, clean or mid-block, means the archive lost
    /// its sentinel and is reported as truncation.
    fn read_block(&mut self, block: &mut [u8; BLOCK_SIZE], pos: u64) -> Result<()> {
        self.stream.read_exact(block).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => NavError::Truncated { pos },
            _ => NavError::Io(e),
        })
    }

    /// Advance the stream past a block-aligned payload.
    fn advance_past_payload(&mut self, padded: u64) -> Result<()> {
        if padded > 0 {
            self.stream
                .seek(SeekFrom::Current(padded as i64))
                .map_err(NavError::Seek)?;
        }
        Ok(())
    }
}

/// Whether a prefix-stripped remainder names an immediate child: no
/// interior `/`, though a single trailing `/` (a directory child) is fine.
fn immediate(rest: &[u8]) -> bool {
    !rest[..rest.len() - 1].contains(&b'/')
}

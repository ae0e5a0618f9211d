//! Read-only navigator for USTAR tar archives.
//!
//! This crate answers questions about a tar archive without extracting it:
//! whether the archive is structurally valid, whether a path exists and what
//! kind of entry it is, what the immediate children of a directory are, and
//! what bytes a regular file contains at a given offset. All of it works
//! directly against a caller-owned seekable byte stream.
//!
//! The crate deliberately accepts only the strict UStar (POSIX.1-2001)
//! dialect: the header magic must be exactly `ustar\0` and the version
//! exactly `00`. Anything else fails validation before any per-entry
//! interpretation is attempted.
//!
//! # Header Field Layout
//!
//! Every header is one 512-byte block:
//!
//! | Offset | Size | Field     | Description                              |
//! |--------|------|-----------|------------------------------------------|
//! | 0      | 100  | name      | File path (null-terminated if < 100)     |
//! | 100    | 8    | mode      | File mode in octal ASCII                 |
//! | 108    | 8    | uid       | Owner user ID in octal ASCII             |
//! | 116    | 8    | gid       | Owner group ID in octal ASCII            |
//! | 124    | 12   | size      | File size in octal ASCII                 |
//! | 136    | 12   | mtime     | Modification time (Unix epoch, octal)    |
//! | 148    | 8    | checksum  | Header checksum in octal ASCII           |
//! | 156    | 1    | typeflag  | Entry type (see [`EntryType`])           |
//! | 157    | 100  | linkname  | Link target for hard/symbolic links      |
//! | 257    | 6    | magic     | "ustar\0"                                |
//! | 263    | 2    | version   | "00"                                     |
//! | 265    | 32   | uname     | Owner user name                          |
//! | 297    | 32   | gname     | Owner group name                         |
//! | 329    | 8    | devmajor  | Device major number                      |
//! | 337    | 8    | devminor  | Device minor number                      |
//! | 345    | 155  | prefix    | Path prefix for long names               |
//!
//! A header block whose name field starts with a zero byte is the
//! end-of-archive sentinel. This implementation treats a single such block
//! as terminal; the customary second zero block is never examined.
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//! use ustar_nav::nav::Archive;
//!
//! let file = File::open("archive.tar").unwrap();
//! let mut archive = Archive::new(file);
//!
//! let entries = archive.validate().unwrap();
//! println!("{entries} entries");
//!
//! if archive.is_dir(b"dir/").unwrap() {
//!     for child in archive.list(b"dir/").unwrap() {
//!         println!("{}", String::from_utf8_lossy(&child));
//!     }
//! }
//! ```

pub mod nav;

use std::fmt;

use thiserror::Error;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Size of a tar block in bytes. Headers and payload padding are both
/// aligned to this unit.
pub const BLOCK_SIZE: usize = 512;

/// Magic string for UStar format headers ("ustar\0").
pub const USTAR_MAGIC: &[u8; 6] = b"ustar\0";

/// Version field for UStar format headers ("00", no terminator).
pub const USTAR_VERSION: &[u8; 2] = b"00";

/// Byte range of the checksum field within a header block.
const CHECKSUM_RANGE: std::ops::Range<usize> = 148..156;

/// Errors produced while decoding a single header block.
///
/// These are pure decode failures: no I/O is involved, and each variant
/// names the structural property that broke so callers can report it.
#[derive(Debug, Error)]
pub enum HeaderError {
    /// The provided data is too short to contain a header.
    #[error("insufficient data: expected {BLOCK_SIZE} bytes, got {0}")]
    InsufficientData(usize),

    /// The magic field is not exactly `ustar\0`.
    #[error("invalid magic: {0:?}")]
    InvalidMagic([u8; 6]),

    /// The version field is not exactly `00`.
    #[error("invalid version: {0:?}")]
    InvalidVersion([u8; 2]),

    /// The stored checksum does not match the computed value.
    #[error("checksum mismatch: stored {stored}, computed {computed}")]
    ChecksumMismatch {
        /// The checksum value stored in the header.
        stored: u64,
        /// The checksum computed from the header bytes.
        computed: u64,
    },

    /// An octal numeric field contains invalid characters.
    #[error("invalid octal field: {0:?}")]
    InvalidOctal(Vec<u8>),
}

/// Result type for header decoding operations.
pub type Result<T> = std::result::Result<T, HeaderError>;

// ============================================================================
// Raw header structs
// ============================================================================

/// Raw 512-byte tar header block, treated as an opaque byte array.
///
/// Use [`Header`] for the accessor/validation interface.
#[derive(Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct RawHeader {
    /// The raw header bytes.
    pub bytes: [u8; BLOCK_SIZE],
}

impl Default for RawHeader {
    fn default() -> Self {
        Self {
            bytes: [0u8; BLOCK_SIZE],
        }
    }
}

impl fmt::Debug for RawHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawHeader")
            .field("name", &truncate_null(&self.bytes[0..100]))
            .finish_non_exhaustive()
    }
}

/// UStar (POSIX.1-2001) tar header with named fields.
///
/// See the module-level layout table for offsets. The struct is `repr(C)`
/// with zerocopy derives so a 512-byte block can be reinterpreted without
/// copying.
#[derive(Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct UstarHeader {
    /// File path name (null-terminated if shorter than 100 bytes).
    pub name: [u8; 100],
    /// File mode in octal ASCII.
    pub mode: [u8; 8],
    /// Owner user ID in octal ASCII.
    pub uid: [u8; 8],
    /// Owner group ID in octal ASCII.
    pub gid: [u8; 8],
    /// File size in octal ASCII.
    pub size: [u8; 12],
    /// Modification time as Unix timestamp in octal ASCII.
    pub mtime: [u8; 12],
    /// Header checksum in octal ASCII.
    pub checksum: [u8; 8],
    /// Entry type flag.
    pub typeflag: u8,
    /// Link target name for hard/symbolic links.
    pub linkname: [u8; 100],
    /// Magic string identifying the format ("ustar\0").
    pub magic: [u8; 6],
    /// Format version ("00").
    pub version: [u8; 2],
    /// Owner user name (null-terminated).
    pub uname: [u8; 32],
    /// Owner group name (null-terminated).
    pub gname: [u8; 32],
    /// Device major number in octal ASCII (for special files).
    pub devmajor: [u8; 8],
    /// Device minor number in octal ASCII (for special files).
    pub devminor: [u8; 8],
    /// Path prefix for names longer than 100 bytes.
    pub prefix: [u8; 155],
    /// Padding to fill the 512-byte block.
    pub pad: [u8; 12],
}

impl fmt::Debug for UstarHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UstarHeader")
            .field("name", &String::from_utf8_lossy(truncate_null(&self.name)))
            .field("typeflag", &self.typeflag)
            .field("magic", &self.magic)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Entry type
// ============================================================================

/// Tar entry type decoded from the single type-indicator byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryType {
    /// Regular file (type '0', or '\0' for old tar compatibility).
    Regular,
    /// Contiguous file (type '7'); treated as a regular file.
    Contiguous,
    /// Directory (type '5').
    Directory,
    /// Symbolic link (type '2').
    Symlink,
    /// Hard link to another entry in the archive (type '1').
    Link,
    /// Any other type byte (devices, FIFOs, extension headers, ...).
    Other(u8),
}

impl EntryType {
    /// Parse an entry type from a raw byte value.
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b'0' | b'\0' => EntryType::Regular,
            b'7' => EntryType::Contiguous,
            b'5' => EntryType::Directory,
            b'2' => EntryType::Symlink,
            b'1' => EntryType::Link,
            other => EntryType::Other(other),
        }
    }

    /// Convert an entry type to its raw byte representation.
    ///
    /// Note that `Regular` is encoded as '0', not '\0'.
    #[must_use]
    pub fn to_byte(self) -> u8 {
        match self {
            EntryType::Regular => b'0',
            EntryType::Contiguous => b'7',
            EntryType::Directory => b'5',
            EntryType::Symlink => b'2',
            EntryType::Link => b'1',
            EntryType::Other(b) => b,
        }
    }

    /// Returns true if this entry holds regular file content.
    #[must_use]
    pub fn is_file(self) -> bool {
        matches!(self, EntryType::Regular | EntryType::Contiguous)
    }

    /// Returns true if this is a directory entry.
    #[must_use]
    pub fn is_dir(self) -> bool {
        self == EntryType::Directory
    }

    /// Returns true if this entry is a symbolic or hard link, i.e. it
    /// carries a link target that resolution must follow.
    #[must_use]
    pub fn is_link(self) -> bool {
        matches!(self, EntryType::Symlink | EntryType::Link)
    }
}

impl From<u8> for EntryType {
    fn from(byte: u8) -> Self {
        Self::from_byte(byte)
    }
}

impl From<EntryType> for u8 {
    fn from(entry_type: EntryType) -> Self {
        entry_type.to_byte()
    }
}

// ============================================================================
// Header wrapper
// ============================================================================

/// A 512-byte header block with accessor and validation methods.
///
/// Decoding is a pure function of the block's bytes: [`Header::validate`]
/// checks magic, version and checksum in that order, and the field
/// accessors parse the octal ASCII numeric fields on demand.
#[derive(Clone, Copy, FromBytes, Immutable, KnownLayout)]
#[repr(transparent)]
pub struct Header {
    raw: RawHeader,
}

impl Header {
    /// Reinterpret a byte slice as a header.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InsufficientData`] if the slice is shorter
    /// than one block.
    pub fn from_bytes(bytes: &[u8]) -> Result<&Header> {
        Header::ref_from_bytes(bytes.get(..BLOCK_SIZE).ok_or_else(|| {
            HeaderError::InsufficientData(bytes.len())
        })?)
        .map_err(|_| HeaderError::InsufficientData(bytes.len()))
    }

    /// Reinterpret exactly one block as a header, without size checking.
    #[must_use]
    pub fn from_block(bytes: &[u8; BLOCK_SIZE]) -> &Header {
        Header::ref_from_bytes(bytes).expect("block has header size")
    }

    /// Get a reference to the underlying bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; BLOCK_SIZE] {
        &self.raw.bytes
    }

    /// View this header with its UStar fields named.
    #[must_use]
    pub fn as_ustar(&self) -> &UstarHeader {
        UstarHeader::ref_from_bytes(&self.raw.bytes).expect("block has header size")
    }

    /// Whether this block is the end-of-archive sentinel.
    ///
    /// The sentinel is designated by a zero byte at the first position of
    /// the name field. A sentinel is not an entry and must not be decoded
    /// as one.
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.raw.bytes[0] == 0
    }

    /// Get the entry type.
    #[must_use]
    pub fn entry_type(&self) -> EntryType {
        EntryType::from_byte(self.as_ustar().typeflag)
    }

    /// Get the path bytes from the name field, truncated at the first null.
    #[must_use]
    pub fn name_bytes(&self) -> &[u8] {
        truncate_null(&self.as_ustar().name)
    }

    /// Get the link target bytes, truncated at the first null.
    #[must_use]
    pub fn link_name_bytes(&self) -> &[u8] {
        truncate_null(&self.as_ustar().linkname)
    }

    /// Get the payload size in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidOctal`] if the size field is malformed.
    pub fn size(&self) -> Result<u64> {
        parse_octal(&self.as_ustar().size)
    }

    /// Get the file mode (permissions).
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidOctal`] if the mode field is malformed.
    pub fn mode(&self) -> Result<u32> {
        parse_octal(&self.as_ustar().mode).map(|v| v as u32)
    }

    /// Get the owner user ID.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidOctal`] if the uid field is malformed.
    pub fn uid(&self) -> Result<u64> {
        parse_octal(&self.as_ustar().uid)
    }

    /// Get the owner group ID.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidOctal`] if the gid field is malformed.
    pub fn gid(&self) -> Result<u64> {
        parse_octal(&self.as_ustar().gid)
    }

    /// Get the modification time as a Unix timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidOctal`] if the mtime field is malformed.
    pub fn mtime(&self) -> Result<u64> {
        parse_octal(&self.as_ustar().mtime)
    }

    /// Validate the structural properties of this header.
    ///
    /// Checks are performed in order: magic, version, checksum. The first
    /// failure is returned so the caller can report which property broke.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidMagic`], [`HeaderError::InvalidVersion`]
    /// or [`HeaderError::ChecksumMismatch`].
    pub fn validate(&self) -> Result<()> {
        let ustar = self.as_ustar();
        if &ustar.magic != USTAR_MAGIC {
            return Err(HeaderError::InvalidMagic(ustar.magic));
        }
        if &ustar.version != USTAR_VERSION {
            return Err(HeaderError::InvalidVersion(ustar.version));
        }
        self.verify_checksum()
    }

    /// Verify the header checksum.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::ChecksumMismatch`] if the stored value does
    /// not match, or [`HeaderError::InvalidOctal`] if it cannot be parsed.
    pub fn verify_checksum(&self) -> Result<()> {
        let stored = parse_octal(&self.as_ustar().checksum)?;
        let computed = self.compute_checksum();
        if stored == computed {
            Ok(())
        } else {
            Err(HeaderError::ChecksumMismatch { stored, computed })
        }
    }

    /// Compute the header checksum: the unsigned sum of all 512 header
    /// bytes, with the 8 checksum-field bytes replaced by ASCII spaces.
    #[must_use]
    pub fn compute_checksum(&self) -> u64 {
        let mut sum: u64 = 0;
        for (i, &byte) in self.raw.bytes.iter().enumerate() {
            if CHECKSUM_RANGE.contains(&i) {
                sum += u64::from(b' ');
            } else {
                sum += u64::from(byte);
            }
        }
        sum
    }
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Header")
            .field("name", &String::from_utf8_lossy(self.name_bytes()))
            .field("entry_type", &self.entry_type())
            .field("size", &self.size().ok())
            .field("sentinel", &self.is_sentinel())
            .finish()
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Parse an octal ASCII field into a u64.
///
/// Octal fields in tar headers are ASCII strings with optional leading
/// spaces and trailing spaces or null bytes, e.g. `"0000644\0"` -> 420.
/// An all-blank field parses as zero.
///
/// # Errors
///
/// Returns [`HeaderError::InvalidOctal`] if the field contains anything
/// other than spaces, digits 0-7, and null bytes.
pub fn parse_octal(bytes: &[u8]) -> Result<u64> {
    let start = bytes.iter().position(|&b| b != b' ').unwrap_or(bytes.len());
    let end = bytes[start..]
        .iter()
        .position(|&b| b == b' ' || b == b'\0')
        .map_or(bytes.len(), |i| start + i);

    let trimmed = &bytes[start..end];
    if trimmed.is_empty() {
        return Ok(0);
    }

    let mut value: u64 = 0;
    for &byte in trimmed {
        if !(b'0'..=b'7').contains(&byte) {
            return Err(HeaderError::InvalidOctal(bytes.to_vec()));
        }
        value = value
            .checked_mul(8)
            .and_then(|v| v.checked_add(u64::from(byte - b'0')))
            .ok_or_else(|| HeaderError::InvalidOctal(bytes.to_vec()))?;
    }

    Ok(value)
}

/// Truncate a byte slice at the first null byte.
///
/// Fixed-width header fields hold either null-terminated or full-width
/// strings; this yields the logical value in both cases.
#[must_use]
pub fn truncate_null(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(pos) => &bytes[..pos],
        None => bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a valid UStar header block for tests.
    fn test_block(name: &[u8], typeflag: u8, size: u64) -> [u8; BLOCK_SIZE] {
        let mut block = [0u8; BLOCK_SIZE];
        block[..name.len()].copy_from_slice(name);
        block[100..107].copy_from_slice(b"0000644");
        block[124..135].copy_from_slice(format!("{size:011o}").as_bytes());
        block[156] = typeflag;
        block[257..263].copy_from_slice(USTAR_MAGIC);
        block[263..265].copy_from_slice(USTAR_VERSION);
        let sum = Header::from_block(&block).compute_checksum();
        block[148..154].copy_from_slice(format!("{sum:06o}").as_bytes());
        block[154] = 0;
        block[155] = b' ';
        block
    }

    #[test]
    fn test_struct_sizes() {
        assert_eq!(size_of::<RawHeader>(), BLOCK_SIZE);
        assert_eq!(size_of::<UstarHeader>(), BLOCK_SIZE);
        assert_eq!(size_of::<Header>(), BLOCK_SIZE);
    }

    #[test]
    fn test_from_bytes_insufficient() {
        let short = [0u8; 100];
        let result = Header::from_bytes(&short);
        assert!(matches!(result, Err(HeaderError::InsufficientData(100))));
    }

    #[test]
    fn test_validate_ok() {
        let block = test_block(b"hello.txt", b'0', 13);
        let header = Header::from_block(&block);
        header.validate().unwrap();
        assert_eq!(header.name_bytes(), b"hello.txt");
        assert_eq!(header.entry_type(), EntryType::Regular);
        assert_eq!(header.size().unwrap(), 13);
        assert_eq!(header.mode().unwrap(), 0o644);
    }

    #[test]
    fn test_validate_bad_magic() {
        let mut block = test_block(b"x", b'0', 0);
        block[257..263].copy_from_slice(b"ustar ");
        let err = Header::from_block(&block).validate().unwrap_err();
        assert!(matches!(err, HeaderError::InvalidMagic(_)));
    }

    #[test]
    fn test_validate_bad_version() {
        let mut block = test_block(b"x", b'0', 0);
        // GNU-style version bytes under a correct magic
        block[263..265].copy_from_slice(b" \0");
        let err = Header::from_block(&block).validate().unwrap_err();
        assert!(matches!(err, HeaderError::InvalidVersion(_)));
    }

    #[test]
    fn test_validate_order_magic_before_checksum() {
        // Break both magic and checksum; magic must be reported first.
        let mut block = test_block(b"x", b'0', 0);
        block[257] = b'X';
        block[0] ^= 0xff;
        let err = Header::from_block(&block).validate().unwrap_err();
        assert!(matches!(err, HeaderError::InvalidMagic(_)));
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut block = test_block(b"x", b'0', 0);
        block[5] ^= 0x01;
        let err = Header::from_block(&block).validate().unwrap_err();
        assert!(matches!(err, HeaderError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_checksum_field_treated_as_spaces() {
        let block = test_block(b"x", b'0', 0);
        let header = Header::from_block(&block);
        let computed = header.compute_checksum();

        // Rewriting the checksum field must not change the computed sum.
        let mut other = block;
        other[148..156].copy_from_slice(b"zzzzzzzz");
        assert_eq!(Header::from_block(&other).compute_checksum(), computed);
    }

    #[test]
    fn test_sentinel() {
        let block = [0u8; BLOCK_SIZE];
        assert!(Header::from_block(&block).is_sentinel());

        let named = test_block(b"a", b'0', 0);
        assert!(!Header::from_block(&named).is_sentinel());
    }

    #[test]
    fn test_entry_type_roundtrip() {
        let types = [
            EntryType::Regular,
            EntryType::Contiguous,
            EntryType::Directory,
            EntryType::Symlink,
            EntryType::Link,
            EntryType::Other(b'6'),
        ];
        for t in types {
            assert_eq!(EntryType::from_byte(t.to_byte()), t);
        }
        // Old tar uses '\0' for regular files
        assert_eq!(EntryType::from_byte(b'\0'), EntryType::Regular);
    }

    #[test]
    fn test_entry_type_predicates() {
        assert!(EntryType::Regular.is_file());
        assert!(EntryType::Contiguous.is_file());
        assert!(!EntryType::Directory.is_file());

        assert!(EntryType::Directory.is_dir());
        assert!(!EntryType::Symlink.is_dir());

        assert!(EntryType::Symlink.is_link());
        assert!(EntryType::Link.is_link());
        assert!(!EntryType::Regular.is_link());
    }

    #[test]
    fn test_parse_octal() {
        assert_eq!(parse_octal(b"0000644\0").unwrap(), 0o644);
        assert_eq!(parse_octal(b"     123 ").unwrap(), 0o123);
        assert_eq!(parse_octal(b"0").unwrap(), 0);
        assert_eq!(parse_octal(b"").unwrap(), 0);
        assert_eq!(parse_octal(b"   \0\0\0").unwrap(), 0);
        assert_eq!(parse_octal(b"77777777777").unwrap(), 0o77777777777);
    }

    #[test]
    fn test_parse_octal_invalid() {
        assert!(parse_octal(b"abc").is_err());
        assert!(parse_octal(b"128").is_err()); // 8 and 9 are not octal
    }

    #[test]
    fn test_truncate_null() {
        assert_eq!(truncate_null(b"hello\0world"), b"hello");
        assert_eq!(truncate_null(b"no null"), b"no null");
        assert_eq!(truncate_null(b"\0start"), b"");
        assert_eq!(truncate_null(b""), b"");
    }

    #[test]
    fn test_link_name_bytes() {
        let mut block = test_block(b"link", b'2', 0);
        block[157..163].copy_from_slice(b"target");
        assert_eq!(Header::from_block(&block).link_name_bytes(), b"target");
    }

    #[test]
    fn test_full_width_name() {
        // A name occupying all 100 bytes has no terminator; the full field
        // is the path.
        let name = [b'n'; 100];
        let block = test_block(&name, b'0', 0);
        assert_eq!(Header::from_block(&block).name_bytes(), &name[..]);
    }
}

//! Archive navigation: validation, lookup, listing and partial reads.
//!
//! The [`Archive`] handle wraps a caller-owned `Read + Seek` stream whose
//! offset 0 is the first archive header. Every public operation rewinds
//! the stream and performs a fresh linear scan; nothing is cached between
//! calls, so each call is independent and re-entrant with respect to the
//! stream position.
//!
//! This re-scan-per-query design is deliberate. Archives inspected with
//! this crate are assumed bounded in size, and the absence of any index
//! means there is no invalidation state to get wrong. An `Archive` takes
//! `&mut self` for every operation, so racing invocations on a single
//! handle are rejected by the borrow checker; callers wanting parallelism
//! open independent handles over the same underlying bytes.
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//! use ustar_nav::nav::Archive;
//!
//! let mut archive = Archive::new(File::open("archive.tar").unwrap());
//!
//! let mut buf = [0u8; 4096];
//! let read = archive.read_file(b"file1.txt", 0, &mut buf).unwrap();
//! println!("{} bytes, {} remaining", read.bytes_written, read.bytes_remaining);
//! ```

mod archive;
mod entry;
mod error;
mod limits;

pub use archive::Archive;
pub use entry::{Entry, FileRead};
pub use error::{NavError, Result};
pub use limits::Limits;

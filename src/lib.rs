//! # rgzip
//!
//! A Rust gzip utility that can also extract the first entry of a PKZIP
//! archive.
//!
//! The deflate transform is delegated to `flate2`. This crate handles the
//! containers around it: it recognises a gzip member or a PKZIP local
//! header, drives the codec over the input in fixed-size chunks, and checks
//! the result against the recorded CRC-32 and length.
//!
//! ## Features
//!
//! - Decompress gzip streams, including concatenated members
//! - Extract the first entry of a ZIP file (STORED or DEFLATE, with or
//!   without a data descriptor)
//! - Compress to gzip, optionally with periodic full flushes (`--rsyncable`)
//! - Encrypted entries and other compression methods are rejected
//!
//! ## Example
//!
//! ```no_run
//! use std::fs::File;
//! use rgzip::{Destination, InputBuffer, unzip};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut input = InputBuffer::new(File::open("archive.zip")?);
//!     let mut stdout = std::io::stdout().lock();
//!     let report = unzip(&mut input, &mut stdout, Destination::PassThrough)?;
//!     eprintln!("{} bytes", report.bytes_out);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod codec;
pub mod compress;
pub mod error;
pub mod gzip;
pub mod io;
pub mod unzip;
pub mod zip;

#[cfg(test)]
mod test_util;

pub use cli::Cli;
pub use compress::{CompressOptions, compress};
pub use error::{Error, IntegrityFailure, Mismatch, Result};
pub use io::InputBuffer;
pub use unzip::{Destination, Report, StreamContext, unzip};

//! Decompression of gzip streams and of the first entry of a PKZIP archive.
//!
//! Each entry goes through the same four steps, strictly in order:
//!
//! 1. the header at the cursor is parsed into a neutral [`StreamContext`],
//! 2. the entry data is run through a [`CodecSession`] chosen by the
//!    [`Container`] variant,
//! 3. the running CRC-32 and length are checked against the header or the
//!    trailer that follows the data,
//! 4. for PKZIP, the input is checked for a second entry.
//!
//! The context is reset after every entry whatever the outcome, so nothing
//! carries over into the next gzip member or the next call.

mod continuation;
mod validate;

pub use continuation::{Destination, check_continuation};
pub use validate::{Expected, read_expected, validate};

use std::io::{Read, Write};

use log::debug;

use crate::codec::{CodecSession, Inflater, Stored, Transfer};
use crate::gzip::{MemberHeader, is_gzip_magic};
use crate::io::{InputBuffer, TrackingWriter};
use crate::zip::{CompressionMethod, LocalFileHeader, is_local_header, read_local_header};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContainerKind {
    #[default]
    Gzip,
    Pkzip,
}

/// Container and method of one entry, which fixes both the engine and where
/// the recorded CRC and length are found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Gzip,
    PkzipStored,
    PkzipDeflated,
}

/// State of the entry being decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamContext {
    pub kind: ContainerKind,
    pub method: CompressionMethod,
    /// CRC and lengths follow the data in a data descriptor.
    pub ext_header: bool,
    pub header: Option<LocalFileHeader>,
    pub crc32: u32,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl Default for StreamContext {
    fn default() -> Self {
        Self {
            kind: ContainerKind::Gzip,
            method: CompressionMethod::Deflate,
            ext_header: false,
            header: None,
            crc32: 0,
            bytes_in: 0,
            bytes_out: 0,
        }
    }
}

impl StreamContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to the neutral state: gzip, deflated, no flags, zero counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn container(&self) -> Container {
        match (self.kind, self.method) {
            (ContainerKind::Gzip, _) => Container::Gzip,
            (ContainerKind::Pkzip, CompressionMethod::Stored) => Container::PkzipStored,
            (ContainerKind::Pkzip, _) => Container::PkzipDeflated,
        }
    }

    /// Parse the header at the cursor, PKZIP or gzip, into this context.
    pub fn read_header<R: Read>(&mut self, input: &mut InputBuffer<R>) -> Result<()> {
        input.fill_to(4)?;
        if !is_local_header(input.staged()) {
            MemberHeader::read(input)?;
            self.kind = ContainerKind::Gzip;
            self.method = CompressionMethod::Deflate;
            return Ok(());
        }

        let header = read_local_header(input)?;
        self.ext_header = header.flags.has_data_descriptor();
        if header.compression_method == CompressionMethod::Stored {
            if self.ext_header {
                return Err(Error::Format("stored entry with data descriptor -- use unzip"));
            }
            if header.compressed_size != header.uncompressed_size {
                debug!(
                    "len {}, siz {}",
                    header.uncompressed_size, header.compressed_size
                );
                return Err(Error::Format("invalid compressed data--length mismatch"));
            }
        }
        self.kind = ContainerKind::Pkzip;
        self.method = header.compression_method;
        self.header = Some(header);
        Ok(())
    }

    fn stored_length(&self) -> u64 {
        self.header
            .as_ref()
            .map_or(0, |h| h.uncompressed_size as u64)
    }
}

/// Totals over everything decoded by one [`unzip`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Report {
    /// gzip members, or 1 for a PKZIP archive.
    pub members: usize,
    /// Compressed bytes consumed by the codec.
    pub bytes_in: u64,
    pub bytes_out: u64,
    /// The archive had further entries that were not extracted.
    pub extra_entries_ignored: bool,
    /// Non-zero bytes after the last gzip member.
    pub trailing_garbage: bool,
}

impl Report {
    pub fn has_warnings(&self) -> bool {
        self.extra_entries_ignored || self.trailing_garbage
    }
}

/// Parse and decode the entry at the cursor.
///
/// Returns whether further PKZIP entries were found and ignored.
fn unzip_entry<R: Read, W: Write>(
    ctx: &mut StreamContext,
    input: &mut InputBuffer<R>,
    output: &mut W,
    destination: Destination,
) -> Result<bool> {
    ctx.read_header(input)?;

    let mut sink = TrackingWriter::new(output);
    let transfer: Transfer = match ctx.container() {
        Container::Gzip | Container::PkzipDeflated => {
            CodecSession::new(Inflater::new()).decompress(input, &mut sink)?
        }
        Container::PkzipStored => {
            CodecSession::new(Stored::new(ctx.stored_length())).decompress(input, &mut sink)?
        }
    };
    ctx.crc32 = sink.crc32();
    ctx.bytes_out = sink.byte_count();
    ctx.bytes_in = transfer.bytes_in;

    let expected = read_expected(ctx, input)?;
    validate(expected, ctx.crc32, ctx.bytes_out)?;

    match ctx.kind {
        ContainerKind::Pkzip => check_continuation(input, destination),
        ContainerKind::Gzip => Ok(false),
    }
}

enum Next {
    Member,
    End,
    Garbage,
}

fn next_member<R: Read>(input: &mut InputBuffer<R>) -> Result<Next> {
    input.fill_to(2)?;
    let staged = input.staged();
    if staged.is_empty() {
        Ok(Next::End)
    } else if is_gzip_magic(staged) {
        Ok(Next::Member)
    } else if staged.iter().all(|&b| b == 0) {
        debug!("ignoring {} bytes of zero padding", staged.len());
        Ok(Next::End)
    } else {
        Ok(Next::Garbage)
    }
}

/// Decompress the stream in `input` into `output`.
///
/// A gzip stream may hold several members, which are concatenated into the
/// output. For PKZIP only the first entry is extracted; what happens when
/// more follow depends on `destination`.
pub fn unzip<R: Read, W: Write>(
    input: &mut InputBuffer<R>,
    output: &mut W,
    destination: Destination,
) -> Result<Report> {
    let mut ctx = StreamContext::new();
    let mut report = Report::default();

    loop {
        let result = unzip_entry(&mut ctx, input, output, destination);
        let kind = ctx.kind;
        let (bytes_in, bytes_out) = (ctx.bytes_in, ctx.bytes_out);
        ctx.reset();
        let extra_entries = result?;

        report.members += 1;
        report.bytes_in += bytes_in;
        report.bytes_out += bytes_out;

        if kind == ContainerKind::Pkzip {
            report.extra_entries_ignored = extra_entries;
            break;
        }
        match next_member(input)? {
            Next::Member => continue,
            Next::End => break,
            Next::Garbage => {
                debug!("trailing garbage after gzip member {}", report.members);
                report.trailing_garbage = true;
                break;
            }
        }
    }

    output.flush()?;
    Ok(report)
}

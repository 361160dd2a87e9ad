//! PKZIP local header and data descriptor parsing over the read-ahead buffer.
//!
//! Both readers look only at staged bytes and move the cursor past what they
//! decoded. A header whose name and extra fields extend past the staged data
//! is rejected rather than read out of bounds.

use std::io::Read;

use log::{debug, warn};

use crate::io::InputBuffer;
use crate::{Error, Result};

use super::structures::*;

/// Whether the staged bytes start with a local header signature.
pub fn is_local_header(staged: &[u8]) -> bool {
    staged.starts_with(LFH_SIGNATURE)
}

/// Parse the local header at the cursor and advance to the entry data.
///
/// # Errors
///
/// - [`Error::Format`] on a bad signature or a header overrunning the input
/// - [`Error::UnsupportedEncryption`] when the encrypted bit is set, whatever
///   the method
/// - [`Error::UnsupportedMethod`] for anything but stored or deflated
pub fn read_local_header<R: Read>(input: &mut InputBuffer<R>) -> Result<LocalFileHeader> {
    input.fill_to(LFH_SIZE)?;
    let span = LocalFileHeader::span(input.staged())?;
    input.fill_to(span)?;
    let header = LocalFileHeader::from_bytes(input.staged())?;

    if header.flags.is_encrypted() {
        return Err(Error::UnsupportedEncryption);
    }
    if let CompressionMethod::Unknown(method) = header.compression_method {
        return Err(Error::UnsupportedMethod(method));
    }

    debug!(
        "zip entry {:?}: method {}, flags {:#06x}, {} -> {} bytes, header {} bytes",
        header.file_name,
        header.compression_method.as_u16(),
        header.flags.0,
        header.compressed_size,
        header.uncompressed_size,
        header.span_len()
    );
    input.advance(header.span_len());
    Ok(header)
}

/// Read the data descriptor that follows an entry's compressed data.
///
/// The signed 16 byte form is expected; a descriptor without the signature
/// is accepted as the 12 byte form.
pub fn read_data_descriptor<R: Read>(input: &mut InputBuffer<R>) -> Result<DataDescriptor> {
    input.fill_to(DataDescriptor::SIZE)?;
    let staged = input.staged();

    let (descriptor, len) = if staged.starts_with(DataDescriptor::SIGNATURE) {
        if staged.len() < DataDescriptor::SIZE {
            return Err(Error::Format("truncated data descriptor"));
        }
        (DataDescriptor::from_fields(&staged[4..DataDescriptor::SIZE])?, DataDescriptor::SIZE)
    } else {
        warn!("data descriptor without signature");
        (DataDescriptor::from_fields(staged)?, DataDescriptor::UNSIGNED_SIZE)
    };

    input.advance(len);
    Ok(descriptor)
}

use std::io::Read;

use crate::error::{IntegrityFailure, Mismatch};
use crate::gzip::MemberFooter;
use crate::io::InputBuffer;
use crate::zip::read_data_descriptor;
use crate::{Error, Result};

use super::{ContainerKind, StreamContext};

/// CRC-32 and length recorded by the writer of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expected {
    pub crc32: u32,
    /// Uncompressed length mod 2^32.
    pub length: u32,
}

/// Locate the recorded values for the entry just decoded.
///
/// For gzip members and PKZIP entries with a data descriptor this consumes
/// the trailer that follows the compressed data; otherwise the values come
/// from the local header already stored in `ctx`.
pub fn read_expected<R: Read>(ctx: &StreamContext, input: &mut InputBuffer<R>) -> Result<Expected> {
    match ctx.kind {
        ContainerKind::Gzip => {
            let footer = MemberFooter::read(input)?;
            Ok(Expected {
                crc32: footer.data_crc32,
                length: footer.data_size,
            })
        }
        ContainerKind::Pkzip if ctx.ext_header => {
            let descriptor = read_data_descriptor(input)?;
            Ok(Expected {
                crc32: descriptor.crc32,
                length: descriptor.uncompressed_size,
            })
        }
        ContainerKind::Pkzip => {
            let header = ctx
                .header
                .as_ref()
                .ok_or(Error::Format("missing local header"))?;
            Ok(Expected {
                crc32: header.crc32,
                length: header.uncompressed_size,
            })
        }
    }
}

/// Compare the running CRC and byte count against the recorded values.
///
/// Both checks are made; a failure reports every check that did not match.
pub fn validate(expected: Expected, crc32: u32, bytes_out: u64) -> Result<()> {
    let length = (bytes_out & 0xffff_ffff) as u32;
    let failure = IntegrityFailure {
        crc: (expected.crc32 != crc32).then_some(Mismatch {
            expected: expected.crc32,
            actual: crc32,
        }),
        length: (expected.length != length).then_some(Mismatch {
            expected: expected.length,
            actual: length,
        }),
    };
    if failure.is_empty() {
        Ok(())
    } else {
        Err(Error::Integrity(failure))
    }
}

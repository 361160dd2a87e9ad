//! Compression side: always a single gzip member with a deflated payload.

use std::io::{Read, Write};

use log::debug;

use crate::codec::{CodecSession, Deflater, Flush, Transfer};
use crate::gzip::{MemberFooter, MemberHeader};
use crate::io::TrackingReader;
use crate::Result;

pub const DEFAULT_LEVEL: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressOptions {
    /// 0 (store) to 9 (best).
    pub level: u32,
    /// Full-flush after every input chunk so the output can be
    /// resynchronised (`--rsyncable`).
    pub rsyncable: bool,
    /// Original file name recorded in the header.
    pub name: Option<Vec<u8>>,
    /// Seconds since the epoch; 0 means unknown.
    pub modification_time: u32,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            rsyncable: false,
            name: None,
            modification_time: 0,
        }
    }
}

/// Compress all of `input` into one gzip member written to `output`.
///
/// `bytes_in` of the result counts uncompressed input, `bytes_out`
/// everything written including header and trailer.
pub fn compress<R: Read, W: Write>(
    input: R,
    output: &mut W,
    options: &CompressOptions,
) -> Result<Transfer> {
    let header = MemberHeader::for_level(
        options.level,
        options.modification_time,
        options.name.clone(),
    );
    let header_bytes = header.write_to(output)?;

    let flush = if options.rsyncable {
        Flush::Full
    } else {
        Flush::None
    };
    let mut src = TrackingReader::new(input);
    let transfer =
        CodecSession::new(Deflater::new(options.level)).compress(&mut src, output, flush)?;

    MemberFooter {
        data_crc32: src.crc32(),
        data_size: (src.byte_count() & 0xffff_ffff) as u32,
    }
    .write_to(output)?;
    output.flush()?;

    debug!(
        "compressed {} -> {} bytes (header {})",
        src.byte_count(),
        transfer.bytes_out,
        header_bytes
    );
    Ok(Transfer {
        bytes_in: src.byte_count(),
        bytes_out: header_bytes + transfer.bytes_out + MemberFooter::SIZE as u64,
    })
}

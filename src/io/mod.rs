mod input;
mod tracking;

pub use input::{INBUF_SIZE, InputBuffer};
pub use tracking::{CRC32, TrackingReader, TrackingWriter};

use std::io::{ErrorKind, Read, Result};

/// Single `read` call that retries on `Interrupted`.
pub(crate) fn read_chunk<R: Read + ?Sized>(src: &mut R, buf: &mut [u8]) -> Result<usize> {
    loop {
        match src.read(buf) {
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}

/// Read until `buf` is full or the source reports end of file.
pub(crate) fn read_full<R: Read + ?Sized>(src: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match read_chunk(src, &mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

use std::io::{self, Read, Write};

use crc::{CRC_32_ISO_HDLC, Crc, Digest};

/// CRC-32 as used by gzip and PKZIP.
pub static CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Writer that keeps a running CRC-32 and byte count of what it forwards.
pub struct TrackingWriter<T> {
    digest: Digest<'static, u32>,
    inner: T,
    byte_n: u64,
}

impl<T: Write> Write for TrackingWriter<T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.digest.update(&buf[..size]);
        self.byte_n += size as u64;
        Ok(size)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<T: Write> TrackingWriter<T> {
    pub fn new(inner: T) -> Self {
        Self {
            digest: CRC32.digest(),
            inner,
            byte_n: 0,
        }
    }

    pub fn byte_count(&self) -> u64 {
        self.byte_n
    }

    pub fn crc32(&self) -> u32 {
        self.digest.clone().finalize()
    }
}

/// Reader counterpart of [`TrackingWriter`], used on the compression side.
pub struct TrackingReader<T> {
    digest: Digest<'static, u32>,
    inner: T,
    byte_n: u64,
}

impl<T: Read> Read for TrackingReader<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let size = self.inner.read(buf)?;
        self.digest.update(&buf[..size]);
        self.byte_n += size as u64;
        Ok(size)
    }
}

impl<T: Read> TrackingReader<T> {
    pub fn new(inner: T) -> Self {
        Self {
            digest: CRC32.digest(),
            inner,
            byte_n: 0,
        }
    }

    pub fn byte_count(&self) -> u64 {
        self.byte_n
    }

    pub fn crc32(&self) -> u32 {
        self.digest.clone().finalize()
    }
}

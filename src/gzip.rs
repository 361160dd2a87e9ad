//! gzip member framing (RFC 1952): header validation and emission, plus the
//! 8 byte trailer.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use crc::Digest;
use log::debug;

use crate::io::{CRC32, InputBuffer};
use crate::{Error, Result};

////////////////////////////////////////////////////////////////////////////////

pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

const CM_DEFLATE: u8 = 8;

const FTEXT_OFFSET: u8 = 0;
const FHCRC_OFFSET: u8 = 1;
const FEXTRA_OFFSET: u8 = 2;
const FNAME_OFFSET: u8 = 3;
const FCOMMENT_OFFSET: u8 = 4;
/// Set by old encrypting gzip variants.
const FENCRYPTED_OFFSET: u8 = 5;
const RESERVED_MASK: u8 = 0xc0;

/// XFL values for the slowest and fastest levels.
pub const XFL_SLOW: u8 = 2;
pub const XFL_FAST: u8 = 4;

pub const OS_UNIX: u8 = 3;

pub fn is_gzip_magic(staged: &[u8]) -> bool {
    staged.starts_with(&GZIP_MAGIC)
}

////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemberFlags(u8);

impl MemberFlags {
    fn bit(&self, n: u8) -> bool {
        (self.0 >> n) & 1 != 0
    }

    fn set_bit(&mut self, n: u8, value: bool) {
        if value {
            self.0 |= 1 << n;
        } else {
            self.0 &= !(1 << n);
        }
    }

    pub fn is_text(&self) -> bool {
        self.bit(FTEXT_OFFSET)
    }

    pub fn has_crc(&self) -> bool {
        self.bit(FHCRC_OFFSET)
    }

    pub fn has_extra(&self) -> bool {
        self.bit(FEXTRA_OFFSET)
    }

    pub fn has_name(&self) -> bool {
        self.bit(FNAME_OFFSET)
    }

    pub fn set_has_name(&mut self, value: bool) {
        self.set_bit(FNAME_OFFSET, value)
    }

    pub fn has_comment(&self) -> bool {
        self.bit(FCOMMENT_OFFSET)
    }

    pub fn is_encrypted(&self) -> bool {
        self.bit(FENCRYPTED_OFFSET)
    }
}

////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberHeader {
    pub flags: MemberFlags,
    pub modification_time: u32,
    pub extra_flags: u8,
    pub os: u8,
    pub extra: Option<Vec<u8>>,
    pub name: Option<Vec<u8>>,
    pub comment: Option<Vec<u8>>,
}

/// Reader that feeds every byte it passes through into a CRC-32.
struct Hashing<'a, R> {
    inner: &'a mut R,
    digest: Digest<'static, u32>,
}

impl<R: Read> Read for Hashing<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.digest.update(&buf[..n]);
        Ok(n)
    }
}

fn read_zero_terminated<R: Read>(rdr: &mut R) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    loop {
        match rdr.read_u8()? {
            0 => return Ok(bytes),
            b => bytes.push(b),
        }
    }
}

/// Truncated headers surface as format errors rather than bare I/O errors.
fn truncated(e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        Error::Format("unexpected end of file")
    } else {
        Error::Io(e)
    }
}

impl MemberHeader {
    /// Header written by the compressor for a given level.
    pub fn for_level(level: u32, modification_time: u32, name: Option<Vec<u8>>) -> Self {
        let mut flags = MemberFlags::default();
        flags.set_has_name(name.is_some());
        let extra_flags = match level {
            9 => XFL_SLOW,
            1 => XFL_FAST,
            _ => 0,
        };
        Self {
            flags,
            modification_time,
            extra_flags,
            os: OS_UNIX,
            extra: None,
            name,
            comment: None,
        }
    }

    /// Validate and consume a member header at the cursor.
    pub fn read<R: Read>(input: &mut InputBuffer<R>) -> Result<Self> {
        input.fill_to(GZIP_MAGIC.len())?;
        if !is_gzip_magic(input.staged()) {
            return Err(Error::Format("not in gzip format"));
        }

        let mut rdr = Hashing {
            inner: input,
            digest: CRC32.digest(),
        };
        Self::read_fields(&mut rdr).map_err(|e| match e {
            Error::Io(e) => truncated(e),
            other => other,
        })
    }

    fn read_fields<R: Read>(rdr: &mut Hashing<'_, R>) -> Result<Self> {
        rdr.read_u16::<LittleEndian>()?;
        let method = rdr.read_u8()?;
        let flags = MemberFlags(rdr.read_u8()?);

        if flags.is_encrypted() {
            return Err(Error::UnsupportedEncryption);
        }
        if method != CM_DEFLATE {
            return Err(Error::UnsupportedMethod(method as u16));
        }
        if flags.0 & RESERVED_MASK != 0 {
            return Err(Error::Format("has flags 0x40/0x80 -- get newer version of gzip"));
        }

        let modification_time = rdr.read_u32::<LittleEndian>()?;
        let extra_flags = rdr.read_u8()?;
        let os = rdr.read_u8()?;

        let extra = if flags.has_extra() {
            let len = rdr.read_u16::<LittleEndian>()?;
            let mut extra = vec![0u8; len as usize];
            rdr.read_exact(&mut extra)?;
            Some(extra)
        } else {
            None
        };
        let name = if flags.has_name() {
            Some(read_zero_terminated(rdr)?)
        } else {
            None
        };
        let comment = if flags.has_comment() {
            Some(read_zero_terminated(rdr)?)
        } else {
            None
        };

        if flags.has_crc() {
            let computed = (rdr.digest.clone().finalize() & 0xffff) as u16;
            let stored = rdr.inner.read_u16::<LittleEndian>()?;
            if stored != computed {
                return Err(Error::Format("header crc16 check failed"));
            }
        }

        let header = Self {
            flags,
            modification_time,
            extra_flags,
            os,
            extra,
            name,
            comment,
        };
        debug!(
            "gzip member: flags {:#04x}, mtime {}, os {}, name {:?}",
            header.flags.0,
            header.modification_time,
            header.os,
            header.name.as_deref().map(String::from_utf8_lossy)
        );
        Ok(header)
    }

    /// Serialise the header; returns its length.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<u64> {
        let mut bytes = Vec::with_capacity(10);
        bytes.extend_from_slice(&GZIP_MAGIC);
        bytes.write_u8(CM_DEFLATE)?;
        bytes.write_u8(self.flags.0)?;
        bytes.write_u32::<LittleEndian>(self.modification_time)?;
        bytes.write_u8(self.extra_flags)?;
        bytes.write_u8(self.os)?;
        if let Some(extra) = self.extra.as_ref().filter(|_| self.flags.has_extra()) {
            bytes.write_u16::<LittleEndian>(extra.len() as u16)?;
            bytes.extend_from_slice(extra);
        }
        let texts = [
            (self.flags.has_name(), &self.name),
            (self.flags.has_comment(), &self.comment),
        ];
        for (present, field) in texts {
            if let (true, Some(text)) = (present, field) {
                bytes.extend(text.iter().copied().filter(|&b| b != 0));
                bytes.push(0);
            }
        }
        if self.flags.has_crc() {
            let crc = (CRC32.checksum(&bytes) & 0xffff) as u16;
            bytes.write_u16::<LittleEndian>(crc)?;
        }
        out.write_all(&bytes)?;
        Ok(bytes.len() as u64)
    }
}

////////////////////////////////////////////////////////////////////////////////

/// CRC-32 and length (mod 2^32) of the uncompressed data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberFooter {
    pub data_crc32: u32,
    pub data_size: u32,
}

impl MemberFooter {
    pub const SIZE: usize = 8;

    pub fn read<R: Read>(input: &mut InputBuffer<R>) -> Result<Self> {
        let mut raw = [0u8; Self::SIZE];
        input.read_exact(&mut raw).map_err(truncated)?;
        let mut rdr = &raw[..];
        Ok(Self {
            data_crc32: rdr.read_u32::<LittleEndian>()?,
            data_size: rdr.read_u32::<LittleEndian>()?,
        })
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_u32::<LittleEndian>(self.data_crc32)?;
        out.write_u32::<LittleEndian>(self.data_size)?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////

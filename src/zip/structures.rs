use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use crate::{Error, Result};

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

/// General purpose bit flags of a local header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryFlags(pub u16);

impl EntryFlags {
    pub const ENCRYPTED: u16 = 1 << 0;
    pub const DATA_DESCRIPTOR: u16 = 1 << 3;

    pub fn is_encrypted(&self) -> bool {
        self.0 & Self::ENCRYPTED != 0
    }

    /// CRC and sizes follow the entry data instead of living in the header.
    pub fn has_data_descriptor(&self) -> bool {
        self.0 & Self::DATA_DESCRIPTOR != 0
    }
}

/// Local File Header (LFH) - 30 bytes
pub const LFH_SIGNATURE: &[u8] = b"PK\x03\x04";
pub const LFH_SIZE: usize = 30;

/// Offsets of the two variable-length field sizes inside the fixed prefix.
const LFH_FILE_NAME_LEN: usize = 26;
const LFH_EXTRA_LEN: usize = 28;

/// Fixed part of a PKZIP local header plus the entry name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileHeader {
    pub version_needed: u16,
    pub flags: EntryFlags,
    pub compression_method: CompressionMethod,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name: String,
    pub file_name_length: u16,
    pub extra_field_length: u16,
}

impl LocalFileHeader {
    /// Total length of the header: fixed prefix, name and extra field.
    ///
    /// Only needs the fixed prefix; fails if fewer than [`LFH_SIZE`] bytes
    /// are given.
    pub fn span(data: &[u8]) -> Result<usize> {
        if data.len() < LFH_SIZE {
            return Err(Error::Format("not a valid zip file"));
        }
        let name_len = u16::from_le_bytes([data[LFH_FILE_NAME_LEN], data[LFH_FILE_NAME_LEN + 1]]);
        let extra_len = u16::from_le_bytes([data[LFH_EXTRA_LEN], data[LFH_EXTRA_LEN + 1]]);
        Ok(LFH_SIZE + name_len as usize + extra_len as usize)
    }

    /// Decode a complete header. `data` may extend past the header.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let span = Self::span(data)?;
        if span > data.len() || &data[0..4] != LFH_SIGNATURE {
            return Err(Error::Format("not a valid zip file"));
        }

        let mut cursor = Cursor::new(&data[4..LFH_SIZE]);
        let version_needed = cursor.read_u16::<LittleEndian>()?;
        let flags = EntryFlags(cursor.read_u16::<LittleEndian>()?);
        let compression_method = CompressionMethod::from_u16(cursor.read_u16::<LittleEndian>()?);
        let last_mod_time = cursor.read_u16::<LittleEndian>()?;
        let last_mod_date = cursor.read_u16::<LittleEndian>()?;
        let crc32 = cursor.read_u32::<LittleEndian>()?;
        let compressed_size = cursor.read_u32::<LittleEndian>()?;
        let uncompressed_size = cursor.read_u32::<LittleEndian>()?;
        let file_name_length = cursor.read_u16::<LittleEndian>()?;
        let extra_field_length = cursor.read_u16::<LittleEndian>()?;

        // Use lossy conversion to handle non-UTF8 filenames gracefully
        let name_end = LFH_SIZE + file_name_length as usize;
        let file_name = String::from_utf8_lossy(&data[LFH_SIZE..name_end]).to_string();

        Ok(Self {
            version_needed,
            flags,
            compression_method,
            last_mod_time,
            last_mod_date,
            crc32,
            compressed_size,
            uncompressed_size,
            file_name,
            file_name_length,
            extra_field_length,
        })
    }

    /// Bytes from the signature to the first byte of entry data.
    pub fn span_len(&self) -> usize {
        LFH_SIZE + self.file_name_length as usize + self.extra_field_length as usize
    }
}

/// Data descriptor ("extended local header") - 16 bytes with signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataDescriptor {
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
}

impl DataDescriptor {
    pub const SIGNATURE: &'static [u8] = b"PK\x07\x08";
    pub const SIZE: usize = 16;
    /// Size of the variant written without a signature.
    pub const UNSIGNED_SIZE: usize = 12;

    /// Decode the fields following the signature (or the whole unsigned form).
    pub fn from_fields(data: &[u8]) -> Result<Self> {
        if data.len() < Self::UNSIGNED_SIZE {
            return Err(Error::Format("truncated data descriptor"));
        }
        let mut cursor = Cursor::new(data);
        Ok(Self {
            crc32: cursor.read_u32::<LittleEndian>()?,
            compressed_size: cursor.read_u32::<LittleEndian>()?,
            uncompressed_size: cursor.read_u32::<LittleEndian>()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_util::local_header;

    fn header(flags: u16, method: u16, name: &[u8], extra: &[u8]) -> Vec<u8> {
        local_header(flags, method, 0x1122_3344, 7, 9, name, extra)
    }

    #[test]
    fn span_matches_data_offset() -> anyhow::Result<()> {
        let mut data = header(0, 8, b"hello.txt", b"\x01\x02\x03");
        let offset = data.len();
        data.extend_from_slice(b"entry data");
        assert_eq!(LocalFileHeader::span(&data)?, offset);
        let h = LocalFileHeader::from_bytes(&data)?;
        assert_eq!(h.span_len(), offset);
        assert_eq!(h.file_name, "hello.txt");
        assert_eq!(h.compression_method, CompressionMethod::Deflate);
        assert_eq!(h.crc32, 0x1122_3344);
        assert_eq!(h.compressed_size, 7);
        assert_eq!(h.uncompressed_size, 9);
        Ok(())
    }

    #[test]
    fn overrunning_span_is_rejected() {
        let mut data = header(0, 8, b"name", b"");
        data.truncate(LFH_SIZE + 2);
        assert!(matches!(
            LocalFileHeader::from_bytes(&data),
            Err(Error::Format(_))
        ));
        assert!(matches!(
            LocalFileHeader::span(&data[..10]),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn flags() {
        assert!(EntryFlags(0x0001).is_encrypted());
        assert!(EntryFlags(0x0008).has_data_descriptor());
        assert!(!EntryFlags(0x0800).has_data_descriptor());
    }

    #[test]
    fn descriptor_fields() -> anyhow::Result<()> {
        let mut raw = Vec::new();
        for v in [0xcafe_f00du32, 12, 34] {
            raw.extend_from_slice(&v.to_le_bytes());
        }
        let d = DataDescriptor::from_fields(&raw)?;
        assert_eq!(d.crc32, 0xcafe_f00d);
        assert_eq!(d.uncompressed_size, 34);
        assert!(DataDescriptor::from_fields(&raw[..8]).is_err());
        Ok(())
    }
}

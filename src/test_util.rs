//! Fixture builders shared by the unit tests.

use std::io::Write;

use crate::io::CRC32;
use crate::zip::{DataDescriptor, LFH_SIGNATURE};

pub fn crc32(data: &[u8]) -> u32 {
    CRC32.checksum(data)
}

pub fn deflate_raw(data: &[u8]) -> Vec<u8> {
    let mut enc = flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

/// Some text with a little noise, so it compresses but not trivially.
pub fn sample(len: usize) -> Vec<u8> {
    let mut state = 0x2545_f491u32;
    (0..len)
        .map(|i| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            if i % 5 == 0 { state as u8 } else { b"the quick brown fox "[i % 20] }
        })
        .collect()
}

pub fn local_header(
    flags: u16,
    method: u16,
    crc: u32,
    compressed: u32,
    uncompressed: u32,
    name: &[u8],
    extra: &[u8],
) -> Vec<u8> {
    let mut h = Vec::new();
    h.extend_from_slice(LFH_SIGNATURE);
    h.extend_from_slice(&20u16.to_le_bytes());
    h.extend_from_slice(&flags.to_le_bytes());
    h.extend_from_slice(&method.to_le_bytes());
    h.extend_from_slice(&[0; 4]);
    h.extend_from_slice(&crc.to_le_bytes());
    h.extend_from_slice(&compressed.to_le_bytes());
    h.extend_from_slice(&uncompressed.to_le_bytes());
    h.extend_from_slice(&(name.len() as u16).to_le_bytes());
    h.extend_from_slice(&(extra.len() as u16).to_le_bytes());
    h.extend_from_slice(name);
    h.extend_from_slice(extra);
    h
}

/// One complete PKZIP entry: local header, payload and, with
/// `descriptor`, a signed data descriptor.
pub fn zip_entry(name: &str, data: &[u8], method: u16, descriptor: bool) -> Vec<u8> {
    let payload = if method == 8 { deflate_raw(data) } else { data.to_vec() };
    let crc = crc32(data);
    let (flags, hcrc, hcsize, hsize) = if descriptor {
        (0x0008, 0, 0, 0)
    } else {
        (0, crc, payload.len() as u32, data.len() as u32)
    };
    let mut entry = local_header(flags, method, hcrc, hcsize, hsize, name.as_bytes(), b"");
    entry.extend_from_slice(&payload);
    if descriptor {
        entry.extend_from_slice(DataDescriptor::SIGNATURE);
        entry.extend_from_slice(&crc.to_le_bytes());
        entry.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        entry.extend_from_slice(&(data.len() as u32).to_le_bytes());
    }
    entry
}

/// Empty end-of-central-directory record, as found after the last entry.
pub fn end_record() -> Vec<u8> {
    let mut eocd = b"PK\x05\x06".to_vec();
    eocd.extend_from_slice(&[0; 18]);
    eocd
}

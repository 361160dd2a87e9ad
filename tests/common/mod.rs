#![allow(dead_code)]

use std::io::Write;

use crc::{CRC_32_ISO_HDLC, Crc};

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

pub fn text(len: usize) -> Vec<u8> {
    b"It was the best of times, it was the worst of times. "
        .iter()
        .cycle()
        .take(len)
        .copied()
        .collect()
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::best());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

/// A deflated PKZIP entry with sizes and CRC in the local header.
pub fn zip_entry(name: &str, data: &[u8]) -> Vec<u8> {
    let mut enc = flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
    enc.write_all(data).unwrap();
    let payload = enc.finish().unwrap();

    let mut entry = b"PK\x03\x04".to_vec();
    entry.extend_from_slice(&20u16.to_le_bytes());
    entry.extend_from_slice(&0u16.to_le_bytes());
    entry.extend_from_slice(&8u16.to_le_bytes());
    entry.extend_from_slice(&[0; 4]);
    entry.extend_from_slice(&CRC32.checksum(data).to_le_bytes());
    entry.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    entry.extend_from_slice(&(data.len() as u32).to_le_bytes());
    entry.extend_from_slice(&(name.len() as u16).to_le_bytes());
    entry.extend_from_slice(&0u16.to_le_bytes());
    entry.extend_from_slice(name.as_bytes());
    entry.extend_from_slice(&payload);
    entry
}

pub fn zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut archive = Vec::new();
    for (name, data) in entries {
        archive.extend_from_slice(&zip_entry(name, data));
    }
    archive.extend_from_slice(b"PK\x05\x06");
    archive.extend_from_slice(&[0; 18]);
    archive
}

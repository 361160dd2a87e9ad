//! Error type shared by every stage of the decode and encode pipelines.

use std::fmt;
use std::io;

use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while processing one stream.
///
/// None of these are retried. [`Error::CodecMemory`] is additionally
/// [fatal](Error::is_fatal): callers should stop processing further files.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad signature, truncated header or a header that overruns the staged input.
    #[error("{0}")]
    Format(&'static str),

    /// Compression method other than stored (0) or deflated (8).
    #[error("first entry not deflated or stored (method {0}) -- use unzip")]
    UnsupportedMethod(u16),

    /// Encrypted entries are rejected, never decrypted.
    #[error("encrypted file -- not supported")]
    UnsupportedEncryption,

    /// Malformed compressed stream, including a stream that ends early.
    #[error("invalid compressed data--format violated ({0})")]
    CodecData(String),

    /// The codec engine failed to allocate its state.
    #[error("memory exhausted")]
    CodecMemory,

    /// The codec engine reported corrupted internal state.
    #[error("internal codec error: {0}")]
    CodecState(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    /// CRC and/or length check failed after a structurally complete decode.
    #[error("invalid compressed data--{0}")]
    Integrity(IntegrityFailure),

    /// A second PKZIP entry follows and the source would be replaced.
    #[error("has more than one entry -- unchanged")]
    MultipleEntries,
}

impl Error {
    /// Resource exhaustion rather than bad input.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::CodecMemory)
    }
}

/// An expected/actual pair from a failed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    pub expected: u32,
    pub actual: u32,
}

/// Outcome of the integrity checks when at least one of them failed.
///
/// Both checks are always evaluated, so both can be present at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegrityFailure {
    pub crc: Option<Mismatch>,
    pub length: Option<Mismatch>,
}

impl IntegrityFailure {
    pub fn is_empty(&self) -> bool {
        self.crc.is_none() && self.length.is_none()
    }
}

impl fmt::Display for IntegrityFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        if let Some(m) = self.crc {
            write!(
                f,
                "crc error (stored {:08x}, computed {:08x})",
                m.expected, m.actual
            )?;
            first = false;
        }
        if let Some(m) = self.length {
            if !first {
                f.write_str(", ")?;
            }
            write!(
                f,
                "length error (stored {}, computed {})",
                m.expected, m.actual
            )?;
        }
        Ok(())
    }
}

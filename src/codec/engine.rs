use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress};

use super::{CodecEngine, Flush, Status, StepOutcome};
use crate::{Error, Result};

fn outcome(before: (u64, u64), after: (u64, u64), status: flate2::Status) -> StepOutcome {
    StepOutcome {
        consumed: (after.0 - before.0) as usize,
        produced: (after.1 - before.1) as usize,
        status: match status {
            flate2::Status::StreamEnd => Status::StreamEnd,
            flate2::Status::Ok | flate2::Status::BufError => Status::Ok,
        },
    }
}

/// Raw deflate decoder (no zlib or gzip wrapper).
pub struct Inflater {
    inner: Decompress,
}

impl Inflater {
    pub fn new() -> Self {
        Self {
            inner: Decompress::new(false),
        }
    }
}

impl Default for Inflater {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecEngine for Inflater {
    fn step(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Result<StepOutcome> {
        let flush = match flush {
            Flush::Finish => FlushDecompress::Finish,
            Flush::Full => FlushDecompress::Sync,
            Flush::None => FlushDecompress::None,
        };
        let before = (self.inner.total_in(), self.inner.total_out());
        let status = self
            .inner
            .decompress(input, output, flush)
            .map_err(|e| Error::CodecData(e.to_string()))?;
        let after = (self.inner.total_in(), self.inner.total_out());
        Ok(outcome(before, after, status))
    }
}

/// Raw deflate encoder (no zlib or gzip wrapper).
pub struct Deflater {
    inner: Compress,
}

impl Deflater {
    /// `level` is clamped to 0..=9.
    pub fn new(level: u32) -> Self {
        Self {
            inner: Compress::new(Compression::new(level.min(9)), false),
        }
    }
}

impl CodecEngine for Deflater {
    fn step(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Result<StepOutcome> {
        let flush = match flush {
            Flush::Finish => FlushCompress::Finish,
            Flush::Full => FlushCompress::Full,
            Flush::None => FlushCompress::None,
        };
        let before = (self.inner.total_in(), self.inner.total_out());
        let status = self
            .inner
            .compress(input, output, flush)
            .map_err(|e| Error::CodecState(e.to_string()))?;
        let after = (self.inner.total_in(), self.inner.total_out());
        Ok(outcome(before, after, status))
    }
}

/// Verbatim copy of exactly `remaining` bytes, for PKZIP stored entries.
pub struct Stored {
    remaining: u64,
}

impl Stored {
    pub fn new(length: u64) -> Self {
        Self { remaining: length }
    }
}

impl CodecEngine for Stored {
    fn step(&mut self, input: &[u8], output: &mut [u8], _flush: Flush) -> Result<StepOutcome> {
        let n = input
            .len()
            .min(output.len())
            .min(usize::try_from(self.remaining).unwrap_or(usize::MAX));
        output[..n].copy_from_slice(&input[..n]);
        self.remaining -= n as u64;
        Ok(StepOutcome {
            consumed: n,
            produced: n,
            status: if self.remaining == 0 {
                Status::StreamEnd
            } else {
                Status::Ok
            },
        })
    }
}

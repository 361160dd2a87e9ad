use std::io::{Read, Write};

use log::trace;

use super::{CHUNK_SIZE, CodecEngine, Flush, Status};
use crate::io::{InputBuffer, read_chunk, read_full};
use crate::{Error, Result};

/// Byte counters of a finished session.
///
/// On the decode side `bytes_in` is the number of compressed bytes the
/// engine actually consumed, which may be less than what was read from the
/// source; the surplus has been pushed back into the [`InputBuffer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transfer {
    pub bytes_in: u64,
    pub bytes_out: u64,
}

/// One engine plus its chunk buffers, used for exactly one stream.
pub struct CodecSession<E> {
    engine: E,
    input: Vec<u8>,
    output: Vec<u8>,
    consumed: u64,
    produced: u64,
}

impl<E: CodecEngine> CodecSession<E> {
    pub fn new(engine: E) -> Self {
        Self::with_chunk_size(engine, CHUNK_SIZE)
    }

    pub fn with_chunk_size(engine: E, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            engine,
            input: vec![0; chunk_size],
            output: vec![0; chunk_size],
            consumed: 0,
            produced: 0,
        }
    }

    /// Decode from `src` into `dst` until the engine reports end of stream.
    ///
    /// Running out of input first is a [`Error::CodecData`]. Bytes read past
    /// the end marker are returned to `src`.
    pub fn decompress<R: Read, W: Write>(
        mut self,
        src: &mut InputBuffer<R>,
        dst: &mut W,
    ) -> Result<Transfer> {
        loop {
            let n = read_chunk(src, &mut self.input)?;
            let mut offset = 0;
            loop {
                let step = self
                    .engine
                    .step(&self.input[offset..n], &mut self.output, Flush::None)?;
                offset += step.consumed;
                self.consumed += step.consumed as u64;
                self.produced += step.produced as u64;
                dst.write_all(&self.output[..step.produced])?;

                if step.status == Status::StreamEnd {
                    src.unread(&self.input[offset..n]);
                    trace!(
                        "stream end: {} in, {} out, {} returned",
                        self.consumed,
                        self.produced,
                        n - offset
                    );
                    return Ok(self.transfer());
                }
                if step.produced == self.output.len() {
                    continue;
                }
                if offset == n {
                    break;
                }
                if step.consumed == 0 {
                    return Err(Error::CodecState("inflate made no progress".into()));
                }
            }
            if n == 0 {
                return Err(Error::CodecData("unexpected end of file".into()));
            }
            trace!("chunk: {} in, {} out", self.consumed, self.produced);
        }
    }

    /// Encode all of `src` into `dst`.
    ///
    /// A chunk shorter than the buffer is the last one and is fed with
    /// [`Flush::Finish`]; full chunks use `flush` (normally [`Flush::None`],
    /// or [`Flush::Full`] for resynchronisable output).
    pub fn compress<R: Read, W: Write>(
        mut self,
        src: &mut R,
        dst: &mut W,
        flush: Flush,
    ) -> Result<Transfer> {
        loop {
            let n = read_full(src, &mut self.input)?;
            let mode = if n < self.input.len() {
                Flush::Finish
            } else {
                flush
            };
            let mut offset = 0;
            loop {
                let step = self
                    .engine
                    .step(&self.input[offset..n], &mut self.output, mode)?;
                offset += step.consumed;
                self.consumed += step.consumed as u64;
                self.produced += step.produced as u64;
                dst.write_all(&self.output[..step.produced])?;

                if step.status == Status::StreamEnd {
                    return Ok(self.transfer());
                }
                if step.produced == self.output.len() {
                    continue;
                }
                if offset == n && mode != Flush::Finish {
                    break;
                }
                if step.consumed == 0 && step.produced == 0 {
                    return Err(Error::CodecState("deflate made no progress".into()));
                }
            }
            trace!("chunk: {} in, {} out", self.consumed, self.produced);
        }
    }

    fn transfer(&self) -> Transfer {
        Transfer {
            bytes_in: self.consumed,
            bytes_out: self.produced,
        }
    }
}

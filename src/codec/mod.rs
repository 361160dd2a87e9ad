//! Codec engine interface and the chunked session that drives it.
//!
//! The deflate transform itself comes from `flate2`. This module only
//! defines the step contract the session loop relies on:
//!
//! - every step reports how many input bytes it consumed and how many
//!   output bytes it produced,
//! - a step returns [`Status::StreamEnd`] once the logical end of the
//!   stream has been reached,
//! - faults are split into malformed data, memory exhaustion and internal
//!   state corruption (see [`Error`](crate::Error)).
//!
//! Engine resources are owned by the session and released on drop, so every
//! exit path of the session loop tears the engine down.

mod engine;
mod session;

pub use engine::{Deflater, Inflater, Stored};
pub use session::{CodecSession, Transfer};

use crate::Result;

/// Size of the input and output chunk buffers.
pub const CHUNK_SIZE: usize = 16384;

/// Flush mode passed to each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flush {
    None,
    /// Emit everything so far and reset the dictionary, so the output can be
    /// resynchronised from this point.
    Full,
    Finish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    StreamEnd,
}

/// What a single step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub consumed: usize,
    pub produced: usize,
    pub status: Status,
}

pub trait CodecEngine {
    fn step(&mut self, input: &[u8], output: &mut [u8], flush: Flush) -> Result<StepOutcome>;
}

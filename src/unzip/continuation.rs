use std::io::Read;

use log::debug;

use crate::io::InputBuffer;
use crate::zip::{LFH_SIGNATURE, is_local_header};
use crate::{Error, Result};

/// Where decompressed data goes, which decides how a second PKZIP entry is
/// treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Standard output or a test sink; the archive itself stays in place.
    PassThrough,
    /// The output replaces the archive, which would be deleted on success.
    InPlace,
}

/// Look for another local header right after the first entry.
///
/// Returns `Ok(true)` when one is present and may be ignored. In
/// [`Destination::InPlace`] mode the same condition is
/// [`Error::MultipleEntries`], so the archive is kept.
pub fn check_continuation<R: Read>(
    input: &mut InputBuffer<R>,
    destination: Destination,
) -> Result<bool> {
    if !input.fill_to(LFH_SIGNATURE.len())? || !is_local_header(input.staged()) {
        return Ok(false);
    }
    debug!("another local header follows the first entry");
    match destination {
        Destination::PassThrough => Ok(true),
        Destination::InPlace => Err(Error::MultipleEntries),
    }
}

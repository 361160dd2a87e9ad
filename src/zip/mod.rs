//! PKZIP local headers, as far as needed to extract the first entry.
//!
//! Only the lead-in of an archive is read: the local header of the first
//! entry, its data, and the data descriptor that follows the data when the
//! header's sizes were not known at write time. The central directory is
//! never consulted.
//!
//! ## Limitations
//!
//! - No encryption support (encrypted entries are rejected)
//! - Only STORED and DEFLATE
//! - No ZIP64

mod parser;
mod structures;

pub use parser::{is_local_header, read_data_descriptor, read_local_header};
pub use structures::*;

//! Byte-level decoding primitives.
//!
//! - [`crate::file::parser::Parser`] - bounds-checked forward cursor over signature blobs
//! - [`crate::file::io`] - little-endian primitive conversion shared with the memory views

pub mod io;
pub mod parser;

#![warn(missing_docs)]

//! Reads and validates the marker segments of baseline JPEG files: the
//! quantization tables and the frame header.
/// Typed diagnostics recorded while decoding
pub mod diagnostic;
mod error;
/// Decoder for JPEG headers
pub mod jpeg;

pub use error::{ColorMode, DecodeFailure, Error, Result};

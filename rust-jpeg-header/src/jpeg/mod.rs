mod header;
mod jpeg_core;
mod jpeg_reader;
mod options;

use std::io::Read;

use crate::error::{DecodeFailure, Result};

pub use header::{ColorComponent, Header, Precision, QuantizationTable};
pub use jpeg_core::{JPEGDecoder, ZIGZAG_MAP};
pub use options::DecodeOptions;

/// Checks that `reader` starts with the SOI marker, consuming two bytes.
pub fn check_signature<R: Read>(reader: &mut R) -> Result<()> {
    jpeg_reader::JPEGReader::new(reader).read_signature()
}

/// Decodes the marker segments of a source that is already past its SOI
/// marker.
pub fn decode_segments<R: Read>(
    reader: R,
    options: DecodeOptions,
) -> core::result::Result<Header, DecodeFailure> {
    JPEGDecoder::with_options(reader, options).decode()
}

/// Checks the signature, then decodes the marker segments.
pub fn decode_header<R: Read>(
    reader: R,
    options: DecodeOptions,
) -> core::result::Result<Header, DecodeFailure> {
    let mut decoder = JPEGDecoder::with_options(reader, options);
    if let Err(error) = decoder.check_signature() {
        return Err(decoder.fail(error));
    }
    decoder.decode()
}

use std::io::Read;

use crate::{
    diagnostic::Diagnostic,
    error::{DecodeFailure, Error, Result},
    jpeg::{
        header::Header,
        jpeg_reader::{JPEGMarker, JPEGReader},
        options::DecodeOptions,
    },
};

/// Maps a position in zigzag scan order to its natural row-major position.
#[rustfmt::skip]
pub const ZIGZAG_MAP: [usize; 64] = [
     0,  1,  8, 16,  9,  2,  3, 10,
    17, 24, 32, 25, 18, 11,  4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13,  6,  7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// Walks the marker segments of one JPEG file and collects them into a
/// [`Header`].
///
/// The decoder owns the header until [`JPEGDecoder::decode`] hands it back,
/// either complete or inside a [`DecodeFailure`].
pub struct JPEGDecoder<R> {
    reader: JPEGReader<R>,
    options: DecodeOptions,
    header: Header,
    // Tag found at the end of scan data, dispatched before reading a new marker
    pending: Option<u8>,
    segment_offset: u64,
}

impl<R: Read> JPEGDecoder<R> {
    /// Creates a decoder with default options.
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, DecodeOptions::default())
    }

    /// Creates a decoder with the given options.
    pub fn with_options(reader: R, options: DecodeOptions) -> Self {
        Self {
            reader: JPEGReader::new(reader),
            options,
            header: Header::new(),
            pending: None,
            segment_offset: 0,
        }
    }

    /// Reads the two byte SOI signature.
    pub fn check_signature(&mut self) -> Result<()> {
        self.reader.read_signature()
    }

    /// Number of bytes consumed from the source so far.
    pub fn position(&self) -> u64 {
        self.reader.position()
    }

    /// Decodes marker segments until the input ends, an EOI marker is found, or
    /// a fatal error occurs. The source must already be past the signature.
    pub fn decode(mut self) -> core::result::Result<Header, DecodeFailure> {
        loop {
            match self.decode_segment() {
                Ok(true) => {}
                Ok(false) => break,
                Err(error) => return Err(self.fail(error)),
            }
        }
        Ok(self.header)
    }

    /// Ends decoding with `error`, recording it as the last diagnostic.
    pub(crate) fn fail(mut self, error: Error) -> DecodeFailure {
        let offset = self.segment_offset;
        log::debug!("jpeg: fatal error at offset {}: {}", offset, error);
        self.header.diagnostics.push(Diagnostic::fatal(&error, offset));
        DecodeFailure {
            error,
            offset,
            header: Box::new(self.header),
        }
    }

    fn next_marker(&mut self) -> Result<Option<u8>> {
        if let Some(tag) = self.pending.take() {
            return Ok(Some(tag));
        }
        self.segment_offset = self.reader.position();
        self.reader.read_marker()
    }

    /// Decodes one segment. Returns false once there is nothing left to walk.
    fn decode_segment(&mut self) -> Result<bool> {
        let tag = match self.next_marker()? {
            Some(tag) => tag,
            None => {
                log::debug!("jpeg: end of input at offset {}", self.reader.position());
                return Ok(false);
            }
        };
        let marker = JPEGMarker::from_tag(tag).ok_or(Error::UnknownMarker(tag))?;
        log::debug!("jpeg: {:?} at offset {}", marker, self.segment_offset);

        match marker {
            JPEGMarker::DQT => self.header.read_quantization_tables(&mut self.reader)?,
            JPEGMarker::SOF0 => self.header.read_start_of_frame(
                &mut self.reader,
                tag,
                self.segment_offset,
                &self.options,
            )?,
            JPEGMarker::SOS => return self.skip_scan(),
            JPEGMarker::EOI => return Ok(false),
            JPEGMarker::SOI => return Err(Error::UnknownMarker(tag)),
            marker if marker.is_unsupported_frame() => {
                return Err(Error::UnsupportedFrameType(tag));
            }
            marker if marker.is_application() => {
                let length = self.reader.skip_segment()?;
                log::debug!("jpeg: skipped APP{} ({} bytes)", tag - 0xE0, length);
            }
            marker if !marker.has_length() => {}
            _ => {
                self.reader.skip_segment()?;
            }
        }
        Ok(true)
    }

    /// Skips a scan header and the entropy-coded data after it.
    fn skip_scan(&mut self) -> Result<bool> {
        self.reader.skip_segment()?;
        if self.options.stop_at_first_scan {
            return Ok(false);
        }

        match self.reader.skip_entropy_coded_data()? {
            Some(tag) => {
                self.segment_offset = self.reader.position() - 2;
                self.pending = Some(tag);
                Ok(true)
            }
            None => {
                log::warn!("jpeg: input ended inside scan data");
                Ok(false)
            }
        }
    }
}

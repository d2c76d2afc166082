use std::fmt;

use thiserror::Error;

use crate::{diagnostic::DiagnosticKind, jpeg::Header};

/// Result type of the decoding functions.
pub type Result<T> = core::result::Result<T, Error>;

/// Color modes that are recognized in a frame header but not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Four component frames
    Cmyk,
    /// Frames using component ids 4 and 5
    Yiq,
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorMode::Cmyk => write!(f, "CMYK"),
            ColorMode::Yiq => write!(f, "YIQ"),
        }
    }
}

/// Describes an error encountered while reading a JPEG header.
#[derive(Debug, Error)]
pub enum Error {
    /// The byte source did not return the requested number of bytes.
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
    /// The first two bytes are not the SOI marker.
    #[error("invalid signature {0:#04X} {1:#04X}, expected 0xFF 0xD8")]
    InvalidSignature(u8, u8),
    /// A marker was expected but the 0xFF prefix is missing.
    #[error("expected a marker but found {0:#04X}")]
    MalformedMarkerStream(u8),
    /// A marker tag that is reserved or out of place.
    #[error("unknown marker 0xFF{0:02X}")]
    UnknownMarker(u8),
    /// A length-prefixed segment declares a length below two.
    #[error("segment length {0} is shorter than its own length field")]
    InvalidSegmentLength(u16),
    /// Quantization table ids range from 0 to 3.
    #[error("invalid quantization table id {0}")]
    InvalidQuantizationTableId(u8),
    /// The DQT length did not match the tables it contained.
    #[error("invalid DQT segment, {remaining} bytes left over after the last table")]
    InvalidDqtSegment {
        /// Declared bytes minus consumed bytes, negative on overrun
        remaining: i32,
    },
    /// Only 8 bit sample precision is supported.
    #[error("unsupported sample precision {0}")]
    UnsupportedPrecision(u8),
    /// Width and height must both be nonzero.
    #[error("invalid dimensions, width: {width}, height: {height}")]
    InvalidDimensions {
        /// Declared width
        width: u16,
        /// Declared height
        height: u16,
    },
    /// CMYK and YIQ images are rejected.
    #[error("{0} color mode is not supported")]
    UnsupportedColorMode(ColorMode),
    /// A frame must have one to three components.
    #[error("invalid component count {0}")]
    InvalidComponentCount(u8),
    /// Component ids range from 1 to 3.
    #[error("invalid component id {0}")]
    InvalidComponentId(u8),
    /// A component id was declared twice in the same frame.
    #[error("duplicate component id {0}")]
    DuplicateComponentId(u8),
    /// More than one SOF0 segment.
    #[error("found more than one SOF0 segment")]
    DuplicateFrameHeader,
    /// The SOF0 length did not match its component count.
    #[error("invalid frame header length {declared}, expected {expected}")]
    InvalidFrameHeaderLength {
        /// Length read from the segment
        declared: u16,
        /// Length implied by the component count
        expected: u16,
    },
    /// A start of frame marker other than baseline SOF0.
    #[error("unsupported frame type 0xFF{0:02X}, only baseline (0xFFC0) is supported")]
    UnsupportedFrameType(u8),
    /// Subsampled component, only fatal in strict mode.
    #[error(
        "unsupported sampling factor {horizontal}x{vertical} for component {component_id}"
    )]
    UnsupportedSamplingFactor {
        /// Component the factor belongs to
        component_id: u8,
        /// Horizontal sampling factor
        horizontal: u8,
        /// Vertical sampling factor
        vertical: u8,
    },
}

impl Error {
    /// Returns the diagnostic kind this error is recorded as.
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Error::Io(_) => DiagnosticKind::IoFailure,
            Error::InvalidSignature(..) => DiagnosticKind::InvalidSignature,
            Error::MalformedMarkerStream(_) => DiagnosticKind::MalformedMarkerStream,
            Error::UnknownMarker(_) => DiagnosticKind::UnknownMarker,
            Error::InvalidSegmentLength(_) => DiagnosticKind::InvalidSegmentLength,
            Error::InvalidQuantizationTableId(_) => DiagnosticKind::InvalidQuantizationTableId,
            Error::InvalidDqtSegment { .. } => DiagnosticKind::InvalidDqtSegment,
            Error::UnsupportedPrecision(_) => DiagnosticKind::UnsupportedPrecision,
            Error::InvalidDimensions { .. } => DiagnosticKind::InvalidDimensions,
            Error::UnsupportedColorMode(_) => DiagnosticKind::UnsupportedColorMode,
            Error::InvalidComponentCount(_) => DiagnosticKind::InvalidComponentCount,
            Error::InvalidComponentId(_) => DiagnosticKind::InvalidComponentId,
            Error::DuplicateComponentId(_) => DiagnosticKind::DuplicateComponentId,
            Error::DuplicateFrameHeader => DiagnosticKind::DuplicateFrameHeader,
            Error::InvalidFrameHeaderLength { .. } => DiagnosticKind::InvalidFrameHeaderLength,
            Error::UnsupportedFrameType(_) => DiagnosticKind::UnsupportedFrameType,
            Error::UnsupportedSamplingFactor { .. } => DiagnosticKind::UnsupportedSamplingFactor,
        }
    }
}

/// Returned when marker decoding stops on a fatal error.
///
/// The header holds everything decoded before the failing segment, and its
/// diagnostics end with the fatal entry.
#[derive(Debug, Error)]
#[error("decoding stopped at offset {offset}")]
pub struct DecodeFailure {
    /// The fatal error
    #[source]
    pub error: Error,
    /// Offset of the marker that started the failing segment
    pub offset: u64,
    /// The partially decoded header
    pub header: Box<Header>,
}

use std::fmt;

use crate::error::Error;

/// How bad a recorded violation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Decoding continued, but the header is not usable downstream.
    Warning,
    /// Decoding of the file stopped here.
    Fatal,
}

/// What kind of violation a diagnostic records.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    IoFailure,
    InvalidSignature,
    MalformedMarkerStream,
    UnknownMarker,
    InvalidSegmentLength,
    InvalidQuantizationTableId,
    InvalidDqtSegment,
    UnsupportedPrecision,
    InvalidDimensions,
    UnsupportedColorMode,
    InvalidComponentCount,
    InvalidComponentId,
    DuplicateComponentId,
    DuplicateFrameHeader,
    InvalidFrameHeaderLength,
    UnsupportedFrameType,
    UnsupportedSamplingFactor,
}

/// A violation found while decoding one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Whether decoding went on after this
    pub severity: Severity,
    /// The kind of violation
    pub kind: DiagnosticKind,
    /// Byte offset of the marker of the offending segment
    pub offset: u64,
    /// Human readable description
    pub message: String,
}

impl Diagnostic {
    pub(crate) fn warning(error: &Error, offset: u64) -> Self {
        Self::new(Severity::Warning, error, offset)
    }

    pub(crate) fn fatal(error: &Error, offset: u64) -> Self {
        Self::new(Severity::Fatal, error, offset)
    }

    fn new(severity: Severity, error: &Error, offset: u64) -> Self {
        Self {
            severity,
            kind: error.kind(),
            offset,
            message: error.to_string(),
        }
    }

    /// True if decoding stopped at this diagnostic.
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Fatal => "error",
        };
        write!(f, "{severity} at offset {}: {}", self.offset, self.message)
    }
}

/// Settings for one decode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Treat subsampled components as a fatal error instead of a warning.
    pub strict_sampling: bool,
    /// Stop after the header of the first scan instead of walking to the end
    /// of the input. Every table a baseline frame needs precedes its scan.
    pub stop_at_first_scan: bool,
}

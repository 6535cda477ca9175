// THEORY:
// Two failure domains, two enums. `CaptureError` covers the frame source and
// is fatal to the run loop: without frames there is nothing to recover into.
// `PipelineError` covers per-frame analysis and is frame-local: the runner
// logs it, drops the frame, and keeps going with the next one.

use thiserror::Error;

/// Errors from the frame source. These terminate the run loop.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("failed to read frame from capture device")]
    ReadFailed,
    #[error("capture stream ended")]
    EndOfStream,
}

/// Per-frame analysis errors. The frame is dropped; the loop continues.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PipelineError {
    /// No foreground survived thresholding and filtering; nothing to trace.
    #[error("no foreground pixels in frame")]
    NoForeground,
    /// The boundary walk exceeded its step budget without closing.
    #[error("contour exceeded step budget of {budget} without closing")]
    ContourTooComplex { budget: usize },
}

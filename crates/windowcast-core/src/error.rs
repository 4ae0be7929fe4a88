//! Error taxonomy for the capture core.
//!
//! Failures fall into two classes with very different handling:
//!
//! - [`CoreError`] — setup-fatal conditions (no display, missing extension)
//!   and resize failures. Setup errors leave the core permanently inert;
//!   resize errors leave the previous buffer untouched and usable.
//! - [`SkipReason`] — transient, expected per-tick conditions: the selected
//!   window closed, unmapped, shrank to nothing, or refused an image fetch.
//!   These are the steady-state outcome for a window that went away between
//!   refreshes, never an error to propagate.
//!
//! Nothing crosses the host boundary as a panic. Every failure degrades to a
//! skipped operation or a blank-frame fallback.

use std::fmt;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No X display connection could be established.
    #[error("cannot open display: {reason}")]
    DisplayUnavailable { reason: String },

    /// A required X extension is absent from the server.
    #[error("required X extension '{name}' is not present")]
    ExtensionMissing { name: &'static str },

    /// Resize was asked for a zero-area buffer.
    #[error("invalid frame dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The replacement frame buffer could not be allocated.
    #[error("failed to allocate {bytes}-byte frame buffer")]
    AllocationFailed { bytes: usize },

    /// A windowing-system request failed during setup.
    #[error("windowing system request failed: {reason}")]
    Protocol { reason: String },
}

impl CoreError {
    /// Whether the failure leaves prior state intact and the core usable.
    ///
    /// Resize failures are transient: the old buffer and geometry survive.
    /// Setup failures are not: the core must fall back to inert blank-frame
    /// emission.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidDimensions { .. } | CoreError::AllocationFailed { .. }
        )
    }
}

/// Why a capture call produced no pixels.
///
/// Skips leave the frame buffer exactly as it was; the driver still emits it
/// so the consumer receives one frame per tick regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The window no longer exists.
    WindowGone,
    /// The window exists but is not mapped for readback.
    NotViewable,
    /// Reported width or height is zero.
    EmptyGeometry,
    /// The image fetch itself failed.
    ImageUnavailable,
    /// No window is selected (empty directory or no display connection).
    NoSelection,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SkipReason::WindowGone => "window no longer exists",
            SkipReason::NotViewable => "window is not viewable",
            SkipReason::EmptyGeometry => "window has no usable size",
            SkipReason::ImageUnavailable => "image fetch failed",
            SkipReason::NoSelection => "no window selected",
        };
        f.write_str(msg)
    }
}

/// Result of one capture call, matchable instead of a boolean plus logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Pixels were copied into the frame buffer.
    Captured,
    /// Nothing was copied; the buffer is untouched.
    Skipped(SkipReason),
}

impl CaptureOutcome {
    pub fn is_captured(&self) -> bool {
        matches!(self, CaptureOutcome::Captured)
    }
}

//! Shared data types for the capture core.

use std::fmt;

/// Bytes per pixel of every frame buffer and source image: packed XRGB8888,
/// 8 bits per channel, the X/padding byte ignored by consumers.
pub const BYTES_PER_PIXEL: usize = 4;

/// Output width before any window has been selected.
pub const DEFAULT_WIDTH: u32 = 256;

/// Output height before any window has been selected.
pub const DEFAULT_HEIGHT: u32 = 384;

/// Frame rate advertised to the host. The host drives the actual tick rate.
pub const TARGET_FPS: f64 = 60.0;

/// Audio sample rate advertised to the host. The core produces no audio;
/// hosts still require a value here.
pub const AUDIO_SAMPLE_RATE: f64 = 30000.0;

/// Opaque identifier of a top-level window owned by the windowing system.
///
/// The window behind a handle can be destroyed by its owner at any moment,
/// so a handle is never trusted across ticks: every use re-checks it with an
/// attribute query and tolerates the window having vanished in the meantime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub u32);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// Size and viewability of a source window at one instant.
///
/// Answers from an attribute query are stale the moment they arrive; callers
/// treat this as a hint, not a guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceState {
    pub width:    u32,
    pub height:   u32,
    /// Mapped and eligible for pixel readback.
    pub viewable: bool,
}

impl SourceState {
    /// True when the window is mapped and has pixels worth fetching.
    pub fn capturable(&self) -> bool {
        self.viewable && self.width > 0 && self.height > 0
    }
}

/// Dimensions of the currently allocated frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    pub width:  u32,
    pub height: u32,
}

impl FrameGeometry {
    /// Total byte size of a buffer with this geometry.
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL
    }

    /// Row stride in bytes. Output rows are always tightly packed.
    pub fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Geometry and timing notification published to the video consumer
/// whenever the frame buffer is reallocated.
#[derive(Debug, Clone, PartialEq)]
pub struct AvInfo {
    pub base_width:   u32,
    pub base_height:  u32,
    pub max_width:    u32,
    pub max_height:   u32,
    pub aspect_ratio: f32,
    pub fps:          f64,
    pub sample_rate:  f64,
}

impl AvInfo {
    /// Notification for a buffer of exactly `geometry`. Base and max
    /// dimensions are the same: the buffer is reallocated per source size
    /// rather than sized for a worst case.
    pub fn for_geometry(geometry: &FrameGeometry) -> Self {
        Self {
            base_width:   geometry.width,
            base_height:  geometry.height,
            max_width:    geometry.width,
            max_height:   geometry.height,
            aspect_ratio: geometry.aspect_ratio(),
            fps:          TARGET_FPS,
            sample_rate:  AUDIO_SAMPLE_RATE,
        }
    }
}

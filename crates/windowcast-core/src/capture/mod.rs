//! Windowing seam and the capture engine.
//!
//! [`WindowSystem`] is the narrow boundary between the capture loop and the
//! display server: enumerate the root's children, check a window's state,
//! fetch its pixels. [`X11WindowSystem`] implements it over a live X
//! connection; [`MockWindowSystem`] implements it in memory so every loop
//! behavior is testable without a display.
//!
//! [`capture_window`] is the engine itself: one clamped row copy from a
//! transient [`SourceImage`] into the frame buffer.

pub mod mock;
pub mod x11_backend;

pub use mock::MockWindowSystem;
pub use x11_backend::X11WindowSystem;

use crate::error::{CaptureOutcome, SkipReason};
use crate::framebuffer::FrameBuffer;
use crate::model::{BYTES_PER_PIXEL, SourceState, WindowHandle};

/// One window's pixels as handed back by the windowing system.
///
/// Valid only for the capture call that produced it: the engine copies what
/// it needs and the image drops at the end of the call, on every exit path.
#[derive(Debug)]
pub struct SourceImage {
    pub width:  u32,
    pub height: u32,
    /// Source row length in bytes, padding included.
    pub stride: usize,
    pub data:   Vec<u8>,
}

/// Access to the windowing system, narrow enough to fake in tests.
///
/// Handles are weak references: the window behind one can vanish between
/// any two calls, so every method revalidates and degrades to an empty
/// list or a [`SkipReason`] rather than failing hard.
pub trait WindowSystem {
    /// Current direct children of the root container, in server order.
    /// A failed query reports an empty list, not an error.
    fn list_children(&mut self) -> Vec<WindowHandle>;

    /// Size and viewability of `window` right now.
    fn source_state(&mut self, window: WindowHandle) -> Result<SourceState, SkipReason>;

    /// Fetches the window's current image. The attribute check and the
    /// pixel fetch run as one serialized request sequence, so a window
    /// destroyed between the two surfaces as a skip, not a protocol error.
    fn fetch_image(&mut self, window: WindowHandle) -> Result<SourceImage, SkipReason>;
}

/// Copies one frame of `window` into the frame buffer.
///
/// Rows copied: `min(source height, buffer height)`; bytes per row:
/// `min(source width, buffer width) * 4`, top-left aligned. An oversized
/// source is cropped; an undersized one overwrites only its own region and
/// leaves the rest of the buffer holding whatever the previous capture put
/// there — the driver clears the buffer only when there is no source at
/// all, not on every partial-size capture. Skips leave the buffer
/// completely untouched.
pub fn capture_window<W: WindowSystem>(
    windows: &mut W,
    window: WindowHandle,
    framebuffer: &mut FrameBuffer,
) -> CaptureOutcome {
    let image = match windows.fetch_image(window) {
        Ok(image) => image,
        Err(reason) => return CaptureOutcome::Skipped(reason),
    };

    let geometry = framebuffer.geometry();
    let dst_stride = geometry.stride();

    let copy_bytes = (image.width.min(geometry.width) as usize * BYTES_PER_PIXEL).min(image.stride);
    // A malformed reply with fewer bytes than its header claims degrades to
    // a shorter copy instead of a panic.
    let available_rows = if image.stride == 0 { 0 } else { image.data.len() / image.stride };
    let copy_rows = (image.height.min(geometry.height) as usize).min(available_rows);

    let dst = framebuffer.pixels_mut();
    for row in 0..copy_rows {
        let src_start = row * image.stride;
        let dst_start = row * dst_stride;
        dst[dst_start..dst_start + copy_bytes]
            .copy_from_slice(&image.data[src_start..src_start + copy_bytes]);
    }

    CaptureOutcome::Captured
}

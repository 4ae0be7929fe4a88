//! In-memory windowing system for tests.
//!
//! Simulates a root container full of windows without touching a display
//! server: windows can be added, resized, hidden, and closed between ticks,
//! image fetches can be made to fail once, and listing can be made to fail
//! outright. Pixel data is a per-window fill byte with optional row padding
//! so stride handling is observable.

use super::{SourceImage, WindowSystem};
use crate::error::SkipReason;
use crate::model::{BYTES_PER_PIXEL, SourceState, WindowHandle};

/// Byte used for simulated row padding. Padding must never reach the frame
/// buffer; tests assert its absence.
const PADDING_BYTE: u8 = 0xEE;

const DEFAULT_FILL: u8 = 0x5A;

#[derive(Debug)]
struct MockWindow {
    handle:         WindowHandle,
    width:          u32,
    height:         u32,
    viewable:       bool,
    fill:           u8,
    stride_padding: usize,
    truncate_to:    Option<usize>,
}

/// Scriptable [`WindowSystem`] double.
#[derive(Debug, Default)]
pub struct MockWindowSystem {
    windows:         Vec<MockWindow>,
    list_fails:      bool,
    image_fail_once: bool,
    list_calls:      usize,
}

impl MockWindowSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a viewable window at the end of the child order.
    pub fn push_window(&mut self, id: u32, width: u32, height: u32) {
        self.windows.push(MockWindow {
            handle: WindowHandle(id),
            width,
            height,
            viewable: true,
            fill: DEFAULT_FILL,
            stride_padding: 0,
            truncate_to: None,
        });
    }

    /// Removes the window entirely, as if its owner destroyed it. A stale
    /// directory may still hold its handle; state and image calls for it
    /// then report [`SkipReason::WindowGone`].
    pub fn close(&mut self, id: u32) {
        self.windows.retain(|w| w.handle.0 != id);
    }

    pub fn resize_window(&mut self, id: u32, width: u32, height: u32) {
        if let Some(window) = self.find_mut(id) {
            window.width = width;
            window.height = height;
        }
    }

    pub fn set_viewable(&mut self, id: u32, viewable: bool) {
        if let Some(window) = self.find_mut(id) {
            window.viewable = viewable;
        }
    }

    pub fn set_fill(&mut self, id: u32, fill: u8) {
        if let Some(window) = self.find_mut(id) {
            window.fill = fill;
        }
    }

    /// Pads each image row with `bytes` of [`PADDING_BYTE`] beyond the
    /// pixel data, like a server aligning scanlines.
    pub fn set_stride_padding(&mut self, id: u32, bytes: usize) {
        if let Some(window) = self.find_mut(id) {
            window.stride_padding = bytes;
        }
    }

    /// Makes the window's image replies carry only `len` bytes of data
    /// while still claiming the full dimensions.
    pub fn truncate_image_data(&mut self, id: u32, len: usize) {
        if let Some(window) = self.find_mut(id) {
            window.truncate_to = Some(len);
        }
    }

    /// Makes every subsequent listing fail (report no children).
    pub fn fail_listing(&mut self, fail: bool) {
        self.list_fails = fail;
    }

    /// Makes the next image fetch fail; later fetches succeed again.
    pub fn fail_next_image(&mut self) {
        self.image_fail_once = true;
    }

    /// How many times the directory has been listed.
    pub fn list_calls(&self) -> usize {
        self.list_calls
    }

    fn find(&self, id: u32) -> Option<&MockWindow> {
        self.windows.iter().find(|w| w.handle.0 == id)
    }

    fn find_mut(&mut self, id: u32) -> Option<&mut MockWindow> {
        self.windows.iter_mut().find(|w| w.handle.0 == id)
    }
}

/// Shared handle for tests that mutate the fake while a driver owns it:
/// the driver takes one clone, the test keeps the other and scripts
/// window churn between ticks.
impl WindowSystem for std::rc::Rc<std::cell::RefCell<MockWindowSystem>> {
    fn list_children(&mut self) -> Vec<WindowHandle> {
        self.borrow_mut().list_children()
    }

    fn source_state(&mut self, window: WindowHandle) -> Result<SourceState, SkipReason> {
        self.borrow_mut().source_state(window)
    }

    fn fetch_image(&mut self, window: WindowHandle) -> Result<SourceImage, SkipReason> {
        self.borrow_mut().fetch_image(window)
    }
}

impl WindowSystem for MockWindowSystem {
    fn list_children(&mut self) -> Vec<WindowHandle> {
        self.list_calls += 1;
        if self.list_fails {
            return Vec::new();
        }
        self.windows.iter().map(|w| w.handle).collect()
    }

    fn source_state(&mut self, window: WindowHandle) -> Result<SourceState, SkipReason> {
        let found = self.find(window.0).ok_or(SkipReason::WindowGone)?;
        Ok(SourceState {
            width:    found.width,
            height:   found.height,
            viewable: found.viewable,
        })
    }

    fn fetch_image(&mut self, window: WindowHandle) -> Result<SourceImage, SkipReason> {
        let fail_injected = std::mem::take(&mut self.image_fail_once);
        let found = self.find(window.0).ok_or(SkipReason::WindowGone)?;
        if !found.viewable {
            return Err(SkipReason::NotViewable);
        }
        if found.width == 0 || found.height == 0 {
            return Err(SkipReason::EmptyGeometry);
        }
        if fail_injected {
            return Err(SkipReason::ImageUnavailable);
        }

        let row = found.width as usize * BYTES_PER_PIXEL;
        let stride = row + found.stride_padding;
        let mut data = vec![PADDING_BYTE; stride * found.height as usize];
        for y in 0..found.height as usize {
            data[y * stride..y * stride + row].fill(found.fill);
        }
        if let Some(len) = found.truncate_to {
            data.truncate(len);
        }

        Ok(SourceImage {
            width: found.width,
            height: found.height,
            stride,
            data,
        })
    }
}

//! Per-tick capture loop and the host lifecycle surface.

use tracing::{debug, error, info};

use crate::capture::{self, WindowSystem, X11WindowSystem};
use crate::directory::WindowDirectory;
use crate::error::{CaptureOutcome, CoreResult, SkipReason};
use crate::framebuffer::FrameBuffer;
use crate::host::{
    ControllerKind, Host, INPUT_BINDINGS, InputDevice, InputSignal, PixelFormat, Region,
};
use crate::model::{AvInfo, FrameGeometry, WindowHandle};
use crate::selection::SelectionCursor;

/// Name and version reported to hosts that ask what they loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemInfo {
    pub name:    &'static str,
    pub version: &'static str,
}

/// Driver over the live X11 backend.
pub type X11CaptureDriver = CaptureDriver<X11WindowSystem>;

/// Everything the capture loop owns: the display connection, the window
/// directory, the selection cursor, and the output frame buffer.
///
/// The host calls [`run_tick`](Self::run_tick) once per frame and receives
/// exactly one emitted frame back — captured pixels when a valid source
/// exists, the previous frame when the capture was skipped, a blank frame
/// when there is no source at all. There is no terminal state; the loop
/// runs until the host stops calling and drops the driver.
pub struct CaptureDriver<W: WindowSystem> {
    windows:     Option<W>,
    directory:   WindowDirectory,
    cursor:      SelectionCursor,
    framebuffer: FrameBuffer,
}

/// One-time environment negotiation, before any driver exists. Declares
/// the controller classes the core accepts and that it runs without
/// loaded content.
pub fn negotiate_environment(host: &mut dyn Host) {
    host.declare_controllers(&[ControllerKind::Pointer, ControllerKind::Keyboard]);
    host.declare_no_content_ok(true);
}

impl<W: WindowSystem> CaptureDriver<W> {
    /// Builds the driver around an already-connected windowing system, or
    /// `None` when setup failed — the driver then runs inert and every
    /// tick emits a blank default-geometry frame.
    ///
    /// Publishes the startup geometry, takes the initial directory
    /// snapshot, and when the first listed window is capturable, sizes the
    /// output to it right away.
    pub fn new(windows: Option<W>, host: &mut dyn Host) -> CoreResult<Self> {
        let framebuffer = FrameBuffer::with_default_geometry()?;
        host.publish_av_info(&AvInfo::for_geometry(&framebuffer.geometry()));

        let mut driver = Self {
            windows,
            directory: WindowDirectory::default(),
            cursor: SelectionCursor::default(),
            framebuffer,
        };
        if let Some(windows) = driver.windows.as_mut() {
            driver.directory.refresh(windows);
        }
        if let Some(first) = driver.directory.get(0) {
            driver.resize_to_selection(first, host);
        }
        Ok(driver)
    }

    /// Runs one frame tick: input poll, selection update, capture,
    /// emission, options probe — strictly in that order.
    pub fn run_tick(&mut self, host: &mut dyn Host) {
        host.poll_input();

        let delta = selection_delta(host);
        if delta != 0 {
            self.apply_selection(delta, host);
        }

        match self.capture_current() {
            CaptureOutcome::Captured => {}
            // Structurally no source: the consumer still gets its one
            // frame per tick, just a blank one.
            CaptureOutcome::Skipped(SkipReason::NoSelection) => self.framebuffer.clear(),
            // The selected window refused this frame; keep the previous
            // contents and emit those.
            CaptureOutcome::Skipped(reason) => debug!("capture skipped: {reason}"),
        }

        let geometry = self.framebuffer.geometry();
        host.emit_video_frame(
            self.framebuffer.pixels(),
            geometry.width,
            geometry.height,
            geometry.stride(),
        );

        if host.variables_updated() {
            self.refresh_variables();
        }
    }

    /// Declares the input bindings and the XRGB8888 pixel format. Succeeds
    /// with or without content — the core never reads any — and fails only
    /// when the host cannot accept packed XRGB8888 frames.
    pub fn load_content(&mut self, host: &mut dyn Host) -> bool {
        host.declare_input_bindings(INPUT_BINDINGS);
        if !host.declare_pixel_format(PixelFormat::Xrgb8888) {
            error!("host does not support XRGB8888 frames");
            return false;
        }
        true
    }

    pub fn unload_content(&mut self) {}

    /// Specialized content loading is refused; there is nothing to load.
    pub fn load_content_special(&mut self) -> bool {
        false
    }

    /// Selection and geometry deliberately persist across host resets.
    pub fn reset(&mut self) {}

    /// Current geometry and timing, for hosts that query instead of
    /// waiting for notifications.
    pub fn av_info(&self) -> AvInfo {
        AvInfo::for_geometry(&self.framebuffer.geometry())
    }

    pub fn system_info(&self) -> SystemInfo {
        SystemInfo {
            name:    "windowcast",
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    pub fn set_controller_port_device(&mut self, port: u32, kind: ControllerKind) {
        info!("plugging {kind:?} into port {port}");
    }

    // Captured desktop pixels are not replayable state; the whole
    // serialization surface reports unsupported.

    pub fn serialize_size(&self) -> usize {
        0
    }

    pub fn serialize(&self, _out: &mut [u8]) -> bool {
        false
    }

    pub fn unserialize(&mut self, _data: &[u8]) -> bool {
        false
    }

    /// No persistent memory regions are exposed.
    pub fn memory_region(&self, _id: u32) -> Option<&[u8]> {
        None
    }

    /// Cheat codes are accepted and ignored.
    pub fn set_cheat(&mut self, _index: u32, _enabled: bool, _code: &str) {}

    pub fn reset_cheats(&mut self) {}

    pub fn region(&self) -> Region {
        Region::Ntsc
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.framebuffer.geometry()
    }

    pub fn frame_pixels(&self) -> &[u8] {
        self.framebuffer.pixels()
    }

    pub fn selection_index(&self) -> usize {
        self.cursor.index()
    }

    pub fn directory_len(&self) -> usize {
        self.directory.len()
    }

    /// Moves the selection and, when the newly selected window is
    /// viewable with positive dimensions, resizes the output to it.
    /// Resizing happens only here, on selection changes — doing it every
    /// tick would thrash the consumer's declared geometry.
    fn apply_selection(&mut self, delta: i32, host: &mut dyn Host) {
        let Some(windows) = self.windows.as_mut() else {
            return;
        };
        let Some(selected) = self.cursor.advance(delta, &mut self.directory, windows) else {
            info!("no windows available to select");
            return;
        };
        self.resize_to_selection(selected, host);
    }

    fn resize_to_selection(&mut self, window: WindowHandle, host: &mut dyn Host) {
        let Some(windows) = self.windows.as_mut() else {
            return;
        };
        match windows.source_state(window) {
            Ok(state) if state.capturable() => {
                match self.framebuffer.resize(state.width, state.height) {
                    Ok(av_info) => host.publish_av_info(&av_info),
                    Err(err) => error!("failed to resize for window {window}: {err}"),
                }
            }
            Ok(_) => info!("window {window} not viewable or has no size"),
            Err(reason) => info!("window {window} not accessible: {reason}"),
        }
    }

    fn capture_current(&mut self) -> CaptureOutcome {
        let Some(windows) = self.windows.as_mut() else {
            return CaptureOutcome::Skipped(SkipReason::NoSelection);
        };
        let Some(window) = self.directory.get(self.cursor.index()) else {
            return CaptureOutcome::Skipped(SkipReason::NoSelection);
        };
        capture::capture_window(windows, window, &mut self.framebuffer)
    }

    /// Re-reads host-side options. There are none today; new tunables get
    /// wired through here.
    fn refresh_variables(&mut self) {}
}

/// Net selection movement for this tick. Wheel-up, Right and Up step
/// forward; wheel-down, Left and Down step backward. Opposing signals in
/// the same tick cancel, so the net delta is always -1, 0 or +1.
fn selection_delta(host: &mut dyn Host) -> i32 {
    let next = host.input_signal(InputDevice::Pointer, InputSignal::WheelUp)
        || host.input_signal(InputDevice::Keyboard, InputSignal::KeyRight)
        || host.input_signal(InputDevice::Keyboard, InputSignal::KeyUp);
    let prev = host.input_signal(InputDevice::Pointer, InputSignal::WheelDown)
        || host.input_signal(InputDevice::Keyboard, InputSignal::KeyLeft)
        || host.input_signal(InputDevice::Keyboard, InputSignal::KeyDown);
    i32::from(next) - i32::from(prev)
}

//! Boundary with the host runtime that drives the frame loop.
//!
//! The core never owns a main loop: a host calls [`CaptureDriver::run_tick`]
//! once per frame and supplies everything else through this trait — input
//! sampling, frame delivery, and geometry notifications. The trait is the
//! abstract shape of that handshake, independent of any concrete plugin ABI,
//! which also makes the whole loop drivable from tests.
//!
//! [`CaptureDriver::run_tick`]: crate::driver::CaptureDriver::run_tick

use crate::model::AvInfo;

/// Input device classes the core declares to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputDevice {
    Pointer,
    Keyboard,
}

/// Discrete input signals sampled once per polling tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSignal {
    WheelUp,
    WheelDown,
    KeyLeft,
    KeyRight,
    KeyUp,
    KeyDown,
}

/// One input binding advertised to the host during content load.
#[derive(Debug, Clone, Copy)]
pub struct InputBinding {
    pub device: InputDevice,
    pub signal: InputSignal,
    pub label:  &'static str,
}

/// Controller classes the core accepts on its single port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerKind {
    Pointer,
    Keyboard,
}

/// Pixel formats the core can negotiate. Only packed XRGB8888 is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Xrgb8888,
}

/// Region reported to hosts that ask. The core has no regional behavior;
/// the value is a fixed constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Ntsc,
}

/// The full selection-input surface: wheel in both directions plus the
/// directional keys. Wheel-up, Right and Up step forward through the window
/// directory; wheel-down, Left and Down step backward.
pub const INPUT_BINDINGS: &[InputBinding] = &[
    InputBinding { device: InputDevice::Pointer, signal: InputSignal::WheelUp, label: "Mouse Wheel Up" },
    InputBinding { device: InputDevice::Pointer, signal: InputSignal::WheelDown, label: "Mouse Wheel Down" },
    InputBinding { device: InputDevice::Keyboard, signal: InputSignal::KeyLeft, label: "Left" },
    InputBinding { device: InputDevice::Keyboard, signal: InputSignal::KeyRight, label: "Right" },
    InputBinding { device: InputDevice::Keyboard, signal: InputSignal::KeyUp, label: "Up" },
    InputBinding { device: InputDevice::Keyboard, signal: InputSignal::KeyDown, label: "Down" },
];

/// Callbacks and capabilities supplied by the host runtime.
///
/// One implementation drives the core per process. Within a tick the driver
/// calls these in a fixed order: `poll_input`, then `input_signal` queries,
/// then exactly one `emit_video_frame`, then `variables_updated`.
/// `publish_av_info` fires whenever the output geometry changes.
pub trait Host {
    /// Tells the host which pixel format emitted frames use. Returns false
    /// when the host cannot accept the format; content load fails then.
    fn declare_pixel_format(&mut self, format: PixelFormat) -> bool;

    /// Advertises the selection input surface.
    fn declare_input_bindings(&mut self, bindings: &[InputBinding]);

    /// Advertises which controller classes the core accepts.
    fn declare_controllers(&mut self, kinds: &[ControllerKind]);

    /// Declares that the core runs without loaded content.
    fn declare_no_content_ok(&mut self, ok: bool);

    /// Latches the current input state for this tick.
    fn poll_input(&mut self);

    /// Samples one discrete signal as latched by the last poll.
    fn input_signal(&mut self, device: InputDevice, signal: InputSignal) -> bool;

    /// Delivers the finished frame for this tick. `stride` is the byte
    /// length of one row; the buffer holds `height` such rows.
    fn emit_video_frame(&mut self, pixels: &[u8], width: u32, height: u32, stride: usize);

    /// Announces new output geometry after a frame buffer resize.
    fn publish_av_info(&mut self, info: &AvInfo);

    /// True when the host changed a core option since the last tick.
    fn variables_updated(&mut self) -> bool;
}

//! Shared test harness: a host double that records everything the driver
//! tells it and plays back scripted input, one script entry per tick.

use std::collections::VecDeque;

use windowcast_core::host::{ControllerKind, Host, InputBinding, InputDevice, InputSignal, PixelFormat};
use windowcast_core::model::AvInfo;

/// One emitted video frame, copied out at emission time.
#[derive(Debug, Clone)]
pub struct EmittedFrame {
    pub width:  u32,
    pub height: u32,
    pub stride: usize,
    pub pixels: Vec<u8>,
}

impl EmittedFrame {
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&b| b == 0)
    }
}

/// Recording [`Host`] double.
///
/// `script` holds the signals considered pressed for each upcoming poll;
/// ticks beyond the script see no input.
#[derive(Debug, Default)]
pub struct RecordingHost {
    script:  VecDeque<Vec<(InputDevice, InputSignal)>>,
    pressed: Vec<(InputDevice, InputSignal)>,

    pub frames:            Vec<EmittedFrame>,
    pub av_infos:          Vec<AvInfo>,
    pub polls:             usize,
    pub pixel_format:      Option<PixelFormat>,
    pub bindings:          Vec<InputBinding>,
    pub controllers:       Vec<ControllerKind>,
    pub no_content_ok:     Option<bool>,
    pub reject_format:     bool,
    pub variables_pending: bool,
    pub variable_probes:   usize,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues input for the next un-scripted tick.
    pub fn press_on_next_tick(&mut self, signals: &[(InputDevice, InputSignal)]) {
        self.script.push_back(signals.to_vec());
    }

    /// Queues a quiet tick.
    pub fn idle_tick(&mut self) {
        self.script.push_back(Vec::new());
    }

    pub fn press_wheel_up(&mut self) {
        self.press_on_next_tick(&[(InputDevice::Pointer, InputSignal::WheelUp)]);
    }

    pub fn press_wheel_down(&mut self) {
        self.press_on_next_tick(&[(InputDevice::Pointer, InputSignal::WheelDown)]);
    }

    pub fn last_frame(&self) -> &EmittedFrame {
        self.frames.last().expect("no frame emitted")
    }
}

impl Host for RecordingHost {
    fn declare_pixel_format(&mut self, format: PixelFormat) -> bool {
        self.pixel_format = Some(format);
        !self.reject_format
    }

    fn declare_input_bindings(&mut self, bindings: &[InputBinding]) {
        self.bindings = bindings.to_vec();
    }

    fn declare_controllers(&mut self, kinds: &[ControllerKind]) {
        self.controllers = kinds.to_vec();
    }

    fn declare_no_content_ok(&mut self, ok: bool) {
        self.no_content_ok = Some(ok);
    }

    fn poll_input(&mut self) {
        self.polls += 1;
        self.pressed = self.script.pop_front().unwrap_or_default();
    }

    fn input_signal(&mut self, device: InputDevice, signal: InputSignal) -> bool {
        self.pressed.contains(&(device, signal))
    }

    fn emit_video_frame(&mut self, pixels: &[u8], width: u32, height: u32, stride: usize) {
        self.frames.push(EmittedFrame {
            width,
            height,
            stride,
            pixels: pixels.to_vec(),
        });
    }

    fn publish_av_info(&mut self, info: &AvInfo) {
        self.av_infos.push(info.clone());
    }

    fn variables_updated(&mut self) -> bool {
        self.variable_probes += 1;
        std::mem::take(&mut self.variables_pending)
    }
}

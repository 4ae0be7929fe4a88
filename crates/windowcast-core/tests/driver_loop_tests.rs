//! Capture loop behavior against the mock windowing system.
//!
//! These cover the full per-tick contract — one emission per tick, blank
//! fallback, selection wrap, resize notifications, and the stale-pixel
//! policy on skipped or partial captures — without needing a display
//! server.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::RecordingHost;
use windowcast_core::capture::MockWindowSystem;
use windowcast_core::driver::{CaptureDriver, negotiate_environment};
use windowcast_core::host::{InputDevice, InputSignal, PixelFormat};
use windowcast_core::model::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

type SharedMock = Rc<RefCell<MockWindowSystem>>;

fn shared(mock: MockWindowSystem) -> SharedMock {
    Rc::new(RefCell::new(mock))
}

fn driver_over(
    windows: &SharedMock,
    host: &mut RecordingHost,
) -> CaptureDriver<SharedMock> {
    CaptureDriver::new(Some(windows.clone()), host).expect("driver construction failed")
}

#[test]
fn test_no_display_emits_default_blank_frame_every_tick() {
    let mut host = RecordingHost::new();
    let mut driver: CaptureDriver<MockWindowSystem> =
        CaptureDriver::new(None, &mut host).unwrap();

    for _ in 0..3 {
        driver.run_tick(&mut host);
    }

    assert_eq!(host.frames.len(), 3);
    for frame in &host.frames {
        assert_eq!((frame.width, frame.height), (DEFAULT_WIDTH, DEFAULT_HEIGHT));
        assert_eq!(frame.stride, DEFAULT_WIDTH as usize * 4);
        assert_eq!(frame.pixels.len(), (DEFAULT_WIDTH * DEFAULT_HEIGHT * 4) as usize);
        assert!(frame.is_blank());
    }
    assert_eq!(host.polls, 3);
}

#[test]
fn test_init_publishes_default_then_first_window_geometry() {
    let mut mock = MockWindowSystem::new();
    mock.push_window(1, 100, 50);
    let windows = shared(mock);

    let mut host = RecordingHost::new();
    let _driver = driver_over(&windows, &mut host);

    assert_eq!(host.av_infos.len(), 2);
    assert_eq!(host.av_infos[0].base_width, DEFAULT_WIDTH);
    assert_eq!(host.av_infos[0].base_height, DEFAULT_HEIGHT);
    assert_eq!(host.av_infos[1].base_width, 100);
    assert_eq!(host.av_infos[1].base_height, 50);
    assert_eq!(host.av_infos[1].aspect_ratio, 2.0);
}

#[test]
fn test_init_with_unviewable_first_window_keeps_default_geometry() {
    let mut mock = MockWindowSystem::new();
    mock.push_window(1, 100, 50);
    mock.set_viewable(1, false);
    let windows = shared(mock);

    let mut host = RecordingHost::new();
    let driver = driver_over(&windows, &mut host);

    assert_eq!(host.av_infos.len(), 1);
    assert_eq!(driver.geometry().width, DEFAULT_WIDTH);
}

#[test]
fn test_selection_advances_and_wraps_over_three_windows() {
    let mut mock = MockWindowSystem::new();
    mock.push_window(1, 8, 8);
    mock.push_window(2, 8, 8);
    mock.push_window(3, 8, 8);
    let windows = shared(mock);

    let mut host = RecordingHost::new();
    let mut driver = driver_over(&windows, &mut host);
    assert_eq!(driver.selection_index(), 0);

    for expected in [1, 2, 0] {
        host.press_wheel_up();
        driver.run_tick(&mut host);
        assert_eq!(driver.selection_index(), expected);
    }
}

#[test]
fn test_selection_backward_from_zero_wraps_to_last() {
    let mut mock = MockWindowSystem::new();
    mock.push_window(1, 8, 8);
    mock.push_window(2, 8, 8);
    mock.push_window(3, 8, 8);
    let windows = shared(mock);

    let mut host = RecordingHost::new();
    let mut driver = driver_over(&windows, &mut host);

    host.press_wheel_down();
    driver.run_tick(&mut host);
    assert_eq!(driver.selection_index(), 2);
}

#[test]
fn test_selecting_window_resizes_and_republishes_geometry() {
    let mut mock = MockWindowSystem::new();
    mock.push_window(1, 64, 64);
    mock.push_window(2, 100, 50);
    let windows = shared(mock);

    let mut host = RecordingHost::new();
    let mut driver = driver_over(&windows, &mut host);

    host.press_wheel_up();
    driver.run_tick(&mut host);

    assert_eq!(driver.geometry().width, 100);
    assert_eq!(driver.geometry().height, 50);
    let last = host.av_infos.last().unwrap();
    assert_eq!((last.base_width, last.base_height), (100, 50));
    assert_eq!((last.max_width, last.max_height), (100, 50));
    assert_eq!(last.aspect_ratio, 2.0);
    assert_eq!(host.last_frame().pixels.len(), 100 * 50 * 4);
}

#[test]
fn test_keyboard_signals_also_move_selection() {
    let mut mock = MockWindowSystem::new();
    mock.push_window(1, 8, 8);
    mock.push_window(2, 8, 8);
    let windows = shared(mock);

    let mut host = RecordingHost::new();
    let mut driver = driver_over(&windows, &mut host);

    host.press_on_next_tick(&[(InputDevice::Keyboard, InputSignal::KeyRight)]);
    driver.run_tick(&mut host);
    assert_eq!(driver.selection_index(), 1);

    host.press_on_next_tick(&[(InputDevice::Keyboard, InputSignal::KeyLeft)]);
    driver.run_tick(&mut host);
    assert_eq!(driver.selection_index(), 0);
}

#[test]
fn test_opposing_signals_in_one_tick_cancel_and_skip_refresh() {
    let mut mock = MockWindowSystem::new();
    mock.push_window(1, 8, 8);
    mock.push_window(2, 8, 8);
    let windows = shared(mock);

    let mut host = RecordingHost::new();
    let mut driver = driver_over(&windows, &mut host);
    let refreshes_after_init = windows.borrow().list_calls();

    host.press_on_next_tick(&[
        (InputDevice::Pointer, InputSignal::WheelUp),
        (InputDevice::Pointer, InputSignal::WheelDown),
    ]);
    driver.run_tick(&mut host);

    assert_eq!(driver.selection_index(), 0);
    // Net-zero delta means no selection change and no directory refresh.
    assert_eq!(windows.borrow().list_calls(), refreshes_after_init);
    assert_eq!(host.frames.len(), 1);
}

#[test]
fn test_captured_frame_carries_window_pixels() {
    let mut mock = MockWindowSystem::new();
    mock.push_window(1, 4, 4);
    mock.set_fill(1, 0xAB);
    let windows = shared(mock);

    let mut host = RecordingHost::new();
    let mut driver = driver_over(&windows, &mut host);

    driver.run_tick(&mut host);
    let frame = host.last_frame();
    assert_eq!((frame.width, frame.height), (4, 4));
    assert!(frame.pixels.iter().all(|&b| b == 0xAB));
}

#[test]
fn test_window_closed_between_selection_and_capture_emits_previous_frame() {
    let mut mock = MockWindowSystem::new();
    mock.push_window(1, 4, 4);
    mock.set_fill(1, 0xAB);
    let windows = shared(mock);

    let mut host = RecordingHost::new();
    let mut driver = driver_over(&windows, &mut host);

    driver.run_tick(&mut host);
    assert!(host.last_frame().pixels.iter().all(|&b| b == 0xAB));

    // The window dies; its handle stays in the stale directory because no
    // selection event has triggered a refresh. Capture skips, and the
    // buffer — still holding the last good frame — is emitted unchanged.
    windows.borrow_mut().close(1);
    driver.run_tick(&mut host);

    assert_eq!(host.frames.len(), 2);
    let frame = host.last_frame();
    assert!(frame.pixels.iter().all(|&b| b == 0xAB));
    assert!(!frame.is_blank());
}

#[test]
fn test_source_grown_since_resize_is_cropped() {
    let mut mock = MockWindowSystem::new();
    mock.push_window(1, 8, 8);
    mock.set_fill(1, 0x11);
    let windows = shared(mock);

    let mut host = RecordingHost::new();
    let mut driver = driver_over(&windows, &mut host);
    driver.run_tick(&mut host);

    // The window grows without a selection event: the buffer stays 8x8
    // and the larger source is cropped to it.
    windows.borrow_mut().resize_window(1, 16, 16);
    windows.borrow_mut().set_fill(1, 0x33);
    driver.run_tick(&mut host);

    let frame = host.last_frame();
    assert_eq!((frame.width, frame.height), (8, 8));
    assert!(frame.pixels.iter().all(|&b| b == 0x33));
}

#[test]
fn test_source_shrunk_since_resize_leaves_stale_pixels() {
    let mut mock = MockWindowSystem::new();
    mock.push_window(1, 8, 8);
    mock.set_fill(1, 0x33);
    let windows = shared(mock);

    let mut host = RecordingHost::new();
    let mut driver = driver_over(&windows, &mut host);
    driver.run_tick(&mut host);

    windows.borrow_mut().resize_window(1, 2, 2);
    windows.borrow_mut().set_fill(1, 0x44);
    driver.run_tick(&mut host);

    // Top-left 2x2 is fresh, everything else keeps the previous capture.
    let frame = host.last_frame();
    let stride = frame.stride;
    for row in 0..8 {
        for col in 0..stride {
            let expected = if row < 2 && col < 8 { 0x44 } else { 0x33 };
            assert_eq!(frame.pixels[row * stride + col], expected, "row {row} col {col}");
        }
    }
}

#[test]
fn test_empty_directory_selection_events_never_panic() {
    let windows = shared(MockWindowSystem::new());
    let mut host = RecordingHost::new();
    let mut driver = driver_over(&windows, &mut host);

    for _ in 0..3 {
        host.press_wheel_up();
        driver.run_tick(&mut host);
    }

    assert_eq!(host.frames.len(), 3);
    assert!(host.frames.iter().all(|frame| frame.is_blank()));
}

#[test]
fn test_window_appearing_after_empty_start_becomes_selectable() {
    let windows = shared(MockWindowSystem::new());
    let mut host = RecordingHost::new();
    let mut driver = driver_over(&windows, &mut host);

    host.idle_tick();
    driver.run_tick(&mut host);
    assert!(host.last_frame().is_blank());

    {
        let mut mock = windows.borrow_mut();
        mock.push_window(9, 4, 4);
        mock.set_fill(9, 0x77);
    }
    host.press_wheel_up();
    driver.run_tick(&mut host);

    assert_eq!(driver.selection_index(), 0);
    assert!(host.last_frame().pixels.iter().all(|&b| b == 0x77));
}

#[test]
fn test_negotiation_and_content_load_declare_the_full_surface() {
    let mut host = RecordingHost::new();
    negotiate_environment(&mut host);
    assert_eq!(host.controllers.len(), 2);
    assert_eq!(host.no_content_ok, Some(true));

    let windows = shared(MockWindowSystem::new());
    let mut driver = driver_over(&windows, &mut host);
    assert!(driver.load_content(&mut host));
    assert_eq!(host.pixel_format, Some(PixelFormat::Xrgb8888));
    assert_eq!(host.bindings.len(), 6);
}

#[test]
fn test_content_load_fails_when_host_rejects_pixel_format() {
    let mut host = RecordingHost::new();
    host.reject_format = true;

    let windows = shared(MockWindowSystem::new());
    let mut driver = driver_over(&windows, &mut host);
    assert!(!driver.load_content(&mut host));
}

#[test]
fn test_unsupported_surface_reports_as_such() {
    let mut host = RecordingHost::new();
    let windows = shared(MockWindowSystem::new());
    let mut driver = driver_over(&windows, &mut host);

    assert_eq!(driver.serialize_size(), 0);
    assert!(!driver.serialize(&mut []));
    assert!(!driver.unserialize(&[]));
    assert!(driver.memory_region(0).is_none());
    assert!(!driver.load_content_special());
    driver.set_cheat(0, true, "AAAA-BBBB");
    driver.reset_cheats();
}

#[test]
fn test_reset_preserves_selection_and_geometry() {
    let mut mock = MockWindowSystem::new();
    mock.push_window(1, 8, 8);
    mock.push_window(2, 100, 50);
    let windows = shared(mock);

    let mut host = RecordingHost::new();
    let mut driver = driver_over(&windows, &mut host);
    host.press_wheel_up();
    driver.run_tick(&mut host);
    assert_eq!(driver.selection_index(), 1);

    driver.reset();
    assert_eq!(driver.selection_index(), 1);
    assert_eq!(driver.geometry().width, 100);
}

#[test]
fn test_variables_probe_runs_every_tick() {
    let mut host = RecordingHost::new();
    host.variables_pending = true;

    let windows = shared(MockWindowSystem::new());
    let mut driver = driver_over(&windows, &mut host);
    driver.run_tick(&mut host);
    driver.run_tick(&mut host);

    assert_eq!(host.variable_probes, 2);
    assert!(!host.variables_pending);
}

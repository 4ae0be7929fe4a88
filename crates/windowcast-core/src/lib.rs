//! windowcast-core: live X11 window capture into a host-driven frame loop.
//!
//! Captures one on-screen window's pixels per tick into an owned XRGB8888
//! frame buffer and emits it to a host video consumer, with wheel/key
//! switching of the captured window at runtime. The host supplies the loop
//! and the callbacks ([`host::Host`]); the core supplies the state machine
//! ([`driver::CaptureDriver`]) and the X11 backend
//! ([`capture::X11WindowSystem`]).

pub mod capture;
pub mod directory;
pub mod driver;
pub mod error;
pub mod framebuffer;
pub mod host;
pub mod model;
pub mod selection;

pub use driver::{CaptureDriver, X11CaptureDriver, negotiate_environment};
pub use error::{CaptureOutcome, CoreError, CoreResult, SkipReason};

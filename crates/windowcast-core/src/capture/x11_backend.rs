//! X11 windowing backend built on x11rb.
//!
//! Talks the core protocol directly: `QueryTree` for the window directory,
//! `GetWindowAttributes` + `GetGeometry` for the freshness check, and
//! `GetImage` (ZPixmap, all planes) for pixel readback. On a 24/32-bit
//! visual the reply rows are already packed XRGB8888 in output byte order,
//! so capture is a raw copy with no conversion.
//!
//! # Serialization
//!
//! Every request sequence runs behind one connection-wide lock. The
//! attribute check and the image fetch form a single critical section:
//! a window destroyed between the two requests surfaces as a caught X
//! error and degrades to a skipped capture, never a crash. Requests may
//! block on the display server; there are no timeouts here — a hung
//! server stalls the tick, which the host model accepts.
//!
//! # Setup failures
//!
//! Connecting and the Composite extension handshake are the only
//! setup-fatal paths. Callers keep running without a backend afterwards,
//! emitting blank frames, rather than taking the host down.

use parking_lot::Mutex;
use tracing::{debug, info, warn};
use x11rb::connection::{Connection as _, RequestConnection as _};
use x11rb::errors::{ConnectionError, ReplyError};
use x11rb::protocol::ErrorKind;
use x11rb::protocol::composite::{self, ConnectionExt as _};
use x11rb::protocol::xproto::{ConnectionExt as _, ImageFormat, MapState, Window};
use x11rb::rust_connection::RustConnection;

use super::{SourceImage, WindowSystem};
use crate::error::{CoreError, CoreResult, SkipReason};
use crate::model::{BYTES_PER_PIXEL, SourceState, WindowHandle};

/// Minimum Composite version the handshake requests.
const COMPOSITE_MAJOR: u32 = 0;
const COMPOSITE_MINOR: u32 = 4;

/// Connection to one X display, rooted at the default screen.
pub struct X11WindowSystem {
    conn:   RustConnection,
    root:   Window,
    /// Serializes request sequences that must not interleave.
    serial: Mutex<()>,
}

impl X11WindowSystem {
    /// Connects to the display named by `$DISPLAY` and performs the
    /// Composite extension handshake.
    ///
    /// Failure here is setup-fatal for capture, but callers are expected
    /// to continue in an inert blank-frame mode rather than abort.
    pub fn connect() -> CoreResult<Self> {
        let (conn, screen_num) = x11rb::connect(None)
            .map_err(|e| CoreError::DisplayUnavailable { reason: e.to_string() })?;
        let root = conn.setup().roots[screen_num].root;

        if conn
            .extension_information(composite::X11_EXTENSION_NAME)
            .map_err(|e| CoreError::Protocol { reason: e.to_string() })?
            .is_none()
        {
            return Err(CoreError::ExtensionMissing { name: "Composite" });
        }
        let version = conn
            .composite_query_version(COMPOSITE_MAJOR, COMPOSITE_MINOR)
            .map_err(|e| CoreError::Protocol { reason: e.to_string() })?
            .reply()
            .map_err(|e| CoreError::Protocol { reason: e.to_string() })?;
        debug!(
            "Composite {}.{} present",
            version.major_version, version.minor_version
        );

        info!("connected to X display, root window 0x{root:08x}");
        Ok(Self {
            conn,
            root,
            serial: Mutex::new(()),
        })
    }

    /// Attribute + geometry query for one window. Caller holds the lock.
    fn state_locked(&self, window: WindowHandle) -> Result<SourceState, SkipReason> {
        let attrs = self
            .conn
            .get_window_attributes(window.0)
            .map_err(connection_skip)?
            .reply()
            .map_err(reply_skip)?;
        let geometry = self
            .conn
            .get_geometry(window.0)
            .map_err(connection_skip)?
            .reply()
            .map_err(reply_skip)?;

        Ok(SourceState {
            width:    u32::from(geometry.width),
            height:   u32::from(geometry.height),
            viewable: attrs.map_state == MapState::VIEWABLE,
        })
    }
}

impl WindowSystem for X11WindowSystem {
    fn list_children(&mut self) -> Vec<WindowHandle> {
        let _guard = self.serial.lock();
        let reply = match self.conn.query_tree(self.root) {
            Ok(cookie) => cookie.reply(),
            Err(err) => {
                warn!("window tree query failed: {err}");
                return Vec::new();
            }
        };
        match reply {
            Ok(tree) => tree.children.into_iter().map(WindowHandle).collect(),
            Err(err) => {
                warn!("window tree query failed: {err}");
                Vec::new()
            }
        }
    }

    fn source_state(&mut self, window: WindowHandle) -> Result<SourceState, SkipReason> {
        let _guard = self.serial.lock();
        self.state_locked(window)
    }

    fn fetch_image(&mut self, window: WindowHandle) -> Result<SourceImage, SkipReason> {
        // Attribute check and pixel fetch must see the same window state.
        let _guard = self.serial.lock();

        let state = self.state_locked(window)?;
        if !state.viewable {
            return Err(SkipReason::NotViewable);
        }
        if state.width == 0 || state.height == 0 {
            return Err(SkipReason::EmptyGeometry);
        }

        let image = self
            .conn
            .get_image(
                ImageFormat::Z_PIXMAP,
                window.0,
                0,
                0,
                state.width as u16,
                state.height as u16,
                u32::MAX,
            )
            .map_err(connection_skip)?
            .reply()
            .map_err(reply_skip)?;
        if image.data.is_empty() {
            warn!("image reply for {window} carried no data");
            return Err(SkipReason::ImageUnavailable);
        }

        let stride = image.data.len() / state.height as usize;
        if stride < state.width as usize * BYTES_PER_PIXEL {
            // Sub-32-bit visual; the engine clamps the copy to what exists.
            debug!("window {window} image rows are {stride} bytes, narrower than XRGB8888");
        }

        Ok(SourceImage {
            width:  state.width,
            height: state.height,
            stride,
            data:   image.data,
        })
    }
}

/// Maps a failed reply to a skip. A vanished window (`BadWindow`, or
/// `BadDrawable` from the geometry/image requests) is the expected
/// steady-state race; anything else is logged and treated as transient.
fn reply_skip(err: ReplyError) -> SkipReason {
    match err {
        ReplyError::X11Error(ref x11)
            if matches!(x11.error_kind, ErrorKind::Window | ErrorKind::Drawable) =>
        {
            debug!("window no longer exists");
            SkipReason::WindowGone
        }
        other => {
            warn!("X request failed: {other}");
            SkipReason::ImageUnavailable
        }
    }
}

/// Connection-level failures after setup also degrade to a skip; the next
/// tick emits a blank or stale frame instead of crashing the host.
fn connection_skip(err: ConnectionError) -> SkipReason {
    warn!("X connection error: {err}");
    SkipReason::ImageUnavailable
}

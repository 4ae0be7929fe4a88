//! Snapshot of the windowing system's top-level windows.

use tracing::info;

use crate::capture::WindowSystem;
use crate::model::WindowHandle;

/// Ordered snapshot of the root container's direct children.
///
/// Rebuilt whole on every [`refresh`](Self::refresh) — there is no
/// incremental diffing, and an index into one snapshot means nothing in the
/// next. A failed query and a childless root both produce an empty
/// directory; that is "no capturable source", not an error.
#[derive(Debug, Default)]
pub struct WindowDirectory {
    handles: Vec<WindowHandle>,
}

impl WindowDirectory {
    /// Replaces the snapshot with the windowing system's current children,
    /// in the order the server reports them. No sorting, no visibility
    /// filtering — hidden windows keep their slot and simply skip at
    /// capture time.
    pub fn refresh<W: WindowSystem>(&mut self, windows: &mut W) {
        self.handles = windows.list_children();
        if self.handles.is_empty() {
            info!("no windows found");
        } else {
            info!("found {} windows", self.handles.len());
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<WindowHandle> {
        self.handles.get(index).copied()
    }
}

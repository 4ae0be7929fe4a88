//! Cursor over the window directory.

use crate::capture::WindowSystem;
use crate::directory::WindowDirectory;
use crate::model::WindowHandle;

/// Tracks which directory entry is being captured.
///
/// The cursor is only meaningful against the snapshot that last moved it;
/// selection changes therefore resynchronize the directory before stepping,
/// since windows may have appeared or closed since the previous event.
#[derive(Debug, Default)]
pub struct SelectionCursor {
    index: usize,
}

impl SelectionCursor {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Moves the selection by `delta` windows and returns the new selection.
    ///
    /// `delta == 0` changes nothing and reports the current selection as-is.
    /// A nonzero delta refreshes the directory first, then wraps the new
    /// index into `[0, len)` with a true modulo — stepping backward from
    /// index 0 lands on the last entry, not at -1. When the refreshed
    /// directory is empty the selection is undefined and `None` is
    /// returned; capture stays skipped until a later refresh finds windows.
    pub fn advance<W: WindowSystem>(
        &mut self,
        delta: i32,
        directory: &mut WindowDirectory,
        windows: &mut W,
    ) -> Option<WindowHandle> {
        if delta == 0 {
            return directory.get(self.index);
        }

        directory.refresh(windows);
        let len = directory.len();
        if len == 0 {
            return None;
        }

        self.index = (self.index as i64 + i64::from(delta)).rem_euclid(len as i64) as usize;
        directory.get(self.index)
    }
}

//! Owned output pixel buffer and its geometry.

use tracing::info;

use crate::error::{CoreError, CoreResult};
use crate::model::{AvInfo, BYTES_PER_PIXEL, DEFAULT_HEIGHT, DEFAULT_WIDTH, FrameGeometry};

/// Single owner of the output pixel buffer.
///
/// The buffer always holds exactly `width * height * 4` bytes and is
/// zero-filled on every (re)allocation. Resizing builds the replacement
/// first and swaps only once it exists, so a failed resize leaves the
/// previous buffer and geometry untouched and usable.
#[derive(Debug)]
pub struct FrameBuffer {
    pixels:   Vec<u8>,
    geometry: FrameGeometry,
}

impl FrameBuffer {
    /// Allocates the startup buffer at the default geometry.
    pub fn with_default_geometry() -> CoreResult<Self> {
        let mut buffer = Self {
            pixels:   Vec::new(),
            geometry: FrameGeometry { width: 0, height: 0 },
        };
        buffer.resize(DEFAULT_WIDTH, DEFAULT_HEIGHT)?;
        Ok(buffer)
    }

    /// Reallocates the buffer for a new source size and returns the
    /// geometry notification the consumer must receive.
    ///
    /// Zero dimensions are rejected up front. Allocation goes through
    /// `try_reserve_exact` so an out-of-memory condition surfaces as
    /// [`CoreError::AllocationFailed`] with the old buffer still intact,
    /// instead of aborting the process.
    pub fn resize(&mut self, width: u32, height: u32) -> CoreResult<AvInfo> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidDimensions { width, height });
        }

        let bytes = width as usize * height as usize * BYTES_PER_PIXEL;
        let mut next = Vec::new();
        next.try_reserve_exact(bytes)
            .map_err(|_| CoreError::AllocationFailed { bytes })?;
        next.resize(bytes, 0);

        // The old allocation is dropped only here, after the replacement
        // is fully valid.
        self.pixels = next;
        self.geometry = FrameGeometry { width, height };
        info!("resized frame buffer to {width}x{height}");
        Ok(AvInfo::for_geometry(&self.geometry))
    }

    /// Zero-fills the whole buffer. Used for the blank frame emitted when
    /// no capturable source exists; partial captures deliberately do not
    /// trigger this.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry_buffer_is_zeroed() {
        let buffer = FrameBuffer::with_default_geometry().unwrap();
        let geometry = buffer.geometry();
        assert_eq!(geometry, FrameGeometry { width: DEFAULT_WIDTH, height: DEFAULT_HEIGHT });
        assert_eq!(buffer.pixels().len(), geometry.byte_len());
        assert!(buffer.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_resize_rejects_zero_dimensions_and_keeps_state() {
        let mut buffer = FrameBuffer::with_default_geometry().unwrap();
        buffer.pixels_mut()[0] = 0xAB;
        let before = buffer.geometry();

        assert!(matches!(
            buffer.resize(0, 50),
            Err(CoreError::InvalidDimensions { width: 0, height: 50 })
        ));
        assert!(buffer.resize(100, 0).is_err());

        assert_eq!(buffer.geometry(), before);
        assert_eq!(buffer.pixels()[0], 0xAB);
        assert_eq!(buffer.pixels().len(), before.byte_len());
    }

    #[test]
    fn test_resize_zeroes_previous_contents() {
        let mut buffer = FrameBuffer::with_default_geometry().unwrap();
        buffer.pixels_mut().fill(0xFF);

        let info = buffer.resize(100, 50).unwrap();
        assert_eq!(info.base_width, 100);
        assert_eq!(info.aspect_ratio, 2.0);
        assert_eq!(buffer.pixels().len(), 100 * 50 * 4);
        assert!(buffer.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_resize_to_same_dimensions_still_reallocates_zeroed() {
        let mut buffer = FrameBuffer::with_default_geometry().unwrap();
        buffer.resize(64, 64).unwrap();
        buffer.pixels_mut().fill(0x77);

        buffer.resize(64, 64).unwrap();
        assert!(buffer.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_clear_zero_fills() {
        let mut buffer = FrameBuffer::with_default_geometry().unwrap();
        buffer.pixels_mut().fill(0x55);
        buffer.clear();
        assert!(buffer.pixels().iter().all(|&b| b == 0));
    }
}

//! Capabilities the animator is driven through.
//!
//! The animator never reads ambient state. Frame timing, viewport size,
//! randomness and the drawing target are all handed to it, so the terminal
//! player and the tests can plug in their own implementations.

use rand::RngExt;

/// Token for one outstanding frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Per-frame scheduling primitive.
pub trait Scheduler {
    /// Ask for one callback before the next repaint.
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraw a request. After this the handle is never delivered.
    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Hand back a request that is due now together with its frame
    /// timestamp in milliseconds. Timestamps never decrease.
    fn take_due(&mut self) -> Option<(FrameHandle, f64)>;
}

/// Current viewport dimensions in logical pixels.
pub trait Viewport {
    fn width(&self) -> f64;
    fn height(&self) -> f64;
    fn device_pixel_ratio(&self) -> f64;
}

/// Uniform floating-point source in `[0, 1)`.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;

    /// Uniform value in `[lo, hi)`. `lo + u * (hi - lo)` can round up to
    /// `hi` for `u` just below 1, so that case is pulled back inside.
    #[inline]
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        let v = lo + self.next_unit() * (hi - lo);
        if v >= hi && hi > lo { hi.next_down() } else { v }
    }
}

impl<R: RngExt> RandomSource for R {
    #[inline]
    fn next_unit(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// A drawing target with a canvas-style 2-D context.
///
/// Setting the backing size resets the context state, the same way resizing
/// an HTML canvas does.
pub trait RenderTarget {
    fn set_logical_size(&mut self, width: f64, height: f64);
    fn set_backing_size(&mut self, width: usize, height: usize);
    fn backing_size(&self) -> (usize, usize);

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn save(&mut self);
    fn restore(&mut self);
    fn set_global_alpha(&mut self, alpha: f64);
    fn scale(&mut self, factor: f64);
    fn translate(&mut self, x: f64, y: f64);
    fn rotate(&mut self, angle: f64);
    fn set_font_size(&mut self, px: f64);
    fn set_text_align_center(&mut self);
    fn fill_text(&mut self, glyph: super::particle::Glyph, x: f64, y: f64);
}

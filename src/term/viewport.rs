use crate::animator::host::Viewport;
use crate::surface::RenderMode;

/// Terminal window seen as a viewport in logical pixels.
///
/// Each physical dot of the render mode covers `dot_size` logical pixels, and
/// the device pixel ratio is its inverse, so the backing store lines up with
/// the dot grid exactly. Rows reserved for the status bar are left out.
#[derive(Debug, Clone)]
pub struct TermViewport {
    cols: u16,
    rows: u16,
    reserved_rows: u16,
    mode: RenderMode,
}

impl TermViewport {
    pub fn new(cols: u16, rows: u16, reserved_rows: u16, mode: RenderMode) -> Self {
        TermViewport {
            cols,
            rows,
            reserved_rows,
            mode,
        }
    }

    pub fn set_terminal_size(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
    }

    pub fn set_reserved_rows(&mut self, reserved: u16) {
        self.reserved_rows = reserved;
    }

    pub fn terminal_size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    /// Rows available to the particle field.
    pub fn display_rows(&self) -> u16 {
        self.rows.saturating_sub(self.reserved_rows)
    }
}

impl Viewport for TermViewport {
    fn width(&self) -> f64 {
        let (dx, _) = self.mode.dots_per_cell();
        self.cols as f64 * dx as f64 * self.mode.dot_size()
    }

    fn height(&self) -> f64 {
        let (_, dy) = self.mode.dots_per_cell();
        self.display_rows() as f64 * dy as f64 * self.mode.dot_size()
    }

    fn device_pixel_ratio(&self) -> f64 {
        1.0 / self.mode.dot_size()
    }
}

pub mod braille;
pub mod color;
pub mod context;
pub mod glyph;
pub mod halfblock;
pub mod pixmap;

pub use color::ColorMode;

use crate::animator::host::RenderTarget;
use crate::animator::particle::Glyph;
use context::DrawContext;
use pixmap::Pixmap;

/// How to turn physical pixels into terminal characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    /// Half-block characters ▀▄█ (1x2 per cell, full colour per pixel)
    HalfBlock,
    /// Unicode braille characters (2x4 per cell, one colour per cell)
    Braille,
}

impl RenderMode {
    /// Physical pixels per terminal cell, `(columns, rows)`.
    pub fn dots_per_cell(self) -> (usize, usize) {
        match self {
            RenderMode::HalfBlock => (1, 2),
            RenderMode::Braille => (2, 4),
        }
    }

    /// Logical pixels covered by one physical pixel. A cell is always
    /// 4x8 logical pixels, which keeps particle density independent of the
    /// render mode.
    pub fn dot_size(self) -> f64 {
        match self {
            RenderMode::HalfBlock => 4.0,
            RenderMode::Braille => 2.0,
        }
    }
}

/// Terminal-backed drawing target.
pub struct TermSurface {
    pixmap: Pixmap,
    ctx: DrawContext,
    render_mode: RenderMode,
    color_mode: ColorMode,
}

impl TermSurface {
    pub fn new(render_mode: RenderMode, color_mode: ColorMode) -> Self {
        TermSurface {
            pixmap: Pixmap::new(0, 0),
            ctx: DrawContext::default(),
            render_mode,
            color_mode,
        }
    }

    #[allow(dead_code)]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    #[allow(dead_code)]
    pub fn context(&self) -> &DrawContext {
        &self.ctx
    }

    /// Terminal cells covered by the backing store.
    #[allow(dead_code)]
    pub fn term_size(&self) -> (usize, usize) {
        let (dx, dy) = self.render_mode.dots_per_cell();
        (self.pixmap.width / dx, self.pixmap.height / dy)
    }

    /// Encode the current frame, laid over `backdrop` when one is given.
    /// Rows are separated by absolute cursor moves, so the caller only needs
    /// to home the cursor first.
    pub fn present(&self, backdrop: Option<&Pixmap>) -> String {
        let composed;
        let frame = match backdrop {
            Some(under) => {
                composed = self.pixmap.over(under);
                &composed
            }
            None => &self.pixmap,
        };
        match self.render_mode {
            RenderMode::HalfBlock => halfblock::render(frame, self.color_mode),
            RenderMode::Braille => braille::render(frame, self.color_mode),
        }
    }
}

impl RenderTarget for TermSurface {
    /// The terminal has no layout size apart from the backing store.
    fn set_logical_size(&mut self, _width: f64, _height: f64) {}

    fn set_backing_size(&mut self, width: usize, height: usize) {
        self.pixmap.resize(width, height);
        self.ctx.reset();
    }

    fn backing_size(&self) -> (usize, usize) {
        (self.pixmap.width, self.pixmap.height)
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let (x0, y0, x1, y1) = self.ctx.device_bounds(x, y, width, height);
        if !(x1 > 0.0 && y1 > 0.0) {
            return;
        }
        self.pixmap.clear_region(
            x0.floor().max(0.0) as usize,
            y0.floor().max(0.0) as usize,
            x1.ceil() as usize,
            y1.ceil() as usize,
        );
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.ctx.set_alpha(alpha);
    }

    fn scale(&mut self, factor: f64) {
        self.ctx.scale(factor);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.ctx.translate(x, y);
    }

    fn rotate(&mut self, angle: f64) {
        self.ctx.rotate(angle);
    }

    fn set_font_size(&mut self, px: f64) {
        self.ctx.set_font_size(px);
    }

    fn set_text_align_center(&mut self) {
        self.ctx.set_centered(true);
    }

    fn fill_text(&mut self, glyph: Glyph, x: f64, y: f64) {
        glyph::fill(&mut self.pixmap, self.ctx.state(), glyph, x, y);
    }
}

use kurbo::{Affine, Point};

/// Drawing state captured by `save` and brought back by `restore`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawState {
    pub transform: Affine,
    pub alpha: f64,
    pub font_size: f64,
    pub centered: bool,
}

impl Default for DrawState {
    fn default() -> Self {
        DrawState {
            transform: Affine::IDENTITY,
            alpha: 1.0,
            font_size: 10.0,
            centered: false,
        }
    }
}

/// Canvas-style 2-D context state: the current state plus a save stack.
///
/// Transforms compose on the right, so the most recent call applies to
/// local coordinates first.
#[derive(Debug, Default)]
pub struct DrawContext {
    state: DrawState,
    stack: Vec<DrawState>,
}

impl DrawContext {
    pub fn reset(&mut self) {
        self.state = DrawState::default();
        self.stack.clear();
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    pub fn save(&mut self) {
        self.stack.push(self.state);
    }

    /// Pop the last saved state. An unbalanced restore does nothing.
    pub fn restore(&mut self) {
        if let Some(prev) = self.stack.pop() {
            self.state = prev;
        }
    }

    #[allow(dead_code)]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        if alpha.is_finite() {
            self.state.alpha = alpha.clamp(0.0, 1.0);
        }
    }

    pub fn set_font_size(&mut self, px: f64) {
        if px.is_finite() && px > 0.0 {
            self.state.font_size = px;
        }
    }

    pub fn set_centered(&mut self, centered: bool) {
        self.state.centered = centered;
    }

    pub fn scale(&mut self, factor: f64) {
        self.state.transform *= Affine::scale(factor);
    }

    pub fn translate(&mut self, x: f64, y: f64) {
        self.state.transform *= Affine::translate((x, y));
    }

    pub fn rotate(&mut self, angle: f64) {
        self.state.transform *= Affine::rotate(angle);
    }

    /// Map a point from local to device coordinates.
    pub fn to_device(&self, x: f64, y: f64) -> Point {
        self.state.transform * Point::new(x, y)
    }

    /// Axis-aligned device bounds of a local rectangle.
    pub fn device_bounds(&self, x: f64, y: f64, w: f64, h: f64) -> (f64, f64, f64, f64) {
        let corners = [
            self.to_device(x, y),
            self.to_device(x + w, y),
            self.to_device(x, y + h),
            self.to_device(x + w, y + h),
        ];
        corners.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(x0, y0, x1, y1), p| (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
        )
    }
}

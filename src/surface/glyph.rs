//! Heart glyph rasterizer.
//!
//! Terminals cannot draw emoji at an arbitrary size or angle, so each glyph
//! is drawn as an implicit heart curve sampled per device pixel. Sampling goes
//! through the inverse transform, so rotation and scale land where the
//! context says they should.

use super::context::DrawState;
use super::pixmap::Pixmap;
use crate::animator::particle::Glyph;
use kurbo::Point;

const GOLD: (u8, u8, u8) = (255, 205, 90);

/// Inside test for a heart filling roughly the unit square `[-1, 1]²`,
/// screen orientation (y grows downward).
#[inline]
fn heart(u: f64, v: f64) -> bool {
    let x = u * 1.15;
    let y = -v * 1.15 + 0.2;
    let a = x * x + y * y - 1.0;
    a * a * a - x * x * y * y * y <= 0.0
}

#[inline]
fn heart_at(u: f64, v: f64, cx: f64, cy: f64, scale: f64) -> bool {
    heart((u - cx) / scale, (v - cy) / scale)
}

/// Colour of `glyph` at normalized glyph coordinates, or `None` outside it.
pub fn sample(glyph: Glyph, u: f64, v: f64) -> Option<(u8, u8, u8)> {
    match glyph {
        Glyph::RedHeart => heart(u, v).then_some((226, 28, 52)),
        Glyph::TwoHearts => {
            if heart_at(u, v, 0.3, -0.3, 0.6) {
                Some((255, 120, 190))
            } else if heart_at(u, v, -0.35, 0.35, 0.6) {
                Some((255, 80, 160))
            } else {
                None
            }
        }
        Glyph::SparklingHeart => {
            if !heart(u, v) {
                None
            } else if heart_at(u, v, 0.0, -0.1, 0.4) {
                Some((255, 215, 235))
            } else {
                Some((255, 70, 150))
            }
        }
        Glyph::GrowingHeart => {
            if !heart(u, v) {
                None
            } else if heart_at(u, v, 0.0, 0.0, 0.7) && !heart_at(u, v, 0.0, 0.0, 0.45) {
                Some((255, 160, 200))
            } else {
                Some((240, 90, 150))
            }
        }
        Glyph::HeartWithRibbon => {
            if !heart(u, v) {
                None
            } else if u.abs() < 0.14 || (v + 0.05).abs() < 0.12 {
                Some(GOLD)
            } else {
                Some((235, 60, 110))
            }
        }
        Glyph::HeartWithArrow => {
            let shaft = (u + v).abs() < 0.16 && u.abs() < 0.95;
            if shaft && !(-0.55..=0.55).contains(&u) {
                Some(GOLD)
            } else if heart(u, v) {
                Some((250, 90, 135))
            } else if shaft {
                Some(GOLD)
            } else {
                None
            }
        }
    }
}

/// Draw `glyph` at local `(x, y)` with the given drawing state.
///
/// A centered glyph is centred on the point; otherwise the point is the
/// bottom-left corner of the glyph box.
pub fn fill(pixmap: &mut Pixmap, state: &DrawState, glyph: Glyph, x: f64, y: f64) {
    let radius = state.font_size / 2.0;
    let (cx, cy) = if state.centered {
        (x, y)
    } else {
        (x + radius, y - radius)
    };
    let det = state.transform.determinant();
    if state.alpha <= 0.0 || radius <= 0.0 || det.abs() < 1e-12 {
        return;
    }
    let inverse = state.transform.inverse();

    let corners = [
        (cx - radius, cy - radius),
        (cx + radius, cy - radius),
        (cx - radius, cy + radius),
        (cx + radius, cy + radius),
    ]
    .map(|(px, py)| state.transform * Point::new(px, py));
    let (mut x0, mut y0, mut x1, mut y1) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
    for p in corners {
        x0 = x0.min(p.x);
        y0 = y0.min(p.y);
        x1 = x1.max(p.x);
        y1 = y1.max(p.y);
    }

    if x1 < 0.0 || y1 < 0.0 {
        return;
    }
    let x0 = x0.floor().max(0.0) as usize;
    let y0 = y0.floor().max(0.0) as usize;
    let x1 = (x1.ceil().max(0.0) as usize).min(pixmap.width);
    let y1 = (y1.ceil().max(0.0) as usize).min(pixmap.height);

    for py in y0..y1 {
        for px in x0..x1 {
            let local = inverse * Point::new(px as f64 + 0.5, py as f64 + 0.5);
            let u = (local.x - cx) / radius;
            let v = (local.y - cy) / radius;
            if let Some(rgb) = sample(glyph, u, v) {
                pixmap.blend(px, py, rgb, state.alpha);
            }
        }
    }
}

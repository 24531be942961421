use super::color::{self, ColorMode};
use super::pixmap::Pixmap;

/// Braille dot positions within a 2x4 cell, as `(dx, dy, bit)`.
///
/// Unicode braille: U+2800 + dot bits
const BRAILLE_OFFSET: u32 = 0x2800;
const DOT_MAP: [(usize, usize, u32); 8] = [
    (0, 0, 0x01),
    (0, 1, 0x02),
    (0, 2, 0x04),
    (1, 0, 0x08),
    (1, 1, 0x10),
    (1, 2, 0x20),
    (0, 3, 0x40),
    (1, 3, 0x80),
];

const THRESHOLD: f32 = 0.25;

/// Encode a pixmap as braille cells. Each cell takes the mean colour of its
/// lit dots.
pub fn render(pixmap: &Pixmap, mode: ColorMode) -> String {
    let cols = pixmap.width / 2;
    let rows = pixmap.height / 4;
    let mut out = String::with_capacity(cols * rows * 20);
    let mut last_fg = String::new();

    for row in 0..rows {
        for col in 0..cols {
            let mut bits = 0u32;
            let mut sum = [0u32; 3];
            let mut lit = 0u32;

            for &(dx, dy, bit) in &DOT_MAP {
                let (x, y) = (col * 2 + dx, row * 4 + dy);
                if pixmap.level(x, y) > THRESHOLD {
                    bits |= bit;
                    let (r, g, b) = pixmap.rgb(x, y);
                    sum[0] += r as u32;
                    sum[1] += g as u32;
                    sum[2] += b as u32;
                    lit += 1;
                }
            }

            let ch = char::from_u32(BRAILLE_OFFSET + bits).unwrap_or(' ');
            if mode != ColorMode::Mono && lit > 0 {
                let [r, g, b] = sum.map(|s| (s / lit) as u8);
                let fg = color::fg(mode.map(r, g, b));
                if fg != last_fg {
                    out.push_str("\x1b[");
                    out.push_str(&fg);
                    out.push('m');
                    last_fg = fg;
                }
            }
            out.push(ch);
        }
        if mode != ColorMode::Mono {
            out.push_str("\x1b[0m");
            last_fg.clear();
        }
        out.push_str(&format!("\x1b[{};1H", row + 2));
    }
    out
}

use super::color::{self, ColorMode};
use super::pixmap::Pixmap;

/// Pixel level below which a half-block cell half counts as background.
/// Hearts fade to black at low opacity, so the cut-off is kept low.
const DARK_THRESHOLD: f32 = 0.02;

/// Encode a pixmap as rows of `▀` cells, top pixel in the foreground and
/// bottom pixel in the background.
pub fn render(pixmap: &Pixmap, mode: ColorMode) -> String {
    let cols = pixmap.width;
    let rows = pixmap.height / 2;
    let mut out = String::with_capacity(cols * rows * 10);

    let mut last_fg = String::new();
    let mut last_bg = String::new();
    let mut in_color = false;

    for row in 0..rows {
        for col in 0..cols {
            let (top_y, bot_y) = (row * 2, row * 2 + 1);
            let top_lit = pixmap.level(col, top_y) >= DARK_THRESHOLD;
            let bot_lit = pixmap.level(col, bot_y) >= DARK_THRESHOLD;

            if mode == ColorMode::Mono {
                out.push(match (top_lit, bot_lit) {
                    (true, true) => '█',
                    (true, false) => '▀',
                    (false, true) => '▄',
                    (false, false) => ' ',
                });
                continue;
            }

            if !top_lit && !bot_lit {
                if in_color {
                    out.push_str("\x1b[0m");
                    in_color = false;
                    last_fg.clear();
                    last_bg.clear();
                }
                out.push(' ');
                continue;
            }

            let top = pixmap.rgb(col, top_y);
            let bot = pixmap.rgb(col, bot_y);
            let fg = color::fg(mode.map(top.0, top.1, top.2));
            let bg = color::bg(mode.map(bot.0, bot.1, bot.2));

            match (fg != last_fg, bg != last_bg) {
                (true, true) => {
                    out.push_str("\x1b[");
                    out.push_str(&fg);
                    out.push(';');
                    out.push_str(&bg);
                    out.push('m');
                }
                (true, false) => {
                    out.push_str("\x1b[");
                    out.push_str(&fg);
                    out.push('m');
                }
                (false, true) => {
                    out.push_str("\x1b[");
                    out.push_str(&bg);
                    out.push('m');
                }
                (false, false) => {}
            }
            last_fg = fg;
            last_bg = bg;
            in_color = true;
            out.push('▀');
        }
        if in_color {
            out.push_str("\x1b[0m");
            in_color = false;
            last_fg.clear();
            last_bg.clear();
        }
        out.push_str("\x1b[");
        out.push_str(&(row + 2).to_string());
        out.push_str(";1H");
    }
    out
}

use crossterm::style::Color;

/// Color output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorMode {
    /// No color, monochrome
    Mono,
    /// ANSI 16 colors
    Ansi16,
    /// 256-color palette
    Ansi256,
    /// 24-bit true color (RGB)
    TrueColor,
}

impl ColorMode {
    /// Closest terminal colour for an RGB triple in this mode.
    pub fn map(self, r: u8, g: u8, b: u8) -> Color {
        match self {
            ColorMode::Mono => Color::White,
            ColorMode::TrueColor => Color::Rgb { r, g, b },
            ColorMode::Ansi256 => {
                let idx = 16 + 36 * (r as u16 / 51) + 6 * (g as u16 / 51) + (b as u16 / 51);
                Color::AnsiValue(idx as u8)
            }
            ColorMode::Ansi16 => ansi16(r, g, b),
        }
    }
}

/// Hearts are mostly red and pink, so magenta gets its own bucket here.
fn ansi16(r: u8, g: u8, b: u8) -> Color {
    let brightness = (r as u16 + g as u16 + b as u16) / 3;
    let bright = brightness > 150;
    if brightness < 40 {
        Color::Black
    } else if r > g && b > g && b as u16 * 2 > r as u16 {
        if bright { Color::Magenta } else { Color::DarkMagenta }
    } else if r >= g && r >= b {
        if g > 180 {
            Color::Yellow
        } else if bright {
            Color::Red
        } else {
            Color::DarkRed
        }
    } else if bright {
        Color::White
    } else {
        Color::Grey
    }
}

/// SGR foreground parameters for a colour.
pub fn fg(color: Color) -> String {
    sgr(color, false)
}

/// SGR background parameters for a colour.
pub fn bg(color: Color) -> String {
    sgr(color, true)
}

fn sgr(color: Color, background: bool) -> String {
    let base: u8 = if background { 40 } else { 30 };
    let bright: u8 = if background { 100 } else { 90 };
    match color {
        Color::Rgb { r, g, b } => format!("{};2;{};{};{}", base + 8, r, g, b),
        Color::AnsiValue(v) => format!("{};5;{}", base + 8, v),
        Color::Black => base.to_string(),
        Color::DarkRed => (base + 1).to_string(),
        Color::DarkGreen => (base + 2).to_string(),
        Color::DarkYellow => (base + 3).to_string(),
        Color::DarkBlue => (base + 4).to_string(),
        Color::DarkMagenta => (base + 5).to_string(),
        Color::DarkCyan => (base + 6).to_string(),
        Color::Grey => (base + 7).to_string(),
        Color::DarkGrey => bright.to_string(),
        Color::Red => (bright + 1).to_string(),
        Color::Green => (bright + 2).to_string(),
        Color::Yellow => (bright + 3).to_string(),
        Color::Blue => (bright + 4).to_string(),
        Color::Magenta => (bright + 5).to_string(),
        Color::Cyan => (bright + 6).to_string(),
        Color::White => (bright + 7).to_string(),
        _ => (base + 7).to_string(),
    }
}

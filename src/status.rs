use std::ops::Range;

use crate::transport::Slideshow;

/// Widest the progress bar gets, in columns.
const BAR_WIDTH: usize = 24;
/// Narrowest bar still worth drawing and hit-testing.
const MIN_BAR_WIDTH: usize = 4;

/// `m:ss`, flooring both parts. Negative or non-finite input reads `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let mins = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{}:{:02}", mins, secs)
}

/// One rendered status line plus where its progress bar sits.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub text: String,
    /// Zero-based columns of the progress bar, if it fit.
    pub bar: Option<Range<usize>>,
}

impl StatusLine {
    /// Seek fraction for a click at `column`, or `None` off the bar.
    pub fn seek_target(&self, column: usize) -> Option<f64> {
        let bar = self.bar.as_ref()?;
        if !bar.contains(&column) {
            return None;
        }
        let offset = (column - bar.start) as f64 + 0.5;
        Some(offset / bar.len() as f64)
    }

    /// Escape sequence drawing the line in reverse video on terminal row `row`
    /// (1-based).
    pub fn draw(&self, row: u16) -> String {
        format!("\x1b[{};1H\x1b[7m{}\x1b[0m", row, self.text)
    }
}

/// What the status bar shows this frame.
pub struct StatusView<'a> {
    pub show: &'a Slideshow,
    /// Position to display instead of the live one while a seek drag is held.
    pub held_position: Option<f64>,
    pub fps: f64,
}

/// Lay out the status bar for a terminal `width` columns wide.
pub fn layout(view: &StatusView<'_>, width: usize) -> StatusLine {
    let transport = &view.show.transport;
    let gallery = &view.show.gallery;

    let icon = if transport.is_playing() { "||" } else { "▶ " };
    let position = view.held_position.unwrap_or(transport.position());
    let prefix = format!(
        " {} {} / {} ",
        icon,
        format_time(position),
        format_time(transport.duration())
    );

    let caption = match gallery.current() {
        Some(name) => format!("[{}/{}] {}", gallery.index() + 1, gallery.len(), name),
        None => "[no photos]".to_string(),
    };
    let suffix = format!(
        " {} | {:.0} fps | [space] play  [←/→] photo ±10s  [h] hide  [q] quit ",
        caption, view.fps
    );

    let prefix_len = prefix.chars().count();
    let room = width.saturating_sub(prefix_len + 1);
    let bar_w = room.min(BAR_WIDTH);

    let mut text = prefix;
    let bar = if bar_w >= MIN_BAR_WIDTH {
        let fraction = match view.held_position {
            Some(held) => transport.fraction_at(held),
            None => transport.progress_fraction(),
        };
        text.push_str(&progress_bar(fraction, bar_w));
        Some(prefix_len..prefix_len + bar_w)
    } else {
        None
    };
    text.push_str(&suffix);

    let truncated: String = text.chars().take(width).collect();
    StatusLine {
        text: format!("{:<width$}", truncated, width = width),
        bar,
    }
}

/// `━━━●────` style bar, `width` columns.
fn progress_bar(fraction: f64, width: usize) -> String {
    let handle = ((fraction * width as f64) as usize).min(width - 1);
    let mut out = String::with_capacity(width * 3);
    for i in 0..width {
        out.push(match i.cmp(&handle) {
            std::cmp::Ordering::Less => '━',
            std::cmp::Ordering::Equal => '●',
            std::cmp::Ordering::Greater => '─',
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{Gallery, Transport};

    fn show(duration: f64, photos: usize) -> Slideshow {
        let names = (1..=photos).map(|i| format!("p{i}.png")).collect();
        Slideshow::new(Transport::new(duration), Gallery::new(names, 4.0))
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(9.99), "0:09");
        assert_eq!(format_time(61.0), "1:01");
        assert_eq!(format_time(220.7), "3:40");
        assert_eq!(format_time(3600.0), "60:00");
        assert_eq!(format_time(-5.0), "0:00");
        assert_eq!(format_time(f64::NAN), "0:00");
    }

    #[test]
    fn test_progress_bar_handle_position() {
        assert_eq!(progress_bar(0.0, 4), "●───");
        assert_eq!(progress_bar(0.5, 4), "━━●─");
        assert_eq!(progress_bar(1.0, 4), "━━━●");
    }

    #[test]
    fn test_layout_contains_time_and_caption() {
        let mut s = show(220.0, 7);
        s.transport.seek_fraction(0.5);
        s.gallery.next();
        let view = StatusView { show: &s, held_position: None, fps: 30.0 };
        let line = layout(&view, 200);
        assert!(line.text.starts_with(" ▶  1:50 / 3:40 "));
        assert!(line.text.contains("[2/7] p2.png"));
        assert!(line.text.contains("30 fps"));
        assert_eq!(line.text.chars().count(), 200);
        assert_eq!(line.bar, Some(16..40));
    }

    #[test]
    fn test_held_position_freezes_display() {
        let mut s = show(100.0, 1);
        s.transport.seek_fraction(0.9);
        let view = StatusView { show: &s, held_position: Some(5.0), fps: 0.0 };
        let line = layout(&view, 120);
        assert!(line.text.contains("0:05 / 1:40"));
    }

    #[test]
    fn test_seek_target_maps_columns() {
        let s = show(100.0, 1);
        let view = StatusView { show: &s, held_position: None, fps: 0.0 };
        let line = layout(&view, 120);
        let bar = line.bar.clone().unwrap();
        assert_eq!(line.seek_target(bar.start - 1), None);
        assert_eq!(line.seek_target(bar.end), None);
        let first = line.seek_target(bar.start).unwrap();
        let last = line.seek_target(bar.end - 1).unwrap();
        assert!(first > 0.0 && first < 0.05);
        assert!(last > 0.95 && last < 1.0);
    }

    #[test]
    fn test_narrow_terminal_drops_bar() {
        let s = show(100.0, 0);
        let view = StatusView { show: &s, held_position: None, fps: 0.0 };
        let line = layout(&view, 18);
        assert_eq!(line.bar, None);
        assert_eq!(line.text.chars().count(), 18);
        assert_eq!(line.seek_target(3), None);
    }

    #[test]
    fn test_empty_gallery_caption() {
        let s = show(0.0, 0);
        let view = StatusView { show: &s, held_position: None, fps: 0.0 };
        assert!(layout(&view, 200).text.contains("[no photos]"));
    }

    #[test]
    fn test_draw_uses_reverse_video() {
        let line = StatusLine { text: "abc".into(), bar: None };
        assert_eq!(line.draw(24), "\x1b[24;1H\x1b[7mabc\x1b[0m");
    }
}

//! Playback clock and photo gallery.
//!
//! There is no audio here: [`Transport`] is the position/duration bookkeeping
//! a media element would do, advanced by the run loop's measured frame time.

use tracing::{debug, info};

/// Seconds skipped by the previous/next controls.
pub const SKIP_SECS: f64 = 10.0;
/// Default seconds between automatic photo changes.
pub const DEFAULT_PHOTO_INTERVAL: f64 = 4.0;
/// Length of the cross-fade after a photo change, in seconds.
pub const FADE_SECS: f64 = 1.0;

/// Simulated media clock.
#[derive(Debug, Clone)]
pub struct Transport {
    playing: bool,
    position: f64,
    duration: f64,
}

impl Transport {
    /// A zero duration means "no track": the clock never moves and never ends.
    pub fn new(duration: f64) -> Self {
        let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        Transport {
            playing: false,
            position: 0.0,
            duration,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Flip play/pause and return the new state.
    pub fn toggle_play(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    /// Advance by `dt` seconds while playing. Reaching the end pauses and
    /// rewinds to the start; returns `true` when that happened.
    pub fn tick(&mut self, dt: f64) -> bool {
        if !self.playing || self.duration <= 0.0 || !(dt > 0.0) {
            return false;
        }
        self.position += dt;
        if self.position >= self.duration {
            self.pause();
            self.position = 0.0;
            info!(duration = self.duration, "track ended");
            return true;
        }
        false
    }

    /// Jump to a fraction of the track. The fraction is clamped to `[0, 1]`.
    pub fn seek_fraction(&mut self, fraction: f64) {
        let f = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
        self.position = f * self.duration;
    }

    /// Move by `delta` seconds, clamped to the track.
    pub fn skip(&mut self, delta: f64) {
        self.position = (self.position + delta).clamp(0.0, self.duration);
    }

    /// Played fraction, or 0 when the duration is unknown.
    pub fn progress_fraction(&self) -> f64 {
        self.fraction_at(self.position)
    }

    /// Fraction of the track that `position` represents.
    pub fn fraction_at(&self, position: f64) -> f64 {
        if self.duration > 0.0 {
            (position / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// What to show this frame: photo `to` at `weight`, over photo `from` at
/// `1 - weight` while a change is fading in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossfade {
    pub from: Option<usize>,
    pub to: usize,
    pub weight: f64,
}

/// Ordered photo list with a current index, an auto-advance timer and the
/// fade state of the last change.
#[derive(Debug, Clone)]
pub struct Gallery {
    photos: Vec<String>,
    current: usize,
    interval: f64,
    elapsed: f64,
    fading_from: Option<usize>,
    fade_elapsed: f64,
}

impl Gallery {
    pub fn new(photos: Vec<String>, interval: f64) -> Self {
        let interval = if interval.is_finite() && interval > 0.0 {
            interval
        } else {
            DEFAULT_PHOTO_INTERVAL
        };
        Gallery {
            photos,
            current: 0,
            interval,
            elapsed: 0.0,
            fading_from: None,
            fade_elapsed: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&str> {
        self.photos.get(self.current).map(String::as_str)
    }

    pub fn next(&mut self) {
        if !self.photos.is_empty() {
            self.show((self.current + 1) % self.photos.len());
        }
    }

    pub fn prev(&mut self) {
        if !self.photos.is_empty() {
            self.show((self.current + self.photos.len() - 1) % self.photos.len());
        }
    }

    /// Switch to `index`, fading out of the photo on screen.
    fn show(&mut self, index: usize) {
        if index != self.current {
            self.fading_from = Some(self.current);
            self.fade_elapsed = 0.0;
            self.current = index;
        }
    }

    /// Progress the running fade by `dt` seconds.
    pub fn update_fade(&mut self, dt: f64) {
        if self.fading_from.is_none() || !(dt > 0.0) {
            return;
        }
        self.fade_elapsed += dt;
        if self.fade_elapsed >= FADE_SECS {
            self.fading_from = None;
            self.fade_elapsed = 0.0;
        }
    }

    /// Blend to draw now, or `None` for an empty gallery.
    pub fn crossfade(&self) -> Option<Crossfade> {
        if self.photos.is_empty() {
            return None;
        }
        Some(match self.fading_from {
            Some(from) => Crossfade {
                from: Some(from),
                to: self.current,
                weight: (self.fade_elapsed / FADE_SECS).clamp(0.0, 1.0),
            },
            None => Crossfade {
                from: None,
                to: self.current,
                weight: 1.0,
            },
        })
    }

    /// Start the auto-advance interval over.
    pub fn restart_cycle(&mut self) {
        self.elapsed = 0.0;
    }

    /// Accumulate `dt` seconds and step forward once per elapsed interval.
    /// Returns how many photos were advanced.
    pub fn advance(&mut self, dt: f64) -> usize {
        if !(dt > 0.0) {
            return 0;
        }
        self.elapsed += dt;
        let mut steps = 0;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            self.next();
            steps += 1;
        }
        steps
    }
}

/// User-facing controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    TogglePlay,
    /// Previous photo and skip back.
    Previous,
    /// Next photo and skip forward.
    Next,
    /// Click on the progress bar.
    Seek(f64),
}

/// Transport and gallery driven together.
#[derive(Debug, Clone)]
pub struct Slideshow {
    pub transport: Transport,
    pub gallery: Gallery,
}

impl Slideshow {
    pub fn new(transport: Transport, gallery: Gallery) -> Self {
        Slideshow { transport, gallery }
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::TogglePlay => {
                if self.transport.toggle_play() {
                    self.gallery.restart_cycle();
                }
            }
            Action::Previous => {
                self.gallery.prev();
                self.transport.skip(-SKIP_SECS);
            }
            Action::Next => {
                self.gallery.next();
                self.transport.skip(SKIP_SECS);
            }
            Action::Seek(fraction) => self.transport.seek_fraction(fraction),
        }
        debug!(
            ?action,
            playing = self.transport.is_playing(),
            position = self.transport.position(),
            photo = self.gallery.index(),
            "transport action"
        );
    }

    pub fn play(&mut self) {
        if !self.transport.is_playing() {
            self.transport.play();
            self.gallery.restart_cycle();
        }
    }

    /// Advance both clocks by `dt` seconds of wall time. A running photo
    /// fade progresses even while paused.
    pub fn tick(&mut self, dt: f64) {
        self.gallery.update_fade(dt);
        if !self.transport.is_playing() {
            return;
        }
        self.gallery.advance(dt);
        self.transport.tick(dt);
    }
}

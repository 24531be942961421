use std::time::{Duration, Instant};

use crate::animator::host::{FrameHandle, Scheduler};

/// Wall-clock frame scheduler for the terminal loop.
///
/// At most one request is outstanding. It becomes due one frame interval
/// after the previous delivery; timestamps are milliseconds since the clock
/// was created.
pub struct FrameClock {
    start: Instant,
    interval: Duration,
    last_delivered: Instant,
    next_id: u64,
    outstanding: Option<FrameHandle>,
}

impl FrameClock {
    pub fn new(fps: u32) -> Self {
        let now = Instant::now();
        FrameClock {
            start: now,
            interval: Duration::from_secs_f64(1.0 / fps.clamp(1, 120) as f64),
            last_delivered: now,
            next_id: 0,
            outstanding: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// How long until the outstanding request is due, or `None` when nothing
    /// is requested.
    pub fn time_until_due(&self) -> Option<Duration> {
        self.time_until_due_at(Instant::now())
    }

    fn time_until_due_at(&self, now: Instant) -> Option<Duration> {
        self.outstanding?;
        Some((self.last_delivered + self.interval).saturating_duration_since(now))
    }

    fn take_due_at(&mut self, now: Instant) -> Option<(FrameHandle, f64)> {
        let handle = self.outstanding?;
        if now < self.last_delivered + self.interval {
            return None;
        }
        self.outstanding = None;
        self.last_delivered = now;
        let ms = now.duration_since(self.start).as_secs_f64() * 1000.0;
        Some((handle, ms))
    }
}

impl Scheduler for FrameClock {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.outstanding = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.outstanding == Some(handle) {
            self.outstanding = None;
        }
    }

    fn take_due(&mut self) -> Option<(FrameHandle, f64)> {
        self.take_due_at(Instant::now())
    }
}

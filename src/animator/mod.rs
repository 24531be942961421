pub mod host;
pub mod particle;

use host::{FrameHandle, RandomSource, RenderTarget, Scheduler, Viewport};
use particle::{Particle, particle_count};
use tracing::{debug, info, trace};

/// Highest device pixel ratio the backing store is allowed to use.
pub const MAX_PIXEL_RATIO: f64 = 2.0;
/// How far past an edge a particle may travel before it is recycled or wrapped.
const EDGE_MARGIN: f64 = 50.0;
/// Scale applied to the sway displacement each step.
const SWAY_DAMPING: f64 = 0.02;
const WIND_FREQUENCY: f64 = 0.001;
const WIND_STRENGTH: f64 = 0.5;

/// Falling-hearts particle field.
///
/// Owns its drawing target and the particle pool. The loop runs through the
/// injected [`Scheduler`]: every step requests the next frame, and
/// [`HeartRain::pump`] delivers the due ones. Once [`HeartRain::destroy`] is
/// called no further steps happen; build a new instance to start again.
pub struct HeartRain<T, V, S, R> {
    target: T,
    viewport: V,
    scheduler: S,
    rng: R,
    particles: Vec<Particle>,
    width: f64,
    height: f64,
    pixel_ratio: f64,
    pending: Option<FrameHandle>,
    last_time: f64,
    last_elapsed: f64,
}

impl<T, V, S, R> HeartRain<T, V, S, R>
where
    T: RenderTarget,
    V: Viewport,
    S: Scheduler,
    R: RandomSource,
{
    /// Size the surface, fill the pool and draw the first frame.
    pub fn new(target: T, viewport: V, scheduler: S, rng: R) -> Self {
        let mut rain = HeartRain {
            target,
            viewport,
            scheduler,
            rng,
            particles: Vec::new(),
            width: 0.0,
            height: 0.0,
            pixel_ratio: 1.0,
            pending: None,
            last_time: 0.0,
            last_elapsed: 0.0,
        };
        rain.set_surface_size();
        rain.create_particles();
        info!(
            width = rain.width,
            height = rain.height,
            particles = rain.particles.len(),
            "heart rain started"
        );
        rain.step(0.0);
        rain
    }

    /// Match the surface to the viewport.
    ///
    /// The backing store is `floor(logical * ratio)` physical pixels and the
    /// context is scaled by the ratio so drawing stays in logical units.
    pub fn set_surface_size(&mut self) {
        let ratio = capped_pixel_ratio(self.viewport.device_pixel_ratio());
        let w = self.viewport.width().max(0.0);
        let h = self.viewport.height().max(0.0);

        self.target.set_logical_size(w, h);
        self.target
            .set_backing_size((w * ratio).floor() as usize, (h * ratio).floor() as usize);
        self.target.scale(ratio);

        self.width = w;
        self.height = h;
        self.pixel_ratio = ratio;
    }

    /// Throw away the pool and build a fresh one for the current area.
    pub fn create_particles(&mut self) {
        let count = particle_count(self.width, self.height);
        self.particles.clear();
        self.particles.reserve(count);
        for _ in 0..count {
            self.particles
                .push(Particle::spawn(&mut self.rng, self.width, self.height));
        }
        debug!(count, "particle pool rebuilt");
    }

    /// Viewport changed. Runs to completion before the next step.
    pub fn resize(&mut self) {
        self.set_surface_size();
        self.create_particles();
        info!(
            width = self.width,
            height = self.height,
            ratio = self.pixel_ratio,
            particles = self.particles.len(),
            "surface resized"
        );
    }

    /// Deliver every due frame. Returns how many steps ran.
    pub fn pump(&mut self) -> usize {
        let mut ran = 0;
        while let Some((handle, timestamp)) = self.scheduler.take_due() {
            if self.pending != Some(handle) {
                trace!(?handle, "ignoring stale frame");
                continue;
            }
            self.pending = None;
            self.step(timestamp);
            ran += 1;
        }
        ran
    }

    /// Stop the loop. Safe to call more than once.
    pub fn destroy(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
            info!("heart rain stopped");
        }
    }

    #[allow(dead_code)]
    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    #[allow(dead_code)]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn surface(&self) -> &T {
        &self.target
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut V {
        &mut self.viewport
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    #[allow(dead_code)]
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Milliseconds between the two most recent steps.
    pub fn last_elapsed_ms(&self) -> f64 {
        self.last_elapsed
    }

    fn step(&mut self, timestamp: f64) {
        self.last_elapsed = timestamp - self.last_time;
        self.last_time = timestamp;

        let (w, h) = (self.width, self.height);
        self.target.clear_rect(0.0, 0.0, w, h);

        let wind = (timestamp * WIND_FREQUENCY).sin() * WIND_STRENGTH;

        for p in &mut self.particles {
            p.phase += p.sway_speed;
            p.rotation += p.rotation_speed;

            let sway = p.phase.sin() * p.sway_amount;
            p.x += sway * SWAY_DAMPING;
            p.x += wind;
            p.y += p.speed;

            if p.y > h + EDGE_MARGIN {
                p.y = -EDGE_MARGIN;
                p.x = self.rng.range(0.0, w);
            }

            if p.x > w + EDGE_MARGIN {
                p.x = -EDGE_MARGIN;
            }
            if p.x < -EDGE_MARGIN {
                p.x = w + EDGE_MARGIN;
            }

            self.target.save();
            self.target.set_global_alpha(p.opacity);
            self.target.set_font_size(p.size);
            self.target.set_text_align_center();
            self.target.translate(p.x, p.y);
            self.target.rotate(p.rotation);
            self.target.fill_text(p.glyph, 0.0, 0.0);
            self.target.restore();
        }

        self.pending = Some(self.scheduler.request_frame());
    }
}

/// Clamp a reported device pixel ratio. Missing or nonsense values count as 1.
pub fn capped_pixel_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() && ratio > 0.0 {
        ratio.min(MAX_PIXEL_RATIO)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::particle::Glyph;
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Scheduler driven by hand: a request only becomes due on `advance`.
    #[derive(Default)]
    struct ManualScheduler {
        next_id: u64,
        now: f64,
        outstanding: Option<FrameHandle>,
        due: Option<(FrameHandle, f64)>,
        injected: Vec<(FrameHandle, f64)>,
        requests: usize,
        cancels: usize,
    }

    impl ManualScheduler {
        fn advance(&mut self, ms: f64) {
            self.now += ms;
            if let Some(handle) = self.outstanding.take() {
                self.due = Some((handle, self.now));
            }
        }

        /// Deliver an arbitrary handle, as a misbehaving host might.
        fn inject(&mut self, handle: FrameHandle) {
            self.injected.push((handle, self.now));
        }
    }

    impl Scheduler for ManualScheduler {
        fn request_frame(&mut self) -> FrameHandle {
            self.next_id += 1;
            self.requests += 1;
            let handle = FrameHandle(self.next_id);
            self.outstanding = Some(handle);
            handle
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            self.cancels += 1;
            if self.outstanding == Some(handle) {
                self.outstanding = None;
            }
            if self.due.is_some_and(|(h, _)| h == handle) {
                self.due = None;
            }
        }

        fn take_due(&mut self) -> Option<(FrameHandle, f64)> {
            self.due.take().or_else(|| self.injected.pop())
        }
    }

    struct FixedViewport {
        width: f64,
        height: f64,
        ratio: f64,
    }

    impl Viewport for FixedViewport {
        fn width(&self) -> f64 {
            self.width
        }
        fn height(&self) -> f64 {
            self.height
        }
        fn device_pixel_ratio(&self) -> f64 {
            self.ratio
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Logical(f64, f64),
        Backing(usize, usize),
        Clear(f64, f64),
        Save,
        Restore,
        Alpha(f64),
        Scale(f64),
        Translate(f64, f64),
        Rotate(f64),
        Font(f64),
        Center,
        Fill(Glyph),
    }

    #[derive(Default)]
    struct RecordingTarget {
        ops: Vec<Op>,
        backing: (usize, usize),
    }

    impl RenderTarget for RecordingTarget {
        fn set_logical_size(&mut self, width: f64, height: f64) {
            self.ops.push(Op::Logical(width, height));
        }
        fn set_backing_size(&mut self, width: usize, height: usize) {
            self.backing = (width, height);
            self.ops.push(Op::Backing(width, height));
        }
        fn backing_size(&self) -> (usize, usize) {
            self.backing
        }
        fn clear_rect(&mut self, _x: f64, _y: f64, width: f64, height: f64) {
            self.ops.push(Op::Clear(width, height));
        }
        fn save(&mut self) {
            self.ops.push(Op::Save);
        }
        fn restore(&mut self) {
            self.ops.push(Op::Restore);
        }
        fn set_global_alpha(&mut self, alpha: f64) {
            self.ops.push(Op::Alpha(alpha));
        }
        fn scale(&mut self, factor: f64) {
            self.ops.push(Op::Scale(factor));
        }
        fn translate(&mut self, x: f64, y: f64) {
            self.ops.push(Op::Translate(x, y));
        }
        fn rotate(&mut self, angle: f64) {
            self.ops.push(Op::Rotate(angle));
        }
        fn set_font_size(&mut self, px: f64) {
            self.ops.push(Op::Font(px));
        }
        fn set_text_align_center(&mut self) {
            self.ops.push(Op::Center);
        }
        fn fill_text(&mut self, glyph: Glyph, _x: f64, _y: f64) {
            self.ops.push(Op::Fill(glyph));
        }
    }

    type TestRain = HeartRain<RecordingTarget, FixedViewport, ManualScheduler, StdRng>;

    fn rain(width: f64, height: f64, ratio: f64, seed: u64) -> TestRain {
        HeartRain::new(
            RecordingTarget::default(),
            FixedViewport { width, height, ratio },
            ManualScheduler::default(),
            StdRng::seed_from_u64(seed),
        )
    }

    fn tick(rain: &mut TestRain, ms: f64) -> usize {
        rain.scheduler_mut().advance(ms);
        rain.pump()
    }

    #[test]
    fn test_construction_sizes_then_draws_first_frame() {
        let r = rain(800.0, 600.0, 1.0, 1);
        assert_eq!(r.particles().len(), 16);
        assert!(r.is_running());

        let ops = &r.surface().ops;
        assert_eq!(ops[0], Op::Logical(800.0, 600.0));
        assert_eq!(ops[1], Op::Backing(800, 600));
        assert_eq!(ops[2], Op::Scale(1.0));
        assert_eq!(ops[3], Op::Clear(800.0, 600.0));
        assert_eq!(ops.iter().filter(|o| matches!(o, Op::Fill(_))).count(), 16);
    }

    #[test]
    fn test_pixel_ratio_is_capped_at_two() {
        let r = rain(801.0, 601.0, 3.0, 1);
        let ops = &r.surface().ops;
        assert_eq!(ops[1], Op::Backing(1602, 1202));
        assert_eq!(ops[2], Op::Scale(2.0));
    }

    #[test]
    fn test_fractional_backing_size_rounds_down() {
        let r = rain(801.0, 601.0, 1.5, 1);
        assert_eq!(r.surface().backing_size(), (1201, 901));
    }

    #[test]
    fn test_capped_pixel_ratio_fallbacks() {
        assert_eq!(capped_pixel_ratio(0.0), 1.0);
        assert_eq!(capped_pixel_ratio(-2.0), 1.0);
        assert_eq!(capped_pixel_ratio(f64::NAN), 1.0);
        assert_eq!(capped_pixel_ratio(0.125), 0.125);
        assert_eq!(capped_pixel_ratio(2.5), 2.0);
    }

    #[test]
    fn test_each_particle_draw_is_balanced() {
        let r = rain(300.0, 100.0, 1.0, 3);
        let ops = &r.surface().ops;
        let tail: Vec<_> = ops[4..].to_vec();
        let p = &r.particles()[0];
        assert_eq!(
            tail,
            vec![
                Op::Save,
                Op::Alpha(p.opacity),
                Op::Font(p.size),
                Op::Center,
                Op::Translate(p.x, p.y),
                Op::Rotate(p.rotation),
                Op::Fill(p.glyph),
                Op::Restore,
            ]
        );
    }

    #[test]
    fn test_zero_area_is_inert_but_valid() {
        let mut r = rain(0.0, 0.0, 1.0, 5);
        assert!(r.particles().is_empty());
        assert_eq!(tick(&mut r, 16.0), 1);
        assert!(r.surface().ops.iter().all(|o| !matches!(o, Op::Fill(_))));
    }

    #[test]
    fn test_negative_viewport_clamps_to_empty() {
        let r = rain(-100.0, 500.0, 1.0, 5);
        assert!(r.particles().is_empty());
        assert_eq!(r.surface().backing_size(), (0, 500));
    }

    #[test]
    fn test_resize_rebuilds_pool() {
        let mut r = rain(800.0, 600.0, 1.0, 9);
        assert_eq!(r.particles().len(), 16);

        r.viewport_mut().width = 300.0;
        r.viewport_mut().height = 100.0;
        r.resize();
        assert_eq!(r.particles().len(), 1);
        assert_eq!(r.surface().backing_size(), (300, 100));
        assert!((0.0..300.0).contains(&r.particles()[0].x));
        assert!((-100.0..0.0).contains(&r.particles()[0].y));
    }

    #[test]
    fn test_resize_at_same_size_keeps_count() {
        let mut r = rain(1024.0, 768.0, 2.0, 4);
        r.resize();
        let first = r.particles().len();
        r.resize();
        assert_eq!(r.particles().len(), first);
        assert_eq!(first, 25);
    }

    #[test]
    fn test_resize_orders_backing_before_pool() {
        let mut r = rain(800.0, 600.0, 1.0, 2);
        r.surface_ops_clear();
        r.viewport_mut().width = 1600.0;
        r.resize();
        let ops = &r.surface().ops;
        assert_eq!(ops[0], Op::Logical(1600.0, 600.0));
        assert_eq!(ops[1], Op::Backing(1600, 600));
        assert!(r.particles().iter().all(|p| p.x < 1600.0));
    }

    #[test]
    fn test_step_moves_every_particle_down() {
        let mut r = rain(800.0, 600.0, 1.0, 8);
        let before: Vec<f64> = r.particles().iter().map(|p| p.y).collect();
        tick(&mut r, 16.0);
        for (p, y0) in r.particles().iter().zip(before) {
            assert_eq!(p.y, y0 + p.speed);
        }
        assert_eq!(r.last_elapsed_ms(), 16.0);
    }

    #[test]
    fn test_sway_and_wind_update_x() {
        let mut r = rain(300.0, 100.0, 1.0, 12);
        let mut expected = r.particles()[0].clone();
        tick(&mut r, 1000.0);

        expected.phase += expected.sway_speed;
        expected.x += expected.phase.sin() * expected.sway_amount * 0.02;
        expected.x += (1000.0_f64 * 0.001).sin() * 0.5;
        let p = &r.particles()[0];
        assert!((p.x - expected.x).abs() < 1e-9);
        assert!((p.rotation - (expected.rotation + expected.rotation_speed)).abs() < 1e-12);
    }

    #[test]
    fn test_vertical_recycle_resets_above_top() {
        let mut r = rain(800.0, 600.0, 1.0, 21);
        r.particles[0].y = 600.0 + 49.5;
        tick(&mut r, 16.0);
        let p = &r.particles()[0];
        assert_eq!(p.y, -50.0);
        assert!((0.0..800.0).contains(&p.x));
    }

    #[test]
    fn test_horizontal_wrap_both_directions() {
        let mut r = rain(800.0, 600.0, 1.0, 22);
        r.particles[0].x = 800.0 + 60.0;
        r.particles[1].x = -60.0;
        let y0 = r.particles[0].y;
        tick(&mut r, 16.0);
        assert_eq!(r.particles()[0].x, -50.0);
        assert_eq!(r.particles()[1].x, 850.0);
        assert_eq!(r.particles()[0].y, y0 + r.particles()[0].speed);
    }

    #[test]
    fn test_x_stays_within_margins() {
        let mut r = rain(640.0, 480.0, 1.0, 33);
        for _ in 0..1500 {
            tick(&mut r, 16.0);
            for p in r.particles() {
                assert!(p.x >= -50.0 && p.x <= 690.0, "x = {}", p.x);
                assert!(p.y <= 480.0 + 50.0 + 3.0);
            }
        }
    }

    #[test]
    fn test_destroy_stops_the_loop() {
        let mut r = rain(800.0, 600.0, 1.0, 40);
        assert_eq!(tick(&mut r, 16.0), 1);
        r.destroy();
        assert!(!r.is_running());

        let ys: Vec<f64> = r.particles().iter().map(|p| p.y).collect();
        for _ in 0..10 {
            assert_eq!(tick(&mut r, 16.0), 0);
        }
        let after: Vec<f64> = r.particles().iter().map(|p| p.y).collect();
        assert_eq!(ys, after);
        assert_eq!(r.particles().len(), 16);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut r = rain(800.0, 600.0, 1.0, 41);
        r.destroy();
        r.destroy();
        r.destroy();
        assert_eq!(r.scheduler().cancels, 1);
    }

    #[test]
    fn test_stale_handles_are_ignored() {
        let mut r = rain(800.0, 600.0, 1.0, 42);
        r.scheduler_mut().inject(FrameHandle(999));
        assert_eq!(r.pump(), 0);

        r.destroy();
        r.scheduler_mut().inject(FrameHandle(1));
        assert_eq!(r.pump(), 0);
    }

    #[test]
    fn test_one_request_per_step() {
        let mut r = rain(800.0, 600.0, 1.0, 43);
        for _ in 0..5 {
            tick(&mut r, 16.0);
        }
        assert_eq!(r.scheduler().requests, 6);
    }

    #[test]
    fn test_same_seed_same_field() {
        let mut a = rain(1280.0, 720.0, 1.0, 77);
        let mut b = rain(1280.0, 720.0, 1.0, 77);
        for _ in 0..200 {
            tick(&mut a, 16.0);
            tick(&mut b, 16.0);
        }
        for (pa, pb) in a.particles().iter().zip(b.particles()) {
            assert_eq!(pa.x, pb.x);
            assert_eq!(pa.y, pb.y);
        }
    }

    #[test]
    fn test_120_frames_fall_monotonically() {
        let mut r = rain(800.0, 600.0, 1.0, 2024);
        assert_eq!(r.particles().len(), 16);

        let mut prev: Vec<f64> = r.particles().iter().map(|p| p.y).collect();
        let mut recycles = vec![0usize; prev.len()];
        for _ in 0..120 {
            assert_eq!(tick(&mut r, 16.0), 1);
            for (i, p) in r.particles().iter().enumerate() {
                if p.y < prev[i] {
                    assert_eq!(p.y, -50.0);
                    recycles[i] += 1;
                } else {
                    assert_eq!(p.y, prev[i] + p.speed);
                }
                prev[i] = p.y;
            }
        }
        assert!(recycles.iter().all(|&n| n <= 1));
    }

    impl TestRain {
        fn surface_ops_clear(&mut self) {
            self.target.ops.clear();
        }
    }
}

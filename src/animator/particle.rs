use super::host::RandomSource;
use std::f64::consts::TAU;

/// Upper bound on the pool size regardless of surface area.
pub const MAX_PARTICLES: usize = 25;
/// Logical square pixels of surface per particle.
pub const AREA_PER_PARTICLE: f64 = 30_000.0;

/// The heart symbols a particle can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    RedHeart,
    TwoHearts,
    SparklingHeart,
    GrowingHeart,
    HeartWithRibbon,
    HeartWithArrow,
}

impl Glyph {
    pub const ALL: [Glyph; 6] = [
        Glyph::RedHeart,
        Glyph::TwoHearts,
        Glyph::SparklingHeart,
        Glyph::GrowingHeart,
        Glyph::HeartWithRibbon,
        Glyph::HeartWithArrow,
    ];

    fn pick(rng: &mut (impl RandomSource + ?Sized)) -> Glyph {
        let idx = (rng.next_unit() * Self::ALL.len() as f64) as usize;
        Self::ALL[idx.min(Self::ALL.len() - 1)]
    }
}

/// One falling heart.
#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub speed: f64,
    pub sway_speed: f64,
    pub sway_amount: f64,
    pub rotation: f64,
    pub rotation_speed: f64,
    pub opacity: f64,
    pub glyph: Glyph,
    pub phase: f64,
}

impl Particle {
    /// Spawn above the visible area of a `width` x `height` surface.
    ///
    /// Fields are drawn from `rng` in declaration order so a seeded source
    /// always yields the same pool.
    pub fn spawn(rng: &mut (impl RandomSource + ?Sized), width: f64, height: f64) -> Self {
        Particle {
            x: rng.range(0.0, width),
            y: rng.range(-height, 0.0),
            size: rng.range(16.0, 32.0),
            speed: rng.range(1.0, 3.0),
            sway_speed: rng.range(0.02, 0.04),
            sway_amount: rng.range(20.0, 60.0),
            rotation: rng.range(0.0, TAU),
            rotation_speed: rng.range(-0.015, 0.015),
            opacity: rng.range(0.6, 1.0),
            glyph: Glyph::pick(rng),
            phase: rng.range(0.0, TAU),
        }
    }
}

/// Number of particles for a surface of the given logical size.
pub fn particle_count(width: f64, height: f64) -> usize {
    let area = width.max(0.0) * height.max(0.0);
    if !area.is_finite() {
        return if area.is_nan() { 0 } else { MAX_PARTICLES };
    }
    ((area / AREA_PER_PARTICLE).floor() as usize).min(MAX_PARTICLES)
}

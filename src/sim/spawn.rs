//! Cube factory: randomized spawn within configured ranges
//!
//! Pure construction only - the caller owns insertion into the live
//! collection and id allocation.

use glam::Vec2;
use rand::Rng;

use super::state::{Cube, Viewport};
use crate::config::FieldConfig;
use crate::consts::*;

/// Uniform draw from an inclusive-exclusive range; degenerate ranges collapse
/// to the lower bound instead of panicking
#[inline]
pub fn rand_in<R: Rng + ?Sized>(rng: &mut R, range: (f32, f32)) -> f32 {
    if range.1 <= range.0 {
        return range.0;
    }
    rng.random_range(range.0..range.1)
}

/// Random sign, ±1 with equal probability
#[inline]
pub fn rand_sign<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    if rng.random_bool(0.5) { 1.0 } else { -1.0 }
}

/// Construct one cube with randomized size, position, rotation, velocity and
/// spin
///
/// Size is drawn from the normalized config range and floored to an integer.
/// Position is drawn inside `[0, W-size] x [0, H-size]`, pinned at 0 when the
/// cube is larger than the viewport. Velocity and spin are base-range draws;
/// the config multipliers apply at step time.
pub fn spawn_cube<R: Rng + ?Sized>(
    cfg: &FieldConfig,
    view: Viewport,
    id: u32,
    rng: &mut R,
) -> Cube {
    let size = rand_in(rng, cfg.size_range()).floor();

    let x = rand_in(rng, (0.0, (view.w - size).max(0.0)));
    let y = rand_in(rng, (0.0, (view.h - size).max(0.0)));

    Cube {
        id,
        size,
        pos: Vec2::new(x, y),
        vel: Vec2::new(
            rand_sign(rng) * rand_in(rng, VELOCITY_RANGE),
            rand_sign(rng) * rand_in(rng, VELOCITY_RANGE),
        ),
        rot: Vec2::new(
            rng.random_range(0.0..360.0),
            rng.random_range(0.0..360.0),
        ),
        spin: Vec2::new(
            rand_sign(rng) * rand_in(rng, SPIN_RANGE),
            rand_sign(rng) * rand_in(rng, SPIN_RANGE),
        ),
        cooldown_ms: 0.0,
    }
}

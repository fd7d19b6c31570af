//! Split resolver: one bounced cube becomes two half-size children
//!
//! Children are deflected along the axis opposite to the wall they hit, so a
//! left/right bounce sprays the pair up and down rather than straight back
//! into the same wall.

use glam::Vec2;
use rand::Rng;

use super::spawn::rand_in;
use super::state::{Cube, IdAlloc};
use crate::config::FieldConfig;
use crate::consts::*;

/// Axis of the wall a cube struck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Left or right wall
    X,
    /// Top or bottom wall
    Y,
}

/// Attempt to split a cube that just bounced off a wall on `axis`
///
/// Returns the two children, or `None` when the cube is already at the size
/// floor or halving would drop below it. The caller replaces the parent with
/// the children; the parent is never kept.
pub fn try_split<R: Rng + ?Sized>(
    cube: &Cube,
    axis: Axis,
    cfg: &FieldConfig,
    ids: &mut IdAlloc,
    rng: &mut R,
) -> Option<(Cube, Cube)> {
    if cube.size <= MIN_SIZE {
        return None;
    }
    let half = (cube.size / 2.0).floor();
    if half < MIN_SIZE {
        return None;
    }

    // Re-center both children within the parent footprint
    let pos = cube.pos + Vec2::splat((cube.size - half) / 2.0);
    // Per-axis jitter, shared by both children
    let spin = Vec2::new(
        cube.spin.x * rand_in(rng, SPLIT_SPIN_JITTER),
        cube.spin.y * rand_in(rng, SPLIT_SPIN_JITTER),
    );

    // Deflect along the axis opposite the collision; the component along the
    // collision axis is inherited unchanged from the parent.
    let (vel_a, vel_b) = match axis {
        Axis::X => {
            let mag = cube.vel.y.abs().max(cfg.split_deflect);
            (Vec2::new(cube.vel.x, mag), Vec2::new(cube.vel.x, -mag))
        }
        Axis::Y => {
            let mag = cube.vel.x.abs().max(cfg.split_deflect);
            (Vec2::new(mag, cube.vel.y), Vec2::new(-mag, cube.vel.y))
        }
    };

    let mut child = |vel: Vec2| Cube {
        id: ids.next_id(),
        size: half,
        pos,
        vel,
        rot: cube.rot,
        spin,
        cooldown_ms: 0.0,
    };

    Some((child(vel_a), child(vel_b)))
}

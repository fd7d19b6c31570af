//! Per-frame simulation step
//!
//! Advances every cube on a cloned working set and commits it only when no
//! cube has fallen to the size floor; a floored cube aborts the commit and
//! signals the controller to run the glitch transition instead.

use rand::Rng;

use super::split::{Axis, try_split};
use super::state::{FieldState, Impact, Viewport};
use crate::config::FieldConfig;
use crate::consts::*;
use crate::wrap_degrees;

/// What a single step did to the field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Membership changed (splits), not just in-place motion
    pub structure_changed: bool,
    /// A cube reached the size floor; the stepped state was NOT committed
    pub glitch: bool,
    /// Wall contacts this step
    pub bounces: u32,
    /// Splits performed this step
    pub splits: u32,
}

/// `sign(v)` with zero treated as positive, matching the bounce deflection
/// rule `sign(v or 1)`
#[inline]
fn sign_or_one(v: f32) -> f32 {
    if v == 0.0 { 1.0 } else { v.signum() }
}

/// Advance the field by one frame
///
/// `now` is the monotonic clock in seconds (used for impact aging), `dt` the
/// elapsed time since the previous step, clamped to [`MAX_DELTA`]. Collision
/// resolution is reactive per axis; when both axes bounce in one step the last
/// detected axis drives the (single) split attempt.
pub fn step(
    state: &mut FieldState,
    cfg: &FieldConfig,
    view: Viewport,
    now: f64,
    dt: f32,
) -> StepReport {
    let dt = dt.clamp(0.0, MAX_DELTA);
    let mut report = StepReport::default();
    let mut next = state.cubes.clone();
    let mut spawned: Vec<Impact> = Vec::new();

    let mut i = 0;
    while i < next.len() {
        let mut bounce_axis: Option<Axis> = None;
        {
            let cube = &mut next[i];

            cube.pos += cube.vel * cfg.speed_mul * dt;
            cube.rot.x = wrap_degrees(cube.rot.x + cube.spin.x * cfg.rot_mul * dt);
            cube.rot.y = wrap_degrees(cube.rot.y + cube.spin.y * cfg.rot_mul * dt);
            cube.cooldown_ms = (cube.cooldown_ms - dt * 1_000.0).max(0.0);

            // Left/right walls
            if cube.pos.x < 0.0 {
                cube.pos.x = 0.0;
                cube.vel.x = cube.vel.x.abs()
                    + sign_or_one(cube.vel.x) * cfg.bounce_deflect * state.rng.random::<f32>();
                bounce_axis = Some(Axis::X);
            } else if cube.pos.x + cube.size > view.w {
                cube.pos.x = view.w - cube.size;
                cube.vel.x = -cube.vel.x.abs()
                    - sign_or_one(cube.vel.x) * cfg.bounce_deflect * state.rng.random::<f32>();
                bounce_axis = Some(Axis::X);
            }

            // Top/bottom walls; on a corner hit this overwrites the axis, so
            // the last axis that bounced drives the split attempt
            if cube.pos.y < 0.0 {
                cube.pos.y = 0.0;
                cube.vel.y = cube.vel.y.abs()
                    + sign_or_one(cube.vel.y) * cfg.bounce_deflect * state.rng.random::<f32>();
                bounce_axis = Some(Axis::Y);
            } else if cube.pos.y + cube.size > view.h {
                cube.pos.y = view.h - cube.size;
                cube.vel.y = -cube.vel.y.abs()
                    - sign_or_one(cube.vel.y) * cfg.bounce_deflect * state.rng.random::<f32>();
                bounce_axis = Some(Axis::Y);
            }
        }

        if let Some(axis) = bounce_axis {
            report.bounces += 1;

            if next[i].cooldown_ms <= 0.0 {
                next[i].cooldown_ms = COOLDOWN_MS;
                let id = state.impact_ids.next_id();
                spawned.push(Impact::new(id, next[i].center(), now));

                // A split is a net +1 cube; skip it at the safety cap
                if next.len() < MAX_CUBES
                    && let Some((a, b)) =
                        try_split(&next[i], axis, cfg, &mut state.cube_ids, &mut state.rng)
                {
                    next.splice(i..=i, [a, b]);
                    report.structure_changed = true;
                    report.splits += 1;
                    i += 1; // skip the second child this step
                }
            }
        }

        i += 1;
    }

    // Size-floor post-pass: abort the commit, the controller glitches
    if next.iter().any(|c| c.size <= MIN_SIZE) {
        report.glitch = true;
        report.structure_changed = true;
        return report;
    }

    state.cubes = next;
    state.impacts.extend(spawned);
    state.impacts.retain(|im| !im.expired(now));
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Cube;
    use glam::Vec2;
    use proptest::prelude::*;

    fn cube(id: u32, size: f32, pos: Vec2, vel: Vec2) -> Cube {
        Cube {
            id,
            size,
            pos,
            vel,
            rot: Vec2::new(10.0, 20.0),
            spin: Vec2::new(90.0, -120.0),
            cooldown_ms: 0.0,
        }
    }

    /// Config with all randomness in velocity reflection removed
    fn flat_cfg() -> FieldConfig {
        FieldConfig {
            speed_mul: 1.0,
            rot_mul: 1.0,
            bounce_deflect: 0.0,
            split_deflect: 220.0,
            ..Default::default()
        }
    }

    const VIEW: Viewport = Viewport { w: 1_000.0, h: 1_000.0 };

    #[test]
    fn test_integration_and_rotation_wrap() {
        let mut state = FieldState::new(1);
        let mut c = cube(1, 100.0, Vec2::new(400.0, 400.0), Vec2::new(100.0, -50.0));
        c.rot = Vec2::new(359.0, 5.0);
        c.spin = Vec2::new(100.0, -100.0);
        c.cooldown_ms = 60.0;
        state.cubes.push(c);

        let report = step(&mut state, &flat_cfg(), VIEW, 0.0, 0.02);
        assert_eq!(report, StepReport::default());

        let c = &state.cubes[0];
        assert_eq!(c.pos, Vec2::new(402.0, 399.0));
        assert!((c.rot.x - 1.0).abs() < 1e-3); // 359 + 2, wrapped
        assert!((c.rot.y - 3.0).abs() < 1e-3);
        assert!((c.cooldown_ms - 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_speed_mul_applies_per_step_not_retroactively() {
        let mut state = FieldState::new(1);
        state
            .cubes
            .push(cube(1, 100.0, Vec2::new(400.0, 400.0), Vec2::new(100.0, 0.0)));
        let cfg = FieldConfig {
            speed_mul: 3.0,
            ..flat_cfg()
        };
        step(&mut state, &cfg, VIEW, 0.0, 0.01);
        assert_eq!(state.cubes[0].pos.x, 403.0);
        // Stored velocity stays unscaled
        assert_eq!(state.cubes[0].vel.x, 100.0);
    }

    #[test]
    fn test_dt_clamped_to_max_delta() {
        let mut state = FieldState::new(1);
        state
            .cubes
            .push(cube(1, 100.0, Vec2::new(400.0, 400.0), Vec2::new(100.0, 0.0)));
        step(&mut state, &flat_cfg(), VIEW, 0.0, 5.0);
        assert_eq!(state.cubes[0].pos.x, 400.0 + 100.0 * MAX_DELTA);
    }

    #[test]
    fn test_left_wall_bounce_reflects_and_splits() {
        let mut state = FieldState::new(1);
        // Heading left past the wall this step
        state
            .cubes
            .push(cube(1, 100.0, Vec2::new(1.0, 400.0), Vec2::new(-300.0, 50.0)));

        let report = step(&mut state, &flat_cfg(), VIEW, 0.5, 0.02);
        assert!(report.structure_changed);
        assert_eq!(report.bounces, 1);
        assert_eq!(report.splits, 1);

        // Parent consumed, two children in its place
        assert_eq!(state.cubes.len(), 2);
        assert!(state.cubes.iter().all(|c| c.id != 1));
        assert!(state.cubes.iter().all(|c| c.size == 50.0));
        // bounce_deflect = 0: reflected x speed is exactly |vx|, inherited
        assert_eq!(state.cubes[0].vel.x, 300.0);
        // Perpendicular deflection ±max(|vy|, split_deflect) = ±220
        assert_eq!(state.cubes[0].vel.y, 220.0);
        assert_eq!(state.cubes[1].vel.y, -220.0);

        // One impact at the bounced parent's center
        assert_eq!(state.impacts.len(), 1);
        assert_eq!(state.impacts[0].pos, Vec2::new(50.0, 451.0));
        assert_eq!(state.impacts[0].start, 0.5);
    }

    #[test]
    fn test_right_wall_reflects_negative() {
        let mut state = FieldState::new(1);
        let mut c = cube(1, 100.0, Vec2::new(899.0, 400.0), Vec2::new(300.0, 0.0));
        c.cooldown_ms = 120.0; // isolate reflection from splitting
        state.cubes.push(c);

        step(&mut state, &flat_cfg(), VIEW, 0.0, 0.02);
        let c = &state.cubes[0];
        assert_eq!(c.pos.x, 900.0);
        assert_eq!(c.vel.x, -300.0);
    }

    #[test]
    fn test_bounce_deflect_perturbs_reflection() {
        // Deflection follows the sign of the incoming velocity: an inbound
        // left-wall hit (vx < 0) sheds up to bounce_deflect of speed
        let mut state = FieldState::new(1);
        let mut c = cube(1, 100.0, Vec2::new(1.0, 400.0), Vec2::new(-300.0, 0.0));
        c.cooldown_ms = 120.0;
        state.cubes.push(c);
        let cfg = FieldConfig {
            bounce_deflect: 80.0,
            ..flat_cfg()
        };
        step(&mut state, &cfg, VIEW, 0.0, 0.02);
        let vx = state.cubes[0].vel.x;
        assert!((220.0..=300.0).contains(&vx), "vx = {vx}");
    }

    #[test]
    fn test_corner_hit_attempts_one_split() {
        let mut state = FieldState::new(1);
        // Dives into the top-left corner; both axes bounce, y is detected last
        state
            .cubes
            .push(cube(1, 100.0, Vec2::new(1.0, 1.0), Vec2::new(-300.0, -300.0)));

        let report = step(&mut state, &flat_cfg(), VIEW, 0.0, 0.02);
        assert_eq!(report.splits, 1);
        assert_eq!(state.cubes.len(), 2);
        // Last axis was y, so the pair separates along x
        assert_eq!(state.cubes[0].vel.x, 300.0);
        assert_eq!(state.cubes[1].vel.x, -300.0);
        assert_eq!(state.cubes[0].vel.y, state.cubes[1].vel.y);
    }

    #[test]
    fn test_cooldown_suppresses_second_split() {
        let mut state = FieldState::new(1);
        let mut c = cube(1, 100.0, Vec2::new(1.0, 400.0), Vec2::new(-300.0, 0.0));
        c.cooldown_ms = 100.0; // bounced less than 120 ms ago
        state.cubes.push(c);

        let report = step(&mut state, &flat_cfg(), VIEW, 0.0, 0.02);
        assert_eq!(report.bounces, 1);
        assert_eq!(report.splits, 0);
        assert!(!report.structure_changed);
        assert_eq!(state.cubes.len(), 1);
        assert!(state.impacts.is_empty());
        // Velocity still reflects, cooldown keeps decaying without re-arming
        assert_eq!(state.cubes[0].vel.x, 300.0);
        assert!((state.cubes[0].cooldown_ms - 80.0).abs() < 1e-3);
    }

    #[test]
    fn test_glitch_reported_without_commit() {
        let mut state = FieldState::new(1);
        state
            .cubes
            .push(cube(1, 1.0, Vec2::new(400.0, 400.0), Vec2::new(100.0, 0.0)));

        let report = step(&mut state, &flat_cfg(), VIEW, 0.0, 0.02);
        assert!(report.glitch);
        assert!(report.structure_changed);
        // Stepped state not committed: position unchanged
        assert_eq!(state.cubes[0].pos, Vec2::new(400.0, 400.0));
    }

    #[test]
    fn test_split_to_floor_glitches_same_step() {
        let mut state = FieldState::new(1);
        // Size 2 splits into two size-1 children, which breach the floor
        state
            .cubes
            .push(cube(1, 2.0, Vec2::new(0.5, 400.0), Vec2::new(-300.0, 0.0)));

        let report = step(&mut state, &flat_cfg(), VIEW, 0.0, 0.02);
        assert_eq!(report.splits, 1);
        assert!(report.glitch);
        assert_eq!(state.cubes.len(), 1); // original collection untouched
    }

    #[test]
    fn test_impacts_expire() {
        let mut state = FieldState::new(1);
        state
            .cubes
            .push(cube(1, 100.0, Vec2::new(400.0, 400.0), Vec2::ZERO));
        state.impacts.push(Impact::new(1, Vec2::ZERO, 0.0));
        state.impacts.push(Impact::new(2, Vec2::ZERO, 9.8));

        step(&mut state, &flat_cfg(), VIEW, 10.0, 0.02);
        assert_eq!(state.impacts.len(), 1);
        assert_eq!(state.impacts[0].id, 2);
    }

    #[test]
    fn test_fragment_cap_skips_split() {
        let mut state = FieldState::new(1);
        for id in 0..MAX_CUBES as u32 {
            state
                .cubes
                .push(cube(id, 10.0, Vec2::new(400.0, 400.0), Vec2::ZERO));
        }
        // One cube at the wall, eligible to split
        state.cubes[0].pos = Vec2::new(1.0, 400.0);
        state.cubes[0].vel = Vec2::new(-300.0, 0.0);

        let report = step(&mut state, &flat_cfg(), VIEW, 0.0, 0.02);
        assert_eq!(report.bounces, 1);
        assert_eq!(report.splits, 0);
        assert_eq!(state.cubes.len(), MAX_CUBES);
        // Cooldown and impact still apply to the suppressed split
        assert_eq!(state.impacts.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_cubes_stay_inside_bounds(
            x in -2_000.0f32..2_000.0,
            y in -2_000.0f32..2_000.0,
            vx in -1_000.0f32..1_000.0,
            vy in -1_000.0f32..1_000.0,
            size in 4.0f32..400.0,
            dt in 0.0f32..0.05,
            seed in 0u64..1_000,
        ) {
            let mut state = FieldState::new(seed);
            let size = size.floor();
            state.cubes.push(cube(1, size, Vec2::new(x, y), Vec2::new(vx, vy)));

            let report = step(&mut state, &FieldConfig::default(), VIEW, 0.0, dt);
            prop_assert!(!report.glitch);
            for c in &state.cubes {
                prop_assert!(c.pos.x >= 0.0 && c.pos.x <= VIEW.w - c.size);
                prop_assert!(c.pos.y >= 0.0 && c.pos.y <= VIEW.h - c.size);
                prop_assert!(c.cooldown_ms >= 0.0);
                prop_assert!((0.0..360.0).contains(&c.rot.x));
                prop_assert!((0.0..360.0).contains(&c.rot.y));
                prop_assert!(c.size > MIN_SIZE);
            }
        }
    }
}

//! Cube Field - an animated field of bouncing, splitting cuboids
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, wall bounces, splits, the
//!   glitch/reset state machine)
//! - `config`: Live-adjustable parameter record supplied by the settings panel
//!
//! Rendering is deliberately absent: a presentation layer polls the
//! [`sim::CubeField`] render feed once per frame and draws whatever it finds.

pub mod config;
pub mod sim;

pub use config::FieldConfig;
pub use sim::{Cube, CubeField, FieldPhase, Impact, Viewport};

/// Simulation constants
pub mod consts {
    /// Size floor (px). Any cube at or below this triggers the glitch reset.
    pub const MIN_SIZE: f32 = 1.0;
    /// Maximum per-step delta time (seconds), prevents large jumps after pauses
    pub const MAX_DELTA: f32 = 0.032;
    /// Cooldown (ms) before a cube may trigger another bounce-driven split
    pub const COOLDOWN_MS: f32 = 120.0;

    /// Impact effect lifetime (seconds)
    pub const IMPACT_LIFE: f32 = 0.45;
    /// Impact effect starting radius (px)
    pub const IMPACT_SIZE: f32 = 28.0;

    /// Base spawn speed magnitude per axis (px/s), before `speed_mul`
    pub const VELOCITY_RANGE: (f32, f32) = (300.0, 600.0);
    /// Base spawn spin magnitude per axis (deg/s), before `rot_mul`
    pub const SPIN_RANGE: (f32, f32) = (80.0, 200.0);
    /// Child spin scale range applied on split
    pub const SPLIT_SPIN_JITTER: (f32, f32) = (0.85, 1.35);

    /// Fragment safety cap: a split that would exceed this is skipped
    pub const MAX_CUBES: usize = 512;
}

/// Wrap an angle in degrees to [0, 360)
#[inline]
pub fn wrap_degrees(deg: f32) -> f32 {
    deg.rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert_eq!(wrap_degrees(725.0), 5.0);
        assert_eq!(wrap_degrees(-30.0), 330.0);
        assert!(wrap_degrees(359.999) < 360.0);
    }
}

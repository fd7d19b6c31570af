//! Field state and core simulation types

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Viewport bounds in pixels, (0,0) is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub w: f32,
    pub h: f32,
}

impl Viewport {
    pub fn new(w: f32, h: f32) -> Self {
        Self { w, h }
    }
}

/// A simulated cuboid
///
/// `pos` is the top-left anchor. `vel` and `spin` are stored unscaled; the
/// `speed_mul`/`rot_mul` config multipliers are applied at step time, not at
/// spawn, so slider changes never rescale existing cubes retroactively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cube {
    pub id: u32,
    /// Edge length (px)
    pub size: f32,
    /// Top-left anchor (px)
    pub pos: Vec2,
    /// Velocity (px/s), signed
    pub vel: Vec2,
    /// Rotation per axis (degrees), wrapped to [0, 360)
    pub rot: Vec2,
    /// Spin per axis (deg/s), signed
    pub spin: Vec2,
    /// Milliseconds until this cube may trigger another bounce-driven split
    pub cooldown_ms: f32,
}

impl Cube {
    /// Center point of the cube footprint
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }

    /// Clamp the anchor so the footprint stays inside the viewport
    pub fn clamp_into(&mut self, view: Viewport) {
        self.pos.x = self.pos.x.clamp(0.0, (view.w - self.size).max(0.0));
        self.pos.y = self.pos.y.clamp(0.0, (view.h - self.size).max(0.0));
    }
}

/// Transient visual marker spawned at a bounce point, not physically simulated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Impact {
    pub id: u32,
    /// Bounce point (px)
    pub pos: Vec2,
    /// Creation timestamp (seconds, monotonic clock)
    pub start: f64,
    /// Lifetime (seconds)
    pub life: f32,
    /// Initial visual radius (px)
    pub size: f32,
}

impl Impact {
    pub fn new(id: u32, pos: Vec2, now: f64) -> Self {
        Self {
            id,
            pos,
            start: now,
            life: IMPACT_LIFE,
            size: IMPACT_SIZE,
        }
    }

    /// Seconds since creation
    pub fn age(&self, now: f64) -> f32 {
        (now - self.start).max(0.0) as f32
    }

    /// Normalized age in [0, 1]; presentation derives scale and fade from this
    pub fn progress(&self, now: f64) -> f32 {
        (self.age(now) / self.life).clamp(0.0, 1.0)
    }

    pub fn expired(&self, now: f64) -> bool {
        self.age(now) >= self.life
    }
}

/// Current phase of the field session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldPhase {
    /// Normal stepping
    Running,
    /// Field cleared, waiting out the glitch pause
    Glitching,
}

/// Monotonically increasing id allocator, owned per field instance so
/// concurrent fields (e.g. in tests) never share counters
#[derive(Debug, Clone)]
pub struct IdAlloc {
    next: u32,
}

impl Default for IdAlloc {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAlloc {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Live simulation state: cubes, impact effects, id allocators, seeded RNG
///
/// Not serialized - the field is ephemeral by design and resets on reload.
#[derive(Debug, Clone)]
pub struct FieldState {
    /// Seed for reproducibility
    pub seed: u64,
    /// Live cubes
    pub cubes: Vec<Cube>,
    /// Live impact effects
    pub impacts: Vec<Impact>,
    pub(crate) cube_ids: IdAlloc,
    pub(crate) impact_ids: IdAlloc,
    pub(crate) rng: Pcg32,
}

impl FieldState {
    /// Create an empty field state with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            cubes: Vec::new(),
            impacts: Vec::new(),
            cube_ids: IdAlloc::new(),
            impact_ids: IdAlloc::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Allocate a fresh cube id
    pub fn next_cube_id(&mut self) -> u32 {
        self.cube_ids.next_id()
    }

    /// Allocate a fresh impact id
    pub fn next_impact_id(&mut self) -> u32 {
        self.impact_ids.next_id()
    }
}

//! Field/session controller
//!
//! Owns the live state and the Running/Glitching state machine. The
//! surrounding shell drives it with a monotonic clock once per rendered frame
//! and polls the render feed afterwards; the only commands flowing back in
//! are `reset` and viewport resizes.

use super::spawn::spawn_cube;
use super::state::{Cube, FieldPhase, FieldState, Impact, Viewport};
use super::step::step;
use crate::config::FieldConfig;
use crate::consts::MAX_DELTA;

/// Pending glitch-to-running transition
///
/// Stamped with the controller generation at arming time; a timer whose
/// generation no longer matches is stale (a reset ran in between) and must
/// never fire.
#[derive(Debug, Clone, Copy)]
struct GlitchTimer {
    deadline: f64,
    generation: u64,
}

/// What a single frame did, for the presentation layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Cube membership changed; rebuild the mesh list
    pub structure_changed: bool,
    /// The field just cleared and entered the glitch pause
    pub glitch_started: bool,
    /// The glitch pause ended and a fresh seed cube spawned
    pub resumed: bool,
}

/// The animated cube field
///
/// Created Running with one seed cube. Dropping the field cancels any pending
/// glitch timer along with everything else.
#[derive(Debug)]
pub struct CubeField {
    pub(crate) state: FieldState,
    view: Viewport,
    phase: FieldPhase,
    glitch: Option<GlitchTimer>,
    generation: u64,
    last_now: Option<f64>,
}

impl CubeField {
    /// Create a field with one freshly spawned seed cube
    pub fn new(seed: u64, cfg: &FieldConfig, view: Viewport) -> Self {
        let mut field = Self {
            state: FieldState::new(seed),
            view,
            phase: FieldPhase::Running,
            glitch: None,
            generation: 0,
            last_now: None,
        };
        field.reseed(cfg);
        field
    }

    /// Advance one frame
    ///
    /// `now` is the shared monotonic clock in seconds. The first call
    /// establishes the clock baseline (dt = 0); later calls integrate the
    /// elapsed time, clamped to [`MAX_DELTA`]. While Glitching this is a
    /// no-op until the pause deadline passes.
    pub fn advance(&mut self, cfg: &FieldConfig, now: f64) -> FrameReport {
        let dt = match self.last_now {
            Some(prev) => ((now - prev) as f32).clamp(0.0, MAX_DELTA),
            None => 0.0,
        };
        self.last_now = Some(now);

        match self.phase {
            FieldPhase::Glitching => {
                let Some(timer) = self.glitch else {
                    return FrameReport::default();
                };
                if timer.generation != self.generation {
                    // A reset ran after this timer was armed; never fire it
                    log::debug!("dropping stale glitch timer");
                    self.glitch = None;
                    return FrameReport::default();
                }
                if now < timer.deadline {
                    return FrameReport::default();
                }

                self.glitch = None;
                self.reseed(cfg);
                self.phase = FieldPhase::Running;
                log::info!("glitch over, field reseeded");
                FrameReport {
                    structure_changed: true,
                    resumed: true,
                    ..Default::default()
                }
            }

            FieldPhase::Running => {
                let report = step(&mut self.state, cfg, self.view, now, dt);
                if report.glitch {
                    self.state.cubes.clear();
                    self.state.impacts.clear();
                    self.phase = FieldPhase::Glitching;
                    self.glitch = Some(GlitchTimer {
                        deadline: now + cfg.glitch_secs(),
                        generation: self.generation,
                    });
                    log::info!("size floor reached, glitching for {} ms", cfg.glitch_ms);
                    return FrameReport {
                        structure_changed: true,
                        glitch_started: true,
                        ..Default::default()
                    };
                }
                FrameReport {
                    structure_changed: report.structure_changed,
                    ..Default::default()
                }
            }
        }
    }

    /// Clear the field and spawn a fresh seed cube immediately
    ///
    /// Ignored while Glitching so manual resets cannot overlap the pending
    /// glitch reset.
    pub fn reset(&mut self, cfg: &FieldConfig) {
        if self.phase == FieldPhase::Glitching {
            log::debug!("reset ignored while glitching");
            return;
        }
        self.generation += 1;
        self.glitch = None;
        self.reseed(cfg);
        log::info!("field reset");
    }

    /// Update viewport bounds, re-clamping cube positions into the new area
    ///
    /// Cubes are kept, not regenerated.
    pub fn resize(&mut self, view: Viewport) {
        self.view = view;
        for cube in &mut self.state.cubes {
            cube.clamp_into(view);
        }
    }

    fn reseed(&mut self, cfg: &FieldConfig) {
        self.state.impacts.clear();
        let id = self.state.next_cube_id();
        let seed = spawn_cube(cfg, self.view, id, &mut self.state.rng);
        self.state.cubes = vec![seed];
    }

    // --- Render feed (read-only, polled once per rendered frame) ---

    /// Live cubes in stable id order
    pub fn cubes(&self) -> &[Cube] {
        &self.state.cubes
    }

    /// Fetch one cube's latest attributes by id
    pub fn cube(&self, id: u32) -> Option<&Cube> {
        self.state.cubes.iter().find(|c| c.id == id)
    }

    /// Ids of the live cubes
    pub fn cube_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.state.cubes.iter().map(|c| c.id)
    }

    /// Live impact effects
    pub fn impacts(&self) -> &[Impact] {
        &self.state.impacts
    }

    /// Fetch one impact effect by id
    pub fn impact(&self, id: u32) -> Option<&Impact> {
        self.state.impacts.iter().find(|i| i.id == id)
    }

    pub fn phase(&self) -> FieldPhase {
        self.phase
    }

    pub fn viewport(&self) -> Viewport {
        self.view
    }
}

//! Deterministic cube-field simulation
//!
//! All field logic lives here. This module must stay pure and deterministic:
//! - Clock and viewport supplied by the caller each step
//! - Seeded RNG only, owned per field instance
//! - No rendering or platform dependencies
//!
//! The presentation layer polls the committed state through [`CubeField`]
//! after each step and must not mutate it.

pub mod field;
pub mod spawn;
pub mod split;
pub mod state;
pub mod step;

pub use field::{CubeField, FrameReport};
pub use spawn::spawn_cube;
pub use split::{Axis, try_split};
pub use state::{Cube, FieldPhase, FieldState, IdAlloc, Impact, Viewport};
pub use step::{StepReport, step};

//! Live-adjustable field configuration
//!
//! The record the settings panel edits. The simulation re-reads it every step,
//! so slider changes take effect on the very next frame. Validity (sizes vs.
//! viewport, min vs. max) is the panel's problem; the core normalizes instead
//! of erroring.

use serde::{Deserialize, Serialize};

/// Field configuration, externally supplied and never mutated by the core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Lower bound for newly spawned cube edge length (px)
    pub size_min: f32,
    /// Upper bound for newly spawned cube edge length (px)
    pub size_max: f32,
    /// Multiplier applied to base velocity every step
    pub speed_mul: f32,
    /// Multiplier applied to base spin every step
    pub rot_mul: f32,
    /// Minimum post-split speed along the split axis (px/s)
    pub split_deflect: f32,
    /// Random extra speed added along the bounce axis on wall contact (px/s)
    pub bounce_deflect: f32,
    /// Cube face background opacity, visual only - passed through to rendering
    pub cube_alpha: f32,
    /// Duration of the reset pause once the glitch triggers (ms)
    pub glitch_ms: u32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            size_min: 250.0,
            size_max: 400.0,
            speed_mul: 1.8,
            rot_mul: 2.0,
            split_deflect: 220.0,
            bounce_deflect: 40.0,
            cube_alpha: 0.7,
            glitch_ms: 5_000,
        }
    }
}

impl FieldConfig {
    /// Spawn size range, normalized so a swapped min/max is not an error
    pub fn size_range(&self) -> (f32, f32) {
        (
            self.size_min.min(self.size_max),
            self.size_min.max(self.size_max),
        )
    }

    /// Glitch pause duration in seconds
    pub fn glitch_secs(&self) -> f64 {
        self.glitch_ms as f64 / 1_000.0
    }

    /// Parse a config record from the panel's JSON payload
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serialize for the panel
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_range_normalizes_swapped_bounds() {
        let cfg = FieldConfig {
            size_min: 400.0,
            size_max: 100.0,
            ..Default::default()
        };
        assert_eq!(cfg.size_range(), (100.0, 400.0));
    }

    #[test]
    fn test_json_round_trip_with_missing_fields() {
        let cfg = FieldConfig::from_json(r#"{"size_min":250,"size_max":250,"glitch_ms":1000}"#)
            .expect("valid config json");
        assert_eq!(cfg.size_min, 250.0);
        assert_eq!(cfg.glitch_ms, 1_000);
        // Omitted fields fall back to defaults
        assert_eq!(cfg.speed_mul, FieldConfig::default().speed_mul);

        let json = cfg.to_json().expect("serializes");
        assert_eq!(FieldConfig::from_json(&json).unwrap(), cfg);
    }

    #[test]
    fn test_glitch_secs() {
        let cfg = FieldConfig {
            glitch_ms: 1_500,
            ..Default::default()
        };
        assert!((cfg.glitch_secs() - 1.5).abs() < f64::EPSILON);
    }
}

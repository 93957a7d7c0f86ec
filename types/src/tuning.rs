//! Tuning constants for the maintenance engine.
//!
//! These are deliberately plain numbers rather than hard-coded literals in
//! the engine: the duration-corruption threshold in particular has shifted
//! between releases and is easier to reason about as one named knob.

use serde::{Deserialize, Serialize};

/// All time values are in the host's simulated-time units (seconds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Reference duration at which the upkeep multiplier is exactly 1.0.
    pub neutral_duration: f32,
    /// Minimum effect duration a spell needs to be maintainable.
    pub min_duration: f32,
    /// Minimum casting cost a spell needs to be maintainable.
    pub min_cost: f32,
    /// Accumulated time between reconciliation passes.
    pub effect_check_interval: f32,
    /// Accumulated time between experience-award passes.
    pub experience_interval: f32,
    /// Remaining durations at or above this are treated as practically
    /// infinite by the strict audit; finite values below it are corruption.
    pub infinite_duration_floor: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            neutral_duration: 60.0,
            min_duration: 5.0,
            min_cost: 5.0,
            effect_check_interval: 2.5,
            experience_interval: 300.0,
            // ~one year of seconds
            infinite_duration_floor: 31_536_000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let t = Tuning::default();
        assert_eq!(t.neutral_duration, 60.0);
        assert_eq!(t.effect_check_interval, 2.5);
        assert_eq!(t.experience_interval, 300.0);
    }

    #[test]
    fn test_json_round_trip() {
        let t = Tuning {
            neutral_duration: 5.0,
            ..Tuning::default()
        };
        let json = serde_json::to_string(&t).unwrap();
        let back: Tuning = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}

// Engine tunables.
//
// `EngineConfig` gathers every constant the sequencer would otherwise
// hard-code: the base octave rows are built in, how often an exhausted
// sequence regenerates its rows instead of reusing them, the velocity and
// tempo jitter widths, and the dissonance scale bank. Defaults give the stock
// behaviour; a JSON file can override any subset of fields.
//
// `validate()` is run by `Engine::new`, so an `Engine` never holds a config
// that would make sampling panic or produce out-of-range pitches.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::params::{FACTOR_MIN, MAX_PITCH};
use crate::scale::ScaleBank;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lowest pitch of the octave rows are generated in.
    pub base_pitch: i32,
    /// Chance that replenishing an exhausted voice builds a fresh row
    /// bundle rather than re-reading one of the current four forms.
    pub regenerate_probability: f64,
    /// Velocity jitter half-width per 100% of `velocityVariation`.
    pub velocity_spread: f64,
    /// Tempo jitter half-width as a fraction of the base tempo. Kept below
    /// `FACTOR_MIN` so the slowest jittered tempo stays positive.
    pub tempo_jitter: f64,
    pub scale_bank: ScaleBank,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_pitch: 60,
            regenerate_probability: 0.25,
            velocity_spread: 0.5,
            tempo_jitter: 0.1,
            scale_bank: ScaleBank::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0..=MAX_PITCH - 11).contains(&self.base_pitch) {
            return Err(ConfigError::Invalid {
                field: "base_pitch",
                reason: format!("{} leaves the octave outside 0..=127", self.base_pitch),
            });
        }
        if !(0.0..=1.0).contains(&self.regenerate_probability) {
            return Err(ConfigError::Invalid {
                field: "regenerate_probability",
                reason: format!("{} is not a probability", self.regenerate_probability),
            });
        }
        if !self.velocity_spread.is_finite() || self.velocity_spread < 0.0 {
            return Err(ConfigError::Invalid {
                field: "velocity_spread",
                reason: format!("{} must be a non-negative number", self.velocity_spread),
            });
        }
        if !(0.0..FACTOR_MIN).contains(&self.tempo_jitter) {
            return Err(ConfigError::Invalid {
                field: "tempo_jitter",
                reason: format!(
                    "{} must be at least 0 and below {FACTOR_MIN}",
                    self.tempo_jitter
                ),
            });
        }
        Ok(())
    }
}

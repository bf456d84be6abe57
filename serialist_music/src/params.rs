// Request parameters: raw wire shape and validated form.
//
// The transport hands over two JSON objects per batch: per-voice `params`
// and per-batch `globalParams`. They arrive as `RawVoiceParams` /
// `RawGlobalParams`, where every field is optional so that a missing key can
// be reported by name instead of failing deserialization wholesale. Unknown
// keys are ignored; the client UI merges display-only settings into the same
// object.
//
// `validate()` turns a raw struct into `VoiceParams` / `GlobalParams` or the
// first `ParamError` found, checking fields in wire order. Core fields never
// get silent defaults. Only `tempoFactor` and `volumeFactor` default (to 1.0).

use serde::{Deserialize, Serialize};

use crate::error::ParamError;

/// Accepted window for the broadcast tempo and volume factors.
pub const FACTOR_MIN: f64 = 0.5;
pub const FACTOR_MAX: f64 = 2.0;

/// Highest MIDI pitch accepted for range bounds.
pub const MAX_PITCH: i32 = 127;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVoiceParams {
    /// Rhythmic complexity, 0-100. Named `duration` on the wire.
    pub duration: Option<f64>,
    pub velocity: Option<f64>,
    pub velocity_variation: Option<f64>,
    pub rest: Option<bool>,
    pub rest_probability: Option<f64>,
    pub range_lower: Option<f64>,
    pub range_upper: Option<f64>,
    pub chord_probability: Option<f64>,
    /// Base tempo in BPM before the global factor and jitter.
    pub tempo: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGlobalParams {
    pub dissonance_level: Option<f64>,
    pub tempo_factor: Option<f64>,
    pub volume_factor: Option<f64>,
}

/// Validated per-voice parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct VoiceParams {
    pub complexity: u8,
    pub velocity: f64,
    /// Percent, 0-100.
    pub velocity_variation: f64,
    pub rest: bool,
    /// Percent, 0-100.
    pub rest_probability: f64,
    /// Inclusive lower pitch bound. May exceed `range_upper`, in which case
    /// every note is dropped.
    pub range_lower: i32,
    pub range_upper: i32,
    /// Percent, 0-100.
    pub chord_probability: f64,
    pub tempo: f64,
}

/// Validated per-batch global factors.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobalParams {
    pub dissonance_level: f64,
    pub tempo_factor: f64,
    pub volume_factor: f64,
}

impl GlobalParams {
    /// Neutral tempo and volume factors at the given dissonance.
    pub fn with_dissonance(dissonance_level: f64) -> Self {
        GlobalParams {
            dissonance_level,
            tempo_factor: 1.0,
            volume_factor: 1.0,
        }
    }
}

impl RawVoiceParams {
    pub fn validate(&self) -> Result<VoiceParams, ParamError> {
        let complexity = whole("duration", required("duration", self.duration)?, 0.0, 100.0)?;
        let velocity = bounded("velocity", required("velocity", self.velocity)?, 0.0, 1.0)?;
        let velocity_variation = bounded(
            "velocityVariation",
            required("velocityVariation", self.velocity_variation)?,
            0.0,
            100.0,
        )?;
        let rest = required("rest", self.rest)?;
        let rest_probability = bounded(
            "restProbability",
            required("restProbability", self.rest_probability)?,
            0.0,
            100.0,
        )?;
        let range_lower = whole(
            "rangeLower",
            required("rangeLower", self.range_lower)?,
            0.0,
            f64::from(MAX_PITCH),
        )?;
        let range_upper = whole(
            "rangeUpper",
            required("rangeUpper", self.range_upper)?,
            0.0,
            f64::from(MAX_PITCH),
        )?;
        let chord_probability = bounded(
            "chordProbability",
            required("chordProbability", self.chord_probability)?,
            0.0,
            100.0,
        )?;
        let tempo = positive("tempo", required("tempo", self.tempo)?)?;

        Ok(VoiceParams {
            complexity: complexity as u8,
            velocity,
            velocity_variation,
            rest,
            rest_probability,
            range_lower: range_lower as i32,
            range_upper: range_upper as i32,
            chord_probability,
            tempo,
        })
    }
}

impl RawGlobalParams {
    pub fn validate(&self) -> Result<GlobalParams, ParamError> {
        let dissonance_level = bounded(
            "dissonanceLevel",
            required("dissonanceLevel", self.dissonance_level)?,
            0.0,
            1.0,
        )?;
        let tempo_factor = match self.tempo_factor {
            Some(v) => bounded("tempoFactor", v, FACTOR_MIN, FACTOR_MAX)?,
            None => 1.0,
        };
        let volume_factor = match self.volume_factor {
            Some(v) => bounded("volumeFactor", v, FACTOR_MIN, FACTOR_MAX)?,
            None => 1.0,
        };
        Ok(GlobalParams {
            dissonance_level,
            tempo_factor,
            volume_factor,
        })
    }
}

fn required<T>(field: &'static str, value: Option<T>) -> Result<T, ParamError> {
    value.ok_or(ParamError::Missing { field })
}

fn bounded(field: &'static str, value: f64, min: f64, max: f64) -> Result<f64, ParamError> {
    if !value.is_finite() {
        return Err(ParamError::NotFinite { field });
    }
    if !(min..=max).contains(&value) {
        return Err(ParamError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

fn whole(field: &'static str, value: f64, min: f64, max: f64) -> Result<f64, ParamError> {
    let value = bounded(field, value, min, max)?;
    if value.fract() != 0.0 {
        return Err(ParamError::NotInteger { field, value });
    }
    Ok(value)
}

fn positive(field: &'static str, value: f64) -> Result<f64, ParamError> {
    if !value.is_finite() {
        return Err(ParamError::NotFinite { field });
    }
    if value <= 0.0 {
        return Err(ParamError::NotPositive { field, value });
    }
    Ok(value)
}

// Error types for the note engine.
//
// `ParamError` is the invalid-parameters condition raised at the request
// boundary; every variant carries the wire key of the offending field so the
// transport can echo it back. The remaining types cover construction-time
// problems: rows that are not permutations, malformed scale banks, and
// config files that fail to load or validate.
//
// A note dropped by range placement is *not* an error; see `pitch.rs`.

use thiserror::Error;

/// A required request field is absent or outside its documented range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("missing required parameter `{field}`")]
    Missing { field: &'static str },

    #[error("parameter `{field}` must be a finite number")]
    NotFinite { field: &'static str },

    #[error("parameter `{field}` must be a whole number, got {value}")]
    NotInteger { field: &'static str, value: f64 },

    #[error("parameter `{field}` = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("parameter `{field}` must be greater than zero, got {value}")]
    NotPositive { field: &'static str, value: f64 },
}

impl ParamError {
    /// Wire key of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            ParamError::Missing { field }
            | ParamError::NotFinite { field }
            | ParamError::NotInteger { field, .. }
            | ParamError::OutOfRange { field, .. }
            | ParamError::NotPositive { field, .. } => field,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("pitch {pitch} at position {position} is outside the octave starting at {base}")]
    OutsideOctave {
        pitch: i32,
        position: usize,
        base: i32,
    },

    #[error("pitch class {pitch_class} appears more than once")]
    Repeated { pitch_class: i32 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScaleBankError {
    #[error("scale bank has no bands")]
    Empty,

    #[error("band {index} has non-finite or inverted bounds [{low}, {high})")]
    BadBounds { index: usize, low: f64, high: f64 },

    #[error("band {index} overlaps or precedes the band before it")]
    Unordered { index: usize },

    #[error("band {index} has {count} candidates, expected 1 or 2")]
    CandidateCount { index: usize, count: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid scale bank: {0}")]
    ScaleBank(#[from] ScaleBankError),

    #[error("config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

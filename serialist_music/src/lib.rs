// Serialist note engine
//
// Produces successive note events for each voice of each connected session
// from twelve-tone rows. A batch call takes per-voice parameters (rhythmic
// complexity, velocity, rests, pitch range, chord density, base tempo) and
// per-batch global factors (dissonance, tempo, volume), and returns one
// `NoteEvent` per requested tick while advancing the voice's read cursor.
//
// Architecture:
// - types.rs: `SessionId` / `VoiceId` newtypes keying the state store
// - row.rs: twelve-tone rows and the retrograde / inversion / retrograde-
//   inversion bundle
// - scale.rs: dissonance bands mapped to candidate pitch-class sets, with
//   weighted crossfade between the two candidates of a band
// - pitch.rs: snapping to the nearest allowed pitch class and octave
//   placement inside an inclusive range (notes may be dropped)
// - rhythm.rs: duration tokens and complexity-tiered duration sampling
// - chord.rs: chord-size sampling from a chord-probability percentage
// - params.rs: raw wire parameters and their validated counterparts
// - config.rs: engine tunables and the scale bank, loadable from JSON
// - state.rs: per-(session, voice) state and the store that owns it
// - sequencer.rs: the per-tick pipeline (rest, replenish, chord, emit)
// - engine.rs: the public entry point tying config, store and PRNG together
// - midi.rs: Standard MIDI File export of a generated batch
// - error.rs: typed errors for parameters, rows, scale banks and config
//
// Given the same seed, config and call sequence the engine is fully
// deterministic. All randomness comes from `serialist_prng::SerialRng`.

pub mod chord;
pub mod config;
pub mod engine;
pub mod error;
pub mod midi;
pub mod params;
pub mod pitch;
pub mod rhythm;
pub mod row;
pub mod scale;
pub mod sequencer;
pub mod state;
pub mod types;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{ConfigError, ParamError};
pub use params::{GlobalParams, RawGlobalParams, RawVoiceParams, VoiceParams};
pub use rhythm::Duration;
pub use sequencer::NoteEvent;
pub use types::{SessionId, VoiceId};

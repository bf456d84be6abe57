// The per-tick note pipeline.
//
// One batch call produces `tick_count` events for a single voice. The
// pitch-class set is chosen once per batch (dissonance is batch-global); then
// every tick runs, in this order:
//
// 1. expression: sample a duration from the complexity, jitter the velocity
//    (scaled by the volume factor, clamped to [0, 1]) and the tempo (scaled
//    by the tempo factor)
// 2. rest check: with rests enabled, a draw below `rest_probability / 100`
//    emits an empty event and ends the tick. Rests never touch the cursor
//    and never replenish.
// 3. replenish if the active sequence is empty or fully read: maybe build a
//    new row bundle (always when the sequence is empty), pick one of the four
//    forms, snap and place it into the voice's range, reset the cursor
// 4. chord size, capped by the notes left
// 5. emit the notes under the cursor and advance it
//
// The order matters: each tick's replenishment depends on the cursor the
// previous tick left behind, so ticks are strictly sequential.
//
// A replenishment whose every note falls outside the range leaves an empty
// sequence; that tick emits no notes and the next tick replenishes again.

use serde::{Deserialize, Serialize};
use serialist_prng::SerialRng;
use tracing::{debug, trace, warn};

use crate::chord::chord_size;
use crate::config::EngineConfig;
use crate::params::{GlobalParams, VoiceParams};
use crate::pitch::map_row;
use crate::rhythm::{Duration, sample_duration};
use crate::row::{RowBundle, RowForm};
use crate::scale::PitchClassSet;
use crate::state::VoiceState;

/// One tick of output. `notes` is empty for a rest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub notes: Vec<i32>,
    pub duration: Duration,
    pub velocity: f64,
    pub tempo: f64,
}

impl NoteEvent {
    pub fn is_rest(&self) -> bool {
        self.notes.is_empty()
    }
}

/// What a replenishment did, for logging and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Replenishment {
    pub regenerated: bool,
    pub form: RowForm,
    pub len: usize,
}

/// Everything a tick reads but does not mutate.
pub struct TickContext<'a> {
    pub config: &'a EngineConfig,
    pub params: &'a VoiceParams,
    pub global: &'a GlobalParams,
    pub scale: &'a PitchClassSet,
}

/// Run `tick_count` ticks against `state`.
pub fn generate_batch(
    state: &mut VoiceState,
    config: &EngineConfig,
    params: &VoiceParams,
    global: &GlobalParams,
    tick_count: usize,
    rng: &mut SerialRng,
) -> Vec<NoteEvent> {
    let choice = config.scale_bank.select(global.dissonance_level, rng);
    debug!(
        scale = choice.name,
        dissonance = global.dissonance_level,
        tick_count,
        "generating batch"
    );
    let ctx = TickContext {
        config,
        params,
        global,
        scale: choice.set,
    };
    (0..tick_count).map(|_| next_tick(state, &ctx, rng)).collect()
}

/// Produce one event, advancing `state`.
pub fn next_tick(state: &mut VoiceState, ctx: &TickContext<'_>, rng: &mut SerialRng) -> NoteEvent {
    let duration = sample_duration(ctx.params.complexity, rng);
    let velocity = jittered_velocity(ctx, rng);
    let tempo = jittered_tempo(ctx, rng);

    if ctx.params.rest && rng.random_bool(ctx.params.rest_probability / 100.0) {
        trace!(%duration, "rest");
        return NoteEvent {
            notes: Vec::new(),
            duration,
            velocity,
            tempo,
        };
    }

    if state.is_exhausted() {
        replenish(state, ctx, rng);
    }

    let size = chord_size(ctx.params.chord_probability, state.remaining(), rng);
    let notes = state.take(size);
    trace!(?notes, %duration, velocity, tempo, cursor = state.cursor, "tick");
    NoteEvent {
        notes,
        duration,
        velocity,
        tempo,
    }
}

/// Refill the active sequence from the row bundle.
pub fn replenish(
    state: &mut VoiceState,
    ctx: &TickContext<'_>,
    rng: &mut SerialRng,
) -> Replenishment {
    let base = ctx.config.base_pitch;
    let roll = rng.random_bool(ctx.config.regenerate_probability);
    let regenerated = state.active_sequence.is_empty() || roll;
    if regenerated {
        state.rows = RowBundle::generate(rng, base);
        debug!(prime = ?state.rows.prime.pitches(), "regenerated row bundle");
    }

    let (form, row) = state.rows.choose(rng);
    let sequence = map_row(
        row,
        ctx.scale,
        ctx.params.range_lower,
        ctx.params.range_upper,
        rng,
    );
    if sequence.is_empty() {
        warn!(
            lower = ctx.params.range_lower,
            upper = ctx.params.range_upper,
            "range dropped every note of the row"
        );
    }
    debug!(?form, len = sequence.len(), "replenished active sequence");

    state.active_sequence = sequence;
    state.cursor = 0;
    Replenishment {
        regenerated,
        form,
        len: state.active_sequence.len(),
    }
}

fn jittered_velocity(ctx: &TickContext<'_>, rng: &mut SerialRng) -> f64 {
    let spread = ctx.config.velocity_spread * (ctx.params.velocity_variation / 100.0);
    let jitter = rng.range_f64(-spread, spread);
    (ctx.params.velocity * ctx.global.volume_factor + jitter).clamp(0.0, 1.0)
}

fn jittered_tempo(ctx: &TickContext<'_>, rng: &mut SerialRng) -> f64 {
    let base = ctx.params.tempo;
    base * ctx.global.tempo_factor + base * ctx.config.tempo_jitter * rng.range_f64(-1.0, 1.0)
}

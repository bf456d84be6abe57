// The note engine: config, voice state and randomness in one owner.
//
// `Engine` is the contract the transport layer calls into. Every method that
// changes state takes `&mut self`, so a single engine can only service one
// request at a time. Transports that run one task per session give each task
// its own engine; a transport that shares one engine across tasks wraps it
// in a mutex. Either way two calls never interleave on the same voice.
//
// `generate_next_notes` validates both parameter objects before touching
// any state, so a rejected request leaves the voice exactly as it was. An
// unknown voice is initialized on the spot rather than rejected.

use serialist_prng::SerialRng;
use tracing::{info, info_span, warn};

use crate::config::EngineConfig;
use crate::error::{ConfigError, ParamError};
use crate::params::{GlobalParams, RawGlobalParams, RawVoiceParams, VoiceParams};
use crate::sequencer::{NoteEvent, generate_batch};
use crate::state::{VoiceState, VoiceStateStore};
use crate::types::{SessionId, VoiceId};

pub struct Engine {
    config: EngineConfig,
    store: VoiceStateStore,
    rng: SerialRng,
}

impl Engine {
    /// Build an engine with a seeded PRNG. Fails if the config is invalid.
    pub fn new(config: EngineConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, SerialRng::new(seed))
    }

    pub fn with_rng(config: EngineConfig, rng: SerialRng) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            store: VoiceStateStore::new(),
            rng,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &VoiceStateStore {
        &self.store
    }

    pub fn voice(&self, session: &SessionId, voice: VoiceId) -> Option<&VoiceState> {
        self.store.get(session, voice)
    }

    /// Fresh rows and an empty sequence for `voice`; any prior state is lost.
    pub fn init_voice(&mut self, session: &SessionId, voice: VoiceId) {
        self.store
            .init_voice(session, voice, &mut self.rng, self.config.base_pitch);
        info!(%session, %voice, "voice initialized");
    }

    /// Validate the raw request and produce `tick_count` events.
    pub fn generate_next_notes(
        &mut self,
        session: &SessionId,
        voice: VoiceId,
        params: &RawVoiceParams,
        global: &RawGlobalParams,
        tick_count: usize,
    ) -> Result<Vec<NoteEvent>, ParamError> {
        let validated = params
            .validate()
            .and_then(|p| global.validate().map(|g| (p, g)));
        match validated {
            Ok((params, global)) => {
                Ok(self.generate_validated(session, voice, &params, &global, tick_count))
            }
            Err(e) => {
                warn!(%session, %voice, field = e.field(), error = %e, "rejected note request");
                Err(e)
            }
        }
    }

    /// Produce `tick_count` events from already-validated parameters.
    pub fn generate_validated(
        &mut self,
        session: &SessionId,
        voice: VoiceId,
        params: &VoiceParams,
        global: &GlobalParams,
        tick_count: usize,
    ) -> Vec<NoteEvent> {
        let _span = info_span!("generate", %session, %voice).entered();
        if !self.store.contains(session, voice) {
            info!("unknown voice, initializing on demand");
        }
        let state = self
            .store
            .get_or_init(session, voice, &mut self.rng, self.config.base_pitch);
        generate_batch(state, &self.config, params, global, tick_count, &mut self.rng)
    }

    pub fn remove_voice(&mut self, session: &SessionId, voice: VoiceId) -> bool {
        let removed = self.store.remove_voice(session, voice);
        info!(%session, %voice, removed, "voice removed");
        removed
    }

    pub fn rename_voice(&mut self, session: &SessionId, old: VoiceId, new: VoiceId) -> bool {
        let moved = self.store.rename_voice(session, old, new);
        info!(%session, %old, %new, moved, "voice renamed");
        moved
    }

    /// Forget every voice of a session.
    pub fn end_session(&mut self, session: &SessionId) -> usize {
        let count = self.store.end_session(session);
        info!(%session, voices = count, "session ended");
        count
    }
}

// Per-(session, voice) generator state and the store that owns it.
//
// A `VoiceState` remembers the current row bundle, the active sequence
// (one bundle form after snapping and range placement) and a read cursor
// into it. The sequencer is the only code that advances the cursor or
// replaces the sequence; everything here is bookkeeping.
//
// `VoiceStateStore` is a plain owned map with no interior locking. Callers
// hold it through `&mut` (see `engine.rs`), so two requests can never touch
// the same voice at once. Keys are ordered so that all voices of one session
// sit together, which makes `end_session` and `session_voices` range scans.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serialist_prng::SerialRng;

use crate::row::RowBundle;
use crate::types::{SessionId, VoiceId};

#[derive(Clone, Debug, PartialEq)]
pub struct VoiceState {
    pub rows: RowBundle,
    /// Playable pitches for the current pass; at most 12.
    pub active_sequence: Vec<i32>,
    /// Next index to read, `0 <= cursor <= active_sequence.len()`.
    pub cursor: usize,
}

impl VoiceState {
    /// Fresh rows, empty sequence.
    pub fn new(rng: &mut SerialRng, base_pitch: i32) -> Self {
        Self {
            rows: RowBundle::generate(rng, base_pitch),
            active_sequence: Vec::new(),
            cursor: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.active_sequence.len().saturating_sub(self.cursor)
    }

    /// True when the next note-bearing tick must replenish first.
    pub fn is_exhausted(&self) -> bool {
        self.active_sequence.is_empty() || self.cursor >= self.active_sequence.len()
    }

    /// Take up to `count` notes from the cursor and advance past them.
    pub fn take(&mut self, count: usize) -> Vec<i32> {
        let start = self.cursor.min(self.active_sequence.len());
        let end = (start + count).min(self.active_sequence.len());
        self.cursor = end;
        self.active_sequence[start..end].to_vec()
    }
}

#[derive(Debug, Default)]
pub struct VoiceStateStore {
    voices: BTreeMap<(SessionId, VoiceId), VoiceState>,
}

impl VoiceStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install fresh state for a voice, discarding any previous state.
    pub fn init_voice(
        &mut self,
        session: &SessionId,
        voice: VoiceId,
        rng: &mut SerialRng,
        base_pitch: i32,
    ) -> &mut VoiceState {
        let fresh = VoiceState::new(rng, base_pitch);
        match self.voices.entry((session.clone(), voice)) {
            Entry::Occupied(mut slot) => {
                slot.insert(fresh);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(fresh),
        }
    }

    /// State for a voice, created lazily if the voice is unknown.
    pub fn get_or_init(
        &mut self,
        session: &SessionId,
        voice: VoiceId,
        rng: &mut SerialRng,
        base_pitch: i32,
    ) -> &mut VoiceState {
        self.voices
            .entry((session.clone(), voice))
            .or_insert_with(|| VoiceState::new(rng, base_pitch))
    }

    pub fn get(&self, session: &SessionId, voice: VoiceId) -> Option<&VoiceState> {
        self.voices.get(&(session.clone(), voice))
    }

    pub fn get_mut(&mut self, session: &SessionId, voice: VoiceId) -> Option<&mut VoiceState> {
        self.voices.get_mut(&(session.clone(), voice))
    }

    pub fn contains(&self, session: &SessionId, voice: VoiceId) -> bool {
        self.voices.contains_key(&(session.clone(), voice))
    }

    /// Drop a voice's state. Returns whether it existed.
    pub fn remove_voice(&mut self, session: &SessionId, voice: VoiceId) -> bool {
        self.voices.remove(&(session.clone(), voice)).is_some()
    }

    /// Move a voice's state to a new id within the same session, replacing
    /// whatever the new id held. Returns false (and changes nothing) if the
    /// old id is unknown.
    pub fn rename_voice(&mut self, session: &SessionId, old: VoiceId, new: VoiceId) -> bool {
        match self.voices.remove(&(session.clone(), old)) {
            Some(state) => {
                self.voices.insert((session.clone(), new), state);
                true
            }
            None => false,
        }
    }

    /// Drop every voice of a session. Returns how many were removed.
    pub fn end_session(&mut self, session: &SessionId) -> usize {
        let doomed = self.session_voices(session);
        for voice in &doomed {
            self.voices.remove(&(session.clone(), *voice));
        }
        doomed.len()
    }

    /// Voice ids of one session, ascending.
    pub fn session_voices(&self, session: &SessionId) -> Vec<VoiceId> {
        let start = (session.clone(), VoiceId(u32::MIN));
        let end = (session.clone(), VoiceId(u32::MAX));
        self.voices.range(start..=end).map(|((_, v), _)| *v).collect()
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(name: &str) -> SessionId {
        SessionId::from(name)
    }

    #[test]
    fn take_advances_cursor_and_clamps() {
        let mut rng = SerialRng::new(1);
        let mut state = VoiceState::new(&mut rng, 60);
        state.active_sequence = vec![60, 62, 64];
        assert_eq!(state.take(2), vec![60, 62]);
        assert_eq!(state.cursor, 2);
        assert_eq!(state.take(5), vec![64]);
        assert_eq!(state.cursor, 3);
        assert!(state.is_exhausted());
        assert!(state.take(1).is_empty());
        assert_eq!(state.cursor, 3);
    }

    #[test]
    fn init_discards_previous_state() {
        let mut rng = SerialRng::new(2);
        let mut store = VoiceStateStore::new();
        let state = store.init_voice(&s("a"), VoiceId(0), &mut rng, 60);
        state.active_sequence = vec![60, 61];
        state.cursor = 1;

        let state = store.init_voice(&s("a"), VoiceId(0), &mut rng, 60);
        assert!(state.active_sequence.is_empty());
        assert_eq!(state.cursor, 0);
        assert_eq!(store.voice_count(), 1);
    }

    #[test]
    fn get_or_init_keeps_existing_state() {
        let mut rng = SerialRng::new(3);
        let mut store = VoiceStateStore::new();
        store.get_or_init(&s("a"), VoiceId(1), &mut rng, 60).cursor = 0;
        store.get_mut(&s("a"), VoiceId(1)).unwrap().active_sequence = vec![70];
        let state = store.get_or_init(&s("a"), VoiceId(1), &mut rng, 60);
        assert_eq!(state.active_sequence, vec![70]);
    }

    #[test]
    fn rename_moves_state() {
        let mut rng = SerialRng::new(4);
        let mut store = VoiceStateStore::new();
        store.init_voice(&s("a"), VoiceId(1), &mut rng, 60).cursor = 0;
        let before = store.get(&s("a"), VoiceId(1)).cloned().unwrap();

        assert!(store.rename_voice(&s("a"), VoiceId(1), VoiceId(9)));
        assert!(!store.contains(&s("a"), VoiceId(1)));
        assert_eq!(store.get(&s("a"), VoiceId(9)), Some(&before));

        assert!(!store.rename_voice(&s("a"), VoiceId(1), VoiceId(2)));
        assert!(!store.contains(&s("a"), VoiceId(2)));
    }

    #[test]
    fn sessions_are_isolated() {
        let mut rng = SerialRng::new(5);
        let mut store = VoiceStateStore::new();
        for v in 0..3 {
            store.init_voice(&s("a"), VoiceId(v), &mut rng, 60);
        }
        store.init_voice(&s("b"), VoiceId(0), &mut rng, 60);
        store.init_voice(&s("ab"), VoiceId(0), &mut rng, 60);

        assert_eq!(
            store.session_voices(&s("a")),
            vec![VoiceId(0), VoiceId(1), VoiceId(2)]
        );
        assert!(store.remove_voice(&s("a"), VoiceId(1)));
        assert!(!store.remove_voice(&s("a"), VoiceId(1)));

        assert_eq!(store.end_session(&s("a")), 2);
        assert!(store.session_voices(&s("a")).is_empty());
        assert!(store.contains(&s("b"), VoiceId(0)));
        assert!(store.contains(&s("ab"), VoiceId(0)));
    }
}

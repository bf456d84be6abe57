// Protocol messages between clients and the note engine.
//
// Two enums define the full vocabulary:
// - `ClientMessage`: sent by a client UI, one per JSON frame.
// - `ServerMessage`: sent back, either as the reply to a client message or
//   pushed by the server when an operator changes a global factor.
//
// Every message is a JSON object whose `type` field names the variant in
// snake_case; the remaining fields are camelCase. Voice parameters travel as
// the engine's raw parameter structs and are validated only when dispatched,
// so a bad parameter set still decodes and gets a descriptive error reply.

use serde::{Deserialize, Serialize};
use serialist_music::params::{FACTOR_MAX, FACTOR_MIN};
use serialist_music::{NoteEvent, RawGlobalParams, RawVoiceParams, VoiceId};

use crate::error::ProtocolError;

/// Tags `decode_client_message` accepts.
pub const CLIENT_MESSAGE_TYPES: [&str; 5] = [
    "init",
    "generate_notes",
    "voice_added",
    "voice_removed",
    "voice_updated",
];

/// Messages sent by a client to the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Start (or restart) the session; forgets every voice.
    Init,
    /// Ask for the next `duration` ticks of one voice.
    GenerateNotes {
        voice_id: VoiceId,
        params: RawVoiceParams,
        /// Number of ticks to generate.
        duration: usize,
        global_params: RawGlobalParams,
    },
    VoiceAdded { voice_id: VoiceId },
    VoiceRemoved { voice_id: VoiceId },
    /// The UI renumbered a voice; its rows and cursor follow it.
    VoiceUpdated { old_id: VoiceId, new_id: VoiceId },
}

/// Messages sent by the engine to a client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    InitResponse { status: String },
    NoteData {
        voice_id: VoiceId,
        note_data: Vec<NoteEvent>,
    },
    VoiceAddedResponse { voice_id: VoiceId, status: String },
    VoiceRemovedResponse { voice_id: VoiceId, status: String },
    VoiceUpdatedResponse {
        old_id: VoiceId,
        new_id: VoiceId,
        status: String,
    },
    Error { message: String },
    /// Pushed to clients when the volume factor changes.
    VolumeFactorUpdated { value: f64 },
    /// Pushed to clients when the tempo factor changes.
    TempoFactorUpdated { value: f64 },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}

/// A performance factor an operator can change for every client at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlobalFactor {
    Volume,
    Tempo,
}

impl GlobalFactor {
    /// Field name of the factor inside `globalParams`.
    pub fn wire_name(self) -> &'static str {
        match self {
            GlobalFactor::Volume => "volumeFactor",
            GlobalFactor::Tempo => "tempoFactor",
        }
    }

    /// Build the push message announcing a new value. Values outside
    /// `[FACTOR_MIN, FACTOR_MAX]` are refused.
    pub fn message(self, value: f64) -> Result<ServerMessage, ProtocolError> {
        if !(FACTOR_MIN..=FACTOR_MAX).contains(&value) {
            return Err(ProtocolError::FactorOutOfRange {
                factor: self.wire_name(),
                value,
                min: FACTOR_MIN,
                max: FACTOR_MAX,
            });
        }
        Ok(match self {
            GlobalFactor::Volume => ServerMessage::VolumeFactorUpdated { value },
            GlobalFactor::Tempo => ServerMessage::TempoFactorUpdated { value },
        })
    }
}

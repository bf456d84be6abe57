// Turning client frames into engine calls.
//
// `dispatch` is the whole server-side message loop body minus the socket:
// one `ClientMessage` in, exactly one `ServerMessage` out. The caller owns
// the `Engine` and the session name the transport assigned to the
// connection. Parameter validation failures come back as
// `ServerMessage::Error` carrying the offending field.
//
// `decode_client_message` checks the `type` tag before deserializing so an
// unknown tag is reported as such instead of as a generic serde error.

use serde_json::Value;
use serialist_music::{Engine, SessionId};
use tracing::{debug, warn};

use crate::error::ProtocolError;
use crate::message::{CLIENT_MESSAGE_TYPES, ClientMessage, ServerMessage};

pub fn decode_client_message(bytes: &[u8]) -> Result<ClientMessage, ProtocolError> {
    let value: Value = serde_json::from_slice(bytes)?;
    let tag = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingType)?;
    if !CLIENT_MESSAGE_TYPES.contains(&tag) {
        return Err(ProtocolError::UnknownType(tag.to_owned()));
    }
    Ok(serde_json::from_value(value)?)
}

/// Apply one client message to the engine and build the reply.
pub fn dispatch(engine: &mut Engine, session: &SessionId, message: ClientMessage) -> ServerMessage {
    match message {
        ClientMessage::Init => {
            engine.end_session(session);
            ServerMessage::InitResponse {
                status: "ready".into(),
            }
        }
        ClientMessage::GenerateNotes {
            voice_id,
            params,
            duration,
            global_params,
        } => {
            debug!(%session, voice = %voice_id, ticks = duration, "generate_notes");
            match engine.generate_next_notes(session, voice_id, &params, &global_params, duration) {
                Ok(note_data) => ServerMessage::NoteData {
                    voice_id,
                    note_data,
                },
                Err(e) => ServerMessage::error(e.to_string()),
            }
        }
        ClientMessage::VoiceAdded { voice_id } => {
            engine.init_voice(session, voice_id);
            ServerMessage::VoiceAddedResponse {
                voice_id,
                status: "initialized".into(),
            }
        }
        ClientMessage::VoiceRemoved { voice_id } => {
            engine.remove_voice(session, voice_id);
            ServerMessage::VoiceRemovedResponse {
                voice_id,
                status: "removed".into(),
            }
        }
        ClientMessage::VoiceUpdated { old_id, new_id } => {
            engine.rename_voice(session, old_id, new_id);
            ServerMessage::VoiceUpdatedResponse {
                old_id,
                new_id,
                status: "updated".into(),
            }
        }
    }
}

/// Decode a raw frame and dispatch it. Frames that fail to decode get an
/// error reply and leave the engine untouched.
pub fn handle_frame(engine: &mut Engine, session: &SessionId, bytes: &[u8]) -> ServerMessage {
    match decode_client_message(bytes) {
        Ok(message) => dispatch(engine, session, message),
        Err(e) => {
            warn!(%session, error = %e, "undecodable client frame");
            ServerMessage::error(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use serialist_music::{EngineConfig, VoiceId};

    use super::*;

    fn engine() -> Engine {
        Engine::new(EngineConfig::default(), 11).unwrap()
    }

    #[test]
    fn decode_rejects_missing_and_unknown_types() {
        assert!(matches!(
            decode_client_message(br#"{"voiceId": 1}"#),
            Err(ProtocolError::MissingType)
        ));
        match decode_client_message(br#"{"type": "shutdown"}"#) {
            Err(ProtocolError::UnknownType(tag)) => assert_eq!(tag, "shutdown"),
            other => panic!("expected UnknownType, got {other:?}"),
        }
        assert!(matches!(
            decode_client_message(b"not json"),
            Err(ProtocolError::Json(_))
        ));
        assert!(matches!(
            decode_client_message(br#"{"type": "voice_added"}"#),
            Err(ProtocolError::Json(_))
        ));
    }

    #[test]
    fn init_forgets_session_voices() {
        let mut engine = engine();
        let session = SessionId::from("c1");
        let other = SessionId::from("c2");
        dispatch(&mut engine, &session, ClientMessage::VoiceAdded { voice_id: VoiceId(0) });
        dispatch(&mut engine, &other, ClientMessage::VoiceAdded { voice_id: VoiceId(0) });

        let reply = dispatch(&mut engine, &session, ClientMessage::Init);
        assert_eq!(
            reply,
            ServerMessage::InitResponse {
                status: "ready".into()
            }
        );
        assert!(engine.voice(&session, VoiceId(0)).is_none());
        assert!(engine.voice(&other, VoiceId(0)).is_some());
    }

    #[test]
    fn rejected_parameters_become_error_replies() {
        let mut engine = engine();
        let session = SessionId::from("c1");
        let frame =
            br#"{"type":"generate_notes","voiceId":0,"duration":4,"params":{},"globalParams":{}}"#;
        match handle_frame(&mut engine, &session, frame) {
            ServerMessage::Error { message } => assert!(message.contains("duration"), "{message}"),
            other => panic!("expected Error, got {other:?}"),
        }
        assert!(engine.voice(&session, VoiceId(0)).is_none());
    }

    #[test]
    fn unknown_type_reply_matches_client_expectation() {
        let mut engine = engine();
        match handle_frame(&mut engine, &SessionId::from("c1"), br#"{"type":"ping"}"#) {
            ServerMessage::Error { message } => {
                assert!(message.starts_with("Unknown message type"))
            }
            other => panic!("expected Error, got {other:?}"),
        }
    }
}

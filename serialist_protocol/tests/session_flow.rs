// Integration test for a client session, frame by frame.
//
// Feeds raw JSON frames through `handle_frame` in the order a client UI
// sends them (init, add voices, generate, renumber, remove) and decodes
// every reply back from JSON, so the test sees exactly what the client
// would. No sockets involved.

use serde_json::{Value, json};
use serialist_music::{Engine, EngineConfig, SessionId, VoiceId};
use serialist_protocol::{ServerMessage, handle_frame};

/// Helper: send one JSON frame and return the reply as it looks on the wire.
fn send(engine: &mut Engine, session: &SessionId, frame: Value) -> Value {
    let bytes = serde_json::to_vec(&frame).unwrap();
    let reply = handle_frame(engine, session, &bytes);
    serde_json::to_value(&reply).unwrap()
}

fn voice_params() -> Value {
    json!({
        "duration": 0,
        "velocity": 0.6,
        "velocityVariation": 0,
        "rest": false,
        "restProbability": 0,
        "rangeLower": 36,
        "rangeUpper": 96,
        "chordProbability": 0,
        "tempo": 90
    })
}

#[test]
fn full_client_session() {
    let mut engine = Engine::new(EngineConfig::default(), 2024).unwrap();
    let session = SessionId::from("client-1");

    let reply = send(&mut engine, &session, json!({"type": "init"}));
    assert_eq!(reply, json!({"type": "init_response", "status": "ready"}));

    for id in 0..2 {
        let reply = send(&mut engine, &session, json!({"type": "voice_added", "voiceId": id}));
        assert_eq!(
            reply,
            json!({"type": "voice_added_response", "voiceId": id, "status": "initialized"})
        );
    }

    let reply = send(
        &mut engine,
        &session,
        json!({
            "type": "generate_notes",
            "voiceId": 1,
            "duration": 6,
            "params": voice_params(),
            "globalParams": {"dissonanceLevel": 0.05, "tempoFactor": 1.0, "volumeFactor": 1.0}
        }),
    );
    assert_eq!(reply["type"], "note_data");
    assert_eq!(reply["voiceId"], 1);
    let notes = reply["noteData"].as_array().unwrap();
    assert_eq!(notes.len(), 6);
    for event in notes {
        // Complexity 0 plays half notes only; the lowest band is a C triad.
        assert_eq!(event["duration"], "2n");
        let pitch = event["notes"][0].as_i64().unwrap();
        assert!((36..=96).contains(&pitch));
        assert!([0, 4, 7].contains(&pitch.rem_euclid(12)));
    }

    let reply = send(
        &mut engine,
        &session,
        json!({"type": "voice_updated", "oldId": 1, "newId": 0}),
    );
    assert_eq!(
        reply,
        json!({"type": "voice_updated_response", "oldId": 1, "newId": 0, "status": "updated"})
    );
    assert_eq!(engine.voice(&session, VoiceId(0)).unwrap().cursor, 6);
    assert!(engine.voice(&session, VoiceId(1)).is_none());

    let reply = send(&mut engine, &session, json!({"type": "voice_removed", "voiceId": 0}));
    assert_eq!(
        reply,
        json!({"type": "voice_removed_response", "voiceId": 0, "status": "removed"})
    );
    assert_eq!(engine.store().voice_count(), 0);
}

#[test]
fn bad_frames_get_error_replies() {
    let mut engine = Engine::new(EngineConfig::default(), 1).unwrap();
    let session = SessionId::from("client-1");

    let reply = handle_frame(&mut engine, &session, b"{");
    assert!(matches!(reply, ServerMessage::Error { .. }));

    let mut params = voice_params();
    params["velocity"] = json!(3.0);
    let reply = send(
        &mut engine,
        &session,
        json!({
            "type": "generate_notes",
            "voiceId": 0,
            "duration": 4,
            "params": params,
            "globalParams": {"dissonanceLevel": 0.5}
        }),
    );
    assert_eq!(reply["type"], "error");
    assert!(reply["message"].as_str().unwrap().contains("velocity"));
    assert_eq!(engine.store().voice_count(), 0);
}

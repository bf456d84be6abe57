// serialist_protocol: message vocabulary between the note engine and clients.
//
// The transport (a websocket per connected client, out of this workspace)
// hands each incoming JSON frame to this crate and sends back whatever it
// returns. Nothing here owns a socket; the crate is the seam between raw
// bytes and `serialist_music::Engine` calls.
//
// Module overview:
// - `message.rs`:  `ClientMessage` / `ServerMessage` enums, tagged by a
//                  `type` field, plus `GlobalFactor` for the broadcast tempo
//                  and volume factor messages.
// - `dispatch.rs`: decoding a frame and turning one client message into one
//                  engine call and one reply.
// - `error.rs`:    `ProtocolError`.
//
// Design decisions:
// - **JSON with internally tagged enums.** The client speaks
//   `{"type": "generate_notes", "voiceId": 1, ...}`, so message tags are
//   snake_case and fields camelCase.
// - **Errors become replies.** A bad frame or rejected parameter set yields
//   a `ServerMessage::Error` rather than closing the session.

pub mod dispatch;
pub mod error;
pub mod message;

pub use dispatch::{decode_client_message, dispatch, handle_frame};
pub use error::ProtocolError;
pub use message::{ClientMessage, GlobalFactor, ServerMessage};

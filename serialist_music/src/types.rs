// Identifier newtypes for the voice state store.
//
// Sessions are named by the transport (one per connected client) and voices
// are small integers assigned by the client UI. Both serialize transparently
// so they appear on the wire as a bare string / number.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Transport-assigned session name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(name: impl Into<String>) -> Self {
        SessionId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(name: &str) -> Self {
        SessionId::new(name)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-assigned voice number, unique within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoiceId(pub u32);

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_print_and_compare_by_name() {
        let owned = SessionId::new(String::from("client-7"));
        assert_eq!(owned, SessionId::from("client-7"));
        assert_eq!(owned.as_str(), "client-7");
        assert_eq!(owned.to_string(), "client-7");
        assert_eq!(serde_json::to_string(&owned).unwrap(), "\"client-7\"");
        assert_eq!(VoiceId(3).to_string(), "3");
    }
}

//! Credential identifier derived from a scanned physical tag.

use serde::{Deserialize, Serialize};

/// Opaque tag identifier. No structure beyond equality is assumed — the RFID
/// reader hands us a digit string and we treat it as a key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Credential {
    fn from(uid: &str) -> Self {
        Self(uid.to_string())
    }
}

impl From<String> for Credential {
    fn from(uid: String) -> Self {
        Self(uid)
    }
}

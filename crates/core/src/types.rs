//! Shared primitive types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Length of an encoded [`EntityId`] in hex characters.
pub const ENTITY_ID_LEN: usize = 24;

/// Opaque 24-character hex identifier (12 bytes), the document-store id
/// convention used by every entity in the system.
///
/// Always held in lowercase; parsing normalizes upper-case input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// Generate a fresh id: 4 bytes of big-endian Unix seconds followed by
    /// 8 random bytes, so ids sort roughly by creation time.
    pub fn generate() -> Self {
        let secs = u32::try_from(chrono::Utc::now().timestamp()).unwrap_or(u32::MAX);
        let random: [u8; 8] = rand::random();

        let mut out = String::with_capacity(ENTITY_ID_LEN);
        for byte in secs.to_be_bytes().iter().chain(random.iter()) {
            out.push_str(&format!("{byte:02x}"));
        }
        Self(out)
    }

    /// Parse and normalize an id, rejecting anything that is not exactly
    /// 24 hex characters.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if trimmed.len() != ENTITY_ID_LEN || !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!(
                "'{raw}' is not a valid id: must be a {ENTITY_ID_LEN}-character hex string"
            ));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Parse an id supplied for the named field, mapping failures to a
    /// [`CoreError::Validation`] that names the field.
    pub fn parse_field(field: &str, raw: &str) -> Result<Self, CoreError> {
        Self::parse(raw).map_err(|_| {
            CoreError::Validation(format!(
                "Invalid {field}: must be a {ENTITY_ID_LEN}-character hex id"
            ))
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EntityId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

//! Resource records as seen by callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::ids::{ResourceId, SignatoryId};
use super::state::{ResourceType, Track};

/// A resource on one of the two tracks.
///
/// Built from a store row by the repository. `content_hash` and `track` are
/// derived at read time and never written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecord {
    pub id: ResourceId,
    pub content: String,
    pub signatory: SignatoryId,

    /// Published resource this record refers to, if any.
    pub resource_id: Option<ResourceId>,

    pub timestamp: DateTime<Utc>,
    pub resource_type: ResourceType,

    /// SHA-256 of `content`, lowercase hex.
    pub content_hash: String,

    /// Set only on rows from the error-joined query.
    pub has_error: Option<String>,

    pub track: Track,
}

/// Lowercase hex SHA-256 digest of `content`.
pub fn content_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Insert request.
///
/// Mirrors what the HTTP layer accepts: every field but `kind` may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResource {
    /// Exposed id; a fresh one is generated when absent.
    pub id: Option<ResourceId>,

    /// `"publish"` for the publishing track, anything else for signing.
    #[serde(rename = "type")]
    pub kind: String,

    /// Index into the signatory roster; a fresh signatory id when absent.
    #[serde(rename = "person")]
    pub person_index: Option<usize>,

    /// Content version; the configured default when absent.
    pub version: Option<u32>,
}

impl NewResource {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<ResourceId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_person(mut self, index: usize) -> Self {
        self.person_index = Some(index);
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    pub fn resource_type(&self) -> ResourceType {
        ResourceType::from_request(&self.kind)
    }
}

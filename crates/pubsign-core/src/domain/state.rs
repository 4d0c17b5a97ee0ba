//! State - resource lifecycle status and pipeline tracks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a resource.
///
/// # 状態遷移
/// - Unpublished -> Publishing -> Published
/// - Unpublished -> Publishing -> Failed
/// - Publishing -> Retry -> Publishing (an error record is attached per attempt)
///
/// The sign track walks the same states. `Retry` is not filtered on directly
/// in the store: it is reconstructed by joining resources with the error log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Unpublished,
    Publishing,
    Published,
    Failed,
    Retry,
}

impl Status {
    /// Every status, in the order a full reset scans them.
    pub const RESET_ORDER: [Status; 5] = [
        Status::Unpublished,
        Status::Published,
        Status::Publishing,
        Status::Failed,
        Status::Retry,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Unpublished => "unpublished",
            Status::Publishing => "publishing",
            Status::Published => "published",
            Status::Failed => "failed",
            Status::Retry => "retry",
        }
    }

    /// Is this status served by the error-joined query?
    pub fn is_retry(self) -> bool {
        matches!(self, Status::Retry)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse failure for [`Status`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unpublished" => Ok(Status::Unpublished),
            "publishing" => Ok(Status::Publishing),
            "published" => Ok(Status::Published),
            "failed" => Ok(Status::Failed),
            "retry" => Ok(Status::Retry),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// One of the two parallel pipelines.
///
/// Never persisted: a record's track is whichever sub-query returned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Track {
    Publishing,
    Signing,
}

impl Track {
    /// Publishing first; merged results keep this order.
    pub const ALL: [Track; 2] = [Track::Publishing, Track::Signing];

    /// The resource type stored for records on this track.
    pub fn resource_type(self) -> ResourceType {
        match self {
            Track::Publishing => ResourceType::PublishedResource,
            Track::Signing => ResourceType::SignedResource,
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Track::Publishing => f.write_str("Publishing"),
            Track::Signing => f.write_str("Signing"),
        }
    }
}

/// Stored type discriminator of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    PublishedResource,
    SignedResource,
}

impl ResourceType {
    /// Maps an insert request's `type`: `"publish"` publishes, everything else signs.
    pub fn from_request(kind: &str) -> Self {
        if kind == "publish" {
            ResourceType::PublishedResource
        } else {
            ResourceType::SignedResource
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::PublishedResource => "PublishedResource",
            ResourceType::SignedResource => "SignedResource",
        }
    }

    pub fn track(self) -> Track {
        match self {
            ResourceType::PublishedResource => Track::Publishing,
            ResourceType::SignedResource => Track::Signing,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Graph stores may hand back the full type IRI.
        let local = s.rsplit(['#', '/']).next().unwrap_or(s);
        match local {
            "PublishedResource" => Ok(ResourceType::PublishedResource),
            "SignedResource" => Ok(ResourceType::SignedResource),
            _ => Err(format!("unknown resource type '{s}'")),
        }
    }
}

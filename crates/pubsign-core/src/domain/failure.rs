//! Error log entries and the failure details they are built from.

use serde::{Deserialize, Serialize};

use super::errors::{PipelineError, Result};
use super::ids::{ErrorId, ResourceId};

/// One entry of the error log.
///
/// For a given `origin` only the entry with the highest `count` is current;
/// older entries stay in the store until a reset removes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub id: ErrorId,
    pub origin: ResourceId,
    pub count: u32,
    pub message: String,
}

/// Failure reported by the downstream publish/sign call.
///
/// Expected shape: `{ "error": { "errors": [ { "title": "..." }, ... ] } }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FailureDetail {
    error: FailureBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct FailureBody {
    errors: Vec<FailureEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct FailureEntry {
    title: String,
}

impl FailureDetail {
    /// Validate a raw failure value; the first entry must carry a title.
    pub fn parse(value: &serde_json::Value) -> Result<Self> {
        let detail = Self::deserialize(value)
            .map_err(|e| PipelineError::MalformedFailureDetail(e.to_string()))?;
        if detail.error.errors.is_empty() {
            return Err(PipelineError::MalformedFailureDetail(
                "error.errors is empty".to_string(),
            ));
        }
        Ok(detail)
    }

    /// Title of the first reported error.
    pub fn title(&self) -> &str {
        // parse() guarantees at least one entry
        &self.error.errors[0].title
    }
}

//! Pipeline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{PipelineError, Result, SignatoryId};

/// Settings injected into the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Known signatory identities, addressed by `person` index on insert.
    #[serde(default = "default_signatories")]
    pub signatories: Vec<String>,

    /// Version stamped on inserts that name none (default: 1)
    #[serde(default = "default_version")]
    pub default_version: u32,
}

fn default_signatories() -> Vec<String> {
    vec![
        "45e2842b-e4ae-4593-a66f-551b8379d6b3".to_string(),
        "385893a9-75d7-4557-9977-29999044b8aa".to_string(),
        "eab29f18-3a50-4a89-842a-2255c8711ce6".to_string(),
    ]
}

fn default_version() -> u32 {
    1
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            signatories: default_signatories(),
            default_version: default_version(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| PipelineError::Config(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&raw)
    }

    /// Signatory at `index` in the roster.
    pub fn signatory(&self, index: usize) -> Result<SignatoryId> {
        self.signatories
            .get(index)
            .map(|s| SignatoryId::new(s.as_str()))
            .ok_or(PipelineError::UnknownSignatory {
                index,
                roster_len: self.signatories.len(),
            })
    }
}

//! ErrorTracker - retry attempts and the per-origin error log.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{
    DeleteFailure, ErrorId, ErrorRecord, FailureDetail, PipelineError, ResourceId, Result,
};
use crate::ports::{IdGenerator, ReadQuery, Row, StoreGateway, WriteQuery, fields};

use super::repository::required;

/// Keep only the highest-count entry per origin.
///
/// Output follows the order in which each origin was first seen. A later
/// entry replaces the kept one only when its count is strictly greater, so on
/// a tie the earlier entry wins.
pub fn dedup_by_max_count(errors: impl IntoIterator<Item = ErrorRecord>) -> Vec<ErrorRecord> {
    let mut slots: HashMap<ResourceId, usize> = HashMap::new();
    let mut kept: Vec<ErrorRecord> = Vec::new();

    for error in errors {
        match slots.get(&error.origin) {
            Some(&slot) => {
                if error.count > kept[slot].count {
                    kept[slot] = error;
                }
            }
            None => {
                slots.insert(error.origin.clone(), kept.len());
                kept.push(error);
            }
        }
    }
    kept
}

fn decode_error(row: &Row) -> Result<ErrorRecord> {
    let count = required(row, fields::ERROR_COUNT)?;
    let count = count
        .trim()
        .parse::<u32>()
        .map_err(|e| PipelineError::MalformedRow {
            field: fields::ERROR_COUNT,
            reason: format!("'{count}': {e}"),
        })?;
    Ok(ErrorRecord {
        id: ErrorId::new(required(row, fields::ID)?),
        origin: ResourceId::new(required(row, fields::ERROR_ORIGIN)?),
        count,
        message: required(row, fields::ERROR_MESSAGE)?.to_string(),
    })
}

/// ErrorTracker records retry attempts and serves the reduced error log.
pub struct ErrorTracker {
    store: Arc<dyn StoreGateway>,
    ids: Arc<dyn IdGenerator>,
}

impl ErrorTracker {
    pub fn new(store: Arc<dyn StoreGateway>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { store, ids }
    }

    /// Attach a new error entry to resource `id` for attempt `count`.
    ///
    /// The message is the first title in `failure`; a detail without one is
    /// rejected before anything is written.
    pub async fn record_retry(
        &self,
        id: &ResourceId,
        failure: &serde_json::Value,
        count: u32,
    ) -> Result<ErrorId> {
        let detail = FailureDetail::parse(failure)?;
        let error_id = self.ids.generate_error_id();
        let query = WriteQuery::RecordRetry {
            error_id: error_id.clone(),
            origin: id.clone(),
            count,
            message: detail.title().to_string(),
        };
        self.store.write(&query).await?;
        info!(resource_id = %id, error_id = %error_id, count, message = detail.title(), "recorded retry");
        Ok(error_id)
    }

    /// Current error per origin.
    pub async fn list_errors(&self) -> Result<Vec<ErrorRecord>> {
        let rows = self.store.read(&ReadQuery::Errors).await?;
        let raw = rows.iter().map(decode_error).collect::<Result<Vec<_>>>()?;
        let total = raw.len();
        let reduced = dedup_by_max_count(raw);
        debug!(total, current = reduced.len(), "listed errors");
        Ok(reduced)
    }

    pub async fn delete(&self, id: &ErrorId) -> Result<()> {
        self.store
            .write(&WriteQuery::DeleteError { id: id.clone() })
            .await?;
        Ok(())
    }

    /// Delete every id, one at a time, and report the ones that failed.
    pub async fn delete_all<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a ErrorId>,
    ) -> Vec<DeleteFailure> {
        let mut failures = Vec::new();
        for id in ids {
            if let Err(e) = self.delete(id).await {
                warn!(error_id = %id, error = %e, "failed to delete error entry");
                failures.push(DeleteFailure {
                    kind: id.kind(),
                    id: id.to_string(),
                    reason: e.to_string(),
                });
            }
        }
        failures
    }
}

//! PipelineController - cross-track queries and the full reset.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::domain::{DeleteFailure, ErrorId, PipelineError, ResourceRecord, Result, Status};

use super::error_tracker::ErrorTracker;
use super::repository::ResourceRepository;
use super::status::StatusCounts;

/// Outcome of [`PipelineController::full_reset`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetReport {
    /// Resource deletes issued, including ones that failed.
    pub resources_attempted: usize,
    /// Error deletes issued, including ones that failed.
    pub errors_attempted: usize,
    pub failures: Vec<DeleteFailure>,
}

impl ResetReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// `Err(PartialReset)` when any delete failed.
    pub fn into_result(self) -> Result<Self> {
        if self.is_clean() {
            Ok(self)
        } else {
            Err(PipelineError::PartialReset {
                failures: self.failures,
            })
        }
    }
}

/// PipelineController ties the repository and the error tracker together.
///
/// # 使用例
/// ```ignore
/// let pipeline = PipelineBuilder::new(store).build()?;
/// pipeline.repository().insert(NewResource::new("publish")).await?;
/// let report = pipeline.full_reset().await?.into_result()?;
/// ```
pub struct PipelineController {
    repository: ResourceRepository,
    errors: ErrorTracker,
}

impl PipelineController {
    pub fn new(repository: ResourceRepository, errors: ErrorTracker) -> Self {
        Self { repository, errors }
    }

    pub fn repository(&self) -> &ResourceRepository {
        &self.repository
    }

    pub fn errors(&self) -> &ErrorTracker {
        &self.errors
    }

    /// Both tracks in `status`, publishing first.
    pub async fn resources_by_status(&self, status: Status) -> Result<Vec<ResourceRecord>> {
        self.repository.fetch_all_by_status(status).await
    }

    /// Per-status, per-track counts plus the number of current errors.
    pub async fn status_counts(&self) -> Result<StatusCounts> {
        let mut counts = StatusCounts::default();
        for status in Status::RESET_ORDER {
            let resources = self.repository.fetch_all_by_status(status).await?;
            counts.record(status, &resources);
        }
        counts.errors = self.errors.list_errors().await?.len();
        Ok(counts)
    }

    /// Delete every resource in the scanned statuses, then every error entry.
    ///
    /// Fetches fail fast. Deletes run one at a time; a failed
    /// delete is recorded in the report and the sweep moves on. Resources in
    /// statuses outside [`Status::RESET_ORDER`] are not touched.
    ///
    /// Each error id is attempted at most once, and the sweep stops when a
    /// listing has nothing new. When the current entry for an origin fails to
    /// delete, that origin's superseded entries never surface and stay in the
    /// store; the report lists only the failed current entry.
    pub async fn full_reset(&self) -> Result<ResetReport> {
        let mut resources = Vec::new();
        for status in Status::RESET_ORDER {
            resources.extend(self.repository.fetch_all_by_status(status).await?);
        }

        let mut report = ResetReport {
            resources_attempted: resources.len(),
            ..ResetReport::default()
        };
        for resource in &resources {
            if let Err(e) = self.repository.delete(&resource.id).await {
                warn!(resource_id = %resource.id, error = %e, "failed to delete resource during reset");
                report.failures.push(DeleteFailure {
                    kind: resource.id.kind(),
                    id: resource.id.to_string(),
                    reason: e.to_string(),
                });
            }
        }

        // Listing is deduplicated, so superseded entries only surface once the
        // current one for their origin is gone.
        let mut attempted: HashSet<ErrorId> = HashSet::new();
        loop {
            let pending: Vec<ErrorId> = self
                .errors
                .list_errors()
                .await?
                .into_iter()
                .map(|e| e.id)
                .filter(|id| !attempted.contains(id))
                .collect();
            if pending.is_empty() {
                break;
            }
            report.errors_attempted += pending.len();
            report.failures.extend(self.errors.delete_all(&pending).await);
            attempted.extend(pending);
        }

        info!(
            resources = report.resources_attempted,
            errors = report.errors_attempted,
            failed = report.failures.len(),
            "reset finished"
        );
        Ok(report)
    }
}

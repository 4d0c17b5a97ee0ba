//! Status - per-status resource counts for dashboards.

use serde::{Deserialize, Serialize};

use crate::domain::{ResourceRecord, Status, Track};

/// Counts for one status, split by track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackCounts {
    pub publishing: usize,
    pub signing: usize,
}

impl TrackCounts {
    pub fn total(&self) -> usize {
        self.publishing + self.signing
    }

    fn add(&mut self, track: Track) {
        match track {
            Track::Publishing => self.publishing += 1,
            Track::Signing => self.signing += 1,
        }
    }
}

/// Resource counts across every status a reset scans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub unpublished: TrackCounts,
    pub publishing: TrackCounts,
    pub published: TrackCounts,
    pub failed: TrackCounts,
    pub retry: TrackCounts,

    /// Current (deduplicated) error entries.
    pub errors: usize,
}

impl StatusCounts {
    pub fn get(&self, status: Status) -> TrackCounts {
        match status {
            Status::Unpublished => self.unpublished,
            Status::Publishing => self.publishing,
            Status::Published => self.published,
            Status::Failed => self.failed,
            Status::Retry => self.retry,
        }
    }

    pub(crate) fn record(&mut self, status: Status, resources: &[ResourceRecord]) {
        let slot = match status {
            Status::Unpublished => &mut self.unpublished,
            Status::Publishing => &mut self.publishing,
            Status::Published => &mut self.published,
            Status::Failed => &mut self.failed,
            Status::Retry => &mut self.retry,
        };
        for resource in resources {
            slot.add(resource.track);
        }
    }

    /// Nothing left in any scanned status and no errors.
    pub fn is_empty(&self) -> bool {
        self.errors == 0 && Status::RESET_ORDER.iter().all(|s| self.get(*s).total() == 0)
    }
}

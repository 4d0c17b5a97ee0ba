//! ResourceRepository - domain operations over the StoreGateway.
//!
//! Translates fetch/set-status/insert/delete into store queries and decodes
//! the returned rows into [`ResourceRecord`]s.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::domain::{
    NewResource, PipelineError, ResourceId, ResourceRecord, ResourceType, Result, SignatoryId,
    Status, Track, content_hash,
};
use crate::ports::{Clock, IdGenerator, ReadQuery, Row, StoreGateway, WriteQuery, fields};

/// Picks the read query for a track and status.
///
/// `Retry` is not stored as a plain status; it is served by the error-joined
/// query of the same track.
pub fn status_query(track: Track, status: Status) -> ReadQuery {
    match (track, status.is_retry()) {
        (track, true) => ReadQuery::ResourcesWithError { track },
        (track, false) => ReadQuery::ResourcesByStatus { track, status },
    }
}

/// Picks the write query for a status change.
pub fn status_update(id: ResourceId, status: Status, content: Option<String>) -> WriteQuery {
    match status {
        Status::Published => WriteQuery::Publish { id, content },
        status => WriteQuery::SetStatus { id, status },
    }
}

pub(crate) fn required<'a>(row: &'a Row, field: &'static str) -> Result<&'a str> {
    row.get(field)
        .map(|b| b.value.as_str())
        .ok_or_else(|| PipelineError::missing_field(field))
}

fn optional<'a>(row: &'a Row, field: &'static str) -> Option<&'a str> {
    row.get(field).map(|b| b.value.as_str())
}

/// Decode one resource row, tagging it with the track that produced it.
pub(crate) fn decode_resource(row: &Row, track: Track) -> Result<ResourceRecord> {
    let content = required(row, fields::CONTENT)?.to_string();
    let timestamp = required(row, fields::TIMESTAMP)?;
    let timestamp = DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| PipelineError::MalformedRow {
            field: fields::TIMESTAMP,
            reason: e.to_string(),
        })?;
    let resource_type = required(row, fields::RESOURCE_TYPE)?
        .parse::<ResourceType>()
        .map_err(|reason| PipelineError::MalformedRow {
            field: fields::RESOURCE_TYPE,
            reason,
        })?;

    Ok(ResourceRecord {
        id: ResourceId::new(required(row, fields::ID)?),
        content_hash: content_hash(&content),
        content,
        signatory: SignatoryId::new(required(row, fields::SIGNATORY)?),
        resource_id: optional(row, fields::PUBLISHED_RESOURCE).map(ResourceId::new),
        timestamp,
        resource_type,
        has_error: optional(row, fields::HAS_ERROR).map(str::to_string),
        track,
    })
}

/// ResourceRepository は resource の取得・状態遷移・作成・削除を担当
pub struct ResourceRepository {
    store: Arc<dyn StoreGateway>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    config: PipelineConfig,
}

impl ResourceRepository {
    pub fn new(
        store: Arc<dyn StoreGateway>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            ids,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Resources of one track in `status`, in store order.
    pub async fn fetch_by_status(&self, track: Track, status: Status) -> Result<Vec<ResourceRecord>> {
        let query = status_query(track, status);
        debug!(%track, %status, ?query, "fetching resources");
        let rows = self.store.read(&query).await?;
        rows.iter().map(|row| decode_resource(row, track)).collect()
    }

    /// Both tracks in `status`: publishing results first, then signing.
    pub async fn fetch_all_by_status(&self, status: Status) -> Result<Vec<ResourceRecord>> {
        let mut all = Vec::new();
        for track in Track::ALL {
            all.extend(self.fetch_by_status(track, status).await?);
        }
        Ok(all)
    }

    /// Move a resource to `status`.
    ///
    /// `Published` also writes `content`; other statuses ignore it.
    /// `Retry` is stored as a plain status, but [`Self::fetch_by_status`] serves
    /// `Retry` from the error-joined query, so such a resource is invisible to
    /// every status scan (including the reset's) until it moves again.
    pub async fn set_status(
        &self,
        id: &ResourceId,
        status: Status,
        content: Option<String>,
    ) -> Result<()> {
        let query = status_update(id.clone(), status, content);
        debug!(resource_id = %id, %status, query = query.name(), "updating status");
        self.store.write(&query).await?;
        Ok(())
    }

    /// Create a resource in `Unpublished` and return its exposed id.
    pub async fn insert(&self, request: NewResource) -> Result<ResourceId> {
        let signatory = match request.person_index {
            Some(index) => self.config.signatory(index)?,
            None => self.ids.generate_signatory_id(),
        };
        let id = request
            .id
            .clone()
            .unwrap_or_else(|| self.ids.generate_resource_id());
        let version = request.version.unwrap_or(self.config.default_version);

        self.write_insert(id, signatory, request.resource_type(), version)
            .await
    }

    /// Seed a publishing resource with fresh ids and version 1.
    pub async fn insert_random(&self) -> Result<ResourceId> {
        let id = self.ids.generate_resource_id();
        let signatory = self.ids.generate_signatory_id();
        self.write_insert(id, signatory, ResourceType::PublishedResource, 1)
            .await
    }

    async fn write_insert(
        &self,
        id: ResourceId,
        signatory: SignatoryId,
        resource_type: ResourceType,
        version: u32,
    ) -> Result<ResourceId> {
        let query = WriteQuery::Insert {
            record_id: self.ids.generate_record_id(),
            id: id.clone(),
            signatory,
            resource_type,
            status: Status::Unpublished,
            version,
            timestamp: self.clock.now(),
        };
        self.store.write(&query).await?;
        info!(resource_id = %id, %resource_type, version, "inserted resource");
        Ok(id)
    }

    /// Remove a resource. Unknown ids are left to the store (the in-memory store ignores them).
    pub async fn delete(&self, id: &ResourceId) -> Result<()> {
        debug!(resource_id = %id, "deleting resource");
        self.store
            .write(&WriteQuery::DeleteResource { id: id.clone() })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryStore;
    use crate::ports::{Binding, FixedClock, UlidGenerator};
    use crate::testing::RecordingStore;
    use chrono::TimeZone;
    use rstest::rstest;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    fn repository(store: Arc<dyn StoreGateway>) -> ResourceRepository {
        let clock = FixedClock::new(fixed_time());
        ResourceRepository::new(
            store,
            Arc::new(UlidGenerator::new(clock)),
            Arc::new(clock),
            PipelineConfig::default(),
        )
    }

    #[rstest]
    #[case::unpublished(Status::Unpublished)]
    #[case::publishing(Status::Publishing)]
    #[case::published(Status::Published)]
    #[case::failed(Status::Failed)]
    fn plain_statuses_use_status_query(#[case] status: Status) {
        for track in Track::ALL {
            assert_eq!(
                status_query(track, status),
                ReadQuery::ResourcesByStatus { track, status }
            );
        }
    }

    #[test]
    fn retry_uses_error_joined_query() {
        for track in Track::ALL {
            assert_eq!(
                status_query(track, Status::Retry),
                ReadQuery::ResourcesWithError { track }
            );
        }
    }

    #[rstest]
    #[case::published(Status::Published, true)]
    #[case::publishing(Status::Publishing, false)]
    #[case::failed(Status::Failed, false)]
    #[case::retry(Status::Retry, false)]
    fn only_published_writes_content(#[case] status: Status, #[case] publishes: bool) {
        let query = status_update(ResourceId::new("r"), status, Some("body".into()));
        assert_eq!(matches!(query, WriteQuery::Publish { .. }), publishes);
    }

    #[tokio::test]
    async fn fetch_by_status_issues_routed_query() {
        let store = Arc::new(RecordingStore::new());
        let repo = repository(store.clone());

        repo.fetch_by_status(Track::Signing, Status::Retry).await.unwrap();
        repo.fetch_by_status(Track::Signing, Status::Failed).await.unwrap();

        assert_eq!(
            store.reads(),
            vec![
                ReadQuery::ResourcesWithError {
                    track: Track::Signing
                },
                ReadQuery::ResourcesByStatus {
                    track: Track::Signing,
                    status: Status::Failed
                },
            ]
        );
    }

    #[tokio::test]
    async fn fetch_all_concatenates_tracks_in_order() {
        let store = Arc::new(InMemoryStore::new());
        let repo = repository(store.clone());
        let s1 = repo.insert(NewResource::new("sign").with_id("s1")).await.unwrap();
        let p1 = repo.insert(NewResource::new("publish").with_id("p1")).await.unwrap();
        let s2 = repo.insert(NewResource::new("sign").with_id("s2")).await.unwrap();
        let p2 = repo.insert(NewResource::new("publish").with_id("p2")).await.unwrap();

        let publishing = repo
            .fetch_by_status(Track::Publishing, Status::Unpublished)
            .await
            .unwrap();
        let signing = repo
            .fetch_by_status(Track::Signing, Status::Unpublished)
            .await
            .unwrap();
        let all = repo.fetch_all_by_status(Status::Unpublished).await.unwrap();

        assert_eq!(all.len(), publishing.len() + signing.len());
        let ids: Vec<_> = all.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![p1, p2, s1, s2]);
        let tracks: Vec<_> = all.iter().map(|r| r.track).collect();
        assert_eq!(
            tracks,
            vec![Track::Publishing, Track::Publishing, Track::Signing, Track::Signing]
        );
    }

    #[tokio::test]
    async fn insert_generates_id_when_missing() {
        let store = Arc::new(InMemoryStore::new());
        let repo = repository(store.clone());

        let generated = repo.insert(NewResource::new("publish")).await.unwrap();
        let given = repo.insert(NewResource::new("publish").with_id("X")).await.unwrap();

        assert!(!generated.as_str().is_empty());
        assert_ne!(generated, given);
        assert_eq!(given, ResourceId::new("X"));

        let all = repo.fetch_all_by_status(Status::Unpublished).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, generated);
        assert_eq!(all[1].id, given);
    }

    #[tokio::test]
    async fn insert_writes_fresh_record_id_and_defaults() {
        let store = Arc::new(RecordingStore::new());
        let repo = repository(store.clone());

        repo.insert(NewResource::new("sign").with_id("X").with_person(2))
            .await
            .unwrap();

        let writes = store.writes();
        let WriteQuery::Insert {
            record_id,
            id,
            signatory,
            resource_type,
            status,
            version,
            timestamp,
        } = &writes[0]
        else {
            panic!("expected insert, got {:?}", writes[0]);
        };
        assert_ne!(record_id.as_str(), id.as_str());
        assert_eq!(signatory.as_str(), "eab29f18-3a50-4a89-842a-2255c8711ce6");
        assert_eq!(*resource_type, ResourceType::SignedResource);
        assert_eq!(*status, Status::Unpublished);
        assert_eq!(*version, 1);
        assert_eq!(*timestamp, fixed_time());
    }

    #[rstest]
    #[case::explicit(Some(7), 7)]
    #[case::configured_default(None, 3)]
    #[tokio::test]
    async fn insert_version_overrides_default(#[case] requested: Option<u32>, #[case] expected: u32) {
        let store = Arc::new(RecordingStore::new());
        let clock = FixedClock::new(fixed_time());
        let repo = ResourceRepository::new(
            store.clone(),
            Arc::new(UlidGenerator::new(clock)),
            Arc::new(clock),
            PipelineConfig {
                default_version: 3,
                ..PipelineConfig::default()
            },
        );

        let mut request = NewResource::new("publish");
        if let Some(version) = requested {
            request = request.with_version(version);
        }
        repo.insert(request).await.unwrap();

        let writes = store.writes();
        assert!(matches!(&writes[0], WriteQuery::Insert { version, .. } if *version == expected));
    }

    #[tokio::test]
    async fn set_status_retry_hides_resource_from_scans() {
        let store = Arc::new(InMemoryStore::new());
        let repo = repository(store.clone());
        let id = repo.insert(NewResource::new("publish")).await.unwrap();

        repo.set_status(&id, Status::Retry, None).await.unwrap();

        for status in Status::RESET_ORDER {
            assert!(repo.fetch_all_by_status(status).await.unwrap().is_empty(), "{status}");
        }
        assert_eq!(store.resource_count().await, 1);
    }

    #[tokio::test]
    async fn insert_rejects_unknown_person_index() {
        let store = Arc::new(RecordingStore::new());
        let repo = repository(store.clone());

        let err = repo
            .insert(NewResource::new("publish").with_person(7))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnknownSignatory { index: 7, .. }));
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn insert_random_seeds_publishing_resource() {
        let store = Arc::new(InMemoryStore::new());
        let repo = repository(store.clone());

        let id = repo.insert_random().await.unwrap();
        let rows = repo
            .fetch_by_status(Track::Publishing, Status::Unpublished)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);
        assert_eq!(rows[0].resource_type, ResourceType::PublishedResource);
    }

    #[tokio::test]
    async fn set_status_moves_resource_between_queries() {
        let store = Arc::new(InMemoryStore::new());
        let repo = repository(store.clone());
        let id = repo.insert(NewResource::new("publish")).await.unwrap();

        repo.set_status(&id, Status::Publishing, None).await.unwrap();
        assert!(repo.fetch_all_by_status(Status::Unpublished).await.unwrap().is_empty());

        repo.set_status(&id, Status::Published, Some("<html/>".into()))
            .await
            .unwrap();
        let published = repo.fetch_all_by_status(Status::Published).await.unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].content, "<html/>");
        assert_eq!(published[0].content_hash, content_hash("<html/>"));
        assert_eq!(published[0].timestamp, fixed_time());
    }

    #[tokio::test]
    async fn set_status_on_missing_resource_is_not_found() {
        let repo = repository(Arc::new(InMemoryStore::new()));
        let err = repo
            .set_status(&ResourceId::new("ghost"), Status::Failed, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NotFound { kind: "resource", id } if id == "ghost"));
    }

    #[tokio::test]
    async fn delete_removes_only_target() {
        let store = Arc::new(InMemoryStore::new());
        let repo = repository(store.clone());
        let keep = repo.insert(NewResource::new("publish")).await.unwrap();
        let gone = repo.insert(NewResource::new("sign")).await.unwrap();

        repo.delete(&gone).await.unwrap();
        repo.delete(&ResourceId::new("never-existed")).await.unwrap();

        let left = repo.fetch_all_by_status(Status::Unpublished).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, keep);
    }

    #[tokio::test]
    async fn signed_resource_carries_back_reference() {
        let store = Arc::new(InMemoryStore::new());
        let repo = repository(store.clone());
        let published = repo.insert(NewResource::new("publish")).await.unwrap();
        let signed = repo.insert(NewResource::new("sign")).await.unwrap();
        store.link_published(&signed, &published).await.unwrap();

        let rows = repo
            .fetch_by_status(Track::Signing, Status::Unpublished)
            .await
            .unwrap();
        assert_eq!(rows[0].resource_id, Some(published));
        assert_eq!(rows[0].has_error, None);
    }

    #[test]
    fn decode_reports_missing_fields() {
        let mut row = Row::new();
        row.insert(fields::ID.into(), Binding::literal("r1"));
        let err = decode_resource(&row, Track::Publishing).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedRow { field: "content", .. }));
    }

    #[test]
    fn decode_reports_bad_timestamp() {
        let mut row = Row::new();
        for (field, value) in [
            (fields::ID, "r1"),
            (fields::CONTENT, "c"),
            (fields::SIGNATORY, "s"),
            (fields::TIMESTAMP, "yesterday"),
            (fields::RESOURCE_TYPE, "PublishedResource"),
        ] {
            row.insert(field.into(), Binding::literal(value));
        }
        let err = decode_resource(&row, Track::Publishing).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedRow { field: "timestamp", .. }));
    }
}

//! InMemoryStore - 開発用・テスト用の StoreGateway
//!
//! Resources and error entries live in insertion order, which is the
//! "store-defined order" rows come back in.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use tokio::sync::Mutex;

use crate::domain::{ErrorId, ResourceId, ResourceType, SignatoryId, Status};
use crate::ports::{
    Binding, ReadQuery, Row, RowSet, StoreError, StoreGateway, WriteQuery, fields,
};

#[derive(Debug, Clone)]
struct StoredResource {
    id: ResourceId,
    content: String,
    signatory: SignatoryId,
    published_resource: Option<ResourceId>,
    resource_type: ResourceType,
    status: Status,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredError {
    id: ErrorId,
    origin: ResourceId,
    count: u32,
    message: String,
}

#[derive(Debug, Default)]
struct InMemoryStoreState {
    resources: Vec<StoredResource>,
    errors: Vec<StoredError>,
}

impl InMemoryStoreState {
    fn resource_mut(&mut self, id: &ResourceId) -> Result<&mut StoredResource, StoreError> {
        self.resources
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| StoreError::NotFound {
                kind: id.kind(),
                id: id.to_string(),
            })
    }

    /// Newest error entry for a resource, by attempt count.
    fn latest_error(&self, origin: &ResourceId) -> Option<&StoredError> {
        self.errors
            .iter()
            .filter(|e| &e.origin == origin)
            .fold(None, |best: Option<&StoredError>, e| match best {
                Some(b) if b.count >= e.count => Some(b),
                _ => Some(e),
            })
    }

    fn resource_row(&self, resource: &StoredResource, with_error: bool) -> Row {
        let mut row = Row::new();
        row.insert(fields::ID.into(), Binding::literal(resource.id.as_str()));
        row.insert(fields::CONTENT.into(), Binding::literal(resource.content.as_str()));
        row.insert(
            fields::SIGNATORY.into(),
            Binding::literal(resource.signatory.as_str()),
        );
        if let Some(published) = &resource.published_resource {
            row.insert(
                fields::PUBLISHED_RESOURCE.into(),
                Binding::literal(published.as_str()),
            );
        }
        row.insert(
            fields::TIMESTAMP.into(),
            Binding {
                value: resource.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
                datatype: Some("http://www.w3.org/2001/XMLSchema#dateTime".to_string()),
            },
        );
        row.insert(
            fields::RESOURCE_TYPE.into(),
            Binding::literal(resource.resource_type.as_str()),
        );
        if with_error && let Some(err) = self.latest_error(&resource.id) {
            row.insert(fields::HAS_ERROR.into(), Binding::literal(err.id.as_str()));
        }
        row
    }

    fn error_row(error: &StoredError) -> Row {
        let mut row = Row::new();
        row.insert(fields::ID.into(), Binding::literal(error.id.as_str()));
        row.insert(fields::ERROR_MESSAGE.into(), Binding::literal(error.message.as_str()));
        row.insert(
            fields::ERROR_COUNT.into(),
            Binding {
                value: error.count.to_string(),
                datatype: Some("http://www.w3.org/2001/XMLSchema#integer".to_string()),
            },
        );
        row.insert(fields::ERROR_ORIGIN.into(), Binding::literal(error.origin.as_str()));
        row
    }

    fn read(&self, query: &ReadQuery) -> RowSet {
        match query {
            ReadQuery::ResourcesByStatus { track, status } => self
                .resources
                .iter()
                .filter(|r| r.resource_type.track() == *track && r.status == *status)
                .map(|r| self.resource_row(r, false))
                .collect(),
            ReadQuery::ResourcesWithError { track } => self
                .resources
                .iter()
                .filter(|r| r.resource_type.track() == *track)
                .filter(|r| self.errors.iter().any(|e| e.origin == r.id))
                .map(|r| self.resource_row(r, true))
                .collect(),
            ReadQuery::Errors => self.errors.iter().map(Self::error_row).collect(),
        }
    }

    fn write(&mut self, query: &WriteQuery) -> Result<(), StoreError> {
        match query {
            WriteQuery::SetStatus { id, status } => {
                self.resource_mut(id)?.status = *status;
            }
            WriteQuery::Publish { id, content } => {
                let resource = self.resource_mut(id)?;
                resource.status = Status::Published;
                if let Some(content) = content {
                    resource.content = content.clone();
                }
            }
            WriteQuery::Insert {
                id,
                signatory,
                resource_type,
                status,
                timestamp,
                ..
            } => {
                if self.resources.iter().any(|r| &r.id == id) {
                    return Err(StoreError::ConstraintViolation(format!(
                        "resource {id} already exists"
                    )));
                }
                self.resources.push(StoredResource {
                    id: id.clone(),
                    content: String::new(),
                    signatory: signatory.clone(),
                    published_resource: None,
                    resource_type: *resource_type,
                    status: *status,
                    timestamp: *timestamp,
                });
            }
            WriteQuery::DeleteResource { id } => {
                self.resources.retain(|r| &r.id != id);
            }
            WriteQuery::RecordRetry {
                error_id,
                origin,
                count,
                message,
            } => {
                self.resource_mut(origin)?;
                self.errors.push(StoredError {
                    id: error_id.clone(),
                    origin: origin.clone(),
                    count: *count,
                    message: message.clone(),
                });
            }
            WriteQuery::DeleteError { id } => {
                self.errors.retain(|e| &e.id != id);
            }
        }
        Ok(())
    }
}

/// InMemoryStore は開発用の StoreGateway
///
/// # 使用例
/// ```ignore
/// let store = Arc::new(InMemoryStore::new());
/// let pipeline = PipelineBuilder::new(store.clone()).build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<InMemoryStoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored resources, whatever their status.
    pub async fn resource_count(&self) -> usize {
        self.state.lock().await.resources.len()
    }

    /// Number of stored error entries, superseded ones included.
    pub async fn error_count(&self) -> usize {
        self.state.lock().await.errors.len()
    }

    /// Point `id` at the published resource it signs.
    pub async fn link_published(
        &self,
        id: &ResourceId,
        published: &ResourceId,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.resource_mut(id)?.published_resource = Some(published.clone());
        Ok(())
    }
}

#[async_trait]
impl StoreGateway for InMemoryStore {
    async fn read(&self, query: &ReadQuery) -> Result<RowSet, StoreError> {
        let state = self.state.lock().await;
        Ok(state.read(query))
    }

    async fn write(&self, query: &WriteQuery) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.write(query)
    }
}

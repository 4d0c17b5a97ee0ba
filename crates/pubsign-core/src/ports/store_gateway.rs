//! StoreGateway port - the graph store behind the pipeline.
//!
//! The gateway executes parameterized read queries (returning row sets) and
//! write queries (mutations). Queries are typed values here; rendering them
//! into the store's query language, and escaping every parameter, is the
//! gateway implementation's job.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{ErrorId, RecordId, ResourceId, ResourceType, SignatoryId, Status, Track};

/// Field names shared by the gateway and the row decoders.
pub mod fields {
    pub const ID: &str = "id";
    pub const CONTENT: &str = "content";
    pub const SIGNATORY: &str = "signatory";
    pub const PUBLISHED_RESOURCE: &str = "publishedResource";
    pub const TIMESTAMP: &str = "timestamp";
    pub const RESOURCE_TYPE: &str = "resourceType";
    pub const HAS_ERROR: &str = "hasError";

    pub const ERROR_MESSAGE: &str = "err";
    pub const ERROR_COUNT: &str = "count";
    pub const ERROR_ORIGIN: &str = "origin";
}

/// A typed value in a result row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub value: String,
    /// Datatype IRI for typed literals, if the store reports one.
    pub datatype: Option<String>,
}

impl Binding {
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
        }
    }
}

/// One result row: field name -> binding. Optional fields are simply absent.
pub type Row = HashMap<String, Binding>;

/// Rows in store-defined order.
pub type RowSet = Vec<Row>;

/// Read queries the pipeline issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadQuery {
    /// Resources of one track whose stored status equals `status`.
    ResourcesByStatus { track: Track, status: Status },

    /// Resources of one track joined with the error log; rows carry `hasError`.
    ResourcesWithError { track: Track },

    /// The raw error log, every entry.
    Errors,
}

/// Write queries the pipeline issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteQuery {
    /// Status-only update.
    SetStatus { id: ResourceId, status: Status },

    /// Publishing finalization: status `published` and the content, together.
    Publish { id: ResourceId, content: Option<String> },

    /// New resource node.
    Insert {
        record_id: RecordId,
        id: ResourceId,
        signatory: SignatoryId,
        resource_type: ResourceType,
        status: Status,
        version: u32,
        timestamp: DateTime<Utc>,
    },

    DeleteResource { id: ResourceId },

    /// Attach an error entry to a resource.
    RecordRetry {
        error_id: ErrorId,
        origin: ResourceId,
        count: u32,
        message: String,
    },

    DeleteError { id: ErrorId },
}

impl WriteQuery {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            WriteQuery::SetStatus { .. } => "set_status",
            WriteQuery::Publish { .. } => "publish",
            WriteQuery::Insert { .. } => "insert",
            WriteQuery::DeleteResource { .. } => "delete_resource",
            WriteQuery::RecordRetry { .. } => "record_retry",
            WriteQuery::DeleteError { .. } => "delete_error",
        }
    }
}

/// Errors surfaced by a gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
}

/// StoreGateway executes queries against the backing store.
///
/// # Thread Safety
/// - `Send + Sync` so one gateway can back every component behind an `Arc`.
#[async_trait]
pub trait StoreGateway: Send + Sync {
    async fn read(&self, query: &ReadQuery) -> Result<RowSet, StoreError>;

    async fn write(&self, query: &WriteQuery) -> Result<(), StoreError>;
}

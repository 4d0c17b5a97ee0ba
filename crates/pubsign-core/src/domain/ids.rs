//! Domain identifiers (strongly-typed IDs).
//!
//! Identifiers are opaque strings: callers may hand us their own resource ids,
//! and the store may hold ids minted elsewhere. Fresh ids are ULID strings
//! produced by [`IdGenerator`](crate::ports::IdGenerator).
//!
//! ## Phantom Type パターン
//! `Id<T>` carries a zero-sized marker so a `ResourceId` can never be passed
//! where an `ErrorId` is expected, while sharing one implementation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// Marker trait for each id kind.
pub trait IdMarker: Send + Sync + 'static {
    /// Human readable kind, used in error messages ("resource", "error", ...).
    const KIND: &'static str;
}

/// Generic string-backed id.
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    value: String,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    /// Id minted from a ULID.
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self::new(ulid.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> &'static str {
        T::KIND
    }
}

// Manual impls: derive would put bounds on `T`, and the markers are uninhabited.
impl<T: IdMarker> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<T: IdMarker> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", T::KIND, self.value)
    }
}

impl<T: IdMarker> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: IdMarker> Eq for Id<T> {}

impl<T: IdMarker> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> From<&str> for Id<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> From<String> for Id<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Exposed resource identity.
#[derive(Debug)]
pub enum Resource {}

impl IdMarker for Resource {
    const KIND: &'static str = "resource";
}

/// Internal store node, distinct from the exposed resource id.
#[derive(Debug)]
pub enum Record {}

impl IdMarker for Record {
    const KIND: &'static str = "record";
}

/// Error log entry.
#[derive(Debug)]
pub enum ErrorEntry {}

impl IdMarker for ErrorEntry {
    const KIND: &'static str = "error";
}

/// Acting party.
#[derive(Debug)]
pub enum Signatory {}

impl IdMarker for Signatory {
    const KIND: &'static str = "signatory";
}

/// Identifier a caller uses to address a resource.
pub type ResourceId = Id<Resource>;

/// Identifier of the stored node backing a resource.
pub type RecordId = Id<Record>;

/// Identifier of one error log entry.
pub type ErrorId = Id<ErrorEntry>;

/// Identifier of a signatory.
pub type SignatoryId = Id<Signatory>;

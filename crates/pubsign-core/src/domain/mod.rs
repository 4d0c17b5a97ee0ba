//! Domain model (ids, statuses, resource and error records, errors).

pub mod errors;
pub mod failure;
pub mod ids;
pub mod resource;
pub mod state;

pub use self::errors::{DeleteFailure, PipelineError, Result};
pub use self::failure::{ErrorRecord, FailureDetail};
pub use self::ids::{ErrorId, RecordId, ResourceId, SignatoryId};
pub use self::resource::{NewResource, ResourceRecord, content_hash};
pub use self::state::{ResourceType, Status, Track, UnknownStatus};

//! Test doubles for the store port.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::impls::InMemoryStore;
use crate::ports::{ReadQuery, RowSet, StoreError, StoreGateway, WriteQuery};

type WriteFilter = Box<dyn Fn(&WriteQuery) -> bool + Send + Sync>;

/// Wraps an [`InMemoryStore`], records every query, and can fail one chosen write.
#[derive(Default)]
pub(crate) struct RecordingStore {
    inner: InMemoryStore,
    reads: Mutex<Vec<ReadQuery>>,
    writes: Mutex<Vec<WriteQuery>>,
    fail_once: Mutex<Option<WriteFilter>>,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn inner(&self) -> &InMemoryStore {
        &self.inner
    }

    /// The first write matching `filter` fails with `StoreError::Unavailable`.
    pub(crate) fn fail_write_once(
        &self,
        filter: impl Fn(&WriteQuery) -> bool + Send + Sync + 'static,
    ) {
        *self.fail_once.lock().unwrap() = Some(Box::new(filter));
    }

    pub(crate) fn reads(&self) -> Vec<ReadQuery> {
        self.reads.lock().unwrap().clone()
    }

    /// Every attempted write, failed ones included.
    pub(crate) fn writes(&self) -> Vec<WriteQuery> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl StoreGateway for RecordingStore {
    async fn read(&self, query: &ReadQuery) -> Result<RowSet, StoreError> {
        self.reads.lock().unwrap().push(query.clone());
        self.inner.read(query).await
    }

    async fn write(&self, query: &WriteQuery) -> Result<(), StoreError> {
        self.writes.lock().unwrap().push(query.clone());
        let fail = {
            let mut slot = self.fail_once.lock().unwrap();
            let hit = slot.as_ref().is_some_and(|filter| filter(query));
            if hit {
                *slot = None;
            }
            hit
        };
        if fail {
            return Err(StoreError::Unavailable(format!(
                "injected failure on {}",
                query.name()
            )));
        }
        self.inner.write(query).await
    }
}

//! PipelineBuilder - アプリケーションの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）

use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::ports::{Clock, IdGenerator, StoreGateway, SystemClock, UlidGenerator};

use super::controller::PipelineController;
use super::error_tracker::ErrorTracker;
use super::repository::ResourceRepository;

/// PipelineBuilder wires a store, configuration, id minting and time into a controller.
///
/// # 使用例
/// ```ignore
/// let pipeline = PipelineBuilder::new(Arc::new(InMemoryStore::new()))
///     .config(PipelineConfig::from_path("pubsign.json")?)
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - build() rejects an empty signatory roster instead of failing on the first insert
pub struct PipelineBuilder {
    store: Arc<dyn StoreGateway>,
    config: PipelineConfig,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("signatory roster is empty; configure at least one signatory")]
    EmptySignatoryRoster,

    #[error("signatory at index {0} is blank")]
    BlankSignatory(usize),
}

impl PipelineBuilder {
    pub fn new(store: Arc<dyn StoreGateway>) -> Self {
        Self {
            store,
            config: PipelineConfig::default(),
            clock: None,
            ids: None,
        }
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Defaults to a [`UlidGenerator`] over [`SystemClock`].
    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn build(self) -> Result<PipelineController, BuildError> {
        if self.config.signatories.is_empty() {
            return Err(BuildError::EmptySignatoryRoster);
        }
        if let Some(index) = self
            .config
            .signatories
            .iter()
            .position(|s| s.trim().is_empty())
        {
            return Err(BuildError::BlankSignatory(index));
        }

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(SystemClock)) as Arc<dyn IdGenerator>);

        let repository =
            ResourceRepository::new(self.store.clone(), ids.clone(), clock, self.config);
        let errors = ErrorTracker::new(self.store, ids);
        Ok(PipelineController::new(repository, errors))
    }
}

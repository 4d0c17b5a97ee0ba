//! pubsign-core
//!
//! Status tracking for resources moving through the publish/sign pipeline.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, status/track, resource and error records, errors）
//! - **ports**: 抽象化レイヤー（StoreGateway, Clock, IdGenerator）
//! - **app**: アプリケーションロジック（repository, error tracker, controller, builder）
//! - **impls**: 実装（InMemoryStore）
//! - **config**: signatory roster and insert defaults

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

pub use app::{PipelineBuilder, PipelineController, ResetReport};
pub use config::PipelineConfig;
pub use domain::{PipelineError, Result};

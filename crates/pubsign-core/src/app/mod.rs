//! App - アプリケーション層
//!
//! ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **ResourceRepository**: status query routing, insert, status updates, delete
//! - **ErrorTracker**: retry recording and the per-origin error log
//! - **PipelineController**: cross-track queries, counts, full reset
//! - **PipelineBuilder**: wiring and start-up validation

pub mod builder;
pub mod controller;
pub mod error_tracker;
pub mod repository;
pub mod status;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, PipelineBuilder};
pub use self::controller::{PipelineController, ResetReport};
pub use self::error_tracker::{ErrorTracker, dedup_by_max_count};
pub use self::repository::ResourceRepository;
pub use self::status::{StatusCounts, TrackCounts};

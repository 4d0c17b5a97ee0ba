//! Impls - 実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryStore**: 開発用の StoreGateway
//!
//! A production gateway (SPARQL endpoint, graph database client) lives in its
//! own crate and implements [`StoreGateway`](crate::ports::StoreGateway).

pub mod memory_store;

pub use self::memory_store::InMemoryStore;

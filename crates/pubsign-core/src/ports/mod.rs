//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」。The graph store, time and id
//! minting are reached only through these traits, so the application layer
//! can run against the in-memory store in tests.

pub mod clock;
pub mod id_generator;
pub mod store_gateway;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::store_gateway::{
    Binding, ReadQuery, Row, RowSet, StoreError, StoreGateway, WriteQuery, fields,
};

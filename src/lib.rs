//! TTL Cache - An embeddable in-memory key-value cache
//!
//! Entries expire after a per-key time-to-live. Expiration is checked lazily
//! on read and enforced eagerly by a background sweeper task owned by each
//! cache instance. An axum front end exposes the cache over HTTP.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
mod tasks;

pub use api::AppState;
pub use cache::{CacheConfig, CacheStats, StatsSnapshot, TtlCache};
pub use config::Config;

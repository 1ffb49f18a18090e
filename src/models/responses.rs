//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::StatsSnapshot;

/// Response body for the GET operation (GET /get)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse<V> {
    /// The stored value
    pub value: V,
}

impl<V> GetResponse<V> {
    /// Creates a new GetResponse
    pub fn new(value: V) -> Self {
        Self { value }
    }
}

/// Response body for the SET operation (POST /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for the DELETE operation (DELETE /delete)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            message: "Key deleted successfully".to_string(),
            key: key.into(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Reads that returned a value
    pub hits: u64,
    /// Reads of absent or expired keys
    pub misses: u64,
    /// Writes, including overwrites
    pub sets: u64,
    /// Delete calls
    pub deletes: u64,
    /// Entries evicted by the sweeper
    pub expirations: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Current number of entries in cache
    pub total_entries: usize,
}

impl StatsResponse {
    /// Creates a new StatsResponse from a counter snapshot
    pub fn new(snapshot: StatsSnapshot, total_entries: usize) -> Self {
        Self {
            hits: snapshot.hits,
            misses: snapshot.misses,
            sets: snapshot.sets,
            deletes: snapshot.deletes,
            expirations: snapshot.expirations,
            hit_rate: snapshot.hit_rate(),
            total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

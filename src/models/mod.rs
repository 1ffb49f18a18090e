//! Request and Response models for the cache server API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! deserializing query parameters and serializing HTTP response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{parse_duration_secs, KeyParams, SetCommand, SetParams};
pub use responses::{DeleteResponse, GetResponse, HealthResponse, SetResponse, StatsResponse};

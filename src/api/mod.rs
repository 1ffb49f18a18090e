//! API Module
//!
//! HTTP handlers and routing for the cache server.
//!
//! # Endpoints
//! - `POST /set?key=&value=&duration=` - Store a value for `duration` seconds
//! - `GET /get?key=` - Retrieve a value
//! - `DELETE /delete?key=` - Delete a key
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;

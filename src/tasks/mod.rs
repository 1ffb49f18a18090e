//! Background Tasks Module
//!
//! Contains background tasks that run periodically while a cache is alive.
//!
//! # Tasks
//! - Sweeper: Evicts expired cache entries at a fixed interval

mod sweeper;

pub(crate) use sweeper::spawn_sweeper;

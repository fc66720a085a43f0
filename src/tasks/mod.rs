//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry purge: removes expired cache entries at the configured interval

mod cleanup;

pub use cleanup::spawn_purge_task;

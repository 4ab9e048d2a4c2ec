//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiration sweep: purges entries whose sliding window has lapsed

mod expiration;

pub use expiration::spawn_expiration_task;

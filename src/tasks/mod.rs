//! Background Tasks Module
//!
//! Contains optional background tasks a caller can run next to a shared cache.
//!
//! # Tasks
//! - Expiration purge: removes expired entries at a fixed interval. The cache
//!   itself only expires entries lazily on `get`; starting this task is the
//!   caller's decision.

mod purge;

pub use purge::{spawn_purge_task, spawn_purge_task_from_config};

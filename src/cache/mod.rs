//! Day-bucketed caching for upstream result sets.

mod layer;
mod storage;

pub use layer::{iso_now, DayCache, Fetched};
pub use storage::{CacheStorage, SqliteStorage};

//! Repository activity statistics aggregation.

mod keys;
mod service;
mod types;

pub use service::StatsService;
pub use types::{MemberStats, RepoStats};

//! GitHub REST API client, pagination, and response types.

pub mod api_types;
mod client;
mod pager;

pub use client::GitHubClient;
pub use pager::{fetch_all_pages, MAX_PAGES, PAGE_SIZE};

use api_types::{ApiCommit, ApiIssue, ApiPull, ApiSearchResults};
use color_eyre::Result;
use std::future::Future;

/// Upstream hosting API surface the aggregator depends on.
///
/// List operations are best-effort: a mid-pagination failure degrades to
/// partial results inside the implementation and never errors. Search counts
/// are single requests and propagate their errors.
pub trait GitHubApi: Send + Sync {
  /// List commits for a repository, optionally filtered by author login
  /// and/or an ISO-8601 `since` lower bound. Newest first.
  fn list_commits(
    &self,
    token: &str,
    owner: &str,
    repo: &str,
    author: Option<&str>,
    since: Option<&str>,
  ) -> impl Future<Output = Vec<ApiCommit>> + Send;

  /// List issues in all states.
  fn list_issues(
    &self,
    token: &str,
    owner: &str,
    repo: &str,
  ) -> impl Future<Output = Vec<ApiIssue>> + Send;

  /// List pull requests in all states.
  fn list_pulls(
    &self,
    token: &str,
    owner: &str,
    repo: &str,
  ) -> impl Future<Output = Vec<ApiPull>> + Send;

  /// Run an issue/PR search query and return its totals.
  fn search_issues(
    &self,
    token: &str,
    query: &str,
  ) -> impl Future<Output = Result<ApiSearchResults>> + Send;
}

//! Serde types matching the GitHub REST API responses.
//!
//! Only the fields the aggregator interprets are modeled; everything else in
//! the upstream payload is dropped at deserialization. Timestamps stay as
//! ISO-8601 strings because they are only ever compared and bucketed
//! lexically, never used as datetimes.

use serde::{Deserialize, Serialize};

/// One entry from the list-commits endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCommit {
  pub sha: String,
  pub commit: ApiCommitDetail,
  /// GitHub account attributed to the commit, if resolved
  pub author: Option<ApiAccount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCommitDetail {
  pub author: Option<ApiGitAuthor>,
  #[serde(default)]
  pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiGitAuthor {
  pub name: Option<String>,
  pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiAccount {
  pub login: String,
}

impl ApiCommit {
  /// ISO-8601 author date, when the upstream supplied one.
  pub fn author_date(&self) -> Option<&str> {
    self.commit.author.as_ref()?.date.as_deref()
  }
}

/// One entry from the list-issues endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiIssue {
  pub number: u64,
  pub state: String,
}

/// One entry from the list-pulls endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiPull {
  pub number: u64,
  pub state: String,
  pub merged_at: Option<String>,
}

/// Response of the issue/PR search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSearchResults {
  pub total_count: u64,
  #[serde(default)]
  pub items: Vec<ApiSearchItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSearchItem {
  pub number: u64,
  /// Present when the search item is a pull request
  pub pull_request: Option<ApiSearchPullRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSearchPullRef {
  pub merged_at: Option<String>,
}

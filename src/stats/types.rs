//! Aggregate result types returned by the statistics endpoints.
//!
//! Field casing mirrors the wire format the frontend consumes: repository
//! stats are camelCase throughout, member stats are snake_case except for
//! the shared `lastUpdated`/`isCached` pair.

use serde::{Deserialize, Serialize};

/// Repository-level activity summary. Derived per request, never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoStats {
  pub commit_count: usize,
  pub issue_count: usize,
  pub pull_count: usize,
  pub daily_commits: DailyCommits,
  /// Earliest fetch instant among the constituent result sets
  pub last_updated: String,
  /// Whether the weekly-commit entry existed in cache before this call
  pub is_cached: bool,
}

/// 7-day commit histogram in the chart shape the frontend renders directly.
#[derive(Debug, Clone, Serialize)]
pub struct DailyCommits {
  /// Calendar dates, oldest first
  pub labels: Vec<String>,
  pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
  pub label: String,
  pub data: Vec<u32>,
  pub background_color: String,
  pub border_color: String,
}

/// Per-member activity summary for one repository.
#[derive(Debug, Clone, Serialize)]
pub struct MemberStats {
  pub commits: usize,
  pub last_commit: Option<String>,
  pub open_issues: u64,
  pub closed_issues: u64,
  pub open_prs: u64,
  pub closed_prs: u64,
  pub merged_prs: u64,
  #[serde(rename = "lastUpdated")]
  pub last_updated: String,
  #[serde(rename = "isCached")]
  pub is_cached: bool,
}

/// Cached summary of a member's issue search totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueCounts {
  pub open: u64,
  pub closed: u64,
}

/// Cached summary of a member's pull request search totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullCounts {
  pub open: u64,
  pub closed: u64,
  pub merged: u64,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn repo_stats_serialize_camel_case() {
    let stats = RepoStats {
      commit_count: 1,
      issue_count: 2,
      pull_count: 3,
      daily_commits: DailyCommits {
        labels: vec!["2026-08-28".into()],
        datasets: vec![],
      },
      last_updated: "2026-08-28T10:00:00.000Z".into(),
      is_cached: false,
    };

    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["commitCount"], 1);
    assert_eq!(json["dailyCommits"]["labels"][0], "2026-08-28");
    assert_eq!(json["isCached"], false);
  }

  #[test]
  fn member_stats_keep_mixed_casing() {
    let stats = MemberStats {
      commits: 5,
      last_commit: None,
      open_issues: 1,
      closed_issues: 2,
      open_prs: 3,
      closed_prs: 4,
      merged_prs: 2,
      last_updated: "2026-08-28T10:00:00.000Z".into(),
      is_cached: true,
    };

    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["open_issues"], 1);
    assert_eq!(json["merged_prs"], 2);
    assert_eq!(json["lastUpdated"], "2026-08-28T10:00:00.000Z");
    assert_eq!(json["isCached"], true);
    assert!(json["last_commit"].is_null());
  }
}

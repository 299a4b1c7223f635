//! Aggregation of repository and member activity statistics.
//!
//! Each aggregate request fans out into independent cache-or-fetch
//! operations joined with a wait-all barrier. The fetches share no mutable
//! state (each writes a distinct cache key), so no coordination beyond the
//! join is needed. Degradation to partial data happens inside the pager;
//! anything that escapes the join surfaces as one wrapped error.

use chrono::{Duration, NaiveDate, Utc};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;

use crate::cache::{iso_now, CacheStorage, DayCache};
use crate::github::api_types::ApiCommit;
use crate::github::GitHubApi;

use super::keys::{CacheKey, ResourceKind};
use super::types::{DailyCommits, Dataset, IssueCounts, MemberStats, PullCounts, RepoStats};

/// Statistics aggregator over an upstream API and a day-bucketed cache.
pub struct StatsService<A, S: CacheStorage> {
  api: A,
  cache: DayCache<S>,
}

impl<A: GitHubApi, S: CacheStorage> StatsService<A, S> {
  pub fn new(api: A, cache: DayCache<S>) -> Self {
    Self { api, cache }
  }

  /// Repository-level statistics: all-time commit/issue/PR counts plus a
  /// 7-day commit histogram.
  pub async fn repo_stats(&self, owner: &str, repo: &str, token: &str) -> Result<RepoStats> {
    self
      .repo_stats_at(owner, repo, token, Utc::now().date_naive())
      .await
      .wrap_err_with(|| format!("Failed to compute statistics for {}/{}", owner, repo))
  }

  async fn repo_stats_at(
    &self,
    owner: &str,
    repo: &str,
    token: &str,
    today: NaiveDate,
  ) -> Result<RepoStats> {
    let week_start = today - Duration::days(7);
    let since = format!("{}T00:00:00Z", week_start.format("%Y-%m-%d"));

    let commits_key = CacheKey::repo(ResourceKind::Commits, owner, repo).for_day(today);
    let issues_key = CacheKey::repo(ResourceKind::Issues, owner, repo).for_day(today);
    let pulls_key = CacheKey::repo(ResourceKind::Pulls, owner, repo).for_day(today);
    let weekly_key = CacheKey::repo(ResourceKind::WeeklyCommits, owner, repo).for_day(today);

    // The reported flag deliberately reflects only the weekly-commit entry,
    // not all four constituents.
    let is_cached = self.cache.exists(&weekly_key);

    let (commits, issues, pulls, weekly) = tokio::join!(
      self.cache.fetch_with(&commits_key, || async move {
        Ok(self.api.list_commits(token, owner, repo, None, None).await)
      }),
      self.cache.fetch_with(&issues_key, || async move {
        Ok(self.api.list_issues(token, owner, repo).await)
      }),
      self.cache.fetch_with(&pulls_key, || async move {
        Ok(self.api.list_pulls(token, owner, repo).await)
      }),
      self.cache.fetch_with(&weekly_key, || async move {
        Ok(
          self
            .api
            .list_commits(token, owner, repo, None, Some(&since))
            .await,
        )
      }),
    );
    let (commits, issues, pulls, weekly) = (commits?, issues?, pulls?, weekly?);

    let last_updated = oldest_timestamp(&[
      &commits.fetched_at,
      &issues.fetched_at,
      &pulls.fetched_at,
      &weekly.fetched_at,
    ]);

    Ok(RepoStats {
      commit_count: commits.data.len(),
      issue_count: issues.data.len(),
      pull_count: pulls.data.len(),
      daily_commits: daily_histogram(&weekly.data, today),
      last_updated,
      is_cached,
    })
  }

  /// Per-member statistics: commit activity plus issue and PR counts from
  /// the search endpoint.
  pub async fn member_stats(
    &self,
    owner: &str,
    repo: &str,
    username: &str,
    token: &str,
  ) -> Result<MemberStats> {
    self
      .member_stats_at(owner, repo, username, token, Utc::now().date_naive())
      .await
      .wrap_err_with(|| {
        format!("Failed to compute statistics for {} in {}/{}", username, owner, repo)
      })
  }

  async fn member_stats_at(
    &self,
    owner: &str,
    repo: &str,
    username: &str,
    token: &str,
    today: NaiveDate,
  ) -> Result<MemberStats> {
    let commits_key =
      CacheKey::member(ResourceKind::MemberCommits, owner, repo, username).for_day(today);
    let issues_key =
      CacheKey::member(ResourceKind::MemberIssues, owner, repo, username).for_day(today);
    let pulls_key =
      CacheKey::member(ResourceKind::MemberPulls, owner, repo, username).for_day(today);

    let is_cached = self.cache.exists(&commits_key);

    let (commits, issue_counts, pull_counts) = tokio::join!(
      self.cache.fetch_with(&commits_key, || async move {
        Ok(
          self
            .api
            .list_commits(token, owner, repo, Some(username), None)
            .await,
        )
      }),
      self.cache.fetch_with(&issues_key, || async move {
        let open = self
          .api
          .search_issues(token, &search_query(owner, repo, username, "issue", "open"))
          .await?;
        let closed = self
          .api
          .search_issues(token, &search_query(owner, repo, username, "issue", "closed"))
          .await?;
        Ok(IssueCounts {
          open: open.total_count,
          closed: closed.total_count,
        })
      }),
      self.cache.fetch_with(&pulls_key, || async move {
        let open = self
          .api
          .search_issues(token, &search_query(owner, repo, username, "pr", "open"))
          .await?;
        let closed = self
          .api
          .search_issues(token, &search_query(owner, repo, username, "pr", "closed"))
          .await?;
        let merged = closed
          .items
          .iter()
          .filter(|item| {
            item
              .pull_request
              .as_ref()
              .is_some_and(|pr| pr.merged_at.is_some())
          })
          .count() as u64;
        Ok(PullCounts {
          open: open.total_count,
          closed: closed.total_count,
          merged,
        })
      }),
    );
    let (commits, issue_counts, pull_counts) = (commits?, issue_counts?, pull_counts?);

    // Upstream lists commits newest first.
    let last_commit = commits
      .data
      .first()
      .and_then(|c| c.author_date())
      .map(String::from);

    let last_updated = oldest_timestamp(&[
      &commits.fetched_at,
      &issue_counts.fetched_at,
      &pull_counts.fetched_at,
    ]);

    Ok(MemberStats {
      commits: commits.data.len(),
      last_commit,
      open_issues: issue_counts.data.open,
      closed_issues: issue_counts.data.closed,
      open_prs: pull_counts.data.open,
      closed_prs: pull_counts.data.closed,
      merged_prs: pull_counts.data.merged,
      last_updated,
      is_cached,
    })
  }
}

fn search_query(owner: &str, repo: &str, author: &str, item: &str, state: &str) -> String {
  format!("repo:{}/{} author:{} is:{} state:{}", owner, repo, author, item, state)
}

/// Oldest of the constituent fetch instants, so the reported freshness
/// reflects the stalest contributing data.
fn oldest_timestamp(stamps: &[&str]) -> String {
  stamps
    .iter()
    .min()
    .map(|s| s.to_string())
    .unwrap_or_else(iso_now)
}

/// Bucket the weekly commits into the 7 calendar dates ending at `today`,
/// oldest first. Commits dated outside the seeded window (clock skew, stray
/// filter results) are dropped rather than clipped to an edge bucket.
fn daily_histogram(commits: &[ApiCommit], today: NaiveDate) -> DailyCommits {
  let labels: Vec<String> = (0..7)
    .rev()
    .map(|i| (today - Duration::days(i)).format("%Y-%m-%d").to_string())
    .collect();

  let mut data = vec![0u32; 7];
  for commit in commits {
    let Some(date) = commit.author_date() else {
      continue;
    };
    let day = date.get(..10).unwrap_or(date);
    if let Some(slot) = labels.iter().position(|label| label == day) {
      data[slot] += 1;
    }
  }

  DailyCommits {
    labels,
    datasets: vec![Dataset {
      label: "Commits".to_string(),
      data,
      background_color: "rgba(54, 162, 235, 0.5)".to_string(),
      border_color: "rgba(54, 162, 235, 1)".to_string(),
    }],
  }
}

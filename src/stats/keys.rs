//! Cache key construction for statistics result sets.

use chrono::NaiveDate;

/// Resource kinds a statistics fetch can cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
  Commits,
  Issues,
  Pulls,
  WeeklyCommits,
  MemberCommits,
  MemberIssues,
  MemberPulls,
}

impl ResourceKind {
  fn as_str(self) -> &'static str {
    match self {
      Self::Commits => "commits",
      Self::Issues => "issues",
      Self::Pulls => "pulls",
      Self::WeeklyCommits => "weekly_commits",
      Self::MemberCommits => "member_commits",
      Self::MemberIssues => "member_issues",
      Self::MemberPulls => "member_prs",
    }
  }
}

/// Composite cache key scoping a result set to a resource, a repository,
/// an optional member, and one UTC calendar day.
#[derive(Debug, Clone)]
pub struct CacheKey {
  kind: ResourceKind,
  owner: String,
  repo: String,
  actor: Option<String>,
}

impl CacheKey {
  pub fn repo(kind: ResourceKind, owner: &str, repo: &str) -> Self {
    Self {
      kind,
      owner: owner.to_string(),
      repo: repo.to_string(),
      actor: None,
    }
  }

  pub fn member(kind: ResourceKind, owner: &str, repo: &str, actor: &str) -> Self {
    Self {
      kind,
      owner: owner.to_string(),
      repo: repo.to_string(),
      actor: Some(actor.to_string()),
    }
  }

  /// Render the key pinned to `day`. The day component is independent of
  /// the storage TTL; a new calendar day always produces a fresh key.
  pub fn for_day(&self, day: NaiveDate) -> String {
    match &self.actor {
      Some(actor) => format!(
        "{}:{}:{}:{}:{}",
        self.kind.as_str(),
        self.owner,
        self.repo,
        actor,
        day.format("%Y-%m-%d")
      ),
      None => format!(
        "{}:{}:{}:{}",
        self.kind.as_str(),
        self.owner,
        self.repo,
        day.format("%Y-%m-%d")
      ),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 28).unwrap()
  }

  #[test]
  fn repo_key_layout() {
    let key = CacheKey::repo(ResourceKind::Commits, "octo", "demo");
    assert_eq!(key.for_day(day()), "commits:octo:demo:2026-08-28");
  }

  #[test]
  fn member_key_includes_actor() {
    let key = CacheKey::member(ResourceKind::MemberCommits, "octo", "demo", "alice");
    assert_eq!(key.for_day(day()), "member_commits:octo:demo:alice:2026-08-28");
  }

  #[test]
  fn day_component_changes_the_key() {
    let key = CacheKey::repo(ResourceKind::WeeklyCommits, "octo", "demo");
    let next = day().succ_opt().unwrap();
    assert_ne!(key.for_day(day()), key.for_day(next));
  }
}

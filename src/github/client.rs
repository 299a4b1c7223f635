//! reqwest-based client for the GitHub REST API.

use color_eyre::{eyre::eyre, Result};
use reqwest::header;
use serde::de::DeserializeOwned;

use crate::config::GithubConfig;

use super::api_types::{ApiCommit, ApiIssue, ApiPull, ApiSearchResults};
use super::pager::{fetch_all_pages, PAGE_SIZE};
use super::GitHubApi;

const USER_AGENT: &str = concat!("repostats/", env!("CARGO_PKG_VERSION"));

/// GitHub API client. Holds no token of its own; callers pass the bearer
/// token of the requesting user on every call.
#[derive(Clone)]
pub struct GitHubClient {
  http: reqwest::Client,
  base_url: String,
}

impl GitHubClient {
  pub fn new(config: &GithubConfig) -> Result<Self> {
    let http = reqwest::Client::builder()
      .user_agent(USER_AGENT)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url: config.api_url.trim_end_matches('/').to_string(),
    })
  }

  async fn get_json<T: DeserializeOwned>(
    &self,
    token: &str,
    path: &str,
    query: &[(&str, String)],
  ) -> Result<T> {
    let url = format!("{}{}", self.base_url, path);

    let response = self
      .http
      .get(&url)
      .bearer_auth(token)
      .header(header::ACCEPT, "application/vnd.github+json")
      .query(query)
      .send()
      .await
      .map_err(|e| eyre!("Request to {} failed: {}", path, e))?
      .error_for_status()
      .map_err(|e| eyre!("Request to {} failed: {}", path, e))?;

    response
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse response from {}: {}", path, e))
  }
}

impl GitHubApi for GitHubClient {
  async fn list_commits(
    &self,
    token: &str,
    owner: &str,
    repo: &str,
    author: Option<&str>,
    since: Option<&str>,
  ) -> Vec<ApiCommit> {
    let path = format!("/repos/{}/{}/commits", owner, repo);
    let path = path.as_str();

    fetch_all_pages("commits", |page| {
      let mut query = vec![
        ("per_page", PAGE_SIZE.to_string()),
        ("page", page.to_string()),
      ];
      if let Some(author) = author {
        query.push(("author", author.to_string()));
      }
      if let Some(since) = since {
        query.push(("since", since.to_string()));
      }

      async move { self.get_json(token, path, &query).await }
    })
    .await
  }

  async fn list_issues(&self, token: &str, owner: &str, repo: &str) -> Vec<ApiIssue> {
    let path = format!("/repos/{}/{}/issues", owner, repo);
    let path = path.as_str();

    fetch_all_pages("issues", |page| {
      let query = vec![
        ("state", "all".to_string()),
        ("per_page", PAGE_SIZE.to_string()),
        ("page", page.to_string()),
      ];

      async move { self.get_json(token, path, &query).await }
    })
    .await
  }

  async fn list_pulls(&self, token: &str, owner: &str, repo: &str) -> Vec<ApiPull> {
    let path = format!("/repos/{}/{}/pulls", owner, repo);
    let path = path.as_str();

    fetch_all_pages("pulls", |page| {
      let query = vec![
        ("state", "all".to_string()),
        ("per_page", PAGE_SIZE.to_string()),
        ("page", page.to_string()),
      ];

      async move { self.get_json(token, path, &query).await }
    })
    .await
  }

  async fn search_issues(&self, token: &str, query: &str) -> Result<ApiSearchResults> {
    let params = vec![
      ("q", query.to_string()),
      ("per_page", PAGE_SIZE.to_string()),
    ];

    self.get_json(token, "/search/issues", &params).await
  }
}

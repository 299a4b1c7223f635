use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
  pub server: ServerConfig,
  pub github: GithubConfig,
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  /// Address the HTTP server binds to
  pub bind: String,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      bind: "0.0.0.0:8080".to_string(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
  /// Base URL of the GitHub-compatible REST API
  pub api_url: String,
}

impl Default for GithubConfig {
  fn default() -> Self {
    Self {
      api_url: "https://api.github.com".to_string(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// Cache database path (default: platform data dir)
  pub path: Option<PathBuf>,
  /// Entry time-to-live, independent of the day-bucketed keys
  pub ttl_secs: u64,
  /// Prefix for every cache key
  pub namespace: String,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      path: None,
      ttl_secs: 3600,
      namespace: "github".to_string(),
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./repostats.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/repostats/config.yaml
  ///
  /// With no file anywhere, the defaults apply; a statistics server should
  /// boot unconfigured.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("repostats.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("repostats").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_are_complete() {
    let config = Config::default();
    assert_eq!(config.server.bind, "0.0.0.0:8080");
    assert_eq!(config.github.api_url, "https://api.github.com");
    assert_eq!(config.cache.ttl_secs, 3600);
    assert_eq!(config.cache.namespace, "github");
    assert!(config.cache.path.is_none());
  }

  #[test]
  fn partial_yaml_keeps_other_defaults() {
    let config: Config = serde_yaml::from_str(
      "github:\n  api_url: https://ghe.example.com/api/v3\ncache:\n  ttl_secs: 600\n",
    )
    .unwrap();

    assert_eq!(config.github.api_url, "https://ghe.example.com/api/v3");
    assert_eq!(config.cache.ttl_secs, 600);
    assert_eq!(config.server.bind, "0.0.0.0:8080");
  }
}

use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::{Credential, TenantId};

const TOKEN_VARS: [&str; 2] = ["SCHOOLDASH_TOKEN", "SCHOOLDASH_API_TOKEN"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub server: ServerConfig,
  /// School whose data this profile shows
  pub tenant: String,
  /// Custom title for header (defaults to the organization name)
  pub title: Option<String>,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub url: String,
  #[serde(default = "default_request_timeout")]
  pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
  30
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Persist the bootstrap snapshot between runs
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Database location (defaults to $XDG_DATA_HOME/schooldash/cache.db)
  pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      path: None,
    }
  }
}

fn default_true() -> bool {
  true
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./schooldash.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/schooldash/config.yaml
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
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/schooldash/config.yaml\n\
                 See config.example.yaml for the format."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("schooldash.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("schooldash").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    if TenantId::new(&config.tenant).as_str().is_empty() {
      return Err(eyre!("tenant must not be empty"));
    }
    Ok(config)
  }

  pub fn tenant_id(&self) -> TenantId {
    TenantId::new(&self.tenant)
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.server.request_timeout_secs)
  }

  /// Get the API credential from environment variables.
  ///
  /// Checks SCHOOLDASH_TOKEN first, then SCHOOLDASH_API_TOKEN as fallback.
  /// No credential means the dashboard runs in local mode.
  pub fn get_credential() -> Option<Credential> {
    credential_from(|name| std::env::var(name).ok())
  }
}

fn credential_from(lookup: impl Fn(&str) -> Option<String>) -> Option<Credential> {
  TOKEN_VARS
    .iter()
    .find_map(|&name| lookup(name).and_then(Credential::new))
}

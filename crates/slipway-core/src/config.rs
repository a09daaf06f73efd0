//! Configuration management for slipway.
//!
//! Configuration is loaded once at startup (from `$SLIPWAY_DIR/config.toml`,
//! defaulting to `~/.slipway/config.toml`) and passed into the orchestrators
//! explicitly. Orchestrators never read environment state themselves.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Filesystem paths
    #[serde(default)]
    pub paths: PathsConfig,

    /// Cluster behavior
    #[serde(default)]
    pub cluster: ClusterConfig,

    /// Repository host integration
    #[serde(default)]
    pub repo_host: RepoHostConfig,

    /// Readiness polling policy
    #[serde(default)]
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Base directory for slipway data
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory generated projects are written to
    #[serde(default = "default_projects_dir")]
    pub projects_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Namespace used when a project record carries none
    #[serde(default = "default_namespace")]
    pub default_namespace: String,

    /// Whether provisioning may create the target namespace if it is absent.
    /// When the service account lacks namespace-create rights this should be
    /// false; provisioning then logs and continues.
    #[serde(default = "default_true")]
    pub create_namespace: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoHostConfig {
    /// Whether the repository host integration is active. When disabled, the
    /// conflict guard skips the remote check and teardown skips the hosted
    /// repository.
    #[serde(default)]
    pub enabled: bool,

    /// API base URL of the host
    #[serde(default = "default_repo_api_url")]
    pub api_url: String,

    /// Account or organization repositories are created under
    #[serde(default)]
    pub owner: String,

    /// Access token; read from the config file, never from process env at
    /// call time
    pub token: Option<String>,
}

/// Bounded readiness polling: a fixed number of attempts at a fixed
/// interval, plus one settle delay after a workload first reports running.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,
}

impl RetryPolicy {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SLIPWAY_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".slipway")
    }
}

fn default_projects_dir() -> PathBuf {
    default_data_dir().join("projects")
}

fn default_namespace() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

fn default_repo_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_max_attempts() -> u32 {
    60
}

fn default_interval_secs() -> u64 {
    5
}

fn default_settle_secs() -> u64 {
    10
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            projects_dir: default_projects_dir(),
        }
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            default_namespace: default_namespace(),
            create_namespace: default_true(),
        }
    }
}

impl Default for RepoHostConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: default_repo_api_url(),
            owner: String::new(),
            token: None,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_secs: default_interval_secs(),
            settle_secs: default_settle_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            cluster: ClusterConfig::default(),
            repo_host: RepoHostConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        Ok(config)
    }

    /// Get the config file path.
    pub fn config_path() -> PathBuf {
        default_data_dir().join("config.toml")
    }

    /// Ensure the data and projects directories exist.
    pub fn ensure_dirs(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.paths.data_dir)?;
        std::fs::create_dir_all(&self.paths.projects_dir)?;
        Ok(())
    }
}

//! Configuration file support.
//!
//! Configuration is read from TOML:
//!
//! ```toml
//! [workflow]
//! base_delay_ms = 800
//! jitter_ms = 600
//! seed = 42
//!
//! [auth]
//! username = "corporate"
//! password = "patria789"
//! ```
//!
//! Every key is optional. `SDI_USERNAME` and `SDI_PASSWORD` override the
//! `[auth]` section.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::workflow::{HoldRange, StagePlan, DEFAULT_BASE_DELAY_MS, DEFAULT_JITTER_MS};

/// Name of the per-workspace state directory.
pub const STATE_DIR: &str = ".sdi";

/// Name of the config file inside the state directory.
pub const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_USERNAME: &str = "corporate";
pub const DEFAULT_PASSWORD: &str = "patria789";

/// `[workflow]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub base_delay_ms: u64,
    pub jitter_ms: u64,
    pub seed: Option<u64>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            jitter_ms: DEFAULT_JITTER_MS,
            seed: None,
        }
    }
}

impl WorkflowConfig {
    pub fn hold(&self) -> HoldRange {
        HoldRange::new(self.base_delay_ms, self.jitter_ms)
    }

    pub fn plan(&self) -> CoreResult<StagePlan> {
        StagePlan::builder().default_hold(self.hold()).build()
    }
}

/// `[auth]` section: the single accepted credential pair.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdiConfig {
    pub workflow: WorkflowConfig,
    pub auth: AuthConfig,
}

impl SdiConfig {
    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> CoreResult<Self> {
        toml::from_str(content).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Load from a file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Default config location for a workspace.
    pub fn default_path(workspace: &Path) -> PathBuf {
        workspace.join(STATE_DIR).join(CONFIG_FILE)
    }

    /// Load `explicit` if given, else the workspace config if it exists,
    /// else defaults; then apply environment overrides.
    pub fn resolve(explicit: Option<&Path>, workspace: &Path) -> CoreResult<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => {
                let path = Self::default_path(workspace);
                if path.exists() {
                    Self::load(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply `SDI_USERNAME` / `SDI_PASSWORD` from `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(username) = lookup("SDI_USERNAME") {
            self.auth.username = username;
        }
        if let Some(password) = lookup("SDI_PASSWORD") {
            self.auth.password = password;
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.auth.username.is_empty() {
            return Err(CoreError::Config("auth.username must not be empty".to_string()));
        }
        self.workflow.plan().map(|_| ())
    }

    pub fn to_toml(&self) -> CoreResult<String> {
        toml::to_string_pretty(self).map_err(|e| CoreError::Serialization(e.to_string()))
    }
}

//! CLI configuration: an optional TOML file overridden by flags and environment.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use dispatch::BranchPagination;
use github::{GithubConfig, DEFAULT_API_URL};
use serde::Deserialize;

/// Config file read when `--config` is not given. Its absence is not an error.
pub const DEFAULT_CONFIG_FILE: &str = "ghdispatch.toml";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub repository: RepositorySection,
    pub github: GithubSection,
    pub branches: BranchSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepositorySection {
    pub owner: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GithubSection {
    pub token: Option<String>,
    pub api_url: String,
    pub timeout_secs: u64,
}

impl Default for GithubSection {
    fn default() -> Self {
        Self {
            token: None,
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BranchSection {
    pub page_size: u32,
    pub max_pages: u32,
}

impl Default for BranchSection {
    fn default() -> Self {
        let pagination = BranchPagination::default();
        Self {
            page_size: pagination.per_page(),
            max_pages: pagination.max_pages(),
        }
    }
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub token: Option<String>,
    pub api_url: Option<String>,
}

impl AppConfig {
    /// Reads `path`. A missing file yields the defaults unless `required` is set.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        if !path.exists() {
            if required {
                bail!("config file {} does not exist", path.display());
            }
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(owner) = overrides.owner {
            self.repository.owner = Some(owner);
        }
        if let Some(repo) = overrides.repo {
            self.repository.name = Some(repo);
        }
        if let Some(token) = overrides.token {
            self.github.token = Some(token);
        }
        if let Some(api_url) = overrides.api_url {
            self.github.api_url = api_url;
        }
    }

    /// Builds the client configuration; owner and repository are mandatory.
    pub fn github_config(&self) -> Result<GithubConfig> {
        let owner = self
            .repository
            .owner
            .clone()
            .context("repository owner is not configured (use --owner or [repository] owner)")?;
        let name = self
            .repository
            .name
            .clone()
            .context("repository name is not configured (use --repo or [repository] name)")?;

        let mut config = GithubConfig::new(owner, name).with_api_url(self.github.api_url.clone());
        if let Some(token) = &self.github.token {
            config = config.with_token(token.clone());
        }
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.github.timeout_secs.max(1))
    }

    pub fn pagination(&self) -> BranchPagination {
        BranchPagination::new(self.branches.page_size, self.branches.max_pages)
    }
}

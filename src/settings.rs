//! Runtime configuration.
//!
//! Values come from an optional TOML file in the platform config directory,
//! with command-line arguments layered on top. Nothing here is global: the
//! resolved [`Settings`] value is passed explicitly into the report driver.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use etcetera::{BaseStrategy, choose_base_strategy};
use serde::Deserialize;

use crate::git::DEFAULT_COMMAND_TIMEOUT;

/// What to do with a repository whose `git fetch` fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FetchFailure {
    /// Warn and classify divergence against possibly-stale tracking refs.
    #[default]
    Stale,
    /// Warn and skip the divergence section for that repository.
    Skip,
}

/// On-disk configuration (`config.toml` under the platform config dir).
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConfigFile {
    /// Default scan root, tilde-expandable (e.g. `~/src`).
    pub root: Option<String>,
    pub fetch_failure: Option<FetchFailure>,
    pub timeout_secs: Option<u64>,
}

impl ConfigFile {
    /// Load from the platform config directory. A missing file is not an
    /// error; a malformed one is.
    pub fn load() -> anyhow::Result<Self> {
        let Ok(strategy) = choose_base_strategy() else {
            return Ok(Self::default());
        };
        let path = strategy.config_dir().join("git-drift").join("config.toml");
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text)
                .with_context(|| format!("invalid config at {}", path.display())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => {
                Err(anyhow::Error::new(err)
                    .context(format!("could not read config at {}", path.display())))
            }
        }
    }
}

/// Fully-resolved settings threaded through the scan.
#[derive(Debug)]
pub struct Settings {
    /// Absolute, symlink-resolved scan root.
    pub root: PathBuf,
    /// Whether to refresh remotes before computing divergence.
    pub fetch: bool,
    pub fetch_failure: FetchFailure,
    /// Time limit for a single git invocation.
    pub timeout: Duration,
}

impl Settings {
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            fetch: true,
            fetch_failure: FetchFailure::default(),
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }
}

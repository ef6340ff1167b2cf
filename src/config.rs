//! User configuration
//!
//! Stored in ~/.config/twinpane/config.json. Every field is optional in the
//! file; missing ones take their defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::nav::{NavPath, RetrySchedule, ScheduleError, reconciler::DEFAULT_SCHEDULE_MS};
use crate::source::{FsTreeOptions, ListingFilter, fs_tree::DEFAULT_AUDIO_EXTENSIONS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Restoration checkpoints in milliseconds after the restore request
    pub restore_schedule_ms: Vec<u64>,
    /// Rows a panel shows at once
    pub viewport_rows: u32,
    /// File extensions listed in panels
    pub audio_extensions: Vec<String>,
    pub show_hidden: bool,
    /// Directories enumerated concurrently per panel
    pub listing_parallelism: usize,
    /// Where live panels are rooted; the platform root when unset
    pub tree_root: Option<NavPath>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            restore_schedule_ms: DEFAULT_SCHEDULE_MS.to_vec(),
            viewport_rows: 30,
            audio_extensions: DEFAULT_AUDIO_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            show_hidden: false,
            listing_parallelism: 4,
            tree_root: None,
        }
    }
}

impl Config {
    /// Load from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config {:?}", path))?;

        config
            .validate()
            .with_context(|| format!("Invalid config {:?}", path))?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let contents =
            serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("twinpane").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        self.restore_schedule()?;
        if self.viewport_rows == 0 {
            anyhow::bail!("viewport_rows must be at least 1");
        }
        if self.listing_parallelism == 0 {
            anyhow::bail!("listing_parallelism must be at least 1");
        }
        Ok(())
    }

    pub fn restore_schedule(&self) -> Result<RetrySchedule, ScheduleError> {
        RetrySchedule::from_millis(&self.restore_schedule_ms)
    }

    pub fn tree_root(&self) -> NavPath {
        self.tree_root
            .clone()
            .unwrap_or_else(NavPath::platform_default)
    }

    /// Root for a panel that should show `target`
    ///
    /// The configured root, unless `target` lies outside it (another drive,
    /// say); then the top of `target`'s own filesystem.
    pub fn tree_root_for(&self, target: Option<&NavPath>) -> NavPath {
        let configured = self.tree_root();
        match target {
            Some(target) if !target.starts_with(&configured) => {
                NavPath::root(target.root_kind())
            }
            _ => configured,
        }
    }

    pub fn fs_tree_options(&self) -> FsTreeOptions {
        FsTreeOptions {
            filter: ListingFilter::new(&self.audio_extensions, self.show_hidden),
            viewport_rows: self.viewport_rows,
            listing_parallelism: self.listing_parallelism,
        }
    }
}

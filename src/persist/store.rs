//! JSON-backed panel state store
//!
//! Stores both panels' navigation state in ~/.config/twinpane/state.json,
//! one entry per panel key:
//!
//! ```json
//! { "version": 1, "panels": { "left": { "selected_path": "/music", "scroll_offset": 12 } } }
//! ```
//!
//! Entries are parsed per panel on load. A bad entry reads as "nothing
//! saved" for that panel only, and the next save replaces it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{PanelSide, PersistenceAdapter};
use crate::nav::NavigationState;

const STATE_VERSION: u32 = 1;

/// On-disk document
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StateDocument {
    /// Format version
    #[serde(default = "default_version")]
    version: u32,
    /// Saved states indexed by panel key, kept raw until loaded
    #[serde(default)]
    panels: BTreeMap<String, serde_json::Value>,
}

fn default_version() -> u32 {
    STATE_VERSION
}

impl Default for StateDocument {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            panels: BTreeMap::new(),
        }
    }
}

/// Panel state store writing through to a JSON file
#[derive(Debug)]
pub struct JsonStateStore {
    path: PathBuf,
    document: StateDocument,
}

impl JsonStateStore {
    /// Open the store at the default location
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            debug!("No panel state at {}, starting empty", path.display());
            return Ok(Self {
                path,
                document: StateDocument::default(),
            });
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read panel state from {:?}", path))?;

        let document = match serde_json::from_str::<StateDocument>(&contents) {
            Ok(document) => document,
            Err(e) => {
                warn!(
                    "Ignoring unreadable panel state {}: {}",
                    path.display(),
                    e
                );
                StateDocument::default()
            }
        };

        debug!(
            "Loaded {} panel state(s) from {}",
            document.panels.len(),
            path.display()
        );
        Ok(Self { path, document })
    }

    /// Default state file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("twinpane").join("state.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create state directory {:?}", parent))?;
        }

        let contents = serde_json::to_string_pretty(&self.document)
            .context("Failed to serialize panel state")?;

        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write panel state to {:?}", self.path))?;

        debug!("Saved panel state to {}", self.path.display());
        Ok(())
    }
}

impl PersistenceAdapter for JsonStateStore {
    fn save(&mut self, side: PanelSide, state: &NavigationState) -> Result<()> {
        let value = serde_json::to_value(state).context("Failed to serialize panel state")?;
        self.document.panels.insert(side.key().to_string(), value);
        self.write()
    }

    fn load(&self, side: PanelSide) -> Result<Option<NavigationState>> {
        let Some(value) = self.document.panels.get(side.key()) else {
            return Ok(None);
        };
        match NavigationState::deserialize(value) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                warn!("Ignoring saved {} panel state: {}", side, e);
                Ok(None)
            }
        }
    }
}

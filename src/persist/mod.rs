//! Panel state persistence

pub mod store;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::nav::NavigationState;

pub use store::JsonStateStore;

/// Which of the two panels
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PanelSide {
    Left,
    Right,
}

impl PanelSide {
    pub const BOTH: [PanelSide; 2] = [PanelSide::Left, PanelSide::Right];

    /// Persistence key
    pub fn key(self) -> &'static str {
        match self {
            PanelSide::Left => "left",
            PanelSide::Right => "right",
        }
    }
}

impl fmt::Display for PanelSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Durable key/value store holding one [`NavigationState`] per panel
pub trait PersistenceAdapter {
    fn save(&mut self, side: PanelSide, state: &NavigationState) -> Result<()>;

    /// Saved state for `side`, `None` if nothing was ever saved
    fn load(&self, side: PanelSide) -> Result<Option<NavigationState>>;
}

/// Non-durable store, for tests and embedding
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    states: HashMap<PanelSide, NavigationState>,
}

impl PersistenceAdapter for MemoryStore {
    fn save(&mut self, side: PanelSide, state: &NavigationState) -> Result<()> {
        self.states.insert(side, state.clone());
        Ok(())
    }

    fn load(&self, side: PanelSide) -> Result<Option<NavigationState>> {
        Ok(self.states.get(&side).cloned())
    }
}

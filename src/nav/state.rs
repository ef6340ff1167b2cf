//! Per-panel navigation state

use serde::{Deserialize, Serialize};

use super::path::NavPath;

/// Where a panel was: the selected entry and the vertical scroll offset
///
/// These two fields are exactly what gets persisted for a panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    pub selected_path: NavPath,
    pub scroll_offset: u32,
}

impl NavigationState {
    pub fn new(selected_path: NavPath, scroll_offset: u32) -> Self {
        Self {
            selected_path,
            scroll_offset,
        }
    }
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new(NavPath::platform_default(), 0)
    }
}

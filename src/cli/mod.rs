//! CLI module for twinpane

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use twinpane::persist::PanelSide;

pub mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "twinpane",
    about = "Breadcrumb navigation and restorable state for a two-panel file browser"
)]
#[command(version, author)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: <config dir>/twinpane/config.json)
    #[arg(long, global = true, env = "TWINPANE_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Panel state file (default: <config dir>/twinpane/state.json)
    #[arg(long, global = true, env = "TWINPANE_STATE", value_name = "FILE")]
    pub state: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split a path into breadcrumb segments
    Breadcrumbs {
        /// Absolute path, e.g. /music/Album or D:\Toshiba\Música
        #[arg(value_name = "PATH")]
        path: String,

        /// Print the segments as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a panel's saved navigation state
    Save {
        #[arg(value_enum)]
        side: PanelSide,

        #[arg(value_name = "PATH")]
        path: String,

        /// Scroll offset in rows
        #[arg(short, long, default_value = "0")]
        scroll: u32,
    },

    /// Show the saved state of both panels
    Status,

    /// Restore saved state into live panels and report the outcome
    Restore {
        /// Only this panel (both if omitted)
        #[arg(long, value_enum)]
        side: Option<PanelSide>,
    },

    /// Select a path in a panel, then move around by breadcrumbs
    Navigate {
        #[arg(value_enum)]
        side: PanelSide,

        /// Path to select first (the saved selection if omitted)
        #[arg(value_name = "PATH", conflicts_with = "root")]
        path: Option<String>,

        /// Start by picking a drive or mount point
        #[arg(long)]
        root: bool,
    },

    /// List drives or mount points a panel can be rooted at
    Roots,

    /// Write a config file with the default settings
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

//! CLI command handlers

use anyhow::{Context, Result};
use clap_complete::generate;
use colored::Colorize;
use dialoguer::Select;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use twinpane::config::Config;
use twinpane::nav::{
    segment_str, BreadcrumbSegment, NavPath, NavigationState, Outcome, Panel, Workspace,
};
use twinpane::persist::{JsonStateStore, PanelSide, PersistenceAdapter};
use twinpane::source::{list_roots, FsTree, TreeSource};

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn open_store(path: Option<PathBuf>) -> Result<JsonStateStore> {
    match path {
        Some(path) => JsonStateStore::open(path),
        None => JsonStateStore::open_default(),
    }
}

/// Panel over the live filesystem, rooted so that `target` is reachable
fn live_panel(side: PanelSide, config: &Config, target: Option<&NavPath>) -> Result<Panel<FsTree>> {
    let schedule = config
        .restore_schedule()
        .context("Invalid restore_schedule_ms")?;
    let tree = FsTree::new(config.tree_root_for(target), config.fs_tree_options());
    Ok(Panel::new(side, tree, schedule))
}

fn describe(state: &NavigationState) -> String {
    format!(
        "{} {}",
        state.selected_path.to_string().bold(),
        format!("(scroll {})", state.scroll_offset).dimmed()
    )
}

fn report_outcome(side: PanelSide, outcome: Option<&Outcome>) {
    let label = format!("{:>5}:", side.key());
    match outcome {
        Some(Outcome::Committed {
            path,
            offset,
            clamped,
        }) => {
            let note = if *clamped { " (clamped)" } else { "" };
            println!(
                "  {} {} {} at offset {}{}",
                label.bold(),
                "restored".green(),
                path,
                offset,
                note.yellow()
            );
        }
        Some(Outcome::Exhausted { path, attempts }) => {
            println!(
                "  {} {} {} after {} attempt(s), showing the default view",
                label.bold(),
                "not found".yellow(),
                path,
                attempts
            );
        }
        Some(Outcome::Cancelled { path }) => {
            println!("  {} {} {}", label.bold(), "cancelled".yellow(), path);
        }
        None => {
            println!("  {} {}", label.bold(), "nothing saved".dimmed());
        }
    }
}

/// Handle the `breadcrumbs` command
pub fn breadcrumbs(path: &str, json: bool) -> Result<()> {
    let segments = segment_str(path)?;

    if json {
        let out =
            serde_json::to_string_pretty(&segments).context("Failed to serialize breadcrumbs")?;
        println!("{}", out);
        return Ok(());
    }

    for segment in &segments {
        println!(
            "  {} {:<24} {}",
            format!("{:>2}", segment.ordinal).dimmed(),
            segment.label.cyan(),
            segment.tooltip()
        );
    }
    Ok(())
}

/// Handle the `save` command
pub fn save(state_path: Option<PathBuf>, side: PanelSide, path: &str, scroll: u32) -> Result<()> {
    let path = NavPath::parse(path)?;
    let mut store = open_store(state_path)?;
    let state = NavigationState::new(path, scroll);
    store.save(side, &state)?;

    println!(
        "{} {} panel: {}",
        "Saved".green().bold(),
        side,
        describe(&state)
    );
    println!("  State file: {}", store.path().display());
    Ok(())
}

/// Handle the `status` command
pub fn status(state_path: Option<PathBuf>) -> Result<()> {
    let store = open_store(state_path)?;
    println!(
        "{} {}",
        "Panel state".green().bold(),
        store.path().display().to_string().dimmed()
    );

    for side in PanelSide::BOTH {
        let label = format!("{:>5}:", side.key());
        match store.load(side)? {
            Some(state) => println!("  {} {}", label.bold(), describe(&state)),
            None => println!("  {} {}", label.bold(), "nothing saved".dimmed()),
        }
    }
    Ok(())
}

/// Handle the `restore` command
///
/// Reports what a restore would land on without writing the state back.
pub async fn restore(
    config_path: Option<PathBuf>,
    state_path: Option<PathBuf>,
    side: Option<PanelSide>,
) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let store = open_store(state_path)?;
    let sides: Vec<PanelSide> = side.map_or_else(|| PanelSide::BOTH.to_vec(), |s| vec![s]);

    let left_target = store.load(PanelSide::Left)?.map(|s| s.selected_path);
    let right_target = store.load(PanelSide::Right)?.map(|s| s.selected_path);
    let left = live_panel(PanelSide::Left, &config, left_target.as_ref())?;
    let right = live_panel(PanelSide::Right, &config, right_target.as_ref())?;

    println!(
        "{} {} | {}",
        "Restoring panels under".cyan(),
        left.source().root_path(),
        right.source().root_path()
    );

    let mut workspace = Workspace::new(left, right, store);
    workspace.restore_saved_sides(&sides)?;
    workspace.settle().await;

    for side in sides {
        report_outcome(side, workspace.panel(side).reconciler().last_outcome());
    }
    Ok(())
}

/// Let the user pick one of this machine's roots
async fn pick_root() -> Result<Option<NavPath>> {
    let roots = list_roots().await;
    if roots.is_empty() {
        println!("{}", "No drives or mount points found.".yellow());
        return Ok(None);
    }

    let items: Vec<String> = roots.iter().map(|r| r.to_string()).collect();
    let choice = Select::new()
        .with_prompt("Root")
        .items(&items)
        .default(0)
        .interact_opt()
        .context("Failed to read selection")?;
    Ok(choice.map(|i| roots[i].clone()))
}

enum Action {
    Breadcrumb(usize),
    SwitchRoot,
    Reload,
    SaveAndQuit,
}

fn pick_action(segments: &[BreadcrumbSegment]) -> Result<Option<Action>> {
    let mut items: Vec<String> = segments
        .iter()
        .map(|s| format!("{:<24} {}", s.label, s.tooltip()))
        .collect();
    items.push("[switch root]".to_string());
    items.push("[reload listings]".to_string());
    items.push("[save and quit]".to_string());

    let default = segments.len().saturating_sub(1);
    let choice = Select::new()
        .with_prompt("Breadcrumb")
        .items(&items)
        .default(default)
        .interact_opt()
        .context("Failed to read selection")?;

    Ok(choice.map(|i| match i.checked_sub(segments.len()) {
        None => Action::Breadcrumb(i),
        Some(0) => Action::SwitchRoot,
        Some(1) => Action::Reload,
        Some(_) => Action::SaveAndQuit,
    }))
}

/// Handle the `navigate` command
pub async fn navigate(
    config_path: Option<PathBuf>,
    state_path: Option<PathBuf>,
    side: PanelSide,
    path: Option<String>,
    pick: bool,
) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let mut store = open_store(state_path)?;

    let explicit = match path {
        Some(path) => Some(NavPath::parse(&path)?),
        None if pick => {
            let Some(root) = pick_root().await? else {
                return Ok(());
            };
            Some(root)
        }
        None => None,
    };

    match explicit {
        Some(path) => {
            let mut panel = live_panel(side, &config, Some(&path))?;
            // A path the user typed or picked is a manual selection
            if let Err(e) = panel.select_eventually(&path).await {
                println!("{} {}", "Could not select:".yellow(), e);
            }
            browse(panel, &mut store).await
        }
        None => {
            let saved = store.load(side)?.unwrap_or_default();
            debug!("Restoring {} panel to {}", side, saved.selected_path);
            let mut panel = live_panel(side, &config, Some(&saved.selected_path))?;
            // Listings arrive in the background; the reconciler waits for them
            panel.restore_state(saved, tokio::time::Instant::now());
            panel.settle().await;
            report_outcome(side, panel.reconciler().last_outcome());
            browse(panel, &mut store).await
        }
    }
}

/// Breadcrumb menu loop; saves the panel on the way out
async fn browse(mut panel: Panel<FsTree>, store: &mut JsonStateStore) -> Result<()> {
    loop {
        println!("  {}", describe(&panel.capture_state()));
        let segments = panel.breadcrumbs();

        let Some(action) = pick_action(&segments)? else {
            println!("{}", "Cancelled, nothing saved.".yellow());
            return Ok(());
        };

        match action {
            Action::Breadcrumb(i) => {
                if let Err(e) = panel.on_breadcrumb_click(&segments[i]) {
                    // Selection stays where it was
                    println!("{} {}", "Could not navigate:".yellow(), e);
                }
            }
            Action::SwitchRoot => {
                if let Some(root) = pick_root().await?
                    && let Err(e) = panel.select_eventually(&root).await
                {
                    println!("{} {}", "Could not switch root:".yellow(), e);
                }
            }
            Action::Reload => {
                let tree = panel.source();
                let at = tree
                    .current()
                    .map(|node| tree.path_of(&node))
                    .unwrap_or_else(|| tree.root_path().clone());
                panel.source_mut().refresh();
                if let Err(e) = panel.select_eventually(&at).await {
                    println!("{} {}", "Selection is gone after reload:".yellow(), e);
                }
            }
            Action::SaveAndQuit => break,
        }
    }

    panel.save_to(store)?;
    println!(
        "{} {} panel: {}",
        "Saved".green().bold(),
        panel.side(),
        describe(&panel.capture_state())
    );
    Ok(())
}

/// Handle the `roots` command
pub async fn roots() -> Result<()> {
    let roots = list_roots().await;
    if roots.is_empty() {
        println!("{}", "No drives or mount points found.".yellow());
        return Ok(());
    }

    println!("{}", "Available roots:".green().bold());
    for root in &roots {
        println!("  {}", root.to_string().cyan());
    }
    Ok(())
}

/// Handle the `init` command
pub fn init(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match config_path {
        Some(path) => path,
        None => Config::config_path()?,
    };

    if path.exists() && !force {
        println!(
            "{} {} already exists. Use {} to overwrite it.",
            "Config".yellow(),
            path.display(),
            "--force".cyan()
        );
        return Ok(());
    }

    Config::default().save_to(&path)?;
    println!("{} {}", "Wrote default config to".green(), path.display());
    Ok(())
}

/// Handle the `completion` command
pub fn completion(shell: clap_complete::Shell) {
    let mut cmd = super::Cli::command();
    generate(shell, &mut cmd, "twinpane", &mut io::stdout());
}

impl super::Cli {
    fn command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }
}

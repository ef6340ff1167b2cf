//! The two-panel event loop
//!
//! Both panels share one cooperative loop: user commands and restoration
//! checkpoints are interleaved, never run concurrently, and a checkpoint is
//! only a timer, so input (including the input that cancels a restoration)
//! is handled while a restoration waits.

use anyhow::Result;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use super::error::NavError;
use super::panel::Panel;
use super::path::NavPath;
use super::reconciler::Checkpoint;
use super::segment::BreadcrumbSegment;
use super::state::NavigationState;
use crate::persist::{PanelSide, PersistenceAdapter};
use crate::source::TreeSource;

/// Requests from the UI side
#[derive(Debug)]
pub enum Command {
    /// A breadcrumb control was clicked
    BreadcrumbClick {
        side: PanelSide,
        segment: BreadcrumbSegment,
        reply: oneshot::Sender<Result<(), NavError>>,
    },
    /// The user selected an entry directly
    Select {
        side: PanelSide,
        path: NavPath,
        reply: oneshot::Sender<Result<(), NavError>>,
    },
    Scroll {
        side: PanelSide,
        offset: u32,
    },
    Breadcrumbs {
        side: PanelSide,
        reply: oneshot::Sender<Vec<BreadcrumbSegment>>,
    },
    Capture {
        side: PanelSide,
        reply: oneshot::Sender<NavigationState>,
    },
    /// Save both panels and stop the loop
    Shutdown,
}

/// Left and right panels plus the store they persist to
pub struct Workspace<S: TreeSource, P: PersistenceAdapter> {
    left: Panel<S>,
    right: Panel<S>,
    store: P,
}

impl<S: TreeSource, P: PersistenceAdapter> Workspace<S, P> {
    pub fn new(left: Panel<S>, right: Panel<S>, store: P) -> Self {
        Self { left, right, store }
    }

    pub fn panel(&self, side: PanelSide) -> &Panel<S> {
        match side {
            PanelSide::Left => &self.left,
            PanelSide::Right => &self.right,
        }
    }

    pub fn panel_mut(&mut self, side: PanelSide) -> &mut Panel<S> {
        match side {
            PanelSide::Left => &mut self.left,
            PanelSide::Right => &mut self.right,
        }
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    /// Start restoring every panel that has saved state
    pub fn restore_saved(&mut self) -> Result<()> {
        self.restore_saved_sides(&PanelSide::BOTH)
    }

    /// Start restoring the given panels from the store
    pub fn restore_saved_sides(&mut self, sides: &[PanelSide]) -> Result<()> {
        let now = Instant::now();
        for &side in sides {
            let panel = match side {
                PanelSide::Left => &mut self.left,
                PanelSide::Right => &mut self.right,
            };
            panel.load_from(&self.store, now)?;
        }
        Ok(())
    }

    /// Earliest checkpoint across both panels
    fn next_due(&self) -> Option<(PanelSide, Instant)> {
        PanelSide::BOTH
            .iter()
            .filter_map(|&side| self.panel(side).next_checkpoint().map(|at| (side, at)))
            .min_by_key(|(_, at)| *at)
    }

    fn fire(&mut self, side: PanelSide) {
        if let Some(Checkpoint::Finished(outcome)) = self.panel_mut(side).run_due(Instant::now()) {
            debug!("{} panel restoration finished: {:?}", side, outcome);
        }
    }

    /// Fire checkpoints until neither panel has a restoration in flight
    pub async fn settle(&mut self) {
        while let Some((side, at)) = self.next_due() {
            sleep_until(at).await;
            self.fire(side);
        }
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::BreadcrumbClick {
                side,
                segment,
                reply,
            } => {
                let result = self.panel_mut(side).on_breadcrumb_click(&segment);
                let _ = reply.send(result);
            }
            Command::Select { side, path, reply } => {
                let result = self.panel_mut(side).select(&path);
                let _ = reply.send(result);
            }
            Command::Scroll { side, offset } => {
                self.panel_mut(side).scroll(offset);
            }
            Command::Breadcrumbs { side, reply } => {
                let _ = reply.send(self.panel(side).breadcrumbs());
            }
            Command::Capture { side, reply } => {
                let _ = reply.send(self.panel(side).capture_state());
            }
            Command::Shutdown => {}
        }
    }

    /// Run the loop until `Shutdown` arrives or every sender is dropped
    ///
    /// Both panels are saved before returning.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> Result<Self> {
        loop {
            let due = self.next_due();
            let deadline = due.map_or_else(Instant::now, |(_, at)| at);

            tokio::select! {
                biased;

                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
                _ = sleep_until(deadline), if due.is_some() => {
                    if let Some((side, _)) = due {
                        self.fire(side);
                    }
                }
            }
        }

        self.save_all()?;
        info!("Workspace stopped, panel state saved");
        Ok(self)
    }

    /// Persist both panels
    pub fn save_all(&mut self) -> Result<()> {
        self.left.save_to(&mut self.store)?;
        self.right.save_to(&mut self.store)?;
        Ok(())
    }
}

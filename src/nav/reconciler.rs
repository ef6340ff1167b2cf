//! Convergence reconciler
//!
//! Restores a persisted [`NavigationState`] into a [`TreeSource`] that fills
//! itself in asynchronously and never announces when a branch is ready.
//! Instead of waiting for a signal, the reconciler tries to resolve the target
//! at a short, fixed list of checkpoints and gives up after the last one.
//!
//! ```text
//! Idle -> Scheduled -> Attempting -> Scheduled -> ... -> Committed | Exhausted
//!              \__________________________________________ Cancelled
//! ```
//!
//! Every restoration carries a [`RestorationId`]. A checkpoint fired for an id
//! that is no longer pending does nothing, so a timer that outlives a
//! cancellation can never touch the source.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::error::ScheduleError;
use super::path::NavPath;
use super::state::NavigationState;
use crate::source::{ScrollTarget, TreeSource};

/// Checkpoint offsets used when no schedule is configured
pub const DEFAULT_SCHEDULE_MS: [u64; 3] = [0, 100, 500];

/// Checkpoint delays, measured from the moment a restoration starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrySchedule {
    delays: Vec<Duration>,
}

impl RetrySchedule {
    /// Build a schedule; it must be non-empty and strictly increasing
    pub fn new(delays: Vec<Duration>) -> Result<Self, ScheduleError> {
        if delays.is_empty() {
            return Err(ScheduleError::Empty);
        }
        for (index, pair) in delays.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(ScheduleError::NotIncreasing {
                    index: index + 1,
                    prev_ms: pair[0].as_millis(),
                    next_ms: pair[1].as_millis(),
                });
            }
        }
        Ok(Self { delays })
    }

    pub fn from_millis(millis: &[u64]) -> Result<Self, ScheduleError> {
        Self::new(millis.iter().map(|ms| Duration::from_millis(*ms)).collect())
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    /// Attempt budget of one restoration
    pub fn attempts(&self) -> usize {
        self.delays.len()
    }
}

impl Default for RetrySchedule {
    fn default() -> Self {
        Self {
            delays: DEFAULT_SCHEDULE_MS
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
        }
    }
}

/// Identity of one restoration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RestorationId(u64);

/// Reconciler state machine phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Scheduled,
    Attempting,
    Committed,
    Exhausted,
    Cancelled,
}

/// How a restoration ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Target applied. `offset` is what was actually scrolled to.
    Committed {
        path: NavPath,
        offset: u32,
        clamped: bool,
    },
    /// Target never resolved within the attempt budget
    Exhausted { path: NavPath, attempts: usize },
    /// Superseded by user navigation or a newer restoration
    Cancelled { path: NavPath },
}

/// Result of firing one checkpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Checkpoint {
    /// The id is not the pending restoration; nothing was done
    Stale,
    /// Unresolved, another attempt is scheduled
    Retry { next_at: Instant },
    /// The restoration reached a terminal phase
    Finished(Outcome),
}

#[derive(Debug)]
struct PendingRestoration {
    id: RestorationId,
    target: NavigationState,
    /// Remaining checkpoint instants, earliest first
    deadlines: VecDeque<Instant>,
    attempts_made: usize,
}

impl PendingRestoration {
    fn attempts_remaining(&self) -> usize {
        self.deadlines.len()
    }
}

/// Bounded-retry restorer for one panel
#[derive(Debug)]
pub struct ConvergenceReconciler {
    schedule: RetrySchedule,
    pending: Option<PendingRestoration>,
    next_id: u64,
    /// Phases of the current (or most recent) restoration
    history: Vec<Phase>,
    last_outcome: Option<Outcome>,
}

impl ConvergenceReconciler {
    pub fn new(schedule: RetrySchedule) -> Self {
        Self {
            schedule,
            pending: None,
            next_id: 1,
            history: Vec::new(),
            last_outcome: None,
        }
    }

    pub fn schedule(&self) -> &RetrySchedule {
        &self.schedule
    }

    /// `Scheduled` while a restoration is in flight, `Idle` otherwise
    pub fn phase(&self) -> Phase {
        if self.pending.is_some() {
            Phase::Scheduled
        } else {
            Phase::Idle
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn history(&self) -> &[Phase] {
        &self.history
    }

    pub fn last_outcome(&self) -> Option<&Outcome> {
        self.last_outcome.as_ref()
    }

    /// Target of the in-flight restoration
    pub fn pending_target(&self) -> Option<&NavigationState> {
        self.pending.as_ref().map(|p| &p.target)
    }

    /// Attempts left for the in-flight restoration
    pub fn attempts_remaining(&self) -> usize {
        self.pending
            .as_ref()
            .map_or(0, PendingRestoration::attempts_remaining)
    }

    /// Start restoring `target`, replacing any restoration already in flight
    ///
    /// Checkpoints are laid out from `now` using the schedule.
    pub fn begin(&mut self, target: NavigationState, now: Instant) -> RestorationId {
        self.cancel();

        let id = RestorationId(self.next_id);
        self.next_id += 1;

        let deadlines: VecDeque<Instant> =
            self.schedule.delays().iter().map(|d| now + *d).collect();

        debug!(
            "Scheduling restoration {:?} of {} (offset {}, {} attempts)",
            id,
            target.selected_path,
            target.scroll_offset,
            deadlines.len()
        );

        self.history.clear();
        self.history.push(Phase::Scheduled);
        self.pending = Some(PendingRestoration {
            id,
            target,
            deadlines,
            attempts_made: 0,
        });
        id
    }

    /// Drop the in-flight restoration, if any
    ///
    /// Returns whether something was cancelled.
    pub fn cancel(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        debug!(
            "Cancelled restoration {:?} of {} after {} attempt(s)",
            pending.id, pending.target.selected_path, pending.attempts_made
        );
        self.history.push(Phase::Cancelled);
        self.last_outcome = Some(Outcome::Cancelled {
            path: pending.target.selected_path,
        });
        true
    }

    /// Next checkpoint to fire, with the id it must be fired for
    pub fn next_checkpoint(&self) -> Option<(RestorationId, Instant)> {
        let pending = self.pending.as_ref()?;
        pending.deadlines.front().map(|at| (pending.id, *at))
    }

    /// Id of the pending restoration if its next checkpoint is due at `now`
    pub fn due(&self, now: Instant) -> Option<RestorationId> {
        self.next_checkpoint()
            .and_then(|(id, at)| (at <= now).then_some(id))
    }

    /// Fire the next checkpoint of restoration `id` against `source`
    ///
    /// On success the offset is checked against the source's current maximum
    /// and clamped when it no longer fits, then the node is made current and
    /// scrolled to. Never fails: the worst case is `Exhausted`.
    pub fn attempt<S: TreeSource>(&mut self, id: RestorationId, source: &mut S) -> Checkpoint {
        let Some(pending) = self.pending.as_mut() else {
            debug!("Ignoring checkpoint for {:?}: nothing pending", id);
            return Checkpoint::Stale;
        };
        if pending.id != id {
            debug!(
                "Ignoring checkpoint for {:?}: {:?} is pending",
                id, pending.id
            );
            return Checkpoint::Stale;
        }

        pending.deadlines.pop_front();
        pending.attempts_made += 1;
        self.history.push(Phase::Attempting);

        let path = pending.target.selected_path.clone();
        let Some(node) = source.resolve(&path) else {
            if let Some(&next_at) = pending.deadlines.front() {
                debug!(
                    "Restoration {:?}: {} not resolved on attempt {}, {} left",
                    id,
                    path,
                    pending.attempts_made,
                    pending.attempts_remaining()
                );
                self.history.push(Phase::Scheduled);
                return Checkpoint::Retry { next_at };
            }
            let attempts = pending.attempts_made;
            warn!(
                "Giving up restoring {} after {} attempt(s), keeping default view",
                path, attempts
            );
            return self.finish(Phase::Exhausted, Outcome::Exhausted { path, attempts });
        };

        let requested = pending.target.scroll_offset;
        let max = source.max_scroll(&node);
        let offset = requested.min(max);
        if offset != requested {
            debug!(
                "Clamping stale scroll offset {} to {} for {}",
                requested, max, path
            );
        }

        source.set_current(&node);
        source.scroll_to(ScrollTarget::Offset(offset));

        info!(
            "Restored {} at offset {} (attempt {})",
            path, offset, pending.attempts_made
        );
        self.finish(
            Phase::Committed,
            Outcome::Committed {
                path,
                offset,
                clamped: offset != requested,
            },
        )
    }

    fn finish(&mut self, phase: Phase, outcome: Outcome) -> Checkpoint {
        self.pending = None;
        self.history.push(phase);
        self.last_outcome = Some(outcome.clone());
        Checkpoint::Finished(outcome)
    }
}

impl Default for ConvergenceReconciler {
    fn default() -> Self {
        Self::new(RetrySchedule::default())
    }
}

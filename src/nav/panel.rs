//! One browser panel: a data-source view plus its navigation state

use anyhow::Result;
use tokio::time::Instant;
use tracing::debug;

use super::error::NavError;
use super::path::NavPath;
use super::reconciler::{Checkpoint, ConvergenceReconciler, Phase, RestorationId, RetrySchedule};
use super::segment::{breadcrumb_dir, segment, BreadcrumbSegment};
use super::state::NavigationState;
use crate::persist::{PanelSide, PersistenceAdapter};
use crate::source::{ScrollTarget, TreeSource};

/// A panel bound to one data source and one persistence key
///
/// Every manual navigation (breadcrumb click, select, scroll) cancels a
/// restoration still in flight, so a late checkpoint cannot undo what the
/// user just did.
pub struct Panel<S: TreeSource> {
    side: PanelSide,
    source: S,
    reconciler: ConvergenceReconciler,
}

impl<S: TreeSource> Panel<S> {
    pub fn new(side: PanelSide, source: S, schedule: RetrySchedule) -> Self {
        Self {
            side,
            source,
            reconciler: ConvergenceReconciler::new(schedule),
        }
    }

    pub fn side(&self) -> PanelSide {
        self.side
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn reconciler(&self) -> &ConvergenceReconciler {
        &self.reconciler
    }

    pub fn restoration_phase(&self) -> Phase {
        self.reconciler.phase()
    }

    /// Breadcrumb trail for the current selection, empty when nothing is selected
    pub fn breadcrumbs(&self) -> Vec<BreadcrumbSegment> {
        let Some(node) = self.source.current() else {
            return Vec::new();
        };
        let path = self.source.path_of(&node);
        segment(&breadcrumb_dir(&path, self.source.is_dir(&node)))
    }

    /// Navigate to a breadcrumb segment
    ///
    /// On `PathNotFound` the selection, and with it the breadcrumb trail, is
    /// left as it was.
    pub fn on_breadcrumb_click(&mut self, segment: &BreadcrumbSegment) -> Result<(), NavError> {
        debug!(
            "{} panel: breadcrumb {} ({}) clicked",
            self.side, segment.ordinal, segment.cumulative_path
        );
        self.select(&segment.cumulative_path)
    }

    /// Select `path` and scroll it into view
    ///
    /// A path outside the source (a breadcrumb above its root, another
    /// drive) re-roots the source there when it can.
    pub fn select(&mut self, path: &NavPath) -> Result<(), NavError> {
        self.cancel_restoration();
        let node = match self.source.resolve(path) {
            Some(node) => node,
            None if self.source.rebase(path) => {
                debug!("{} panel: re-rooted at {}", self.side, path);
                self.source
                    .resolve(path)
                    .ok_or_else(|| NavError::PathNotFound(path.clone()))?
            }
            None => return Err(NavError::PathNotFound(path.clone())),
        };
        self.source.set_current(&node);
        self.source.scroll_to(ScrollTarget::Reveal(&node));
        Ok(())
    }

    /// Select `path`, waiting out the restore schedule if the source has
    /// not loaded it yet
    pub async fn select_eventually(&mut self, path: &NavPath) -> Result<(), NavError> {
        if self.select(path).is_ok() {
            return Ok(());
        }
        let offset = self.source.scroll_offset();
        self.restore_state(NavigationState::new(path.clone(), offset), Instant::now());
        self.settle().await;
        self.select(path)
    }

    /// Scroll to an exact offset
    pub fn scroll(&mut self, offset: u32) {
        self.cancel_restoration();
        self.source.scroll_to(ScrollTarget::Offset(offset));
    }

    /// Snapshot of the live selection and scroll offset
    ///
    /// With nothing selected the platform root is reported.
    pub fn capture_state(&self) -> NavigationState {
        let selected_path = self
            .source
            .current()
            .map(|node| self.source.path_of(&node))
            .unwrap_or_else(NavPath::platform_default);
        NavigationState::new(selected_path, self.source.scroll_offset())
    }

    /// Start restoring `state`, replacing any restoration in flight
    pub fn restore_state(&mut self, state: NavigationState, now: Instant) -> RestorationId {
        self.reconciler.begin(state, now)
    }

    pub fn cancel_restoration(&mut self) -> bool {
        self.reconciler.cancel()
    }

    /// When the next restoration checkpoint is due
    pub fn next_checkpoint(&self) -> Option<Instant> {
        self.reconciler.next_checkpoint().map(|(_, at)| at)
    }

    /// Fire the restoration checkpoint due at `now`, if any
    pub fn run_due(&mut self, now: Instant) -> Option<Checkpoint> {
        let id = self.reconciler.due(now)?;
        Some(self.reconciler.attempt(id, &mut self.source))
    }

    /// Sleep through the remaining checkpoints until the restoration ends
    pub async fn settle(&mut self) {
        while let Some(at) = self.next_checkpoint() {
            tokio::time::sleep_until(at).await;
            self.run_due(Instant::now());
        }
    }

    /// Load this panel's saved state and start restoring it
    ///
    /// Returns `None` when nothing was saved for this panel.
    pub fn load_from(
        &mut self,
        store: &dyn PersistenceAdapter,
        now: Instant,
    ) -> Result<Option<RestorationId>> {
        let Some(state) = store.load(self.side)? else {
            debug!("{} panel: no saved state", self.side);
            return Ok(None);
        };
        Ok(Some(self.restore_state(state, now)))
    }

    /// State that should be persisted right now
    ///
    /// While a restoration is still in flight the user has not seen or
    /// changed anything yet, so its target is kept rather than the
    /// half-populated live view.
    pub fn state_to_persist(&self) -> NavigationState {
        match self.reconciler.pending_target() {
            Some(target) => target.clone(),
            None => self.capture_state(),
        }
    }

    pub fn save_to(&self, store: &mut dyn PersistenceAdapter) -> Result<()> {
        let state = self.state_to_persist();
        debug!(
            "{} panel: saving {} at offset {}",
            self.side, state.selected_path, state.scroll_offset
        );
        store.save(self.side, &state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::reconciler::Outcome;
    use crate::persist::MemoryStore;
    use crate::source::scripted::{Mutation, ScriptedSource};
    use std::time::Duration;

    fn path(s: &str) -> NavPath {
        NavPath::parse(s).unwrap()
    }

    fn library() -> ScriptedSource {
        ScriptedSource::new(40)
            .with_dir("/")
            .with_dir("/music")
            .with_dir("/music/Album")
            .with_file("/music/Album/01 - Intro.flac")
    }

    #[test]
    fn test_breadcrumb_click_selects_and_reveals() {
        let mut panel = Panel::new(PanelSide::Left, library(), RetrySchedule::default());
        panel.select(&path("/music/Album/01 - Intro.flac")).unwrap();

        let crumbs = panel.breadcrumbs();
        assert_eq!(crumbs.len(), 3);
        assert_eq!(crumbs[2].cumulative_path, path("/music/Album"));

        panel.on_breadcrumb_click(&crumbs[1]).unwrap();
        assert_eq!(panel.capture_state().selected_path, path("/music"));
        assert_eq!(
            panel.source().mutations.last(),
            Some(&Mutation::Reveal(path("/music")))
        );
        assert_eq!(panel.breadcrumbs().len(), 2);
    }

    #[test]
    fn test_missing_breadcrumb_leaves_panel_unchanged() {
        let mut panel = Panel::new(PanelSide::Left, library(), RetrySchedule::default());
        panel.select(&path("/music/Album")).unwrap();
        let before = panel.breadcrumbs();
        let mutations = panel.source().mutations.len();

        let gone = BreadcrumbSegment {
            label: "Gone".to_string(),
            cumulative_path: path("/music/Gone"),
            ordinal: 2,
        };
        assert_eq!(
            panel.on_breadcrumb_click(&gone),
            Err(NavError::PathNotFound(path("/music/Gone")))
        );
        assert_eq!(panel.breadcrumbs(), before);
        assert_eq!(panel.source().mutations.len(), mutations);
    }

    #[test]
    fn test_no_selection_has_no_breadcrumbs() {
        let panel = Panel::new(PanelSide::Right, library(), RetrySchedule::default());
        assert!(panel.breadcrumbs().is_empty());
        assert_eq!(panel.capture_state(), NavigationState::default());
    }

    #[test]
    fn test_click_cancels_pending_restoration() {
        let source = library().with_node("/music/Later", true, 100);
        let mut panel = Panel::new(PanelSide::Left, source, RetrySchedule::default());
        let start = Instant::now();
        panel.restore_state(NavigationState::new(path("/music/Later"), 9), start);
        assert_eq!(panel.restoration_phase(), Phase::Scheduled);

        let crumb = segment(&path("/music")).pop().unwrap();
        panel.on_breadcrumb_click(&crumb).unwrap();

        assert_eq!(panel.restoration_phase(), Phase::Idle);
        assert!(panel.next_checkpoint().is_none());
        assert!(panel.run_due(start + Duration::from_secs(1)).is_none());
        assert!(matches!(
            panel.reconciler().last_outcome(),
            Some(Outcome::Cancelled { .. })
        ));
        assert_eq!(panel.capture_state().selected_path, path("/music"));
    }

    #[test]
    fn test_manual_scroll_cancels_restoration() {
        let mut panel = Panel::new(PanelSide::Left, library(), RetrySchedule::default());
        panel.restore_state(NavigationState::new(path("/music"), 9), Instant::now());
        panel.scroll(4);
        assert!(!panel.reconciler().is_pending());
        assert_eq!(panel.capture_state().scroll_offset, 4);
    }

    #[test]
    fn test_run_due_respects_schedule() {
        let source = library().with_node("/music/Late", true, 1);
        let mut panel = Panel::new(PanelSide::Left, source, RetrySchedule::default());
        let start = Instant::now();
        panel.restore_state(NavigationState::new(path("/music/Late"), 2), start);

        assert!(matches!(
            panel.run_due(start),
            Some(Checkpoint::Retry { .. })
        ));
        assert!(panel.run_due(start + Duration::from_millis(50)).is_none());
        assert!(matches!(
            panel.run_due(start + Duration::from_millis(100)),
            Some(Checkpoint::Finished(Outcome::Committed { offset: 2, .. }))
        ));
    }

    #[test]
    fn test_persistence_round_trip() {
        let mut store = MemoryStore::default();
        let mut left = Panel::new(PanelSide::Left, library(), RetrySchedule::default());
        left.select(&path("/music/Album")).unwrap();
        left.scroll(7);
        left.save_to(&mut store).unwrap();

        let mut restored = Panel::new(PanelSide::Left, library(), RetrySchedule::default());
        let now = Instant::now();
        assert!(restored.load_from(&store, now).unwrap().is_some());
        restored.run_due(now);
        assert_eq!(
            restored.capture_state(),
            NavigationState::new(path("/music/Album"), 7)
        );

        let mut right = Panel::new(PanelSide::Right, library(), RetrySchedule::default());
        assert!(right.load_from(&store, now).unwrap().is_none());
    }

    #[test]
    fn test_pending_target_is_what_gets_saved() {
        let source = library().with_node("/music/Slow", true, 100);
        let mut panel = Panel::new(PanelSide::Right, source, RetrySchedule::default());
        let target = NavigationState::new(path("/music/Slow"), 30);
        panel.restore_state(target.clone(), Instant::now());

        let mut store = MemoryStore::default();
        panel.save_to(&mut store).unwrap();
        assert_eq!(store.load(PanelSide::Right).unwrap(), Some(target));
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_eventually_waits_then_reveals() {
        let source = library().with_node("/music/Fresh", true, 2);
        let mut panel = Panel::new(PanelSide::Left, source, RetrySchedule::default());

        panel.select_eventually(&path("/music/Fresh")).await.unwrap();
        assert_eq!(panel.capture_state().selected_path, path("/music/Fresh"));
        assert_eq!(
            panel.source().mutations.last(),
            Some(&Mutation::Reveal(path("/music/Fresh")))
        );

        assert_eq!(
            panel.select_eventually(&path("/music/Never")).await,
            Err(NavError::PathNotFound(path("/music/Never")))
        );
        assert_eq!(panel.capture_state().selected_path, path("/music/Fresh"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_reaches_terminal_state() {
        let source = library().with_node("/music/Album/Deep", true, 2);
        let mut panel = Panel::new(PanelSide::Left, source, RetrySchedule::default());
        let start = Instant::now();
        panel.restore_state(NavigationState::new(path("/music/Album/Deep"), 1), start);

        panel.settle().await;

        assert_eq!(panel.restoration_phase(), Phase::Idle);
        assert!(Instant::now() >= start + Duration::from_millis(500));
        assert_eq!(
            panel.capture_state(),
            NavigationState::new(path("/music/Album/Deep"), 1)
        );
    }
}

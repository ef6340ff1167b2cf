//! Navigation state engine: paths, breadcrumbs, panels and restoration

pub mod error;
pub mod panel;
pub mod path;
pub mod reconciler;
pub mod segment;
pub mod state;
pub mod workspace;

pub use error::{NavError, ScheduleError};
pub use panel::Panel;
pub use path::{NavPath, Root};
pub use reconciler::{
    Checkpoint, ConvergenceReconciler, Outcome, Phase, RestorationId, RetrySchedule,
};
pub use segment::{breadcrumb_dir, segment, segment_str, BreadcrumbSegment};
pub use state::NavigationState;
pub use workspace::{Command, Workspace};

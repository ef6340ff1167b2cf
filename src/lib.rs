//! Breadcrumb navigation and convergent state restoration for a two-panel
//! file browser
//!
//! [`nav`] holds the engine: path segmentation, the per-panel restoration
//! reconciler and the two-panel loop. [`source`] is the tree the engine
//! drives, [`persist`] where panel state is kept between runs.

pub mod config;
pub mod nav;
pub mod persist;
pub mod source;

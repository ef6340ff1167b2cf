//! Hierarchical data sources the navigation engine drives
//!
//! A source populates itself however it likes (the filesystem tree lists
//! directories on background tasks) and offers no signal for "node for path P
//! now exists". The engine only polls [`TreeSource::resolve`].

pub mod fs_tree;
pub mod roots;
#[cfg(test)]
pub(crate) mod scripted;

use std::fmt;

use crate::nav::NavPath;

pub use fs_tree::{FsTree, FsTreeOptions, ListingEntry, ListingFilter, NodeId};
pub use roots::list_roots;

/// Scroll request for a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget<N> {
    /// Exact offset, in rows from the top
    Offset(u32),
    /// Move the minimum distance that makes the node visible
    Reveal(N),
}

/// A lazily populated tree with a scrollable view over it
pub trait TreeSource {
    /// Handle to a materialized node
    type Node: Clone + fmt::Debug + PartialEq;

    /// Map a path to a node, or `None` if the source does not know it yet
    ///
    /// Takes `&mut self` because resolving may pull in completed background
    /// work or request more of it.
    fn resolve(&mut self, path: &NavPath) -> Option<Self::Node>;

    /// Largest valid scroll offset once `node` is made current
    fn max_scroll(&self, node: &Self::Node) -> u32;

    /// Make `node` the current selection
    fn set_current(&mut self, node: &Self::Node);

    fn scroll_to(&mut self, target: ScrollTarget<&Self::Node>);

    /// Currently selected node, if any
    fn current(&self) -> Option<Self::Node>;

    fn path_of(&self, node: &Self::Node) -> NavPath;

    fn is_dir(&self, node: &Self::Node) -> bool;

    fn scroll_offset(&self) -> u32;

    /// Make an existing `path` outside the source its new root
    ///
    /// Returns whether the source was re-rooted. Sources without a movable
    /// root keep the default.
    fn rebase(&mut self, _path: &NavPath) -> bool {
        false
    }
}

//! Breadcrumb segmentation

use serde::Serialize;

use super::error::NavError;
use super::path::NavPath;

/// One clickable unit of a breadcrumb bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreadcrumbSegment {
    /// Display name (`/`, `C:` or a directory name)
    pub label: String,
    /// Path this segment navigates to
    pub cumulative_path: NavPath,
    /// Position from the root, starting at 0
    pub ordinal: usize,
}

impl BreadcrumbSegment {
    /// Hover text for the segment's control
    pub fn tooltip(&self) -> String {
        format!("Go to {}", self.cumulative_path)
    }
}

/// Split a path into breadcrumb segments, root first
///
/// The root segment's cumulative path is the separator-terminated root, so a
/// drive yields `C:\` and never the unresolvable `C:`.
pub fn segment(path: &NavPath) -> Vec<BreadcrumbSegment> {
    let root = path.root_kind();
    let mut cumulative = NavPath::root(root);
    let mut segments = Vec::with_capacity(path.depth() + 1);

    segments.push(BreadcrumbSegment {
        label: root.label(),
        cumulative_path: cumulative.clone(),
        ordinal: 0,
    });

    for (i, name) in path.components().iter().enumerate() {
        cumulative = cumulative.join(name);
        segments.push(BreadcrumbSegment {
            label: name.clone(),
            cumulative_path: cumulative.clone(),
            ordinal: i + 1,
        });
    }

    segments
}

/// Parse `input` and segment it
pub fn segment_str(input: &str) -> Result<Vec<BreadcrumbSegment>, NavError> {
    Ok(segment(&NavPath::parse(input)?))
}

/// Directory whose trail the breadcrumb bar shows for a selection
///
/// Files show their containing folder.
pub fn breadcrumb_dir(path: &NavPath, is_dir: bool) -> NavPath {
    if is_dir {
        return path.clone();
    }
    path.parent().unwrap_or_else(|| path.clone())
}

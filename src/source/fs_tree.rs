//! Filesystem-backed tree source
//!
//! Directory listings are enumerated on background tasks and arrive over a
//! channel. `resolve` drains whatever has arrived, asks for whatever is still
//! missing on the way to the requested path, and answers with what it knows
//! right now. Nothing tells the caller when a branch has finished loading.
//!
//! The view mirrors a tree widget: the children of the tree root are always
//! shown, deeper children only when their directory is expanded. Selecting a
//! node expands its ancestors.

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tokio::fs;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{ScrollTarget, TreeSource};
use crate::nav::NavPath;

/// File types listed by default
pub const DEFAULT_AUDIO_EXTENSIONS: [&str; 4] = ["mp3", "flac", "ogg", "m4a"];

/// Which directory entries make it into a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingFilter {
    /// Lower-case extensions without the dot. Empty keeps every file.
    extensions: Vec<String>,
    show_hidden: bool,
}

impl ListingFilter {
    pub fn new<I, T>(extensions: I, show_hidden: bool) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self {
            extensions,
            show_hidden,
        }
    }

    /// Directories always pass (unless hidden); files must match an extension
    pub fn accepts(&self, name: &str, is_dir: bool) -> bool {
        if !self.show_hidden && name.starts_with('.') {
            return false;
        }
        if is_dir || self.extensions.is_empty() {
            return true;
        }
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|wanted| wanted.eq_ignore_ascii_case(ext))
            })
    }
}

impl Default for ListingFilter {
    fn default() -> Self {
        Self::new(DEFAULT_AUDIO_EXTENSIONS, false)
    }
}

/// Tuning for an [`FsTree`]
#[derive(Debug, Clone)]
pub struct FsTreeOptions {
    pub filter: ListingFilter,
    /// Rows visible at once; the scroll extent is rows minus this
    pub viewport_rows: u32,
    /// Directories enumerated concurrently
    pub listing_parallelism: usize,
}

impl Default for FsTreeOptions {
    fn default() -> Self {
        Self {
            filter: ListingFilter::default(),
            viewport_rows: 30,
            listing_parallelism: 4,
        }
    }
}

/// One accepted directory entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Directories first, then case-insensitive name
fn sort_entries(entries: &mut [ListingEntry]) {
    entries.sort_by(|a, b| {
        b.is_dir
            .cmp(&a.is_dir)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Completed enumeration of one directory
#[derive(Debug)]
struct Listing {
    generation: u64,
    dir: NavPath,
    entries: Vec<ListingEntry>,
}

/// Handle to a materialized node of an [`FsTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

const ROOT: NodeId = NodeId(0);

#[derive(Debug)]
struct FsNode {
    path: NavPath,
    is_dir: bool,
    parent: Option<NodeId>,
    /// `None` until the directory has been listed
    children: Option<Vec<NodeId>>,
}

enum Walk {
    Found(NodeId),
    /// Definitively absent as far as the loaded listings go
    Missing,
    /// The directory holding the first `depth` components is not listed yet
    Unlisted { depth: usize },
}

/// Lazily listed directory tree with a scrollable view
///
/// Must be used inside a tokio runtime; listings run on spawned tasks.
pub struct FsTree {
    nodes: Vec<FsNode>,
    index: HashMap<NavPath, NodeId>,
    expanded: HashSet<NodeId>,
    current: Option<NodeId>,
    offset: u32,
    options: FsTreeOptions,
    /// Bumped on every reset; listings from older generations are dropped
    generation: u64,
    in_flight: HashSet<NavPath>,
    /// Listings whose directory node does not exist yet
    staged: HashMap<NavPath, Vec<ListingEntry>>,
    listing_tx: mpsc::UnboundedSender<Listing>,
    listing_rx: mpsc::UnboundedReceiver<Listing>,
}

impl FsTree {
    /// Tree rooted at `root`, which is shown as the (hidden) top of the view
    pub fn new(root: NavPath, options: FsTreeOptions) -> Self {
        let (listing_tx, listing_rx) = mpsc::unbounded_channel();
        let mut tree = Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            expanded: HashSet::new(),
            current: None,
            offset: 0,
            options,
            generation: 0,
            in_flight: HashSet::new(),
            staged: HashMap::new(),
            listing_tx,
            listing_rx,
        };
        tree.reset_to_root(root);
        tree
    }

    pub fn root_path(&self) -> &NavPath {
        &self.nodes[ROOT.0].path
    }

    /// Directories currently being enumerated
    pub fn listings_in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Forget every listing; the next `resolve` enumerates again
    ///
    /// The selection and scroll position are reset with them.
    pub fn refresh(&mut self) {
        let root = self.root_path().clone();
        self.reset_to_root(root);
        debug!(
            "Refreshed tree at {} (generation {})",
            self.root_path(),
            self.generation
        );
    }

    /// Re-root the tree at `root`, dropping every listing
    pub fn set_root(&mut self, root: NavPath) {
        debug!("Re-rooting tree from {} to {}", self.root_path(), root);
        self.reset_to_root(root);
    }

    fn reset_to_root(&mut self, root: NavPath) {
        self.generation += 1;
        self.nodes.clear();
        self.index.clear();
        self.expanded.clear();
        self.in_flight.clear();
        self.staged.clear();
        self.current = None;
        self.offset = 0;

        self.index.insert(root.clone(), ROOT);
        self.nodes.push(FsNode {
            path: root,
            is_dir: true,
            parent: None,
            children: None,
        });
    }

    fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.nodes[id.0].children.as_deref().unwrap_or(&[])
    }

    fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut cursor = self.nodes[id.0].parent;
        while let Some(parent) = cursor {
            ancestors.push(parent);
            cursor = self.nodes[parent.0].parent;
        }
        ancestors
    }

    fn walk(&self, path: &NavPath) -> Walk {
        let root = self.root_path();
        if !path.starts_with(root) {
            return Walk::Missing;
        }

        let mut node = ROOT;
        for depth in root.depth()..path.depth() {
            let current = &self.nodes[node.0];
            if !current.is_dir {
                return Walk::Missing;
            }
            if current.children.is_none() {
                return Walk::Unlisted { depth };
            }
            match self.index.get(&path.prefix(depth + 1)) {
                Some(&child) if self.nodes[child.0].parent == Some(node) => node = child,
                _ => return Walk::Missing,
            }
        }
        Walk::Found(node)
    }

    /// Move finished listings from the channel into the tree
    fn drain_listings(&mut self) {
        let mut received = 0;
        while let Ok(listing) = self.listing_rx.try_recv() {
            if listing.generation != self.generation {
                continue;
            }
            self.in_flight.remove(&listing.dir);
            self.staged.insert(listing.dir, listing.entries);
            received += 1;
        }
        if received == 0 {
            return;
        }

        // A child's listing can land before its parent's; attach in waves
        loop {
            let ready: Vec<(NavPath, NodeId)> = self
                .staged
                .keys()
                .filter_map(|dir| self.index.get(dir).map(|id| (dir.clone(), *id)))
                .collect();
            if ready.is_empty() {
                break;
            }
            for (dir, id) in ready {
                if let Some(entries) = self.staged.remove(&dir) {
                    self.attach(id, entries);
                }
            }
        }

        // Whatever is still staged under a listed parent was filtered out
        // of that parent and will never get a node
        let nodes = &self.nodes;
        let index = &self.index;
        self.staged.retain(|dir, _| {
            let orphaned = dir
                .parent()
                .and_then(|parent| index.get(&parent))
                .is_some_and(|parent| nodes[parent.0].children.is_some());
            if orphaned {
                debug!("Dropping listing of {}: not in its parent's listing", dir);
            }
            !orphaned
        });
    }

    fn attach(&mut self, id: NodeId, entries: Vec<ListingEntry>) {
        let dir = &self.nodes[id.0];
        if dir.children.is_some() || !dir.is_dir {
            return;
        }
        let dir_path = dir.path.clone();

        let mut children = Vec::with_capacity(entries.len());
        for entry in entries {
            let path = dir_path.join(&entry.name);
            let child = NodeId(self.nodes.len());
            self.index.insert(path.clone(), child);
            self.nodes.push(FsNode {
                path,
                is_dir: entry.is_dir,
                parent: Some(id),
                children: None,
            });
            children.push(child);
        }

        debug!("Listed {} ({} entries)", dir_path, children.len());
        self.nodes[id.0].children = Some(children);
    }

    /// Enumerate `dirs` off the loop, skipping ones already requested
    fn request_listings(&mut self, dirs: Vec<NavPath>) {
        let dirs: Vec<NavPath> = dirs
            .into_iter()
            .filter(|dir| !self.in_flight.contains(dir) && !self.staged.contains_key(dir))
            .collect();
        if dirs.is_empty() {
            return;
        }

        debug!("Requesting {} listing(s) starting at {}", dirs.len(), dirs[0]);
        self.in_flight.extend(dirs.iter().cloned());

        let tx = self.listing_tx.clone();
        let filter = self.options.filter.clone();
        let generation = self.generation;
        let parallelism = self.options.listing_parallelism.max(1);

        tokio::spawn(async move {
            stream::iter(dirs)
                .map(|dir| {
                    let filter = filter.clone();
                    async move {
                        let entries = read_listing(&dir.to_native(), &filter).await;
                        Listing {
                            generation,
                            dir,
                            entries,
                        }
                    }
                })
                .buffer_unordered(parallelism)
                .for_each(|listing| {
                    // Receiver gone means the tree was dropped
                    let _ = tx.send(listing);
                    futures::future::ready(())
                })
                .await;
        });
    }

    fn viewport(&self) -> u32 {
        self.options.viewport_rows.max(1)
    }

    /// Rows in display order, optionally as if `reveal`'s ancestors were expanded
    fn visible_rows(&self, reveal: Option<NodeId>) -> Vec<NodeId> {
        let extra: HashSet<NodeId> = reveal
            .map(|id| self.ancestors(id).into_iter().collect())
            .unwrap_or_default();

        let mut rows = Vec::new();
        let mut stack: Vec<NodeId> = self.children_of(ROOT).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            rows.push(id);
            if self.expanded.contains(&id) || extra.contains(&id) {
                stack.extend(self.children_of(id).iter().rev().copied());
            }
        }
        rows
    }

    fn max_offset(&self, rows: usize) -> u32 {
        u32::try_from(rows)
            .unwrap_or(u32::MAX)
            .saturating_sub(self.viewport())
    }

    fn expand_ancestors(&mut self, id: NodeId) {
        for ancestor in self.ancestors(id) {
            self.expanded.insert(ancestor);
        }
    }

    /// Paths of the visible rows, top to bottom
    pub fn visible_paths(&self) -> Vec<NavPath> {
        self.visible_rows(None)
            .into_iter()
            .map(|id| self.nodes[id.0].path.clone())
            .collect()
    }
}

impl TreeSource for FsTree {
    type Node = NodeId;

    fn resolve(&mut self, path: &NavPath) -> Option<NodeId> {
        self.drain_listings();
        match self.walk(path) {
            Walk::Found(node) => Some(node),
            Walk::Missing => None,
            Walk::Unlisted { depth } => {
                // Everything from the first unlisted directory down to the target's parent
                let dirs = (depth..path.depth())
                    .map(|d| path.prefix(d))
                    .collect();
                self.request_listings(dirs);
                None
            }
        }
    }

    fn max_scroll(&self, node: &NodeId) -> u32 {
        self.max_offset(self.visible_rows(Some(*node)).len())
    }

    fn set_current(&mut self, node: &NodeId) {
        self.expand_ancestors(*node);
        self.current = Some(*node);
    }

    fn scroll_to(&mut self, target: ScrollTarget<&NodeId>) {
        match target {
            ScrollTarget::Offset(offset) => {
                self.offset = offset.min(self.max_offset(self.visible_rows(None).len()));
            }
            ScrollTarget::Reveal(node) => {
                self.expand_ancestors(*node);
                let rows = self.visible_rows(None);
                let Some(row) = rows.iter().position(|id| id == node) else {
                    return;
                };
                let row = u32::try_from(row).unwrap_or(u32::MAX);
                let viewport = self.viewport();
                if row < self.offset {
                    self.offset = row;
                } else if row >= self.offset.saturating_add(viewport) {
                    self.offset = row + 1 - viewport;
                }
            }
        }
    }

    fn current(&self) -> Option<NodeId> {
        self.current
    }

    /// Re-roots at `path` when it is an existing directory outside the tree
    fn rebase(&mut self, path: &NavPath) -> bool {
        if path.starts_with(self.root_path()) || !path.to_native().is_dir() {
            return false;
        }
        self.set_root(path.clone());
        true
    }

    fn path_of(&self, node: &NodeId) -> NavPath {
        self.nodes[node.0].path.clone()
    }

    fn is_dir(&self, node: &NodeId) -> bool {
        self.nodes[node.0].is_dir
    }

    fn scroll_offset(&self) -> u32 {
        self.offset
    }
}

/// List `dir`; failures are logged and read as an empty directory
async fn read_listing(dir: &Path, filter: &ListingFilter) -> Vec<ListingEntry> {
    match list_dir(dir, filter).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("{:#}", e);
            Vec::new()
        }
    }
}

async fn list_dir(dir: &Path, filter: &ListingFilter) -> Result<Vec<ListingEntry>> {
    let mut read_dir = fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to list {}", dir.display()))?;

    let mut entries = Vec::new();
    while let Some(entry) = read_dir
        .next_entry()
        .await
        .with_context(|| format!("Failed to read entry in {}", dir.display()))?
    {
        let Ok(name) = entry.file_name().into_string() else {
            debug!("Skipping non-UTF-8 name in {}", dir.display());
            continue;
        };

        let file_type = match entry.file_type().await {
            Ok(file_type) => file_type,
            Err(e) => {
                debug!("Skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };
        let is_dir = if file_type.is_symlink() {
            fs::metadata(entry.path())
                .await
                .map(|meta| meta.is_dir())
                .unwrap_or(false)
        } else {
            file_type.is_dir()
        };

        if filter.accepts(&name, is_dir) {
            entries.push(ListingEntry { name, is_dir });
        }
    }

    sort_entries(&mut entries);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::{BreadcrumbSegment, NavigationState, Outcome, Panel, RetrySchedule};
    use crate::persist::PanelSide;
    use std::fs as stdfs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn library() -> TempDir {
        let dir = tempfile::Builder::new().prefix("twinpane").tempdir().unwrap();
        let album = dir.path().join("music").join("Album");
        stdfs::create_dir_all(&album).unwrap();
        stdfs::write(album.join("01 - Intro.flac"), b"").unwrap();
        stdfs::write(album.join("02 - Outro.MP3"), b"").unwrap();
        stdfs::write(album.join("notes.txt"), b"").unwrap();
        stdfs::create_dir_all(dir.path().join("podcasts")).unwrap();
        dir
    }

    fn root_of(dir: &TempDir) -> NavPath {
        NavPath::from_native(dir.path()).unwrap()
    }

    fn tree(dir: &TempDir, viewport_rows: u32) -> FsTree {
        FsTree::new(
            root_of(dir),
            FsTreeOptions {
                filter: ListingFilter::default(),
                viewport_rows,
                listing_parallelism: 2,
            },
        )
    }

    async fn resolve_eventually(tree: &mut FsTree, path: &NavPath) -> Option<NodeId> {
        for _ in 0..300 {
            if let Some(node) = tree.resolve(path) {
                return Some(node);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        None
    }

    #[test]
    fn test_filter_keeps_audio_and_dirs() {
        let filter = ListingFilter::default();
        assert!(filter.accepts("01 - Intro.flac", false));
        assert!(filter.accepts("Track.M4A", false));
        assert!(!filter.accepts("cover.jpg", false));
        assert!(!filter.accepts("README", false));
        assert!(filter.accepts("Album", true));
        assert!(!filter.accepts(".cache", true));
        assert!(!filter.accepts(".hidden.mp3", false));
    }

    #[test]
    fn test_filter_normalizes_extensions() {
        let filter = ListingFilter::new([".OGG", "", "wav"], true);
        assert!(filter.accepts("a.ogg", false));
        assert!(filter.accepts("b.WAV", false));
        assert!(filter.accepts(".dotfile.wav", false));

        let everything = ListingFilter::new(Vec::<String>::new(), false);
        assert!(everything.accepts("notes.txt", false));
    }

    #[test]
    fn test_sort_dirs_first_case_insensitive() {
        let mut entries = vec![
            ListingEntry { name: "b.mp3".into(), is_dir: false },
            ListingEntry { name: "Zeta".into(), is_dir: true },
            ListingEntry { name: "A.flac".into(), is_dir: false },
            ListingEntry { name: "alpha".into(), is_dir: true },
        ];
        sort_entries(&mut entries);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["alpha", "Zeta", "A.flac", "b.mp3"]);
    }

    #[tokio::test]
    async fn test_resolve_populates_in_background() {
        let dir = library();
        let mut tree = tree(&dir, 10);
        let track = root_of(&dir).join("music").join("Album").join("01 - Intro.flac");

        // Nothing is listed yet; the first call can only start the work
        assert!(tree.resolve(&track).is_none());
        assert!(tree.listings_in_flight() > 0);

        let node = resolve_eventually(&mut tree, &track).await.unwrap();
        assert_eq!(tree.path_of(&node), track);
        assert!(!tree.is_dir(&node));
        assert_eq!(tree.listings_in_flight(), 0);
    }

    #[tokio::test]
    async fn test_filtered_and_missing_entries_do_not_resolve() {
        let dir = library();
        let mut tree = tree(&dir, 10);
        let album = root_of(&dir).join("music").join("Album");

        resolve_eventually(&mut tree, &album.join("02 - Outro.MP3"))
            .await
            .unwrap();

        assert!(tree.resolve(&album.join("notes.txt")).is_none());
        assert!(tree.resolve(&album.join("03 - Missing.flac")).is_none());
        assert_eq!(tree.listings_in_flight(), 0);

        // Outside the tree root
        assert!(tree.resolve(&NavPath::parse("/definitely/elsewhere").unwrap()).is_none());
    }

    #[tokio::test]
    async fn test_scroll_extent_and_clamping() {
        let dir = tempfile::Builder::new().prefix("twinpane").tempdir().unwrap();
        let many = dir.path().join("a");
        stdfs::create_dir_all(&many).unwrap();
        stdfs::create_dir_all(dir.path().join("b")).unwrap();
        for i in 0..25 {
            stdfs::write(many.join(format!("x{:02}.mp3", i)), b"").unwrap();
        }

        let mut tree = tree(&dir, 10);
        let root = root_of(&dir);
        let last = resolve_eventually(&mut tree, &root.join("a").join("x24.mp3"))
            .await
            .unwrap();
        let folder = tree.resolve(&root.join("a")).unwrap();

        // Collapsed: just `a` and `b`
        assert_eq!(tree.visible_paths().len(), 2);
        tree.scroll_to(ScrollTarget::Offset(3));
        assert_eq!(tree.scroll_offset(), 0);

        // a, x00..x24, b once `a` is expanded
        assert_eq!(tree.max_scroll(&last), 17);
        tree.set_current(&last);
        assert_eq!(tree.visible_paths().len(), 27);

        tree.scroll_to(ScrollTarget::Offset(100));
        assert_eq!(tree.scroll_offset(), 17);
        tree.scroll_to(ScrollTarget::Offset(5));
        assert_eq!(tree.scroll_offset(), 5);

        tree.scroll_to(ScrollTarget::Reveal(&last));
        assert_eq!(tree.scroll_offset(), 16);
        tree.scroll_to(ScrollTarget::Reveal(&folder));
        assert_eq!(tree.scroll_offset(), 0);
    }

    #[tokio::test]
    async fn test_refresh_picks_up_new_entries() {
        let dir = library();
        let mut tree = tree(&dir, 10);
        let album = root_of(&dir).join("music").join("Album");
        resolve_eventually(&mut tree, &album.join("01 - Intro.flac"))
            .await
            .unwrap();

        stdfs::write(dir.path().join("music").join("Album").join("03 - New.ogg"), b"").unwrap();
        let new_track = album.join("03 - New.ogg");
        assert!(tree.resolve(&new_track).is_none());

        tree.refresh();
        assert!(tree.current().is_none());
        assert!(resolve_eventually(&mut tree, &new_track).await.is_some());
    }

    #[tokio::test]
    async fn test_filtered_dir_listing_is_not_kept() {
        let dir = tempfile::Builder::new().prefix("twinpane").tempdir().unwrap();
        stdfs::create_dir_all(dir.path().join(".hidden")).unwrap();
        stdfs::write(dir.path().join(".hidden").join("a.mp3"), b"").unwrap();

        let mut tree = tree(&dir, 10);
        let inside = root_of(&dir).join(".hidden").join("a.mp3");

        // Root and `.hidden` are listed together; the root listing filters `.hidden` out
        assert!(tree.resolve(&inside).is_none());
        for _ in 0..300 {
            if tree.listings_in_flight() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert!(tree.resolve(&inside).is_none());
        }
        assert_eq!(tree.listings_in_flight(), 0);
        assert!(tree.resolve(&inside).is_none());
        assert!(tree.staged.is_empty());
    }

    #[tokio::test]
    async fn test_breadcrumb_above_tree_root_reroots() {
        let dir = library();
        let root = root_of(&dir);
        let album = root.join("music").join("Album");
        let options = FsTreeOptions {
            filter: ListingFilter::new(DEFAULT_AUDIO_EXTENSIONS, true),
            viewport_rows: 10,
            listing_parallelism: 4,
        };
        let schedule = RetrySchedule::from_millis(&[0, 50, 2000]).unwrap();
        let mut panel = Panel::new(PanelSide::Left, FsTree::new(root.clone(), options), schedule);

        panel.select_eventually(&album.join("01 - Intro.flac")).await.unwrap();
        let crumbs = panel.breadcrumbs();
        assert_eq!(crumbs.len(), root.depth() + 3);

        // The filesystem root lies above the tree root
        let top = NavPath::root(root.root_kind());
        panel.on_breadcrumb_click(&crumbs[0]).unwrap();
        assert_eq!(panel.source().root_path(), &top);
        assert_eq!(panel.capture_state().selected_path, top);
        assert_eq!(panel.breadcrumbs().len(), 1);

        // Back down into the library once the new root's listings arrive
        panel.select_eventually(&album).await.unwrap();
        assert_eq!(panel.capture_state().selected_path, album);

        // A directory that does not exist is still not found
        let gone = BreadcrumbSegment {
            label: "gone".to_string(),
            cumulative_path: NavPath::parse("/twinpane-definitely-missing").unwrap(),
            ordinal: 1,
        };
        assert!(panel.on_breadcrumb_click(&gone).is_err());
        assert_eq!(panel.capture_state().selected_path, album);
    }

    #[tokio::test]
    async fn test_panel_restores_into_live_tree() {
        let dir = library();
        let root = root_of(&dir);
        let album = root.join("music").join("Album");
        let schedule = RetrySchedule::from_millis(&[0, 50, 2000]).unwrap();
        let mut panel = Panel::new(PanelSide::Left, tree(&dir, 2), schedule);

        panel.restore_state(NavigationState::new(album.join("02 - Outro.MP3"), 50), tokio::time::Instant::now());
        panel.settle().await;

        // Rows: music, Album, 01, 02, podcasts -> max offset 3 with two visible rows
        assert_eq!(
            panel.reconciler().last_outcome(),
            Some(&Outcome::Committed {
                path: album.join("02 - Outro.MP3"),
                offset: 3,
                clamped: true,
            })
        );
        assert_eq!(
            panel.capture_state(),
            NavigationState::new(album.join("02 - Outro.MP3"), 3)
        );
        let crumbs = panel.breadcrumbs();
        assert_eq!(crumbs.last().unwrap().cumulative_path, album);
    }
}

//! Deterministic in-memory source for engine tests

use super::{ScrollTarget, TreeSource};
use crate::nav::NavPath;

/// Mutation applied to a [`ScriptedSource`], in call order
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Mutation {
    SetCurrent(NavPath),
    ScrollOffset(u32),
    Reveal(NavPath),
}

struct ScriptedNode {
    path: NavPath,
    is_dir: bool,
    /// Number of `resolve` calls that miss before this node is known
    hidden_for: u32,
}

/// Source whose nodes appear after a scripted number of `resolve` calls
pub(crate) struct ScriptedSource {
    nodes: Vec<ScriptedNode>,
    resolve_calls: u32,
    pub max_scroll: u32,
    current: Option<usize>,
    offset: u32,
    pub mutations: Vec<Mutation>,
}

impl ScriptedSource {
    pub fn new(max_scroll: u32) -> Self {
        Self {
            nodes: Vec::new(),
            resolve_calls: 0,
            max_scroll,
            current: None,
            offset: 0,
            mutations: Vec::new(),
        }
    }

    /// Add a node known from the start
    pub fn with_dir(self, path: &str) -> Self {
        self.with_node(path, true, 0)
    }

    pub fn with_file(self, path: &str) -> Self {
        self.with_node(path, false, 0)
    }

    /// Add a node that stays unknown for the first `hidden_for` resolves
    pub fn with_node(mut self, path: &str, is_dir: bool, hidden_for: u32) -> Self {
        self.nodes.push(ScriptedNode {
            path: NavPath::parse(path).expect("scripted path must be absolute"),
            is_dir,
            hidden_for,
        });
        self
    }

    pub fn resolve_calls(&self) -> u32 {
        self.resolve_calls
    }
}

impl TreeSource for ScriptedSource {
    type Node = usize;

    fn resolve(&mut self, path: &NavPath) -> Option<usize> {
        self.resolve_calls += 1;
        let calls = self.resolve_calls;
        self.nodes
            .iter()
            .position(|n| &n.path == path && calls > n.hidden_for)
    }

    fn max_scroll(&self, _node: &usize) -> u32 {
        self.max_scroll
    }

    fn set_current(&mut self, node: &usize) {
        self.current = Some(*node);
        self.mutations
            .push(Mutation::SetCurrent(self.nodes[*node].path.clone()));
    }

    fn scroll_to(&mut self, target: ScrollTarget<&usize>) {
        match target {
            ScrollTarget::Offset(offset) => {
                self.offset = offset.min(self.max_scroll);
                self.mutations.push(Mutation::ScrollOffset(offset));
            }
            ScrollTarget::Reveal(node) => {
                self.mutations
                    .push(Mutation::Reveal(self.nodes[*node].path.clone()));
            }
        }
    }

    fn current(&self) -> Option<usize> {
        self.current
    }

    fn path_of(&self, node: &usize) -> NavPath {
        self.nodes[*node].path.clone()
    }

    fn is_dir(&self, node: &usize) -> bool {
        self.nodes[*node].is_dir
    }

    fn scroll_offset(&self) -> u32 {
        self.offset
    }
}

//! Hierarchy sources: anything that can answer label, parents and children
//! for a node id, plus the bounded traversals built on top of them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Hop limit for ancestor walks over untrusted data.
pub const MAX_HIERARCHY_DEPTH: usize = 100;

/// Children rendered before the rest are only counted.
pub const DEFAULT_CHILD_CAP: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildEntry {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildrenPage {
    pub children: Vec<ChildEntry>,
    /// Children past the cap.
    pub hidden: usize,
}

impl ChildrenPage {
    pub fn total(&self) -> usize {
        self.children.len() + self.hidden
    }
}

pub trait HierarchySource {
    fn contains(&self, id: &str) -> bool;

    fn label(&self, id: &str) -> Option<&str>;

    /// Parent ids in recorded order.
    fn parents(&self, id: &str) -> Vec<String>;

    /// Immediate children, sorted by [`sort_children`].
    fn children(&self, id: &str) -> Vec<ChildEntry>;

    fn children_page(&self, id: &str, cap: usize) -> ChildrenPage {
        page_children(self.children(id), cap)
    }
}

/// Case-insensitive label order, id as tiebreak.
pub fn sort_children(children: &mut [ChildEntry]) {
    children.sort_by_cached_key(|c| (c.label.to_lowercase(), c.id.clone()));
}

pub fn page_children(mut children: Vec<ChildEntry>, cap: usize) -> ChildrenPage {
    let hidden = children.len().saturating_sub(cap);
    children.truncate(cap);
    ChildrenPage { children, hidden }
}

/// Root-first chain ending at `id`, following the first parent at each level.
///
/// Stops at a node without parents, at a self-parent, at a revisit, or after
/// [`MAX_HIERARCHY_DEPTH`] hops.
pub fn first_parent_chain<S: HierarchySource + ?Sized>(source: &S, id: &str) -> Vec<String> {
    let mut chain = vec![id.to_string()];
    let mut seen: HashSet<String> = HashSet::from([id.to_string()]);
    let mut current = id.to_string();

    for _ in 0..MAX_HIERARCHY_DEPTH {
        let Some(parent) = source.parents(&current).into_iter().next() else {
            break;
        };
        if parent == current {
            break;
        }
        if !seen.insert(parent.clone()) {
            debug!(id, at = %parent, "cycle in hierarchy, chain stopped");
            break;
        }
        chain.push(parent.clone());
        current = parent;
    }
    chain.reverse();
    chain
}

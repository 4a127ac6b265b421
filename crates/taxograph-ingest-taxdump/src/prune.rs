//! Tree Pruner: pole pruning of the active tree for compact display.

use crate::active::ActiveTree;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Chooses the one child kept when pruning a node with several children.
pub trait BranchPolicy {
    fn name(&self) -> &'static str;

    /// Pick one of `children` (never empty).
    fn select<'a>(&self, tree: &ActiveTree, children: &'a BTreeSet<String>) -> Option<&'a str>;
}

/// Keep the child with the largest `epitope_sum`; ties go to the smallest id.
#[derive(Debug, Default, Clone, Copy)]
pub struct HighestSum;

impl BranchPolicy for HighestSum {
    fn name(&self) -> &'static str {
        "highest-sum"
    }

    fn select<'a>(&self, tree: &ActiveTree, children: &'a BTreeSet<String>) -> Option<&'a str> {
        let mut best: Option<(&'a str, u64)> = None;
        // BTreeSet iterates in id order, so a strict `>` keeps the smallest id on ties.
        for child in children {
            let sum = tree.get(child).map(|n| n.epitope_sum).unwrap_or(0);
            if best.map_or(true, |(_, s)| sum > s) {
                best = Some((child.as_str(), sum));
            }
        }
        best.map(|(id, _)| id)
    }
}

/// Keep the lexicographically smallest child id.
#[derive(Debug, Default, Clone, Copy)]
pub struct SmallestId;

impl BranchPolicy for SmallestId {
    fn name(&self) -> &'static str {
        "smallest-id"
    }

    fn select<'a>(&self, _tree: &ActiveTree, children: &'a BTreeSet<String>) -> Option<&'a str> {
        children.first().map(String::as_str)
    }
}

/// Named policy, for configuration files and command-line flags.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrunePolicy {
    #[default]
    HighestSum,
    SmallestId,
}

impl PrunePolicy {
    pub fn branch_policy(self) -> &'static dyn BranchPolicy {
        match self {
            PrunePolicy::HighestSum => &HighestSum,
            PrunePolicy::SmallestId => &SmallestId,
        }
    }
}

impl fmt::Display for PrunePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.branch_policy().name())
    }
}

impl FromStr for PrunePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "highest-sum" => Ok(PrunePolicy::HighestSum),
            "smallest-id" => Ok(PrunePolicy::SmallestId),
            other => Err(format!(
                "unknown prune policy `{other}` (expected highest-sum or smallest-id)"
            )),
        }
    }
}

/// Pole-prune `tree` starting at `root`.
///
/// While the current node has more than one child, keep only the child the
/// policy selects and continue into it. A node with a single child ends the
/// walk. Every node stays in the result; only `children` sets shrink.
pub fn prune_poles(tree: &ActiveTree, root: &str, policy: &dyn BranchPolicy) -> ActiveTree {
    let mut pruned = tree.clone();
    let mut visited: HashSet<String> = HashSet::new();
    let mut current = root.to_string();

    loop {
        if !visited.insert(current.clone()) {
            warn!(tax_id = %current, "cycle in active tree, pruning stopped");
            break;
        }
        let Some(node) = tree.get(&current) else {
            break;
        };
        if node.children.len() <= 1 {
            break;
        }
        let Some(kept) = policy.select(tree, &node.children) else {
            break;
        };
        let kept = kept.to_string();
        debug!(
            tax_id = %current,
            kept = %kept,
            dropped = node.children.len() - 1,
            policy = policy.name(),
            "pruned branches"
        );
        if let Some(entry) = pruned.get_mut(&current) {
            entry.children = BTreeSet::from([kept.clone()]);
        }
        current = kept;
    }
    pruned
}

//! Weight Aggregator: the active subtree (weighted nodes plus all their
//! ancestors) with own and aggregate weights.

use crate::dump::NodeRecord;
use crate::names::NameIndex;
use crate::weights::Weights;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use taxograph_model::vocab::taxon_curie;
use taxograph_model::TreeRow;
use tracing::{debug, warn};

/// `tax_id → parent_tax_id` for every node in the dump.
#[derive(Debug, Default, Clone)]
pub struct ParentMap {
    parents: HashMap<String, String>,
}

impl ParentMap {
    pub fn from_nodes(nodes: &[NodeRecord]) -> Self {
        nodes
            .iter()
            .map(|n| (n.tax_id.clone(), n.parent_tax_id.clone()))
            .collect()
    }

    pub fn parent(&self, tax_id: &str) -> Option<&str> {
        self.parents.get(tax_id).map(String::as_str)
    }

    pub fn contains(&self, tax_id: &str) -> bool {
        self.parents.contains_key(tax_id)
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

impl FromIterator<(String, String)> for ParentMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            parents: iter.into_iter().collect(),
        }
    }
}

/// The node itself followed by its ancestors, nearest first.
///
/// The walk ends at a self-parented root, at an empty parent, or when it
/// would revisit a node. Returns `None` when `tax_id` is not in the parent
/// map or when any parent along the way is missing from it.
pub fn ancestor_chain(parents: &ParentMap, tax_id: &str) -> Option<Vec<String>> {
    let mut current = tax_id;
    let mut parent = parents.parent(current)?;
    let mut chain = vec![current.to_string()];
    let mut seen: HashSet<&str> = HashSet::from([current]);

    loop {
        if parent.is_empty() || parent == current {
            break;
        }
        let Some(next_parent) = parents.parent(parent) else {
            debug!(tax_id, missing = %parent, "unresolvable parent in ancestor walk");
            return None;
        };
        if !seen.insert(parent) {
            warn!(tax_id, at = %parent, "cycle in parent map, ancestor walk stopped");
            break;
        }
        chain.push(parent.to_string());
        current = parent;
        parent = next_parent;
    }
    Some(chain)
}

/// One entry of the active tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub tax_id: String,
    pub label: String,
    /// The single active parent; `None` at the top of the tree.
    pub parent: Option<String>,
    /// Listed in the dump as its own parent (the taxonomy root).
    pub self_parented: bool,
    pub children: BTreeSet<String>,
    pub epitope_count: u64,
    pub epitope_sum: u64,
}

impl TreeNode {
    fn new(tax_id: &str) -> Self {
        Self {
            tax_id: tax_id.to_string(),
            label: String::new(),
            parent: None,
            self_parented: false,
            children: BTreeSet::new(),
            epitope_count: 0,
            epitope_sum: 0,
        }
    }

    pub fn to_row(&self) -> TreeRow {
        TreeRow {
            id: taxon_curie(&self.tax_id),
            label: self.label.clone(),
            parents: self
                .parent
                .as_deref()
                .or(self.self_parented.then_some(self.tax_id.as_str()))
                .map(taxon_curie)
                .into_iter()
                .collect(),
            children: self.children.iter().map(|c| taxon_curie(c)).collect(),
            epitope_count: self.epitope_count,
            epitope_sum: self.epitope_sum,
        }
    }
}

fn saturating_weight(total: u64, weight: u64, tax_id: &str) -> u64 {
    total.checked_add(weight).unwrap_or_else(|| {
        warn!(tax_id, total, weight, "weight overflow, saturating at u64::MAX");
        u64::MAX
    })
}

/// The active subtree, keyed and iterated by tax_id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveTree {
    nodes: BTreeMap<String, TreeNode>,
}

impl ActiveTree {
    /// Add each weighted node's weight to every node on its ancestor chain.
    ///
    /// Weighted ids whose chain cannot be resolved up to a root are left out.
    /// Sums saturate at `u64::MAX`. The result does not depend on the
    /// iteration order of `weights`.
    pub fn build(parents: &ParentMap, weights: &Weights) -> Self {
        let mut tree = Self::default();
        for (tax_id, &weight) in weights {
            let Some(chain) = ancestor_chain(parents, tax_id) else {
                debug!(tax_id = %tax_id, weight, "weighted node has no resolvable ancestry, excluded");
                continue;
            };
            tree.add_chain(&chain, weight);
            if let Some(top) = chain.last() {
                if parents.parent(top) == Some(top.as_str()) {
                    if let Some(node) = tree.nodes.get_mut(top) {
                        node.self_parented = true;
                    }
                }
            }
        }
        tree
    }

    fn add_chain(&mut self, chain: &[String], weight: u64) {
        for (i, tax_id) in chain.iter().enumerate() {
            let node = self
                .nodes
                .entry(tax_id.clone())
                .or_insert_with(|| TreeNode::new(tax_id));
            node.epitope_sum = saturating_weight(node.epitope_sum, weight, tax_id);
            if i == 0 {
                node.epitope_count = saturating_weight(node.epitope_count, weight, tax_id);
            }
            if let Some(parent) = chain.get(i + 1) {
                node.parent = Some(parent.clone());
            }
            if i > 0 {
                node.children.insert(chain[i - 1].clone());
            }
        }
    }

    pub fn get(&self, tax_id: &str) -> Option<&TreeNode> {
        self.nodes.get(tax_id)
    }

    pub(crate) fn get_mut(&mut self, tax_id: &str) -> Option<&mut TreeNode> {
        self.nodes.get_mut(tax_id)
    }

    pub fn contains(&self, tax_id: &str) -> bool {
        self.nodes.contains_key(tax_id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.values()
    }

    /// Set display labels; nodes without a label fall back to their tax_id.
    pub fn apply_labels(&mut self, names: &NameIndex) {
        for node in self.nodes.values_mut() {
            node.label = match names.label(&node.tax_id) {
                Some(label) => label.to_string(),
                None => {
                    warn!(tax_id = %node.tax_id, "no scientific name, using tax_id as label");
                    node.tax_id.clone()
                }
            };
        }
    }

    pub fn to_rows(&self) -> Vec<TreeRow> {
        self.iter().map(TreeNode::to_row).collect()
    }
}

//! Taxonomy dump ingestion for Taxograph.
//!
//! Converts an extracted NCBI-style taxonomy dump plus a per-node weight
//! mapping into three tables:
//!
//! - `1_active.tsv`: weighted nodes and all their ancestors, with own and
//!   aggregate weights;
//! - `2_pruned.tsv`: the same nodes after pole pruning;
//! - `statements.tsv`: the statement rows for every in-scope node.
//!
//! Any fatal error aborts the run before an output file is put in place.

pub mod active;
pub mod dump;
pub mod error;
pub mod generate;
pub mod names;
pub mod prune;
pub mod weights;

pub use active::{ancestor_chain, ActiveTree, ParentMap, TreeNode};
pub use dump::{NameRecord, NodeRecord, TaxDump};
pub use error::TaxdumpError;
pub use generate::{NodeExtras, StatementGenerator};
pub use names::{NameIndex, Synonym};
pub use prune::{prune_poles, BranchPolicy, HighestSum, PrunePolicy, SmallestId};
pub use weights::{count_weights, read_weights, write_weights, RecordCountSpec, Weights};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use taxograph_model::vocab::{BROWSER_IRI_BASE, BROWSER_LINK, ROOT_TAX_ID};
use taxograph_model::{write_statement, write_statement_header, write_tree_rows};
use tracing::{info, warn};

pub const ACTIVE_TABLE: &str = "1_active.tsv";
pub const PRUNED_TABLE: &str = "2_pruned.tsv";
pub const STATEMENTS_TABLE: &str = "statements.tsv";

// ============================================================================
// Options
// ============================================================================

/// Conversion settings. Every field has a default, so a JSON options file
/// only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    pub root: String,
    pub prune_policy: PrunePolicy,
    /// Emit `oio:hasAlternativeId` rows from `merged.dmp`.
    pub include_merged: bool,
    /// Emit `PMID:` cross-references from `citations.dmp`.
    pub include_citations: bool,
    pub browser_link: String,
    pub browser_iri_base: String,
    /// Used when weights are counted from a record table.
    pub records: RecordCountSpec,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            root: ROOT_TAX_ID.to_string(),
            prune_policy: PrunePolicy::default(),
            include_merged: false,
            include_citations: false,
            browser_link: BROWSER_LINK.to_string(),
            browser_iri_base: BROWSER_IRI_BASE.to_string(),
            records: RecordCountSpec::default(),
        }
    }
}

impl ConvertOptions {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read options file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("invalid options file {}", path.display()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertSummary {
    pub dump_nodes: usize,
    pub weighted_nodes: usize,
    pub active_nodes: usize,
    pub statement_nodes: usize,
    pub statements: usize,
    pub outputs: Vec<PathBuf>,
}

// ============================================================================
// Staged output
// ============================================================================

/// An output written next to its final path and renamed into place on commit.
struct StagedFile {
    tmp: PathBuf,
    path: PathBuf,
    writer: BufWriter<File>,
}

impl StagedFile {
    fn create(dir: &Path, name: &str) -> Result<Self> {
        let path = dir.join(name);
        let tmp = staged_path(&path);
        let file = File::create(&tmp)
            .with_context(|| format!("failed to create {}", tmp.display()))?;
        Ok(Self {
            tmp,
            path,
            writer: BufWriter::new(file),
        })
    }

    fn finish(mut self) -> Result<(PathBuf, PathBuf)> {
        self.writer
            .flush()
            .with_context(|| format!("failed to write {}", self.tmp.display()))?;
        Ok((self.tmp, self.path))
    }
}

fn commit(staged: Vec<(PathBuf, PathBuf)>) -> Result<Vec<PathBuf>> {
    let mut done = Vec::with_capacity(staged.len());
    for (tmp, path) in staged {
        fs::rename(&tmp, &path)
            .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
        done.push(path);
    }
    Ok(done)
}

/// Remove whatever staged files a failed run left behind.
fn discard(outdir: &Path) {
    for name in [ACTIVE_TABLE, PRUNED_TABLE, STATEMENTS_TABLE] {
        let _ = fs::remove_file(staged_path(&outdir.join(name)));
    }
}

fn staged_path(path: &Path) -> PathBuf {
    path.with_extension("tsv.tmp")
}

// ============================================================================
// Pipeline
// ============================================================================

/// Run the full conversion of `dump` with `weights` into `outdir`.
///
/// With non-empty weights, only active nodes get names and statements;
/// with empty weights every dump node does.
pub fn convert(
    dump: &TaxDump,
    weights: &Weights,
    outdir: &Path,
    options: &ConvertOptions,
) -> Result<ConvertSummary> {
    fs::create_dir_all(outdir)
        .with_context(|| format!("failed to create output directory {}", outdir.display()))?;

    let mut staged = Vec::new();
    let result = run(dump, weights, outdir, options, &mut staged);
    match result {
        Ok(mut summary) => {
            summary.outputs = commit(staged)?;
            info!(
                active = summary.active_nodes,
                statements = summary.statements,
                outdir = %outdir.display(),
                "conversion finished"
            );
            Ok(summary)
        }
        Err(err) => {
            discard(outdir);
            Err(err)
        }
    }
}

fn in_scope(tree: &ActiveTree, scoped: bool, tax_id: &str) -> bool {
    !scoped || tree.contains(tax_id)
}

fn run(
    dump: &TaxDump,
    weights: &Weights,
    outdir: &Path,
    options: &ConvertOptions,
    staged: &mut Vec<(PathBuf, PathBuf)>,
) -> Result<ConvertSummary> {
    let nodes = dump.nodes()?;
    let parents = ParentMap::from_nodes(&nodes);
    info!(nodes = nodes.len(), "read node records");

    let mut tree = ActiveTree::build(&parents, weights);
    info!(
        weighted = weights.len(),
        active = tree.len(),
        "built active tree"
    );

    let scoped = !weights.is_empty();
    let names = NameIndex::build(dump.names(|id| in_scope(&tree, scoped, id))?);
    info!(labels = names.label_count(), "read names");

    let merged = if options.include_merged {
        dump.merged()?
    } else {
        HashMap::new()
    };
    let citations = if options.include_citations {
        dump.citations(|id| in_scope(&tree, scoped, id))?
    } else {
        HashMap::new()
    };

    tree.apply_labels(&names);
    let mut active = StagedFile::create(outdir, ACTIVE_TABLE)?;
    write_tree_rows(&mut active.writer, &tree.to_rows())?;
    staged.push(active.finish()?);

    let pruned_tree = prune_poles(&tree, &options.root, options.prune_policy.branch_policy());
    let mut pruned = StagedFile::create(outdir, PRUNED_TABLE)?;
    write_tree_rows(&mut pruned.writer, &pruned_tree.to_rows())?;
    staged.push(pruned.finish()?);

    let mut generator = StatementGenerator::new(&options.browser_link, &options.browser_iri_base);
    let mut statements = StagedFile::create(outdir, STATEMENTS_TABLE)?;
    write_statement_header(&mut statements.writer)?;

    let mut summary = ConvertSummary {
        dump_nodes: nodes.len(),
        weighted_nodes: weights.len(),
        active_nodes: tree.len(),
        ..ConvertSummary::default()
    };
    let mut seen: HashSet<&str> = HashSet::new();
    for node in &nodes {
        let tax_id = node.tax_id.as_str();
        if !in_scope(&tree, scoped, tax_id) || !seen.insert(tax_id) {
            continue;
        }
        let label = match names.label(tax_id) {
            Some(label) => label,
            None => {
                // Active nodes were already reported by `apply_labels`.
                if !tree.contains(tax_id) {
                    warn!(tax_id, "no scientific name, using tax_id as label");
                }
                tax_id
            }
        };
        let extras = NodeExtras {
            merged: merged.get(tax_id).map(Vec::as_slice).unwrap_or(&[]),
            citations: citations.get(tax_id).map(Vec::as_slice).unwrap_or(&[]),
            synonyms: names.synonyms(tax_id),
        };
        for row in generator.node_statements(node, label, extras) {
            write_statement(&mut statements.writer, &row)?;
            summary.statements += 1;
        }
        summary.statement_nodes += 1;
    }
    staged.push(statements.finish()?);

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_fill_missing_fields_with_defaults() {
        let options: ConvertOptions =
            serde_json::from_str(r#"{"prune_policy": "smallest-id", "include_merged": true}"#)
                .unwrap();
        assert_eq!(options.prune_policy, PrunePolicy::SmallestId);
        assert!(options.include_merged);
        assert!(!options.include_citations);
        assert_eq!(options.root, "1");
        assert_eq!(options.records, RecordCountSpec::default());
    }
}

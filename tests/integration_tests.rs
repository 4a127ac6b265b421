//! Integration tests for the complete Taxograph pipeline
//!
//! These tests verify end-to-end functionality across crates:
//! - Taxonomy dump + weights → active/pruned/statement tables
//! - Statement table → Statement Store → term views
//! - Record table → counted weights → conversion
//!
//! Run with: cargo test --test integration_tests

use std::fs;
use std::path::Path;
use taxograph_ingest_taxdump::{
    convert, count_weights, ConvertOptions, PrunePolicy, RecordCountSpec, TaxDump, Weights,
    ACTIVE_TABLE, PRUNED_TABLE, STATEMENTS_TABLE,
};
use taxograph_model::vocab::{OIO_HAS_EXACT_SYNONYM, OIO_HAS_SYNONYM_TYPE, RDFS_SUBCLASS_OF};
use taxograph_store::{PrefixMap, Renderer, StatementStore, TermView, TreeTable, ValueView};
use tempfile::tempdir;

const NODES: &str = "\
1\t|\t1\t|\tno rank\t|\t\t|\t8\t|\t0\t|\t1\t|
2\t|\t1\t|\tsuperkingdom\t|\t\t|\t0\t|\t0\t|\t11\t|
561\t|\t2\t|\tgenus\t|\t\t|\t0\t|\t1\t|\t11\t|
562\t|\t561\t|\tspecies\t|\t\t|\t0\t|\t1\t|\t11\t|
620\t|\t2\t|\tgenus\t|\t\t|\t0\t|\t1\t|\t11\t|
2759\t|\t1\t|\tsuperkingdom\t|\t\t|\t1\t|\t0\t|\t1\t|
9606\t|\t2759\t|\tspecies\t|\t\t|\t5\t|\t1\t|\t1\t|
";

const NAMES: &str = "\
1\t|\troot\t|\t\t|\tscientific name\t|
2\t|\tBacteria\t|\tBacteria <bacteria>\t|\tscientific name\t|
561\t|\tEscherichia\t|\t\t|\tscientific name\t|
562\t|\tEscherichia coli\t|\t\t|\tscientific name\t|
562\t|\tE. coli\t|\t\t|\tcommon name\t|
562\t|\tBacterium coli\t|\t\t|\tsynonym\t|
620\t|\tShigella\t|\t\t|\tscientific name\t|
2759\t|\tEukaryota\t|\t\t|\tscientific name\t|
9606\t|\tHomo sapiens\t|\t\t|\tscientific name\t|
9606\t|\thuman\t|\t\t|\tgenbank common name\t|
";

fn write_dump(dir: &Path) -> TaxDump {
    fs::write(dir.join("nodes.dmp"), NODES).unwrap();
    fs::write(dir.join("names.dmp"), NAMES).unwrap();
    TaxDump::open(dir).unwrap()
}

fn weights(pairs: &[(&str, u64)]) -> Weights {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

// ============================================================================
// Conversion → store → renderer
// ============================================================================

#[test]
fn test_converted_statements_render_as_term_pages() {
    let dump_dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    let dump = write_dump(dump_dir.path());

    convert(
        &dump,
        &weights(&[("562", 4), ("620", 1), ("9606", 2)]),
        out.path(),
        &ConvertOptions::default(),
    )
    .unwrap();

    let store = StatementStore::load(&out.path().join(STATEMENTS_TABLE)).unwrap();
    let prefixes = PrefixMap::default();
    let renderer = Renderer::new(&store, &prefixes);

    let view = renderer.render("NCBITaxon:562");
    let page = view.page().expect("E. coli should be found");
    assert_eq!(page.label, "Escherichia coli");
    let chain: Vec<&str> = page
        .hierarchy
        .as_ref()
        .unwrap()
        .flatten()
        .iter()
        .map(|l| l.id.as_str())
        .collect();
    assert_eq!(
        chain,
        vec!["NCBITaxon:1", "NCBITaxon:2", "NCBITaxon:561", "NCBITaxon:562"]
    );

    // Both recognised synonyms carry exactly one annotation bundle.
    let synonyms = page
        .properties
        .iter()
        .filter(|g| g.predicate.id.starts_with("oio:has") && g.predicate.id.ends_with("Synonym"))
        .flat_map(|g| g.values.iter())
        .collect::<Vec<_>>();
    assert_eq!(synonyms.len(), 2);
    for value in synonyms {
        assert_eq!(value.annotations.len(), 1);
        assert_eq!(
            value.annotations[0].properties[0].predicate.id,
            OIO_HAS_SYNONYM_TYPE
        );
    }
    let exact = page
        .properties
        .iter()
        .find(|g| g.predicate.id == OIO_HAS_EXACT_SYNONYM)
        .unwrap();
    assert_eq!(
        exact.values[0].value,
        ValueView::Literal {
            value: "E. coli".into(),
            datatype: None,
            language: None,
        }
    );

    // The store's own subclass rows list Bacteria's children by label.
    let bacteria = renderer.render("NCBITaxon:2");
    let children: Vec<&str> = bacteria
        .page()
        .unwrap()
        .children
        .children
        .iter()
        .map(|l| l.label.as_str())
        .collect();
    assert_eq!(children, vec!["Escherichia", "Shigella"]);

    assert!(matches!(
        renderer.render("NCBITaxon:12345"),
        TermView::NotFound { .. }
    ));
}

#[test]
fn test_pruned_tree_drives_children_listing() {
    let dump_dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    let dump = write_dump(dump_dir.path());

    convert(
        &dump,
        &weights(&[("562", 4), ("620", 1), ("9606", 2)]),
        out.path(),
        &ConvertOptions::default(),
    )
    .unwrap();

    let store = StatementStore::load(&out.path().join(STATEMENTS_TABLE)).unwrap();
    let active = TreeTable::load(&out.path().join(ACTIVE_TABLE)).unwrap();
    let pruned = TreeTable::load(&out.path().join(PRUNED_TABLE)).unwrap();
    assert_eq!(active.len(), pruned.len());

    let prefixes = PrefixMap::default();
    let renderer = Renderer::new(&store, &prefixes);
    let child_ids = |view: TermView| -> Vec<String> {
        view.page()
            .unwrap()
            .children
            .children
            .iter()
            .map(|l| l.id.clone())
            .collect()
    };

    assert_eq!(
        child_ids(renderer.render_with("NCBITaxon:1", &active)),
        vec!["NCBITaxon:2", "NCBITaxon:2759"]
    );
    // Bacteria (sum 5) beats Eukaryota (sum 2) at the root, then
    // Escherichia (sum 4) beats Shigella (sum 1).
    assert_eq!(
        child_ids(renderer.render_with("NCBITaxon:1", &pruned)),
        vec!["NCBITaxon:2"]
    );
    assert_eq!(
        child_ids(renderer.render_with("NCBITaxon:2", &pruned)),
        vec!["NCBITaxon:561"]
    );

    // With Shigella outweighing Escherichia the policies disagree below
    // Bacteria.
    let heavy_shigella = weights(&[("562", 1), ("620", 4), ("9606", 2)]);
    let by_sum = tempdir().unwrap();
    convert(&dump, &heavy_shigella, by_sum.path(), &ConvertOptions::default()).unwrap();
    let pruned = TreeTable::load(&by_sum.path().join(PRUNED_TABLE)).unwrap();
    assert_eq!(
        child_ids(renderer.render_with("NCBITaxon:2", &pruned)),
        vec!["NCBITaxon:620"]
    );

    let by_id = tempdir().unwrap();
    let options = ConvertOptions {
        prune_policy: PrunePolicy::SmallestId,
        ..ConvertOptions::default()
    };
    convert(&dump, &heavy_shigella, by_id.path(), &options).unwrap();
    let pruned = TreeTable::load(&by_id.path().join(PRUNED_TABLE)).unwrap();
    assert_eq!(
        child_ids(renderer.render_with("NCBITaxon:1", &pruned)),
        vec!["NCBITaxon:2"]
    );
    assert_eq!(
        child_ids(renderer.render_with("NCBITaxon:2", &pruned)),
        vec!["NCBITaxon:561"]
    );
}

#[test]
fn test_ancestor_edges_follow_generated_subclass_rows() {
    let dump_dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    let dump = write_dump(dump_dir.path());
    convert(&dump, &Weights::new(), out.path(), &ConvertOptions::default()).unwrap();

    let store = StatementStore::load(&out.path().join(STATEMENTS_TABLE)).unwrap();
    assert_eq!(store.stanza_count(), 7);

    let edges = store.ancestors("NCBITaxon:9606");
    let pairs: Vec<(&str, &str)> = edges
        .iter()
        .map(|e| (e.child.as_str(), e.parent.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("NCBITaxon:9606", "NCBITaxon:2759"),
            ("NCBITaxon:2759", "NCBITaxon:1"),
        ]
    );
    // The root's self-parent is never written.
    assert!(store.matching("NCBITaxon:1", RDFS_SUBCLASS_OF).is_empty());
}

// ============================================================================
// Record counting → conversion
// ============================================================================

#[test]
fn test_counted_weights_feed_conversion() {
    let records = "epitope_id\torganism_id\torganism2_id\n\
                   E1\t562\t\n\
                   E2\t\t562\n\
                   E3\t9606\t\n\
                   \t620\t\n";
    let weights = count_weights(records.as_bytes(), "records.tsv", &RecordCountSpec::default())
        .unwrap();
    assert_eq!(weights.get("562"), Some(&2));
    assert_eq!(weights.get("9606"), Some(&1));
    assert_eq!(weights.get("620"), None);

    let dump_dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    let dump = write_dump(dump_dir.path());
    let summary = convert(&dump, &weights, out.path(), &ConvertOptions::default()).unwrap();
    // 562 brings 561, 2, 1; 9606 brings 2759.
    assert_eq!(summary.active_nodes, 6);

    let active = TreeTable::load(&out.path().join(ACTIVE_TABLE)).unwrap();
    assert!(active.get("NCBITaxon:620").is_none());
    assert_eq!(active.get("NCBITaxon:1").unwrap().epitope_sum, 3);
}

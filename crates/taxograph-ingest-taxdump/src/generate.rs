//! Statement Generator: the canonical statement rows for one taxonomy node.

use crate::dump::NodeRecord;
use crate::names::Synonym;
use std::collections::HashSet;
use taxograph_model::digest::blank_node_id;
use taxograph_model::vocab::{
    label_to_id, taxon_curie, BROWSER_IRI_BASE, BROWSER_LINK, LEGACY_IRI_RANKS,
    LEGACY_RANK_IRI_BASE, NCBITAXON_HAS_RANK, OBO_NAMESPACE, OIO_HAS_ALTERNATIVE_ID,
    OIO_HAS_BROAD_SYNONYM, OIO_HAS_DBXREF, OIO_HAS_EXACT_SYNONYM, OIO_HAS_OBO_NAMESPACE,
    OIO_HAS_RELATED_SYNONYM, OIO_HAS_SYNONYM_TYPE, OWL_ANNOTATED_PROPERTY, OWL_ANNOTATED_SOURCE,
    OWL_ANNOTATED_TARGET, OWL_AXIOM, OWL_CLASS, RDFS_LABEL, RDFS_SUBCLASS_OF, RDF_TYPE,
};
use taxograph_model::{assign_stanza_keys, Literal, Object, Statement};
use tracing::warn;

pub const NO_RANK: &str = "no rank";

pub const KNOWN_RANKS: [&str; 33] = [
    "class",
    "cohort",
    "family",
    "forma",
    "genus",
    "infraclass",
    "infraorder",
    "kingdom",
    "order",
    "parvorder",
    "phylum",
    "section",
    "series",
    "species group",
    "species subgroup",
    "species",
    "subclass",
    "subcohort",
    "subfamily",
    "subgenus",
    "subkingdom",
    "suborder",
    "subphylum",
    "subsection",
    "subspecies",
    "subtribe",
    "superclass",
    "superfamily",
    "superkingdom",
    "superorder",
    "superphylum",
    "tribe",
    "varietas",
];

/// Synonym predicate for a name class; `None` drops the synonym.
pub fn synonym_predicate(name_class: &str) -> Option<&'static str> {
    match name_class {
        "acronym" | "genbank acronym" => Some(OIO_HAS_BROAD_SYNONYM),
        "anamorph" | "blast name" | "genbank anamorph" | "genbank synonym" | "in-part"
        | "misnomer" | "misspelling" | "synonym" | "teleomorph" => Some(OIO_HAS_RELATED_SYNONYM),
        "common name" | "equivalent name" | "genbank common name" | "scientific name" => {
            Some(OIO_HAS_EXACT_SYNONYM)
        }
        _ => None,
    }
}

/// Escape embedded double quotes in literal text.
pub fn escape_literal(text: &str) -> String {
    text.replace('"', "\\\"")
}

/// Per-node inputs beyond the node record itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct NodeExtras<'a> {
    pub merged: &'a [String],
    pub citations: &'a [String],
    pub synonyms: &'a [Synonym],
}

#[derive(Debug)]
pub struct StatementGenerator {
    browser_link: String,
    browser_iri_base: String,
    warned_ranks: HashSet<String>,
}

impl Default for StatementGenerator {
    fn default() -> Self {
        Self::new(BROWSER_LINK, BROWSER_IRI_BASE)
    }
}

impl StatementGenerator {
    pub fn new(browser_link: impl Into<String>, browser_iri_base: impl Into<String>) -> Self {
        Self {
            browser_link: browser_link.into(),
            browser_iri_base: browser_iri_base.into(),
            warned_ranks: HashSet::new(),
        }
    }

    /// All rows for one node, stanza keys assigned.
    pub fn node_statements(
        &mut self,
        node: &NodeRecord,
        label: &str,
        extras: NodeExtras<'_>,
    ) -> Vec<Statement> {
        let tax_id = node.tax_id.as_str();
        let sc = taxon_curie(tax_id);
        let mut rows = vec![
            Statement::curie(&sc, RDF_TYPE, Object::Curie(OWL_CLASS.to_string())),
            Statement::curie(
                &sc,
                RDFS_LABEL,
                Object::Literal(Literal::string(escape_literal(label))),
            ),
            Statement::curie(
                &sc,
                &self.browser_link,
                Object::Iri(format!("{}{tax_id}", self.browser_iri_base)),
            ),
        ];

        let parent = node.parent_tax_id.as_str();
        if !parent.is_empty() && parent != tax_id {
            rows.push(Statement::curie(
                &sc,
                RDFS_SUBCLASS_OF,
                Object::Curie(taxon_curie(parent)),
            ));
        }

        if let Some(rank) = self.rank_object(&node.rank, tax_id) {
            rows.push(Statement::curie(&sc, NCBITAXON_HAS_RANK, rank));
        }

        if let Some(gc_id) = &node.genetic_code_id {
            rows.push(Statement::curie(
                &sc,
                OIO_HAS_DBXREF,
                Object::Literal(Literal::string(format!("GC_ID:{gc_id}"))),
            ));
        }

        for old in extras.merged {
            rows.push(Statement::curie(
                &sc,
                OIO_HAS_ALTERNATIVE_ID,
                Object::Literal(Literal::string(taxon_curie(old))),
            ));
        }

        for pubmed_id in extras.citations {
            rows.push(Statement::curie(
                &sc,
                OIO_HAS_DBXREF,
                Object::Literal(Literal::string(format!("PMID:{pubmed_id}"))),
            ));
        }

        rows.push(Statement::curie(
            &sc,
            OIO_HAS_OBO_NAMESPACE,
            Object::Literal(Literal::string(OBO_NAMESPACE)),
        ));

        rows.extend(synonym_statements(tax_id, extras.synonyms));
        assign_stanza_keys(&mut rows);
        rows
    }

    fn rank_object(&mut self, rank: &str, tax_id: &str) -> Option<Object> {
        if rank.is_empty() || rank == NO_RANK {
            return None;
        }
        if !KNOWN_RANKS.contains(&rank) && self.warned_ranks.insert(rank.to_string()) {
            warn!(rank, tax_id, "unrecognized rank");
        }
        let rank_id = label_to_id(rank);
        Some(if LEGACY_IRI_RANKS.contains(&rank_id.as_str()) {
            Object::Iri(format!("{LEGACY_RANK_IRI_BASE}{rank_id}"))
        } else {
            Object::Curie(taxon_curie(&rank_id))
        })
    }
}

/// Main synonym rows, each followed by its reified `owl:Axiom` bundle.
///
/// Synonyms whose name class has no predicate produce no rows.
pub fn synonym_statements(tax_id: &str, synonyms: &[Synonym]) -> Vec<Statement> {
    let sc = taxon_curie(tax_id);
    let mut rows = Vec::new();
    for (ordinal, synonym) in synonyms.iter().enumerate() {
        let Some(predicate) = synonym_predicate(&synonym.name_class) else {
            continue;
        };
        let text = escape_literal(&synonym.text);
        let bnode = blank_node_id(&[
            tax_id,
            &ordinal.to_string(),
            predicate,
            &text,
            &synonym.name_class,
        ]);
        let synonym_type = format!("ncbitaxon:{}", label_to_id(&synonym.name_class));

        rows.push(Statement::curie(
            &sc,
            predicate,
            Object::Literal(Literal::plain(text.clone())),
        ));
        rows.push(Statement::blank(
            &bnode,
            RDF_TYPE,
            Object::Curie(OWL_AXIOM.to_string()),
        ));
        rows.push(Statement::blank(
            &bnode,
            OWL_ANNOTATED_SOURCE,
            Object::Curie(sc.clone()),
        ));
        rows.push(Statement::blank(
            &bnode,
            OWL_ANNOTATED_PROPERTY,
            Object::Curie(predicate.to_string()),
        ));
        rows.push(Statement::blank(
            &bnode,
            OWL_ANNOTATED_TARGET,
            Object::Literal(Literal::string(text)),
        ));
        rows.push(Statement::blank(
            &bnode,
            OIO_HAS_SYNONYM_TYPE,
            Object::Curie(synonym_type),
        ));
    }
    rows
}

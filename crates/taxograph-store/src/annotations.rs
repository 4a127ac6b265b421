//! Reified annotation bundles (`owl:Axiom` blank nodes) and the base rows
//! they annotate.

use crate::store::{RowId, StatementStore};
use std::collections::HashSet;
use taxograph_model::vocab::{
    OWL_ANNOTATED_PROPERTY, OWL_ANNOTATED_SOURCE, OWL_ANNOTATED_TARGET, OWL_AXIOM, RDF_TYPE,
};
use taxograph_model::{Object, Statement, Subject};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationBundle {
    pub bnode: String,
    pub source: Option<String>,
    pub property: Option<String>,
    pub target: Option<Object>,
    /// Rows beyond type/source/property/target, e.g. a synonym type.
    pub extra: Vec<RowId>,
    /// The base row `(source, property, target)`, when it exists.
    pub annotates: Option<RowId>,
}

impl AnnotationBundle {
    fn new(bnode: &str) -> Self {
        Self {
            bnode: bnode.to_string(),
            source: None,
            property: None,
            target: None,
            extra: Vec::new(),
            annotates: None,
        }
    }
}

/// Every `owl:Axiom` bundle filed under stanza `zn`, in order of first row.
///
/// A bundle is bound to the base row written just before its
/// `rdf:type owl:Axiom` row when that row carries the same source, property
/// and target. Otherwise it takes the first matching row no other bundle
/// has claimed. No row is annotated by two bundles.
pub fn stanza_bundles(store: &StatementStore, zn: &str) -> Vec<AnnotationBundle> {
    let rows = store.stanza(zn);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut typed: Vec<(RowId, AnnotationBundle)> = rows
        .iter()
        .filter_map(|(id, row)| match (&row.subject, &row.object) {
            (Subject::Blank(bnode), Object::Curie(class))
                if row.predicate == RDF_TYPE && class == OWL_AXIOM && seen.insert(bnode) =>
            {
                Some((*id, AnnotationBundle::new(bnode)))
            }
            _ => None,
        })
        .collect();

    for (_, bundle) in &mut typed {
        for (id, row) in &rows {
            if row.subject.as_str() != bundle.bnode || !row.subject.is_blank() {
                continue;
            }
            match row.predicate.as_str() {
                RDF_TYPE => {}
                OWL_ANNOTATED_SOURCE => bundle.source = row.object.term().map(str::to_string),
                OWL_ANNOTATED_PROPERTY => {
                    bundle.property = row.object.term().map(str::to_string)
                }
                OWL_ANNOTATED_TARGET => bundle.target = Some(row.object.clone()),
                _ => bundle.extra.push(*id),
            }
        }
    }

    let mut claimed: HashSet<RowId> = HashSet::new();
    for (type_row, bundle) in &mut typed {
        let Some(previous) = type_row.checked_sub(1) else {
            continue;
        };
        if let Some(row) = store.row(previous) {
            if bundle_matches(bundle, row) && claimed.insert(previous) {
                bundle.annotates = Some(previous);
            }
        }
    }
    for (_, bundle) in &mut typed {
        if bundle.annotates.is_some() {
            continue;
        }
        bundle.annotates = unclaimed_base_row(store, bundle, &claimed);
        match bundle.annotates {
            Some(id) => {
                claimed.insert(id);
            }
            None => debug!(zn, bnode = %bundle.bnode, "annotation bundle has no base row"),
        }
    }
    typed.into_iter().map(|(_, bundle)| bundle).collect()
}

fn bundle_matches(bundle: &AnnotationBundle, row: &Statement) -> bool {
    match (&bundle.source, &bundle.property, &bundle.target) {
        (Some(source), Some(property), Some(target)) => {
            row.subject.as_str() == source.as_str()
                && row.predicate == *property
                && row.object.same_value(target)
        }
        _ => false,
    }
}

fn unclaimed_base_row(
    store: &StatementStore,
    bundle: &AnnotationBundle,
    claimed: &HashSet<RowId>,
) -> Option<RowId> {
    let (source, property) = (bundle.source.as_deref()?, bundle.property.as_deref()?);
    store
        .matching(source, property)
        .into_iter()
        .find(|(id, row)| !claimed.contains(id) && bundle_matches(bundle, row))
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxograph_model::vocab::{OIO_HAS_EXACT_SYNONYM, OIO_HAS_SYNONYM_TYPE};
    use taxograph_model::{assign_stanza_keys, Literal};

    fn synonym_rows(subject: &str, bnode: &str, text: &str) -> Vec<Statement> {
        vec![
            Statement::curie(
                subject,
                OIO_HAS_EXACT_SYNONYM,
                Object::Literal(Literal::plain(text)),
            ),
            Statement::blank(bnode, RDF_TYPE, Object::Curie(OWL_AXIOM.into())),
            Statement::blank(bnode, OWL_ANNOTATED_SOURCE, Object::Curie(subject.into())),
            Statement::blank(
                bnode,
                OWL_ANNOTATED_PROPERTY,
                Object::Curie(OIO_HAS_EXACT_SYNONYM.into()),
            ),
            Statement::blank(
                bnode,
                OWL_ANNOTATED_TARGET,
                Object::Literal(Literal::string(text)),
            ),
            Statement::blank(
                bnode,
                OIO_HAS_SYNONYM_TYPE,
                Object::Curie("ncbitaxon:common_name".into()),
            ),
        ]
    }

    #[test]
    fn bundles_join_to_base_rows_by_row_id() {
        let mut rows = synonym_rows("T:562", "_:b1", "E. coli");
        rows.extend(synonym_rows("T:562", "_:b2", "coli"));
        assign_stanza_keys(&mut rows);
        let store = StatementStore::from_rows(rows);

        let bundles = stanza_bundles(&store, "T:562");
        assert_eq!(bundles.len(), 2);
        assert_eq!(bundles[0].bnode, "_:b1");
        assert_eq!(bundles[0].annotates, Some(0));
        assert_eq!(bundles[0].extra, vec![5]);
        assert_eq!(bundles[1].annotates, Some(6));
        assert_eq!(bundles[1].source.as_deref(), Some("T:562"));
    }

    #[test]
    fn bundle_without_base_row_is_kept_unattached() {
        let mut rows = synonym_rows("T:1", "_:b1", "x");
        rows.remove(0);
        assign_stanza_keys(&mut rows);
        let store = StatementStore::from_rows(rows);

        let bundles = stanza_bundles(&store, "T:1");
        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].annotates, None);
    }

    #[test]
    fn identical_synonyms_each_keep_their_own_bundle() {
        let mut rows = synonym_rows("T:562", "_:b1", "E. coli");
        rows.extend(synonym_rows("T:562", "_:b2", "E. coli"));
        assign_stanza_keys(&mut rows);
        let store = StatementStore::from_rows(rows);

        let bundles = stanza_bundles(&store, "T:562");
        assert_eq!(bundles.len(), 2);
        assert_eq!(bundles[0].bnode, "_:b1");
        assert_eq!(bundles[0].annotates, Some(0));
        assert_eq!(bundles[1].bnode, "_:b2");
        assert_eq!(bundles[1].annotates, Some(6));
    }

    #[test]
    fn bundles_never_share_a_base_row() {
        // Both base rows first, then both bundles.
        let first = synonym_rows("T:562", "_:b1", "E. coli");
        let second = synonym_rows("T:562", "_:b2", "E. coli");
        let mut rows = vec![first[0].clone(), second[0].clone()];
        rows.extend(first[1..].iter().cloned());
        rows.extend(second[1..].iter().cloned());
        assign_stanza_keys(&mut rows);
        let store = StatementStore::from_rows(rows);

        let bundles = stanza_bundles(&store, "T:562");
        assert_eq!(bundles[0].annotates, Some(1));
        assert_eq!(bundles[1].annotates, Some(0));
    }
}

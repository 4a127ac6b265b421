//! The Statement Store: an immutable, indexed statement table.

use crate::error::StoreError;
use crate::hierarchy::{
    page_children, sort_children, ChildEntry, ChildrenPage, HierarchySource, MAX_HIERARCHY_DEPTH,
};
use ahash::AHashMap;
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use taxograph_model::vocab::{RDFS_LABEL, RDFS_SUBCLASS_OF};
use taxograph_model::{read_statements, Object, Statement, Subject};
use tracing::debug;

/// Ordinal of a row in the loaded table.
pub type RowId = u32;

/// One `rdfs:subClassOf` hop found by [`StatementStore::ancestors`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AncestorEdge {
    pub parent: String,
    pub child: String,
}

#[derive(Debug, Default)]
pub struct StatementStore {
    rows: Vec<Statement>,
    /// zn -> row ids
    stanza_index: AHashMap<String, Vec<RowId>>,
    /// subject (curie or blank id) -> row ids
    subject_index: AHashMap<String, Vec<RowId>>,
    /// object term (IRI, curie or blank id) -> row ids
    object_index: AHashMap<String, RoaringBitmap>,
    /// predicate -> row ids
    predicate_index: AHashMap<String, RoaringBitmap>,
    /// curie -> first `rdfs:label` literal
    labels: AHashMap<String, String>,
}

impl StatementStore {
    pub fn from_rows(rows: Vec<Statement>) -> Self {
        let mut store = Self::default();
        for (i, row) in rows.iter().enumerate() {
            let id = i as RowId;
            store
                .stanza_index
                .entry(row.zn.clone())
                .or_default()
                .push(id);
            store
                .subject_index
                .entry(row.subject.as_str().to_string())
                .or_default()
                .push(id);
            if let Some(term) = row.object.term() {
                store
                    .object_index
                    .entry(term.to_string())
                    .or_default()
                    .insert(id);
            }
            store
                .predicate_index
                .entry(row.predicate.clone())
                .or_default()
                .insert(id);

            if row.predicate == RDFS_LABEL {
                if let (Subject::Curie(subject), Some(lit)) = (&row.subject, row.object.literal()) {
                    store
                        .labels
                        .entry(subject.clone())
                        .or_insert_with(|| lit.value.clone());
                }
            }
        }
        store.rows = rows;
        store
    }

    pub fn from_reader<R: BufRead>(reader: R, path: &str) -> Result<Self, StoreError> {
        let rows = read_statements(reader).map_err(|source| StoreError::Table {
            path: path.to_string(),
            source,
        })?;
        debug!(path, rows = rows.len(), "loaded statement table");
        Ok(Self::from_rows(rows))
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let display = path.display().to_string();
        let file = File::open(path).map_err(|source| StoreError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_reader(BufReader::new(file), &display)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, id: RowId) -> Option<&Statement> {
        self.rows.get(id as usize)
    }

    fn resolve<'a>(
        &'a self,
        ids: impl IntoIterator<Item = RowId> + 'a,
    ) -> impl Iterator<Item = (RowId, &'a Statement)> + 'a {
        ids.into_iter()
            .filter_map(move |id| self.row(id).map(|row| (id, row)))
    }

    /// Rows filed under stanza key `zn`, in table order.
    pub fn stanza(&self, zn: &str) -> Vec<(RowId, &Statement)> {
        let ids = self.stanza_index.get(zn).map(Vec::as_slice).unwrap_or(&[]);
        self.resolve(ids.iter().copied()).collect()
    }

    pub fn has_stanza(&self, zn: &str) -> bool {
        self.stanza_index.contains_key(zn)
    }

    pub fn stanza_count(&self) -> usize {
        self.stanza_index.len()
    }

    pub fn predicate_rows(&self, predicate: &str) -> Option<&RoaringBitmap> {
        self.predicate_index.get(predicate)
    }

    fn subject_bitmap(&self, subject: &str) -> RoaringBitmap {
        self.subject_index
            .get(subject)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Rows with this subject and predicate, in table order.
    pub fn matching(&self, subject: &str, predicate: &str) -> Vec<(RowId, &Statement)> {
        let Some(with_predicate) = self.predicate_index.get(predicate) else {
            return Vec::new();
        };
        let ids = &self.subject_bitmap(subject) & with_predicate;
        self.resolve(ids).collect()
    }

    pub fn label(&self, id: &str) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    /// `rdfs:subClassOf` objects of `id`, blank objects excluded.
    pub fn parents_of(&self, id: &str) -> Vec<&str> {
        self.matching(id, RDFS_SUBCLASS_OF)
            .into_iter()
            .filter_map(|(_, row)| match &row.object {
                Object::Curie(p) | Object::Iri(p) => Some(p.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every `(parent, child)` hop above `id`, nearest first.
    ///
    /// Depth-first with an explicit stack. No edge ever points into an
    /// already visited node and self edges are skipped, so cycles terminate;
    /// walks longer than [`MAX_HIERARCHY_DEPTH`] hops are cut off.
    pub fn ancestors(&self, id: &str) -> Vec<AncestorEdge> {
        let mut edges = Vec::new();
        let mut visited: HashSet<&str> = HashSet::from([id]);
        let mut stack: Vec<(&str, usize)> = vec![(id, 0)];

        while let Some((child, depth)) = stack.pop() {
            if depth >= MAX_HIERARCHY_DEPTH {
                debug!(id, at = child, "ancestor walk reached depth limit");
                continue;
            }
            let mut fresh = Vec::new();
            for parent in self.parents_of(child) {
                if parent == child {
                    continue;
                }
                if !visited.insert(parent) {
                    debug!(id, at = parent, "ancestor walk skipped revisit");
                    continue;
                }
                edges.push(AncestorEdge {
                    parent: parent.to_string(),
                    child: child.to_string(),
                });
                fresh.push(parent);
            }
            // The first recorded parent is expanded first.
            stack.extend(fresh.into_iter().rev().map(|p| (p, depth + 1)));
        }
        edges
    }

    /// Curie subjects whose `rdfs:subClassOf` object is `id`, with labels.
    pub fn children(&self, id: &str) -> Vec<ChildEntry> {
        let (Some(with_object), Some(subclass)) = (
            self.object_index.get(id),
            self.predicate_index.get(RDFS_SUBCLASS_OF),
        ) else {
            return Vec::new();
        };
        let mut seen: HashSet<&str> = HashSet::new();
        let mut out: Vec<ChildEntry> = self
            .resolve(with_object & subclass)
            .filter_map(|(_, row)| match &row.subject {
                Subject::Curie(child) if child != id && seen.insert(child.as_str()) => {
                    Some(ChildEntry {
                        id: child.clone(),
                        label: self.label(child).unwrap_or(child).to_string(),
                    })
                }
                _ => None,
            })
            .collect();
        sort_children(&mut out);
        out
    }

    pub fn children_page(&self, id: &str, cap: usize) -> ChildrenPage {
        page_children(self.children(id), cap)
    }
}

impl HierarchySource for StatementStore {
    fn contains(&self, id: &str) -> bool {
        self.has_stanza(id)
    }

    fn label(&self, id: &str) -> Option<&str> {
        StatementStore::label(self, id)
    }

    fn parents(&self, id: &str) -> Vec<String> {
        self.parents_of(id).into_iter().map(str::to_string).collect()
    }

    fn children(&self, id: &str) -> Vec<ChildEntry> {
        StatementStore::children(self, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxograph_model::Literal;

    fn class(id: &str, label: &str, parent: Option<&str>) -> Vec<Statement> {
        let mut rows = vec![Statement::curie(
            id,
            RDFS_LABEL,
            Object::Literal(Literal::string(label)),
        )];
        if let Some(parent) = parent {
            rows.push(Statement::curie(
                id,
                RDFS_SUBCLASS_OF,
                Object::Curie(parent.to_string()),
            ));
        }
        rows
    }

    fn store(classes: &[(&str, &str, Option<&str>)]) -> StatementStore {
        StatementStore::from_rows(
            classes
                .iter()
                .flat_map(|(id, label, parent)| class(id, label, *parent))
                .collect(),
        )
    }

    #[test]
    fn ancestors_walk_to_root_nearest_first() {
        let s = store(&[
            ("T:1", "root", None),
            ("T:2", "two", Some("T:1")),
            ("T:3", "three", Some("T:2")),
        ]);
        let edges = s.ancestors("T:3");
        assert_eq!(
            edges,
            vec![
                AncestorEdge {
                    parent: "T:2".into(),
                    child: "T:3".into()
                },
                AncestorEdge {
                    parent: "T:1".into(),
                    child: "T:2".into()
                },
            ]
        );
        assert!(s.ancestors("T:1").is_empty());
    }

    #[test]
    fn two_node_cycle_yields_at_most_one_edge() {
        let s = store(&[("A:a", "a", Some("A:b")), ("A:b", "b", Some("A:a"))]);
        assert_eq!(s.ancestors("A:a").len(), 1);
        assert_eq!(s.ancestors("A:b").len(), 1);
    }

    #[test]
    fn self_parent_produces_no_edge() {
        let s = store(&[("T:1", "root", Some("T:1"))]);
        assert!(s.ancestors("T:1").is_empty());
        assert!(s.children("T:1").is_empty());
    }

    #[test]
    fn ancestors_are_depth_bounded() {
        let ids: Vec<String> = (0..250).map(|i| format!("T:{i}")).collect();
        let rows = ids
            .windows(2)
            .flat_map(|w| class(&w[0], &w[0], Some(w[1].as_str())))
            .collect();
        let s = StatementStore::from_rows(rows);
        assert_eq!(s.ancestors("T:0").len(), MAX_HIERARCHY_DEPTH);
    }

    #[test]
    fn children_sorted_case_insensitively_with_cap() {
        let s = store(&[
            ("T:1", "root", None),
            ("T:4", "delta", Some("T:1")),
            ("T:2", "Bravo", Some("T:1")),
            ("T:3", "alpha", Some("T:1")),
        ]);
        let labels: Vec<String> = s.children("T:1").into_iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["alpha", "Bravo", "delta"]);

        let page = s.children_page("T:1", 2);
        assert_eq!(page.children.len(), 2);
        assert_eq!(page.hidden, 1);
    }

    #[test]
    fn unlabelled_child_falls_back_to_id() {
        let rows = vec![Statement::curie(
            "T:9",
            RDFS_SUBCLASS_OF,
            Object::Curie("T:1".into()),
        )];
        let s = StatementStore::from_rows(rows);
        assert_eq!(s.children("T:1")[0].label, "T:9");
    }

    #[test]
    fn stanza_and_matching_lookups() {
        let s = store(&[("T:1", "root", None), ("T:2", "two", Some("T:1"))]);
        assert_eq!(s.stanza("T:2").len(), 2);
        assert_eq!(s.stanza("T:404").len(), 0);
        let found = s.matching("T:2", RDFS_SUBCLASS_OF);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, 2);
        assert_eq!(s.label("T:2"), Some("two"));
        assert_eq!(s.parents_of("T:2"), vec!["T:1"]);
    }

    #[test]
    fn store_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StatementStore>();
    }
}

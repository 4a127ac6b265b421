//! Hierarchy Renderer: the browsable view of one term.
//!
//! A [`TermView`] is plain data (serde-serialisable); HTML or any other
//! presentation is left to the caller.

use crate::annotations::stanza_bundles;
use crate::hierarchy::{first_parent_chain, HierarchySource, DEFAULT_CHILD_CAP};
use crate::prefixes::{term_href, PrefixMap};
use crate::store::{RowId, StatementStore};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use taxograph_model::vocab::RDFS_LABEL;
use taxograph_model::{Object, Statement};

/// Display labels for vocabulary terms that carry no label row.
pub const DISPLAY_LABELS: &[(&str, &str)] = &[
    ("rdfs:subClassOf", "subclass of"),
    ("rdf:type", "type"),
    ("rdfs:label", "label"),
    ("owl:Class", "Class"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub label: String,
    pub href: String,
}

/// One level of the ancestor chain; `child` nests the next level down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyLevel {
    pub term: Link,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<Box<HierarchyLevel>>,
}

impl HierarchyLevel {
    /// Levels from the root down to the term itself.
    pub fn flatten(&self) -> Vec<&Link> {
        let mut out = vec![&self.term];
        let mut level = self;
        while let Some(child) = &level.child {
            out.push(&child.term);
            level = child;
        }
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildrenView {
    pub children: Vec<Link>,
    pub hidden: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueView {
    Iri {
        iri: String,
    },
    Term(Link),
    Blank {
        id: String,
    },
    Literal {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationProperty {
    pub predicate: Link,
    pub value: ValueView,
}

/// A reified annotation shown under the value it annotates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationView {
    pub bnode: String,
    pub properties: Vec<AnnotationProperty>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyValue {
    pub row: RowId,
    pub value: ValueView,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<AnnotationView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyGroup {
    pub predicate: Link,
    pub values: Vec<PropertyValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermPage {
    pub id: String,
    pub label: String,
    pub iri: Option<String>,
    pub hierarchy: Option<HierarchyLevel>,
    pub children: ChildrenView,
    pub properties: Vec<PropertyGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TermView {
    NotFound { id: String },
    Found(Box<TermPage>),
}

impl TermView {
    pub fn page(&self) -> Option<&TermPage> {
        match self {
            TermView::Found(page) => Some(&**page),
            TermView::NotFound { .. } => None,
        }
    }
}

pub struct Renderer<'a> {
    store: &'a StatementStore,
    prefixes: &'a PrefixMap,
    child_cap: usize,
}

impl<'a> Renderer<'a> {
    pub fn new(store: &'a StatementStore, prefixes: &'a PrefixMap) -> Self {
        Self {
            store,
            prefixes,
            child_cap: DEFAULT_CHILD_CAP,
        }
    }

    pub fn with_child_cap(mut self, cap: usize) -> Self {
        self.child_cap = cap;
        self
    }

    /// Render `id` using the store's own `rdfs:subClassOf` rows as the tree.
    pub fn render(&self, id: &str) -> TermView {
        self.render_with(id, self.store)
    }

    /// Render `id` with hierarchy and children taken from `tree`.
    ///
    /// A term is found when the store holds a stanza for it. The hierarchy
    /// is omitted when `tree` does not know the term.
    pub fn render_with(&self, id: &str, tree: &dyn HierarchySource) -> TermView {
        let stanza = self.store.stanza(id);
        if stanza.is_empty() {
            return TermView::NotFound { id: id.to_string() };
        }

        let label_row = stanza
            .iter()
            .find(|(_, row)| row.subject.as_str() == id && row.predicate == RDFS_LABEL)
            .map(|(row_id, row)| (*row_id, row.object.lexical().to_string()));
        let label = label_row
            .as_ref()
            .map(|(_, label)| label.clone())
            .unwrap_or_else(|| id.to_string());

        let (hierarchy, children) = if tree.contains(id) {
            (
                Some(self.hierarchy(id, tree)),
                self.children(id, tree),
            )
        } else {
            (None, ChildrenView::default())
        };

        TermPage {
            id: id.to_string(),
            label,
            iri: self.prefixes.expand(id),
            hierarchy,
            children,
            properties: self.properties(id, &stanza, label_row.map(|(row_id, _)| row_id)),
        }
        .into()
    }

    fn link(&self, id: &str, tree: Option<&dyn HierarchySource>) -> Link {
        let label = tree
            .and_then(|t| t.label(id))
            .or_else(|| self.store.label(id))
            .or_else(|| {
                DISPLAY_LABELS
                    .iter()
                    .find(|(term, _)| *term == id)
                    .map(|(_, label)| *label)
            })
            .unwrap_or(id);
        Link {
            id: id.to_string(),
            label: label.to_string(),
            href: term_href(id),
        }
    }

    fn hierarchy(&self, id: &str, tree: &dyn HierarchySource) -> HierarchyLevel {
        let chain = first_parent_chain(tree, id);
        let mut levels = chain.iter().rev();
        let mut level = HierarchyLevel {
            term: self.link(levels.next().map_or(id, String::as_str), Some(tree)),
            child: None,
        };
        for ancestor in levels {
            level = HierarchyLevel {
                term: self.link(ancestor, Some(tree)),
                child: Some(Box::new(level)),
            };
        }
        level
    }

    fn children(&self, id: &str, tree: &dyn HierarchySource) -> ChildrenView {
        let page = tree.children_page(id, self.child_cap);
        ChildrenView {
            children: page
                .children
                .iter()
                .map(|c| Link {
                    id: c.id.clone(),
                    label: c.label.clone(),
                    href: term_href(&c.id),
                })
                .collect(),
            hidden: page.hidden,
        }
    }

    fn value(&self, object: &Object) -> ValueView {
        match object {
            Object::Iri(iri) => ValueView::Iri { iri: iri.clone() },
            Object::Curie(curie) => ValueView::Term(self.link(curie, None)),
            Object::Blank(id) => ValueView::Blank { id: id.clone() },
            Object::Literal(lit) => ValueView::Literal {
                value: lit.value.clone(),
                datatype: lit.datatype().map(str::to_string),
                language: lit.language().map(str::to_string),
            },
        }
    }

    /// Rows about `id` grouped by predicate, each value with the annotation
    /// bundles joined to its row id.
    fn properties(
        &self,
        id: &str,
        stanza: &[(RowId, &Statement)],
        label_row: Option<RowId>,
    ) -> Vec<PropertyGroup> {
        let mut annotations: AHashMap<RowId, Vec<AnnotationView>> = AHashMap::new();
        for bundle in stanza_bundles(self.store, id) {
            let Some(row_id) = bundle.annotates else {
                continue;
            };
            let properties = bundle
                .extra
                .iter()
                .filter_map(|&extra| self.store.row(extra))
                .map(|row| AnnotationProperty {
                    predicate: self.link(&row.predicate, None),
                    value: self.value(&row.object),
                })
                .collect();
            annotations.entry(row_id).or_default().push(AnnotationView {
                bnode: bundle.bnode,
                properties,
            });
        }

        let mut groups: BTreeMap<&str, Vec<PropertyValue>> = BTreeMap::new();
        for (row_id, row) in stanza {
            if row.subject.as_str() != id || Some(*row_id) == label_row {
                continue;
            }
            groups
                .entry(row.predicate.as_str())
                .or_default()
                .push(PropertyValue {
                    row: *row_id,
                    value: self.value(&row.object),
                    annotations: annotations.remove(row_id).unwrap_or_default(),
                });
        }

        groups
            .into_iter()
            .map(|(predicate, values)| PropertyGroup {
                predicate: self.link(predicate, None),
                values,
            })
            .collect()
    }
}

impl From<TermPage> for TermView {
    fn from(page: TermPage) -> Self {
        TermView::Found(Box::new(page))
    }
}

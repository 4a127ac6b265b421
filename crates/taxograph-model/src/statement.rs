//! Statement rows: one triple per row, grouped into stanzas by `zn`.
//!
//! The row invariants of the tabular encoding (exactly one subject field,
//! exactly one object kind, datatype or language only on literals) are
//! carried by the types here; the TSV codec re-checks them on decode.

use crate::digest::is_blank_node;
use crate::vocab::{OWL_ANNOTATED_SOURCE, XSD_STRING};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Subject {
    Curie(String),
    Blank(String),
}

impl Subject {
    pub fn as_str(&self) -> &str {
        match self {
            Subject::Curie(s) | Subject::Blank(s) => s,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Subject::Blank(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralTag {
    Datatype(String),
    Language(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<LiteralTag>,
}

impl Literal {
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            tag: None,
        }
    }

    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            tag: Some(LiteralTag::Datatype(datatype.into())),
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::typed(value, XSD_STRING)
    }

    pub fn lang(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            tag: Some(LiteralTag::Language(language.into())),
        }
    }

    pub fn datatype(&self) -> Option<&str> {
        match &self.tag {
            Some(LiteralTag::Datatype(dt)) => Some(dt),
            _ => None,
        }
    }

    pub fn language(&self) -> Option<&str> {
        match &self.tag {
            Some(LiteralTag::Language(lt)) => Some(lt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Object {
    /// Full external IRI (no prefix matched).
    Iri(String),
    Curie(String),
    Blank(String),
    Literal(Literal),
}

impl Object {
    /// The node term (IRI, curie or blank id); `None` for literals.
    pub fn term(&self) -> Option<&str> {
        match self {
            Object::Iri(s) | Object::Curie(s) | Object::Blank(s) => Some(s),
            Object::Literal(_) => None,
        }
    }

    pub fn literal(&self) -> Option<&Literal> {
        match self {
            Object::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// Term or literal text, whichever this object carries.
    pub fn lexical(&self) -> &str {
        match self {
            Object::Iri(s) | Object::Curie(s) | Object::Blank(s) => s,
            Object::Literal(lit) => &lit.value,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Object::Blank(_))
    }

    /// Same node, or same literal text regardless of datatype/language.
    ///
    /// Annotation targets are typed `xsd:string` while the annotated base
    /// triple may carry a plain literal, so bundle joins compare this way.
    pub fn same_value(&self, other: &Object) -> bool {
        match (self, other) {
            (Object::Literal(a), Object::Literal(b)) => a.value == b.value,
            (a, b) => a == b,
        }
    }
}

/// One row of the statement table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statement {
    /// Stanza key: the effective subject this row is grouped under.
    pub zn: String,
    pub subject: Subject,
    pub predicate: String,
    pub object: Object,
}

impl Statement {
    /// A row whose stanza key is its own subject. Blank-subject rows get
    /// their real key from [`assign_stanza_keys`].
    pub fn new(subject: Subject, predicate: impl Into<String>, object: Object) -> Self {
        Self {
            zn: subject.as_str().to_string(),
            subject,
            predicate: predicate.into(),
            object,
        }
    }

    pub fn curie(subject: &str, predicate: &str, object: Object) -> Self {
        Self::new(Subject::Curie(subject.to_string()), predicate, object)
    }

    pub fn blank(subject: &str, predicate: &str, object: Object) -> Self {
        Self::new(Subject::Blank(subject.to_string()), predicate, object)
    }

    /// The triple without its grouping key.
    pub fn triple(&self) -> (&Subject, &str, &Object) {
        (&self.subject, &self.predicate, &self.object)
    }
}

/// Set `zn` on every row.
///
/// Curie subjects are their own stanza. A blank subject is filed under the
/// subject it annotates (the object of its `owl:annotatedSource` row),
/// following chains of blank sources, else under the blank id itself.
pub fn assign_stanza_keys(rows: &mut [Statement]) {
    let mut sources: HashMap<String, String> = HashMap::new();
    for row in rows.iter() {
        let Subject::Blank(bnode) = &row.subject else {
            continue;
        };
        if row.predicate != OWL_ANNOTATED_SOURCE {
            continue;
        }
        if let Object::Curie(source) | Object::Blank(source) = &row.object {
            sources
                .entry(bnode.clone())
                .or_insert_with(|| source.clone());
        }
    }

    for row in rows.iter_mut() {
        row.zn = match &row.subject {
            Subject::Curie(curie) => curie.clone(),
            Subject::Blank(bnode) => resolve_stanza(&sources, bnode),
        };
    }
}

fn resolve_stanza(sources: &HashMap<String, String>, bnode: &str) -> String {
    let mut current = bnode;
    let mut seen: HashSet<&str> = HashSet::new();
    while let Some(next) = sources.get(current) {
        if !seen.insert(current) {
            break;
        }
        current = next.as_str();
        if !is_blank_node(current) {
            break;
        }
    }
    current.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{OWL_AXIOM, RDF_TYPE};

    #[test]
    fn blank_rows_are_filed_under_annotated_source() {
        let mut rows = vec![
            Statement::curie("NCBITaxon:562", "rdfs:label", Object::Literal(Literal::plain("x"))),
            Statement::blank("_:b1", RDF_TYPE, Object::Curie(OWL_AXIOM.to_string())),
            Statement::blank(
                "_:b1",
                OWL_ANNOTATED_SOURCE,
                Object::Curie("NCBITaxon:562".to_string()),
            ),
            Statement::blank("_:orphan", RDF_TYPE, Object::Curie(OWL_AXIOM.to_string())),
        ];
        assign_stanza_keys(&mut rows);
        assert_eq!(rows[0].zn, "NCBITaxon:562");
        assert_eq!(rows[1].zn, "NCBITaxon:562");
        assert_eq!(rows[2].zn, "NCBITaxon:562");
        assert_eq!(rows[3].zn, "_:orphan");
    }

    #[test]
    fn nested_blank_sources_resolve_to_outermost_curie() {
        let mut rows = vec![
            Statement::blank("_:inner", OWL_ANNOTATED_SOURCE, Object::Blank("_:outer".into())),
            Statement::blank(
                "_:outer",
                OWL_ANNOTATED_SOURCE,
                Object::Curie("NCBITaxon:1".into()),
            ),
        ];
        assign_stanza_keys(&mut rows);
        assert_eq!(rows[0].zn, "NCBITaxon:1");
        assert_eq!(rows[1].zn, "NCBITaxon:1");
    }

    #[test]
    fn cyclic_blank_sources_terminate() {
        let mut rows = vec![
            Statement::blank("_:a", OWL_ANNOTATED_SOURCE, Object::Blank("_:b".into())),
            Statement::blank("_:b", OWL_ANNOTATED_SOURCE, Object::Blank("_:a".into())),
        ];
        assign_stanza_keys(&mut rows);
        assert!(rows.iter().all(|r| r.zn.starts_with("_:")));
    }

    #[test]
    fn same_value_ignores_literal_tags_only() {
        let plain = Object::Literal(Literal::plain("E. coli"));
        let typed = Object::Literal(Literal::string("E. coli"));
        assert!(plain.same_value(&typed));
        assert!(!plain.same_value(&Object::Curie("E. coli".into())));
    }
}

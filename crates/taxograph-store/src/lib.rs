//! Taxograph statement store
//!
//! Loads a statement table produced by the taxonomy converter and answers
//! the questions a term browser asks:
//!
//! 1. **Stanzas**: every row filed under a stanza key, in table order
//! 2. **Hierarchy**: bounded ancestor walks and label-sorted children
//! 3. **Annotations**: `owl:Axiom` bundles joined to the rows they annotate
//! 4. **Term views**: serialisable pages combining all of the above
//!
//! Row sets are kept as Roaring bitmaps over row ids so subject/predicate
//! lookups are bitmap intersections. A loaded store is immutable and may be
//! shared across threads.

pub mod annotations;
pub mod error;
pub mod hierarchy;
pub mod prefixes;
pub mod render;
pub mod store;
pub mod tree_table;

pub use annotations::{stanza_bundles, AnnotationBundle};
pub use error::StoreError;
pub use hierarchy::{
    first_parent_chain, ChildEntry, ChildrenPage, HierarchySource, DEFAULT_CHILD_CAP,
    MAX_HIERARCHY_DEPTH,
};
pub use prefixes::{term_href, PrefixMap};
pub use render::{HierarchyLevel, Link, PropertyGroup, Renderer, TermPage, TermView, ValueView};
pub use store::{AncestorEdge, RowId, StatementStore};
pub use tree_table::TreeTable;

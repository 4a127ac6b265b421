//! Taxograph statement model
//!
//! This crate defines the flat statement (triple) model shared by the
//! taxonomy converter and the statement store:
//!
//! - `statement`: subjects, objects, literals and the `Statement` row itself,
//!   plus stanza-key assignment for blank-node rows.
//! - `tsv`: the tab-delimited table codecs (statement table and tree tables).
//! - `vocab`: curies and prefixes used by the generated statements.
//! - `digest`: deterministic FNV-1a digests (blank-node ids).

pub mod digest;
pub mod statement;
pub mod tsv;
pub mod vocab;

pub use statement::{assign_stanza_keys, Literal, LiteralTag, Object, Statement, Subject};
pub use tsv::{
    read_statements, read_tree_rows, write_statement, write_statement_header, write_statements,
    write_tree_rows, TableError, TreeRow, STATEMENT_HEADERS, TREE_HEADERS,
};

//! A loaded active or pruned tree table, usable as a hierarchy source.

use crate::error::StoreError;
use crate::hierarchy::{sort_children, ChildEntry, HierarchySource};
use ahash::AHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use taxograph_model::{read_tree_rows, TreeRow};

#[derive(Debug, Default, Clone)]
pub struct TreeTable {
    rows: AHashMap<String, TreeRow>,
}

impl TreeTable {
    pub fn from_rows(rows: Vec<TreeRow>) -> Self {
        Self {
            rows: rows.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }

    pub fn from_reader<R: BufRead>(reader: R, path: &str) -> Result<Self, StoreError> {
        let rows = read_tree_rows(reader).map_err(|source| StoreError::Table {
            path: path.to_string(),
            source,
        })?;
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

    pub fn get(&self, id: &str) -> Option<&TreeRow> {
        self.rows.get(id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl HierarchySource for TreeTable {
    fn contains(&self, id: &str) -> bool {
        self.rows.contains_key(id)
    }

    fn label(&self, id: &str) -> Option<&str> {
        self.rows
            .get(id)
            .map(|r| r.label.as_str())
            .filter(|l| !l.is_empty())
    }

    fn parents(&self, id: &str) -> Vec<String> {
        self.rows
            .get(id)
            .map(|r| r.parents.clone())
            .unwrap_or_default()
    }

    /// Listed children that have their own row.
    fn children(&self, id: &str) -> Vec<ChildEntry> {
        let Some(row) = self.rows.get(id) else {
            return Vec::new();
        };
        let mut out: Vec<ChildEntry> = row
            .children
            .iter()
            .filter(|c| self.rows.contains_key(c.as_str()))
            .map(|c| ChildEntry {
                id: c.clone(),
                label: self.label(c).unwrap_or(c).to_string(),
            })
            .collect();
        sort_children(&mut out);
        out
    }
}

//! Curie expansion and term links.

use crate::error::StoreError;
use std::fs;
use std::path::Path;
use taxograph_model::vocab::DEFAULT_PREFIXES;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixMap {
    /// `(prefix, base)`, longest prefix first.
    entries: Vec<(String, String)>,
}

impl Default for PrefixMap {
    fn default() -> Self {
        let mut map = Self::empty();
        for (prefix, base) in DEFAULT_PREFIXES {
            map.insert(prefix, base);
        }
        map
    }
}

impl PrefixMap {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add or replace a prefix.
    pub fn insert(&mut self, prefix: &str, base: &str) {
        self.entries.retain(|(p, _)| p != prefix);
        self.entries.push((prefix.to_string(), base.to_string()));
        self.entries
            .sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
    }

    /// Merge a `prefix<TAB>base` table into the defaults. A leading header
    /// row naming those two columns is optional.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let display = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: display.clone(),
            source,
        })?;
        let mut map = Self::default();
        for (i, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut cells = line.split('\t');
            match (cells.next(), cells.next()) {
                (Some("prefix"), Some("base")) if i == 0 => {}
                (Some(prefix), Some(base)) if !prefix.is_empty() && !base.is_empty() => {
                    map.insert(prefix, base)
                }
                _ => {
                    return Err(StoreError::Prefixes {
                        path: display,
                        line: i + 1,
                        message: "expected `prefix<TAB>base`".to_string(),
                    })
                }
            }
        }
        Ok(map)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Full IRI for a curie, if its prefix is known.
    pub fn expand(&self, curie: &str) -> Option<String> {
        self.entries.iter().find_map(|(prefix, base)| {
            curie
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix(':'))
                .map(|local| format!("{base}{local}"))
        })
    }
}

/// Relative link to a term page: `./{curie}` with `#` percent-encoded.
pub fn term_href(curie: &str) -> String {
    format!("./{curie}").replace('#', "%23")
}

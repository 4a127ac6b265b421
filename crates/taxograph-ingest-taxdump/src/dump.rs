//! Dump Reader: `nodes.dmp`, `names.dmp`, `merged.dmp`, `citations.dmp`.
//!
//! Records are `|`-delimited with surrounding whitespace trimmed from every
//! field (`562\t|\t561\t|\tspecies\t|...\t|`). Short records are rejected
//! with their file and line; extra trailing fields are ignored.

use crate::error::TaxdumpError;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

pub const NODES_FILE: &str = "nodes.dmp";
pub const NAMES_FILE: &str = "names.dmp";
pub const MERGED_FILE: &str = "merged.dmp";
pub const CITATIONS_FILE: &str = "citations.dmp";

const NODE_REQUIRED_FIELDS: usize = 3;
const NODE_GENETIC_CODE_FIELD: usize = 6;
const NAME_REQUIRED_FIELDS: usize = 4;
const MERGED_REQUIRED_FIELDS: usize = 2;
const CITATION_REQUIRED_FIELDS: usize = 7;

/// Split one dump line into trimmed fields.
///
/// A field separator is a `|` preceded by whitespace (`\t|` in NCBI dumps);
/// a bare `|` inside a name is kept as data.
pub fn split_record(line: &str) -> Vec<&str> {
    let line = line.trim_end_matches(['\n', '\r']);
    let mut fields = Vec::new();
    let mut start = 0;
    for (i, _) in line.match_indices('|') {
        if line[..i].ends_with(['\t', ' ']) {
            fields.push(line[start..i].trim());
            start = i + 1;
        }
    }
    let rest = line[start..].trim();
    // The record terminator leaves one empty field behind.
    if start == 0 || !rest.is_empty() {
        fields.push(rest);
    }
    fields
}

fn require_fields(
    fields: &[&str],
    expected: usize,
    file: &str,
    line: usize,
) -> Result<(), TaxdumpError> {
    if fields.len() < expected {
        return Err(TaxdumpError::MalformedRecord {
            file: file.to_string(),
            line,
            expected,
            found: fields.len(),
        });
    }
    Ok(())
}

/// Feed each non-blank line of `reader` to `f` with its 1-based number.
fn for_each_record<R, F>(reader: R, file: &str, mut f: F) -> Result<(), TaxdumpError>
where
    R: BufRead,
    F: FnMut(usize, Vec<&str>) -> Result<(), TaxdumpError>,
{
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| TaxdumpError::io(file, e))?;
        if line.trim().is_empty() {
            continue;
        }
        f(i + 1, split_record(&line))?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub tax_id: String,
    pub parent_tax_id: String,
    pub rank: String,
    pub genetic_code_id: Option<String>,
}

impl NodeRecord {
    fn from_fields(fields: &[&str], file: &str, line: usize) -> Result<Self, TaxdumpError> {
        require_fields(fields, NODE_REQUIRED_FIELDS, file, line)?;
        Ok(Self {
            tax_id: fields[0].to_string(),
            parent_tax_id: fields[1].to_string(),
            rank: fields[2].to_string(),
            genetic_code_id: fields
                .get(NODE_GENETIC_CODE_FIELD)
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRecord {
    pub tax_id: String,
    pub name: String,
    pub unique_name: String,
    pub name_class: String,
}

pub fn read_nodes<R: BufRead>(reader: R, file: &str) -> Result<Vec<NodeRecord>, TaxdumpError> {
    let mut out = Vec::new();
    for_each_record(reader, file, |line, fields| {
        out.push(NodeRecord::from_fields(&fields, file, line)?);
        Ok(())
    })?;
    Ok(out)
}

/// Read name records, keeping only those whose tax_id passes `keep`.
pub fn read_names<R, F>(reader: R, file: &str, keep: F) -> Result<Vec<NameRecord>, TaxdumpError>
where
    R: BufRead,
    F: Fn(&str) -> bool,
{
    let mut out = Vec::new();
    for_each_record(reader, file, |line, fields| {
        require_fields(&fields, NAME_REQUIRED_FIELDS, file, line)?;
        if !keep(fields[0]) {
            return Ok(());
        }
        out.push(NameRecord {
            tax_id: fields[0].to_string(),
            name: fields[1].to_string(),
            unique_name: fields[2].to_string(),
            name_class: fields[3].to_string(),
        });
        Ok(())
    })?;
    Ok(out)
}

/// `new_tax_id → [old_tax_id, ...]` in file order.
pub fn read_merged<R: BufRead>(
    reader: R,
    file: &str,
) -> Result<HashMap<String, Vec<String>>, TaxdumpError> {
    let mut out: HashMap<String, Vec<String>> = HashMap::new();
    for_each_record(reader, file, |line, fields| {
        require_fields(&fields, MERGED_REQUIRED_FIELDS, file, line)?;
        out.entry(fields[1].to_string())
            .or_default()
            .push(fields[0].to_string());
        Ok(())
    })?;
    Ok(out)
}

/// `tax_id → [pubmed_id, ...]` for kept tax_ids.
///
/// The dump's `pubmed_id` column is always `0`; the `medline_id` column holds
/// the PubMed id in practice, and `0` there means "none".
pub fn read_citations<R, F>(
    reader: R,
    file: &str,
    keep: F,
) -> Result<HashMap<String, Vec<String>>, TaxdumpError>
where
    R: BufRead,
    F: Fn(&str) -> bool,
{
    let mut out: HashMap<String, Vec<String>> = HashMap::new();
    for_each_record(reader, file, |line, fields| {
        require_fields(&fields, CITATION_REQUIRED_FIELDS, file, line)?;
        let medline_id = fields[3];
        if medline_id.is_empty() || medline_id == "0" {
            return Ok(());
        }
        for tax_id in fields[6].split_whitespace() {
            if keep(tax_id) {
                out.entry(tax_id.to_string())
                    .or_default()
                    .push(medline_id.to_string());
            }
        }
        Ok(())
    })?;
    Ok(out)
}

/// An extracted taxonomy dump directory.
#[derive(Debug, Clone)]
pub struct TaxDump {
    dir: PathBuf,
}

impl TaxDump {
    /// Open a dump directory. `nodes.dmp` and `names.dmp` must exist.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, TaxdumpError> {
        let dump = Self {
            dir: dir.as_ref().to_path_buf(),
        };
        for required in [NODES_FILE, NAMES_FILE] {
            let path = dump.path(required);
            if !path.is_file() {
                return Err(TaxdumpError::io(
                    &path.display().to_string(),
                    std::io::Error::new(std::io::ErrorKind::NotFound, "dump file not found"),
                ));
            }
        }
        Ok(dump)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    pub fn has(&self, file: &str) -> bool {
        self.path(file).is_file()
    }

    fn reader(&self, file: &str) -> Result<BufReader<File>, TaxdumpError> {
        let path = self.path(file);
        File::open(&path)
            .map(BufReader::new)
            .map_err(|e| TaxdumpError::io(&path.display().to_string(), e))
    }

    pub fn nodes(&self) -> Result<Vec<NodeRecord>, TaxdumpError> {
        read_nodes(self.reader(NODES_FILE)?, NODES_FILE)
    }

    pub fn names<F: Fn(&str) -> bool>(&self, keep: F) -> Result<Vec<NameRecord>, TaxdumpError> {
        read_names(self.reader(NAMES_FILE)?, NAMES_FILE, keep)
    }

    pub fn merged(&self) -> Result<HashMap<String, Vec<String>>, TaxdumpError> {
        read_merged(self.reader(MERGED_FILE)?, MERGED_FILE)
    }

    pub fn citations<F: Fn(&str) -> bool>(
        &self,
        keep: F,
    ) -> Result<HashMap<String, Vec<String>>, TaxdumpError> {
        read_citations(self.reader(CITATIONS_FILE)?, CITATIONS_FILE, keep)
    }
}

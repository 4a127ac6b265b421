//! Weight input: a `tax_id → count` mapping, read from a two-column weights
//! table or counted from the rows of a record table.

use crate::error::TaxdumpError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Usage weight per tax_id, iterated in byte order of the id.
pub type Weights = BTreeMap<String, u64>;

pub const WEIGHTS_HEADER: [&str; 2] = ["tax_id", "weight"];

fn header_columns(line: &str) -> Vec<&str> {
    line.trim_end_matches(['\n', '\r']).split('\t').collect()
}

fn add_weight(
    weights: &mut Weights,
    tax_id: &str,
    weight: u64,
    file: &str,
    line: usize,
) -> Result<(), TaxdumpError> {
    let total = weights.entry(tax_id.to_string()).or_insert(0);
    *total = total
        .checked_add(weight)
        .ok_or_else(|| TaxdumpError::WeightOverflow {
            file: file.to_string(),
            line,
            tax_id: tax_id.to_string(),
        })?;
    Ok(())
}

/// Read a weights table: a header line, then `tax_id<TAB>weight` rows.
///
/// Repeated ids are summed. Weights must be non-negative integers and a
/// sum past `u64::MAX` is an error.
pub fn read_weights<R: BufRead>(reader: R, file: &str) -> Result<Weights, TaxdumpError> {
    let mut lines = reader.lines().enumerate();
    match lines.next() {
        Some((_, line)) => {
            line.map_err(|e| TaxdumpError::io(file, e))?;
        }
        None => {
            return Err(TaxdumpError::MissingHeader {
                file: file.to_string(),
            })
        }
    }

    let mut weights = Weights::new();
    for (i, line) in lines {
        let line = line.map_err(|e| TaxdumpError::io(file, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let cells = header_columns(&line);
        let (tax_id, value) = match cells.as_slice() {
            [tax_id, value, ..] => (tax_id.trim(), value.trim()),
            _ => {
                return Err(TaxdumpError::MalformedRecord {
                    file: file.to_string(),
                    line: i + 1,
                    expected: 2,
                    found: cells.len(),
                })
            }
        };
        let weight: u64 = value.parse().map_err(|_| TaxdumpError::InvalidWeight {
            file: file.to_string(),
            line: i + 1,
            value: value.to_string(),
        })?;
        add_weight(&mut weights, tax_id, weight, file, i + 1)?;
    }
    Ok(weights)
}

pub fn write_weights<W: Write>(w: &mut W, weights: &Weights) -> io::Result<()> {
    writeln!(w, "{}", WEIGHTS_HEADER.join("\t"))?;
    for (tax_id, weight) in weights {
        writeln!(w, "{tax_id}\t{weight}")?;
    }
    Ok(())
}

/// How rows of a record table are turned into weights.
///
/// A row counts once, toward the first non-empty key column, and only when
/// its `required` column is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordCountSpec {
    pub required: String,
    pub keys: Vec<String>,
}

impl Default for RecordCountSpec {
    fn default() -> Self {
        Self {
            required: "epitope_id".to_string(),
            keys: vec!["organism_id".to_string(), "organism2_id".to_string()],
        }
    }
}

/// Count weights from a tab-delimited record table with a header row.
pub fn count_weights<R: BufRead>(
    reader: R,
    file: &str,
    spec: &RecordCountSpec,
) -> Result<Weights, TaxdumpError> {
    let mut lines = reader.lines().enumerate();
    let header = match lines.next() {
        Some((_, line)) => line.map_err(|e| TaxdumpError::io(file, e))?,
        None => {
            return Err(TaxdumpError::MissingHeader {
                file: file.to_string(),
            })
        }
    };
    let columns = header_columns(&header);
    let position = |name: &str| {
        columns
            .iter()
            .position(|c| *c == name)
            .ok_or_else(|| TaxdumpError::MissingColumn {
                file: file.to_string(),
                column: name.to_string(),
            })
    };
    let required = position(spec.required.as_str())?;
    let keys = spec
        .keys
        .iter()
        .map(|k| position(k.as_str()))
        .collect::<Result<Vec<_>, _>>()?;

    let mut weights = Weights::new();
    let mut skipped = 0usize;
    for (i, line) in lines {
        let line = line.map_err(|e| TaxdumpError::io(file, e))?;
        if line.is_empty() {
            continue;
        }
        let cells = header_columns(&line);
        let cell = |i: usize| cells.get(i).map(|c| c.trim()).unwrap_or("");
        if cell(required).is_empty() {
            skipped += 1;
            continue;
        }
        match keys.iter().map(|&k| cell(k)).find(|v| !v.is_empty()) {
            Some(tax_id) => add_weight(&mut weights, tax_id, 1, file, i + 1)?,
            None => skipped += 1,
        }
    }
    debug!(file, counted = weights.len(), skipped, "counted record weights");
    Ok(weights)
}

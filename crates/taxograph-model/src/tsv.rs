//! Tab-delimited table codecs.
//!
//! Both tables are UTF-8, one record per `\n`-terminated line, with a header
//! row naming the columns. Columns are located by header name, so column
//! order is not significant on read. An empty cell means "absent".
//!
//! Inside a cell, backslash, tab, newline and carriage return are written as
//! `\\`, `\t`, `\n`, `\r`; every other character is written verbatim.

use crate::statement::{Literal, LiteralTag, Object, Statement, Subject};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};

pub const STATEMENT_HEADERS: [&str; 10] = ["zn", "sc", "sb", "pc", "oi", "oc", "ob", "ol", "dc", "lt"];

pub const TREE_HEADERS: [&str; 6] = [
    "id",
    "label",
    "parents",
    "children",
    "epitope_count",
    "epitope_sum",
];

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("table has no header row")]
    MissingHeader,
    #[error("header is missing column `{0}`")]
    MissingColumn(String),
    #[error("line {line}: {message}")]
    InvalidRow { line: usize, message: String },
}

fn invalid(line: usize, message: impl Into<String>) -> TableError {
    TableError::InvalidRow {
        line,
        message: message.into(),
    }
}

// ============================================================================
// Cells
// ============================================================================

pub fn escape_cell(value: &str) -> Cow<'_, str> {
    if !value.contains(['\\', '\t', '\n', '\r']) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

pub fn unescape_cell(cell: &str) -> String {
    if !cell.contains('\\') {
        return cell.to_string();
    }
    let mut out = String::with_capacity(cell.len());
    let mut chars = cell.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn write_row<W: Write>(w: &mut W, cells: &[&str]) -> io::Result<()> {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            w.write_all(b"\t")?;
        }
        w.write_all(escape_cell(cell).as_bytes())?;
    }
    w.write_all(b"\n")
}

fn split_row(line: &str) -> Vec<String> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    line.split('\t').map(unescape_cell).collect()
}

struct Header {
    columns: HashMap<String, usize>,
}

impl Header {
    fn read<I>(lines: &mut I) -> Result<Self, TableError>
    where
        I: Iterator<Item = io::Result<String>>,
    {
        let line = lines.next().ok_or(TableError::MissingHeader)??;
        let columns = split_row(&line)
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name, i))
            .collect();
        Ok(Self { columns })
    }

    fn get(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    fn require(&self, name: &str) -> Result<usize, TableError> {
        self.get(name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }
}

fn cell(cells: &[String], column: Option<usize>) -> &str {
    column
        .and_then(|i| cells.get(i))
        .map(String::as_str)
        .unwrap_or("")
}

// ============================================================================
// Statement table
// ============================================================================

/// Cells of one statement row, in [`STATEMENT_HEADERS`] order.
pub fn statement_cells(statement: &Statement) -> [&str; 10] {
    let mut cells = [""; 10];
    cells[0] = &statement.zn;
    match &statement.subject {
        Subject::Curie(s) => cells[1] = s,
        Subject::Blank(s) => cells[2] = s,
    }
    cells[3] = &statement.predicate;
    match &statement.object {
        Object::Iri(s) => cells[4] = s,
        Object::Curie(s) => cells[5] = s,
        Object::Blank(s) => cells[6] = s,
        Object::Literal(lit) => {
            cells[7] = &lit.value;
            match &lit.tag {
                Some(LiteralTag::Datatype(dt)) => cells[8] = dt,
                Some(LiteralTag::Language(lt)) => cells[9] = lt,
                None => {}
            }
        }
    }
    cells
}

pub fn write_statement_header<W: Write>(w: &mut W) -> io::Result<()> {
    write_row(w, &STATEMENT_HEADERS)
}

pub fn write_statement<W: Write>(w: &mut W, statement: &Statement) -> io::Result<()> {
    write_row(w, &statement_cells(statement))
}

pub fn write_statements<'a, W, I>(w: &mut W, rows: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Statement>,
{
    write_statement_header(w)?;
    for row in rows {
        write_statement(w, row)?;
    }
    Ok(())
}

struct StatementColumns {
    zn: Option<usize>,
    sc: Option<usize>,
    sb: Option<usize>,
    pc: usize,
    oi: Option<usize>,
    oc: Option<usize>,
    ob: Option<usize>,
    ol: Option<usize>,
    dc: Option<usize>,
    lt: Option<usize>,
}

impl StatementColumns {
    fn from_header(header: &Header) -> Result<Self, TableError> {
        if header.get("sc").is_none() && header.get("sb").is_none() {
            return Err(TableError::MissingColumn("sc".to_string()));
        }
        Ok(Self {
            zn: header.get("zn"),
            sc: header.get("sc"),
            sb: header.get("sb"),
            pc: header.require("pc")?,
            oi: header.get("oi"),
            oc: header.get("oc"),
            ob: header.get("ob"),
            ol: header.get("ol"),
            dc: header.get("dc"),
            lt: header.get("lt"),
        })
    }

    fn decode(&self, line: usize, cells: &[String]) -> Result<Statement, TableError> {
        let subject = match (cell(cells, self.sc), cell(cells, self.sb)) {
            (sc, "") if !sc.is_empty() => Subject::Curie(sc.to_string()),
            ("", sb) if !sb.is_empty() => Subject::Blank(sb.to_string()),
            _ => return Err(invalid(line, "expected exactly one of sc/sb")),
        };

        let predicate = cell(cells, Some(self.pc));
        if predicate.is_empty() {
            return Err(invalid(line, "missing predicate (pc)"));
        }

        let oi = cell(cells, self.oi);
        let oc = cell(cells, self.oc);
        let ob = cell(cells, self.ob);
        let ol = cell(cells, self.ol);
        let dc = cell(cells, self.dc);
        let lt = cell(cells, self.lt);

        let node_fields = [oi, oc, ob].iter().filter(|s| !s.is_empty()).count();
        let object = match node_fields {
            // No node object: the row is a literal, possibly the empty string.
            0 => {
                let tag = match (dc, lt) {
                    ("", "") => None,
                    (dt, "") => Some(LiteralTag::Datatype(dt.to_string())),
                    ("", lang) => Some(LiteralTag::Language(lang.to_string())),
                    _ => return Err(invalid(line, "literal has both dc and lt")),
                };
                Object::Literal(Literal {
                    value: ol.to_string(),
                    tag,
                })
            }
            1 => {
                if !ol.is_empty() {
                    return Err(invalid(line, "expected exactly one of oi/oc/ob/ol"));
                }
                if !dc.is_empty() || !lt.is_empty() {
                    return Err(invalid(line, "dc/lt are only allowed on literal objects"));
                }
                if !oi.is_empty() {
                    Object::Iri(oi.to_string())
                } else if !oc.is_empty() {
                    Object::Curie(oc.to_string())
                } else {
                    Object::Blank(ob.to_string())
                }
            }
            _ => return Err(invalid(line, "expected exactly one of oi/oc/ob/ol")),
        };

        let zn = match cell(cells, self.zn) {
            "" => subject.as_str().to_string(),
            zn => zn.to_string(),
        };

        Ok(Statement {
            zn,
            subject,
            predicate: predicate.to_string(),
            object,
        })
    }
}

/// Read a whole statement table. Blank lines are skipped.
pub fn read_statements<R: BufRead>(reader: R) -> Result<Vec<Statement>, TableError> {
    let mut lines = reader.lines();
    let header = Header::read(&mut lines)?;
    let columns = StatementColumns::from_header(&header)?;

    let mut out = Vec::new();
    for (i, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        // Header is line 1.
        out.push(columns.decode(i + 2, &split_row(&line))?);
    }
    Ok(out)
}

// ============================================================================
// Tree tables (active / pruned)
// ============================================================================

/// One row of an active or pruned tree table. Ids are curies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeRow {
    pub id: String,
    pub label: String,
    pub parents: Vec<String>,
    pub children: Vec<String>,
    pub epitope_count: u64,
    pub epitope_sum: u64,
}

pub fn write_tree_rows<'a, W, I>(w: &mut W, rows: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a TreeRow>,
{
    write_row(w, &TREE_HEADERS)?;
    for row in rows {
        let parents = row.parents.join(" ");
        let children = row.children.join(" ");
        let count = row.epitope_count.to_string();
        let sum = row.epitope_sum.to_string();
        write_row(
            w,
            &[
                row.id.as_str(),
                row.label.as_str(),
                parents.as_str(),
                children.as_str(),
                count.as_str(),
                sum.as_str(),
            ],
        )?;
    }
    Ok(())
}

pub fn read_tree_rows<R: BufRead>(reader: R) -> Result<Vec<TreeRow>, TableError> {
    let mut lines = reader.lines();
    let header = Header::read(&mut lines)?;
    let id = header.require("id")?;
    let label = header.get("label");
    let parents = header.require("parents")?;
    let children = header.require("children")?;
    let count = header.get("epitope_count");
    let sum = header.get("epitope_sum");

    let parse_count = |line: usize, value: &str| -> Result<u64, TableError> {
        if value.is_empty() {
            return Ok(0);
        }
        value
            .parse::<u64>()
            .map_err(|_| invalid(line, format!("invalid count `{value}`")))
    };

    let mut out = Vec::new();
    for (i, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let line_no = i + 2;
        let cells = split_row(&line);
        let row_id = cell(&cells, Some(id));
        if row_id.is_empty() {
            return Err(invalid(line_no, "missing id"));
        }
        out.push(TreeRow {
            id: row_id.to_string(),
            label: cell(&cells, label).to_string(),
            parents: cell(&cells, Some(parents))
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            children: cell(&cells, Some(children))
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            epitope_count: parse_count(line_no, cell(&cells, count))?,
            epitope_sum: parse_count(line_no, cell(&cells, sum))?,
        });
    }
    Ok(out)
}

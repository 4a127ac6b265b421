use std::io;

/// Errors raised while reading dump, weight and record inputs.
///
/// All of these are fatal for a conversion run. Non-fatal conditions
/// (unknown ranks, unresolvable parents, duplicate disambiguators) are
/// logged and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum TaxdumpError {
    #[error("{file}: {source}")]
    Io {
        file: String,
        #[source]
        source: io::Error,
    },
    #[error("{file}:{line}: malformed record, expected at least {expected} fields, found {found}")]
    MalformedRecord {
        file: String,
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("{file}:{line}: invalid weight `{value}`")]
    InvalidWeight {
        file: String,
        line: usize,
        value: String,
    },
    #[error("{file}:{line}: weight of {tax_id} overflows u64")]
    WeightOverflow {
        file: String,
        line: usize,
        tax_id: String,
    },
    #[error("{file}: header is missing column `{column}`")]
    MissingColumn { file: String, column: String },
    #[error("{file}: no header row")]
    MissingHeader { file: String },
}

impl TaxdumpError {
    pub(crate) fn io(file: &str, source: io::Error) -> Self {
        Self::Io {
            file: file.to_string(),
            source,
        }
    }
}

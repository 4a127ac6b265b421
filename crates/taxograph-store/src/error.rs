use std::io;
use taxograph_model::TableError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{path}: {source}")]
    Table {
        path: String,
        #[source]
        source: TableError,
    },
    #[error("{path}:{line}: {message}")]
    Prefixes {
        path: String,
        line: usize,
        message: String,
    },
}

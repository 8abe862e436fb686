use thiserror::Error;

#[derive(Error, Debug)]
pub enum HicError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("File is empty (no header row): {0}")]
    EmptyFile(String),
    #[error("Missing column '{column}' in {path}")]
    MissingColumn { path: String, column: String },
    #[error("{path}:{line}: invalid value '{value}' in column '{column}'")]
    Parse {
        path: String,
        line: usize,
        column: String,
        value: String,
    },
    #[error("{path}:{line}: expected at least {expected} fields, found {found}")]
    ShortRow {
        path: String,
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Invalid bin range: start bin {start} is greater than end bin {end}")]
    InvalidRange { start: i64, end: i64 },
    #[error("Bin range {start}..={end} is too large for a dense matrix")]
    RangeTooLarge { start: i64, end: i64 },
    #[error("Bin {0} not found in bin table")]
    BinNotFound(i64),
    #[error("Matrix shapes differ: {0}x{0} vs {1}x{1}")]
    ShapeMismatch(usize, usize),
    #[error("Bin tables must be identical: {0}")]
    BinTableMismatch(String),
    #[error("Invalid colour literal: {0}")]
    InvalidColor(String),
}

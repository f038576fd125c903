use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum KeymatchError {
    /// Key field counts differ between the two collections being compared.
    KeyArityMismatch { left: usize, right: usize },
    /// A requested key field is not a column of the source.
    MissingKeyField { field: String },
    /// A merge field is absent from the matched record on the other side.
    UnknownMergeField { field: String },
    /// Field-name derivation attempted on an empty collection.
    EmptyCollection,
    /// Field-name derivation attempted on an empty comparison result.
    EmptyResult,
    /// A record being written lacks a declared output column.
    SchemaMismatch { column: String },
    /// Source file does not exist.
    SourceNotFound(PathBuf),
    /// IO-level failure reading or writing a source.
    SourceUnreadable(String),
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad operation, inconsistent keys, etc.).
    ConfigValidation(String),
}

impl fmt::Display for KeymatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyArityMismatch { left, right } => {
                write!(f, "key arity mismatch: left has {left} key field(s), right has {right}")
            }
            Self::MissingKeyField { field } => {
                write!(f, "key field '{field}' is not a column of the source")
            }
            Self::UnknownMergeField { field } => {
                write!(f, "merge field '{field}' is absent from the matched record")
            }
            Self::EmptyCollection => {
                write!(f, "cannot derive field names from an empty collection")
            }
            Self::EmptyResult => {
                write!(f, "cannot derive field names from an empty comparison result")
            }
            Self::SchemaMismatch { column } => {
                write!(f, "record is missing output column '{column}'")
            }
            Self::SourceNotFound(path) => write!(f, "source not found: {}", path.display()),
            Self::SourceUnreadable(msg) => write!(f, "source unreadable: {msg}"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for KeymatchError {}

use std::path::PathBuf;

use ezspreadsheet_common::{Value, ValueKind};
use ezspreadsheet_store::StoreError;
use thiserror::Error;

/// Problems with a record shape, found before any row is touched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("record has {count} attributes; at most {max} are supported")]
    TooManyAttributes { count: usize, max: usize },

    #[error("attribute `{0}` is declared more than once")]
    DuplicateAttribute(String),

    #[error("attribute at column {0} has an empty name")]
    EmptyAttribute(usize),

    #[error("`{0}` does not declare its attributes; derive `Record` for it")]
    Undeclared(String),

    #[error("stored header {found:?} does not match the attributes {expected:?}")]
    HeaderMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// A single value that could not be coerced into a field's type.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("expected {expected}, found {} {}", found.kind(), found.repr())]
pub struct CoerceError {
    pub expected: ValueKind,
    pub found: Value,
}

impl CoerceError {
    pub fn new(expected: ValueKind, found: Value) -> Self {
        Self { expected, found }
    }
}

/// A stored row that does not fit the record it is decoded into.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    #[error("row has {found} cells but the record has {expected} attributes")]
    RowWidth { expected: usize, found: usize },

    #[error("no value left for field `{field}`")]
    Missing { field: String },

    #[error("field `{field}`: {source}")]
    Coerce {
        field: String,
        #[source]
        source: CoerceError,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("row {row}: {source}")]
    Decode {
        row: u32,
        #[source]
        source: DecodeError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("provided instance of `{found}` is not of type `{expected}`")]
    TypeMismatch { expected: String, found: String },

    #[error("no record type is bound to this spreadsheet; nothing can be stored")]
    Unbound,

    #[error("{} is open in another program; save abandoned", path.display())]
    ResourceLocked {
        path: PathBuf,
        #[source]
        source: StoreError,
    },

    #[error("{} has no header row", path.display())]
    MissingHeader { path: PathBuf },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

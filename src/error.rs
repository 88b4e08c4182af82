use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// Failure reading or writing one of the JSON data files.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A string that does not name a member of one of the model enums.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} '{value}'")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        ParseError { kind, value: value.to_string() }
    }
}

/// Rejected filter update. The filter state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("unknown filter field '{0}'")]
    UnknownField(String),
    #[error(transparent)]
    InvalidValue(#[from] ParseError),
    #[error("unknown category id '{0}'")]
    UnknownCategory(String),
}

/// Errors raised by the task and category stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task {0} not found")]
    TaskNotFound(u64),
    #[error("category '{0}' not found")]
    CategoryNotFound(String),
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Error envelope returned by a remote collaborator (auth service, assistant).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status {status})")]
pub struct ApiError {
    pub message: String,
    pub status: u16,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        ApiError { message: message.into(), status }
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("no tasks selected for summary")]
    NoTasksSelected,
    #[error(transparent)]
    Api(#[from] ApiError),
}

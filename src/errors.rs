//! Typed error definitions for scoped_tree.
//! One variant per failure kind the tree layer distinguishes, plus the
//! per-operation wrapper callers actually receive.

use std::fmt;
use std::io;
use thiserror::Error;

/// Failure kinds raised while walking or mutating the tree.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Invalid folder reference: {0}")]
    InvalidRoot(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{path}: expected {expected}")]
    WrongKind { path: String, expected: &'static str },

    #[error("{0}")]
    AlreadyExists(String),

    #[error("Directory not empty: {0}")]
    NotEmpty(String),

    #[error("{0}")]
    Provider(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// Plain tag for a [`TreeError`], for callers that branch on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    InvalidRoot,
    NotFound,
    WrongKind,
    AlreadyExists,
    NotEmpty,
    ProviderFailure,
    IoFailure,
    Decode,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::InvalidRoot => "invalid_root",
            ErrorKind::NotFound => "not_found",
            ErrorKind::WrongKind => "wrong_kind",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::NotEmpty => "not_empty",
            ErrorKind::ProviderFailure => "provider_failure",
            ErrorKind::IoFailure => "io_failure",
            ErrorKind::Decode => "decode",
        }
    }
}

impl TreeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TreeError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            TreeError::InvalidRoot(_) => ErrorKind::InvalidRoot,
            TreeError::NotFound(_) => ErrorKind::NotFound,
            TreeError::WrongKind { .. } => ErrorKind::WrongKind,
            TreeError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            TreeError::NotEmpty(_) => ErrorKind::NotEmpty,
            TreeError::Provider(_) => ErrorKind::ProviderFailure,
            TreeError::Io { .. } => ErrorKind::IoFailure,
            TreeError::Decode(_) => ErrorKind::Decode,
        }
    }

    /// Stable numeric code, used as the process exit status by the CLI.
    pub fn code(&self) -> i32 {
        match self.kind() {
            ErrorKind::InvalidArgument => 2,
            ErrorKind::InvalidRoot => 3,
            ErrorKind::NotFound => 4,
            ErrorKind::WrongKind => 5,
            ErrorKind::AlreadyExists => 6,
            ErrorKind::ProviderFailure => 7,
            ErrorKind::IoFailure => 8,
            ErrorKind::Decode => 9,
            ErrorKind::NotEmpty => 10,
        }
    }

    pub(crate) fn io(context: impl Into<String>) -> impl FnOnce(io::Error) -> TreeError {
        let context = context.into();
        move |source| TreeError::Io { context, source }
    }
}

/// Public operations, named the way callers invoke them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    WriteFile,
    AppendFile,
    ReadFile,
    Mkdir,
    Rmdir,
    Readdir,
    Stat,
    Exists,
    DeleteFile,
    Move,
    Copy,
    GetUriForPath,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::WriteFile => "writeFile",
            Operation::AppendFile => "appendFile",
            Operation::ReadFile => "readFile",
            Operation::Mkdir => "mkdir",
            Operation::Rmdir => "rmdir",
            Operation::Readdir => "readdir",
            Operation::Stat => "stat",
            Operation::Exists => "exists",
            Operation::DeleteFile => "deleteFile",
            Operation::Move => "move",
            Operation::Copy => "copy",
            Operation::GetUriForPath => "getUriForPath",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single rejection a public operation produces.
#[derive(Debug, Error)]
#[error("{op} failed: {source}")]
pub struct OperationError {
    pub op: Operation,
    #[source]
    pub source: TreeError,
}

impl OperationError {
    pub fn new(op: Operation, source: TreeError) -> Self {
        Self { op, source }
    }

    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }

    pub fn code(&self) -> i32 {
        self.source.code()
    }
}

pub type TreeResult<T> = std::result::Result<T, TreeError>;
pub type OpResult<T> = std::result::Result<T, OperationError>;

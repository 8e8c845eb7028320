use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum FsError {
    #[error("no such file or directory: {0}")]
    NotFound(String),

    #[error("file exists: {0}")]
    AlreadyExists(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("is a directory: {0}")]
    IsADirectory(String),

    #[error("directory not empty: {0}")]
    DirectoryNotEmpty(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("I/O operation on closed file")]
    HandleClosed,

    #[error("invalid mode: {0}")]
    InvalidMode(String),

    #[error("file not open for {0}")]
    UnsupportedOperation(String),

    #[error("bad offset")]
    BadOffset,

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("config: {0}")]
    Config(String),
}

impl FsError {
    /// Process exit code for front ends reporting this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            FsError::NotFound(_) => 2,
            FsError::HandleClosed => 9,
            FsError::AlreadyExists(_) => 17,
            FsError::NotADirectory(_) => 20,
            FsError::IsADirectory(_) => 21,
            FsError::InvalidPath(_) | FsError::InvalidMode(_) | FsError::BadOffset => 22,
            FsError::QuotaExceeded(_) => 28,
            FsError::DirectoryNotEmpty(_) => 39,
            FsError::UnsupportedOperation(_) | FsError::InvalidData(_) | FsError::Config(_) => 1,
        }
    }
}

impl From<serde_json::Error> for FsError {
    fn from(e: serde_json::Error) -> Self {
        FsError::Config(e.to_string())
    }
}

impl From<FsError> for std::io::Error {
    fn from(e: FsError) -> Self {
        use std::io::ErrorKind;

        let kind = match &e {
            FsError::NotFound(_) => ErrorKind::NotFound,
            FsError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            FsError::NotADirectory(_) => ErrorKind::NotADirectory,
            FsError::IsADirectory(_) => ErrorKind::IsADirectory,
            FsError::DirectoryNotEmpty(_) => ErrorKind::DirectoryNotEmpty,
            FsError::InvalidPath(_) | FsError::InvalidMode(_) | FsError::BadOffset => {
                ErrorKind::InvalidInput
            }
            FsError::InvalidData(_) | FsError::Config(_) => ErrorKind::InvalidData,
            FsError::QuotaExceeded(_) => ErrorKind::StorageFull,
            FsError::UnsupportedOperation(_) => ErrorKind::Unsupported,
            FsError::HandleClosed => ErrorKind::Other,
        };
        std::io::Error::new(kind, e)
    }
}

pub type FsResult<T> = Result<T, FsError>;

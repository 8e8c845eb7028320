//! Core types shared by the filesystem, its handles and its callers.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_with::base64::Base64;
use serde_with::serde_as;

use crate::error::{FsError, FsResult};

/// Enum for distinguishing node types at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    File,
    Dir,
}

/// How a file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpenMode {
    /// `r`
    Read,
    /// `w`: create or truncate.
    Write,
    /// `a`: create, cursor at end.
    Append,
    /// `rb`
    ReadBinary,
    /// `wb`
    WriteBinary,
    /// `r+`: existing file, read and overwrite in place.
    ReadWrite,
}

impl OpenMode {
    pub fn is_readable(self) -> bool {
        matches!(
            self,
            OpenMode::Read | OpenMode::ReadBinary | OpenMode::ReadWrite
        )
    }

    pub fn is_writable(self) -> bool {
        !matches!(self, OpenMode::Read | OpenMode::ReadBinary)
    }

    /// Modes that need the file to exist before opening.
    pub fn requires_existing(self) -> bool {
        self.is_readable()
    }

    pub fn truncates(self) -> bool {
        matches!(self, OpenMode::Write | OpenMode::WriteBinary)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OpenMode::Read => "r",
            OpenMode::Write => "w",
            OpenMode::Append => "a",
            OpenMode::ReadBinary => "rb",
            OpenMode::WriteBinary => "wb",
            OpenMode::ReadWrite => "r+",
        }
    }
}

impl FromStr for OpenMode {
    type Err = FsError;

    fn from_str(s: &str) -> FsResult<Self> {
        match s {
            "r" | "rt" => Ok(OpenMode::Read),
            "w" | "wt" => Ok(OpenMode::Write),
            "a" | "at" => Ok(OpenMode::Append),
            "rb" => Ok(OpenMode::ReadBinary),
            "wb" => Ok(OpenMode::WriteBinary),
            "r+" | "r+t" => Ok(OpenMode::ReadWrite),
            other => Err(FsError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub name: String,
    pub file_type: FileType,
    pub size: u64,
    #[serde(with = "serde_millis")]
    pub modified: SystemTime,
}

impl Stat {
    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Dir
    }

    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }
}

/// One step of a walk: a directory and its sorted immediate children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkEntry {
    pub dirpath: String,
    pub dirs: Vec<String>,
    pub files: Vec<String>,
}

impl WalkEntry {
    pub fn new(dirpath: impl Into<String>, dirs: Vec<String>, files: Vec<String>) -> Self {
        Self {
            dirpath: dirpath.into(),
            dirs,
            files,
        }
    }
}

/// Whole-tree export: file path to its bytes, empty directory path to `None`.
///
/// Directories with children are implied by their descendants. File bytes are
/// base64 encoded when serialized.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde_as(as = "BTreeMap<_, Option<Base64>>")]
    pub entries: BTreeMap<String, Option<Vec<u8>>>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> FsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> FsResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

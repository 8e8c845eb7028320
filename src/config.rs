//! Filesystem limits.

use serde::{Deserialize, Serialize};

use crate::error::{FsError, FsResult};

/// Capacity limits applied by [`crate::MemoryFileSystem`]. `None` means
/// unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FsConfig {
    /// Largest allowed file, in bytes.
    pub max_file_size: Option<u64>,
    /// Largest number of files and directories, root excluded.
    pub max_nodes: Option<usize>,
}

impl FsConfig {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = Some(bytes);
        self
    }

    pub fn with_max_nodes(mut self, nodes: usize) -> Self {
        self.max_nodes = Some(nodes);
        self
    }

    pub fn from_json(json: &str) -> FsResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub(crate) fn check_file_size(&self, size: usize, path: &str) -> FsResult<()> {
        match self.max_file_size {
            Some(max) if size as u64 > max => Err(FsError::QuotaExceeded(format!(
                "{} would grow to {} bytes (limit {})",
                path, size, max
            ))),
            _ => Ok(()),
        }
    }

    pub(crate) fn check_node_count(&self, count: usize) -> FsResult<()> {
        match self.max_nodes {
            Some(max) if count > max => Err(FsError::QuotaExceeded(format!(
                "{} nodes (limit {})",
                count, max
            ))),
            _ => Ok(()),
        }
    }
}

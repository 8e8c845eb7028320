use crate::error::FsResult;
use crate::types::{Snapshot, Stat, WalkEntry};

/// Path-addressed surface offered to async collaborators.
///
/// Implementations serialize mutations; read-only calls may overlap each
/// other but never a mutation.
#[async_trait::async_trait]
pub trait FsBackend: Send + Sync + 'static {
    async fn exists(&self, path: &str) -> bool;

    async fn isfile(&self, path: &str) -> bool;

    async fn isdir(&self, path: &str) -> bool;

    async fn stat(&self, path: &str) -> FsResult<Stat>;

    async fn mkdir(&self, path: &str) -> FsResult<()>;

    async fn makedirs(&self, path: &str, exist_ok: bool) -> FsResult<()>;

    async fn listdir(&self, path: &str) -> FsResult<Vec<String>>;

    async fn remove(&self, path: &str) -> FsResult<()>;

    async fn rmdir(&self, path: &str) -> FsResult<()>;

    async fn rename(&self, src: &str, dst: &str) -> FsResult<()>;

    async fn readfile(&self, path: &str) -> FsResult<Vec<u8>>;

    async fn writefile(&self, path: &str, content: &[u8]) -> FsResult<()>;

    /// Collected walk; the tree cannot change while it runs.
    async fn walk(&self, path: &str) -> FsResult<Vec<WalkEntry>>;

    async fn snapshot(&self) -> Snapshot;
}

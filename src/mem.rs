//! Lock-guarded filesystem for concurrent callers.

use std::sync::Arc;

use tokio::sync::{
    OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use crate::backend::FsBackend;
use crate::backends::memory::{FileHandle, FsAccess, MemoryFileSystem};
use crate::config::FsConfig;
use crate::error::FsResult;
use crate::path::ResolvedPath;
use crate::types::{OpenMode, Snapshot, Stat, WalkEntry};

/// Handle returned by [`SharedFs::open`]. Holds its lock until it is dropped.
pub type SharedHandle = FileHandle<SharedGuard>;

/// The tree lock held by a [`SharedHandle`].
pub enum SharedGuard {
    Read(OwnedRwLockReadGuard<MemoryFileSystem>),
    Write(OwnedRwLockWriteGuard<MemoryFileSystem>),
}

impl FsAccess for SharedGuard {
    fn fs(&self) -> &MemoryFileSystem {
        match self {
            SharedGuard::Read(guard) => &**guard,
            SharedGuard::Write(guard) => &**guard,
        }
    }

    fn fs_mut(&mut self) -> Option<&mut MemoryFileSystem> {
        match self {
            SharedGuard::Read(_) => None,
            SharedGuard::Write(guard) => Some(&mut **guard),
        }
    }
}

/// A [`MemoryFileSystem`] behind one tree-wide read/write lock.
///
/// Clones share the same tree.
#[derive(Debug, Clone, Default)]
pub struct SharedFs {
    inner: Arc<RwLock<MemoryFileSystem>>,
}

impl SharedFs {
    pub fn new() -> Self {
        Self::from_fs(MemoryFileSystem::new())
    }

    pub fn with_config(config: FsConfig) -> Self {
        Self::from_fs(MemoryFileSystem::with_config(config))
    }

    pub fn from_fs(fs: MemoryFileSystem) -> Self {
        Self {
            inner: Arc::new(RwLock::new(fs)),
        }
    }

    /// Open a file. Read-only modes share the tree lock with other readers;
    /// write-capable modes hold it exclusively. Either way, mutations wait
    /// until the handle is dropped.
    pub async fn open(&self, path: &str, mode: OpenMode) -> FsResult<SharedHandle> {
        let path = ResolvedPath::resolve(path);
        if mode.is_writable() {
            let mut guard = Arc::clone(&self.inner).write_owned().await;
            let buffer = guard.prepare_open(&path, mode)?;
            Ok(FileHandle::new(SharedGuard::Write(guard), path, mode, buffer))
        } else {
            let guard = Arc::clone(&self.inner).read_owned().await;
            let buffer = guard.prepare_read(&path)?;
            Ok(FileHandle::new(SharedGuard::Read(guard), path, mode, buffer))
        }
    }

    /// Shared access for several reads against one consistent tree.
    pub async fn lock_shared(&self) -> RwLockReadGuard<'_, MemoryFileSystem> {
        self.inner.read().await
    }

    /// Exclusive access for a sequence of mutations applied together.
    pub async fn lock(&self) -> RwLockWriteGuard<'_, MemoryFileSystem> {
        self.inner.write().await
    }
}

#[async_trait::async_trait]
impl FsBackend for SharedFs {
    async fn exists(&self, path: &str) -> bool {
        self.inner.read().await.exists(path)
    }

    async fn isfile(&self, path: &str) -> bool {
        self.inner.read().await.isfile(path)
    }

    async fn isdir(&self, path: &str) -> bool {
        self.inner.read().await.isdir(path)
    }

    async fn stat(&self, path: &str) -> FsResult<Stat> {
        self.inner.read().await.stat(path)
    }

    async fn mkdir(&self, path: &str) -> FsResult<()> {
        self.inner.write().await.mkdir(path)
    }

    async fn makedirs(&self, path: &str, exist_ok: bool) -> FsResult<()> {
        self.inner.write().await.makedirs(path, exist_ok)
    }

    async fn listdir(&self, path: &str) -> FsResult<Vec<String>> {
        self.inner.read().await.listdir(path)
    }

    async fn remove(&self, path: &str) -> FsResult<()> {
        self.inner.write().await.remove(path)
    }

    async fn rmdir(&self, path: &str) -> FsResult<()> {
        self.inner.write().await.rmdir(path)
    }

    async fn rename(&self, src: &str, dst: &str) -> FsResult<()> {
        self.inner.write().await.rename(src, dst)
    }

    async fn readfile(&self, path: &str) -> FsResult<Vec<u8>> {
        self.inner.read().await.readfile(path)
    }

    async fn writefile(&self, path: &str, content: &[u8]) -> FsResult<()> {
        self.inner.write().await.writefile(path, content)
    }

    async fn walk(&self, path: &str) -> FsResult<Vec<WalkEntry>> {
        let fs = self.inner.read().await;
        let entries = fs.walk(path)?.collect();
        Ok(entries)
    }

    async fn snapshot(&self) -> Snapshot {
        self.inner.read().await.snapshot()
    }
}

//! Core MemoryFileSystem implementation.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::FsConfig;
use crate::error::{FsError, FsResult};
use crate::path::{self, ResolvedPath};
use crate::types::{OpenMode, Snapshot, Stat};

use super::handle::FileHandle;
use super::node::{DirNode, FileNode, Node};
use super::walk::Walk;

/// In-memory hierarchical filesystem.
///
/// The root directory owns the whole tree. Mutating operations take
/// `&mut self`, and an open [`FileHandle`] keeps its borrow (shared for
/// [`open_read`](Self::open_read), exclusive for [`open`](Self::open)) until
/// it is dropped, so nothing can reshape the tree under a live handle. Every
/// mutation validates before it touches the tree and either applies fully or
/// leaves it unchanged.
#[derive(Debug, Clone)]
pub struct MemoryFileSystem {
    root: Node,
    config: FsConfig,
    node_count: usize,
}

impl MemoryFileSystem {
    /// Create a new in-memory filesystem with an empty root directory
    pub fn new() -> Self {
        Self::with_config(FsConfig::default())
    }

    pub fn with_config(config: FsConfig) -> Self {
        Self {
            root: Node::new_dir(),
            config,
            node_count: 0,
        }
    }

    /// Rebuild a filesystem from an exported [`Snapshot`].
    pub fn from_snapshot(snapshot: &Snapshot, config: FsConfig) -> FsResult<Self> {
        let mut fs = Self::with_config(config);
        for (entry, content) in &snapshot.entries {
            match content {
                None => fs.makedirs(entry, true)?,
                Some(data) => {
                    fs.makedirs(&path::dirname(entry), true)?;
                    fs.writefile(entry, data)?;
                }
            }
        }
        Ok(fs)
    }

    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    /// Files and directories currently stored, root excluded.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    fn lookup(&self, path: &ResolvedPath) -> Option<&Node> {
        path.components()
            .iter()
            .try_fold(&self.root, |node, name| node.as_dir()?.get(name))
    }

    /// Walk to the directory at `path`, reporting the first segment that is
    /// missing or not a directory.
    fn dir(&self, path: &ResolvedPath) -> FsResult<&DirNode> {
        let mut node = &self.root;
        for (depth, name) in path.components().iter().enumerate() {
            let dir = node
                .as_dir()
                .ok_or_else(|| FsError::NotADirectory(path.prefix(depth).to_string()))?;
            node = dir
                .get(name)
                .ok_or_else(|| FsError::NotFound(path.to_string()))?;
        }
        node.as_dir()
            .ok_or_else(|| FsError::NotADirectory(path.to_string()))
    }

    fn dir_mut(&mut self, path: &ResolvedPath) -> FsResult<&mut DirNode> {
        let mut node = &mut self.root;
        for (depth, name) in path.components().iter().enumerate() {
            let dir = node
                .as_dir_mut()
                .ok_or_else(|| FsError::NotADirectory(path.prefix(depth).to_string()))?;
            node = dir
                .get_mut(name)
                .ok_or_else(|| FsError::NotFound(path.to_string()))?;
        }
        node.as_dir_mut()
            .ok_or_else(|| FsError::NotADirectory(path.to_string()))
    }

    fn node(&self, path: &ResolvedPath) -> FsResult<&Node> {
        match path.split_last() {
            None => Ok(&self.root),
            Some((parent, name)) => self
                .dir(&parent)?
                .get(name)
                .ok_or_else(|| FsError::NotFound(path.to_string())),
        }
    }

    fn file(&self, path: &ResolvedPath) -> FsResult<&FileNode> {
        match self.node(path)? {
            Node::File(file) => Ok(file),
            Node::Dir(_) => Err(FsError::IsADirectory(path.to_string())),
        }
    }

    pub fn exists(&self, path: &str) -> bool {
        self.lookup(&ResolvedPath::resolve(path)).is_some()
    }

    pub fn isfile(&self, path: &str) -> bool {
        self.lookup(&ResolvedPath::resolve(path))
            .is_some_and(Node::is_file)
    }

    pub fn isdir(&self, path: &str) -> bool {
        self.lookup(&ResolvedPath::resolve(path))
            .is_some_and(Node::is_dir)
    }

    pub fn stat(&self, path: &str) -> FsResult<Stat> {
        let path = ResolvedPath::resolve(path);
        let node = self.node(&path)?;
        Ok(Stat {
            name: path.name().unwrap_or("/").to_string(),
            file_type: node.file_type(),
            size: node.size(),
            modified: node.mtime(),
        })
    }

    pub fn mkdir(&mut self, path: &str) -> FsResult<()> {
        let path = ResolvedPath::resolve(path);
        let Some((parent, name)) = path.split_last() else {
            return Err(FsError::AlreadyExists(path.to_string()));
        };

        if self.dir(&parent)?.contains(name) {
            return Err(FsError::AlreadyExists(path.to_string()));
        }
        self.config.check_node_count(self.node_count + 1)?;

        self.dir_mut(&parent)?.insert(name, Node::new_dir());
        self.node_count += 1;
        debug!(path = %path, "mkdir");
        Ok(())
    }

    /// Create `path` and every missing directory above it.
    pub fn makedirs(&mut self, path: &str, exist_ok: bool) -> FsResult<()> {
        let path = ResolvedPath::resolve(path);

        // Find how much of the path already exists.
        let mut node = &self.root;
        let mut existing = 0;
        for name in path.components() {
            let dir = node
                .as_dir()
                .ok_or_else(|| FsError::NotADirectory(path.prefix(existing).to_string()))?;
            match dir.get(name) {
                Some(child) => {
                    node = child;
                    existing += 1;
                }
                None => break,
            }
        }

        let total = path.components().len();
        if existing == total {
            return match node {
                Node::Dir(_) if exist_ok => Ok(()),
                _ => Err(FsError::AlreadyExists(path.to_string())),
            };
        }

        let missing = total - existing;
        self.config.check_node_count(self.node_count + missing)?;

        let mut dir = self.dir_mut(&path.prefix(existing))?;
        for name in &path.components()[existing..] {
            dir = dir
                .insert(name, Node::new_dir())
                .as_dir_mut()
                .ok_or_else(|| FsError::NotADirectory(path.to_string()))?;
        }
        self.node_count += missing;
        debug!(path = %path, created = missing, "makedirs");
        Ok(())
    }

    /// Open the file at `path`. The returned handle borrows the filesystem
    /// until it is dropped; buffered writes are committed when it closes.
    pub fn open(&mut self, path: &str, mode: OpenMode) -> FsResult<FileHandle<&mut Self>> {
        let path = ResolvedPath::resolve(path);
        let buffer = self.prepare_open(&path, mode)?;
        Ok(FileHandle::new(self, path, mode, buffer))
    }

    /// Open an existing file for reading through a shared borrow, so several
    /// read handles and plain queries can be live at once. Write-capable
    /// modes fail with `InvalidMode`; use [`open`](Self::open) for those.
    pub fn open_read(&self, path: &str, mode: OpenMode) -> FsResult<FileHandle<&Self>> {
        if mode.is_writable() {
            return Err(FsError::InvalidMode(format!("{} needs exclusive access", mode)));
        }
        let path = ResolvedPath::resolve(path);
        let buffer = self.prepare_read(&path)?;
        Ok(FileHandle::new(self, path, mode, buffer))
    }

    /// Content a read-only handle starts from.
    pub(crate) fn prepare_read(&self, path: &ResolvedPath) -> FsResult<Vec<u8>> {
        Ok(self.file(path)?.data.clone())
    }

    /// Validate an open request, create or truncate the file as the mode
    /// requires, and return the content the handle starts from.
    pub(crate) fn prepare_open(&mut self, path: &ResolvedPath, mode: OpenMode) -> FsResult<Vec<u8>> {
        if !mode.is_writable() {
            return self.prepare_read(path);
        }
        let Some((parent, name)) = path.split_last() else {
            return Err(FsError::IsADirectory(path.to_string()));
        };

        let existing = match self.dir(&parent)?.get(name) {
            Some(Node::Dir(_)) => return Err(FsError::IsADirectory(path.to_string())),
            Some(Node::File(_)) if mode.truncates() => Some(Vec::new()),
            Some(Node::File(file)) => Some(file.data.clone()),
            None => None,
        };

        match existing {
            Some(data) => {
                if mode.truncates() {
                    self.commit_file(path, Vec::new())?;
                }
                Ok(data)
            }
            None if mode.requires_existing() => Err(FsError::NotFound(path.to_string())),
            None => {
                self.config.check_node_count(self.node_count + 1)?;
                self.dir_mut(&parent)?.insert(name, Node::new_file());
                self.node_count += 1;
                debug!(path = %path, "create file");
                Ok(Vec::new())
            }
        }
    }

    /// Replace the content of an existing file.
    pub(crate) fn commit_file(&mut self, path: &ResolvedPath, data: Vec<u8>) -> FsResult<()> {
        let Some((parent, name)) = path.split_last() else {
            return Err(FsError::IsADirectory(path.to_string()));
        };
        self.config.check_file_size(data.len(), &path.to_string())?;

        let size = data.len();
        match self.dir_mut(&parent)?.get_mut(name) {
            Some(Node::File(file)) => file.replace(data),
            Some(Node::Dir(_)) => return Err(FsError::IsADirectory(path.to_string())),
            None => return Err(FsError::NotFound(path.to_string())),
        }
        debug!(path = %path, size, "commit");
        Ok(())
    }

    /// Sorted names of the entries in the directory at `path`.
    pub fn listdir(&self, path: &str) -> FsResult<Vec<String>> {
        let path = ResolvedPath::resolve(path);
        Ok(self.dir(&path)?.names().cloned().collect())
    }

    /// Delete a file.
    pub fn remove(&mut self, path: &str) -> FsResult<()> {
        let path = ResolvedPath::resolve(path);
        let Some((parent, name)) = path.split_last() else {
            return Err(FsError::IsADirectory(path.to_string()));
        };

        let dir = self.dir_mut(&parent)?;
        match dir.get(name) {
            None => return Err(FsError::NotFound(path.to_string())),
            Some(Node::Dir(_)) => return Err(FsError::IsADirectory(path.to_string())),
            Some(Node::File(_)) => {}
        }
        dir.remove(name);
        self.node_count -= 1;
        debug!(path = %path, "remove");
        Ok(())
    }

    /// Delete an empty directory.
    pub fn rmdir(&mut self, path: &str) -> FsResult<()> {
        let path = ResolvedPath::resolve(path);
        let Some((parent, name)) = path.split_last() else {
            return Err(FsError::InvalidPath("cannot remove the root directory".into()));
        };

        let dir = self.dir_mut(&parent)?;
        match dir.get(name) {
            None => return Err(FsError::NotFound(path.to_string())),
            Some(Node::File(_)) => return Err(FsError::NotADirectory(path.to_string())),
            Some(Node::Dir(child)) if !child.is_empty() => {
                return Err(FsError::DirectoryNotEmpty(path.to_string()));
            }
            Some(Node::Dir(_)) => {}
        }
        dir.remove(name);
        self.node_count -= 1;
        debug!(path = %path, "rmdir");
        Ok(())
    }

    /// Move the node at `src` to `dst`. Never overwrites an existing entry.
    pub fn rename(&mut self, src: &str, dst: &str) -> FsResult<()> {
        let src = ResolvedPath::resolve(src);
        let dst = ResolvedPath::resolve(dst);

        let Some((src_parent, src_name)) = src.split_last() else {
            return Err(FsError::InvalidPath("cannot rename the root directory".into()));
        };
        if !self.dir(&src_parent)?.contains(src_name) {
            return Err(FsError::NotFound(src.to_string()));
        }

        let Some((dst_parent, dst_name)) = dst.split_last() else {
            return Err(FsError::AlreadyExists(dst.to_string()));
        };
        if self.dir(&dst_parent)?.contains(dst_name) {
            return Err(FsError::AlreadyExists(dst.to_string()));
        }
        if dst.starts_with(&src) {
            return Err(FsError::InvalidPath(format!(
                "cannot move {} into itself at {}",
                src, dst
            )));
        }

        let node = self
            .dir_mut(&src_parent)?
            .remove(src_name)
            .ok_or_else(|| FsError::NotFound(src.to_string()))?;

        let attached = match self.dir_mut(&dst_parent) {
            Ok(dir) => {
                dir.insert(dst_name, node);
                Ok(())
            }
            Err(e) => Err((e, node)),
        };
        if let Err((e, node)) = attached {
            // Put the subtree back where it was.
            self.dir_mut(&src_parent)?.insert(src_name, node);
            return Err(e);
        }

        debug!(src = %src, dst = %dst, "rename");
        Ok(())
    }

    /// Whole content of the file at `path`.
    pub fn readfile(&self, path: &str) -> FsResult<Vec<u8>> {
        let mut handle = self.open_read(path, OpenMode::ReadBinary)?;
        let content = handle.read_to_end()?;
        handle.close()?;
        Ok(content)
    }

    pub fn read_to_string(&self, path: &str) -> FsResult<String> {
        String::from_utf8(self.readfile(path)?).map_err(|e| FsError::InvalidData(e.to_string()))
    }

    /// Create or truncate the file at `path` and write `content` to it.
    pub fn writefile(&mut self, path: &str, content: impl AsRef<[u8]>) -> FsResult<()> {
        let content = content.as_ref();
        self.config.check_file_size(content.len(), path)?;

        let mut handle = self.open(path, OpenMode::WriteBinary)?;
        handle.write(content)?;
        handle.close()
    }

    /// Lazily walk the tree below `path`, top-down.
    pub fn walk(&self, path: &str) -> FsResult<Walk<'_>> {
        let start = ResolvedPath::resolve(path);
        self.dir(&start)?;
        Ok(Walk::new(self, start))
    }

    /// Export every file and empty directory.
    pub fn snapshot(&self) -> Snapshot {
        let mut entries = BTreeMap::new();
        if let Some(root) = self.root.as_dir() {
            collect_snapshot(root, &ResolvedPath::root(), &mut entries);
        }
        Snapshot { entries }
    }
}

fn collect_snapshot(
    dir: &DirNode,
    path: &ResolvedPath,
    entries: &mut BTreeMap<String, Option<Vec<u8>>>,
) {
    for (name, node) in dir.iter() {
        let child = path.join(name);
        match node {
            Node::File(file) => {
                entries.insert(child.to_string(), Some(file.data.clone()));
            }
            Node::Dir(sub) if sub.is_empty() => {
                entries.insert(child.to_string(), None);
            }
            Node::Dir(sub) => collect_snapshot(sub, &child, entries),
        }
    }
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

//! Internal node representation for the in-memory filesystem.

use std::collections::BTreeMap;
use std::time::SystemTime;

use crate::types::FileType;

/// Internal filesystem node - either a file or directory.
///
/// Every node is owned by exactly one parent directory; the root is owned by
/// the filesystem itself.
#[derive(Debug, Clone)]
pub(crate) enum Node {
    File(FileNode),
    Dir(DirNode),
}

#[derive(Debug, Clone)]
pub(crate) struct FileNode {
    pub data: Vec<u8>,
    pub mtime: SystemTime,
}

#[derive(Debug, Clone)]
pub(crate) struct DirNode {
    children: BTreeMap<String, Node>,
    mtime: SystemTime,
}

impl Node {
    /// Create a new empty file
    pub fn new_file() -> Self {
        Node::File(FileNode::new(Vec::new()))
    }

    /// Create a new directory
    pub fn new_dir() -> Self {
        Node::Dir(DirNode::new())
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Node::File(_))
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Dir(_))
    }

    pub fn file_type(&self) -> FileType {
        match self {
            Node::File(_) => FileType::File,
            Node::Dir(_) => FileType::Dir,
        }
    }

    pub fn mtime(&self) -> SystemTime {
        match self {
            Node::File(file) => file.mtime,
            Node::Dir(dir) => dir.mtime,
        }
    }

    /// File size (child count for directories)
    pub fn size(&self) -> u64 {
        match self {
            Node::File(file) => file.data.len() as u64,
            Node::Dir(dir) => dir.children.len() as u64,
        }
    }

    pub fn as_dir(&self) -> Option<&DirNode> {
        match self {
            Node::Dir(dir) => Some(dir),
            Node::File(_) => None,
        }
    }

    pub fn as_dir_mut(&mut self) -> Option<&mut DirNode> {
        match self {
            Node::Dir(dir) => Some(dir),
            Node::File(_) => None,
        }
    }
}

impl FileNode {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            mtime: SystemTime::now(),
        }
    }

    /// Replace the content and bump the modification time.
    pub fn replace(&mut self, data: Vec<u8>) {
        self.data = data;
        self.mtime = SystemTime::now();
    }
}

impl DirNode {
    pub fn new() -> Self {
        Self {
            children: BTreeMap::new(),
            mtime: SystemTime::now(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.children.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Child names in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.children.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Node)> {
        self.children.iter()
    }

    /// Link `node` under `name`. Callers check for an existing entry first.
    pub fn insert(&mut self, name: &str, node: Node) -> &mut Node {
        self.mtime = SystemTime::now();
        self.children.entry(name.to_string()).or_insert(node)
    }

    pub fn remove(&mut self, name: &str) -> Option<Node> {
        let removed = self.children.remove(name);
        if removed.is_some() {
            self.mtime = SystemTime::now();
        }
        removed
    }
}

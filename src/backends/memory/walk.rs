//! Top-down traversal.

use crate::path::ResolvedPath;
use crate::types::WalkEntry;

use super::fs::MemoryFileSystem;

/// Pre-order walk over a directory tree, built on
/// [`MemoryFileSystem::listdir`].
///
/// Each directory is listed when it is reached, not when the walk starts.
/// Subdirectories are visited in sorted order.
#[derive(Debug)]
pub struct Walk<'a> {
    fs: &'a MemoryFileSystem,
    stack: Vec<ResolvedPath>,
}

impl<'a> Walk<'a> {
    pub(crate) fn new(fs: &'a MemoryFileSystem, start: ResolvedPath) -> Self {
        Self {
            fs,
            stack: vec![start],
        }
    }
}

impl Iterator for Walk<'_> {
    type Item = WalkEntry;

    fn next(&mut self) -> Option<WalkEntry> {
        loop {
            let dir = self.stack.pop()?;
            let dirpath = dir.to_string();
            let Ok(names) = self.fs.listdir(&dirpath) else {
                continue;
            };

            let (dirs, files): (Vec<String>, Vec<String>) = names
                .into_iter()
                .partition(|name| self.fs.isdir(&dir.join(name).to_string()));

            // Reversed so the smallest name is popped first.
            self.stack
                .extend(dirs.iter().rev().map(|name| dir.join(name)));
            return Some(WalkEntry::new(dirpath, dirs, files));
        }
    }
}

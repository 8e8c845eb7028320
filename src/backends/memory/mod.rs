//! Tree-backed in-memory filesystem.

mod fs;
mod handle;
mod node;
mod walk;

pub use fs::MemoryFileSystem;
pub use handle::{FileHandle, FsAccess, Lines, LINE_TERMINATOR};
pub use walk::Walk;

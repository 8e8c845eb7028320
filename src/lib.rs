//! memfs: an in-memory hierarchical filesystem with POSIX-like semantics.

pub mod backend;
pub mod backends;
pub mod config;
pub mod error;
pub mod mem;
pub mod path;
pub mod types;

// Re-export
pub use backend::FsBackend;
pub use backends::memory::{FileHandle, FsAccess, LINE_TERMINATOR, Lines, MemoryFileSystem, Walk};
pub use config::FsConfig;
pub use error::{FsError, FsResult};
pub use mem::{SharedFs, SharedGuard, SharedHandle};
pub use path::ResolvedPath;
pub use types::*;

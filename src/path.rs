//! Path resolution for the in-memory tree.
//!
//! Every path string handed to the filesystem goes through
//! [`ResolvedPath::resolve`] first. Resolution is purely lexical: `.` is
//! dropped, `..` pops the previous component, and a `..` at root stays at
//! root. Nothing here touches the tree, so resolution never fails.

use std::fmt;

pub const SEPARATOR: char = '/';

/// An absolute path reduced to its name components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolvedPath {
    components: Vec<String>,
}

impl ResolvedPath {
    /// The root directory.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn resolve(path: &str) -> Self {
        let mut components: Vec<String> = Vec::new();
        for part in path.split(SEPARATOR) {
            match part {
                "" | "." => {}
                ".." => {
                    components.pop();
                }
                name => components.push(name.to_string()),
            }
        }
        Self { components }
    }

    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Final component, `None` for root.
    pub fn name(&self) -> Option<&str> {
        self.components.last().map(String::as_str)
    }

    /// The containing directory. Root is its own parent.
    pub fn parent(&self) -> Self {
        let mut components = self.components.clone();
        components.pop();
        Self { components }
    }

    /// Splits into parent and final name, `None` for root.
    pub fn split_last(&self) -> Option<(Self, &str)> {
        self.name().map(|name| (self.parent(), name))
    }

    /// First `depth` components as a path of their own.
    pub fn prefix(&self, depth: usize) -> Self {
        Self {
            components: self.components[..depth.min(self.components.len())].to_vec(),
        }
    }

    pub fn join(&self, name: &str) -> Self {
        let mut joined = self.to_string();
        joined.push(SEPARATOR);
        joined.push_str(name);
        Self::resolve(&joined)
    }

    /// True if `self` is `other` or lies underneath it.
    pub fn starts_with(&self, other: &ResolvedPath) -> bool {
        self.components.starts_with(&other.components)
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "{}", SEPARATOR);
        }
        for component in &self.components {
            write!(f, "{}{}", SEPARATOR, component)?;
        }
        Ok(())
    }
}

impl From<&str> for ResolvedPath {
    fn from(path: &str) -> Self {
        Self::resolve(path)
    }
}

/// Directory portion of `path`, resolved.
pub fn dirname(path: &str) -> String {
    ResolvedPath::resolve(path).parent().to_string()
}

/// Final component of `path`, empty for root.
pub fn basename(path: &str) -> String {
    ResolvedPath::resolve(path)
        .name()
        .unwrap_or_default()
        .to_string()
}

/// Joins `parts` onto `base`. An absolute part discards everything before it.
pub fn join<'a>(base: &str, parts: impl IntoIterator<Item = &'a str>) -> String {
    let mut joined = base.to_string();
    for part in parts {
        if part.starts_with(SEPARATOR) {
            joined = part.to_string();
        } else {
            joined.push(SEPARATOR);
            joined.push_str(part);
        }
    }
    ResolvedPath::resolve(&joined).to_string()
}

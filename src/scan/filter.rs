//! Descent predicate for project discovery
//!
//! Pure logic: no filesystem access. The scanner applies it to directories
//! only, and a `false` answer prunes the whole subtree.

use std::collections::BTreeSet;
use std::path::Path;

use crate::core::paths::{depth_below, is_hidden};

#[derive(Debug, Clone)]
pub struct PathFilter {
    max_depth: usize,
    excluded: BTreeSet<String>,
}

impl PathFilter {
    pub fn new(max_depth: usize, excluded: BTreeSet<String>) -> Self {
        Self { max_depth, excluded }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Whether the scanner may visit `path` and its children.
    ///
    /// Paths outside `root` are never descended into.
    pub fn should_descend(&self, path: &Path, root: &Path) -> bool {
        match depth_below(path, root) {
            Some(depth) => self.admits(path, depth),
            None => false,
        }
    }

    /// Same decision with a depth already known to the caller
    pub fn admits(&self, path: &Path, depth: usize) -> bool {
        if depth > self.max_depth {
            return false;
        }
        if depth == 0 {
            return true;
        }
        if is_hidden(path) {
            return false;
        }
        !self.is_excluded(path)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.excluded.contains(name))
    }
}

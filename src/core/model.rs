//! Project and scan data model
//!
//! Projects are immutable snapshots produced by a scan pass. Pin state is
//! owned by the caller (see `pins`) and re-applied to every fresh snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::file_reader::read_document;
use crate::core::tokenizer::estimate_tokens;
use crate::core::util::{hash_bytes, modified_at};

/// Opaque project identity, stable for a given root path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn for_path(path: &Path) -> Self {
        Self(hash_bytes(path.to_string_lossy().as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A discovered project directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,

    /// Manifest name or directory name
    pub name: String,

    /// Project root directory
    pub path: PathBuf,

    /// Primary marker document, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker_path: Option<PathBuf>,

    /// Local override document, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_marker_path: Option<PathBuf>,

    /// Modification time of the primary marker document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,

    /// Marker content length in characters / 4
    pub token_estimate: usize,

    /// Whether a marker directory sits in the project root
    pub has_marker_dir: bool,

    pub is_pinned: bool,

    #[serde(skip_serializing, default)]
    pub marker_content: Option<String>,

    /// Auxiliary documents in sub-scan order
    pub available_docs: Vec<PathBuf>,

    /// Subset of `available_docs`, in pin order
    #[serde(default)]
    pub pinned_docs: Vec<PathBuf>,
}

impl Project {
    pub fn has_marker(&self) -> bool {
        self.marker_path.is_some()
    }

    /// Pinned documents first (pin order), then the rest in discovery order
    pub fn sorted_docs(&self) -> Vec<&Path> {
        let pinned = self
            .pinned_docs
            .iter()
            .filter(|doc| self.available_docs.contains(doc));
        let unpinned = self
            .available_docs
            .iter()
            .filter(|doc| !self.pinned_docs.contains(doc));
        pinned.chain(unpinned).map(PathBuf::as_path).collect()
    }

    /// Toggle a document pin. Returns the new pinned state.
    ///
    /// Documents that are not available in this project are never pinned.
    pub fn toggle_doc_pin(&mut self, doc: &Path) -> bool {
        if let Some(pos) = self.pinned_docs.iter().position(|p| p == doc) {
            self.pinned_docs.remove(pos);
            return false;
        }
        if !self.available_docs.iter().any(|p| p == doc) {
            return false;
        }
        self.pinned_docs.push(doc.to_path_buf());
        true
    }

    /// Re-read the marker document in place.
    ///
    /// Returns `false` when the project has no marker or it can no longer be read;
    /// in that case the previous snapshot values are kept.
    pub fn reload_marker(&mut self) -> bool {
        let Some(marker) = self.marker_path.as_deref() else {
            return false;
        };
        let Some(content) = read_document(marker).into_content() else {
            return false;
        };
        self.token_estimate = estimate_tokens(Some(&content));
        self.last_modified = modified_at(marker);
        self.marker_content = Some(content);
        true
    }
}

/// Inputs of one scan pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Root folders, deduplicated, in configured order
    pub roots: Vec<PathBuf>,

    /// Maximum descent depth (inclusive) in path segments below each root
    pub max_depth: usize,

    /// Directory names never descended into (exact match on the last segment)
    pub excluded: BTreeSet<String>,

    /// Follow symbolic links (loops are detected and skipped)
    pub follow_links: bool,
}

impl ScanConfig {
    pub fn new(
        roots: impl IntoIterator<Item = PathBuf>,
        max_depth: usize,
        excluded: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut unique: Vec<PathBuf> = Vec::new();
        for root in roots {
            if !unique.contains(&root) {
                unique.push(root);
            }
        }
        Self {
            roots: unique,
            max_depth,
            excluded: excluded.into_iter().collect(),
            follow_links: false,
        }
    }

    pub fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }
}

/// A root folder that could not be scanned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRoot {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of one scan pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOutcome {
    /// Projects, most recently modified marker first
    pub projects: Vec<Project>,
    pub skipped_roots: Vec<SkippedRoot>,
}

impl ScanOutcome {
    pub fn missing_marker_count(&self) -> usize {
        missing_marker_count(&self.projects)
    }
}

/// Number of projects that lack a primary marker document
pub fn missing_marker_count(projects: &[Project]) -> usize {
    projects.iter().filter(|p| !p.has_marker()).count()
}

/// Projects matching `query` on name or marker content (case-insensitive).
///
/// Pinned projects come first; each group is ordered by marker modification
/// time, newest first, with undated projects last.
pub fn filter_projects<'a>(projects: &'a [Project], query: &str) -> Vec<&'a Project> {
    let needle = query.trim().to_lowercase();
    let matches = |p: &&Project| {
        needle.is_empty()
            || p.name.to_lowercase().contains(&needle)
            || p
                .marker_content
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&needle))
    };

    let mut filtered: Vec<&Project> = projects.iter().filter(matches).collect();
    filtered.sort_by(|a, b| {
        b.is_pinned
            .cmp(&a.is_pinned)
            .then_with(|| b.last_modified.cmp(&a.last_modified))
    });
    filtered
}

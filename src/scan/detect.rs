//! Project classification
//!
//! A directory is a project when it directly contains the marker document,
//! the marker directory, or one of the ecosystem manifests below.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::file_reader::{read_document, DocumentRead};
use crate::core::paths::file_name_lossy;
use crate::core::util::modified_at;

/// Primary marker document
pub const MARKER_DOCUMENT: &str = "CLAUDE.md";

/// Local override document
pub const LOCAL_MARKER_DOCUMENT: &str = "CLAUDE.local.md";

/// Marker directory
pub const MARKER_DIRECTORY: &str = ".claude";

/// Ecosystem files that make a directory a project on their own
pub const ECOSYSTEM_MARKERS: &[&str] = &[
    "package.json",
    "Cargo.toml",
    "pyproject.toml",
    "go.mod",
    "build.gradle",
    "Makefile",
];

/// What the detector learned about a project directory
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectInfo {
    pub name: String,
    pub marker_path: Option<PathBuf>,
    pub local_marker_path: Option<PathBuf>,
    pub has_marker_dir: bool,
    /// Marker document read outcome; `Missing` when there is no marker
    pub marker: DocumentRead,
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectDetector;

impl ProjectDetector {
    pub fn new() -> Self {
        Self
    }

    /// Classify `dir`, returning `None` when it is not a project
    pub fn classify(&self, dir: &Path) -> Option<ProjectInfo> {
        let marker = dir.join(MARKER_DOCUMENT);
        let has_marker = marker.is_file();
        let has_marker_dir = dir.join(MARKER_DIRECTORY).is_dir();
        let has_ecosystem_marker = ECOSYSTEM_MARKERS.iter().any(|m| dir.join(m).exists());

        if !(has_marker || has_marker_dir || has_ecosystem_marker) {
            return None;
        }

        let (read, last_modified) = if has_marker {
            (read_document(&marker), modified_at(&marker))
        } else {
            (DocumentRead::Missing, None)
        };

        if let DocumentRead::Unreadable { reason } = &read {
            tracing::debug!(path = %marker.display(), %reason, "marker document unreadable");
        }

        let local = dir.join(LOCAL_MARKER_DOCUMENT);
        Some(ProjectInfo {
            name: project_name(dir),
            marker_path: has_marker.then_some(marker),
            local_marker_path: local.is_file().then_some(local),
            has_marker_dir,
            marker: read,
            last_modified,
        })
    }
}

#[derive(Deserialize)]
struct Named {
    name: Option<String>,
}

#[derive(Deserialize)]
struct CargoManifest {
    package: Option<Named>,
}

#[derive(Deserialize)]
struct PyProject {
    project: Option<Named>,
}

/// Manifest name when one parses, otherwise the directory name
pub fn project_name(dir: &Path) -> String {
    manifest_name(dir).unwrap_or_else(|| file_name_lossy(dir))
}

fn manifest_name(dir: &Path) -> Option<String> {
    let from_package_json = || {
        let text = fs::read_to_string(dir.join("package.json")).ok()?;
        serde_json::from_str::<Named>(&text).ok()?.name
    };
    let from_cargo = || {
        let text = fs::read_to_string(dir.join("Cargo.toml")).ok()?;
        toml::from_str::<CargoManifest>(&text).ok()?.package?.name
    };
    let from_pyproject = || {
        let text = fs::read_to_string(dir.join("pyproject.toml")).ok()?;
        toml::from_str::<PyProject>(&text).ok()?.project?.name
    };

    from_package_json()
        .or_else(from_cargo)
        .or_else(from_pyproject)
        .filter(|name| !name.trim().is_empty())
}

//! Pin persistence
//!
//! Pins live outside the scan results: project pins keyed by root path and
//! document pins keyed by project root. After every scan the store is
//! re-applied to the fresh snapshot by exact path match.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{Error, Result};
use crate::core::model::Project;

/// Default store file name, placed next to the config file
pub const PIN_STORE_FILE: &str = "pins.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinStore {
    #[serde(default)]
    pub pinned_projects: BTreeSet<PathBuf>,

    /// Project root -> pinned documents, in pin order
    #[serde(default)]
    pub pinned_docs: BTreeMap<PathBuf, Vec<PathBuf>>,
}

impl PinStore {
    /// Load the store; a missing file is an empty store
    pub fn load(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(Error::PinStoreRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&text).map_err(|source| Error::PinStoreParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let write_err = |source| Error::PinStoreWrite {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| Error::PinStoreEncode {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(write_err)
    }

    /// Snapshot the pin state of `projects`
    pub fn capture(projects: &[Project]) -> Self {
        let mut store = Self::default();
        for project in projects {
            store.record(project);
        }
        store
    }

    /// Replace the stored pins of one project with its current state
    pub fn record(&mut self, project: &Project) {
        if project.is_pinned {
            self.pinned_projects.insert(project.path.clone());
        } else {
            self.pinned_projects.remove(&project.path);
        }
        if project.pinned_docs.is_empty() {
            self.pinned_docs.remove(&project.path);
        } else {
            self.pinned_docs
                .insert(project.path.clone(), project.pinned_docs.clone());
        }
    }

    /// Re-apply pins to freshly scanned projects.
    ///
    /// Pinned documents that are no longer available are dropped, so every
    /// project's `pinned_docs` stays a subset of its `available_docs`.
    pub fn apply(&self, projects: &mut [Project]) {
        for project in projects.iter_mut() {
            project.is_pinned = self.pinned_projects.contains(&project.path);
            project.pinned_docs = self
                .pinned_docs
                .get(&project.path)
                .map(|docs| {
                    docs.iter()
                        .filter(|doc| project.available_docs.contains(doc))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
        }
    }

    /// Toggle a project pin. Returns the new pinned state.
    pub fn toggle_project(&mut self, root: &Path) -> bool {
        if self.pinned_projects.remove(root) {
            false
        } else {
            self.pinned_projects.insert(root.to_path_buf());
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::ProjectId;
    use tempfile::tempdir;

    fn project(root: &str, docs: &[&str]) -> Project {
        let path = PathBuf::from(root);
        Project {
            id: ProjectId::for_path(&path),
            name: root.trim_start_matches('/').to_string(),
            marker_path: None,
            local_marker_path: None,
            last_modified: None,
            token_estimate: 0,
            has_marker_dir: false,
            is_pinned: false,
            marker_content: None,
            available_docs: docs.iter().map(|d| path.join(d)).collect(),
            pinned_docs: Vec::new(),
            path,
        }
    }

    #[test]
    fn test_capture_and_apply_by_path() {
        let mut before = vec![project("/a", &["x.md", "y.md"]), project("/b", &[])];
        before[0].is_pinned = true;
        before[0].toggle_doc_pin(Path::new("/a/y.md"));
        let store = PinStore::capture(&before);

        let mut after = vec![project("/b", &[]), project("/a", &["x.md", "y.md"])];
        store.apply(&mut after);

        assert!(!after[0].is_pinned);
        assert!(after[1].is_pinned);
        assert_eq!(after[1].pinned_docs, vec![PathBuf::from("/a/y.md")]);
    }

    #[test]
    fn test_apply_drops_unavailable_docs() {
        let mut store = PinStore::default();
        store.pinned_docs.insert(
            PathBuf::from("/a"),
            vec![PathBuf::from("/a/gone.md"), PathBuf::from("/a/x.md")],
        );

        let mut projects = vec![project("/a", &["x.md"])];
        store.apply(&mut projects);
        assert_eq!(projects[0].pinned_docs, vec![PathBuf::from("/a/x.md")]);
    }

    #[test]
    fn test_pinned_docs_stay_subset_of_available() {
        let mut p = project("/a", &["x.md", "y.md"]);
        let ops = ["/a/x.md", "/a/z.md", "/a/y.md", "/a/x.md", "/b/x.md", "/a/y.md", "/a/x.md"];
        for op in ops {
            p.toggle_doc_pin(Path::new(op));
            assert!(p
                .pinned_docs
                .iter()
                .all(|d| p.available_docs.contains(d)));
        }
        assert_eq!(p.pinned_docs, vec![PathBuf::from("/a/x.md")]);
    }

    #[test]
    fn test_toggle_project() {
        let mut store = PinStore::default();
        assert!(store.toggle_project(Path::new("/a")));
        assert!(store.pinned_projects.contains(Path::new("/a")));
        assert!(!store.toggle_project(Path::new("/a")));
        assert!(store.pinned_projects.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("state/pins.json");

        let mut store = PinStore::default();
        store.toggle_project(Path::new("/a"));
        store
            .pinned_docs
            .insert(PathBuf::from("/a"), vec![PathBuf::from("/a/x.md")]);
        store.save(&path).unwrap();

        assert_eq!(PinStore::load(&path).unwrap(), store);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_reports_unencodable_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = tempdir().unwrap();
        let path = temp.path().join("pins.json");
        let mut store = PinStore::default();
        store.toggle_project(Path::new(OsStr::from_bytes(b"/a/\xff")));

        let err = store.save(&path).unwrap_err();
        assert!(matches!(err, Error::PinStoreEncode { .. }));
        assert!(err.to_string().starts_with("failed to encode pin store"));
        assert!(!path.exists());
    }

    #[test]
    fn test_load_missing_is_empty() {
        let temp = tempdir().unwrap();
        let store = PinStore::load(&temp.path().join("none.json")).unwrap();
        assert_eq!(store, PinStore::default());
    }

    #[test]
    fn test_load_invalid_json() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("pins.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            PinStore::load(&path),
            Err(Error::PinStoreParse { .. })
        ));
    }
}

//! Project discovery over configured root folders
//!
//! Uses walkdir so that pruning (excluded, hidden, too deep, or already a
//! project) stops descent into the whole subtree.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::model::{Project, ProjectId, ScanConfig, ScanOutcome, SkippedRoot};
use crate::core::tokenizer::estimate_tokens;
use crate::scan::detect::{ProjectDetector, ProjectInfo};
use crate::scan::documents::find_documents;
use crate::scan::filter::PathFilter;

#[derive(Debug, Clone, Default)]
pub struct DirectoryScanner {
    detector: ProjectDetector,
}

impl DirectoryScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan every root and return projects, newest marker first.
    ///
    /// Roots that are missing or cannot be listed are reported in
    /// `skipped_roots` and do not affect the others.
    pub fn scan(&self, config: &ScanConfig) -> ScanOutcome {
        let filter = PathFilter::new(config.max_depth, config.excluded.clone());
        let per_root = self.scan_roots(config, &filter);

        let mut seen = HashSet::new();
        let mut outcome = ScanOutcome::default();
        for result in per_root {
            match result {
                Ok(projects) => outcome
                    .projects
                    .extend(projects.into_iter().filter(|p| seen.insert(p.path.clone()))),
                Err(skipped) => {
                    tracing::debug!(root = %skipped.path.display(), reason = %skipped.reason, "skipping scan root");
                    outcome.skipped_roots.push(skipped);
                }
            }
        }

        // Stable: projects without a timestamp sort last
        outcome
            .projects
            .sort_by(|a, b| b.last_modified.cmp(&a.last_modified));

        tracing::info!(
            projects = outcome.projects.len(),
            missing_marker = outcome.missing_marker_count(),
            skipped_roots = outcome.skipped_roots.len(),
            "scan finished"
        );
        outcome
    }

    /// Classify a single directory, outside of any scan pass
    pub fn project_at(&self, dir: &Path) -> Option<Project> {
        let info = self.detector.classify(dir)?;
        Some(build_project(dir.to_path_buf(), info))
    }

    #[cfg(not(feature = "parallel"))]
    fn scan_roots(
        &self,
        config: &ScanConfig,
        filter: &PathFilter,
    ) -> Vec<Result<Vec<Project>, SkippedRoot>> {
        config
            .roots
            .iter()
            .map(|root| self.scan_root(root, filter, config.follow_links))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn scan_roots(
        &self,
        config: &ScanConfig,
        filter: &PathFilter,
    ) -> Vec<Result<Vec<Project>, SkippedRoot>> {
        use rayon::prelude::*;

        config
            .roots
            .par_iter()
            .map(|root| self.scan_root(root, filter, config.follow_links))
            .collect()
    }

    fn scan_root(
        &self,
        root: &Path,
        filter: &PathFilter,
        follow_links: bool,
    ) -> Result<Vec<Project>, SkippedRoot> {
        if let Err(e) = std::fs::read_dir(root) {
            return Err(SkippedRoot {
                path: root.to_path_buf(),
                reason: e.to_string(),
            });
        }

        let mut projects = Vec::new();
        let mut walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(follow_links)
            .into_iter()
            .filter_entry(|entry| {
                !entry.file_type().is_dir() || filter.admits(entry.path(), entry.depth())
            });

        loop {
            let entry = match walker.next() {
                None => break,
                Some(Ok(entry)) => entry,
                Some(Err(err)) => {
                    // Permission errors and symlink loops only cost their subtree
                    tracing::debug!(error = %err, "skipping entry");
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            let dir = entry.path();
            if let Some(info) = self.detector.classify(dir) {
                tracing::debug!(path = %dir.display(), name = %info.name, "project found");
                projects.push(build_project(dir.to_path_buf(), info));
                walker.skip_current_dir();
            } else if entry.depth() >= filter.max_depth() {
                // Children would only be rejected by the depth bound
                walker.skip_current_dir();
            }
        }

        Ok(projects)
    }
}

fn build_project(path: PathBuf, info: ProjectInfo) -> Project {
    let content = info.marker.into_content();
    Project {
        id: ProjectId::for_path(&path),
        name: info.name,
        marker_path: info.marker_path,
        local_marker_path: info.local_marker_path,
        last_modified: info.last_modified,
        token_estimate: estimate_tokens(content.as_deref()),
        has_marker_dir: info.has_marker_dir,
        is_pinned: false,
        marker_content: content,
        available_docs: find_documents(&path),
        pinned_docs: Vec::new(),
        path,
    }
}

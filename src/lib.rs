//! mdscope - discover CLAUDE.md projects and render their documents
//!
//! - `scan`: project discovery over configured root folders, plus a
//!   dedicated worker for on-demand and periodic scans
//! - `markdown`: markdown to styled runs, terminal output, off-thread dispatch
//! - `cache`: render cache keyed by file identity or explicit key
//! - `pins`: pin persistence re-applied after each scan
//! - `core`: data model, settings, errors, reading and token helpers

pub mod cache;
pub mod core;
pub mod markdown;
pub mod pins;
pub mod scan;

pub use crate::core::error::{Error, Result};
pub use crate::core::model::{
    filter_projects, missing_marker_count, Project, ProjectId, ScanConfig, ScanOutcome,
    SkippedRoot,
};
pub use cache::{CacheKey, RenderCache};
pub use markdown::{render_markdown, Renderer, StyledDocument};
pub use pins::PinStore;
pub use scan::{DirectoryScanner, ScanWorker};

//! Scan module - Project discovery
//!
//! Provides:
//! - filter: descent predicate (depth, exclusions, hidden entries)
//! - detect: project classification and display names
//! - documents: auxiliary markdown sub-scan
//! - scanner: multi-root discovery pass
//! - worker: dedicated scan thread with optional periodic re-scan

pub mod detect;
pub mod documents;
pub mod filter;
pub mod scanner;
pub mod worker;

pub use detect::{ProjectDetector, ProjectInfo};
pub use documents::find_documents;
pub use filter::PathFilter;
pub use scanner::DirectoryScanner;
pub use worker::{ScanReport, ScanWorker};

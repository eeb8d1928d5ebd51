//! Core module - Data model and shared utilities
//!
//! This module provides:
//! - Project and scan data model
//! - Settings loading and validation
//! - Best-effort document reading
//! - Token estimation
//! - Output formats for project lists
//! - Path and time utilities

pub mod config;
pub mod error;
pub mod file_reader;
pub mod model;
pub mod output;
pub mod paths;
pub mod tokenizer;
pub mod util;

//! Best-effort document reading
//!
//! Marker and auxiliary documents are read without ever failing the caller:
//! the outcome distinguishes a missing file from one that exists but could not
//! be read or decoded, and both degrade to "no content" downstream.

use std::fs;
use std::io::Read;
use std::path::Path;

/// Default maximum document size in bytes (16 MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Limits applied when reading a document
#[derive(Debug, Clone)]
pub struct FileReadConfig {
    /// Documents larger than this are reported unreadable
    pub max_file_size: u64,
}

impl Default for FileReadConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// Outcome of reading a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentRead {
    Present(String),
    Missing,
    Unreadable { reason: String },
}

impl DocumentRead {
    /// Content when present, `None` for missing and unreadable documents
    pub fn content(&self) -> Option<&str> {
        match self {
            DocumentRead::Present(content) => Some(content),
            _ => None,
        }
    }

    pub fn into_content(self) -> Option<String> {
        match self {
            DocumentRead::Present(content) => Some(content),
            _ => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, DocumentRead::Present(_))
    }
}

/// Read a document with the given configuration
pub fn read_document_with_config(path: &Path, config: &FileReadConfig) -> DocumentRead {
    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return DocumentRead::Missing,
        Err(e) => {
            return DocumentRead::Unreadable {
                reason: format!("cannot read metadata: {}", e),
            }
        }
    };

    if !metadata.is_file() {
        return DocumentRead::Unreadable {
            reason: "not a regular file".to_string(),
        };
    }

    if metadata.len() > config.max_file_size {
        return DocumentRead::Unreadable {
            reason: format!(
                "file exceeds size limit ({} > {} bytes)",
                metadata.len(),
                config.max_file_size
            ),
        };
    }

    let bytes = match read_file_bytes(path) {
        Ok(b) => b,
        Err(e) => {
            return DocumentRead::Unreadable {
                reason: format!("cannot read file: {}", e),
            }
        }
    };

    match String::from_utf8(bytes) {
        Ok(content) => DocumentRead::Present(content),
        Err(_) => DocumentRead::Unreadable {
            reason: "file contains invalid UTF-8 sequences".to_string(),
        },
    }
}

fn read_file_bytes(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = fs::File::open(path)?;
    let mut reader = std::io::BufReader::new(file);
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// Convenience function with default config
pub fn read_document(path: &Path) -> DocumentRead {
    read_document_with_config(path, &FileReadConfig::default())
}

//! Common utilities

use chrono::{DateTime, Utc};
use std::path::Path;
use xxhash_rust::xxh3::xxh3_64;

/// Content fingerprint used by the render cache
pub fn fingerprint(text: &str) -> u64 {
    xxh3_64(text.as_bytes())
}

/// Hex form of a 64-bit hash of arbitrary bytes
pub fn hash_bytes(data: &[u8]) -> String {
    format!("{:016x}", xxh3_64(data))
}

/// Get file modification time, if the filesystem reports one
pub fn modified_at(path: &Path) -> Option<DateTime<Utc>> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}

/// Human-readable age such as "3h ago"
///
/// Months are 30 days and years 365 days.
pub fn relative_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);

    if secs < 60 {
        return "just now".to_string();
    }
    let minutes = secs / 60;
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }
    let hours = secs / 3_600;
    if hours < 24 {
        return format!("{}h ago", hours);
    }
    let days = secs / 86_400;
    if days < 30 {
        return format!("{}d ago", days);
    }
    let months = secs / 2_592_000;
    if months < 12 {
        return format!("{}mo ago", months);
    }
    format!("{}y ago", secs / 31_536_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_fingerprint_changes_with_content() {
        assert_eq!(fingerprint("# Hi"), fingerprint("# Hi"));
        assert_ne!(fingerprint("# Hi"), fingerprint("# Hi!"));
    }

    #[test]
    fn test_hash_bytes() {
        let hash = hash_bytes(b"hello world");
        assert_eq!(hash.len(), 16);
    }

    #[test]
    fn test_modified_at_missing_file() {
        assert!(modified_at(Path::new("/definitely/not/here.md")).is_none());
    }

    #[test]
    fn test_modified_at_existing_file() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("CLAUDE.md");
        std::fs::write(&file, "x").unwrap();
        assert!(modified_at(&file).is_some());
    }

    #[test]
    fn test_relative_age_buckets() {
        let now = Utc::now();
        assert_eq!(relative_age(now - Duration::seconds(10), now), "just now");
        assert_eq!(relative_age(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(relative_age(now - Duration::hours(2), now), "2h ago");
        assert_eq!(relative_age(now - Duration::days(3), now), "3d ago");
        assert_eq!(relative_age(now - Duration::days(65), now), "2mo ago");
        assert_eq!(relative_age(now - Duration::days(800), now), "2y ago");
    }

    #[test]
    fn test_relative_age_future_is_just_now() {
        let now = Utc::now();
        assert_eq!(relative_age(now + Duration::hours(1), now), "just now");
    }
}

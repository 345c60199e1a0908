use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::info;

/// Timestamp layout used in found-entry records.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One reported match: full path, the pattern that matched, and the local
/// time of the observation. Entries are emitted to the log sink and dropped
/// immediately; no result set is retained anywhere.
#[derive(Debug, Clone)]
pub struct FoundEntry {
    pub path: PathBuf,
    pub pattern: String,
    pub timestamp: DateTime<Local>,
}

impl FoundEntry {
    pub fn new(path: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            pattern: pattern.into(),
            timestamp: Local::now(),
        }
    }

    /// Renders the literal record shape expected by the log sink.
    pub fn record(&self) -> String {
        format!(
            "Date: {} | Found: {} | Pattern: {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.path.display(),
            self.pattern
        )
    }
}

/// Emits one informational record for a match. No buffering.
pub fn report(path: &Path, pattern: &str) {
    let entry = FoundEntry::new(path, pattern);
    info!("{}", entry.record());
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn test_record_shape() {
        let entry = FoundEntry::new("/a/b/file.log", "log");
        let record = entry.record();

        let rest = record.strip_prefix("Date: ").expect("record starts with Date:");
        let (timestamp, rest) = rest.split_once(" | ").expect("timestamp separator");
        assert_eq!(rest, "Found: /a/b/file.log | Pattern: log");

        // Timestamp must round-trip through the documented layout.
        assert!(NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).is_ok());
        assert_eq!(timestamp.len(), "YYYY-MM-DD HH:MM:SS".len());
    }

    #[test]
    fn test_record_keeps_full_path() {
        let entry = FoundEntry::new("/var/tmp/nested/trace.log", "trace");
        assert!(entry.record().contains("Found: /var/tmp/nested/trace.log"));
    }
}

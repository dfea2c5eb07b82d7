//! Deterministic evidence file names

use chrono::{DateTime, Utc};

/// Timestamp layout embedded in evidence file names (second resolution)
pub const NAME_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Build `<kind>_<YYYYmmdd_HHMMSS>_<seq>.<ext>`.
///
/// The sequence number disambiguates artifacts of the same kind written within
/// the same second.
pub fn artifact_file_name(kind: &str, at: DateTime<Utc>, sequence: u64, extension: &str) -> String {
    format!(
        "{}_{}_{:04}.{}",
        sanitize_kind(kind),
        at.format(NAME_TIMESTAMP_FORMAT),
        sequence,
        extension
    )
}

/// Keep kinds filesystem-safe: lowercase alphanumerics and underscores only.
pub fn sanitize_kind(kind: &str) -> String {
    let cleaned: String = kind
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "artifact".to_string()
    } else {
        cleaned
    }
}

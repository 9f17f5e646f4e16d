//! Watermark key and value conventions
//!
//! One watermark per index, stored under `"{index}_update"` as an RFC 3339
//! timestamp string. The watermark marks the end of the last successfully
//! synchronized window; it is read once at cycle start and written only
//! after a load completes without error.

use crate::domain::{CinesyncError, Result, SearchIndex};
use chrono::{DateTime, SecondsFormat, Utc};

/// Store key for an index's watermark
pub fn watermark_key(index: SearchIndex) -> String {
    format!("{}_update", index.as_str())
}

/// Serialize a watermark timestamp
pub fn format_watermark(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored watermark value
///
/// # Errors
///
/// Returns a state error when the stored value is not a valid RFC 3339
/// timestamp; a corrupt watermark must surface rather than silently reset
/// the index to bootstrap.
pub fn parse_watermark(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| CinesyncError::State(format!("invalid watermark value '{value}': {e}")))
}

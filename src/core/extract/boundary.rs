//! Extraction window calculation

use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// A half-open extraction window `[from_time, till_time)`
///
/// Created fresh on every sync cycle from the current watermark and never
/// persisted itself; only `till_time` survives as the next watermark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBoundary {
    /// Inclusive window start
    pub from_time: DateTime<Utc>,

    /// Window width; must be positive
    pub step: Duration,
}

impl TimeBoundary {
    /// Exclusive window end
    pub fn till_time(&self) -> DateTime<Utc> {
        self.from_time + self.step
    }
}

impl fmt::Display for TimeBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "from {} till {}",
            self.from_time.to_rfc3339(),
            self.till_time().to_rfc3339()
        )
    }
}

/// Compute the next extraction window
///
/// Returns `None` when there is no watermark yet; the caller must resolve a
/// bootstrap start time (the earliest update across receivers) before
/// building a window.
pub fn compute_boundary(
    last_watermark: Option<DateTime<Utc>>,
    step: Duration,
) -> Option<TimeBoundary> {
    let from_time = last_watermark?;
    let boundary = TimeBoundary { from_time, step };

    tracing::debug!(window = %boundary, "Computed extraction window");

    Some(boundary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_no_watermark_means_bootstrap() {
        assert!(compute_boundary(None, Duration::seconds(60)).is_none());
    }

    #[test_case(1; "one second")]
    #[test_case(60; "one minute")]
    #[test_case(86_400; "one day")]
    fn test_till_after_from_for_positive_steps(step_seconds: i64) {
        let from = ts("2021-03-01T12:00:00Z");
        let boundary = compute_boundary(Some(from), Duration::seconds(step_seconds)).unwrap();

        assert_eq!(boundary.from_time, from);
        assert_eq!(boundary.till_time(), from + Duration::seconds(step_seconds));
        assert!(boundary.till_time() > boundary.from_time);
    }

    #[test]
    fn test_window_starts_exactly_at_watermark() {
        let from = ts("2020-06-15T00:00:00Z");
        let boundary = compute_boundary(Some(from), Duration::seconds(60)).unwrap();
        assert_eq!(boundary.from_time, from);
    }

    #[test]
    fn test_display_mentions_both_edges() {
        let boundary = TimeBoundary {
            from_time: ts("2021-01-01T00:00:00Z"),
            step: Duration::seconds(60),
        };
        let text = boundary.to_string();
        assert!(text.contains("2021-01-01T00:00:00"));
        assert!(text.contains("2021-01-01T00:01:00"));
    }
}

//! New-release policy
//!
//! An album is a new release when its release date falls inside a lookback
//! window ending at the time of the run.

use chrono::{DateTime, Duration, Utc};
use core_runtime::config::{CoreConfig, DEFAULT_RELEASE_WINDOW_DAYS};

/// Decides whether an album counts as a new release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseClassifier {
    window: Duration,
}

impl ReleaseClassifier {
    pub fn new(window_days: u32) -> Self {
        Self {
            window: Duration::days(i64::from(window_days)),
        }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(config.release_window_days)
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// `true` iff a date is present and not older than `now - window`
    ///
    /// Dates in the future count as new. A missing date is never new.
    pub fn is_new_release(&self, release_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        release_date.is_some_and(|date| date >= now - self.window)
    }
}

impl Default for ReleaseClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_RELEASE_WINDOW_DAYS)
    }
}

//! Refresh scheduler configuration.

use std::time::Duration;

/// Timing configuration for the background refresh scheduler.
///
/// The scheduler wakes every `check_interval` and refreshes the session
/// when it expires within `refresh_lead`. The defaults match the backend's
/// token lifetimes: a check every minute, refreshing five minutes ahead
/// of expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshConfig {
    /// How often the scheduler checks the session expiry.
    pub check_interval: Duration,
    /// How far ahead of expiry a refresh is triggered.
    pub refresh_lead: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(60),
            refresh_lead: Duration::from_secs(5 * 60),
        }
    }
}

//! Ledger configuration.

use std::time::Duration;

/// Configuration for the occupancy ledger service.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Maximum attempts per operation when the store reports a
    /// conflicting concurrent commit (default: 3).
    pub max_attempts: u32,
    /// Base backoff between retries; attempt `n` waits `n × base`
    /// (default: 25ms).
    pub retry_backoff: Duration,
    /// Upper bound for a single attempt, store or identity call
    /// (default: 5s). Exceeding it surfaces a `Timeout`.
    pub operation_timeout: Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_backoff: Duration::from_millis(25),
            operation_timeout: Duration::from_secs(5),
        }
    }
}

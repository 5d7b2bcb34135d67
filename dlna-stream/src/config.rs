//! Configuration for GENA subscriptions.

use std::time::Duration;

/// Lease and renewal settings for a [`SubscriptionManager`](crate::SubscriptionManager)
#[derive(Debug, Clone)]
pub struct SubscriptionConfig {
    /// Lease requested in `TIMEOUT: Second-N`
    /// Default: 300
    pub requested_timeout_secs: u32,

    /// Leases at or below this length use `short_lease_delay`
    /// Default: 20
    pub short_lease_threshold_secs: u32,

    /// Longer leases are renewed after `timeout / renewal_divisor` seconds
    /// Default: 5
    pub renewal_divisor: u32,

    /// Renewal delay for short leases
    /// Default: 5 seconds
    pub short_lease_delay: Duration,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            requested_timeout_secs: 300,
            short_lease_threshold_secs: 20,
            renewal_divisor: 5,
            short_lease_delay: Duration::from_secs(5),
        }
    }
}

impl SubscriptionConfig {
    /// Delay before renewing a lease of `timeout_seconds`
    pub fn renewal_delay(&self, timeout_seconds: u32) -> Duration {
        if timeout_seconds > self.short_lease_threshold_secs {
            Duration::from_secs(u64::from(timeout_seconds / self.renewal_divisor.max(1)))
        } else {
            self.short_lease_delay
        }
    }
}

//! Per-session counters for the live tracking phase.

use serde::Serialize;

/// Counts what a dispatch session did with the updates it received.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionTelemetry {
    pub selections: u64,
    pub updates_applied: u64,
    /// Applied updates whose `observed_at_ms` was older than the previous one.
    pub updates_out_of_order: u64,
    /// Updates that arrived with no selection or for another provider.
    pub updates_ignored: u64,
    pub feed_disconnects: u64,
}

impl SessionTelemetry {
    pub fn updates_received(&self) -> u64 {
        self.updates_applied + self.updates_ignored
    }
}

//! Display-only arrival estimate for a dispatched mechanic.

use serde::{Deserialize, Serialize};

/// Two minutes per kilometre, i.e. an effective 30 km/h.
pub const DEFAULT_MINUTES_PER_KM: f64 = 2.0;

/// Fixed average-speed heuristic. Not a routing estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EtaConfig {
    pub minutes_per_km: f64,
}

impl Default for EtaConfig {
    fn default() -> Self {
        Self {
            minutes_per_km: DEFAULT_MINUTES_PER_KM,
        }
    }
}

impl EtaConfig {
    /// Whole minutes to cover `distance_km`, rounded up.
    pub fn eta_minutes(&self, distance_km: f64) -> u32 {
        (distance_km * self.minutes_per_km).ceil().max(0.0) as u32
    }
}

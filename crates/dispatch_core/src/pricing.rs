//! Call-out pricing for emergency dispatch quotes.

use serde::{Deserialize, Serialize};

/// Flat call-out fee in whole currency units.
pub const BASE_CALL_OUT_FEE: u64 = 50;

/// Surcharge per kilometre between requester and provider.
pub const PER_KM_SURCHARGE: f64 = 5.0;

/// Currency shown next to quoted prices.
pub const DEFAULT_CURRENCY: &str = "RON";

/// Pricing knobs. Defaults reproduce the production tariff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub base_fee: u64,
    pub per_km_rate: f64,
    pub currency: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_fee: BASE_CALL_OUT_FEE,
            per_km_rate: PER_KM_SURCHARGE,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl PricingConfig {
    /// Quote for a call-out over `distance_km`.
    ///
    /// Formula: `price = base_fee + floor(distance_km * per_km_rate)`
    ///
    /// The surcharge is floored so quotes are whole currency units. Extreme
    /// tariffs saturate at `u64::MAX` rather than wrapping.
    pub fn call_out_price(&self, distance_km: f64) -> u64 {
        let surcharge = (distance_km * self.per_km_rate).floor().max(0.0);
        self.base_fee.saturating_add(surcharge as u64)
    }
}

/// Call-out price with the default tariff.
pub fn calculate_call_out_price(distance_km: f64) -> u64 {
    PricingConfig::default().call_out_price(distance_km)
}

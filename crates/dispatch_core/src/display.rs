//! Text rendering of ranked providers for the dispatch dialog.

use std::fmt;

use serde::Serialize;

use crate::ranking::RankedProvider;

/// Distance with one decimal, e.g. `"8.0 km"`.
pub fn format_distance(distance_km: f64) -> String {
    format!("{distance_km:.1} km")
}

/// Approximate arrival, e.g. `"~16 min"`.
pub fn format_eta(eta_minutes: u32) -> String {
    format!("~{eta_minutes} min")
}

/// Call-out price with currency, e.g. `"90 RON"`.
pub fn format_price(price: u64, currency: &str) -> String {
    format!("{price} {currency}")
}

/// One provider as shown to the requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderCard {
    pub provider_id: String,
    pub name: String,
    pub distance: String,
    pub eta: String,
    pub price: String,
}

impl ProviderCard {
    pub fn new(ranked: &RankedProvider, currency: &str) -> Self {
        Self {
            provider_id: ranked.id().to_string(),
            name: ranked.provider().business_name.clone(),
            distance: format_distance(ranked.distance_km()),
            eta: format_eta(ranked.eta_minutes()),
            price: format_price(ranked.quoted_price(), currency),
        }
    }
}

impl fmt::Display for ProviderCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<28} {:>9} {:>9} {:>9}",
            self.name, self.distance, self.eta, self.price
        )
    }
}

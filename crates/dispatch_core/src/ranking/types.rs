use serde::Serialize;

use crate::config::DispatchConfig;
use crate::geo::{great_circle_distance_km, Coordinate};
use crate::provider::{Provider, ProviderId};

/// Distance, price and ETA derived from a single distance.
///
/// Fields are private: a quote can only be built from a distance (or a
/// coordinate pair) and a config, so price and ETA always match the distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quote {
    distance_km: f64,
    quoted_price: u64,
    eta_minutes: u32,
}

impl Quote {
    /// Quote for a call-out covering `distance_km`.
    pub fn for_distance(distance_km: f64, config: &DispatchConfig) -> Self {
        Self {
            distance_km,
            quoted_price: config.pricing.call_out_price(distance_km),
            eta_minutes: config.eta.eta_minutes(distance_km),
        }
    }

    /// Quote for a provider at `provider` serving a requester at `requester`.
    pub fn between(requester: Coordinate, provider: Coordinate, config: &DispatchConfig) -> Self {
        Self::for_distance(great_circle_distance_km(requester, provider), config)
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn quoted_price(&self) -> u64 {
        self.quoted_price
    }

    pub fn eta_minutes(&self) -> u32 {
        self.eta_minutes
    }
}

/// A provider annotated with its quote relative to one requester.
///
/// Only built through [`RankedProvider::quoted`], which derives the quote from
/// the provider's own coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedProvider {
    provider: Provider,
    quote: Quote,
}

impl RankedProvider {
    /// Rank `provider` relative to `requester`.
    pub fn quoted(requester: Coordinate, provider: Provider, config: &DispatchConfig) -> Self {
        let quote = Quote::between(requester, provider.coordinate, config);
        Self { provider, quote }
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    pub fn id(&self) -> &ProviderId {
        &self.provider.id
    }

    pub fn coordinate(&self) -> Coordinate {
        self.provider.coordinate
    }

    pub fn quote(&self) -> Quote {
        self.quote
    }

    pub fn distance_km(&self) -> f64 {
        self.quote.distance_km()
    }

    pub fn quoted_price(&self) -> u64 {
        self.quote.quoted_price()
    }

    pub fn eta_minutes(&self) -> u32 {
        self.quote.eta_minutes()
    }

    /// Move the provider and requote it against `requester` in one step.
    pub(crate) fn relocate(
        &mut self,
        requester: Coordinate,
        coordinate: Coordinate,
        config: &DispatchConfig,
    ) -> Quote {
        self.provider.coordinate = coordinate;
        self.quote = Quote::between(requester, coordinate, config);
        self.quote
    }
}

//! Test helpers for common dispatch fixtures.
//!
//! The Bucharest fixture places three providers due north of the requester,
//! roughly 2 km, 8 km and 40 km away. Along a meridian the haversine distance
//! is exactly `R * Δlat`, so the quotes are easy to derive by hand.

use std::cell::Cell;

use crate::directory::{DirectoryError, ProviderDirectory};
use crate::feed::{FeedError, LiveUpdateFeed, Subscription, SubscriptionHandle};
use crate::geo::Coordinate;
use crate::location::{LocationError, LocationSource};
use crate::provider::{GarageRecord, Provider, ProviderId};

/// Requester position used across tests: central Bucharest.
pub const BUCHAREST: Coordinate = Coordinate::new(44.4268, 26.1025);

/// Latitude offsets for the ~2 km, ~8 km and ~40 km providers.
pub const NEAR_LAT_OFFSET: f64 = 0.018;
pub const MID_LAT_OFFSET: f64 = 0.072;
pub const FAR_LAT_OFFSET: f64 = 0.36;

/// Coordinate `lat_offset` degrees north of [`BUCHAREST`].
pub fn north_of_bucharest(lat_offset: f64) -> Coordinate {
    Coordinate::new(BUCHAREST.latitude + lat_offset, BUCHAREST.longitude)
}

/// Build a provider with a derived name and owner.
pub fn test_provider(id: &str, coordinate: Coordinate) -> Provider {
    Provider::new(id, format!("Service {id}"), coordinate, format!("owner-{id}"))
}

/// The three Bucharest providers, deliberately listed far-first.
pub fn bucharest_providers() -> Vec<Provider> {
    vec![
        test_provider("far", north_of_bucharest(FAR_LAT_OFFSET)),
        test_provider("near", north_of_bucharest(NEAR_LAT_OFFSET)),
        test_provider("mid", north_of_bucharest(MID_LAT_OFFSET)),
    ]
}

/// Raw directory row for a garage.
pub fn test_garage_record(
    id: &str,
    coordinate: Option<Coordinate>,
    is_approved: bool,
) -> GarageRecord {
    GarageRecord {
        id: id.to_string(),
        business_name: format!("Service {id}"),
        latitude: coordinate.map(|c| c.latitude),
        longitude: coordinate.map(|c| c.longitude),
        user_id: format!("owner-{id}"),
        is_approved,
    }
}

/// Location source that always fails with the given error.
#[derive(Debug, Clone)]
pub struct FailingLocation(pub LocationError);

impl LocationSource for FailingLocation {
    fn current_coordinate(&self) -> Result<Coordinate, LocationError> {
        Err(self.0.clone())
    }
}

/// Directory returning a fixed provider list and counting queries.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    providers: Vec<Provider>,
    queries: Cell<usize>,
}

impl StaticDirectory {
    pub fn new(providers: Vec<Provider>) -> Self {
        Self {
            providers,
            queries: Cell::new(0),
        }
    }

    pub fn queries(&self) -> usize {
        self.queries.get()
    }
}

impl ProviderDirectory for StaticDirectory {
    fn approved_with_location(&self) -> Result<Vec<Provider>, DirectoryError> {
        self.queries.set(self.queries.get() + 1);
        Ok(self.providers.clone())
    }
}

/// Directory whose query always fails.
#[derive(Debug, Clone)]
pub struct FailingDirectory(pub String);

impl ProviderDirectory for FailingDirectory {
    fn approved_with_location(&self) -> Result<Vec<Provider>, DirectoryError> {
        Err(DirectoryError::Query(self.0.clone()))
    }
}

/// Feed that refuses every subscription.
#[derive(Debug, Default)]
pub struct RefusingFeed {
    pub unsubscribes: Vec<SubscriptionHandle>,
}

impl LiveUpdateFeed for RefusingFeed {
    fn subscribe(&mut self, provider_id: &ProviderId) -> Result<Subscription, FeedError> {
        Err(FeedError::Refused {
            provider_id: provider_id.clone(),
            reason: "realtime channel closed".to_string(),
        })
    }

    fn unsubscribe(&mut self, handle: SubscriptionHandle) {
        self.unsubscribes.push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::great_circle_distance_km;

    #[test]
    fn fixture_distances_match_their_names() {
        let near = great_circle_distance_km(BUCHAREST, north_of_bucharest(NEAR_LAT_OFFSET));
        let mid = great_circle_distance_km(BUCHAREST, north_of_bucharest(MID_LAT_OFFSET));
        let far = great_circle_distance_km(BUCHAREST, north_of_bucharest(FAR_LAT_OFFSET));
        assert!((near - 2.0).abs() < 0.01, "near = {near}");
        assert!((mid - 8.0).abs() < 0.01, "mid = {mid}");
        assert!((far - 40.0).abs() < 0.05, "far = {far}");
    }

    #[test]
    fn static_directory_counts_queries() {
        let directory = StaticDirectory::new(bucharest_providers());
        assert_eq!(directory.queries(), 0);
        directory.approved_with_location().expect("query");
        assert_eq!(directory.queries(), 1);
    }
}

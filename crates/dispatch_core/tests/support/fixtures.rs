use dispatch_core::feed::{LocalFeed, PositionUpdate};
use dispatch_core::geo::Coordinate;
use dispatch_core::provider::{Provider, ProviderId};
use dispatch_core::test_helpers::{bucharest_providers, test_provider, StaticDirectory, BUCHAREST};
use dispatch_core::{DispatchConfig, DispatchSession, ProximityDispatcher, RankedProvider};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Providers scattered uniformly in a box of `spread_deg` around `center`.
pub fn random_providers(seed: u64, count: usize, center: Coordinate, spread_deg: f64) -> Vec<Provider> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let coordinate = Coordinate::new(
                center.latitude + rng.gen_range(-spread_deg..=spread_deg),
                center.longitude + rng.gen_range(-spread_deg..=spread_deg),
            );
            test_provider(&format!("p{i}"), coordinate)
        })
        .collect()
}

/// Rank `providers` around Bucharest with default config and return the entry for `id`.
pub fn ranked_in_bucharest(providers: &[Provider], id: &str) -> RankedProvider {
    ProximityDispatcher::default()
        .rank_nearby(BUCHAREST, providers, providers.len())
        .into_iter()
        .find(|ranked| ranked.id().as_str() == id)
        .expect("provider present in ranking")
}

/// Idle session for the Bucharest shortlist, sharing `feed`.
pub fn bucharest_session(feed: &LocalFeed) -> DispatchSession<LocalFeed> {
    let dispatcher = ProximityDispatcher::new(DispatchConfig::default());
    let view = dispatcher.locate_and_rank(&BUCHAREST, &StaticDirectory::new(bucharest_providers()));
    dispatcher
        .start_session(&view, feed.clone())
        .expect("Bucharest shortlist")
}

pub fn position(id: &str, coordinate: Coordinate) -> PositionUpdate {
    PositionUpdate::new(ProviderId::new(id), coordinate)
}

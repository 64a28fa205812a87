mod support;

use dispatch_core::geo::{great_circle_distance_km, Coordinate};
use dispatch_core::pricing::calculate_call_out_price;
use dispatch_core::ranking::rank_nearby;
use dispatch_core::test_helpers::{bucharest_providers, BUCHAREST};
use dispatch_core::DispatchConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use support::fixtures::random_providers;

#[test]
fn bucharest_scenario_keeps_two_nearest_with_expected_prices() {
    let ranked = rank_nearby(BUCHAREST, &bucharest_providers(), 2, &DispatchConfig::default());

    let ids: Vec<&str> = ranked.iter().map(|r| r.id().as_str()).collect();
    assert_eq!(ids, vec!["near", "mid"]);
    assert_eq!(ranked[0].quoted_price(), 60);
    assert_eq!(ranked[1].quoted_price(), 90);
    assert!((ranked[0].distance_km() - 2.0).abs() < 0.01);
    assert!((ranked[1].distance_km() - 8.0).abs() < 0.01);
}

#[test]
fn output_is_sorted_and_sized_for_random_pools() {
    let config = DispatchConfig::default();
    let mut rng = StdRng::seed_from_u64(7);
    for round in 0..50 {
        let count = rng.gen_range(0..40);
        let limit = rng.gen_range(0..12);
        let providers = random_providers(round, count, BUCHAREST, 0.5);

        let ranked = rank_nearby(BUCHAREST, &providers, limit, &config);

        assert_eq!(ranked.len(), limit.min(count), "round {round}");
        for pair in ranked.windows(2) {
            assert!(
                pair[0].distance_km() <= pair[1].distance_km(),
                "round {round}: unsorted shortlist"
            );
        }
    }
}

#[test]
fn shortlist_contains_the_globally_nearest() {
    let providers = random_providers(99, 60, BUCHAREST, 0.3);
    let ranked = rank_nearby(BUCHAREST, &providers, 5, &DispatchConfig::default());

    let mut all: Vec<f64> = providers
        .iter()
        .map(|p| great_circle_distance_km(BUCHAREST, p.coordinate))
        .collect();
    all.sort_by(f64::total_cmp);
    let shortlisted: Vec<f64> = ranked.iter().map(|r| r.distance_km()).collect();
    assert_eq!(shortlisted, all[..5].to_vec());
}

#[test]
fn quotes_are_consistent_with_distance() {
    let config = DispatchConfig::default();
    let providers = random_providers(3, 30, BUCHAREST, 0.4);
    for ranked in rank_nearby(BUCHAREST, &providers, 30, &config) {
        assert_eq!(ranked.quoted_price(), calculate_call_out_price(ranked.distance_km()));
        assert_eq!(ranked.eta_minutes(), config.eta.eta_minutes(ranked.distance_km()));
        assert_eq!(
            ranked.distance_km(),
            great_circle_distance_km(BUCHAREST, ranked.coordinate())
        );
    }
}

#[test]
fn distance_is_symmetric_for_random_pairs() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let a = Coordinate::new(rng.gen_range(-80.0..80.0), rng.gen_range(-179.0..179.0));
        let b = Coordinate::new(rng.gen_range(-80.0..80.0), rng.gen_range(-179.0..179.0));
        let there = great_circle_distance_km(a, b);
        let back = great_circle_distance_km(b, a);
        assert!((there - back).abs() < 1e-9);
        assert_eq!(great_circle_distance_km(a, a), 0.0);
    }
}

#[test]
fn custom_tariff_flows_into_ranking() {
    let mut config = DispatchConfig::default();
    config.pricing.base_fee = 100;
    config.pricing.per_km_rate = 10.0;
    let ranked = rank_nearby(BUCHAREST, &bucharest_providers(), 1, &config);
    assert_eq!(ranked[0].quoted_price(), 120);
}

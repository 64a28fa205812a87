use tracing::debug;

use crate::config::DispatchConfig;
use crate::geo::Coordinate;
use crate::provider::Provider;

use super::types::RankedProvider;

/// Rank providers by great-circle distance from `requester`.
///
/// Every provider is quoted, the list is sorted ascending by distance and cut
/// to `limit` entries. The sort is stable, so equidistant providers keep their
/// input order. Callers pass only providers that have a location.
///
/// # Examples
///
/// ```
/// use dispatch_core::config::DispatchConfig;
/// use dispatch_core::geo::Coordinate;
/// use dispatch_core::provider::Provider;
/// use dispatch_core::ranking::rank_nearby;
///
/// let requester = Coordinate::new(44.4268, 26.1025);
/// let providers = vec![
///     Provider::new("far", "Far", Coordinate::new(44.7868, 26.1025), "u1"),
///     Provider::new("near", "Near", Coordinate::new(44.4448, 26.1025), "u2"),
/// ];
/// let ranked = rank_nearby(requester, &providers, 1, &DispatchConfig::default());
/// assert_eq!(ranked.len(), 1);
/// assert_eq!(ranked[0].id().as_str(), "near");
/// ```
pub fn rank_nearby(
    requester: Coordinate,
    providers: &[Provider],
    limit: usize,
    config: &DispatchConfig,
) -> Vec<RankedProvider> {
    let mut ranked: Vec<RankedProvider> = providers
        .iter()
        .map(|provider| RankedProvider::quoted(requester, provider.clone(), config))
        .collect();
    ranked.sort_by(|a, b| a.distance_km().total_cmp(&b.distance_km()));
    ranked.truncate(limit);

    debug!(
        candidates = providers.len(),
        shortlisted = ranked.len(),
        nearest_km = ranked.first().map(RankedProvider::distance_km),
        "ranked providers"
    );
    ranked
}

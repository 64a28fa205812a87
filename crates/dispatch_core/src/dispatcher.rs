//! Proximity dispatcher: locate the requester, query the directory, rank.
//!
//! The two collaborator calls are sequenced, since the ranking depends on the
//! resolved coordinate. No failure escapes: each one becomes a
//! [`DispatchView`] the caller can render directly.

use serde::Serialize;
use tracing::{info, warn};

use crate::config::DispatchConfig;
use crate::directory::ProviderDirectory;
use crate::feed::LiveUpdateFeed;
use crate::geo::Coordinate;
use crate::location::{LocationError, LocationSource};
use crate::provider::Provider;
use crate::ranking::{rank_nearby, RankedProvider};
use crate::session::DispatchSession;

/// Renderable outcome of one locate-and-rank attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DispatchView {
    /// The requester could not be located; ranking was not attempted.
    LocationUnavailable { reason: LocationError },
    /// The provider directory could not be queried.
    DirectoryUnavailable { message: String },
    /// No eligible provider. Not an error.
    NoProvidersNearby { requester: Coordinate },
    Shortlist {
        requester: Coordinate,
        providers: Vec<RankedProvider>,
    },
}

impl DispatchView {
    /// Whether the UI should offer a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::LocationUnavailable { .. } | Self::DirectoryUnavailable { .. }
        )
    }

    pub fn requester(&self) -> Option<Coordinate> {
        match self {
            Self::NoProvidersNearby { requester } | Self::Shortlist { requester, .. } => {
                Some(*requester)
            }
            _ => None,
        }
    }

    pub fn providers(&self) -> &[RankedProvider] {
        match self {
            Self::Shortlist { providers, .. } => providers,
            _ => &[],
        }
    }
}

/// Ranks providers around a requester and opens dispatch sessions.
#[derive(Debug, Clone, Default)]
pub struct ProximityDispatcher {
    config: DispatchConfig,
}

impl ProximityDispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Nearest `limit` providers with their quotes. Pure.
    pub fn rank_nearby(
        &self,
        requester: Coordinate,
        providers: &[Provider],
        limit: usize,
    ) -> Vec<RankedProvider> {
        rank_nearby(requester, providers, limit, &self.config)
    }

    /// [`Self::rank_nearby`] with the configured shortlist limit.
    pub fn shortlist(&self, requester: Coordinate, providers: &[Provider]) -> Vec<RankedProvider> {
        self.rank_nearby(requester, providers, self.config.shortlist_limit)
    }

    /// Locate the requester, then query and rank providers.
    ///
    /// The directory is only queried after a successful location fix.
    pub fn locate_and_rank<L, D>(&self, location: &L, directory: &D) -> DispatchView
    where
        L: LocationSource + ?Sized,
        D: ProviderDirectory + ?Sized,
    {
        let requester = match location.current_coordinate() {
            Ok(requester) => requester,
            Err(reason) => {
                warn!(%reason, "requester location unavailable");
                return DispatchView::LocationUnavailable { reason };
            }
        };

        let providers = match directory.approved_with_location() {
            Ok(providers) => providers,
            Err(error) => {
                warn!(%error, "provider directory unavailable");
                return DispatchView::DirectoryUnavailable {
                    message: error.to_string(),
                };
            }
        };

        let ranked = self.shortlist(requester, &providers);
        info!(
            latitude = requester.latitude,
            longitude = requester.longitude,
            candidates = providers.len(),
            shortlisted = ranked.len(),
            "dispatch shortlist ready"
        );
        if ranked.is_empty() {
            DispatchView::NoProvidersNearby { requester }
        } else {
            DispatchView::Shortlist {
                requester,
                providers: ranked,
            }
        }
    }

    /// Open an idle session on `feed` for the requester `view` was ranked for.
    ///
    /// Only a [`DispatchView::Shortlist`] has providers to dispatch; any other
    /// view yields `None`.
    pub fn start_session<F: LiveUpdateFeed>(
        &self,
        view: &DispatchView,
        feed: F,
    ) -> Option<DispatchSession<F>> {
        match view {
            DispatchView::Shortlist { requester, .. } => {
                Some(DispatchSession::new(*requester, self.config.clone(), feed))
            }
            _ => None,
        }
    }
}

//! Dispatch session: the one provider currently travelling to the requester.
//!
//! A session is either idle or tracking a single selected provider. While
//! tracking it holds a feed subscription and recomputes the provider's quote
//! from every position update, against the requester coordinate fixed at
//! ranking time.
//!
//! Updates are applied in receipt order, last write wins. An update whose
//! `observed_at_ms` is older than the newest one applied so far is still
//! applied; it is logged at `warn` and counted in
//! [`SessionTelemetry::updates_out_of_order`].

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::DispatchConfig;
use crate::feed::{FeedError, LiveUpdateFeed, PositionUpdate, Subscription};
use crate::geo::Coordinate;
use crate::ranking::RankedProvider;
use crate::telemetry::SessionTelemetry;

/// Whether live positions are still arriving for the selected provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedStatus {
    Live,
    /// The feed dropped or refused the subscription. Last values stay shown.
    Disconnected,
}

/// What happened to a single position update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    /// Applied, but observed earlier than the previously applied update.
    AppliedOutOfOrder,
    NoSelection,
    ForeignProvider,
}

impl UpdateOutcome {
    pub fn was_applied(self) -> bool {
        matches!(self, Self::Applied | Self::AppliedOutOfOrder)
    }
}

#[derive(Debug)]
struct Tracking {
    selected: RankedProvider,
    subscription: Option<Subscription>,
    feed_status: FeedStatus,
    newest_observed_at_ms: Option<u64>,
}

/// State of one emergency dispatch, from selection to release.
///
/// Dropping the session releases its subscription.
pub struct DispatchSession<F: LiveUpdateFeed> {
    requester: Coordinate,
    config: DispatchConfig,
    feed: F,
    tracking: Option<Tracking>,
    telemetry: SessionTelemetry,
}

impl<F: LiveUpdateFeed> DispatchSession<F> {
    pub fn new(requester: Coordinate, config: DispatchConfig, feed: F) -> Self {
        Self {
            requester,
            config,
            feed,
            tracking: None,
            telemetry: SessionTelemetry::default(),
        }
    }

    pub fn requester(&self) -> Coordinate {
        self.requester
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    pub fn telemetry(&self) -> &SessionTelemetry {
        &self.telemetry
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking.is_some()
    }

    /// The provider being tracked, with its latest quote.
    pub fn selected(&self) -> Option<&RankedProvider> {
        self.tracking.as_ref().map(|tracking| &tracking.selected)
    }

    /// Feed status of the current selection, `None` when idle.
    pub fn feed_status(&self) -> Option<FeedStatus> {
        self.tracking.as_ref().map(|tracking| tracking.feed_status)
    }

    /// Make `provider` the dispatch target, replacing any previous one.
    ///
    /// A refused subscription does not undo the selection: the session tracks
    /// the provider with [`FeedStatus::Disconnected`].
    pub fn select_provider(&mut self, provider: RankedProvider) -> FeedStatus {
        self.deselect_provider();

        let (subscription, feed_status) = match self.feed.subscribe(provider.id()) {
            Ok(subscription) => (Some(subscription), FeedStatus::Live),
            Err(error) => {
                warn!(%error, provider_id = %provider.id(), "live feed unavailable, tracking last known position");
                self.telemetry.feed_disconnects += 1;
                (None, FeedStatus::Disconnected)
            }
        };

        info!(
            provider_id = %provider.id(),
            distance_km = provider.distance_km(),
            quoted_price = provider.quoted_price(),
            eta_minutes = provider.eta_minutes(),
            "provider selected for dispatch"
        );
        self.telemetry.selections += 1;
        self.tracking = Some(Tracking {
            selected: provider,
            subscription,
            feed_status,
            newest_observed_at_ms: None,
        });
        feed_status
    }

    /// Apply a live position for the selected provider.
    ///
    /// Distance, price and ETA are recomputed from the fixed requester
    /// coordinate and replaced together.
    pub fn on_provider_position_update(&mut self, update: PositionUpdate) -> UpdateOutcome {
        let Some(tracking) = self.tracking.as_mut() else {
            debug!(provider_id = %update.provider_id, "position update with no selection");
            self.telemetry.updates_ignored += 1;
            return UpdateOutcome::NoSelection;
        };
        if update.provider_id != *tracking.selected.id() {
            debug!(
                provider_id = %update.provider_id,
                selected = %tracking.selected.id(),
                "position update for another provider"
            );
            self.telemetry.updates_ignored += 1;
            return UpdateOutcome::ForeignProvider;
        }

        let out_of_order = matches!(
            (tracking.newest_observed_at_ms, update.observed_at_ms),
            (Some(newest), Some(observed)) if observed < newest
        );
        if out_of_order {
            warn!(
                provider_id = %update.provider_id,
                observed_at_ms = update.observed_at_ms,
                newest_observed_at_ms = tracking.newest_observed_at_ms,
                "applying position update observed before the newest one"
            );
            self.telemetry.updates_out_of_order += 1;
        }

        let quote = tracking
            .selected
            .relocate(self.requester, update.coordinate, &self.config);
        tracking.newest_observed_at_ms = tracking
            .newest_observed_at_ms
            .max(update.observed_at_ms);
        self.telemetry.updates_applied += 1;

        debug!(
            provider_id = %update.provider_id,
            distance_km = quote.distance_km(),
            quoted_price = quote.quoted_price(),
            eta_minutes = quote.eta_minutes(),
            "selected provider moved"
        );
        if out_of_order {
            UpdateOutcome::AppliedOutOfOrder
        } else {
            UpdateOutcome::Applied
        }
    }

    /// Apply every update queued on the subscription without blocking.
    ///
    /// Returns how many updates were drained. A dropped feed flips the
    /// session to [`FeedStatus::Disconnected`] once and stops polling.
    pub fn pump_updates(&mut self) -> usize {
        let mut drained = 0;
        loop {
            let next = match self.tracking.as_mut() {
                Some(Tracking {
                    subscription: Some(subscription),
                    feed_status: FeedStatus::Live,
                    ..
                }) => subscription.try_next(),
                _ => return drained,
            };
            match next {
                Ok(Some(update)) => {
                    drained += 1;
                    self.on_provider_position_update(update);
                }
                Ok(None) => return drained,
                Err(error) => {
                    self.mark_disconnected(error);
                    return drained;
                }
            }
        }
    }

    fn mark_disconnected(&mut self, error: FeedError) {
        if let Some(tracking) = self.tracking.as_mut() {
            warn!(%error, "live feed lost, keeping last known position");
            tracking.feed_status = FeedStatus::Disconnected;
            self.telemetry.feed_disconnects += 1;
        }
    }

    /// Release the subscription and return to idle. No-op when idle.
    pub fn deselect_provider(&mut self) {
        let Some(tracking) = self.tracking.take() else {
            return;
        };
        if let Some(subscription) = tracking.subscription {
            self.feed.unsubscribe(subscription.handle());
        }
        info!(provider_id = %tracking.selected.id(), "dispatch session idle");
    }
}

impl<F: LiveUpdateFeed> Drop for DispatchSession<F> {
    fn drop(&mut self) {
        self.deselect_provider();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::LocalFeed;
    use crate::provider::Provider;

    fn requester() -> Coordinate {
        Coordinate::new(44.4268, 26.1025)
    }

    fn ranked(id: &str, latitude: f64) -> RankedProvider {
        let provider = Provider::new(id, "Service Nord", Coordinate::new(latitude, 26.1025), "u1");
        RankedProvider::quoted(requester(), provider, &DispatchConfig::default())
    }

    fn session(feed: &LocalFeed) -> DispatchSession<LocalFeed> {
        DispatchSession::new(requester(), DispatchConfig::default(), feed.clone())
    }

    #[test]
    fn starts_idle() {
        let feed = LocalFeed::new();
        let session = session(&feed);
        assert!(!session.is_tracking());
        assert!(session.selected().is_none());
        assert_eq!(session.feed_status(), None);
    }

    #[test]
    fn update_without_selection_is_ignored() {
        let feed = LocalFeed::new();
        let mut session = session(&feed);
        let update = PositionUpdate::new("nord".into(), Coordinate::new(44.43, 26.10));
        assert_eq!(session.on_provider_position_update(update), UpdateOutcome::NoSelection);
        assert_eq!(session.telemetry().updates_ignored, 1);
    }

    #[test]
    fn foreign_provider_update_is_ignored() {
        let feed = LocalFeed::new();
        let mut session = session(&feed);
        session.select_provider(ranked("nord", 44.4988));
        let update = PositionUpdate::new("sud".into(), requester());
        assert_eq!(session.on_provider_position_update(update), UpdateOutcome::ForeignProvider);
        assert_eq!(session.selected().expect("selected").quoted_price(), 90);
    }

    #[test]
    fn missing_timestamps_never_count_as_out_of_order() {
        let feed = LocalFeed::new();
        let mut session = session(&feed);
        session.select_provider(ranked("nord", 44.4988));
        let first = PositionUpdate::new("nord".into(), Coordinate::new(44.48, 26.1025)).observed_at(50);
        let second = PositionUpdate::new("nord".into(), Coordinate::new(44.47, 26.1025));
        assert_eq!(session.on_provider_position_update(first), UpdateOutcome::Applied);
        assert_eq!(session.on_provider_position_update(second), UpdateOutcome::Applied);
    }

    #[test]
    fn staleness_is_measured_against_newest_observation() {
        let feed = LocalFeed::new();
        let mut session = session(&feed);
        session.select_provider(ranked("nord", 44.4988));
        let at = |latitude: f64, observed_at_ms: u64| {
            PositionUpdate::new("nord".into(), Coordinate::new(latitude, 26.1025))
                .observed_at(observed_at_ms)
        };

        let outcomes = [
            session.on_provider_position_update(at(44.48, 30)),
            session.on_provider_position_update(at(44.47, 10)),
            session.on_provider_position_update(at(44.46, 20)),
            session.on_provider_position_update(at(44.45, 40)),
        ];

        assert_eq!(
            outcomes,
            [
                UpdateOutcome::Applied,
                UpdateOutcome::AppliedOutOfOrder,
                UpdateOutcome::AppliedOutOfOrder,
                UpdateOutcome::Applied,
            ]
        );
        assert_eq!(session.telemetry().updates_out_of_order, 2);
        assert_eq!(session.telemetry().updates_applied, 4);
        assert_eq!(session.selected().expect("selected").coordinate().latitude, 44.45);
    }

    #[test]
    fn drop_releases_subscription() {
        let feed = LocalFeed::new();
        {
            let mut session = session(&feed);
            session.select_provider(ranked("nord", 44.4988));
            assert_eq!(feed.active_subscriptions(), 1);
        }
        assert_eq!(feed.active_subscriptions(), 0);
    }
}

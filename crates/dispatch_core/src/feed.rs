//! Live position feed for a dispatched provider.
//!
//! A subscription is a handle plus the receiving end of an unbounded update
//! stream. The session drains it from its own event loop with
//! [`Subscription::try_next`], which never blocks and needs no runtime.
//!
//! [`LocalFeed`] is an in-process implementation: publishers push updates
//! with [`LocalFeed::publish`] and every live subscription for that provider
//! receives them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::geo::Coordinate;
use crate::provider::ProviderId;

/// Identifies one open subscription on a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// A provider's reported position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub provider_id: ProviderId,
    pub coordinate: Coordinate,
    /// When the position was observed at the source, if the feed reports it.
    #[serde(default)]
    pub observed_at_ms: Option<u64>,
}

impl PositionUpdate {
    pub fn new(provider_id: ProviderId, coordinate: Coordinate) -> Self {
        Self {
            provider_id,
            coordinate,
            observed_at_ms: None,
        }
    }

    pub fn observed_at(mut self, observed_at_ms: u64) -> Self {
        self.observed_at_ms = Some(observed_at_ms);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("subscription to provider {provider_id} refused: {reason}")]
    Refused {
        provider_id: ProviderId,
        reason: String,
    },
    #[error("live feed for provider {0} disconnected")]
    Disconnected(ProviderId),
}

/// An open subscription to one provider's position updates.
#[derive(Debug)]
pub struct Subscription {
    handle: SubscriptionHandle,
    provider_id: ProviderId,
    updates: UnboundedReceiver<PositionUpdate>,
}

impl Subscription {
    pub fn new(
        handle: SubscriptionHandle,
        provider_id: ProviderId,
        updates: UnboundedReceiver<PositionUpdate>,
    ) -> Self {
        Self {
            handle,
            provider_id,
            updates,
        }
    }

    pub fn handle(&self) -> SubscriptionHandle {
        self.handle
    }

    pub fn provider_id(&self) -> &ProviderId {
        &self.provider_id
    }

    /// Next pending update, `Ok(None)` when nothing is queued.
    ///
    /// Fails with [`FeedError::Disconnected`] once the publishing side is gone
    /// and the queue is drained.
    pub fn try_next(&mut self) -> Result<Option<PositionUpdate>, FeedError> {
        match self.updates.try_recv() {
            Ok(update) => Ok(Some(update)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                Err(FeedError::Disconnected(self.provider_id.clone()))
            }
        }
    }
}

/// Push source of live provider positions.
pub trait LiveUpdateFeed {
    /// Start receiving updates for exactly `provider_id`.
    fn subscribe(&mut self, provider_id: &ProviderId) -> Result<Subscription, FeedError>;

    /// Stop delivering to `handle`. Unknown handles are ignored.
    fn unsubscribe(&mut self, handle: SubscriptionHandle);
}

impl<F: LiveUpdateFeed + ?Sized> LiveUpdateFeed for &mut F {
    fn subscribe(&mut self, provider_id: &ProviderId) -> Result<Subscription, FeedError> {
        (**self).subscribe(provider_id)
    }

    fn unsubscribe(&mut self, handle: SubscriptionHandle) {
        (**self).unsubscribe(handle)
    }
}

#[derive(Debug, Default)]
struct LocalFeedState {
    next_handle: u64,
    subscribers: HashMap<SubscriptionHandle, (ProviderId, UnboundedSender<PositionUpdate>)>,
}

/// In-process live feed. Clones share the same subscriber table.
#[derive(Debug, Clone, Default)]
pub struct LocalFeed {
    state: Arc<Mutex<LocalFeedState>>,
}

impl LocalFeed {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, LocalFeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver `update` to every subscription for its provider.
    ///
    /// Returns the number of subscriptions that received it. Subscriptions
    /// whose receiver was dropped are pruned.
    pub fn publish(&self, update: PositionUpdate) -> usize {
        let mut state = self.state();
        let mut delivered = 0;
        state.subscribers.retain(|_, (provider_id, sender)| {
            if *provider_id != update.provider_id {
                return true;
            }
            match sender.send(update.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => false,
            }
        });
        debug!(provider_id = %update.provider_id, delivered, "published position update");
        delivered
    }

    /// Drop every subscription for `provider_id`, as a transport loss would.
    ///
    /// Queued updates stay readable; afterwards the subscriber sees
    /// [`FeedError::Disconnected`].
    pub fn disconnect(&self, provider_id: &ProviderId) -> usize {
        let mut state = self.state();
        let before = state.subscribers.len();
        state.subscribers.retain(|_, (subscribed, _)| subscribed != provider_id);
        before - state.subscribers.len()
    }

    /// Number of subscriptions currently open.
    pub fn active_subscriptions(&self) -> usize {
        self.state().subscribers.len()
    }

    /// Number of subscriptions currently open for `provider_id`.
    pub fn subscriptions_for(&self, provider_id: &ProviderId) -> usize {
        self.state()
            .subscribers
            .values()
            .filter(|(subscribed, _)| subscribed == provider_id)
            .count()
    }
}

impl LiveUpdateFeed for LocalFeed {
    fn subscribe(&mut self, provider_id: &ProviderId) -> Result<Subscription, FeedError> {
        let mut state = self.state();
        state.next_handle += 1;
        let handle = SubscriptionHandle::new(state.next_handle);
        let (sender, receiver) = unbounded_channel();
        state
            .subscribers
            .insert(handle, (provider_id.clone(), sender));
        debug!(%provider_id, handle = handle.raw(), "subscribed to live feed");
        Ok(Subscription::new(handle, provider_id.clone(), receiver))
    }

    fn unsubscribe(&mut self, handle: SubscriptionHandle) {
        if self.state().subscribers.remove(&handle).is_some() {
            debug!(handle = handle.raw(), "unsubscribed from live feed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(id: &str, latitude: f64) -> PositionUpdate {
        PositionUpdate::new(ProviderId::new(id), Coordinate::new(latitude, 26.1025))
    }

    #[test]
    fn delivers_only_to_matching_provider() {
        let mut feed = LocalFeed::new();
        let mut nord = feed.subscribe(&ProviderId::new("nord")).expect("subscribe");
        let mut sud = feed.subscribe(&ProviderId::new("sud")).expect("subscribe");

        assert_eq!(feed.publish(update("nord", 44.45)), 1);

        let received = nord.try_next().expect("live").expect("queued");
        assert_eq!(received.coordinate.latitude, 44.45);
        assert_eq!(nord.try_next().expect("live"), None);
        assert_eq!(sud.try_next().expect("live"), None);
    }

    #[test]
    fn unsubscribe_stops_delivery_and_closes_stream() {
        let mut feed = LocalFeed::new();
        let mut subscription = feed.subscribe(&ProviderId::new("nord")).expect("subscribe");
        feed.unsubscribe(subscription.handle());

        assert_eq!(feed.active_subscriptions(), 0);
        assert_eq!(feed.publish(update("nord", 44.45)), 0);
        assert!(matches!(
            subscription.try_next(),
            Err(FeedError::Disconnected(_))
        ));
    }

    #[test]
    fn disconnect_keeps_queued_updates_readable() {
        let mut feed = LocalFeed::new();
        let mut subscription = feed.subscribe(&ProviderId::new("nord")).expect("subscribe");
        feed.publish(update("nord", 44.45));

        assert_eq!(feed.disconnect(&ProviderId::new("nord")), 1);
        assert!(subscription.try_next().expect("queued").is_some());
        assert!(subscription.try_next().is_err());
    }

    #[test]
    fn dropped_receivers_are_pruned_on_publish() {
        let mut feed = LocalFeed::new();
        let subscription = feed.subscribe(&ProviderId::new("nord")).expect("subscribe");
        drop(subscription);

        assert_eq!(feed.publish(update("nord", 44.45)), 0);
        assert_eq!(feed.active_subscriptions(), 0);
    }

    #[test]
    fn handles_are_unique() {
        let mut feed = LocalFeed::new();
        let a = feed.subscribe(&ProviderId::new("nord")).expect("subscribe");
        let b = feed.subscribe(&ProviderId::new("nord")).expect("subscribe");
        assert_ne!(a.handle(), b.handle());
        assert_eq!(feed.subscriptions_for(&ProviderId::new("nord")), 2);
    }
}

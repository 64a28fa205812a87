//! Emergency-mechanic proximity dispatch.
//!
//! - [`dispatcher`]: locate the requester, query the directory, rank.
//! - [`ranking`]: haversine ranking with call-out price and ETA quotes.
//! - [`session`]: track one selected provider through a live position feed.
//! - [`provider`] / [`directory`]: typed providers and the raw-row boundary.

pub mod config;
pub mod directory;
pub mod dispatcher;
pub mod display;
pub mod eta;
pub mod feed;
pub mod geo;
pub mod location;
pub mod pricing;
pub mod provider;
pub mod ranking;
pub mod session;
pub mod telemetry;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use config::DispatchConfig;
pub use dispatcher::{DispatchView, ProximityDispatcher};
pub use geo::Coordinate;
pub use provider::{Provider, ProviderId};
pub use ranking::{Quote, RankedProvider};
pub use session::{DispatchSession, FeedStatus, UpdateOutcome};

//! Proximity ranking: turn a requester position and a provider pool into a
//! priced, ordered shortlist.

pub mod nearest;
pub mod types;

pub use nearest::rank_nearby;
pub use types::{Quote, RankedProvider};

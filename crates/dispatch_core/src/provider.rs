//! Provider identity and the directory-boundary conversion from raw garage rows.
//!
//! The directory hands back loosely-typed rows. Only approved rows with both
//! coordinates present and valid become a [`Provider`]; everything else is
//! dropped here so the ranking code never sees a provider without a location.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::geo::{Coordinate, CoordinateError};

/// Opaque provider identity as issued by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProviderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A garage or mobile mechanic eligible for emergency dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: ProviderId,
    pub business_name: String,
    pub coordinate: Coordinate,
    /// Account that owns the garage listing.
    pub owner_id: String,
}

impl Provider {
    pub fn new(
        id: impl Into<ProviderId>,
        business_name: impl Into<String>,
        coordinate: Coordinate,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            business_name: business_name.into(),
            coordinate,
            owner_id: owner_id.into(),
        }
    }
}

/// Raw garage row as returned by the directory query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarageRecord {
    pub id: String,
    pub business_name: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub user_id: String,
    #[serde(default)]
    pub is_approved: bool,
}

/// Why a garage row was kept away from the dispatcher.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("garage {id} is not approved")]
    NotApproved { id: String },
    #[error("garage {id} has no location")]
    MissingCoordinate { id: String },
    #[error("garage {id} has an invalid location: {source}")]
    InvalidCoordinate {
        id: String,
        #[source]
        source: CoordinateError,
    },
}

impl TryFrom<GarageRecord> for Provider {
    type Error = RecordError;

    fn try_from(record: GarageRecord) -> Result<Self, Self::Error> {
        if !record.is_approved {
            return Err(RecordError::NotApproved { id: record.id });
        }
        let (Some(latitude), Some(longitude)) = (record.latitude, record.longitude) else {
            return Err(RecordError::MissingCoordinate { id: record.id });
        };
        let coordinate = match Coordinate::validated(latitude, longitude) {
            Ok(coordinate) => coordinate,
            Err(source) => {
                return Err(RecordError::InvalidCoordinate {
                    id: record.id,
                    source,
                })
            }
        };
        Ok(Provider {
            id: ProviderId::new(record.id),
            business_name: record.business_name,
            coordinate,
            owner_id: record.user_id,
        })
    }
}

/// Keep the approved, located rows as providers, in input order.
pub fn eligible_providers(records: impl IntoIterator<Item = GarageRecord>) -> Vec<Provider> {
    records
        .into_iter()
        .filter_map(|record| match Provider::try_from(record) {
            Ok(provider) => Some(provider),
            Err(error @ RecordError::InvalidCoordinate { .. }) => {
                warn!(%error, "dropping garage record");
                None
            }
            Err(error) => {
                debug!(%error, "skipping garage record");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, lat: Option<f64>, lng: Option<f64>, approved: bool) -> GarageRecord {
        GarageRecord {
            id: id.to_string(),
            business_name: format!("Garage {id}"),
            latitude: lat,
            longitude: lng,
            user_id: format!("owner-{id}"),
            is_approved: approved,
        }
    }

    #[test]
    fn approved_record_with_location_converts() {
        let provider = Provider::try_from(record("g1", Some(44.43), Some(26.10), true))
            .expect("eligible");
        assert_eq!(provider.id.as_str(), "g1");
        assert_eq!(provider.owner_id, "owner-g1");
        assert_eq!(provider.coordinate, Coordinate::new(44.43, 26.10));
    }

    #[test]
    fn rejection_reasons() {
        assert!(matches!(
            Provider::try_from(record("g1", Some(44.0), Some(26.0), false)),
            Err(RecordError::NotApproved { .. })
        ));
        assert!(matches!(
            Provider::try_from(record("g2", None, Some(26.0), true)),
            Err(RecordError::MissingCoordinate { .. })
        ));
        assert!(matches!(
            Provider::try_from(record("g3", Some(44.0), None, true)),
            Err(RecordError::MissingCoordinate { .. })
        ));
        assert!(matches!(
            Provider::try_from(record("g4", Some(144.0), Some(26.0), true)),
            Err(RecordError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn eligible_providers_filters_and_keeps_order() {
        let providers = eligible_providers(vec![
            record("b", Some(44.5), Some(26.1), true),
            record("x", Some(44.5), Some(26.1), false),
            record("a", Some(44.4), Some(26.2), true),
            record("y", None, None, true),
        ]);
        let ids: Vec<&str> = providers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn record_deserializes_with_nulls_and_missing_flag() {
        let raw = r#"{"id":"g9","business_name":"Nord","latitude":null,"user_id":"u9"}"#;
        let record: GarageRecord = serde_json::from_str(raw).expect("record");
        assert_eq!(record.latitude, None);
        assert_eq!(record.longitude, None);
        assert!(!record.is_approved);
    }
}

//! Geographic primitives: coordinates and great-circle distance.
//!
//! Distances use the haversine formula on a sphere of radius
//! [`EARTH_RADIUS_KM`]. Providers sit within a few tens of kilometres of the
//! requester, where a flat-plane approximation already drifts noticeably.

use h3o::LatLng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS-84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Reasons a raw latitude/longitude pair is rejected.
#[derive(Debug, Error)]
pub enum CoordinateError {
    #[error("coordinate is not finite: {0}")]
    NotFinite(#[from] h3o::error::InvalidLatLng),
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

impl Coordinate {
    /// Build a coordinate without validation.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build a coordinate, rejecting non-finite or out-of-range values.
    pub fn validated(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        LatLng::new(latitude, longitude)?;
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self::new(latitude, longitude))
    }

    /// Great-circle distance to `other` in kilometres.
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        great_circle_distance_km(*self, *other)
    }
}

/// Haversine distance between two coordinates, in kilometres.
pub fn great_circle_distance_km(from: Coordinate, to: Coordinate) -> f64 {
    let (lat1, lon1) = (from.latitude.to_radians(), from.longitude.to_radians());
    let (lat2, lon2) = (to.latitude.to_radians(), to.longitude.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_longitude_at_equator() {
        let distance = great_circle_distance_km(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0));
        assert!((distance - 111.19).abs() < 0.5, "got {distance}");
    }

    #[test]
    fn distance_to_self_is_zero() {
        let bucharest = Coordinate::new(44.4268, 26.1025);
        assert_eq!(great_circle_distance_km(bucharest, bucharest), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coordinate::new(44.4268, 26.1025);
        let b = Coordinate::new(45.7489, 21.2087);
        let there = a.distance_km(&b);
        let back = b.distance_km(&a);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn validated_rejects_out_of_range_and_nan() {
        assert!(matches!(
            Coordinate::validated(91.0, 0.0),
            Err(CoordinateError::LatitudeOutOfRange(_))
        ));
        assert!(matches!(
            Coordinate::validated(0.0, -180.5),
            Err(CoordinateError::LongitudeOutOfRange(_))
        ));
        assert!(matches!(
            Coordinate::validated(f64::NAN, 0.0),
            Err(CoordinateError::NotFinite(_))
        ));
        let ok = Coordinate::validated(44.4268, 26.1025).expect("valid");
        assert_eq!(ok, Coordinate::new(44.4268, 26.1025));
    }
}

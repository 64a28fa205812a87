//! Requester location source.

use serde::Serialize;
use thiserror::Error;

use crate::geo::Coordinate;

/// Why the requester's position could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// One-shot source of the requester's current position.
pub trait LocationSource {
    fn current_coordinate(&self) -> Result<Coordinate, LocationError>;
}

/// A fixed position is its own location source.
impl LocationSource for Coordinate {
    fn current_coordinate(&self) -> Result<Coordinate, LocationError> {
        Ok(*self)
    }
}

impl<L: LocationSource + ?Sized> LocationSource for &L {
    fn current_coordinate(&self) -> Result<Coordinate, LocationError> {
        (**self).current_coordinate()
    }
}

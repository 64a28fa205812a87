//! Provider directory: the catalogue of garages eligible for dispatch.

use thiserror::Error;
use tracing::debug;

use crate::provider::{eligible_providers, GarageRecord, Provider};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("provider directory query failed: {0}")]
    Query(String),
}

/// Source of approved providers that have a location.
///
/// Implementations own the filtering: every returned provider is approved and
/// carries a coordinate.
pub trait ProviderDirectory {
    fn approved_with_location(&self) -> Result<Vec<Provider>, DirectoryError>;
}

impl<D: ProviderDirectory + ?Sized> ProviderDirectory for &D {
    fn approved_with_location(&self) -> Result<Vec<Provider>, DirectoryError> {
        (**self).approved_with_location()
    }
}

/// Directory backed by raw garage rows, filtered at query time.
#[derive(Debug, Clone, Default)]
pub struct RecordDirectory {
    records: Vec<GarageRecord>,
}

impl RecordDirectory {
    pub fn new(records: Vec<GarageRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[GarageRecord] {
        &self.records
    }

    pub fn upsert(&mut self, record: GarageRecord) {
        match self.records.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }
}

impl ProviderDirectory for RecordDirectory {
    fn approved_with_location(&self) -> Result<Vec<Provider>, DirectoryError> {
        let providers = eligible_providers(self.records.iter().cloned());
        debug!(
            records = self.records.len(),
            eligible = providers.len(),
            "queried garage records"
        );
        Ok(providers)
    }
}

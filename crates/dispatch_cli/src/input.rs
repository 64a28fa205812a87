//! Garage and replay files read by the CLI.

use std::fs;
use std::path::{Path, PathBuf};

use dispatch_core::config::ConfigError;
use dispatch_core::geo::{Coordinate, CoordinateError};
use dispatch_core::provider::GarageRecord;
use dispatch_core::DispatchConfig;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid requester location: {0}")]
    Requester(#[from] CoordinateError),
    #[error("scenario selects entry {index} but the shortlist has {available}")]
    Selection { index: usize, available: usize },
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, CliError> {
    let raw = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Raw garage rows from a JSON array file.
pub fn load_garage_records(path: &Path) -> Result<Vec<GarageRecord>, CliError> {
    read_json(path)
}

/// Config from `path`, or defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<DispatchConfig, CliError> {
    match path {
        Some(path) => Ok(DispatchConfig::from_json_file(path)?),
        None => Ok(DispatchConfig::default()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ReplayUpdate {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub observed_at_ms: Option<u64>,
}

impl ReplayUpdate {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// A recorded dispatch: who asked, which garages existed, how the chosen one moved.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplayScenario {
    pub requester: Coordinate,
    pub garages: Vec<GarageRecord>,
    #[serde(default)]
    pub limit: Option<usize>,
    /// Index into the shortlist of the provider to dispatch.
    #[serde(default)]
    pub select: usize,
    #[serde(default)]
    pub updates: Vec<ReplayUpdate>,
    #[serde(default)]
    pub disconnect_at_end: bool,
}

impl ReplayScenario {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        read_json(path)
    }
}

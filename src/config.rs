//! Settings loaded from a JSON file.

use crate::error::Error;
use crate::sampler::MIN_SAMPLES;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Years the population map can be shown for
pub const DEFAULT_ALLOWED_YEARS: [i32; 8] = [1970, 1980, 1990, 2000, 2010, 2015, 2020, 2022];

/// Settings shared by every request. Each field has a default, so a config
/// file only needs the values it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// `graph` subcommand defaults
    pub graph: GraphConfig,
    /// `population` subcommand defaults
    pub population: PopulationConfig,
    /// Logging setup
    pub log: LogConfig,
}

/// Plot interval and sample count bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphConfig {
    /// Default lower bound of the interval
    pub min: f64,
    /// Default upper bound of the interval
    pub max: f64,
    /// Default sample count
    pub samples: usize,
    /// Upper bound on the sample count, which bounds rendering cost
    pub max_samples: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            min: -10.0,
            max: 10.0,
            samples: 400,
            max_samples: 2000,
        }
    }
}

/// Year filter and default column names of the population table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PopulationConfig {
    /// Only these years can be selected
    pub allowed_years: BTreeSet<i32>,
    /// Header of the country name column
    pub country_column: String,
    /// Header of the year column
    pub year_column: String,
    /// Header of the population column
    pub population_column: String,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            allowed_years: DEFAULT_ALLOWED_YEARS.iter().copied().collect(),
            country_column: "country".into(),
            year_column: "year".into(),
            population_column: "population".into(),
        }
    }
}

/// Logging setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "warn".into(),
        }
    }
}

impl Config {
    /// Load a JSON config file. Missing sections and fields keep their
    /// defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| {
            Error::DataFormatError(format!("cannot read {}: {}", path.display(), err))
        })?;
        Self::from_json_str(&text)
    }

    /// Parse and validate a JSON config. Missing fields keep their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the bounds serde cannot express
    pub fn validate(&self) -> Result<(), Error> {
        if self.graph.max_samples < MIN_SAMPLES {
            return Err(Error::InvalidRange(format!(
                "graph.max_samples must be at least {}",
                MIN_SAMPLES
            )));
        }
        if self.population.allowed_years.is_empty() {
            return Err(Error::DataFormatError(
                "population.allowed_years must not be empty".into(),
            ));
        }
        Ok(())
    }
}

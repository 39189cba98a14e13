//! Parsing and checking of the configuration file.
//!
//! The configuration file is YAML. Every field is optional, a missing field takes its default
//! value, so an empty file is a valid configuration.
//!
//! ```yaml
//! input_dir: soundings
//! output_dir: diagrams
//! ingest:
//!   wind_units: knots
//!   timestamp_offset_hours: 1
//! analysis:
//!   lfc_policy: bottom
//!   el_policy: top
//!   ccl_policy: bottom
//!   coriolis: absolute
//! geocoding:
//!   enabled: false
//! image:
//!   width: 1920
//!   height: 957
//! ```
use crate::{
    analysis::AnalysisOptions, error::ConfigError, geocode::GeocodingOptions,
    geojson::IngestOptions, render::ImageOptions,
};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Everything that can be set in the configuration file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory searched for `.json` sounding documents.
    pub input_dir: PathBuf,
    /// Directory the diagrams are written to, created if needed.
    pub output_dir: PathBuf,
    /// How sounding documents are read.
    pub ingest: IngestOptions,
    /// Choices made during the analysis.
    pub analysis: AnalysisOptions,
    /// Place name lookup.
    pub geocoding: GeocodingOptions,
    /// Size of the diagram.
    pub image: ImageOptions,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            ingest: IngestOptions::default(),
            analysis: AnalysisOptions::default(),
            geocoding: GeocodingOptions::default(),
            image: ImageOptions::default(),
        }
    }
}

impl Config {
    /// Read and check a configuration file.
    pub fn new_from_file(file_path: &Path) -> Result<Config, ConfigError> {
        let data = fs::read(file_path)?;
        let config: Config = serde_yaml::from_slice(data.as_slice())?;

        config.check_bounds()?;

        Ok(config)
    }

    /// Checks that every value is usable.
    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        if !(-24..=24).contains(&self.ingest.timestamp_offset_hours) {
            return Err(ConfigError::OutOfBounds(
                "Timestamp offset must be within 24 hours",
            ));
        }

        if self.geocoding.timeout_secs < 1 || self.geocoding.timeout_secs > 120 {
            return Err(ConfigError::OutOfBounds(
                "Geocoding timeout must be between 1 and 120 seconds",
            ));
        }

        if self.image.width < 800 || self.image.height < 400 {
            return Err(ConfigError::OutOfBounds(
                "Image must be at least 800 pixels wide and 400 pixels tall",
            ));
        }

        if self.image.width > 8000 || self.image.height > 8000 {
            return Err(ConfigError::OutOfBounds(
                "Image cannot be larger than 8000 pixels on a side",
            ));
        }

        Ok(())
    }
}

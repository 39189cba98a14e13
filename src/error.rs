//! Error types for the skewt-analysis crate.
use std::path::PathBuf;
use thiserror::Error;

/// Error type for the analysis functions.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum AnalysisError {
    /// A profile that is required for this analysis is missing.
    #[error("missing profile required for the analysis")]
    MissingProfile,
    /// A value (surface value, index, location, etc) that is required is not available.
    #[error("missing value required for analysis")]
    MissingValue,
    /// Not enough data available for analysis.
    #[error("not enough data available for analysis")]
    NotEnoughData,
    /// There is no data available that meets the requirements.
    #[error("profile is full of missing values, cannot do analysis")]
    NoDataProfile,
    /// Bad or invalid input.
    #[error("invalid input")]
    InvalidInput,
    /// Missing data during interpolation, or it would have been extrapolation.
    #[error("none value encountered during interpolation")]
    InterpolationError,
    /// The shear vector has zero length, so it has no direction to rotate.
    #[error("shear vector has zero magnitude")]
    DegenerateShear,
    /// A metfor function returned `None`.
    #[error("error bubbled up from metfor crate")]
    MetForError,
}

/// Shorthand for results.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors while turning a GeoJSON document into a sounding.
#[derive(Debug, Error)]
pub enum InputError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The document is not valid JSON, or does not have the expected shape.
    #[error("cannot deserialize sounding document: {0}")]
    Json(#[from] serde_json::Error),
    /// A property required to build the sounding is absent.
    #[error("required property `{0}` is missing")]
    MissingProperty(&'static str),
    /// The parsed levels do not form a usable sounding.
    #[error("invalid sounding profile: {0}")]
    InvalidProfile(#[from] AnalysisError),
}

/// Errors while reading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be opened.
    #[error("cannot open configuration file: {0}")]
    CantOpenFile(#[from] std::io::Error),
    /// The configuration file is not valid YAML for `Config`.
    #[error("cannot deserialize configuration file: {0}")]
    CantDeserialize(#[from] serde_yaml::Error),
    /// A configuration value is outside its allowed range.
    #[error("configuration component is out of bounds: {0}")]
    OutOfBounds(&'static str),
}

/// Errors while drawing the diagram.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The output directory could not be created.
    #[error("cannot create output directory {path}: {source}")]
    OutputDir {
        /// Directory that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The plotting backend failed.
    #[error("drawing failed: {0}")]
    Drawing(String),
}

/// Any failure while processing one sounding file from start to finish.
#[derive(Debug, Error)]
pub enum SkewTError {
    /// Loading or parsing failed.
    #[error(transparent)]
    Input(#[from] InputError),
    /// Drawing failed.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// Listing an input directory failed.
    #[error("cannot list input directory {path}: {source}")]
    InputDir {
        /// Directory that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

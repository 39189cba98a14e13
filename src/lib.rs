#![warn(missing_docs)]
//! Functions and data types for analyzing atmospheric soundings and drawing them on a Skew-T
//! log-P diagram.
//!
//! A sounding is read from a GeoJSON document with [`load_geojson`] and [`parse_sounding`]. An
//! [`Analysis`] computes the parcel ascents, characteristic levels, storm motion, helicity,
//! stability indices and temperature advection in one pass. Any value that cannot be computed is
//! left undefined instead of failing the whole analysis. [`render_diagram`] draws the result.

//
// API
//
pub use crate::{
    advection::{
        band_advection, coriolis_parameter, normalize_direction_difference,
        temperature_advection, BandAdvection, LayerAdvection,
    },
    analysis::{Analysis, AnalysisOptions, InstabilityIndices},
    batch::{collect_input_files, process_all, process_file, BatchSummary},
    config::Config,
    error::{AnalysisError, ConfigError, InputError, RenderError, Result, SkewTError},
    geocode::{
        locality_from_address, make_geocoder, CachedGeocoder, GeocodingOptions,
        NominatimGeocoder, OfflineGeocoder, ReverseGeocoder, UNKNOWN_LOCATION,
    },
    geojson::{load_geojson, parse_sounding, IngestOptions, SoundingDocument},
    indexes::{
        cross_totals, k_index, lifted_index, precipitable_water, total_totals, vertical_totals,
    },
    interpolation::{
        height_to_pressure, linear_interpolate, linear_interpolate_sounding, pressure_to_height,
    },
    keys::{CoriolisConvention, CrossingPolicy, WindUnits},
    layers::{layer_agl, Layer},
    levels::{convective_condensation_level, freezing_level, height_level, ConvectiveCondensation},
    parcel::{mixed_layer_parcel, most_unstable_parcel, surface_parcel, Parcel},
    parcel_profile::{
        lift_parcel, AscentCurve, DerivedLevel, LiftOptions, ParcelAscentAnalysis, ParcelPath,
        ParcelProfile,
    },
    render::{
        clip_polyline, format_valid_time, output_file_name, render_diagram, ImageOptions,
    },
    sounding::{DataRow, Sounding, StationInfo},
    wind::{bulk_shear, bunkers_storm_motion, mean_wind, sr_helicity, StormMotion},
};

/// Pieces of the diagram that can be computed without drawing.
pub mod diagram {
    pub use crate::render::{
        advection_rows, barb_shape, hodograph_segments, indices_rows, BarbShape, HodographSegment,
        SkewTransform, HODOGRAPH_BANDS_KM,
    };
}

pub use crate::render::format_value;

//
// Internal use only
//

// Modules
mod advection;
mod analysis;
mod batch;
mod config;
mod error;
mod geocode;
mod geojson;
mod indexes;
mod interpolation;
mod keys;
mod layers;
mod levels;
mod parcel;
mod parcel_profile;
mod render;
mod sounding;
mod wind;

#[cfg(test)]
mod test_data;

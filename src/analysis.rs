//! Data type and methods for building and describing an analysis.
//!
//! Every value is computed once when the analysis is created. A computation that fails leaves its
//! value undefined and is logged, it never stops the rest of the analysis.
use crate::{
    advection::{band_advection, temperature_advection, BandAdvection, LayerAdvection},
    error::Result,
    indexes::{cross_totals, k_index, lifted_index, precipitable_water, total_totals, vertical_totals},
    keys::{CoriolisConvention, CrossingPolicy},
    layers::layer_agl,
    levels::{convective_condensation_level, freezing_level, ConvectiveCondensation},
    parcel::{mixed_layer_parcel, most_unstable_parcel, surface_parcel, Parcel},
    parcel_profile::{lift_parcel, DerivedLevel, LiftOptions, ParcelAscentAnalysis},
    sounding::Sounding,
    wind::{bunkers_storm_motion, sr_helicity, StormMotion},
};
use log::debug;
use metfor::{IntHelicityM2pS2, JpKg, Meters, Mm};
use serde::Deserialize;

/// Settings for the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Which upward crossing to use as the level of free convection.
    pub lfc_policy: CrossingPolicy,
    /// Which downward crossing to use as the equilibrium level.
    pub el_policy: CrossingPolicy,
    /// Which intersection of the mixing ratio line and temperature is the CCL.
    pub ccl_policy: CrossingPolicy,
    /// Sign convention for the Coriolis parameter in the advection estimate.
    pub coriolis: CoriolisConvention,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        let lift = LiftOptions::default();
        AnalysisOptions {
            lfc_policy: lift.lfc_policy,
            el_policy: lift.el_policy,
            ccl_policy: CrossingPolicy::Bottom,
            coriolis: CoriolisConvention::Signed,
        }
    }
}

impl AnalysisOptions {
    /// The options for lifting parcels.
    pub fn lift_options(&self) -> LiftOptions {
        LiftOptions {
            lfc_policy: self.lfc_policy,
            el_policy: self.el_policy,
        }
    }
}

/// Stability indices for a sounding. Any of them may be undefined.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InstabilityIndices {
    /// Surface based CAPE.
    pub cape: Option<JpKg>,
    /// Surface based CIN.
    pub cin: Option<JpKg>,
    /// Lifted index of the surface parcel.
    pub lifted_index: Option<f64>,
    /// Vertical totals.
    pub vertical_totals: Option<f64>,
    /// Cross totals.
    pub cross_totals: Option<f64>,
    /// Total totals.
    pub total_totals: Option<f64>,
    /// K-index.
    pub k_index: Option<f64>,
    /// 0-1 km storm relative helicity.
    pub srh_1km: Option<IntHelicityM2pS2>,
    /// 0-3 km storm relative helicity.
    pub srh_3km: Option<IntHelicityM2pS2>,
    /// 0-6 km storm relative helicity.
    pub srh_6km: Option<IntHelicityM2pS2>,
    /// Precipitable water.
    pub precipitable_water: Option<Mm>,
    /// Height of the freezing level.
    pub freezing_level: Option<Meters>,
    /// Mixed layer CAPE.
    pub ml_cape: Option<JpKg>,
    /// Most unstable CAPE.
    pub mu_cape: Option<JpKg>,
}

/// Convenient package for everything derived from one sounding.
#[derive(Debug, Clone)]
pub struct Analysis {
    // Sounding used to make the analysis
    sounding: Sounding,

    // Parcel analysis
    surface: Option<ParcelAscentAnalysis>,
    mixed_layer: Option<ParcelAscentAnalysis>,
    most_unstable: Option<ParcelAscentAnalysis>,

    ccl: Option<ConvectiveCondensation>,
    freezing_level: Option<DerivedLevel>,
    storm_motion: Option<StormMotion>,
    indices: InstabilityIndices,

    advection: Vec<LayerAdvection>,
    advection_bands: Vec<BandAdvection>,
}

// Unwrap a result, logging why it is missing.
fn logged<T>(what: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(val) => Some(val),
        Err(err) => {
            debug!("{} is undefined: {}", what, err);
            None
        }
    }
}

impl Analysis {
    /// Analyze a sounding.
    pub fn new(snd: Sounding, options: &AnalysisOptions) -> Self {
        debug!(
            "analyzing {}",
            snd.source_description().unwrap_or("unnamed sounding")
        );
        let lift_options = options.lift_options();
        let lift = |what: &str, parcel: Result<Parcel>| -> Option<ParcelAscentAnalysis> {
            logged(what, parcel.and_then(|pcl| lift_parcel(pcl, &snd, &lift_options)))
        };

        let surface = lift("surface parcel", surface_parcel(&snd));
        let mixed_layer = lift("mixed layer parcel", mixed_layer_parcel(&snd));
        let most_unstable = lift("most unstable parcel", most_unstable_parcel(&snd));

        let ccl = logged(
            "convective condensation level",
            convective_condensation_level(&snd, options.ccl_policy),
        )
        .flatten();
        let freezing = logged("freezing level", freezing_level(&snd)).flatten();
        let storm_motion = logged("storm motion", bunkers_storm_motion(&snd));

        let latitude = snd.station_info().latitude().unwrap_or(0.0);
        let srh = |depth: f64| -> Option<IntHelicityM2pS2> {
            let motion = storm_motion?.for_latitude(latitude);
            logged(
                "storm relative helicity",
                layer_agl(&snd, Meters(depth)).and_then(|lyr| sr_helicity(&lyr, motion, &snd)),
            )
        };

        let indices = InstabilityIndices {
            cape: surface.as_ref().map(|anal| anal.cape()),
            cin: surface.as_ref().map(|anal| anal.cin()),
            lifted_index: logged(
                "lifted index",
                surface_parcel(&snd).and_then(|pcl| lifted_index(&snd, &pcl)),
            ),
            vertical_totals: logged("vertical totals", vertical_totals(&snd)),
            cross_totals: logged("cross totals", cross_totals(&snd)),
            total_totals: logged("total totals", total_totals(&snd)),
            k_index: logged("k-index", k_index(&snd)),
            srh_1km: srh(1000.0),
            srh_3km: srh(3000.0),
            srh_6km: srh(6000.0),
            precipitable_water: logged("precipitable water", precipitable_water(&snd)),
            freezing_level: freezing.and_then(|lvl| lvl.height.into_option()),
            ml_cape: mixed_layer.as_ref().map(|anal| anal.cape()),
            mu_cape: most_unstable.as_ref().map(|anal| anal.cape()),
        };

        let advection = logged(
            "temperature advection",
            temperature_advection(&snd, options.coriolis),
        )
        .unwrap_or_default();
        let advection_bands = band_advection(&advection);

        Analysis {
            sounding: snd,
            surface,
            mixed_layer,
            most_unstable,
            ccl,
            freezing_level: freezing,
            storm_motion,
            indices,
            advection,
            advection_bands,
        }
    }

    /// Get a reference to the sounding.
    pub fn sounding(&self) -> &Sounding {
        &self.sounding
    }

    /// Get the surface parcel analysis
    pub fn surface_parcel_analysis(&self) -> Option<&ParcelAscentAnalysis> {
        self.surface.as_ref()
    }

    /// Get the mixed layer parcel analysis
    pub fn mixed_layer_parcel_analysis(&self) -> Option<&ParcelAscentAnalysis> {
        self.mixed_layer.as_ref()
    }

    /// Get the most unstable parcel analysis
    pub fn most_unstable_parcel_analysis(&self) -> Option<&ParcelAscentAnalysis> {
        self.most_unstable.as_ref()
    }

    /// The convective condensation level.
    pub fn ccl(&self) -> Option<ConvectiveCondensation> {
        self.ccl
    }

    /// The lowest freezing level.
    pub fn freezing_level(&self) -> Option<DerivedLevel> {
        self.freezing_level
    }

    /// Bunkers storm motions.
    pub fn storm_motion(&self) -> Option<StormMotion> {
        self.storm_motion
    }

    /// Stability indices.
    pub fn indices(&self) -> &InstabilityIndices {
        &self.indices
    }

    /// Temperature advection between each pair of levels.
    pub fn advection(&self) -> &[LayerAdvection] {
        &self.advection
    }

    /// Temperature advection averaged in 100 hPa bands.
    pub fn advection_bands(&self) -> &[BandAdvection] {
        &self.advection_bands
    }
}

//! Create and analyze a profile from lifting a parcel.
use crate::{
    error::Result,
    keys::CrossingPolicy,
    parcel::Parcel,
    sounding::Sounding,
};
use metfor::{Celsius, HectoPascal, JpKg, Meters, Quantity};
use optional::Optioned;

mod lift;

pub use self::lift::AscentCurve;

/// Parcel temperature at every level of the sounding it was lifted through.
///
/// This is parallel to the sounding profiles. Levels below the starting pressure of the parcel, or
/// with missing pressure, are missing.
#[derive(Debug, Clone, PartialEq)]
pub struct ParcelPath {
    /// Pressure profile, a copy of the sounding's.
    pub pressure: Vec<Optioned<HectoPascal>>,
    /// Parcel temperature profile.
    pub temperature: Vec<Optioned<Celsius>>,
}

/// Hold profiles for a parcel and its environment.
///
/// The levels are the parcel's starting level, every sounding level above it, the LCL, and every
/// level where the parcel and environment temperatures cross. Between two consecutive levels the
/// parcel is either everywhere warmer or everywhere cooler than its environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParcelProfile {
    /// Pressure profile
    pub pressure: Vec<HectoPascal>,
    /// Height profile, missing where the pressure is outside the sounding.
    pub height: Vec<Optioned<Meters>>,
    /// Parcel temperature profile
    pub parcel_t: Vec<Celsius>,
    /// Environment temperature profile
    pub environment_t: Vec<Celsius>,
}

impl ParcelProfile {
    /// Number of levels.
    #[inline]
    pub fn len(&self) -> usize {
        self.pressure.len()
    }

    /// True if there are no levels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pressure.is_empty()
    }

    /// The levels with pressure between `bottom` and `top`, inclusive.
    pub fn slice(&self, bottom: HectoPascal, top: HectoPascal) -> ParcelProfile {
        let mut result = ParcelProfile::default();

        for i in 0..self.pressure.len() {
            let p = self.pressure[i];
            if p <= bottom && p >= top {
                result.pressure.push(p);
                result.height.push(self.height[i]);
                result.parcel_t.push(self.parcel_t[i]);
                result.environment_t.push(self.environment_t[i]);
            }
        }

        result
    }
}

/// A characteristic level of a sounding, like the LCL or the EL.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedLevel {
    /// Pressure of the level.
    pub pressure: HectoPascal,
    /// Temperature at the level.
    pub temperature: Celsius,
    /// Height of the level, missing if the pressure is outside the sounding.
    pub height: Optioned<Meters>,
}

/// Options for lifting a parcel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiftOptions {
    /// Which upward crossing to use as the level of free convection.
    pub lfc_policy: CrossingPolicy,
    /// Which downward crossing to use as the equilibrium level.
    pub el_policy: CrossingPolicy,
}

impl Default for LiftOptions {
    fn default() -> Self {
        LiftOptions {
            lfc_policy: CrossingPolicy::Bottom,
            el_policy: CrossingPolicy::Top,
        }
    }
}

/// Parcel analysis, this is a way to package the analysis of a parcel.
#[derive(Debug, Clone)]
pub struct ParcelAscentAnalysis {
    // The orginal parcel, its path through the sounding and the analysis curve
    parcel: Parcel,
    path: ParcelPath,
    profile: ParcelProfile,

    cape: JpKg,
    cin: JpKg,
    lcl: DerivedLevel,
    lfc: Option<DerivedLevel>,
    el: Option<DerivedLevel>,
}

impl ParcelAscentAnalysis {
    /// Get the CAPE, zero if there is no level of free convection.
    pub fn cape(&self) -> JpKg {
        self.cape
    }

    /// Get the CIN, zero if there is no level of free convection.
    pub fn cin(&self) -> JpKg {
        self.cin
    }

    /// Get the lifting condensation level.
    pub fn lcl(&self) -> DerivedLevel {
        self.lcl
    }

    /// Get the level of free convection.
    pub fn lfc(&self) -> Option<DerivedLevel> {
        self.lfc
    }

    /// Get the equilibrium level. This is `None` if there is no LFC, or if the parcel never
    /// becomes cooler than the environment again before the top of the sounding.
    pub fn el(&self) -> Option<DerivedLevel> {
        self.el
    }

    /// Retrieve the original parcel.
    #[inline]
    pub fn parcel(&self) -> &Parcel {
        &self.parcel
    }

    /// Retrieve the parcel temperature at each sounding level.
    #[inline]
    pub fn path(&self) -> &ParcelPath {
        &self.path
    }

    /// Retrieve the parcel's analysis profile.
    #[inline]
    pub fn profile(&self) -> &ParcelProfile {
        &self.profile
    }

    /// The part of the profile that contributes to CAPE, from the LFC to the EL or the top of the
    /// data. `None` if there is no LFC.
    pub fn cape_layer(&self) -> Option<ParcelProfile> {
        let lfc = self.lfc?;
        let top = self
            .el
            .map(|el| el.pressure)
            .or_else(|| self.profile.pressure.last().cloned())?;

        Some(self.profile.slice(lfc.pressure, top))
    }

    /// The part of the profile that contributes to CIN, from the parcel level to the LFC. `None` if
    /// there is no LFC.
    pub fn cin_layer(&self) -> Option<ParcelProfile> {
        let lfc = self.lfc?;
        let bottom = *self.profile.pressure.first()?;

        Some(self.profile.slice(bottom, lfc.pressure))
    }
}

/// Lift a parcel for a convective parcel analysis.
///
/// The parcel rises dry adiabatically to its LCL and moist adiabatically above it. CAPE and CIN
/// are integrated in log pressure over the analysis profile.
pub fn lift_parcel(
    parcel: Parcel,
    snd: &Sounding,
    options: &LiftOptions,
) -> Result<ParcelAscentAnalysis> {
    lift::lift_parcel(parcel, snd, options)
}

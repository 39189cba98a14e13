//! Indexes that are specific to a sounding, but not a particular parcel analysis of that sounding.

use crate::{
    error::{AnalysisError, Result},
    interpolation::linear_interpolate_sounding,
    parcel::Parcel,
    parcel_profile::AscentCurve,
    sounding::Sounding,
};
use itertools::{izip, Itertools};
use metfor::{mixing_ratio, Celsius, HectoPascal, Mm, Quantity};

/// Precipitable water (mm)
#[inline]
pub fn precipitable_water(snd: &Sounding) -> Result<Mm> {
    let p_profile = snd.pressure_profile();
    let dp_profile = snd.dew_point_profile();

    if p_profile.is_empty() || dp_profile.is_empty() {
        return Err(AnalysisError::MissingProfile);
    }

    let integrated_mw = izip!(p_profile, dp_profile)
        // Remove levels with missing data
        .filter(|(p, dp)| p.is_some() && dp.is_some())
        // Unpack from the Optioned type
        .map(|(p, dp)| (p.unpack(), dp.unpack()))
        // Convert dew point to mixing ratio, removing failed levels.
        .filter_map(|(p, dp)| mixing_ratio(dp, p).map(|mw| (p, mw)))
        // View them as pairs for integration with the trapezoid method
        .tuple_windows::<(_, _)>()
        // Do the sum for integrating
        .fold(0.0, |mut acc_mw, ((p0, mw0), (p1, mw1))| {
            let dp = p0 - p1;
            acc_mw += (mw0 + mw1) * dp.unpack();

            acc_mw
        });

    Ok(Mm(integrated_mw / 9.81 / 997.0 * 100_000.0 / 2.0))
}

// Temperature and dew point at a mandatory level.
fn level_values(snd: &Sounding, p: HectoPascal) -> Result<(f64, f64)> {
    let row = linear_interpolate_sounding(snd, p).map_err(|_| AnalysisError::MissingValue)?;

    let Celsius(t) = row.temperature.ok_or(AnalysisError::MissingValue)?;
    let Celsius(dp) = row.dew_point.ok_or(AnalysisError::MissingValue)?;

    Ok((t, dp))
}

/// The K-index, (T850 - T500) + Td850 - (T700 - Td700).
#[inline]
pub fn k_index(snd: &Sounding) -> Result<f64> {
    let (t850, dp850) = level_values(snd, HectoPascal(850.0))?;
    let (t700, dp700) = level_values(snd, HectoPascal(700.0))?;
    let (t500, _) = level_values(snd, HectoPascal(500.0))?;

    Ok(t850 - t500 + dp850 - (t700 - dp700))
}

/// Vertical totals, T850 - T500.
#[inline]
pub fn vertical_totals(snd: &Sounding) -> Result<f64> {
    let (t850, _) = level_values(snd, HectoPascal(850.0))?;
    let (t500, _) = level_values(snd, HectoPascal(500.0))?;

    Ok(t850 - t500)
}

/// Cross totals, Td850 - T500.
#[inline]
pub fn cross_totals(snd: &Sounding) -> Result<f64> {
    let (_, dp850) = level_values(snd, HectoPascal(850.0))?;
    let (t500, _) = level_values(snd, HectoPascal(500.0))?;

    Ok(dp850 - t500)
}

/// Total totals, the vertical totals plus the cross totals.
#[inline]
pub fn total_totals(snd: &Sounding) -> Result<f64> {
    Ok(vertical_totals(snd)? + cross_totals(snd)?)
}

/// The lifted index, the environmental temperature at 500 hPa minus the temperature of a parcel
/// lifted there. Negative values are unstable.
pub fn lifted_index(snd: &Sounding, parcel: &Parcel) -> Result<f64> {
    const LEVEL: HectoPascal = HectoPascal(500.0);

    let Celsius(env_t) = linear_interpolate_sounding(snd, LEVEL)
        .map_err(|_| AnalysisError::MissingValue)?
        .temperature
        .ok_or(AnalysisError::MissingValue)?;

    let Celsius(pcl_t) = AscentCurve::new(parcel)?
        .temperature_at(LEVEL)
        .ok_or(AnalysisError::MetForError)?;

    Ok(env_t - pcl_t)
}

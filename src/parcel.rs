//! Functions for doing parcel analysis on a sounding, specifically related to convection.
//!
use crate::{
    error::{AnalysisError, Result},
    sounding::{DataRow, Sounding},
};
use itertools::izip;
use metfor::{self, Celsius, HectoPascal, Kelvin, Quantity};

/// Variables defining a parcel as used in parcel analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parcel {
    /// Temperature in C
    pub temperature: Celsius,
    /// Pressure in hPa
    pub pressure: HectoPascal,
    /// Dew point in C
    pub dew_point: Celsius,
}

impl Parcel {
    /// Get the potential temperatures of the parcel
    pub fn theta(&self) -> Kelvin {
        metfor::potential_temperature(self.pressure, self.temperature)
    }

    /// Get the equivalent potential temperature of the parcel
    pub fn theta_e(&self) -> Result<Kelvin> {
        metfor::equiv_pot_temperature(self.temperature, self.dew_point, self.pressure)
            .ok_or(AnalysisError::MetForError)
    }

    /// Get the mixing ratio of the parcel.
    pub fn mixing_ratio(&self) -> Result<f64> {
        metfor::mixing_ratio(self.dew_point, self.pressure).ok_or(AnalysisError::MetForError)
    }

    /// Try to convert a `DataRow` to a `Parcel`.
    pub fn from_datarow(dr: DataRow) -> Option<Self> {
        let temperature = dr.temperature.into_option()?;
        let pressure = dr.pressure.into_option()?;
        let dew_point = dr.dew_point.into_option()?;

        Some(Parcel {
            temperature,
            pressure,
            dew_point,
        })
    }
}

/// Get a surface parcel.
///
/// This is the lowest level of the sounding with pressure, temperature and dew point all present.
pub fn surface_parcel(snd: &Sounding) -> Result<Parcel> {
    if snd.temperature_profile().is_empty() || snd.dew_point_profile().is_empty() {
        return Err(AnalysisError::MissingProfile);
    }

    snd.bottom_up()
        .filter_map(Parcel::from_datarow)
        .next()
        .ok_or(AnalysisError::NoDataProfile)
}

/// Create a mixed layer parcel.
///
/// Potential temperature and mixing ratio are averaged over the lowest 100 hPa of the sounding,
/// then the parcel is brought back down to the surface pressure.
pub fn mixed_layer_parcel(snd: &Sounding) -> Result<Parcel> {
    let press = snd.pressure_profile();
    let t = snd.temperature_profile();
    let dp = snd.dew_point_profile();

    if press.is_empty() || t.is_empty() || dp.is_empty() {
        return Err(AnalysisError::MissingProfile);
    }

    let bottom_p = surface_parcel(snd)?.pressure;
    let top_p = bottom_p - HectoPascal(100.0);

    let (sum_theta, sum_mw, count) = izip!(press, t, dp)
        .filter(|(p, t, dp)| p.is_some() && t.is_some() && dp.is_some())
        .map(|(p, t, dp)| (p.unpack(), t.unpack(), dp.unpack()))
        .skip_while(|&(p, _, _)| p > bottom_p)
        .take_while(|&(p, _, _)| p >= top_p)
        .filter_map(|(p, t, dp)| {
            metfor::mixing_ratio(dp, p).map(|mw| (metfor::potential_temperature(p, t).unpack(), mw))
        })
        .fold((0.0, 0.0, 0.0), |(sum_theta, sum_mw, count), (theta, mw)| {
            (sum_theta + theta, sum_mw + mw, count + 1.0)
        });

    if count == 0.0 {
        return Err(AnalysisError::NotEnoughData);
    }

    let theta = Kelvin(sum_theta / count);
    let mw = sum_mw / count;

    let temperature = Celsius::from(metfor::temperature_from_pot_temp(theta, bottom_p));
    let dew_point =
        metfor::dew_point_from_p_and_mw(bottom_p, mw).ok_or(AnalysisError::MetForError)?;
    // Supersaturation can creep in from averaging, clamp it.
    let dew_point = if dew_point > temperature {
        temperature
    } else {
        dew_point
    };

    Ok(Parcel {
        temperature,
        pressure: bottom_p,
        dew_point,
    })
}

/// Get the most unstable parcel.
///
/// This is defined as the parcel in the lowest 300 hPa of the sounding with the highest equivalent
/// potential temperature.
pub fn most_unstable_parcel(snd: &Sounding) -> Result<Parcel> {
    let bottom_p = surface_parcel(snd)?.pressure;
    let top_p = bottom_p - HectoPascal(300.0);

    snd.bottom_up()
        .filter_map(Parcel::from_datarow)
        .take_while(|pcl| pcl.pressure >= top_p)
        .filter_map(|pcl| pcl.theta_e().ok().map(|theta_e| (pcl, theta_e)))
        .fold(None, |max: Option<(Parcel, Kelvin)>, (pcl, theta_e)| match max {
            Some((_, max_theta_e)) if max_theta_e >= theta_e => max,
            _ => Some((pcl, theta_e)),
        })
        .map(|(pcl, _)| pcl)
        .ok_or(AnalysisError::NotEnoughData)
}

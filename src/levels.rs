//! This module finds significant levels that are not tied to lifting a parcel, such as the
//! freezing level and the convective condensation level.
use crate::{
    error::{AnalysisError, Result},
    interpolation::{
        height_to_pressure, linear_interp, linear_interpolate_sounding, pressure_to_height,
    },
    keys::CrossingPolicy,
    parcel::surface_parcel,
    parcel_profile::DerivedLevel,
    sounding::{DataRow, Sounding},
};
use itertools::{izip, Itertools};
use metfor::{self, Celsius, HectoPascal, Meters, Quantity, FREEZING};
use optional::Optioned;

/// Interpolate the whole sounding to a geopotential height.
pub fn height_level(tgt_height: Meters, snd: &Sounding) -> Result<DataRow> {
    if snd.height_profile().is_empty() || snd.pressure_profile().is_empty() {
        return Err(AnalysisError::MissingProfile);
    }

    let tgt_p = height_to_pressure(snd, tgt_height)
        .into_option()
        .ok_or(AnalysisError::InterpolationError)?;

    linear_interpolate_sounding(snd, tgt_p)
}

/// Find the lowest level where the temperature crosses 0C.
///
/// The height and pressure are interpolated linearly in temperature between the two levels on
/// either side of the crossing. Returns `None` if the profile never crosses freezing.
pub fn freezing_level(snd: &Sounding) -> Result<Option<DerivedLevel>> {
    let p_profile = snd.pressure_profile();
    let t_profile = snd.temperature_profile();
    let h_profile = snd.height_profile();

    if t_profile.is_empty() || p_profile.is_empty() {
        return Err(AnalysisError::MissingProfile);
    }

    let level = izip!(p_profile, t_profile)
        .enumerate()
        .filter(|(_, (p, t))| p.is_some() && t.is_some())
        .map(|(i, (p, t))| (i, p.unpack(), t.unpack()))
        .tuple_windows::<(_, _)>()
        .find(|&((_, _, t0), (_, _, t1))| {
            (t0 > FREEZING && t1 <= FREEZING) || (t0 <= FREEZING && t1 > FREEZING)
        })
        .map(|((i0, p0, t0), (i1, p1, t1))| {
            let pressure = linear_interp(FREEZING, t0, t1, p0, p1);

            let height: Optioned<Meters> = h_profile
                .get(i0)
                .and_then(|h0| h0.into_option())
                .and_then(|h0| {
                    h_profile
                        .get(i1)
                        .and_then(|h1| h1.into_option())
                        .map(|h1| linear_interp(FREEZING, t0, t1, h0, h1))
                })
                .into();

            DerivedLevel {
                pressure,
                temperature: FREEZING,
                height,
            }
        });

    Ok(level)
}

/// The convective condensation level and the surface temperature needed to reach it by dry
/// convection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvectiveCondensation {
    /// Where the surface mixing ratio line meets the environmental temperature.
    pub level: DerivedLevel,
    /// Temperature of the CCL brought dry adiabatically down to the surface pressure.
    pub convective_temperature: Celsius,
}

/// Find the convective condensation level.
///
/// This is where the line of constant mixing ratio through the surface dew point intersects the
/// environmental temperature profile. When there is more than one intersection, `policy` picks
/// which one to use. Returns `None` if they never intersect.
pub fn convective_condensation_level(
    snd: &Sounding,
    policy: CrossingPolicy,
) -> Result<Option<ConvectiveCondensation>> {
    let sfc = surface_parcel(snd)?;
    let mw = sfc.mixing_ratio()?;

    // Temperature minus the mixing ratio line's dew point at every level.
    let depressions: Vec<(HectoPascal, Celsius, f64)> =
        izip!(snd.pressure_profile(), snd.temperature_profile())
            .filter(|(p, t)| p.is_some() && t.is_some())
            .map(|(p, t)| (p.unpack(), t.unpack()))
            .filter(|(p, _)| *p <= sfc.pressure)
            .filter_map(|(p, t)| {
                metfor::dew_point_from_p_and_mw(p, mw).map(|dp| (p, t, (t - dp).unpack()))
            })
            .collect();

    let mut crossings: Vec<(HectoPascal, Celsius)> = vec![];
    // A saturated surface is its own CCL, allow for round off in the mixing ratio conversions.
    if let Some(&(p, t, d)) = depressions.first() {
        if d <= 1.0e-3 {
            crossings.push((p, t));
        }
    }

    crossings.extend(
        depressions
            .iter()
            .tuple_windows::<(_, _)>()
            .filter(|((_, _, d0), (_, _, d1))| *d0 > 0.0 && *d1 <= 0.0)
            .map(|(&(p0, t0, d0), &(p1, t1, d1))| {
                let frac = d0 / (d0 - d1);
                let p = HectoPascal(p0.unpack() + frac * (p1 - p0).unpack());
                let t = Celsius(t0.unpack() + frac * (t1 - t0).unpack());
                (p, t)
            }),
    );

    let crossing = match policy {
        CrossingPolicy::Bottom => crossings.first(),
        CrossingPolicy::Top => crossings.last(),
    };

    let result = crossing.map(|&(pressure, temperature)| {
        let theta = metfor::potential_temperature(pressure, temperature);
        let convective_temperature =
            Celsius::from(metfor::temperature_from_pot_temp(theta, sfc.pressure));

        ConvectiveCondensation {
            level: DerivedLevel {
                pressure,
                temperature,
                height: pressure_to_height(snd, pressure),
            },
            convective_temperature,
        }
    });

    Ok(result)
}

//! Temperature advection estimated from the turning of the wind with height.
//!
//! In geostrophic balance the thermal wind relates the veering or backing of the wind through a
//! layer to the horizontal temperature gradient, and so to the temperature advection. Veering with
//! height is warm advection in the northern hemisphere, backing is cold advection.
use crate::{
    error::{AnalysisError, Result},
    keys::CoriolisConvention,
    sounding::Sounding,
};
use itertools::{izip, Itertools};
use metfor::{Celsius, HectoPascal, Kelvin, Knots, Meters, MetersPSec, Quantity, WindSpdDir, WindUV};
use optional::Optioned;
use std::f64::consts::PI;


/// Earth's angular velocity, one revolution per sidereal day.
const OMEGA: f64 = 2.0 * PI / 86164.0;

const GRAVITY: f64 = 9.81;

/// Temperature advection through one layer between consecutive sounding levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerAdvection {
    /// Pressure at the bottom of the layer.
    pub bottom: HectoPascal,
    /// Pressure at the top of the layer.
    pub top: HectoPascal,
    /// Advection in °C per hour, `None` if a value needed for the layer is missing.
    pub advection: Option<f64>,
}

impl LayerAdvection {
    /// Pressure halfway through the layer.
    #[inline]
    pub fn mid_pressure(&self) -> HectoPascal {
        HectoPascal((self.bottom.unpack() + self.top.unpack()) / 2.0)
    }
}

/// Mean temperature advection of the layers in a 100 hPa pressure band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandAdvection {
    /// Pressure at the bottom of the band.
    pub bottom: HectoPascal,
    /// Pressure at the top of the band.
    pub top: HectoPascal,
    /// Mean advection in °C per hour, `None` if no layer in the band has a value.
    pub advection: Option<f64>,
}

/// The signed change in direction from `bottom_deg` to `top_deg`, in (-180, 180].
///
/// # Examples
///
/// ```rust
/// use skewt_analysis::normalize_direction_difference;
///
/// assert_eq!(normalize_direction_difference(350.0, 10.0), 20.0);
/// assert_eq!(normalize_direction_difference(10.0, 350.0), -20.0);
/// ```
#[inline]
pub fn normalize_direction_difference(bottom_deg: f64, top_deg: f64) -> f64 {
    let diff = (top_deg - bottom_deg).rem_euclid(360.0);
    if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}

/// The Coriolis parameter in s⁻¹.
#[inline]
pub fn coriolis_parameter(latitude: f64, convention: CoriolisConvention) -> f64 {
    let f = 2.0 * OMEGA * latitude.to_radians().sin();
    match convention {
        CoriolisConvention::Signed => f,
        CoriolisConvention::Absolute => f.abs(),
    }
}

// Wind components in m/s, the inverse of the conversion used when winds are read.
fn uv_ms(wind: WindSpdDir<Knots>) -> (f64, f64) {
    let WindUV { u, v } = WindUV::<MetersPSec>::from(wind);
    (u.unpack(), v.unpack())
}

fn layer_advection(
    (t0, w0, h0): (Celsius, WindSpdDir<Knots>, Meters),
    (t1, w1, h1): (Celsius, WindSpdDir<Knots>, Meters),
    f: f64,
) -> Option<f64> {
    let dz = (h1 - h0).unpack();
    if dz <= 0.0 {
        return None;
    }

    let (u0, v0) = uv_ms(w0);
    let (u1, v1) = uv_ms(w1);

    let mean_u = (u0 + u1) / 2.0;
    let mean_v = (v0 + v1) / 2.0;
    let speed_sq = mean_u * mean_u + mean_v * mean_v;

    let mean_t = (Kelvin::from(t0).unpack() + Kelvin::from(t1).unpack()) / 2.0;

    // Math convention angles, counterclockwise from east.
    let dir0 = v0.atan2(u0).to_degrees();
    let dir1 = v1.atan2(u1).to_degrees();
    let d_theta = normalize_direction_difference(dir0, dir1).to_radians();

    Some(-(f / GRAVITY) * speed_sq * mean_t * (d_theta / dz) * 3600.0)
}

/// Temperature advection for every pair of consecutive sounding levels.
///
/// Needs the station latitude for the Coriolis parameter.
pub fn temperature_advection(
    snd: &Sounding,
    convention: CoriolisConvention,
) -> Result<Vec<LayerAdvection>> {
    let latitude = snd
        .station_info()
        .latitude()
        .ok_or(AnalysisError::MissingValue)?;
    let f = coriolis_parameter(latitude, convention);

    let pressure = snd.pressure_profile();
    let temperature = snd.temperature_profile();
    let wind = snd.wind_profile();
    let height = snd.height_profile();

    if temperature.is_empty() || wind.is_empty() || height.is_empty() {
        return Err(AnalysisError::MissingProfile);
    }

    // Values needed at a level, if they are all there.
    let level = |t: &Optioned<Celsius>, w: &Optioned<WindSpdDir<Knots>>, h: &Optioned<Meters>| {
        if t.is_some() && w.is_some() && h.is_some() {
            Some((t.unpack(), w.unpack(), h.unpack()))
        } else {
            None
        }
    };

    let layers = izip!(pressure, temperature, wind, height)
        .filter(|(p, _, _, _)| p.is_some())
        .map(|(p, t, w, h)| (p.unpack(), level(t, w, h)))
        .tuple_windows::<(_, _)>()
        .map(|((p0, lvl0), (p1, lvl1))| LayerAdvection {
            bottom: p0,
            top: p1,
            advection: lvl0
                .and_then(|lvl0| lvl1.map(|lvl1| (lvl0, lvl1)))
                .and_then(|(lvl0, lvl1)| layer_advection(lvl0, lvl1, f)),
        })
        .collect();

    Ok(layers)
}

/// Average layer advection into 100 hPa bands from 1000 hPa to 100 hPa.
///
/// A layer belongs to the band containing its mid-point pressure.
pub fn band_advection(layers: &[LayerAdvection]) -> Vec<BandAdvection> {
    (0..9)
        .map(|i| {
            let bottom = HectoPascal(1000.0 - 100.0 * i as f64);
            let top = HectoPascal(900.0 - 100.0 * i as f64);

            let (sum, count) = layers
                .iter()
                .filter(|lyr| {
                    let mid = lyr.mid_pressure();
                    mid <= bottom && mid > top
                })
                .filter_map(|lyr| lyr.advection)
                .fold((0.0, 0usize), |(sum, count), adv| (sum + adv, count + 1));

            BandAdvection {
                bottom,
                top,
                advection: if count > 0 {
                    Some(sum / count as f64)
                } else {
                    None
                },
            }
        })
        .collect()
}

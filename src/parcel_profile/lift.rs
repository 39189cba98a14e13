use super::{DerivedLevel, LiftOptions, ParcelAscentAnalysis, ParcelPath, ParcelProfile};
use crate::{
    error::{AnalysisError, Result},
    interpolation::{linear_interpolate, pressure_to_height},
    keys::CrossingPolicy,
    parcel::Parcel,
    sounding::Sounding,
};
use itertools::{izip, Itertools};
use metfor::{self, Celsius, HectoPascal, JpKg, Kelvin, Quantity};

/// Dry air gas constant, J kg⁻¹ K⁻¹.
const RD: f64 = 287.04749;

/// The temperature of a lifted parcel as a function of pressure.
///
/// Below the LCL the parcel keeps its potential temperature, above it the parcel follows the
/// saturated adiabat with the parcel's equivalent potential temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AscentCurve {
    theta: Kelvin,
    theta_e: Kelvin,
    lcl_pressure: HectoPascal,
}

impl AscentCurve {
    /// Build the ascent curve for a parcel.
    pub fn new(parcel: &Parcel) -> Result<Self> {
        let (lcl_pressure, _) = metfor::pressure_and_temperature_at_lcl(
            parcel.temperature,
            parcel.dew_point,
            parcel.pressure,
        )
        .ok_or(AnalysisError::MetForError)?;

        Ok(AscentCurve {
            theta: parcel.theta(),
            theta_e: parcel.theta_e()?,
            lcl_pressure,
        })
    }

    /// Pressure at the lifting condensation level.
    #[inline]
    pub fn lcl_pressure(&self) -> HectoPascal {
        self.lcl_pressure
    }

    /// The parcel temperature at a pressure level.
    pub fn temperature_at(&self, tgt_pres: HectoPascal) -> Option<Celsius> {
        if tgt_pres >= self.lcl_pressure {
            Some(Celsius::from(metfor::temperature_from_pot_temp(
                self.theta, tgt_pres,
            )))
        } else {
            // Too cold for the saturated solver, the vapor left is negligible so θe acts as θ.
            metfor::temperature_from_equiv_pot_temp_saturated_and_pressure(tgt_pres, self.theta_e)
                .map(Celsius::from)
                .or_else(|| {
                    Some(Celsius::from(metfor::temperature_from_pot_temp(
                        self.theta_e,
                        tgt_pres,
                    )))
                })
        }
    }
}

// A level in the analysis
#[derive(Clone, Copy, Debug)]
struct AnalLevel {
    pressure: HectoPascal,
    pcl_t: Celsius,
    env_t: Celsius,
}

impl AnalLevel {
    #[inline]
    fn buoyancy(&self) -> f64 {
        (self.pcl_t - self.env_t).unpack()
    }

    // Interpolate between two levels in log pressure to where the buoyancy is zero.
    fn crossing(&self, other: &AnalLevel) -> AnalLevel {
        let (d0, d1) = (self.buoyancy(), other.buoyancy());
        let frac = d0 / (d0 - d1);

        let ln_p = self.pressure.unpack().ln()
            + frac * (other.pressure.unpack().ln() - self.pressure.unpack().ln());
        let t = self.env_t.unpack() + frac * (other.env_t - self.env_t).unpack();

        AnalLevel {
            pressure: HectoPascal(ln_p.exp()),
            pcl_t: Celsius(t),
            env_t: Celsius(t),
        }
    }
}

pub(super) fn lift_parcel(
    parcel: Parcel,
    snd: &Sounding,
    options: &LiftOptions,
) -> Result<ParcelAscentAnalysis> {
    let curve = AscentCurve::new(&parcel)?;

    let snd_pressure = snd.pressure_profile();
    let env_t = snd.temperature_profile();
    if env_t.is_empty() {
        return Err(AnalysisError::MissingProfile);
    }

    let p0 = parcel.pressure;
    let path = ParcelPath {
        pressure: snd_pressure.to_vec(),
        temperature: snd_pressure
            .iter()
            .map(|p| {
                p.into_option()
                    .filter(|p| *p <= p0)
                    .and_then(|p| curve.temperature_at(p))
                    .into()
            })
            .collect(),
    };

    //
    // The levels of the sounding above the parcel, with the parcel's start and the LCL.
    //
    let env_t0 = linear_interpolate(snd_pressure, env_t, p0).unwrap_or(parcel.temperature);
    let mut levels: Vec<AnalLevel> = vec![AnalLevel {
        pressure: p0,
        pcl_t: parcel.temperature,
        env_t: env_t0,
    }];

    levels.extend(
        izip!(snd_pressure, env_t, &path.temperature)
            .filter(|(p, t, pt)| p.is_some() && t.is_some() && pt.is_some())
            .map(|(p, t, pt)| AnalLevel {
                pressure: p.unpack(),
                pcl_t: pt.unpack(),
                env_t: t.unpack(),
            })
            .filter(|lvl| lvl.pressure < p0),
    );

    let lcl = lcl_level(&curve, &levels)?;
    if let Some(lcl) = lcl {
        let idx = levels
            .iter()
            .position(|lvl| lvl.pressure <= lcl.pressure)
            .unwrap_or_else(|| levels.len());
        if levels
            .get(idx)
            .map(|lvl| lvl.pressure != lcl.pressure)
            .unwrap_or(true)
        {
            levels.insert(idx, lcl);
        }
    }

    //
    // Insert the crossings so every segment has one sign, remember which way they go.
    //
    let mut analysis_levels: Vec<AnalLevel> = Vec::with_capacity(levels.len() + 6);
    let mut upward: Vec<AnalLevel> = vec![];
    let mut downward: Vec<AnalLevel> = vec![];

    if let Some(first) = levels.first() {
        analysis_levels.push(*first);
    }

    for (lvl0, lvl1) in levels.iter().tuple_windows::<(_, _)>() {
        let (d0, d1) = (lvl0.buoyancy(), lvl1.buoyancy());

        let rising = d0 <= 0.0 && d1 > 0.0;
        let sinking = d0 > 0.0 && d1 <= 0.0;

        if rising || sinking {
            let crossing = if d0 == 0.0 {
                *lvl0
            } else if d1 == 0.0 {
                *lvl1
            } else {
                let crossing = lvl0.crossing(lvl1);
                analysis_levels.push(crossing);
                crossing
            };

            if rising {
                upward.push(crossing);
            } else {
                downward.push(crossing);
            }
        }

        analysis_levels.push(*lvl1);
    }

    //
    // Characteristic levels.
    //
    let lcl_pressure = curve.lcl_pressure();
    let lcl_temperature = curve.temperature_at(lcl_pressure).unwrap_or(parcel.dew_point);

    let mut lfc_candidates: Vec<AnalLevel> = vec![];
    if let Some(lcl) = analysis_levels
        .iter()
        .find(|lvl| lvl.pressure == lcl_pressure)
    {
        if lcl.buoyancy() > 0.0 {
            lfc_candidates.push(*lcl);
        }
    }
    let lcl_candidate = lfc_candidates.first().map(|lvl| lvl.pressure);
    lfc_candidates.extend(
        upward
            .iter()
            .filter(|lvl| lvl.pressure <= lcl_pressure)
            .filter(|lvl| Some(lvl.pressure) != lcl_candidate)
            .cloned(),
    );

    let lfc = select(&lfc_candidates, options.lfc_policy);

    let el = lfc.and_then(|lfc| {
        let el_candidates: Vec<AnalLevel> = downward
            .iter()
            .filter(|lvl| lvl.pressure < lfc.pressure)
            .cloned()
            .collect();
        select(&el_candidates, options.el_policy)
    });

    //
    // Integrate
    //
    let (cape, cin) = match lfc {
        Some(lfc) => {
            let top = el
                .map(|el| el.pressure)
                .or_else(|| analysis_levels.last().map(|lvl| lvl.pressure))
                .ok_or(AnalysisError::NotEnoughData)?;
            (
                integrate(&analysis_levels, lfc.pressure, top, |area| area > 0.0),
                integrate(&analysis_levels, p0, lfc.pressure, |area| area < 0.0),
            )
        }
        None => (JpKg(0.0), JpKg(0.0)),
    };

    let to_derived = |lvl: AnalLevel| DerivedLevel {
        pressure: lvl.pressure,
        temperature: lvl.pcl_t,
        height: pressure_to_height(snd, lvl.pressure),
    };

    let profile = ParcelProfile {
        height: analysis_levels
            .iter()
            .map(|lvl| pressure_to_height(snd, lvl.pressure))
            .collect(),
        pressure: analysis_levels.iter().map(|lvl| lvl.pressure).collect(),
        parcel_t: analysis_levels.iter().map(|lvl| lvl.pcl_t).collect(),
        environment_t: analysis_levels.iter().map(|lvl| lvl.env_t).collect(),
    };

    Ok(ParcelAscentAnalysis {
        parcel,
        path,
        profile,
        cape,
        cin,
        lcl: DerivedLevel {
            pressure: lcl_pressure,
            temperature: lcl_temperature,
            height: pressure_to_height(snd, lcl_pressure),
        },
        lfc: lfc.map(to_derived),
        el: el.map(to_derived),
    })
}

// The LCL as an analysis level, or None if it is outside the levels (above the top of the data,
// or at the parcel level).
fn lcl_level(curve: &AscentCurve, levels: &[AnalLevel]) -> Result<Option<AnalLevel>> {
    let lcl_p = curve.lcl_pressure();

    let bracket = levels
        .iter()
        .tuple_windows::<(_, _)>()
        .find(|(lvl0, lvl1)| lvl0.pressure >= lcl_p && lvl1.pressure <= lcl_p);

    let (lvl0, lvl1) = match bracket {
        Some(bracket) => bracket,
        None => return Ok(None),
    };

    let pcl_t = curve
        .temperature_at(lcl_p)
        .ok_or(AnalysisError::MetForError)?;

    let frac = (lcl_p.unpack().ln() - lvl0.pressure.unpack().ln())
        / (lvl1.pressure.unpack().ln() - lvl0.pressure.unpack().ln());
    let env_t = Celsius(lvl0.env_t.unpack() + frac * (lvl1.env_t - lvl0.env_t).unpack());

    Ok(Some(AnalLevel {
        pressure: lcl_p,
        pcl_t,
        env_t,
    }))
}

fn select(candidates: &[AnalLevel], policy: CrossingPolicy) -> Option<AnalLevel> {
    match policy {
        CrossingPolicy::Bottom => candidates.first().cloned(),
        CrossingPolicy::Top => candidates.last().cloned(),
    }
}

// Rd times the area between the parcel and environment curves in log pressure, counting only the
// segments that pass the filter.
fn integrate<F>(levels: &[AnalLevel], bottom: HectoPascal, top: HectoPascal, keep: F) -> JpKg
where
    F: Fn(f64) -> bool,
{
    let sum: f64 = levels
        .iter()
        .filter(|lvl| lvl.pressure <= bottom && lvl.pressure >= top)
        .tuple_windows::<(_, _)>()
        .map(|(lvl0, lvl1)| {
            let d_ln_p = (lvl0.pressure.unpack() / lvl1.pressure.unpack()).ln();
            0.5 * (lvl0.buoyancy() + lvl1.buoyancy()) * d_ln_p
        })
        .filter(|&area| keep(area))
        .sum();

    JpKg(RD * sum)
}

//! Wind based analysis, storm motion and helicity.
use crate::{
    error::{AnalysisError, Result},
    layers::{self, Layer},
    sounding::Sounding,
};
use itertools::{izip, Itertools};
use metfor::{IntHelicityM2pS2, Knots, Meters, MetersPSec, Quantity, WindSpdDir, WindUV};
use std::iter::once;

/// Calculate the mean wind in a layer.
///
/// This is NOT the pressure weighted mean.
///
pub fn mean_wind(layer: &Layer, snd: &Sounding) -> Result<WindUV<MetersPSec>> {
    let height = snd.height_profile();
    let wind = snd.wind_profile();

    let max_hgt = layer.top.height.ok_or(AnalysisError::MissingValue)?;
    let min_hgt = layer.bottom.height.ok_or(AnalysisError::MissingValue)?;

    let bottom_wind = layer.bottom.wind;
    let top_wind = layer.top.wind;

    let intermediate_layers = izip!(height, wind)
        .filter_map(|(hgt, wind)| hgt.into_option().map(|h| (h, wind)))
        // Skip values below the layer
        .skip_while(|&(hgt, _)| hgt <= min_hgt)
        // Only take values below the top of the layer
        .take_while(|&(hgt, _)| hgt < max_hgt);

    let (mut iu, mut iv, dz) =
        // Start at the bottom of the layer
        once((min_hgt, &bottom_wind))
        // Add in any intermediate layers
        .chain(intermediate_layers)
        // Finish with the top layer
        .chain(once((max_hgt, &top_wind)))
        // Filter out missing values
        .filter_map(|(hgt, wind)| wind.map(|w| (hgt, w)))
        // Get the wind u-v components in m/s
        .map(|(hgt, wind)| {
            let WindUV { u, v } = WindUV::<MetersPSec>::from(wind);
            (hgt, u, v)
        })
        // Make windows to see two points at a time for trapezoid rule integration
        .tuple_windows::<(_, _)>()
        // Integration with the trapezoid rule to find the mean value
        .fold(
            (
                MetersPSec(0.0), // integrated u component so far
                MetersPSec(0.0), // integrated v component so far
                Meters(0.0),     // the total distance integrated so far
            ),
            |acc, ((h0, u0, v0), (h1, u1, v1))| {
                let (mut iu, mut iv, mut acc_dz) = acc;

                let dz = h1 - h0;

                iu += (u0 + u1) * dz.unpack();
                iv += (v0 + v1) * dz.unpack();
                acc_dz += dz;

                (iu, iv, acc_dz)
            },
        );

    if dz == Meters(0.0) {
        // nothing was done, 1 or zero points in the layer
        return Err(AnalysisError::NotEnoughData);
    } else {
        // we integrated, so divide by height and constant of 2 for trapezoid rule
        iu /= 2.0 * dz.unpack();
        iv /= 2.0 * dz.unpack();
    }

    Ok(WindUV { u: iu, v: iv })
}

/// The bulk shear of a layer, the wind at the top minus the wind at the bottom.
pub fn bulk_shear(layer: &Layer) -> Result<WindUV<MetersPSec>> {
    let top = WindUV::<MetersPSec>::from(layer.top.wind.ok_or(AnalysisError::MissingValue)?);
    let bottom = WindUV::<MetersPSec>::from(layer.bottom.wind.ok_or(AnalysisError::MissingValue)?);

    Ok(WindUV {
        u: top.u - bottom.u,
        v: top.v - bottom.v,
    })
}

/// Storm relative helicity.
///
/// Uses the levels inside the layer plus the layer's top and bottom, so it works on any height
/// grid. Each pair of consecutive levels adds (u₁ − cₓ)(v₀ − c_y) − (u₀ − cₓ)(v₁ − c_y), where c
/// is the storm motion.
pub fn sr_helicity<W>(
    layer: &Layer,
    storm_motion_uv_ms: W,
    snd: &Sounding,
) -> Result<IntHelicityM2pS2>
where
    WindUV<MetersPSec>: From<W>,
{
    let height = snd.height_profile();
    let wind = snd.wind_profile();
    let storm_motion_uv_ms = WindUV::<MetersPSec>::from(storm_motion_uv_ms);

    let bottom = layer.bottom.height.ok_or(AnalysisError::MissingValue)?;
    let top = layer.top.height.ok_or(AnalysisError::MissingValue)?;

    let intermediate = izip!(height, wind)
        // Filter out levels with missing values
        .filter(|(h, w)| h.is_some() && w.is_some())
        // Unwrap from the `Optioned` type
        .map(|(h, w)| (h.unpack(), w.unpack()))
        .skip_while(|(h, _)| *h <= bottom)
        .take_while(|(h, _)| *h < top);

    once((bottom, layer.bottom.wind.ok_or(AnalysisError::MissingValue)?))
        .chain(intermediate)
        .chain(once((top, layer.top.wind.ok_or(AnalysisError::MissingValue)?)))
        // Convert the wind and subtract the storm motion.
        .map(|(_, w)| {
            let WindUV { u, v }: WindUV<MetersPSec> = From::<WindSpdDir<Knots>>::from(w);
            (
                (u - storm_motion_uv_ms.u).unpack(),
                (v - storm_motion_uv_ms.v).unpack(),
            )
        })
        .tuple_windows::<(_, _)>()
        .fold(Err(AnalysisError::NotEnoughData), |acc, ((u0, v0), (u1, v1))| {
            let integrated_helicity: f64 = acc.unwrap_or(0.0);
            Ok(integrated_helicity + u1 * v0 - u0 * v1)
        })
        .map(IntHelicityM2pS2)
}

/// Supercell storm motions from the Bunkers internal dynamics method.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StormMotion {
    /// Motion of a right moving supercell.
    pub right_mover: WindUV<MetersPSec>,
    /// Motion of a left moving supercell.
    pub left_mover: WindUV<MetersPSec>,
    /// The 0-6 km non-pressure weighted mean wind.
    pub mean_wind: WindUV<MetersPSec>,
}

impl StormMotion {
    /// The dominant storm motion for a hemisphere, the right mover in the northern hemisphere
    /// (including the equator) and the left mover in the southern hemisphere.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use skewt_analysis::StormMotion;
    /// use metfor::{MetersPSec, WindUV};
    ///
    /// let motion = StormMotion {
    ///     right_mover: WindUV { u: MetersPSec(10.0), v: MetersPSec(-2.0) },
    ///     left_mover: WindUV { u: MetersPSec(4.0), v: MetersPSec(8.0) },
    ///     mean_wind: WindUV { u: MetersPSec(7.0), v: MetersPSec(3.0) },
    /// };
    ///
    /// assert_eq!(motion.for_latitude(45.0), motion.right_mover);
    /// assert_eq!(motion.for_latitude(-45.0), motion.left_mover);
    /// ```
    pub fn for_latitude(&self, latitude: f64) -> WindUV<MetersPSec> {
        if latitude >= 0.0 {
            self.right_mover
        } else {
            self.left_mover
        }
    }
}

/// Calculate the supercell storm motion using the Bunkers "id" method.
///
/// The mean wind and bulk shear of the lowest 6 km above ground level are used. The shear vector
/// is rotated 90° clockwise and scaled to 7.5 knots to get the deviation from the mean wind.
pub fn bunkers_storm_motion(snd: &Sounding) -> Result<StormMotion> {
    let layer = &layers::layer_agl(snd, Meters(6000.0))?;

    let mean = mean_wind(layer, snd)?;

    let WindUV {
        u: shear_u,
        v: shear_v,
    } = bulk_shear(layer)?;

    let shear_mag = shear_u.unpack().hypot(shear_v.unpack());
    if shear_mag < std::f64::EPSILON {
        return Err(AnalysisError::DegenerateShear);
    }

    let deviation = MetersPSec::from(Knots(7.5)).unpack();

    let scale = deviation / shear_mag;
    let (delta_u, delta_v) = (shear_v * scale, -shear_u * scale);

    Ok(StormMotion {
        right_mover: WindUV {
            u: mean.u + delta_u,
            v: mean.v + delta_v,
        },
        left_mover: WindUV {
            u: mean.u - delta_u,
            v: mean.v - delta_v,
        },
        mean_wind: mean,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_data::{approx_equal, make_five_level_sounding, make_test_sounding};
    use metfor::{HectoPascal, WindSpdDir};
    use optional::some;

    #[test]
    fn test_mean_wind_uniform() {
        let snd = make_five_level_sounding()
            .with_wind_profile(vec![
                some(WindSpdDir {
                    speed: Knots(20.0),
                    direction: 270.0
                });
                5
            ]);
        let layer = layers::layer_agl(&snd, Meters(6000.0)).unwrap();
        let mean = mean_wind(&layer, &snd).unwrap();

        let expected = MetersPSec::from(Knots(20.0)).unpack();
        assert!(approx_equal(mean.u.unpack(), expected, 1.0e-6));
        assert!(approx_equal(mean.v.unpack(), 0.0, 1.0e-6));
    }

    #[test]
    fn test_bunkers_hemispheres() {
        let snd = make_test_sounding();
        let motion = bunkers_storm_motion(&snd).unwrap();

        let right = motion.for_latitude(40.0);
        let left = motion.for_latitude(-40.0);
        assert_eq!(right, motion.right_mover);
        assert_eq!(left, motion.left_mover);
        assert_eq!(motion.for_latitude(0.0), motion.right_mover);

        // Mirrored across the mean wind.
        let mid_u = (right.u + left.u).unpack() / 2.0;
        let mid_v = (right.v + left.v).unpack() / 2.0;
        assert!(approx_equal(mid_u, motion.mean_wind.u.unpack(), 1.0e-9));
        assert!(approx_equal(mid_v, motion.mean_wind.v.unpack(), 1.0e-9));

        // Deviation is 7.5 knots.
        let dev = (right.u - motion.mean_wind.u)
            .unpack()
            .hypot((right.v - motion.mean_wind.v).unpack());
        assert!(approx_equal(dev, MetersPSec::from(Knots(7.5)).unpack(), 1.0e-9));

        // The right mover is to the right of the shear vector.
        let layer = layers::layer_agl(&snd, Meters(6000.0)).unwrap();
        let shear = bulk_shear(&layer).unwrap();
        let du = (right.u - motion.mean_wind.u).unpack();
        let dv = (right.v - motion.mean_wind.v).unpack();
        assert!(shear.u.unpack() * dv - shear.v.unpack() * du < 0.0);
    }

    #[test]
    fn test_bunkers_zero_shear() {
        let snd = make_five_level_sounding();
        assert_eq!(
            bunkers_storm_motion(&snd),
            Err(AnalysisError::DegenerateShear)
        );
    }

    #[test]
    fn test_sr_helicity_veering() {
        let snd = Sounding::new()
            .with_pressure_profile(vec![
                some(HectoPascal(1000.0)),
                some(HectoPascal(900.0)),
                some(HectoPascal(800.0)),
            ])
            .with_height_profile(vec![
                some(Meters(0.0)),
                some(Meters(1000.0)),
                some(Meters(2000.0)),
            ])
            .with_wind_profile(vec![
                some(WindSpdDir {
                    speed: Knots(10.0),
                    direction: 180.0,
                }),
                some(WindSpdDir {
                    speed: Knots(10.0),
                    direction: 270.0,
                }),
                some(WindSpdDir {
                    speed: Knots(10.0),
                    direction: 0.0,
                }),
            ]);

        let layer = layers::layer_agl(&snd, Meters(1000.0)).unwrap();
        let calm = WindUV {
            u: MetersPSec(0.0),
            v: MetersPSec(0.0),
        };
        let srh = sr_helicity(&layer, calm, &snd).unwrap();

        let ten_kts = MetersPSec::from(Knots(10.0)).unpack();
        assert!(approx_equal(srh.unpack(), ten_kts * ten_kts, 1.0e-6));
    }

    #[test]
    fn test_sr_helicity_uniform_wind_is_zero() {
        let snd = make_test_sounding().with_wind_profile(vec![
            some(WindSpdDir {
                speed: Knots(30.0),
                direction: 225.0
            });
            19
        ]);
        let layer = layers::layer_agl(&snd, Meters(3000.0)).unwrap();
        let storm = WindUV {
            u: MetersPSec(5.0),
            v: MetersPSec(3.0),
        };

        let srh = sr_helicity(&layer, storm, &snd).unwrap();
        assert!(approx_equal(srh.unpack(), 0.0, 1.0e-6));
    }

    #[test]
    fn test_sr_helicity_positive_for_right_mover() {
        let snd = make_test_sounding();
        let motion = bunkers_storm_motion(&snd).unwrap();
        let layer = layers::layer_agl(&snd, Meters(3000.0)).unwrap();

        let srh = sr_helicity(&layer, motion.right_mover, &snd).unwrap();
        assert!(srh > IntHelicityM2pS2(0.0));
    }
}

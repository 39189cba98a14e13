//! Interpolation along the vertical profiles of a sounding.
use crate::{
    error::{AnalysisError, Result},
    sounding::{DataRow, Sounding},
};
use itertools::{izip, Itertools};
use metfor::{HectoPascal, Knots, Meters, Quantity, WindSpdDir, WindUV};
use optional::Optioned;
use std::ops::Sub;

/// Interpolate values from the vertical sounding using pressure as the primary coordinate.
///
/// Returns a `DataRow` struct with interpolated values. Winds are interpolated as vectors. Asking
/// for a pressure outside the range of the sounding is an error.
pub fn linear_interpolate_sounding(snd: &Sounding, tgt_p: HectoPascal) -> Result<DataRow> {
    let pressure: &[Optioned<HectoPascal>] = snd.pressure_profile();

    // What kind of bracket is this?
    enum BracketType {
        Bracket(usize, usize),
        EndEquals(usize),
    }

    // Map this pair of slice index and pressure points to a BracketType
    let make_bracket = |pnt_0, pnt_1| -> Option<BracketType> {
        let (i0, p0): (_, HectoPascal) = pnt_0;
        let (i1, p1): (_, HectoPascal) = pnt_1;

        // Always assume pressure is sorted in descending order
        debug_assert!(p0 > p1);
        if (p0 - tgt_p).unpack().abs() < std::f64::EPSILON {
            Some(BracketType::EndEquals(i0))
        } else if (p1 - tgt_p).unpack().abs() < std::f64::EPSILON {
            Some(BracketType::EndEquals(i1))
        } else if p0 > tgt_p && p1 < tgt_p {
            Some(BracketType::Bracket(i0, i1))
        } else {
            None
        }
    };

    pressure
        .iter()
        .enumerate()
        // Remove levels with missing pressure and then unwrap from the Optioned type
        .filter_map(|(i, p_val_opt)| p_val_opt.map(|p_val| (i, p_val)))
        .tuple_windows::<(_, _)>()
        .filter_map(|(pnt_0, pnt_1)| make_bracket(pnt_0, pnt_1))
        .next()
        .and_then(|bracket| match bracket {
            BracketType::Bracket(i0, i1) => {
                let row0 = snd.data_row(i0)?;
                let row1 = snd.data_row(i1)?;
                linear_interp_data_rows(row0, row1, tgt_p)
            }
            BracketType::EndEquals(i) => snd.data_row(i),
        })
        .ok_or(AnalysisError::InterpolationError)
}

/// Interpolate values given two parallel vectors of data and a target value.
///
/// `xs` may be increasing or decreasing. Points where either value is missing are skipped, so the
/// interpolation spans the gap. If more than one pair of points brackets the target, the first
/// pair wins. A target outside the range of the data gives a missing value, never an
/// extrapolation.
///
/// # Examples
///
/// ```rust
/// use skewt_analysis::linear_interpolate;
/// use metfor::{HectoPascal, Meters};
/// use optional::{none, some};
///
/// let ps = vec![some(HectoPascal(1000.0)), none(), some(HectoPascal(800.0))];
/// let hs = vec![some(Meters(100.0)), some(Meters(900.0)), some(Meters(2000.0))];
///
/// let h = linear_interpolate(&ps, &hs, HectoPascal(900.0));
/// assert!((h.unwrap().0 - 1050.0).abs() < 1.0e-9);
///
/// assert!(linear_interpolate(&ps, &hs, HectoPascal(1010.0)).is_none());
/// ```
#[inline]
pub fn linear_interpolate<X, Y>(xs: &[Optioned<X>], ys: &[Optioned<Y>], target_x: X) -> Optioned<Y>
where
    X: Quantity + optional::Noned + PartialOrd + Sub<X>,
    <X as Sub<X>>::Output: Quantity + optional::Noned,
    Y: Quantity + optional::Noned + Sub<Y>,
    <Y as Sub<Y>>::Output: Quantity,
{
    debug_assert_eq!(xs.len(), ys.len());

    enum BracketType<X, Y> {
        Bracket((X, Y), (X, Y)),
        EndEqual((X, Y)),
    }

    let make_bracket = |pnt_0: (X, Y), pnt_1: (X, Y)| -> Option<BracketType<X, Y>> {
        let (x0, _) = pnt_0;
        let (x1, _) = pnt_1;

        if (x0 - target_x).unpack().abs() < std::f64::EPSILON {
            Some(BracketType::EndEqual(pnt_0))
        } else if (x1 - target_x).unpack().abs() < std::f64::EPSILON {
            Some(BracketType::EndEqual(pnt_1))
        } else if (x0 < target_x && x1 > target_x) || (x0 > target_x && x1 < target_x) {
            Some(BracketType::Bracket(pnt_0, pnt_1))
        } else {
            None
        }
    };

    let value_opt = izip!(xs, ys)
        // Skip points with a missing value and use the points on either side of them.
        .filter(|(x, y)| x.is_some() && y.is_some())
        .map(|(x, y)| (x.unpack(), y.unpack()))
        .tuple_windows::<(_, _)>()
        .filter_map(|(pnt_0, pnt_1)| make_bracket(pnt_0, pnt_1))
        .next()
        .map(|val| match val {
            BracketType::Bracket(pnt_0, pnt_1) => {
                let (x0, y0) = pnt_0;
                let (x1, y1) = pnt_1;
                linear_interp(target_x, x0, x1, y0, y1)
            }
            BracketType::EndEqual(pnt) => pnt.1,
        });

    Optioned::from(value_opt)
}

/// Geopotential height at a pressure level, missing if the pressure is outside the profile.
///
/// # Examples
///
/// ```rust
/// use skewt_analysis::{pressure_to_height, Sounding};
/// use metfor::{HectoPascal, Meters};
/// use optional::some;
///
/// let snd = Sounding::new()
///     .with_pressure_profile(vec![some(HectoPascal(1000.0)), some(HectoPascal(850.0))])
///     .with_height_profile(vec![some(Meters(100.0)), some(Meters(1500.0))]);
///
/// assert_eq!(pressure_to_height(&snd, HectoPascal(850.0)).unwrap(), Meters(1500.0));
/// assert!(pressure_to_height(&snd, HectoPascal(700.0)).is_none());
/// ```
#[inline]
pub fn pressure_to_height(snd: &Sounding, p: HectoPascal) -> Optioned<Meters> {
    linear_interpolate(snd.pressure_profile(), snd.height_profile(), p)
}

/// Pressure at a geopotential height, missing if the height is outside the profile.
#[inline]
pub fn height_to_pressure(snd: &Sounding, h: Meters) -> Optioned<HectoPascal> {
    linear_interpolate(snd.height_profile(), snd.pressure_profile(), h)
}

/// Interpolate linearly between two points.
#[inline]
pub fn linear_interp<X, Y>(x_val: X, x1: X, x2: X, y1: Y, y2: Y) -> Y
where
    X: Sub<X> + Copy + std::fmt::Debug + std::cmp::PartialEq,
    <X as Sub<X>>::Output: Quantity,
    Y: Quantity + Sub<Y>,
    <Y as Sub<Y>>::Output: Quantity,
{
    debug_assert_ne!(x1, x2);

    let run = (x2 - x1).unpack();
    let rise = (y2 - y1).unpack();
    let dx = (x_val - x1).unpack();

    Y::pack(y1.unpack() + dx * (rise / run))
}

#[inline]
fn linear_interp_data_rows(row0: DataRow, row1: DataRow, tgt_p: HectoPascal) -> Option<DataRow> {
    let p0 = row0.pressure.into_option()?;
    let p1 = row1.pressure.into_option()?;

    let run = (p1 - p0).unpack();
    let dp = (tgt_p - p0).unpack();

    let mut result = DataRow::default();
    result.pressure = Optioned::from(tgt_p);

    result.temperature = eval_linear_interp(row0.temperature, row1.temperature, run, dp);
    result.dew_point = eval_linear_interp(row0.dew_point, row1.dew_point, run, dp);
    result.height = eval_linear_interp(row0.height, row1.height, run, dp);

    // Special interpolation for vectors
    if let (Some(w_below), Some(w_above)) = (row0.wind.into_option(), row1.wind.into_option()) {
        let WindUV::<Knots> {
            u: x_below,
            v: y_below,
        } = WindUV::from(w_below);
        let WindUV::<Knots> {
            u: x_above,
            v: y_above,
        } = WindUV::from(w_above);

        let x = Knots(x_below.unpack() + (x_above - x_below).unpack() * (dp / run));
        let y = Knots(y_below.unpack() + (y_above - y_below).unpack() * (dp / run));

        let interped_wind = WindSpdDir::from(WindUV { u: x, v: y });

        result.wind = interped_wind.into();
    }

    Some(result)
}

#[inline]
fn eval_linear_interp<Y>(low_val: Optioned<Y>, high_val: Optioned<Y>, run: f64, dp: f64) -> Optioned<Y>
where
    Y: Quantity + optional::Noned,
{
    if low_val.is_some() && high_val.is_some() {
        let (val_below, val_above) = (low_val.unpack().unpack(), high_val.unpack().unpack());
        let rise: f64 = val_above - val_below;
        Optioned::from(Y::pack(val_below + dp * rise / run))
    } else {
        Optioned::default()
    }
}

//! The Skew-T log-P chart.
use super::clip_polyline;
use crate::{
    analysis::Analysis, error::RenderError, interpolation::height_to_pressure,
    parcel_profile::ParcelProfile,
};
use itertools::izip;
use metfor::{self, Celsius, HectoPascal, Kelvin, Knots, Meters, Quantity};
use optional::Optioned;
use plotters::{
    coord::{cartesian::Cartesian2d, types::RangedCoordf64, Shift},
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};

type SkewTChart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

const ORANGE: RGBColor = RGBColor(255, 165, 0);
const DARK_ORANGE: RGBColor = RGBColor(255, 140, 0);
const BROWN: RGBColor = RGBColor(165, 42, 42);
const PURPLE: RGBColor = RGBColor(128, 0, 128);
const MOIST_GREEN: RGBColor = RGBColor(0, 128, 0);

/// Maps pressure and temperature to the skewed chart coordinates.
///
/// The vertical coordinate is `ln(p_bottom / p)`, so it is zero at the bottom of the chart. The
/// horizontal coordinate is the temperature shifted right in proportion to the height, which tilts
/// the isotherms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkewTransform {
    /// Pressure at the bottom edge.
    pub p_bottom: HectoPascal,
    /// Pressure at the top edge.
    pub p_top: HectoPascal,
    /// Shift of an isotherm in °C per unit of log pressure.
    pub skew: f64,
    /// Temperature at the lower left corner.
    pub t_min: Celsius,
    /// Temperature at the lower right corner.
    pub t_max: Celsius,
}

impl Default for SkewTransform {
    fn default() -> Self {
        SkewTransform {
            p_bottom: HectoPascal(1050.0),
            p_top: HectoPascal(100.0),
            skew: 35.0,
            t_min: Celsius(-40.0),
            t_max: Celsius(50.0),
        }
    }
}

impl SkewTransform {
    /// Chart coordinates of a point.
    #[inline]
    pub fn to_chart(&self, p: HectoPascal, t: Celsius) -> (f64, f64) {
        let y = (self.p_bottom.unpack() / p.unpack()).ln();
        (t.unpack() + self.skew * y, y)
    }

    /// The pressure at a vertical chart coordinate.
    #[inline]
    pub fn pressure_at(&self, y: f64) -> HectoPascal {
        HectoPascal(self.p_bottom.unpack() * (-y).exp())
    }

    /// Horizontal extent of the chart.
    pub fn x_range(&self) -> (f64, f64) {
        (self.t_min.unpack(), self.t_max.unpack())
    }

    /// Vertical extent of the chart.
    pub fn y_range(&self) -> (f64, f64) {
        (0.0, (self.p_bottom.unpack() / self.p_top.unpack()).ln())
    }

    /// Is the pressure inside the chart.
    pub fn contains(&self, p: HectoPascal) -> bool {
        p <= self.p_bottom && p >= self.p_top
    }

    fn clip(&self, points: &[(f64, f64)]) -> Vec<Vec<(f64, f64)>> {
        clip_polyline(points, self.x_range(), self.y_range())
    }

    // Pressures from the bottom of the chart up to `top` every `step` hPa.
    fn pressure_levels(&self, top: HectoPascal, step: f64) -> Vec<HectoPascal> {
        let top = if top > self.p_top { top } else { self.p_top };

        let mut levels = vec![];
        let mut p = self.p_bottom;
        while p > top {
            levels.push(p);
            p = HectoPascal(p.unpack() - step);
        }
        levels.push(top);

        levels
    }

    fn isotherms(&self) -> Vec<Vec<(f64, f64)>> {
        (-12..=5)
            .map(|i| Celsius(f64::from(i) * 10.0))
            .map(|t| vec![self.to_chart(self.p_bottom, t), self.to_chart(self.p_top, t)])
            .collect()
    }

    fn dry_adiabats(&self) -> Vec<Vec<(f64, f64)>> {
        let levels = self.pressure_levels(self.p_top, 10.0);

        (24..=48)
            .map(|i| Kelvin(f64::from(i) * 10.0))
            .map(|theta| {
                levels
                    .iter()
                    .map(|&p| {
                        let t = Celsius::from(metfor::temperature_from_pot_temp(theta, p));
                        self.to_chart(p, t)
                    })
                    .collect()
            })
            .collect()
    }

    fn moist_adiabats(&self) -> Vec<Vec<(f64, f64)>> {
        let levels = self.pressure_levels(HectoPascal(200.0), 10.0);

        (-6..=8)
            .map(|i| Celsius(f64::from(i) * 5.0))
            .filter_map(|t| metfor::equiv_pot_temperature(t, t, HectoPascal(1000.0)))
            .map(|theta_e| {
                levels
                    .iter()
                    .filter_map(|&p| {
                        metfor::temperature_from_equiv_pot_temp_saturated_and_pressure(p, theta_e)
                            .map(|t| self.to_chart(p, t))
                    })
                    .collect()
            })
            .collect()
    }

    fn mixing_lines(&self) -> Vec<Vec<(f64, f64)>> {
        let levels = self.pressure_levels(HectoPascal(600.0), 25.0);

        [0.4, 1.0, 2.0, 4.0, 7.0, 10.0, 16.0, 24.0, 32.0]
            .iter()
            .map(|g_per_kg| g_per_kg / 1000.0)
            .map(|mw| {
                levels
                    .iter()
                    .filter_map(|&p| {
                        metfor::dew_point_from_p_and_mw(p, mw).map(|dp| self.to_chart(p, dp))
                    })
                    .collect()
            })
            .collect()
    }

    fn profile(
        &self,
        pressure: &[Optioned<HectoPascal>],
        values: &[Optioned<Celsius>],
    ) -> Vec<(f64, f64)> {
        izip!(pressure, values)
            .filter(|(p, t)| p.is_some() && t.is_some())
            .map(|(p, t)| self.to_chart(p.unpack(), t.unpack()))
            .collect()
    }

    // Area between the parcel and the environment, parcel going up and environment coming down.
    fn shaded_area(&self, layer: &ParcelProfile) -> Vec<(f64, f64)> {
        let layer = layer.slice(self.p_bottom, self.p_top);

        let up = izip!(&layer.pressure, &layer.parcel_t).map(|(&p, &t)| self.to_chart(p, t));
        let down = izip!(&layer.pressure, &layer.environment_t)
            .rev()
            .map(|(&p, &t)| self.to_chart(p, t));

        up.chain(down).collect()
    }
}

/// The pieces of a wind barb as pixel offsets from the station point, y increases downward.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BarbShape {
    /// Line from the station toward the direction the wind blows from, `None` when calm.
    pub staff: Option<((i32, i32), (i32, i32))>,
    /// Full (10 kt) and half (5 kt) barbs.
    pub barbs: Vec<((i32, i32), (i32, i32))>,
    /// 50 kt flags.
    pub pennants: Vec<[(i32, i32); 3]>,
}

/// Lay out a wind barb for a wind from `direction` degrees, rounded to the nearest 5 knots.
///
/// Barbs point to the right of the staff as seen from the station, the northern hemisphere
/// convention.
pub fn barb_shape(speed: Knots, direction: f64) -> BarbShape {
    const STAFF: f64 = 30.0;
    const FEATHER: f64 = 12.0;
    const SPACING: f64 = 5.0;

    let rounded = (speed.unpack() / 5.0).round() as i32 * 5;
    if rounded <= 0 {
        return BarbShape::default();
    }

    let (sin, cos) = direction.to_radians().sin_cos();
    let along = (sin, -cos);
    let across = (cos, sin);
    let at = |a: f64, c: f64| -> (i32, i32) {
        (
            (along.0 * a + across.0 * c).round() as i32,
            (along.1 * a + across.1 * c).round() as i32,
        )
    };

    let n50 = rounded / 50;
    let n10 = (rounded % 50) / 10;
    let n5 = (rounded % 10) / 5;

    let mut shape = BarbShape {
        staff: Some(((0, 0), at(STAFF, 0.0))),
        barbs: vec![],
        pennants: vec![],
    };

    let mut pos = STAFF;
    for _ in 0..n50 {
        shape
            .pennants
            .push([at(pos, 0.0), at(pos + 3.0, FEATHER), at(pos - SPACING, 0.0)]);
        pos -= SPACING + 1.0;
    }
    for _ in 0..n10 {
        shape.barbs.push((at(pos, 0.0), at(pos + 3.0, FEATHER)));
        pos -= SPACING;
    }
    if n5 > 0 {
        // A lone half barb sits off the end of the staff.
        if n50 == 0 && n10 == 0 {
            pos -= SPACING;
        }
        shape.barbs.push((at(pos, 0.0), at(pos + 1.5, FEATHER / 2.0)));
    }

    shape
}

fn draw_runs<DB>(
    chart: &mut SkewTChart<'_, DB>,
    runs: Vec<Vec<(f64, f64)>>,
    style: ShapeStyle,
    label: Option<&'static str>,
) -> Result<(), RenderError>
where
    DB: DrawingBackend,
{
    let mut label = label;
    for run in runs {
        let series = chart.draw_series(LineSeries::new(run, style))?;
        if let Some(text) = label.take() {
            series
                .label(text)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        }
    }

    Ok(())
}

pub(super) fn draw_skewt<DB>(area: &DrawingArea<DB, Shift>, anal: &Analysis) -> Result<(), RenderError>
where
    DB: DrawingBackend,
{
    let tr = SkewTransform::default();
    let (x_min, x_max) = tr.x_range();
    let (y_min, y_max) = tr.y_range();

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(40)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Temperature (°C)")
        .x_label_formatter(&|x| format!("{:.0}", x))
        .draw()?;

    //
    // Background
    //
    let label_font = ("sans-serif", 13).into_font().color(&BLACK);
    for i in 1..=10 {
        let p = HectoPascal(f64::from(i) * 100.0);
        let (_, y) = tr.to_chart(p, Celsius(0.0));
        chart.draw_series(LineSeries::new(
            vec![(x_min, y), (x_max, y)],
            BLACK.mix(0.3).stroke_width(1),
        ))?;
        chart.draw_series(std::iter::once(
            EmptyElement::at((x_min, y))
                + Text::new(
                    format!("{:.0}", p.unpack()),
                    (4, -2),
                    label_font.pos(Pos::new(HPos::Left, VPos::Bottom)),
                ),
        ))?;
    }
    chart.draw_series(std::iter::once(Text::new(
        "Pressure (hPa)",
        (x_min, y_max),
        label_font.pos(Pos::new(HPos::Left, VPos::Top)),
    )))?;

    for line in tr.isotherms() {
        draw_runs(&mut chart, tr.clip(&line), BLACK.mix(0.2).stroke_width(1), None)?;
    }
    let mut label = Some("Dry Adiabats");
    for line in tr.dry_adiabats() {
        draw_runs(&mut chart, tr.clip(&line), DARK_ORANGE.stroke_width(1), label.take())?;
    }
    let mut label = Some("Moist Adiabats");
    for line in tr.moist_adiabats() {
        draw_runs(&mut chart, tr.clip(&line), MOIST_GREEN.stroke_width(1), label.take())?;
    }
    let mut label = Some("Mixing Lines");
    for line in tr.mixing_lines() {
        draw_runs(&mut chart, tr.clip(&line), PURPLE.stroke_width(1), label.take())?;
    }

    let freezing = vec![
        tr.to_chart(tr.p_bottom, Celsius(0.0)),
        tr.to_chart(tr.p_top, Celsius(0.0)),
    ];
    draw_runs(&mut chart, tr.clip(&freezing), BROWN.stroke_width(1), Some("0°C Reference Line"))?;

    //
    // Shading and profiles
    //
    let snd = anal.sounding();
    let surface = anal.surface_parcel_analysis();

    if let Some(sfc) = surface {
        if let Some(layer) = sfc.cape_layer() {
            chart.draw_series(std::iter::once(Polygon::new(
                tr.shaded_area(&layer),
                RED.mix(0.3).filled(),
            )))?;
        }
        if let Some(layer) = sfc.cin_layer() {
            chart.draw_series(std::iter::once(Polygon::new(
                tr.shaded_area(&layer),
                BLUE.mix(0.3).filled(),
            )))?;
        }
    }

    let temperature = tr.profile(snd.pressure_profile(), snd.temperature_profile());
    draw_runs(&mut chart, tr.clip(&temperature), RED.stroke_width(2), Some("Temperature"))?;

    let dew_point = tr.profile(snd.pressure_profile(), snd.dew_point_profile());
    draw_runs(&mut chart, tr.clip(&dew_point), BLUE.stroke_width(2), Some("Dew Point"))?;

    if let Some(sfc) = surface {
        let path = sfc.path();
        let parcel = tr.profile(&path.pressure, &path.temperature);
        draw_runs(&mut chart, tr.clip(&parcel), BLACK.stroke_width(2), Some("Parcel"))?;
    }

    //
    // Levels
    //
    let mut levels = vec![];
    if let Some(sfc) = surface {
        levels.push(("LCL", sfc.lcl(), MAGENTA));
        levels.extend(sfc.lfc().map(|lvl| ("LFC", lvl, GREEN)));
        levels.extend(sfc.el().map(|lvl| ("EL", lvl, CYAN)));
    }
    levels.extend(anal.ccl().map(|ccl| ("CCL", ccl.level, ORANGE)));

    chart.draw_series(
        levels
            .into_iter()
            .filter(|(_, lvl, _)| tr.contains(lvl.pressure))
            .map(|(name, lvl, color)| {
                EmptyElement::at(tr.to_chart(lvl.pressure, lvl.temperature))
                    + Circle::new((0, 0), 5, color.filled())
                    + Text::new(name, (8, -4), label_font.pos(Pos::new(HPos::Left, VPos::Bottom)))
            }),
    )?;

    // Height above ground on the right edge.
    if let Some(sfc_height) = snd.surface_height().into_option() {
        for &km in &[0.0, 1.0, 3.0, 6.0, 9.0, 12.0, 15.0] {
            let p = height_to_pressure(snd, sfc_height + Meters(km * 1000.0));
            if let Some(p) = p.into_option().filter(|&p| tr.contains(p)) {
                let (_, y) = tr.to_chart(p, Celsius(0.0));
                chart.draw_series(std::iter::once(
                    EmptyElement::at((x_max, y))
                        + Text::new(
                            format!("{:.0} km", km),
                            (-6, 0),
                            label_font.pos(Pos::new(HPos::Right, VPos::Center)),
                        ),
                ))?;
            }
        }
    }

    //
    // Wind barbs, every third level below 100 hPa.
    //
    let barb_x = x_max - 0.12 * (x_max - x_min);
    let style = BLACK.stroke_width(1);
    let winds = izip!(snd.pressure_profile(), snd.wind_profile())
        .filter(|(p, w)| p.is_some() && w.is_some())
        .map(|(p, w)| (p.unpack(), w.unpack()))
        .filter(|&(p, _)| p > HectoPascal(100.0) && tr.contains(p))
        .step_by(3);

    for (p, wind) in winds {
        let (_, y) = tr.to_chart(p, Celsius(0.0));
        let anchor = (barb_x, y);
        let shape = barb_shape(wind.speed, wind.direction);

        match shape.staff {
            Some((start, end)) => {
                chart.draw_series(
                    std::iter::once((start, end))
                        .chain(shape.barbs.iter().cloned())
                        .map(|(a, b)| EmptyElement::at(anchor) + PathElement::new(vec![a, b], style)),
                )?;
                chart.draw_series(shape.pennants.iter().map(|tri| {
                    EmptyElement::at(anchor) + Polygon::new(tri.to_vec(), BLACK.filled())
                }))?;
            }
            None => {
                chart.draw_series(std::iter::once(
                    EmptyElement::at(anchor) + Circle::new((0, 0), 4, style),
                ))?;
            }
        }
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(("sans-serif", 13))
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    Ok(())
}

//! The hodograph, the wind vector traced with height and colored by height above ground.
use super::clip_polyline;
use crate::{analysis::Analysis, error::RenderError, sounding::Sounding};
use itertools::{izip, Itertools};
use metfor::{MetersPSec, Quantity, WindUV};
use plotters::{
    coord::Shift,
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};

/// Boundaries of the colored height bands, km above the lowest level.
pub const HODOGRAPH_BANDS_KM: [f64; 6] = [0.0, 1.0, 3.0, 5.0, 8.0, 10.0];

const BAND_COLORS: [RGBColor; 5] = [
    RGBColor(188, 189, 34),
    RGBColor(44, 160, 44),
    RGBColor(31, 119, 180),
    RGBColor(214, 39, 40),
    RGBColor(227, 119, 194),
];

// Axis half width in m/s.
const COMPONENT_RANGE: f64 = 30.0;

/// Part of the hodograph trace inside one height band.
#[derive(Debug, Clone, PartialEq)]
pub struct HodographSegment {
    /// Index of the band in [`HODOGRAPH_BANDS_KM`], the band spans this and the next boundary.
    pub band: usize,
    /// Wind components (u, v) in m/s.
    pub points: Vec<(f64, f64)>,
}

fn band_of(agl_km: f64) -> Option<usize> {
    HODOGRAPH_BANDS_KM
        .iter()
        .tuple_windows::<(_, _)>()
        .position(|(&bottom, &top)| agl_km >= bottom && agl_km < top)
}

/// Split the wind profile up to 10 km above the lowest level into height bands.
///
/// Heights are measured from the first level with a height. Consecutive segments share their end
/// points so the trace stays connected across band boundaries.
pub fn hodograph_segments(snd: &Sounding) -> Vec<HodographSegment> {
    let levels: Vec<(f64, (f64, f64))> = izip!(snd.height_profile(), snd.wind_uv_ms())
        .filter_map(|(h, uv)| h.into_option().and_then(|h| uv.map(|uv| (h, uv))))
        .map(|(h, WindUV { u, v })| (h.unpack(), (u.unpack(), v.unpack())))
        .collect();

    let h0 = match levels.first() {
        Some(&(h0, _)) => h0,
        None => return vec![],
    };

    let top = HODOGRAPH_BANDS_KM[HODOGRAPH_BANDS_KM.len() - 1];
    let mut segments: Vec<HodographSegment> = vec![];

    for ((h_a, uv_a), (h_b, uv_b)) in levels.iter().cloned().tuple_windows() {
        let agl_a = (h_a - h0) / 1000.0;
        let agl_b = (h_b - h0) / 1000.0;
        if agl_b > top {
            break;
        }

        let band = match band_of(agl_a) {
            Some(band) => band,
            None => continue,
        };

        match segments.last_mut() {
            Some(seg) if seg.band == band => seg.points.push(uv_b),
            _ => segments.push(HodographSegment {
                band,
                points: vec![uv_a, uv_b],
            }),
        }
    }

    segments
}

fn uv_point(uv: WindUV<MetersPSec>) -> (f64, f64) {
    (uv.u.unpack(), uv.v.unpack())
}

pub(super) fn draw_hodograph<DB>(
    area: &DrawingArea<DB, Shift>,
    anal: &Analysis,
) -> Result<(), RenderError>
where
    DB: DrawingBackend,
{
    let range = (-COMPONENT_RANGE, COMPONENT_RANGE);

    let mut chart = ChartBuilder::on(area)
        .margin(15)
        .x_label_area_size(35)
        .y_label_area_size(45)
        .build_cartesian_2d(range.0..range.1, range.0..range.1)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Wind Speed (m/s)")
        .y_desc("Wind Speed (m/s)")
        .draw()?;

    // Rings every 10 m/s and the axes.
    let grid = BLACK.mix(0.3).stroke_width(1);
    for ring in &[10.0, 20.0, 30.0] {
        let circle = (0..=72).map(|i| {
            let angle = f64::from(i) * 5.0f64.to_radians();
            (ring * angle.cos(), ring * angle.sin())
        });
        chart.draw_series(LineSeries::new(circle, grid))?;
    }
    chart.draw_series(LineSeries::new(vec![(range.0, 0.0), (range.1, 0.0)], grid))?;
    chart.draw_series(LineSeries::new(vec![(0.0, range.0), (0.0, range.1)], grid))?;

    for segment in hodograph_segments(anal.sounding()) {
        let color = BAND_COLORS[segment.band];
        for run in clip_polyline(&segment.points, range, range) {
            chart.draw_series(LineSeries::new(run, color.stroke_width(3)))?;
        }
    }

    // Band legend in the upper left corner.
    let font = ("sans-serif", 13).into_font().color(&BLACK);
    let legend_font = font.pos(Pos::new(HPos::Left, VPos::Center));
    for (i, (bottom, top)) in HODOGRAPH_BANDS_KM.iter().tuple_windows().enumerate() {
        chart.draw_series(std::iter::once(
            EmptyElement::at((range.0, range.1))
                + Rectangle::new(
                    [(8, 10 + 18 * i as i32), (24, 20 + 18 * i as i32)],
                    BAND_COLORS[i].filled(),
                )
                + Text::new(
                    format!("{:.0}-{:.0} km", bottom, top),
                    (30, 15 + 18 * i as i32),
                    legend_font.clone(),
                ),
        ))?;
    }

    if let Some(motion) = anal.storm_motion() {
        let marks = vec![
            ("RM", uv_point(motion.right_mover), RED),
            ("LM", uv_point(motion.left_mover), BLUE),
            ("MW", uv_point(motion.mean_wind), BLACK),
        ];

        chart.draw_series(
            marks
                .into_iter()
                .filter(|(_, (u, v), _)| u.abs() < COMPONENT_RANGE && v.abs() < COMPONENT_RANGE)
                .map(|(name, pnt, color)| {
                    EmptyElement::at(pnt)
                        + Circle::new((0, 0), 4, color.filled())
                        + Text::new(name, (6, -6), font.pos(Pos::new(HPos::Left, VPos::Bottom)))
                }),
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_data::{make_five_level_sounding, make_test_sounding};

    #[test]
    fn test_band_of() {
        assert_eq!(band_of(0.0), Some(0));
        assert_eq!(band_of(0.99), Some(0));
        assert_eq!(band_of(1.0), Some(1));
        assert_eq!(band_of(9.5), Some(4));
        assert_eq!(band_of(10.0), None);
        assert_eq!(band_of(-0.5), None);
    }

    #[test]
    fn test_hodograph_segments() {
        let snd = make_test_sounding();
        let segments = hodograph_segments(&snd);

        assert!(!segments.is_empty());
        assert_eq!(segments[0].band, 0);

        // Bands only increase with height, and segments join end to start.
        for (lower, upper) in segments.iter().tuple_windows() {
            assert!(upper.band > lower.band);
            assert_eq!(lower.points.last(), upper.points.first());
        }

        // The trace starts at the lowest wind.
        let first = snd.wind_uv_ms()[0].unwrap();
        assert_eq!(segments[0].points[0], uv_point(first));
    }

    #[test]
    fn test_calm_profile() {
        let snd = make_five_level_sounding();
        let segments = hodograph_segments(&snd);

        assert!(segments
            .iter()
            .flat_map(|seg| seg.points.iter())
            .all(|&(u, v)| u.abs() < 1.0e-9 && v.abs() < 1.0e-9));
        assert!(hodograph_segments(&Sounding::new()).is_empty());
    }
}

//! Draw a Skew-T log-P diagram with a hodograph and tables of the analysis as a PNG image.
//!
//! The image has a title strip across the top. Below it the Skew-T fills the left side, the
//! hodograph sits at the upper right and the tables at the lower right.
use crate::{analysis::Analysis, error::RenderError};
use chrono::NaiveDateTime;
use itertools::Itertools;
use log::debug;
use plotters::{
    coord::Shift,
    drawing::DrawingAreaErrorKind,
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};
use serde::Deserialize;
use std::{
    fs, panic,
    path::{Path, PathBuf},
};

mod hodograph;
mod skewt;
mod tables;

pub use self::{
    hodograph::{hodograph_segments, HodographSegment, HODOGRAPH_BANDS_KM},
    skewt::{barb_shape, BarbShape, SkewTransform},
    tables::{advection_rows, format_value, indices_rows},
};

/// Size of the rendered image in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImageOptions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for ImageOptions {
    fn default() -> Self {
        ImageOptions {
            width: 1920,
            height: 957,
        }
    }
}

impl<E> From<DrawingAreaErrorKind<E>> for RenderError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Drawing(err.to_string())
    }
}

/// File name of the diagram for an input file, `<stem>_<YYYYmmdd_HHMM>.png`.
///
/// # Examples
///
/// ```rust
/// use chrono::NaiveDate;
/// use skewt_analysis::output_file_name;
/// use std::path::{Path, PathBuf};
///
/// let vt = NaiveDate::from_ymd_opt(2024, 7, 4).unwrap().and_hms_opt(12, 30, 0).unwrap();
/// assert_eq!(
///     output_file_name(Path::new("data/barcelona.json"), Some(vt)),
///     PathBuf::from("barcelona_20240704_1230.png")
/// );
/// ```
pub fn output_file_name(input: &Path, valid_time: Option<NaiveDateTime>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sounding".to_owned());

    match valid_time {
        Some(vt) => PathBuf::from(format!("{}_{}.png", stem, vt.format("%Y%m%d_%H%M"))),
        None => PathBuf::from(format!("{}.png", stem)),
    }
}

/// The valid time as shown in the title, like `Jul 04, 2024 12:30Z`.
pub fn format_valid_time(valid_time: Option<NaiveDateTime>) -> String {
    valid_time
        .map(|vt| vt.format("%b %d, %Y %H:%MZ").to_string())
        .unwrap_or_else(|| "Unknown time".to_owned())
}

/// Draw the diagram for an analysis and save it at `path`, creating the parent directory if
/// needed.
pub fn render_diagram(
    anal: &Analysis,
    location_name: &str,
    path: &Path,
    image: &ImageOptions,
) -> Result<(), RenderError> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| RenderError::OutputDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    // Font lookup and image encoding happen in the backend, which can panic on a broken system.
    let render = || -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, (image.width, image.height)).into_drawing_area();
        draw_diagram(&root, anal, location_name)?;
        root.present()?;
        Ok(())
    };

    panic::catch_unwind(panic::AssertUnwindSafe(render))
        .map_err(|_| RenderError::Drawing("plotting backend panicked".to_owned()))??;

    debug!("wrote {}", path.display());
    Ok(())
}

fn draw_diagram<DB>(
    root: &DrawingArea<DB, Shift>,
    anal: &Analysis,
    location_name: &str,
) -> Result<(), RenderError>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE)?;

    let (width, height) = root.dim_in_pixel();
    let (title_area, body) = root.split_vertically(50);
    draw_title(&title_area, anal, location_name)?;

    let (skewt_area, side) = body.split_horizontally(width * 55 / 100);
    let (hodo_area, table_area) = side.split_vertically(height.saturating_sub(50) * 45 / 100);

    skewt::draw_skewt(&skewt_area, anal)?;
    hodograph::draw_hodograph(&hodo_area, anal)?;
    tables::draw_tables(&table_area, anal)?;

    Ok(())
}

fn draw_title<DB>(
    area: &DrawingArea<DB, Shift>,
    anal: &Analysis,
    location_name: &str,
) -> Result<(), RenderError>
where
    DB: DrawingBackend,
{
    let (width, height) = area.dim_in_pixel();
    let (width, mid) = (width as i32, height as i32 / 2);
    let font = ("sans-serif", 22).into_font().color(&BLACK);

    let snd = anal.sounding();

    let title = format!("Skew-T Log-P, {}", location_name.to_uppercase());
    area.draw(&Text::new(
        title,
        (20, mid),
        font.pos(Pos::new(HPos::Left, VPos::Center)),
    ))?;

    area.draw(&Text::new(
        format_valid_time(snd.valid_time()),
        (width / 2, mid),
        font.pos(Pos::new(HPos::Center, VPos::Center)),
    ))?;

    let location = snd
        .station_info()
        .location()
        .map(|(lat, lon)| format!("Lat = {:.2}° Lon = {:.2}°", lat, lon))
        .unwrap_or_else(|| "Lat = N/A Lon = N/A".to_owned());
    area.draw(&Text::new(
        location,
        (width - 20, mid),
        font.pos(Pos::new(HPos::Right, VPos::Center)),
    ))?;

    Ok(())
}

// Clip a segment to a box with the Liang-Barsky algorithm. The flags tell if the start or end
// point was moved.
fn clip_segment(
    a: (f64, f64),
    b: (f64, f64),
    (x_min, x_max): (f64, f64),
    (y_min, y_max): (f64, f64),
) -> Option<((f64, f64), (f64, f64), bool, bool)> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let mut t0 = 0.0;
    let mut t1 = 1.0;

    for &(p, q) in &[
        (-dx, a.0 - x_min),
        (dx, x_max - a.0),
        (-dy, a.1 - y_min),
        (dy, y_max - a.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                if r > t0 {
                    t0 = r;
                }
            } else {
                if r < t0 {
                    return None;
                }
                if r < t1 {
                    t1 = r;
                }
            }
        }
    }

    let start = if t0 > 0.0 {
        (a.0 + t0 * dx, a.1 + t0 * dy)
    } else {
        a
    };
    let end = if t1 < 1.0 {
        (a.0 + t1 * dx, a.1 + t1 * dy)
    } else {
        b
    };

    Some((start, end, t0 > 0.0, t1 < 1.0))
}

/// Split a polyline into the runs that are inside a box, cut at the box edges.
pub fn clip_polyline(
    points: &[(f64, f64)],
    x_range: (f64, f64),
    y_range: (f64, f64),
) -> Vec<Vec<(f64, f64)>> {
    let mut runs = vec![];
    let mut current: Vec<(f64, f64)> = vec![];

    for (&a, &b) in points.iter().tuple_windows() {
        match clip_segment(a, b, x_range, y_range) {
            Some((start, end, start_clipped, end_clipped)) => {
                if start_clipped || current.is_empty() {
                    if current.len() > 1 {
                        runs.push(std::mem::take(&mut current));
                    }
                    current.clear();
                    current.push(start);
                }
                current.push(end);

                if end_clipped {
                    runs.push(std::mem::take(&mut current));
                }
            }
            None => {
                if current.len() > 1 {
                    runs.push(std::mem::take(&mut current));
                }
                current.clear();
            }
        }
    }

    if current.len() > 1 {
        runs.push(current);
    }

    runs
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_output_file_name() {
        let vt = NaiveDate::from_ymd_opt(2023, 11, 14)
            .unwrap()
            .and_hms_opt(22, 13, 20)
            .unwrap();

        assert_eq!(
            output_file_name(Path::new("/tmp/in/madrid.json"), Some(vt)),
            PathBuf::from("madrid_20231114_2213.png")
        );
        assert_eq!(
            output_file_name(Path::new("madrid.json"), None),
            PathBuf::from("madrid.png")
        );
        assert_eq!(format_valid_time(Some(vt)), "Nov 14, 2023 22:13Z");
        assert_eq!(format_valid_time(None), "Unknown time");
    }

    #[test]
    fn test_clip_polyline() {
        let bx = (0.0, 10.0);

        // Entirely inside, unchanged.
        let inside = vec![(1.0, 1.0), (5.0, 5.0), (9.0, 2.0)];
        assert_eq!(clip_polyline(&inside, bx, bx), vec![inside.clone()]);

        // Leaves through the right edge and comes back.
        let out_and_back = vec![(5.0, 5.0), (15.0, 5.0), (5.0, 6.0)];
        let runs = clip_polyline(&out_and_back, bx, bx);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0], vec![(5.0, 5.0), (10.0, 5.0)]);
        assert_eq!(runs[1][1], (5.0, 6.0));
        assert!((runs[1][0].0 - 10.0).abs() < 1.0e-12);

        // Entirely outside.
        let outside = vec![(-5.0, -5.0), (-1.0, 20.0)];
        assert!(clip_polyline(&outside, bx, bx).is_empty());

        // Crosses the whole box.
        let across = vec![(-5.0, 5.0), (15.0, 5.0)];
        assert_eq!(clip_polyline(&across, bx, bx), vec![vec![(0.0, 5.0), (10.0, 5.0)]]);
    }

    #[test]
    fn test_render_creates_output_directory() {
        use crate::{analysis::AnalysisOptions, test_data::make_test_sounding};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("test.png");
        let anal = Analysis::new(make_test_sounding(), &AnalysisOptions::default());

        // Text needs a system font, the image itself is only checked if drawing succeeded.
        match render_diagram(&anal, "Test", &path, &ImageOptions::default()) {
            Ok(()) => assert!(path.exists()),
            Err(RenderError::Drawing(msg)) => debug!("drawing failed: {}", msg),
            Err(err) => panic!("unexpected error: {}", err),
        }
        assert!(dir.path().join("nested").is_dir());
    }
}

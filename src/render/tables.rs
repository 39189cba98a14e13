//! Text tables of the analysis results.
use crate::{analysis::Analysis, error::RenderError};
use metfor::{Knots, Meters, Quantity, WindSpdDir, WindUV};
use plotters::{
    coord::Shift,
    prelude::*,
    style::{
        text_anchor::{HPos, Pos, VPos},
        FontStyle,
    },
};

const DEFINITIONS: [(&str, &str); 6] = [
    (
        "CAPE",
        "Energy a rising parcel gains from being warmer than its surroundings. \
         Large values favor strong updrafts and thunderstorms.",
    ),
    (
        "CIN",
        "Energy needed to lift a parcel through the stable air below its level of \
         free convection.",
    ),
    (
        "LCL",
        "Height where surface air lifted dry adiabatically becomes saturated, usually \
         the base of forced clouds.",
    ),
    (
        "LFC",
        "Height above which a lifted parcel is warmer than its surroundings and rises \
         on its own.",
    ),
    (
        "EL",
        "Height where a rising parcel is no longer warmer than its surroundings, often \
         near the top of a thunderstorm.",
    ),
    (
        "CCL",
        "Height where surface air heated until it mixes to that level becomes saturated.",
    ),
];

/// A number with a fixed precision and a unit, or `N/A` when undefined.
///
/// # Examples
///
/// ```rust
/// use skewt_analysis::format_value;
///
/// assert_eq!(format_value(Some(1234.567), 1, "m"), "1234.6 m");
/// assert_eq!(format_value(None, 1, "m"), "N/A");
/// ```
pub fn format_value(val: Option<f64>, precision: usize, unit: &str) -> String {
    match val {
        Some(val) if val.is_finite() => {
            if unit.is_empty() {
                format!("{:.*}", precision, val)
            } else {
                format!("{:.*} {}", precision, val, unit)
            }
        }
        _ => "N/A".to_owned(),
    }
}

// Break text into lines of at most `max_chars`, only at spaces.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = vec![];
    let mut line = String::new();

    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > max_chars {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }

    lines
}

fn height(h: Option<Meters>) -> String {
    format_value(h.map(|h| h.unpack()), 1, "m")
}

fn wind(val: Option<WindSpdDir<Knots>>) -> String {
    match val {
        Some(WindSpdDir { speed, direction }) => {
            format!("{:03.0}° {:.0} kt", direction, speed.unpack())
        }
        None => "N/A".to_owned(),
    }
}

/// Label and value of every row in the instability table.
pub fn indices_rows(anal: &Analysis) -> Vec<(&'static str, String)> {
    let idx = anal.indices();
    let sfc = anal.surface_parcel_analysis();
    let unpack = |val: Option<metfor::JpKg>| val.map(|v| v.unpack());
    let srh = |val: Option<metfor::IntHelicityM2pS2>| val.map(|v| v.unpack());

    let latitude = anal.sounding().station_info().latitude().unwrap_or(0.0);
    let storm = anal.storm_motion().map(|motion| {
        let WindUV { u, v } = motion.for_latitude(latitude);
        WindSpdDir::from(WindUV {
            u: Knots::from(u),
            v: Knots::from(v),
        })
    });

    vec![
        ("CAPE", format_value(unpack(idx.cape), 2, "J/kg")),
        ("CIN", format_value(unpack(idx.cin), 2, "J/kg")),
        (
            "LCL",
            height(sfc.and_then(|anal| anal.lcl().height.into_option())),
        ),
        (
            "LFC",
            height(sfc.and_then(|anal| anal.lfc()).and_then(|lvl| lvl.height.into_option())),
        ),
        (
            "EL",
            height(sfc.and_then(|anal| anal.el()).and_then(|lvl| lvl.height.into_option())),
        ),
        (
            "CCL",
            height(anal.ccl().and_then(|ccl| ccl.level.height.into_option())),
        ),
        ("ML CAPE", format_value(unpack(idx.ml_cape), 2, "J/kg")),
        ("MU CAPE", format_value(unpack(idx.mu_cape), 2, "J/kg")),
        ("Lifted Index", format_value(idx.lifted_index, 1, "")),
        ("K-Index", format_value(idx.k_index, 1, "")),
        ("Total Totals", format_value(idx.total_totals, 1, "")),
        ("Vertical Totals", format_value(idx.vertical_totals, 1, "")),
        ("Cross Totals", format_value(idx.cross_totals, 1, "")),
        ("0-1 km SRH", format_value(srh(idx.srh_1km), 0, "m²/s²")),
        ("0-3 km SRH", format_value(srh(idx.srh_3km), 0, "m²/s²")),
        ("0-6 km SRH", format_value(srh(idx.srh_6km), 0, "m²/s²")),
        ("Storm Motion", wind(storm)),
        (
            "Precipitable Water",
            format_value(idx.precipitable_water.map(|pw| pw.unpack()), 1, "mm"),
        ),
        (
            "Freezing Level",
            format_value(idx.freezing_level.map(|h| h.unpack()), 1, "m"),
        ),
    ]
}

/// Pressure band and mean temperature advection of each advection band.
pub fn advection_rows(anal: &Analysis) -> Vec<(String, String)> {
    anal.advection_bands()
        .iter()
        .map(|band| {
            (
                format!("{:.0}-{:.0} hPa", band.bottom.unpack(), band.top.unpack()),
                band.advection
                    .map(|adv| format!("{:+.2} °C/h", adv))
                    .unwrap_or_else(|| "N/A".to_owned()),
            )
        })
        .collect()
}

pub(super) fn draw_tables<DB>(
    area: &DrawingArea<DB, Shift>,
    anal: &Analysis,
) -> Result<(), RenderError>
where
    DB: DrawingBackend,
{
    let (width, height) = area.dim_in_pixel();
    let (width, height) = (width as i32, height as i32);

    let heading = ("sans-serif", 16)
        .into_font()
        .style(FontStyle::Bold)
        .color(&BLACK);
    let body = ("sans-serif", 13).into_font().color(&BLACK);
    let left = body.pos(Pos::new(HPos::Left, VPos::Top));
    let right = body.pos(Pos::new(HPos::Right, VPos::Top));

    const ROW: i32 = 17;

    // Instability indices on the left, advection on the right.
    let col_width = width / 3;
    area.draw(&Text::new(
        "Instability Indices",
        (10, 5),
        heading.pos(Pos::new(HPos::Left, VPos::Top)),
    ))?;
    let mut y = 5 + ROW + 6;
    for (label, value) in indices_rows(anal) {
        area.draw(&Text::new(label, (10, y), left.clone()))?;
        area.draw(&Text::new(value, (10 + col_width, y), right.clone()))?;
        y += ROW;
    }

    let x = col_width + 40;
    area.draw(&Text::new(
        "Temperature Advection",
        (x, 5),
        heading.pos(Pos::new(HPos::Left, VPos::Top)),
    ))?;
    let mut y = 5 + ROW + 6;
    for (label, value) in advection_rows(anal) {
        area.draw(&Text::new(label, (x, y), left.clone()))?;
        area.draw(&Text::new(value, (x + col_width, y), right.clone()))?;
        y += ROW;
    }

    // Short definitions below the advection table, as many as fit.
    let max_chars = ((width - x - 10) / 7).max(20) as usize;
    let mut y = y + ROW;
    for (term, text) in DEFINITIONS.iter() {
        let lines = wrap_text(&format!("{}: {}", term, text), max_chars);
        if y + ROW * lines.len() as i32 > height {
            break;
        }
        for line in lines {
            area.draw(&Text::new(line, (x, y), left.clone()))?;
            y += ROW;
        }
        y += ROW / 2;
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        analysis::AnalysisOptions,
        test_data::{make_five_level_sounding, make_test_sounding},
    };

    fn lookup<'a>(rows: &'a [(&'static str, String)], label: &str) -> &'a str {
        rows.iter()
            .find(|(lbl, _)| *lbl == label)
            .map(|(_, val)| val.as_str())
            .unwrap()
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Some(1.0 / 3.0), 2, "J/kg"), "0.33 J/kg");
        assert_eq!(format_value(Some(-2.0), 1, ""), "-2.0");
        assert_eq!(format_value(Some(std::f64::NAN), 1, "m"), "N/A");
        assert_eq!(format_value(None, 0, "m"), "N/A");
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(
            wrap_text("the quick brown fox jumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
        assert_eq!(wrap_text("unbreakablewordhere ok", 5), vec!["unbreakablewordhere", "ok"]);
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn test_indices_rows() {
        let anal = Analysis::new(make_test_sounding(), &AnalysisOptions::default());
        let rows = indices_rows(&anal);

        assert!(lookup(&rows, "CAPE").ends_with("J/kg"));
        assert!(lookup(&rows, "LCL").ends_with(" m"));
        assert!(lookup(&rows, "Storm Motion").ends_with("kt"));
        assert_ne!(lookup(&rows, "0-3 km SRH"), "N/A");

        let anal = Analysis::new(make_five_level_sounding(), &AnalysisOptions::default());
        let rows = indices_rows(&anal);
        assert_eq!(lookup(&rows, "Storm Motion"), "N/A");
        assert_eq!(lookup(&rows, "0-1 km SRH"), "N/A");
        assert_eq!(lookup(&rows, "Total Totals"), "55.0");
        assert_eq!(lookup(&rows, "Freezing Level"), "3000.0 m");
    }

    #[test]
    fn test_advection_rows() {
        let anal = Analysis::new(make_test_sounding(), &AnalysisOptions::default());
        let rows = advection_rows(&anal);

        assert_eq!(rows.len(), 9);
        assert_eq!(rows[0].0, "1000-900 hPa");
        assert_eq!(rows[8].0, "200-100 hPa");
        assert!(rows.iter().any(|(_, val)| val.ends_with("°C/h")));

        let anal = Analysis::new(make_five_level_sounding(), &AnalysisOptions::default());
        assert!(advection_rows(&anal).iter().all(|(_, val)| val == "N/A"));
    }
}

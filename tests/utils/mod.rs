use metfor::{Celsius, HectoPascal, Knots, Meters, WindSpdDir};
use optional::{some, Optioned};
use skewt_analysis::{load_geojson, parse_sounding, IngestOptions, Sounding, StationInfo};
use std::path::PathBuf;

#[allow(unused_macros)] // False alarm
macro_rules! test_file {
    ($test_name:ident, $fname:expr) => {
        #[test]
        fn $test_name() {
            let snd = utils::load_test_file($fname);
            assert!(snd.validate().is_ok(), "Failed validation.");

            let anal = skewt_analysis::Analysis::new(
                snd,
                &skewt_analysis::AnalysisOptions::default(),
            );
            let idx = anal.indices();

            if let Some(cape) = idx.cape {
                assert!(cape.unpack().is_finite() && cape.unpack() >= 0.0);
            }
            if let Some(cin) = idx.cin {
                assert!(cin.unpack().is_finite() && cin.unpack() <= 0.0);
            }
            assert_eq!(anal.advection_bands().len(), 9);
        }
    };
}

pub fn test_data_path(fname: &str) -> PathBuf {
    let mut test_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    test_path.push("test_data");
    test_path.push(fname);
    test_path
}

pub fn load_test_file(fname: &str) -> Sounding {
    let location = test_data_path(fname);
    let doc = load_geojson(&location).expect(&format!("Error loading file: {:#?}", location));
    parse_sounding(&doc, &IngestOptions::default())
        .expect(&format!("Error parsing file: {:#?}", location))
}

/// Build a sounding from columns of pressure, height, temperature, dew point and wind.
#[allow(dead_code)]
pub fn build_sounding(
    pres: &[f64],
    hgt: &[f64],
    temp: &[f64],
    dp: &[f64],
    wind: &[(f64, f64)],
    lat: f64,
) -> Sounding {
    let pressure: Vec<Optioned<HectoPascal>> = pres.iter().map(|&p| some(HectoPascal(p))).collect();
    let height: Vec<Optioned<Meters>> = hgt.iter().map(|&h| some(Meters(h))).collect();
    let temperature: Vec<Optioned<Celsius>> = temp.iter().map(|&t| some(Celsius(t))).collect();
    let dew_point: Vec<Optioned<Celsius>> = dp.iter().map(|&t| some(Celsius(t))).collect();
    let wind: Vec<Optioned<WindSpdDir<Knots>>> = wind
        .iter()
        .map(|&(direction, speed)| {
            some(WindSpdDir {
                speed: Knots(speed),
                direction,
            })
        })
        .collect();

    Sounding::new()
        .with_station_info(StationInfo::new().with_lat_lon((lat, -100.0)))
        .with_pressure_profile(pressure)
        .with_height_profile(height)
        .with_temperature_profile(temperature)
        .with_dew_point_profile(dew_point)
        .with_wind_profile(wind)
}

#[allow(dead_code)]
pub fn approx_equal(tgt: f64, guess: f64, tol: f64) -> bool {
    let passed = (tgt - guess).abs() <= tol;
    if !passed {
        println!("Expected {} and found {}, tolerance {}.", tgt, guess, tol);
    }
    passed
}

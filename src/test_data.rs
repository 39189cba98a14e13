//! Soundings used in tests.

use crate::{
    parcel::Parcel,
    parcel_profile::AscentCurve,
    sounding::{Sounding, StationInfo},
};
use metfor::{Celsius, HectoPascal, Knots, Meters, Quantity, WindSpdDir};
use optional::{some, Optioned};

fn build(
    pres: &[f64],
    hgt: &[f64],
    temp: &[f64],
    dp: &[f64],
    wind: &[(f64, f64)],
) -> Sounding {
    let pressure: Vec<Optioned<HectoPascal>> = pres.iter().cloned().map(HectoPascal).map(some).collect();
    let height: Vec<Optioned<Meters>> = hgt.iter().cloned().map(Meters).map(some).collect();
    let temperature: Vec<Optioned<Celsius>> = temp.iter().cloned().map(Celsius).map(some).collect();
    let dew_point: Vec<Optioned<Celsius>> = dp.iter().cloned().map(Celsius).map(some).collect();
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
        .with_source_description("test data".to_owned())
        .with_pressure_profile(pressure)
        .with_height_profile(height)
        .with_temperature_profile(temperature)
        .with_dew_point_profile(dew_point)
        .with_wind_profile(wind)
}

/// A warm, moist, conditionally unstable sounding with winds veering from southerly to westerly.
pub fn make_test_sounding() -> Sounding {
    let pres = [
        1000.0, 975.0, 950.0, 925.0, 900.0, 850.0, 800.0, 750.0, 700.0, 650.0, 600.0, 550.0,
        500.0, 400.0, 300.0, 250.0, 200.0, 150.0, 100.0,
    ];
    let hgt = [
        110.0, 340.0, 570.0, 800.0, 1030.0, 1500.0, 2000.0, 2520.0, 3070.0, 3650.0, 4260.0,
        4910.0, 5600.0, 7200.0, 9200.0, 10450.0, 11900.0, 13700.0, 16300.0,
    ];
    let temp = [
        30.0, 27.5, 25.0, 23.0, 21.0, 17.5, 14.0, 10.5, 7.0, 3.0, -1.0, -5.5, -10.5, -22.0,
        -37.0, -46.0, -55.0, -60.0, -64.0,
    ];
    let dp = [
        22.0, 21.0, 20.0, 18.0, 16.0, 13.0, 8.0, 3.0, -2.0, -8.0, -14.0, -20.0, -26.0, -38.0,
        -50.0, -58.0, -65.0, -72.0, -80.0,
    ];
    let wind = [
        (170.0, 10.0),
        (180.0, 15.0),
        (190.0, 20.0),
        (200.0, 25.0),
        (210.0, 28.0),
        (220.0, 30.0),
        (230.0, 32.0),
        (235.0, 35.0),
        (240.0, 38.0),
        (245.0, 40.0),
        (250.0, 45.0),
        (255.0, 48.0),
        (260.0, 50.0),
        (265.0, 60.0),
        (270.0, 70.0),
        (270.0, 75.0),
        (270.0, 80.0),
        (270.0, 60.0),
        (270.0, 40.0),
    ];

    build(&pres, &hgt, &temp, &dp, &wind)
        .with_station_info(StationInfo::new().with_station_id("TEST").with_lat_lon((40.0, -100.0)))
}

/// Five mandatory levels, dew point depression of 5C everywhere and calm winds.
pub fn make_five_level_sounding() -> Sounding {
    let pres = [1000.0, 850.0, 700.0, 500.0, 300.0];
    let hgt = [100.0, 1500.0, 3000.0, 5600.0, 9200.0];
    let temp = [20.0, 10.0, 0.0, -20.0, -45.0];
    let dp: Vec<f64> = temp.iter().map(|t| t - 5.0).collect();
    let wind = [(0.0, 0.0); 5];

    build(&pres, &hgt, &temp, &dp, &wind)
}

/// Dry and warming with height, nothing can convect.
pub fn make_stable_sounding() -> Sounding {
    let pres = [1000.0, 850.0, 700.0, 500.0, 300.0];
    let hgt = [100.0, 1450.0, 3000.0, 5650.0, 9400.0];
    let temp = [0.0, 5.0, 8.0, 5.0, -5.0];
    let dp: Vec<f64> = temp.iter().map(|t| t - 20.0).collect();
    let wind = [(270.0, 10.0); 5];

    build(&pres, &hgt, &temp, &dp, &wind)
}

/// Saturated at every level.
pub fn make_saturated_sounding() -> Sounding {
    let pres = [1000.0, 900.0, 800.0, 700.0, 500.0];
    let hgt = [100.0, 990.0, 1950.0, 3010.0, 5570.0];
    let temp = [15.0, 10.0, 5.0, -1.0, -18.0];
    let wind = [(200.0, 5.0), (220.0, 10.0), (240.0, 15.0), (250.0, 20.0), (260.0, 30.0)];

    build(&pres, &hgt, &temp, &temp, &wind)
}

/// The surface parcel of the soundings built around a parcel curve.
pub const SURFACE_PARCEL: Parcel = Parcel {
    pressure: HectoPascal(1000.0),
    temperature: Celsius(30.0),
    dew_point: Celsius(22.0),
};

// Environment temperatures offset from the path of `SURFACE_PARCEL`, positive offsets are warmer
// than the parcel. The first level is the parcel.
fn build_around_parcel(offsets: &[f64]) -> Sounding {
    let pres = [
        1000.0, 950.0, 900.0, 850.0, 800.0, 700.0, 600.0, 500.0, 400.0, 300.0, 250.0, 200.0,
        150.0,
    ];
    let hgt = [
        110.0, 540.0, 990.0, 1460.0, 1950.0, 3010.0, 4200.0, 5570.0, 7180.0, 9160.0, 10360.0,
        11790.0, 13610.0,
    ];
    assert_eq!(offsets.len(), pres.len());

    let curve = AscentCurve::new(&SURFACE_PARCEL).unwrap();
    let temp: Vec<f64> = pres
        .iter()
        .zip(offsets)
        .map(|(&p, dt)| curve.temperature_at(HectoPascal(p)).unwrap().unpack() + dt)
        .collect();
    let mut dp: Vec<f64> = temp.iter().map(|t| t - 10.0).collect();
    dp[0] = SURFACE_PARCEL.dew_point.unpack();
    let wind = [(240.0, 20.0); 13];

    build(&pres, &hgt, &temp, &dp, &wind)
}

/// The surface parcel has two buoyant layers, split by a stable layer from 600 to 400 hPa.
pub fn make_two_buoyant_layer_sounding() -> Sounding {
    build_around_parcel(&[
        0.0, 1.0, 1.0, 1.0, 1.0, -2.0, -2.0, 2.0, 2.0, -3.0, -3.0, 3.0, 5.0,
    ])
}

/// The surface parcel is already warmer than its environment at the LCL.
pub fn make_buoyant_at_lcl_sounding() -> Sounding {
    build_around_parcel(&[
        0.0, -2.0, -2.0, -2.0, -2.0, -2.0, -2.0, -2.0, -2.0, -2.0, 2.0, 4.0, 6.0,
    ])
}

/// Compare two floating point values.
pub fn approx_equal(tgt: f64, guess: f64, tol: f64) -> bool {
    assert!(tol > 0.0);

    let passed = (tgt - guess).abs() <= tol;
    if !passed {
        println!("Expected {} and found {}, tolerance {}.", tgt, guess, tol);
    }
    passed
}

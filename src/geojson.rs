//! Load sounding documents in GeoJSON format and turn them into a [`Sounding`].
//!
//! Each `Point` feature of the document is one level of the sounding. Its properties carry the
//! pressure (hPa), temperature and dew point (K), wind components and geopotential height (m).
//! The document's top level properties carry the station location, the station id and the
//! observation time as Unix seconds.
use crate::{
    error::InputError,
    keys::WindUnits,
    sounding::{Sounding, StationInfo},
};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use log::{debug, warn};
use metfor::{Celsius, HectoPascal, Kelvin, Knots, Meters, MetersPSec, WindSpdDir, WindUV};
use optional::{none, some, Optioned};
use serde::{Deserialize, Deserializer};
use std::{fs, path::Path};

/// Settings for reading sounding documents.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct IngestOptions {
    /// Units of the `wind_u` and `wind_v` properties.
    pub wind_units: WindUnits,
    /// Hours added to the document timestamp before it is stored as the valid time.
    pub timestamp_offset_hours: i64,
}

impl Default for IngestOptions {
    fn default() -> Self {
        IngestOptions {
            wind_units: WindUnits::MetersPerSecond,
            timestamp_offset_hours: 0,
        }
    }
}

/// A sounding document as it appears on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct SoundingDocument {
    /// One feature per level.
    pub features: Vec<Feature>,
    /// Document wide metadata.
    #[serde(default)]
    pub properties: DocumentProperties,
}

/// A GeoJSON feature.
#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    /// Only `Point` geometries are sounding levels.
    pub geometry: Option<Geometry>,
    /// Values at this level.
    #[serde(default)]
    pub properties: LevelProperties,
}

/// The geometry of a feature, only its type is used.
#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    /// The GeoJSON geometry type, e.g. `Point`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// The values observed at one level.
///
/// The outer `Option` is `None` when the key is absent from the document, the inner one is `None`
/// when the value is `null`.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct LevelProperties {
    #[serde(deserialize_with = "nullable")]
    pub pressure: Option<Option<f64>>,
    #[serde(deserialize_with = "nullable")]
    pub temp: Option<Option<f64>>,
    #[serde(deserialize_with = "nullable")]
    pub dewpoint: Option<Option<f64>>,
    #[serde(deserialize_with = "nullable")]
    pub wind_u: Option<Option<f64>>,
    #[serde(deserialize_with = "nullable")]
    pub wind_v: Option<Option<f64>>,
    #[serde(deserialize_with = "nullable")]
    pub gpheight: Option<Option<f64>>,
    pub time: Option<f64>,
}

// A present key, possibly null.
fn nullable<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}

/// Metadata for the whole sounding.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DocumentProperties {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub station_id: Option<serde_json::Value>,
    pub syn_timestamp: Option<f64>,
}

/// Read a sounding document from a file.
pub fn load_geojson(path: &Path) -> Result<SoundingDocument, InputError> {
    let text = fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let doc = serde_json::from_str(&text)?;
    debug!("loaded {}", path.display());

    Ok(doc)
}

/// Build a validated sounding from a document.
///
/// The document must carry `lat`, `lon` and `station_id`, and every level must carry all of its
/// properties, otherwise the document is rejected with [`InputError::MissingProperty`]. A `null`
/// value is a missing observation.
///
/// Levels must arrive from the surface upward. A level whose pressure is `null`, or is not lower
/// than the level below it, is dropped with a warning.
pub fn parse_sounding(doc: &SoundingDocument, opts: &IngestOptions) -> Result<Sounding, InputError> {
    let mut pressure: Vec<Optioned<HectoPascal>> = vec![];
    let mut temperature: Vec<Optioned<Celsius>> = vec![];
    let mut dew_point: Vec<Optioned<Celsius>> = vec![];
    let mut wind: Vec<Optioned<WindSpdDir<Knots>>> = vec![];
    let mut height: Vec<Optioned<Meters>> = vec![];

    let levels = doc
        .features
        .iter()
        .filter(|f| f.geometry.as_ref().map(|g| g.kind == "Point").unwrap_or(false))
        .map(|f| &f.properties);

    let mut last_p: Option<f64> = None;
    for props in levels {
        let p = match required(props.pressure, "pressure")? {
            Some(p) => p,
            None => {
                warn!("dropping level without a pressure");
                continue;
            }
        };
        let t = required(props.temp, "temp")?;
        let dp = required(props.dewpoint, "dewpoint")?;
        let u = required(props.wind_u, "wind_u")?;
        let v = required(props.wind_v, "wind_v")?;
        let hgt = required(props.gpheight, "gpheight")?;

        if let Some(below) = last_p {
            if p >= below {
                warn!("dropping level at {} hPa, pressure must decrease upward", p);
                continue;
            }
        }
        last_p = Some(p);

        pressure.push(some(HectoPascal(p)));
        temperature.push(kelvin_to_celsius(t));
        dew_point.push(kelvin_to_celsius(dp));
        wind.push(to_wind(u, v, opts.wind_units));
        height.push(hgt.map(Meters).into());
    }

    let properties = &doc.properties;
    let lat = properties.lat.ok_or(InputError::MissingProperty("lat"))?;
    let lon = properties.lon.ok_or(InputError::MissingProperty("lon"))?;
    let station_id = properties
        .station_id
        .as_ref()
        .and_then(station_id_string)
        .ok_or(InputError::MissingProperty("station_id"))?;

    let mut station = StationInfo::new()
        .with_lat_lon((lat, lon))
        .with_station_id(station_id);
    if let Some(elevation) = height.first().and_then(|h| h.into_option()) {
        station = station.with_elevation(elevation);
    }

    let valid_time = valid_time(doc, opts.timestamp_offset_hours)?;

    let snd = Sounding::new()
        .with_station_info(station)
        .with_valid_time(valid_time)
        .with_pressure_profile(pressure)
        .with_temperature_profile(temperature)
        .with_dew_point_profile(dew_point)
        .with_wind_profile(wind)
        .with_height_profile(height);

    snd.validate()?;

    Ok(snd)
}

fn required(val: Option<Option<f64>>, name: &'static str) -> Result<Option<f64>, InputError> {
    val.ok_or(InputError::MissingProperty(name))
}

fn kelvin_to_celsius(val: Option<f64>) -> Optioned<Celsius> {
    val.map(|k| Celsius::from(Kelvin(k))).into()
}

fn to_wind(u: Option<f64>, v: Option<f64>, units: WindUnits) -> Optioned<WindSpdDir<Knots>> {
    match (u, v) {
        (Some(u), Some(v)) => {
            let (u, v) = match units {
                WindUnits::MetersPerSecond => {
                    (Knots::from(MetersPSec(u)), Knots::from(MetersPSec(v)))
                }
                WindUnits::Knots => (Knots(u), Knots(v)),
            };
            some(WindSpdDir::from(WindUV { u, v }))
        }
        _ => none(),
    }
}

fn station_id_string(val: &serde_json::Value) -> Option<String> {
    match val {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

// Document timestamp, else the first level's time, shifted by the offset.
fn valid_time(doc: &SoundingDocument, offset_hours: i64) -> Result<NaiveDateTime, InputError> {
    let stamp = doc
        .properties
        .syn_timestamp
        .or_else(|| doc.features.first().and_then(|f| f.properties.time))
        .ok_or(InputError::MissingProperty("syn_timestamp"))?;

    let secs = stamp.floor();
    let nanos = ((stamp - secs) * 1.0e9).round() as u32;

    DateTime::<Utc>::from_timestamp(secs as i64, nanos)
        .map(|dt| dt.naive_utc())
        .and_then(|vt| vt.checked_add_signed(Duration::hours(offset_hours)))
        .ok_or(InputError::MissingProperty("syn_timestamp"))
}

//! Reverse geocoding of the sounding location to a place name for the diagram title.
//!
//! Lookups are best effort. A failed lookup is logged and the diagram is labeled with
//! [`UNKNOWN_LOCATION`] instead.
use log::{debug, warn};
use serde::Deserialize;
use std::{collections::HashMap, time::Duration};

/// Name used when no place name can be found.
pub const UNKNOWN_LOCATION: &str = "Unknown City";

/// Something that can turn a latitude and longitude into a place name.
pub trait ReverseGeocoder {
    /// Look up a place name, `None` if there is no answer.
    fn locate(&mut self, lat: f64, lon: f64) -> Option<String>;

    /// Look up a place name, falling back to [`UNKNOWN_LOCATION`].
    fn locate_or_unknown(&mut self, lat: f64, lon: f64) -> String {
        self.locate(lat, lon)
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_owned())
    }
}

/// Settings for the geocoding service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeocodingOptions {
    /// Use the network service at all.
    pub enabled: bool,
    /// Reverse geocoding endpoint.
    pub endpoint: String,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GeocodingOptions {
    fn default() -> Self {
        GeocodingOptions {
            enabled: true,
            endpoint: "https://nominatim.openstreetmap.org/reverse".to_owned(),
            user_agent: "SkewTdiagram".to_owned(),
            timeout_secs: 10,
        }
    }
}

/// Pick a locality name out of a Nominatim `address` object.
///
/// A city wins. Otherwise a town, village or county is used, with a leading "town of" or
/// "village of" removed.
pub fn locality_from_address(address: &serde_json::Value) -> Option<String> {
    let field = |key: &str| {
        address
            .get(key)
            .and_then(|val| val.as_str())
            .map(str::trim)
            .filter(|val| !val.is_empty())
    };

    if let Some(city) = field("city") {
        return Some(city.to_owned());
    }

    let locality = field("town")
        .or_else(|| field("village"))
        .or_else(|| field("county"))?;

    let lower = locality.to_lowercase();
    for prefix in &["town of", "village of"] {
        if lower.contains(prefix) {
            return Some(lower.replace(prefix, "").trim().to_owned());
        }
    }

    Some(locality.to_owned())
}

/// Reverse geocoder backed by a Nominatim HTTP service.
#[derive(Debug)]
pub struct NominatimGeocoder {
    client: reqwest::blocking::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<serde_json::Value>,
}

impl NominatimGeocoder {
    /// Create a client for the service described by `opts`.
    pub fn new(opts: &GeocodingOptions) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(opts.user_agent.clone())
            .timeout(Duration::from_secs(opts.timeout_secs))
            .build()?;

        Ok(NominatimGeocoder {
            client,
            endpoint: opts.endpoint.clone(),
        })
    }

    fn request(&self, lat: f64, lon: f64) -> Result<Option<String>, reqwest::Error> {
        let response: ReverseResponse = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("format", "jsonv2".to_owned()),
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
            ])
            .send()?
            .error_for_status()?
            .json()?;

        Ok(response.address.as_ref().and_then(locality_from_address))
    }
}

impl ReverseGeocoder for NominatimGeocoder {
    fn locate(&mut self, lat: f64, lon: f64) -> Option<String> {
        match self.request(lat, lon) {
            Ok(name) => name,
            Err(err) => {
                warn!("reverse geocoding ({:.2}, {:.2}) failed: {}", lat, lon, err);
                None
            }
        }
    }
}

/// Never looks anything up.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGeocoder;

impl ReverseGeocoder for OfflineGeocoder {
    fn locate(&mut self, _lat: f64, _lon: f64) -> Option<String> {
        None
    }
}

/// Remembers answers from another geocoder, keyed by the location rounded to 0.01 degrees.
///
/// Misses are remembered too, so a failing service is asked only once per location.
#[derive(Debug)]
pub struct CachedGeocoder<G> {
    inner: G,
    cache: HashMap<(i64, i64), Option<String>>,
}

impl<G: ReverseGeocoder> CachedGeocoder<G> {
    /// Wrap a geocoder.
    pub fn new(inner: G) -> Self {
        CachedGeocoder {
            inner,
            cache: HashMap::new(),
        }
    }

    fn key(lat: f64, lon: f64) -> (i64, i64) {
        ((lat * 100.0).round() as i64, (lon * 100.0).round() as i64)
    }
}

impl<G: ReverseGeocoder> ReverseGeocoder for CachedGeocoder<G> {
    fn locate(&mut self, lat: f64, lon: f64) -> Option<String> {
        let key = Self::key(lat, lon);
        if let Some(name) = self.cache.get(&key) {
            debug!("geocoder cache hit for ({:.2}, {:.2})", lat, lon);
            return name.clone();
        }

        let name = self.inner.locate(lat, lon);
        self.cache.insert(key, name.clone());
        name
    }
}

/// Build the geocoder for a run, offline when disabled or if the HTTP client cannot be created.
pub fn make_geocoder(opts: &GeocodingOptions, offline: bool) -> Box<dyn ReverseGeocoder> {
    if offline || !opts.enabled {
        return Box::new(OfflineGeocoder);
    }

    match NominatimGeocoder::new(opts) {
        Ok(geocoder) => Box::new(CachedGeocoder::new(geocoder)),
        Err(err) => {
            warn!("geocoding disabled, cannot build HTTP client: {}", err);
            Box::new(OfflineGeocoder)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_city_wins() {
        let addr = json!({"city": "Barcelona", "town": "Gràcia", "county": "Barcelonès"});
        assert_eq!(locality_from_address(&addr).unwrap(), "Barcelona");
    }

    #[test]
    fn test_locality_prefixes_are_stripped() {
        let addr = json!({"town": "Town of Dryden"});
        assert_eq!(locality_from_address(&addr).unwrap(), "dryden");

        let addr = json!({"village": "Village of Lake Placid"});
        assert_eq!(locality_from_address(&addr).unwrap(), "lake placid");

        let addr = json!({"county": "Missoula County"});
        assert_eq!(locality_from_address(&addr).unwrap(), "Missoula County");
    }

    #[test]
    fn test_no_locality() {
        assert_eq!(locality_from_address(&json!({"country": "Spain"})), None);
        assert_eq!(locality_from_address(&json!({"city": "  "})), None);
    }

    struct CountingGeocoder {
        calls: usize,
        answer: Option<String>,
    }

    impl ReverseGeocoder for CountingGeocoder {
        fn locate(&mut self, _lat: f64, _lon: f64) -> Option<String> {
            self.calls += 1;
            self.answer.clone()
        }
    }

    #[test]
    fn test_cache_by_rounded_location() {
        let mut geocoder = CachedGeocoder::new(CountingGeocoder {
            calls: 0,
            answer: Some("Missoula".to_owned()),
        });

        assert_eq!(geocoder.locate(46.9211, -114.0923).unwrap(), "Missoula");
        assert_eq!(geocoder.locate(46.9189, -114.0941).unwrap(), "Missoula");
        assert_eq!(geocoder.inner.calls, 1);

        geocoder.locate(47.5, -114.0);
        assert_eq!(geocoder.inner.calls, 2);
    }

    #[test]
    fn test_misses_fall_back_to_unknown() {
        let mut geocoder = CachedGeocoder::new(CountingGeocoder {
            calls: 0,
            answer: None,
        });

        assert_eq!(geocoder.locate_or_unknown(10.0, 10.0), UNKNOWN_LOCATION);
        assert_eq!(geocoder.locate_or_unknown(10.0, 10.0), UNKNOWN_LOCATION);
        assert_eq!(geocoder.inner.calls, 1);

        assert_eq!(OfflineGeocoder.locate_or_unknown(0.0, 0.0), UNKNOWN_LOCATION);
        assert!(matches!(
            make_geocoder(&GeocodingOptions::default(), true).locate(1.0, 1.0),
            None
        ));
    }
}

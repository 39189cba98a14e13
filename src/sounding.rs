//! Data type and methods to store an atmospheric sounding.

use crate::error::{AnalysisError, Result};
use chrono::NaiveDateTime;
use metfor::{Celsius, HectoPascal, Knots, Meters, MetersPSec, Quantity, WindSpdDir, WindUV};
use optional::Optioned;

pub use self::{data_row::DataRow, station_info::StationInfo};

/// All the variables stored in the sounding.
///
/// The upper air profile variables are stored in parallel vectors ordered from the lowest level
/// (highest pressure) to the top. The first level is the surface. If a profile lacks a certain
/// variable that whole vector has length 0 instead of being full of missing values.
#[derive(Clone, Debug, Default)]
pub struct Sounding {
    // Description of the source of the sounding, usually the file it came from.
    source: Option<String>,

    // Station info
    station: StationInfo,

    // Valid time of sounding
    valid_time: Option<NaiveDateTime>,

    // Profiles
    pressure: Vec<Optioned<HectoPascal>>,
    temperature: Vec<Optioned<Celsius>>,
    dew_point: Vec<Optioned<Celsius>>,
    wind: Vec<Optioned<WindSpdDir<Knots>>>,
    height: Vec<Optioned<Meters>>,
}

macro_rules! make_profile_builder {
    ($(#[$attr:meta])* => $name:ident, $inner_type:ty, $p_var:ident) => {
        $(#[$attr])*
        #[inline]
        pub fn $name(self, profile: Vec<Optioned<$inner_type>>) -> Self {
            Self {$p_var: profile, ..self}
        }
    };
}

impl Sounding {
    /// Create a new sounding with default values. This is a proxy for default with a clearer name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use skewt_analysis::Sounding;
    ///
    /// let snd = Sounding::new();
    /// assert!(snd.pressure_profile().is_empty());
    /// ```
    #[inline]
    pub fn new() -> Self {
        Sounding::default()
    }

    /// Add a source description to this sounding.
    #[inline]
    pub fn with_source_description<S>(mut self, desc: S) -> Self
    where
        Option<String>: From<S>,
    {
        self.source = Option::from(desc);
        self
    }

    /// Retrieve a source description for this sounding.
    #[inline]
    pub fn source_description(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Builder function for setting the station info.
    #[inline]
    pub fn with_station_info(mut self, new_value: StationInfo) -> Self {
        self.station = new_value;
        self
    }

    /// Get the station info
    #[inline]
    pub fn station_info(&self) -> &StationInfo {
        &self.station
    }

    /// Builder method for the valid time.
    #[inline]
    pub fn with_valid_time<T>(mut self, valid_time: T) -> Self
    where
        Option<NaiveDateTime>: From<T>,
    {
        self.valid_time = Option::from(valid_time);
        self
    }

    /// Get the valid time of the sounding.
    #[inline]
    pub fn valid_time(&self) -> Option<NaiveDateTime> {
        self.valid_time
    }

    make_profile_builder!(
        /// Builder method for the pressure profile.
        ///
        /// # Examples
        /// ```rust
        /// use skewt_analysis::Sounding;
        /// use metfor::HectoPascal;
        /// use optional::{some, Optioned};
        ///
        /// let data = vec![1000.0, 925.0, 850.0, 700.0, 500.0, 300.0, 250.0, 200.0];
        /// let pressure_data: Vec<Optioned<HectoPascal>> = data.into_iter()
        ///     .map(HectoPascal)
        ///     .map(some)
        ///     .collect();
        ///
        /// let snd = Sounding::new().with_pressure_profile(pressure_data);
        /// assert_eq!(snd.pressure_profile().len(), 8);
        /// ```
        => with_pressure_profile, HectoPascal, pressure
    );

    /// Get the pressure profile
    #[inline]
    pub fn pressure_profile(&self) -> &[Optioned<HectoPascal>] {
        &self.pressure
    }

    make_profile_builder!(
        /// Builder method for the temperature profile.
        => with_temperature_profile, Celsius, temperature
    );

    /// Get the temperature profile.
    #[inline]
    pub fn temperature_profile(&self) -> &[Optioned<Celsius>] {
        &self.temperature
    }

    make_profile_builder!(
        /// Builder method for the dew point profile.
        => with_dew_point_profile, Celsius, dew_point
    );

    /// Get the dew point profile.
    #[inline]
    pub fn dew_point_profile(&self) -> &[Optioned<Celsius>] {
        &self.dew_point
    }

    make_profile_builder!(
        /// Builder method for the wind profile.
        => with_wind_profile, WindSpdDir<Knots>, wind
    );

    /// Get the wind profile.
    #[inline]
    pub fn wind_profile(&self) -> &[Optioned<WindSpdDir<Knots>>] {
        &self.wind
    }

    make_profile_builder!(
        /// Builder method for the geopotential height profile.
        => with_height_profile, Meters, height
    );

    /// Get the geopotential height profile.
    #[inline]
    pub fn height_profile(&self) -> &[Optioned<Meters>] {
        &self.height
    }

    /// Number of levels in the sounding, including the surface.
    #[inline]
    pub fn len(&self) -> usize {
        self.pressure.len()
    }

    /// True if there are no levels at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pressure.is_empty()
    }

    /// The elevation of the station, or the height of the lowest level if the station elevation
    /// was never set.
    pub fn surface_height(&self) -> Optioned<Meters> {
        if self.station.elevation().is_some() {
            return self.station.elevation();
        }

        self.height
            .iter()
            .cloned()
            .find(|h| h.is_some())
            .unwrap_or_default()
    }

    /// Check the invariants the analysis routines rely on.
    ///
    /// Every non-empty profile must be as long as the pressure profile, pressures must be positive
    /// and strictly decreasing with height.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use skewt_analysis::Sounding;
    /// use metfor::HectoPascal;
    /// use optional::some;
    ///
    /// let good = Sounding::new()
    ///     .with_pressure_profile(vec![some(HectoPascal(1000.0)), some(HectoPascal(900.0))]);
    /// assert!(good.validate().is_ok());
    ///
    /// let bad = Sounding::new()
    ///     .with_pressure_profile(vec![some(HectoPascal(900.0)), some(HectoPascal(1000.0))]);
    /// assert!(bad.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.pressure.is_empty() {
            return Err(AnalysisError::MissingProfile);
        }

        let len = self.pressure.len();
        let lengths = [
            self.temperature.len(),
            self.dew_point.len(),
            self.wind.len(),
            self.height.len(),
        ];
        if lengths.iter().any(|&l| l != 0 && l != len) {
            return Err(AnalysisError::InvalidInput);
        }

        let mut last_p: Option<HectoPascal> = None;
        for p in self.pressure.iter().filter_map(|p| p.into_option()) {
            if p.unpack() <= 0.0 {
                return Err(AnalysisError::InvalidInput);
            }
            if let Some(last_p) = last_p {
                if p >= last_p {
                    return Err(AnalysisError::InvalidInput);
                }
            }
            last_p = Some(p);
        }

        if last_p.is_none() {
            return Err(AnalysisError::NoDataProfile);
        }

        Ok(())
    }

    /// Get a bottom up iterator over the data rows. The first value returned is the surface.
    #[inline]
    pub fn bottom_up(&self) -> impl Iterator<Item = DataRow> + '_ {
        ProfileIterator {
            next_idx: 0,
            src: self,
        }
    }

    /// Get a row of data values from this sounding.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use metfor::{HectoPascal, Celsius};
    /// use optional::some;
    /// use skewt_analysis::Sounding;
    ///
    /// let pres: Vec<_> = vec![1000.0, 925.0, 850.0].into_iter()
    ///     .map(HectoPascal).map(some).collect();
    /// let temps: Vec<_> = vec![20.0, 18.0, 17.0].into_iter()
    ///     .map(Celsius).map(some).collect();
    ///
    /// let snd = Sounding::new()
    ///     .with_pressure_profile(pres)
    ///     .with_temperature_profile(temps);
    ///
    /// let row = snd.data_row(0).unwrap(); // This is the surface
    /// assert_eq!(row.pressure.unwrap(), HectoPascal(1000.0));
    /// assert_eq!(row.temperature.unwrap(), Celsius(20.0));
    /// assert!(row.wind.is_none()); // We never set wind profile.
    ///
    /// assert!(snd.data_row(3).is_none()); // There weren't that many rows!
    /// ```
    #[inline]
    pub fn data_row(&self, idx: usize) -> Option<DataRow> {
        macro_rules! copy_to_result {
            ($result:ident, $profile:ident, $idx:ident) => {
                if let Some(opt_val) = self.$profile.get($idx) {
                    $result.$profile = *opt_val;
                }
            };
        }

        if idx >= self.pressure.len() {
            return None;
        }

        let mut result = DataRow::default();

        copy_to_result!(result, pressure, idx);
        copy_to_result!(result, temperature, idx);
        copy_to_result!(result, dew_point, idx);
        copy_to_result!(result, wind, idx);
        copy_to_result!(result, height, idx);

        Some(result)
    }

    /// The wind profile as u and v components in m/s, missing values are `None`.
    pub fn wind_uv_ms(&self) -> Vec<Option<WindUV<MetersPSec>>> {
        self.wind
            .iter()
            .map(|w| w.into_option().map(WindUV::<MetersPSec>::from))
            .collect()
    }
}

/// Iterator over the data rows of a sounding, starting at the surface.
struct ProfileIterator<'a> {
    next_idx: usize,
    src: &'a Sounding,
}

impl<'a> Iterator for ProfileIterator<'a> {
    type Item = DataRow;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let result = self.src.data_row(self.next_idx);
        self.next_idx += 1;
        result
    }
}


mod data_row;
mod station_info;

use metfor::Meters;
use optional::Optioned;

/// Station information including location, identification and a human readable place name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StationInfo {
    /// Station identifier as it appeared in the source document, eg "72786" or "KOTX".
    id: Option<String>,
    /// Latitude and longitude.
    location: Option<(f64, f64)>,
    /// Elevation, this may be in model terrain which is not necessarily the same as the real world.
    elevation: Optioned<Meters>,
    /// Place name from a reverse geocoder.
    name: Option<String>,
}

impl StationInfo {
    /// Create a new object with default values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use skewt_analysis::StationInfo;
    ///
    /// assert!(StationInfo::new().station_id().is_none());
    /// assert!(StationInfo::new().location().is_none());
    /// assert!(StationInfo::new().elevation().is_none());
    /// assert!(StationInfo::new().name().is_none());
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to add a station identifier.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use skewt_analysis::StationInfo;
    ///
    /// assert_eq!(StationInfo::new().with_station_id("72786").station_id(), Some("72786"));
    /// ```
    #[inline]
    pub fn with_station_id<T>(mut self, id: T) -> Self
    where
        T: Into<String>,
    {
        self.id = Some(id.into());
        self
    }

    /// Builder method to add a location.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use skewt_analysis::StationInfo;
    ///
    /// assert_eq!(
    ///     StationInfo::new().with_lat_lon((45.0, -116.0)).location().unwrap(), (45.0, -116.0));
    /// assert_eq!(
    ///     StationInfo::new().with_lat_lon(Some((45.0, -116.0)))
    ///         .location()
    ///         .unwrap(),
    ///     (45.0, -116.0));
    /// ```
    #[inline]
    pub fn with_lat_lon<T>(mut self, coords: T) -> Self
    where
        Option<(f64, f64)>: From<T>,
    {
        self.location = Option::from(coords);
        self
    }

    /// Builder method to add elevation.
    ///
    /// # Examples
    ///```rust
    /// use metfor::Meters;
    /// use skewt_analysis::StationInfo;
    /// use optional::{some, none};
    ///
    /// let _info = StationInfo::new().with_elevation(Meters(200.0));
    /// let _info = StationInfo::new().with_elevation(some(Meters(200.0)));
    /// let _info = StationInfo::new().with_elevation(none::<Meters>());
    ///```
    #[inline]
    pub fn with_elevation<T>(mut self, elev: T) -> Self
    where
        Optioned<Meters>: From<T>,
    {
        self.elevation = Optioned::from(elev);
        self
    }

    /// Builder method to add a place name.
    #[inline]
    pub fn with_name<T>(mut self, name: T) -> Self
    where
        T: Into<String>,
    {
        self.name = Some(name.into());
        self
    }

    /// Station identifier.
    #[inline]
    pub fn station_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Latitude and longitude.
    #[inline]
    pub fn location(&self) -> Option<(f64, f64)> {
        self.location
    }

    /// Latitude alone, if the location is known.
    #[inline]
    pub fn latitude(&self) -> Option<f64> {
        self.location.map(|(lat, _)| lat)
    }

    /// Elevation in meters, this may be in model terrain, not necessarily the same as
    /// the real world.
    #[inline]
    pub fn elevation(&self) -> Optioned<Meters> {
        self.elevation
    }

    /// Place name, if one was attached.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

//! Enums used as keys for setting options in functions.
use serde::Deserialize;
use strum_macros::{Display, EnumIter, EnumString};

/// Which crossing to pick when a parcel or mixing-ratio line crosses the environment more than
/// once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CrossingPolicy {
    /// The lowest crossing, closest to the surface.
    Bottom,
    /// The highest crossing.
    Top,
}

/// How the sign of the Coriolis parameter is treated in the thermal wind advection estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CoriolisConvention {
    /// f = 2Ω sin(lat), negative in the southern hemisphere.
    Signed,
    /// f = |2Ω sin(lat)|.
    Absolute,
}

/// Units of the `wind_u` and `wind_v` properties in input documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WindUnits {
    /// Meters per second.
    MetersPerSecond,
    /// Knots.
    Knots,
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_keys_round_trip_through_strings() {
        for policy in CrossingPolicy::iter() {
            let name = policy.to_string();
            assert_eq!(CrossingPolicy::from_str(&name).unwrap(), policy);
        }
        for conv in CoriolisConvention::iter() {
            let name = conv.to_string();
            assert_eq!(CoriolisConvention::from_str(&name).unwrap(), conv);
        }

        assert_eq!(WindUnits::from_str("meters_per_second").unwrap(), WindUnits::MetersPerSecond);
        assert!(CrossingPolicy::from_str("middle").is_err());
    }
}

//! This module defines layers of the atmosphere and the ways to pick them out of a sounding.
use crate::{
    error::{AnalysisError::MissingValue, Result},
    levels::height_level,
    sounding::{DataRow, Sounding},
};
use metfor::Meters;

/// A layer in the atmosphere described by the values at the top and bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    /// Sounding values at the bottom of the layer.
    pub bottom: DataRow,
    /// Sounding values at the top of the layer.
    pub top: DataRow,
}

/// Get a layer from the surface up to a height above ground level, like 3km or 6km.
///
/// Ground level is the station elevation, or the lowest height in the profile if the elevation is
/// unknown.
#[inline]
pub fn layer_agl(snd: &Sounding, meters_agl: Meters) -> Result<Layer> {
    let sfc_height = snd.surface_height().ok_or(MissingValue)?;
    let tgt_elev = sfc_height + meters_agl;

    let bottom = snd
        .bottom_up()
        .find(|row| row.pressure.is_some() && row.height.is_some())
        .ok_or(MissingValue)?;

    let top = height_level(tgt_elev, snd)?;
    Ok(Layer { bottom, top })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        error::AnalysisError,
        test_data::{approx_equal, make_test_sounding},
    };
    use metfor::{HectoPascal, Quantity};

    #[test]
    fn test_layer_agl() {
        let snd = make_test_sounding();
        let lyr = layer_agl(&snd, Meters(3000.0)).unwrap();

        assert_eq!(lyr.bottom.pressure.unwrap(), HectoPascal(1000.0));
        assert!(approx_equal(lyr.top.height.unwrap().unpack(), 3110.0, 1.0e-6));

        assert_eq!(
            layer_agl(&snd, Meters(30_000.0)),
            Err(AnalysisError::InterpolationError)
        );
    }
}

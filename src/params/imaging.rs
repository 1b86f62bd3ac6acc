// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};

use crate::{
    catalog::CatalogError,
    unit_parsing::{parse_angle, parse_velocity},
};

/// Deconvolution settings common to both passes of every line. Values are
/// CASA `tclean` parameters and keep CASA's quantity strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagingParams {
    pub deconvolver: String,

    /// Multiscale scales [pixels].
    pub scales: Vec<u32>,

    pub specmode: String,

    /// Velocity of the first channel.
    pub start: String,

    pub nchan: u32,

    pub outframe: String,

    pub interactive: bool,

    pub imsize: [u32; 2],

    pub cell: String,

    pub weighting: String,

    pub robust: f64,

    /// Elliptical taper: major axis, minor axis, position angle. The taper
    /// circularises the beam.
    pub uvtaper: Vec<String>,

    pub restoringbeam: String,
}

impl Default for ImagingParams {
    fn default() -> Self {
        ImagingParams {
            deconvolver: "multiscale".to_string(),
            scales: vec![0, 5, 10, 20],
            specmode: "cube".to_string(),
            start: "-3.0km/s".to_string(),
            nchan: 100,
            outframe: "LSRK".to_string(),
            interactive: false,
            imsize: [500, 500],
            cell: "0.03arcsec".to_string(),
            weighting: "briggs".to_string(),
            robust: 0.5,
            uvtaper: vec![
                "0.05arcsec".to_string(),
                "0.1483arcsec".to_string(),
                "26deg".to_string(),
            ],
            restoringbeam: "common".to_string(),
        }
    }
}

impl ImagingParams {
    /// Check the quantity strings. CASA would only complain about these once
    /// it's been handed visibilities.
    pub fn validate(&self) -> Result<(), CatalogError> {
        parse_velocity(&self.start).map_err(|source| CatalogError::BadImagingParam {
            param: "start",
            source,
        })?;
        let (cell, unit) = parse_angle(&self.cell).map_err(|source| {
            CatalogError::BadImagingParam {
                param: "cell",
                source,
            }
        })?;
        let cell = unit.to_arcsec(cell);
        if !cell.is_finite() || cell <= 0.0 {
            return Err(CatalogError::NonPositiveImagingParam {
                param: "cell",
                value: self.cell.clone(),
            });
        }
        // The last taper element is a position angle and may be negative.
        for (i, taper) in self.uvtaper.iter().enumerate() {
            let (value, unit) = parse_angle(taper).map_err(|source| {
                CatalogError::BadImagingParam {
                    param: "uvtaper",
                    source,
                }
            })?;
            let value = unit.to_arcsec(value);
            if !value.is_finite() || (i < 2 && value <= 0.0) {
                return Err(CatalogError::NonPositiveImagingParam {
                    param: "uvtaper",
                    value: taper.clone(),
                });
            }
        }
        Ok(())
    }
}

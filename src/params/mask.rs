// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};

/// Geometry and kinematics of the AA Tau disk, used to build Keplerian masks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskParams {
    /// Inclination [degrees].
    pub inc: f64,

    /// Position angle [degrees].
    pub pa: f64,

    /// Stellar mass [solar masses].
    pub mstar: f64,

    /// Distance [parsec].
    pub dist: f64,

    /// Systemic velocity [m/s].
    pub vlsr: f64,

    /// Disk-centre offset in RA [arcsec].
    pub dx0: f64,

    /// Disk-centre offset in Dec [arcsec].
    pub dy0: f64,

    /// Number of beams to smooth the mask by.
    pub nbeams: f64,

    /// Line width at 1 arcsec [m/s].
    pub dv0: f64,

    /// Power-law exponent of the line width's radial dependence.
    pub dvq: f64,
}

impl Default for MaskParams {
    fn default() -> Self {
        MaskParams {
            inc: 59.1,
            pa: 93.0 + 180.0,
            mstar: 0.62,
            dist: 145.0,
            vlsr: 6.445e3,
            dx0: 0.0065,
            dy0: -0.2573,
            nbeams: 2.0,
            dv0: 500.0,
            dvq: -0.5,
        }
    }
}

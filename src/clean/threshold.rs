// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fmt;

use serde::Serialize;

use crate::constants::{DEFAULT_THRESHOLD_MJY, JY_TO_MJY, RMS_MULTIPLIER};

/// The threshold of a line's final pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Threshold {
    /// Derived from the RMS of the line-free channels of the dirty cube.
    FromRms {
        /// The measured RMS [Jy].
        rms_jy: f64,

        /// The threshold, rounded to 0.1 mJy.
        mjy: f64,
    },

    /// The RMS couldn't be measured.
    Fallback,
}

impl Threshold {
    /// `RMS_MULTIPLIER` times the RMS, in mJy rounded to one decimal. A missing,
    /// non-finite or non-positive RMS gives the fallback.
    pub fn from_rms(rms_jy: Option<f64>) -> Threshold {
        match rms_jy {
            Some(rms_jy) if rms_jy.is_finite() && rms_jy > 0.0 => {
                let mjy = RMS_MULTIPLIER * rms_jy * JY_TO_MJY;
                // Round through the decimal representation so that what is
                // written is what is used.
                let mjy = format!("{mjy:.1}").parse().unwrap_or(mjy);
                Threshold::FromRms { rms_jy, mjy }
            }
            _ => Threshold::Fallback,
        }
    }

    pub fn mjy(self) -> f64 {
        match self {
            Threshold::FromRms { mjy, .. } => mjy,
            Threshold::Fallback => DEFAULT_THRESHOLD_MJY,
        }
    }

    pub fn is_fallback(self) -> bool {
        matches!(self, Threshold::Fallback)
    }
}

impl fmt::Display for Threshold {
    /// The imager's threshold string, e.g. "6.0mJy".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::FromRms { mjy, .. } => write!(f, "{mjy:.1}mJy"),
            Threshold::Fallback => write!(f, "{DEFAULT_THRESHOLD_MJY}mJy"),
        }
    }
}

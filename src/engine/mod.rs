// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The external imaging capabilities used to clean a line.
//!
//! Each capability is a trait so that the clean procedure doesn't care who
//! does the work. [CasaEngine] provides all of them by driving CASA.

mod casa;
mod error;

pub use casa::{CasaEngine, CasaFlavour};
pub use error::EngineError;

use std::path::Path;

use serde::Deserialize;

use crate::params::{ImagingParams, MaskParams};

/// Everything a deconvolution run needs.
#[derive(Debug, Clone)]
pub struct DeconvolveRequest<'a> {
    /// The visibilities to image.
    pub vis: &'a Path,

    /// The prefix of the images that are produced (e.g. `<imagename>.image`).
    pub imagename: &'a Path,

    /// e.g. "279.5117491GHz".
    pub restfreq: String,

    /// Channel width, e.g. "0.3km/s".
    pub width: &'a str,

    /// e.g. "5mJy".
    pub threshold: String,

    pub niter: u32,

    /// Restrict cleaning to this mask image.
    pub mask: Option<&'a Path>,

    pub imaging: &'a ImagingParams,
}

#[derive(Debug, Clone)]
pub struct StatsRequest<'a> {
    pub image: &'a Path,

    /// CASA channel selection, e.g. "0~30".
    pub chans: &'a str,
}

#[derive(Debug, Clone)]
pub struct MaskRequest<'a> {
    /// The image to make a mask for. The mask is written next to it.
    pub image: &'a Path,

    /// All rest frequencies of the line [Hz].
    pub restfreqs_hz: &'a [f64],

    pub params: &'a MaskParams,
}

#[derive(Debug, Clone)]
pub struct ExportRequest<'a> {
    pub image: &'a Path,
    pub fits: &'a Path,
    pub overwrite: bool,

    /// Drop the Stokes axis, leaving only spatial and spectral axes.
    pub drop_stokes: bool,
}

/// Image statistics. Each quantity is a list because CASA reports one value
/// per statistics region; only the first is used. Values that weren't finite
/// are `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ImageStats {
    #[serde(default)]
    pub rms: Vec<Option<f64>>,

    #[serde(default)]
    pub max: Vec<Option<f64>>,

    #[serde(default)]
    pub npts: Vec<Option<f64>>,
}

impl ImageStats {
    /// The RMS of the first region, if it was measured.
    pub fn rms(&self) -> Option<f64> {
        self.rms.first().copied().flatten()
    }
}

/// Deconvolve visibilities into an image cube (CASA's `tclean`).
pub trait Deconvolver {
    fn deconvolve(&self, request: &DeconvolveRequest) -> Result<(), EngineError>;
}

/// Measure statistics of an image (CASA's `imstat`).
pub trait ImageStatistics {
    fn image_stats(&self, request: &StatsRequest) -> Result<ImageStats, EngineError>;
}

/// Make a Keplerian mask for an image cube. The mask is written to
/// `<image without ".image">.mask.image`.
pub trait MaskMaker {
    fn make_mask(&self, request: &MaskRequest) -> Result<(), EngineError>;
}

/// Export an image to FITS (CASA's `exportfits`).
pub trait FitsExporter {
    fn export_fits(&self, request: &ExportRequest) -> Result<(), EngineError>;
}

/// Everything needed to clean a line.
pub trait ImagingEngine: Deconvolver + ImageStatistics + MaskMaker + FitsExporter {}

impl<T: Deconvolver + ImageStatistics + MaskMaker + FitsExporter> ImagingEngine for T {}

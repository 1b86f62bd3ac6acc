// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Batch two-pass CASA imaging of the AA Tau ALMA spectral-line cubes.

Each line of the [catalog](crate::catalog) is imaged with a dirty pass, a
Keplerian mask, an RMS-derived threshold and a final masked pass, and the
results are exported to FITS. The external tasks are reached through the
capability traits in [engine].
 */

pub mod catalog;
mod clean;
pub mod cli;
pub mod constants;
pub mod engine;
mod fits;
mod misc;
pub mod params;
mod report;
mod unit_parsing;

// Re-exports.
pub use catalog::{Catalog, DatasetSpec, LineSpec};
pub use clean::{clean_line, CleanLineError, CleanStep, CleanedLine, LineProducts, Threshold};
pub use cli::{AatauClean, AatauCleanError};
pub use engine::{
    CasaEngine, CasaFlavour, DeconvolveRequest, Deconvolver, EngineError, ExportRequest,
    FitsExporter, ImageStatistics, ImageStats, ImagingEngine, MaskMaker, MaskRequest,
    StatsRequest,
};
pub use params::{BatchParams, ImagingParams, MaskParams, OutputLayout};
pub use report::{BatchReport, LineOutcome, LineStatus};

use crossbeam_utils::atomic::AtomicCell;

/// Should we draw progress bars? Progress bars are only drawn when the user
/// hasn't asked us not to.
pub(crate) static PROGRESS_BARS: AtomicCell<bool> = AtomicCell::new(false);

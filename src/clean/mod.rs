// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Two-pass cleaning of a single spectral line.
//!
//! A dirty (`niter = 0`) pass gives a cube to build a Keplerian mask from and
//! to measure the noise in. The final pass cleans within the mask down to a
//! threshold derived from that noise, and the results are exported to FITS.

mod error;
mod products;
mod threshold;

pub use error::{CleanLineError, CleanStep};
pub use products::LineProducts;
pub use threshold::Threshold;

use std::path::Path;

use log::{debug, info, warn};
use scopeguard::ScopeGuard;

use crate::{
    catalog::{DatasetSpec, LineSpec},
    cli::Warn,
    constants::{DIRTY_THRESHOLD, MAX_ITERATIONS, RMS_CHANNELS},
    engine::{DeconvolveRequest, ExportRequest, ImagingEngine, MaskRequest, StatsRequest},
    fits::check_exported_image,
    params::BatchParams,
};

/// The result of successfully cleaning a line.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedLine {
    pub products: LineProducts,
    pub threshold: Threshold,
}

/// Clean one line of one dataset.
///
/// Products of an earlier run of the same line are removed first. If any step
/// fails, everything this run wrote is removed too, unless the batch asks to
/// keep failed products.
pub fn clean_line<E: ImagingEngine + ?Sized>(
    engine: &E,
    dataset: &DatasetSpec,
    line: &LineSpec,
    params: &BatchParams,
) -> Result<CleanedLine, CleanLineError> {
    let vis = dataset.vis_file(&params.base, line);
    if !vis.exists() {
        return Err(CleanLineError::MissingVis(vis));
    }
    let products = LineProducts::new(&params.layout, line);
    debug!(
        "Cleaning {} ({}) from {}",
        line.molecule,
        dataset.name,
        vis.display()
    );

    products
        .remove_existing()
        .map_err(|source| CleanLineError::Io {
            step: CleanStep::Prepare,
            source,
        })?;

    // Disarmed once everything has worked.
    let keep_failed_products = params.keep_failed_products;
    let guard = scopeguard::guard(&products, |products| {
        if keep_failed_products {
            debug!("Keeping the products of the failed {} run", products.stem);
            return;
        }
        match products.remove_existing() {
            Ok(removed) => debug!(
                "Removed {} products of the failed {} run",
                removed.len(),
                products.stem
            ),
            Err(e) => warn!(
                "Couldn't remove the products of the failed {} run: {e}",
                products.stem
            ),
        }
    });

    let threshold = run_steps(engine, dataset, line, params, &vis, &guard)?;
    ScopeGuard::into_inner(guard);

    Ok(CleanedLine {
        products,
        threshold,
    })
}

fn run_steps<E: ImagingEngine + ?Sized>(
    engine: &E,
    dataset: &DatasetSpec,
    line: &LineSpec,
    params: &BatchParams,
    vis: &Path,
    products: &LineProducts,
) -> Result<Threshold, CleanLineError> {
    let restfreq = line.restfreq_str();

    // Dirty pass.
    debug!("{}: dirty pass", products.stem);
    engine
        .deconvolve(&DeconvolveRequest {
            vis,
            imagename: &products.clean0_imagename,
            restfreq: restfreq.clone(),
            width: &dataset.width,
            threshold: DIRTY_THRESHOLD.to_string(),
            niter: 0,
            mask: None,
            imaging: &params.imaging,
        })
        .map_err(|source| CleanLineError::Engine {
            step: CleanStep::DirtyPass,
            source,
        })?;
    require(CleanStep::DirtyPass, &products.clean0_image)?;

    // Keplerian mask.
    debug!("{}: mask", products.stem);
    let restfreqs_hz = line.restfreqs_hz();
    engine
        .make_mask(&MaskRequest {
            image: &products.clean0_image,
            restfreqs_hz: &restfreqs_hz,
            params: &params.mask,
        })
        .map_err(|source| CleanLineError::Engine {
            step: CleanStep::Mask,
            source,
        })?;
    require(CleanStep::Mask, &products.mask_image)?;

    // Threshold from the line-free channels.
    let stats = engine
        .image_stats(&StatsRequest {
            image: &products.clean0_image,
            chans: RMS_CHANNELS,
        })
        .map_err(|source| CleanLineError::Engine {
            step: CleanStep::Stats,
            source,
        })?;
    let threshold = Threshold::from_rms(stats.rms());
    match threshold {
        Threshold::FromRms { rms_jy, .. } => {
            debug!("{}: RMS {rms_jy} Jy, threshold {threshold}", products.stem)
        }
        Threshold::Fallback => {
            warn!(
                "{}: couldn't measure the RMS (got {:?}); using a threshold of {threshold}",
                products.stem, stats.rms
            );
            format!(
                "{} ({}): no usable RMS in channels {RMS_CHANNELS}; the final pass used the fallback threshold {threshold}",
                line.molecule, dataset.name
            )
            .warn();
        }
    }

    // Final pass.
    debug!("{}: final pass", products.stem);
    engine
        .deconvolve(&DeconvolveRequest {
            vis,
            imagename: &products.clean1_imagename,
            restfreq,
            width: &dataset.width,
            threshold: threshold.to_string(),
            niter: MAX_ITERATIONS,
            mask: Some(&products.mask_image),
            imaging: &params.imaging,
        })
        .map_err(|source| CleanLineError::Engine {
            step: CleanStep::FinalPass,
            source,
        })?;
    require(CleanStep::FinalPass, &products.clean1_image)?;

    // Export.
    std::fs::create_dir_all(&params.layout.fits_dir).map_err(|source| CleanLineError::Io {
        step: CleanStep::Export,
        source,
    })?;
    for (image, fits) in [
        (&products.clean1_image, &products.fits_image),
        (&products.mask_image, &products.fits_mask),
    ] {
        engine
            .export_fits(&ExportRequest {
                image,
                fits,
                overwrite: true,
                drop_stokes: true,
            })
            .map_err(|source| CleanLineError::Engine {
                step: CleanStep::Export,
                source,
            })?;
        if params.check_fits {
            check_exported_image(fits)?;
        } else {
            require(CleanStep::Export, fits)?;
        }
    }
    info!(
        "{} ({}) cleaned to {threshold}",
        line.molecule, dataset.name
    );

    Ok(threshold)
}

/// A step that reported success must have written its product.
fn require(step: CleanStep, path: &Path) -> Result<(), CleanLineError> {
    if path.exists() {
        Ok(())
    } else {
        Err(CleanLineError::MissingProduct {
            step,
            path: path.to_path_buf(),
        })
    }
}

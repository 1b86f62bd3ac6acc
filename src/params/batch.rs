// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, warn};
use thiserror::Error;

use super::{ImagingParams, MaskParams, OutputLayout};
use crate::{
    catalog::Catalog,
    clean::clean_line,
    engine::ImagingEngine,
    report::{BatchReport, LineOutcome, LineStatus},
    PROGRESS_BARS,
};

/// Everything needed to clean every line of a catalog.
#[derive(Debug, Clone)]
pub struct BatchParams {
    /// The directory containing the `contsub_*` visibility directories.
    pub base: PathBuf,

    pub layout: OutputLayout,

    pub catalog: Catalog,

    pub imaging: ImagingParams,

    pub mask: MaskParams,

    /// Leave a failed line's images on disk.
    pub keep_failed_products: bool,

    /// Open each FITS export to check that it's usable.
    pub check_fits: bool,
}

impl BatchParams {
    /// Clean every line, in catalog order. A line failing doesn't stop the
    /// batch; its failure is recorded in the report instead.
    pub fn run<E: ImagingEngine + ?Sized>(&self, engine: &E) -> Result<BatchReport, BatchError> {
        std::fs::create_dir_all(&self.layout.images_dir).map_err(|source| {
            BatchError::CreateImagesDir {
                dir: self.layout.images_dir.clone(),
                source,
            }
        })?;

        let num_lines = self.catalog.num_lines();
        let progress_bar = ProgressBar::with_draw_target(
            Some(num_lines as _),
            if PROGRESS_BARS.load() {
                ProgressDrawTarget::stdout()
            } else {
                ProgressDrawTarget::hidden()
            },
        )
        .with_style(
            ProgressStyle::default_bar()
                .template("{msg:24}: [{wide_bar:.blue}] {pos:2}/{len:2} ({elapsed_precise})")
                .unwrap()
                .progress_chars("=> "),
        )
        .with_position(0)
        .with_message("Cleaning lines");

        let mut outcomes = Vec::with_capacity(num_lines);
        for (dataset, line) in self.catalog.lines() {
            progress_bar.set_message(format!("{} ({})", line.molecule, dataset.name));
            let status = match clean_line(engine, dataset, line, self) {
                Ok(cleaned) => LineStatus::from(&cleaned),
                Err(e) => {
                    progress_bar.suspend(|| {
                        warn!("{} ({}) failed: {e}", line.molecule, dataset.name)
                    });
                    LineStatus::from(&e)
                }
            };
            outcomes.push(LineOutcome {
                dataset: dataset.name.clone(),
                molecule: line.molecule.clone(),
                spw: line.spw,
                status,
            });
            progress_bar.inc(1);
        }
        progress_bar.abandon_with_message("Finished cleaning");

        let report = BatchReport {
            outcomes,
            images_dir: self.layout.images_dir.clone(),
            fits_dir: self.layout.fits_dir.clone(),
        };
        debug!(
            "{} lines succeeded, {} failed",
            report.num_succeeded(),
            report.num_failed()
        );
        Ok(report)
    }
}

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Couldn't create the image directory {dir}: {source}")]
    CreateImagesDir {
        dir: PathBuf,
        source: std::io::Error,
    },
}

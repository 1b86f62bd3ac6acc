// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! What happened to each line of a batch.

use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{
    clean::{CleanLineError, CleanStep, CleanedLine},
    cli::InfoPrinter,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineOutcome {
    pub dataset: String,
    pub molecule: String,
    pub spw: u32,
    #[serde(flatten)]
    pub status: LineStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum LineStatus {
    Succeeded {
        /// The final pass's threshold [mJy].
        threshold_mjy: f64,

        /// Whether the threshold is the fallback because the RMS couldn't be
        /// measured.
        threshold_fallback: bool,

        fits_image: PathBuf,
        fits_mask: PathBuf,
    },

    Failed {
        step: CleanStep,
        reason: String,
    },
}

impl From<&CleanedLine> for LineStatus {
    fn from(cleaned: &CleanedLine) -> Self {
        LineStatus::Succeeded {
            threshold_mjy: cleaned.threshold.mjy(),
            threshold_fallback: cleaned.threshold.is_fallback(),
            fits_image: cleaned.products.fits_image.clone(),
            fits_mask: cleaned.products.fits_mask.clone(),
        }
    }
}

impl From<&CleanLineError> for LineStatus {
    fn from(e: &CleanLineError) -> Self {
        LineStatus::Failed {
            step: e.step(),
            reason: e.to_string(),
        }
    }
}

impl LineOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self.status, LineStatus::Succeeded { .. })
    }
}

/// The outcome of every line of a batch, in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<LineOutcome>,
    pub images_dir: PathBuf,
    pub fits_dir: PathBuf,
}

impl BatchReport {
    pub fn num_succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn num_failed(&self) -> usize {
        self.outcomes.len() - self.num_succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &LineOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }

    /// Print the summary: counts, every failure and where the products are.
    pub fn display(&self) {
        let mut printer = InfoPrinter::new(
            format!(
                "Cleaned {}/{} lines",
                self.num_succeeded(),
                self.outcomes.len()
            )
            .into(),
        );

        let fallbacks: Vec<Cow<'static, str>> = self
            .outcomes
            .iter()
            .filter(|o| {
                matches!(
                    o.status,
                    LineStatus::Succeeded {
                        threshold_fallback: true,
                        ..
                    }
                )
            })
            .map(|o| format!("{} ({}) used the fallback threshold", o.molecule, o.dataset).into())
            .collect();
        if !fallbacks.is_empty() {
            printer.push_block(fallbacks);
        }

        let failures: Vec<Cow<'static, str>> = self
            .failures()
            .filter_map(|o| match &o.status {
                LineStatus::Failed { step, reason } => Some(
                    format!(
                        "{} ({}, spw {}) failed at the {step}: {reason}",
                        o.molecule, o.dataset, o.spw
                    )
                    .into(),
                ),
                LineStatus::Succeeded { .. } => None,
            })
            .collect();
        if !failures.is_empty() {
            let mut block: Vec<Cow<'static, str>> =
                vec![format!("{} failed", self.num_failed()).into()];
            block.extend(failures);
            printer.push_block(block);
        }

        printer.push_block(vec![
            format!("CASA images: {}", self.images_dir.display()).into(),
            format!("FITS files:  {}", self.fits_dir.display()).into(),
        ]);
        printer.display();
    }

    /// Write the report as pretty JSON.
    pub fn write_json(&self, file: &Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(file, json)
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from cleaning a single line.

use std::path::PathBuf;

use serde::Serialize;
use strum_macros::{Display, EnumIter};
use thiserror::Error;

use crate::{engine::EngineError, fits::FitsError};

/// The steps of cleaning a line, in the order they happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CleanStep {
    /// Finding the visibilities and clearing out old products.
    #[strum(serialize = "prepare")]
    Prepare,

    #[strum(serialize = "dirty pass")]
    DirtyPass,

    #[strum(serialize = "mask")]
    Mask,

    #[strum(serialize = "noise estimate")]
    #[serde(rename = "noise-estimate")]
    Stats,

    #[strum(serialize = "final pass")]
    FinalPass,

    #[strum(serialize = "export")]
    Export,
}

#[derive(Error, Debug)]
pub enum CleanLineError {
    #[error("The visibilities {0} don't exist")]
    MissingVis(PathBuf),

    #[error("{step} failed: {source}")]
    Engine {
        step: CleanStep,
        source: EngineError,
    },

    #[error("{step} reported success, but {path} wasn't written")]
    MissingProduct { step: CleanStep, path: PathBuf },

    #[error("{step}: {source}")]
    Io {
        step: CleanStep,
        source: std::io::Error,
    },

    #[error("The exported FITS file is unusable: {0}")]
    Fits(#[from] FitsError),
}

impl CleanLineError {
    /// The step that failed.
    pub fn step(&self) -> CleanStep {
        match self {
            CleanLineError::MissingVis(_) => CleanStep::Prepare,
            CleanLineError::Engine { step, .. }
            | CleanLineError::MissingProduct { step, .. }
            | CleanLineError::Io { step, .. } => *step,
            CleanLineError::Fits(_) => CleanStep::Export,
        }
    }
}

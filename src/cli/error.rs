// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all aatau-clean-related errors. This should be the *only*
//! error enum that is publicly visible.

use thiserror::Error;

use super::clean::CleanArgsError;
use crate::{catalog::CatalogError, engine::EngineError, params::BatchError};

/// The *only* publicly visible error from aatau-clean. Messages are grouped by
/// topic, and some carry a hint.
#[derive(Error, Debug)]
pub enum AatauCleanError {
    /// An error related to the catalog of datasets and lines.
    #[error("{0}\n\nRun 'aatau-clean catalog' to see the built-in catalog.")]
    Catalog(String),

    /// An error related to running CASA.
    #[error("{0}\n\nCheck that CASA can be run (--casa, --casa-flavour) and that the mask module can be found (--mask-module).")]
    Casa(String),

    /// An error related to cleaning.
    #[error("{0}")]
    Clean(String),

    /// The batch ran, but not every line could be cleaned.
    #[error("{failed} of {total} lines failed to clean; see the summary above")]
    LinesFailed { failed: usize, total: usize },

    /// An error related to argument files.
    #[error("{0}")]
    ArgFile(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<CleanArgsError> for AatauCleanError {
    fn from(e: CleanArgsError) -> Self {
        match e {
            CleanArgsError::BaseNotADir(_) | CleanArgsError::InvalidCasaFlavour(_) => {
                Self::Clean(e.to_string())
            }
            CleanArgsError::Report { .. } => Self::Generic(e.to_string()),
        }
    }
}

impl From<CatalogError> for AatauCleanError {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e.to_string())
    }
}

impl From<EngineError> for AatauCleanError {
    fn from(e: EngineError) -> Self {
        Self::Casa(e.to_string())
    }
}

impl From<BatchError> for AatauCleanError {
    fn from(e: BatchError) -> Self {
        Self::Clean(e.to_string())
    }
}

impl From<std::io::Error> for AatauCleanError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}

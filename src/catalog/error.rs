// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with catalogs.

use std::path::PathBuf;

use thiserror::Error;

use crate::unit_parsing::UnitParseError;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Couldn't read catalog file {file}: {source}")]
    Read {
        file: PathBuf,
        source: std::io::Error,
    },

    #[error("Couldn't decode catalog file {file}:\n{message}")]
    Decode { file: PathBuf, message: String },

    #[error("Catalog file {0} doesn't have a recognised file extension! Valid extensions are: toml, json")]
    UnknownFileType(PathBuf),

    #[error("The catalog contains no datasets")]
    NoDatasets,

    #[error("Dataset '{dataset}' contains no lines")]
    NoLines { dataset: String },

    #[error("The visibility template of dataset '{dataset}' ('{template}') doesn't contain '{{spw}}'")]
    MissingSpwPlaceholder { dataset: String, template: String },

    #[error("The channel width of dataset '{dataset}' is invalid: {source}")]
    BadWidth {
        dataset: String,
        source: UnitParseError,
    },

    #[error("Dataset '{dataset}', line '{molecule}': {freq} GHz is not a valid frequency")]
    BadFrequency {
        dataset: String,
        molecule: String,
        freq: f64,
    },

    #[error("The channel width of dataset '{dataset}' must be finite and positive, but got '{width}'")]
    NonPositiveWidth { dataset: String, width: String },

    #[error("Imaging parameter '{param}' must be finite and positive, but got '{value}'")]
    NonPositiveImagingParam { param: &'static str, value: String },

    #[error("Imaging parameter '{param}' is invalid: {source}")]
    BadImagingParam {
        param: &'static str,
        source: UnitParseError,
    },

    #[error("Molecule name '{0}' can't be used in output filenames; it must be non-empty and free of path separators and '..'")]
    BadMoleculeName(String),

    #[error("Molecule '{0}' appears more than once; output names would collide")]
    DuplicateMolecule(String),

    #[error("Dataset '{0}' is not in the catalog")]
    UnknownDataset(String),

    #[error("Molecule '{0}' is not in the catalog")]
    UnknownMolecule(String),

    #[error("The dataset/molecule selection didn't match any lines")]
    NothingSelected,
}

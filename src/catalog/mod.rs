// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The catalog of datasets and spectral lines to be imaged.
//!
//! A [Catalog] is plain data. Adding a dataset or a line only requires
//! appending an entry, either to [Catalog::builtin] or to a catalog file (see
//! [read_catalog_file]).

mod builtin;
mod error;

pub use error::CatalogError;

use std::{
    borrow::Cow,
    collections::HashSet,
    path::{Path, PathBuf},
};

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use vec1::Vec1;

use crate::{
    constants::{CONTSUB_DIR_PREFIX, GHZ_TO_HZ, SPW_PLACEHOLDER},
    params::{ImagingParams, MaskParams},
    unit_parsing::parse_velocity,
};

/// A single spectral line in a spectral window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSpec {
    /// The spectral window containing the line.
    pub spw: u32,

    /// The name of the molecule (or transition). This is used in output
    /// filenames, so it must be unique within a catalog.
    pub molecule: String,

    /// The frequency handed to the imager as the rest frequency [GHz].
    pub line_freq_ghz: f64,

    /// All rest frequencies of the line [GHz]. Blended and hyperfine lines
    /// have more than one.
    pub restfreqs_ghz: Vec1<f64>,
}

impl LineSpec {
    /// The rest frequencies in Hz, in the same order as they're listed.
    pub fn restfreqs_hz(&self) -> Vec1<f64> {
        self.restfreqs_ghz.mapped_ref(|f| f * GHZ_TO_HZ)
    }

    /// The imager's rest frequency string, e.g. "279.5117491GHz".
    pub fn restfreq_str(&self) -> String {
        format!("{}GHz", self.line_freq_ghz)
    }

    pub fn is_blended(&self) -> bool {
        self.restfreqs_ghz.len() > 1
    }
}

/// A continuum-subtracted dataset and the lines to be imaged from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSpec {
    pub name: String,

    /// The visibility filename; "{spw}" is replaced with a line's spectral
    /// window.
    pub vis_template: String,

    /// Channel width, e.g. "0.3km/s".
    pub width: String,

    /// The directory (under the base directory) holding this dataset's
    /// visibilities, if it isn't named "contsub_" followed by the dataset name
    /// without underscores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contsub_dir: Option<String>,

    pub lines: Vec<LineSpec>,
}

impl DatasetSpec {
    /// The name of the directory holding this dataset's visibilities.
    pub fn contsub_dir(&self) -> Cow<'_, str> {
        match &self.contsub_dir {
            Some(d) => Cow::Borrowed(d.as_str()),
            None => Cow::Owned(format!(
                "{CONTSUB_DIR_PREFIX}{}",
                self.name.replace('_', "")
            )),
        }
    }

    /// The path to the visibilities containing the given line.
    pub fn vis_file(&self, base: &Path, line: &LineSpec) -> PathBuf {
        base.join(self.contsub_dir().as_ref()).join(
            self.vis_template
                .replace(SPW_PLACEHOLDER, &line.spw.to_string()),
        )
    }
}

/// An ordered collection of datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub datasets: Vec<DatasetSpec>,
}

impl Catalog {
    /// All (dataset, line) pairs, in catalog order.
    pub fn lines(&self) -> impl Iterator<Item = (&DatasetSpec, &LineSpec)> {
        self.datasets
            .iter()
            .flat_map(|d| d.lines.iter().map(move |l| (d, l)))
    }

    pub fn num_lines(&self) -> usize {
        self.datasets.iter().map(|d| d.lines.len()).sum()
    }

    /// Check that this catalog can be used to image. The built-in catalog
    /// always passes; catalogs from files might not.
    pub fn validate(&self) -> Result<(), CatalogError> {
        validate_datasets(&self.datasets)
    }

    /// Return a catalog with only the requested datasets and/or molecules.
    /// Unknown names are an error, as is selecting nothing.
    pub fn select(
        &self,
        datasets: Option<&[String]>,
        molecules: Option<&[String]>,
    ) -> Result<Catalog, CatalogError> {
        if let Some(datasets) = datasets {
            for name in datasets {
                if !self.datasets.iter().any(|d| &d.name == name) {
                    return Err(CatalogError::UnknownDataset(name.clone()));
                }
            }
        }
        if let Some(molecules) = molecules {
            for molecule in molecules {
                if !self.lines().any(|(_, l)| &l.molecule == molecule) {
                    return Err(CatalogError::UnknownMolecule(molecule.clone()));
                }
            }
        }

        let selected = Catalog {
            datasets: self
                .datasets
                .iter()
                .filter(|d| datasets.map(|s| s.contains(&d.name)).unwrap_or(true))
                .map(|d| DatasetSpec {
                    lines: d
                        .lines
                        .iter()
                        .filter(|l| molecules.map(|s| s.contains(&l.molecule)).unwrap_or(true))
                        .cloned()
                        .collect(),
                    ..d.clone()
                })
                .filter(|d| !d.lines.is_empty())
                .collect(),
        };
        if selected.datasets.is_empty() {
            return Err(CatalogError::NothingSelected);
        }
        debug!(
            "Selected {} of {} lines",
            selected.num_lines(),
            self.num_lines()
        );

        Ok(selected)
    }
}

fn validate_datasets(datasets: &[DatasetSpec]) -> Result<(), CatalogError> {
    if datasets.is_empty() {
        return Err(CatalogError::NoDatasets);
    }

    let mut molecules = HashSet::new();
    for dataset in datasets {
        if dataset.lines.is_empty() {
            return Err(CatalogError::NoLines {
                dataset: dataset.name.clone(),
            });
        }
        if !dataset.vis_template.contains(SPW_PLACEHOLDER) {
            return Err(CatalogError::MissingSpwPlaceholder {
                dataset: dataset.name.clone(),
                template: dataset.vis_template.clone(),
            });
        }
        let (width, unit) =
            parse_velocity(&dataset.width).map_err(|source| CatalogError::BadWidth {
                dataset: dataset.name.clone(),
                source,
            })?;
        let width = unit.to_m_per_s(width);
        if !width.is_finite() || width <= 0.0 {
            return Err(CatalogError::NonPositiveWidth {
                dataset: dataset.name.clone(),
                width: dataset.width.clone(),
            });
        }
        trace!("Dataset '{}' channel width: {width} m/s", dataset.name);

        for line in &dataset.lines {
            for &freq in std::iter::once(&line.line_freq_ghz).chain(line.restfreqs_ghz.iter())
            {
                if !freq.is_finite() || freq <= 0.0 {
                    return Err(CatalogError::BadFrequency {
                        dataset: dataset.name.clone(),
                        molecule: line.molecule.clone(),
                        freq,
                    });
                }
            }
            if !is_filename_safe(&line.molecule) {
                return Err(CatalogError::BadMoleculeName(line.molecule.clone()));
            }
            if !molecules.insert(line.molecule.as_str()) {
                return Err(CatalogError::DuplicateMolecule(line.molecule.clone()));
            }
        }
    }

    Ok(())
}

/// Molecule names become part of product filenames, which must stay inside
/// the output directories.
fn is_filename_safe(name: &str) -> bool {
    !name.trim().is_empty()
        && !name.contains("..")
        && !name.chars().any(|c| c == '/' || c == '\\' || c == '\0')
}

/// The contents of a catalog file. The imaging and mask tables are optional;
/// when absent, the defaults are used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub datasets: Vec<DatasetSpec>,

    #[serde(default)]
    pub imaging: Option<ImagingParams>,

    #[serde(default)]
    pub mask: Option<MaskParams>,
}

/// Read and validate a catalog from a toml or json file.
pub fn read_catalog_file(file: &Path) -> Result<CatalogFile, CatalogError> {
    debug!("Attempting to read catalog file {}", file.display());

    let contents = std::fs::read_to_string(file).map_err(|source| CatalogError::Read {
        file: file.to_path_buf(),
        source,
    })?;
    let ext = file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    let catalog_file: CatalogFile = match ext.as_deref() {
        Some("toml") => toml::from_str(&contents).map_err(|e| CatalogError::Decode {
            file: file.to_path_buf(),
            message: e.to_string(),
        })?,
        Some("json") => serde_json::from_str(&contents).map_err(|e| CatalogError::Decode {
            file: file.to_path_buf(),
            message: e.to_string(),
        })?,
        _ => return Err(CatalogError::UnknownFileType(file.to_path_buf())),
    };

    validate_datasets(&catalog_file.datasets)?;
    if let Some(imaging) = catalog_file.imaging.as_ref() {
        imaging.validate()?;
    }

    Ok(catalog_file)
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameters that are shared by every line of a batch.
//!
//! The code here is kind of "mirroring" the code within the `cli` module; the
//! idea is that `cli` is unparsed, user-facing code, whereas parameters have
//! been parsed and are ready to be used directly. Nothing here is mutated once
//! constructed; the batch hands out references.

mod batch;
mod imaging;
mod mask;
#[cfg(test)]
mod tests;

pub use batch::{BatchError, BatchParams};
pub use imaging::ImagingParams;
pub use mask::MaskParams;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::constants::{ANALYSIS_DIR, CASA_IMAGES_DIR, FITS_PRODUCTS_DIR};

/// Where the products of a batch are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputLayout {
    /// CASA images (the two passes and the mask).
    pub images_dir: PathBuf,

    /// FITS exports.
    pub fits_dir: PathBuf,
}

impl OutputLayout {
    /// The standard layout: `<base>/aatau-alma-analysis/casa_images` and
    /// `<base>/aatau-alma-analysis/fits_products`.
    pub fn from_base(base: &Path) -> OutputLayout {
        let analysis = base.join(ANALYSIS_DIR);
        OutputLayout {
            images_dir: analysis.join(CASA_IMAGES_DIR),
            fits_dir: analysis.join(FITS_PRODUCTS_DIR),
        }
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{
    io,
    path::{Path, PathBuf},
};

use log::debug;
use serde::Serialize;

use crate::{catalog::LineSpec, constants::PRODUCT_PREFIX, params::OutputLayout};

/// Every path a line's run produces. Names depend only on the molecule, so
/// re-running a line writes to the same paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineProducts {
    /// The directory holding the CASA images.
    pub images_dir: PathBuf,

    /// e.g. `AATau_CS_contsub`.
    pub stem: String,

    /// The dirty pass writes `<clean0_imagename>.image` (and friends).
    pub clean0_imagename: PathBuf,
    pub clean0_image: PathBuf,
    pub mask_image: PathBuf,

    /// The final pass writes `<clean1_imagename>.image` (and friends).
    pub clean1_imagename: PathBuf,
    pub clean1_image: PathBuf,

    pub fits_image: PathBuf,
    pub fits_mask: PathBuf,
}

impl LineProducts {
    pub fn new(layout: &OutputLayout, line: &LineSpec) -> LineProducts {
        let stem = format!("{PRODUCT_PREFIX}_{}_contsub", line.molecule);
        let clean0 = format!("{stem}_clean0");
        let clean1 = format!("{stem}_clean1");
        let images_dir = &layout.images_dir;

        LineProducts {
            images_dir: images_dir.clone(),
            clean0_imagename: images_dir.join(&clean0),
            clean0_image: images_dir.join(format!("{clean0}.image")),
            mask_image: images_dir.join(format!("{clean0}.mask.image")),
            clean1_imagename: images_dir.join(&clean1),
            clean1_image: images_dir.join(format!("{clean1}.image")),
            fits_image: layout.fits_dir.join(format!("{clean1}.image.fits")),
            fits_mask: layout.fits_dir.join(format!("{clean0}.mask.image.fits")),
            stem,
        }
    }

    /// Is this entry of the images directory one of this line's CASA
    /// products? Both passes write several images (`.image`, `.residual`,
    /// `.psf` etc.), all sharing the pass's prefix.
    fn owns(&self, name: &str) -> bool {
        [
            format!("{}_clean0.", self.stem),
            format!("{}_clean1.", self.stem),
        ]
        .iter()
        .any(|prefix| name.starts_with(prefix.as_str()))
    }

    /// Delete everything this line has written. Returns the paths that were
    /// removed. Missing files and directories are fine.
    pub fn remove_existing(&self) -> io::Result<Vec<PathBuf>> {
        let mut removed = vec![];

        match std::fs::read_dir(&self.images_dir) {
            Ok(entries) => {
                for entry in entries {
                    let entry = entry?;
                    let owned = entry.file_name().to_str().map(|n| self.owns(n));
                    if owned == Some(true) {
                        let path = entry.path();
                        remove_path(&path)?;
                        removed.push(path);
                    }
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => (),
            Err(e) => return Err(e),
        }

        for fits in [&self.fits_image, &self.fits_mask] {
            if fits.exists() {
                remove_path(fits)?;
                removed.push(fits.clone());
            }
        }

        removed.sort();
        for path in &removed {
            debug!("Removed {}", path.display());
        }
        Ok(removed)
    }
}

/// CASA images are directories; FITS files are files.
fn remove_path(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    }
}

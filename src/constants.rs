// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

The names of directories and products below are relied upon by downstream
analysis; changing them changes where outputs land.
 */

/// Flux threshold of the dirty (`niter = 0`) pass. This is an absolute guard,
/// not derived from the data.
pub const DIRTY_THRESHOLD: &str = "5mJy";

/// Line-free channels used to measure the cube's RMS.
pub const RMS_CHANNELS: &str = "0~30";

/// The final-pass threshold is this many times the measured RMS.
pub const RMS_MULTIPLIER: f64 = 2.0;

/// Used as the final-pass threshold when the RMS couldn't be measured [mJy].
pub const DEFAULT_THRESHOLD_MJY: f64 = 10.0;

/// Iteration cap of the final (masked) pass.
pub const MAX_ITERATIONS: u32 = 50000;

/// GHz -> Hz.
pub const GHZ_TO_HZ: f64 = 1e9;

/// Jy -> mJy.
pub const JY_TO_MJY: f64 = 1000.0;

/// Every product filename starts with this.
pub const PRODUCT_PREFIX: &str = "AATau";

/// Analysis products live in this directory under the base directory.
pub const ANALYSIS_DIR: &str = "aatau-alma-analysis";

/// CASA images live here (under [`ANALYSIS_DIR`]).
pub const CASA_IMAGES_DIR: &str = "casa_images";

/// FITS exports live here (under [`ANALYSIS_DIR`]).
pub const FITS_PRODUCTS_DIR: &str = "fits_products";

/// Visibility directories are named with this prefix.
pub const CONTSUB_DIR_PREFIX: &str = "contsub_";

/// The placeholder in a dataset's visibility template that is replaced by the
/// spectral window.
pub const SPW_PLACEHOLDER: &str = "{spw}";

/// The default name of the CASA executable.
pub const DEFAULT_CASA_EXECUTABLE: &str = "casa";

/// The default Python interpreter for a modular CASA installation.
pub const DEFAULT_CASA_PYTHON: &str = "python3";

/// The file providing `make_mask`.
pub const DEFAULT_MASK_MODULE: &str = "keplerian_mask.py";

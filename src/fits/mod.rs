// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helper functions for checking exported FITS files.

mod error;

pub(crate) use error::FitsError;

use std::{fmt::Display, path::Path};

use fitsio::{hdu::*, FitsFile};
use log::debug;

/// Open a fits file.
#[track_caller]
pub(crate) fn fits_open<P: AsRef<Path>>(file: P) -> Result<FitsFile, FitsError> {
    FitsFile::open(file.as_ref()).map_err(|e| {
        let caller = std::panic::Location::caller();
        FitsError::Open {
            fits_error: Box::new(e),
            fits_filename: file.as_ref().to_path_buf().into_boxed_path(),
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }
    })
}

/// Open a fits file's HDU.
#[track_caller]
pub(crate) fn fits_open_hdu<T: DescribesHdu + Display + Copy>(
    fits_fptr: &mut FitsFile,
    hdu_description: T,
) -> Result<FitsHdu, FitsError> {
    fits_fptr.hdu(hdu_description).map_err(|e| {
        let caller = std::panic::Location::caller();
        FitsError::Fitsio {
            fits_error: Box::new(e),
            fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
            hdu_description: format!("{hdu_description}").into_boxed_str(),
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }
    })
}

/// Given a FITS file pointer, a HDU that belongs to it, and a keyword that may
/// or may not exist, pull out the value of the keyword, parsing it into the
/// desired type.
#[track_caller]
pub(crate) fn fits_get_optional_key<T: std::str::FromStr>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    keyword: &str,
) -> Result<Option<T>, FitsError> {
    let unparsed_value: String = match hdu.read_key(fits_fptr, keyword) {
        Ok(key_value) => key_value,
        // 202: key not found. 204: key index out of range.
        Err(fitsio::errors::Error::Fits(fe)) if matches!(fe.status, 202 | 204) => {
            return Ok(None)
        }
        Err(e) => {
            let caller = std::panic::Location::caller();
            return Err(FitsError::Fitsio {
                fits_error: Box::new(e),
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_description: format!("{}", hdu.number + 1).into_boxed_str(),
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            });
        }
    };

    match unparsed_value.trim().parse() {
        Ok(parsed_value) => Ok(Some(parsed_value)),
        Err(_) => {
            let caller = std::panic::Location::caller();
            Err(FitsError::Parse {
                key: keyword.to_string().into_boxed_str(),
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_num: hdu.number + 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            })
        }
    }
}

/// Check that an exported cube can be read back: the primary HDU must be a
/// non-empty image without a Stokes axis. Returns the image's shape.
#[track_caller]
pub(crate) fn check_exported_image(file: &Path) -> Result<Vec<usize>, FitsError> {
    let mut fptr = fits_open(file)?;
    let hdu = fits_open_hdu(&mut fptr, 0)?;
    let shape = match &hdu.info {
        HduInfo::ImageInfo { shape, .. } => shape.clone(),
        _ => {
            let caller = std::panic::Location::caller();
            return Err(FitsError::NotImage {
                fits_filename: file.to_path_buf().into_boxed_path(),
                hdu_num: 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            });
        }
    };
    if shape.is_empty() || shape.contains(&0) {
        return Err(FitsError::EmptyImage {
            fits_filename: file.to_path_buf().into_boxed_path(),
        });
    }

    // FITS axes are 1-indexed.
    for axis in 1..=shape.len() {
        let ctype: Option<String> =
            fits_get_optional_key(&mut fptr, &hdu, &format!("CTYPE{axis}"))?;
        if ctype
            .map(|c| c.to_uppercase().contains("STOKES"))
            .unwrap_or(false)
        {
            return Err(FitsError::StokesAxis {
                fits_filename: file.to_path_buf().into_boxed_path(),
                axis,
            });
        }
    }
    debug!("{} looks fine; shape {shape:?}", file.display());

    Ok(shape)
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::Path;

use serial_test::serial;
use tempfile::TempDir;

use super::*;
use crate::{
    catalog::{Catalog, CatalogError},
    clean::{
        tests::{batch_params, MockEngine},
        CleanStep,
    },
    cli::take_warnings,
    report::LineStatus,
};

#[test]
fn test_layout() {
    let layout = OutputLayout::from_base(Path::new("/data/AATau"));
    assert_eq!(
        layout.images_dir,
        Path::new("/data/AATau/aatau-alma-analysis/casa_images")
    );
    assert_eq!(
        layout.fits_dir,
        Path::new("/data/AATau/aatau-alma-analysis/fits_products")
    );
}

#[test]
fn test_default_imaging_params_are_valid() {
    ImagingParams::default().validate().unwrap();
}

#[test]
fn test_imaging_params_must_be_positive() {
    let p = ImagingParams {
        cell: "-0.03arcsec".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        p.validate(),
        Err(CatalogError::NonPositiveImagingParam { param: "cell", .. })
    ));

    let p = ImagingParams {
        uvtaper: vec![
            "0arcsec".to_string(),
            "0.1483arcsec".to_string(),
            "26deg".to_string(),
        ],
        ..Default::default()
    };
    assert!(matches!(
        p.validate(),
        Err(CatalogError::NonPositiveImagingParam {
            param: "uvtaper",
            ..
        })
    ));

    for cell in ["NaNarcsec", "infarcsec"] {
        let p = ImagingParams {
            cell: cell.to_string(),
            ..Default::default()
        };
        assert!(
            matches!(
                p.validate(),
                Err(CatalogError::NonPositiveImagingParam { param: "cell", .. })
            ),
            "{cell} was accepted"
        );
    }

    for uvtaper in [
        ["NaNarcsec", "0.1483arcsec", "26deg"],
        ["0.05arcsec", "infarcsec", "26deg"],
        ["0.05arcsec", "0.1483arcsec", "NaNdeg"],
    ] {
        let p = ImagingParams {
            uvtaper: uvtaper.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        };
        assert!(
            matches!(
                p.validate(),
                Err(CatalogError::NonPositiveImagingParam {
                    param: "uvtaper",
                    ..
                })
            ),
            "{uvtaper:?} was accepted"
        );
    }

    // Position angles can be negative.
    let p = ImagingParams {
        uvtaper: vec![
            "0.05arcsec".to_string(),
            "0.1483arcsec".to_string(),
            "-26deg".to_string(),
        ],
        ..Default::default()
    };
    p.validate().unwrap();

    let p = ImagingParams {
        start: "-3.0".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        p.validate(),
        Err(CatalogError::BadImagingParam { param: "start", .. })
    ));
}

#[test]
fn test_default_mask_params() {
    let p = MaskParams::default();
    assert_eq!(p.pa, 273.0);
    assert_eq!(p.vlsr, 6445.0);
}

#[test]
#[serial]
fn test_batch_succeeds() {
    let dir = TempDir::new().unwrap();
    let params = batch_params(&dir);
    let engine = MockEngine::with_rms(0.003);

    let report = params.run(&engine).unwrap();
    assert_eq!(report.outcomes.len(), 9);
    assert_eq!(report.num_succeeded(), 9);
    assert_eq!(report.num_failed(), 0);
    assert_eq!(report.images_dir, params.layout.images_dir);

    // Catalog order.
    let molecules: Vec<_> = report.outcomes.iter().map(|o| o.molecule.as_str()).collect();
    assert_eq!(
        molecules,
        ["N2H+", "DCO+", "H2CO", "HCN", "HCO+", "CN_SPW1", "CN_SPW3", "C18O", "13CO"]
    );
    for outcome in &report.outcomes {
        match &outcome.status {
            LineStatus::Succeeded {
                threshold_mjy,
                threshold_fallback,
                fits_image,
                fits_mask,
            } => {
                assert_eq!(*threshold_mjy, 6.0);
                assert!(!threshold_fallback);
                assert!(fits_image.exists());
                assert!(fits_mask.exists());
            }
            LineStatus::Failed { .. } => panic!("{} failed", outcome.molecule),
        }
    }
}

#[test]
#[serial]
fn test_a_failed_line_doesnt_stop_the_batch() {
    let dir = TempDir::new().unwrap();
    let params = batch_params(&dir);
    let engine = MockEngine {
        rms: vec![0.003],
        fail_at: Some((CleanStep::Mask, Some("DCO+".to_string()))),
        ..Default::default()
    };

    let report = params.run(&engine).unwrap();
    assert_eq!(report.num_succeeded(), 8);
    assert_eq!(report.num_failed(), 1);

    let failure = report.failures().next().unwrap();
    assert_eq!(failure.dataset, "2013_SG2");
    assert_eq!(failure.molecule, "DCO+");
    assert_eq!(failure.spw, 2);
    match &failure.status {
        LineStatus::Failed { step, reason } => {
            assert_eq!(*step, CleanStep::Mask);
            assert!(reason.contains("mock mask failure"), "{reason}");
        }
        LineStatus::Succeeded { .. } => unreachable!(),
    }

    // The lines after the failure were still cleaned.
    assert!(report.outcomes[2].succeeded());
    assert_eq!(report.outcomes[2].molecule, "H2CO");
}

#[test]
#[serial]
fn test_every_line_failing_is_still_a_report() {
    let dir = TempDir::new().unwrap();
    let params = batch_params(&dir);
    let engine = MockEngine {
        fail_at: Some((CleanStep::DirtyPass, None)),
        ..Default::default()
    };

    let report = params.run(&engine).unwrap();
    assert_eq!(report.num_failed(), 9);
    // Nothing is left behind by failed lines.
    assert_eq!(
        std::fs::read_dir(&params.layout.images_dir).unwrap().count(),
        0
    );
    assert!(!params.layout.fits_dir.exists());
}

#[test]
#[serial]
fn test_selected_batch_with_fallbacks() {
    let dir = TempDir::new().unwrap();
    let mut params = batch_params(&dir);
    params.catalog = Catalog::builtin()
        .select(None, Some(&["HCN".to_string(), "13CO".to_string()]))
        .unwrap();
    take_warnings();

    let report = params.run(&MockEngine::default()).unwrap();
    assert_eq!(report.outcomes.len(), 2);
    assert!(report.outcomes.iter().all(|o| matches!(
        o.status,
        LineStatus::Succeeded {
            threshold_fallback: true,
            ..
        }
    )));
    assert_eq!(take_warnings().len(), 2);
}

#[test]
#[serial]
fn test_missing_visibilities_fail_only_their_lines() {
    let dir = TempDir::new().unwrap();
    let params = batch_params(&dir);
    std::fs::remove_dir_all(params.base.join("contsub_2015")).unwrap();

    let report = params.run(&MockEngine::with_rms(0.003)).unwrap();
    assert_eq!(report.num_succeeded(), 5);
    assert!(report
        .failures()
        .all(|o| o.dataset == "2015_SG1"
            && matches!(o.status, LineStatus::Failed { step: CleanStep::Prepare, .. })));
}

#[test]
fn test_images_dir_must_be_creatable() {
    let dir = TempDir::new().unwrap();
    let mut params = batch_params(&dir);
    // A file where the analysis directory should be.
    let analysis = params.base.join("aatau-alma-analysis");
    std::fs::write(&analysis, "").unwrap();
    params.layout = OutputLayout::from_base(&params.base);

    let result = params.run(&MockEngine::with_rms(0.003));
    assert!(matches!(result, Err(BatchError::CreateImagesDir { .. })));
}

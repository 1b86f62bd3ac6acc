// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use indoc::indoc;
use tempfile::TempDir;

use super::{python::*, *};
use crate::params::MaskParams;

fn mask_module(dir: &Path) -> PathBuf {
    let module = dir.join("keplerian_mask.py");
    std::fs::write(&module, "def make_mask(**kwargs):\n    pass\n").unwrap();
    module
}

#[test]
fn test_python_literals() {
    assert_eq!(PyValue::from("0.3km/s").to_string(), "'0.3km/s'");
    assert_eq!(PyValue::from("it's").to_string(), r"'it\'s'");
    assert_eq!(PyValue::from(r"C:\data").to_string(), r"'C:\\data'");
    assert_eq!(PyValue::from(0.5).to_string(), "0.5");
    // Whole floats must still look like floats.
    assert_eq!(PyValue::from(145.0).to_string(), "145.0");
    assert_eq!(PyValue::from(f64::NAN).to_string(), "float('nan')");
    assert_eq!(PyValue::from(f64::NEG_INFINITY).to_string(), "float('-inf')");
    assert_eq!(PyValue::from(50000u32).to_string(), "50000");
    assert_eq!(PyValue::from(false).to_string(), "False");
    assert_eq!(
        PyValue::str_list(&["0.05arcsec", "26deg"]).to_string(),
        "['0.05arcsec', '26deg']"
    );
}

#[test]
fn test_render_call_keeps_argument_order() {
    let mut kwargs = Kwargs::new();
    kwargs.insert("imagename", "a.image".into());
    kwargs.insert("chans", "0~30".into());
    assert_eq!(
        render_call("imstat", &kwargs),
        "imstat(imagename='a.image', chans='0~30')"
    );
}

#[test]
fn test_tclean_kwargs() {
    let imaging = ImagingParams::default();
    let mut request = DeconvolveRequest {
        vis: Path::new("/data/contsub_2013/AATau_2013_spw3.ms.contsub"),
        imagename: Path::new("/out/AATau_HCN_contsub_clean0"),
        restfreq: "265.8864343GHz".to_string(),
        width: "0.3km/s",
        threshold: "5mJy".to_string(),
        niter: 0,
        mask: None,
        imaging: &imaging,
    };

    let kwargs = tclean_kwargs(&request);
    assert!(!kwargs.contains_key("mask"));
    assert_eq!(kwargs["niter"], PyValue::Int(0));
    assert_eq!(kwargs["restfreq"], PyValue::from("265.8864343GHz"));
    assert_eq!(
        kwargs["scales"],
        PyValue::List(vec![
            PyValue::Int(0),
            PyValue::Int(5),
            PyValue::Int(10),
            PyValue::Int(20)
        ])
    );
    assert_eq!(
        kwargs["imsize"],
        PyValue::List(vec![PyValue::Int(500), PyValue::Int(500)])
    );
    assert_eq!(kwargs["interactive"], PyValue::Bool(false));
    assert_eq!(kwargs["restoringbeam"], PyValue::from("common"));

    request.mask = Some(Path::new("/out/AATau_HCN_contsub_clean0.mask.image"));
    request.niter = 50000;
    let kwargs = tclean_kwargs(&request);
    assert_eq!(
        kwargs["mask"],
        PyValue::from("/out/AATau_HCN_contsub_clean0.mask.image")
    );
    assert_eq!(kwargs["niter"], PyValue::Int(50000));
}

#[test]
fn test_make_mask_kwargs() {
    let params = MaskParams::default();
    let restfreqs = [267.5576259e9, 267.5583e9];
    let request = MaskRequest {
        image: Path::new("AATau_HCOp_contsub_clean0.image"),
        restfreqs_hz: &restfreqs,
        params: &params,
    };
    let kwargs = make_mask_kwargs(&request);
    assert_eq!(
        kwargs.keys().copied().collect::<Vec<_>>(),
        [
            "image", "restfreqs", "inc", "PA", "mstar", "dist", "vlsr", "dx0", "dy0", "nbeams",
            "dV0", "dVq"
        ]
    );
    assert_eq!(
        kwargs["restfreqs"],
        PyValue::List(vec![
            PyValue::Float(267.5576259e9),
            PyValue::Float(267.5583e9)
        ])
    );
    assert_eq!(kwargs["PA"], PyValue::Float(273.0));
}

#[test]
fn test_scripts_catch_python_errors() {
    let dir = TempDir::new().unwrap();
    let module = mask_module(dir.path());

    let engine = CasaEngine::new(CasaFlavour::Monolithic, None, &module).unwrap();
    assert_eq!(engine.executable(), Path::new("casa"));
    let script = engine.script("imstat", "x = 1\ny = 2");
    assert_eq!(
        script,
        indoc! {r"
            import sys
            import json
            import math

            try:
                x = 1
                y = 2
            except Exception as e:
                sys.stderr.write('aatau-clean: imstat raised %r\n' % (e,))
                sys.exit(1)
        "}
    );

    let engine = CasaEngine::new(CasaFlavour::Modular, None, &module).unwrap();
    assert_eq!(engine.executable(), Path::new("python3"));
    let script = engine.script("tclean", "pass");
    assert!(script.contains("from casatasks import tclean, imstat, exportfits\n"));
}

#[test]
fn test_mask_module_checks() {
    let dir = TempDir::new().unwrap();

    let missing = dir.path().join("keplerian_mask.py");
    assert!(matches!(
        CasaEngine::new(CasaFlavour::Monolithic, None, &missing),
        Err(EngineError::MaskModuleMissing(_))
    ));

    let bad_name = dir.path().join("keplerian-mask.py");
    std::fs::write(&bad_name, "").unwrap();
    assert!(matches!(
        CasaEngine::new(CasaFlavour::Monolithic, None, &bad_name),
        Err(EngineError::MaskModuleName(_))
    ));

    let module = mask_module(dir.path());
    let engine = CasaEngine::new(CasaFlavour::Monolithic, None, &module).unwrap();
    assert_eq!(engine.mask_module_name, "keplerian_mask");
    assert_eq!(engine.mask_module_dir, dir.path());
}

#[test]
fn test_python_identifiers() {
    assert!(is_python_identifier("keplerian_mask"));
    assert!(is_python_identifier("_mask2"));
    assert!(!is_python_identifier("2mask"));
    assert!(!is_python_identifier("keplerian-mask"));
    assert!(!is_python_identifier(""));
}

#[test]
fn test_output_tail() {
    assert_eq!(output_tail("", "  \n"), "<no output>");
    assert_eq!(output_tail("", "only stdout\n"), "only stdout");
    assert_eq!(output_tail("err\n", "out\n"), "err");

    let long = (0..30).map(|i| format!("line {i}\n")).collect::<String>();
    let tail = output_tail(&long, "");
    assert_eq!(tail.lines().count(), OUTPUT_TAIL_LINES);
    assert!(tail.starts_with("line 10"));
    assert!(tail.ends_with("line 29"));
}

#[cfg(unix)]
#[test]
fn test_running_tasks() {
    let dir = TempDir::new().unwrap();
    let module = mask_module(dir.path());
    let export = ExportRequest {
        image: Path::new("a.image"),
        fits: Path::new("a.image.fits"),
        overwrite: true,
        drop_stokes: true,
    };

    // The modular flavour hands the script straight to the executable, so
    // "true" and "false" stand in for a Python that succeeds or fails.
    let engine =
        CasaEngine::new(CasaFlavour::Modular, Some(PathBuf::from("true")), &module).unwrap();
    assert!(engine.export_fits(&export).is_ok());

    let engine =
        CasaEngine::new(CasaFlavour::Modular, Some(PathBuf::from("false")), &module).unwrap();
    match engine.export_fits(&export) {
        Err(EngineError::TaskFailed { task, .. }) => assert_eq!(task, "exportfits"),
        other => panic!("Unexpected result: {other:?}"),
    }

    let engine = CasaEngine::new(
        CasaFlavour::Modular,
        Some(dir.path().join("no_such_casa")),
        &module,
    )
    .unwrap();
    assert!(matches!(
        engine.export_fits(&export),
        Err(EngineError::Spawn { .. })
    ));
}

#[cfg(unix)]
#[test]
fn test_stats_without_output_is_an_error() {
    let dir = TempDir::new().unwrap();
    let module = mask_module(dir.path());
    // "true" succeeds without writing any statistics.
    let engine =
        CasaEngine::new(CasaFlavour::Modular, Some(PathBuf::from("true")), &module).unwrap();
    let result = engine.image_stats(&StatsRequest {
        image: Path::new("a.image"),
        chans: "0~30",
    });
    assert!(matches!(result, Err(EngineError::StatsDecode(_))));
}

#[test]
fn test_stats_keep_their_regions() {
    let stats: ImageStats = serde_json::from_str(r#"{"rms": [null, 0.003]}"#).unwrap();
    assert_eq!(stats.rms, [None, Some(0.003)]);
    // The first region's RMS wasn't measured; the second doesn't stand in.
    assert_eq!(stats.rms(), None);

    let stats: ImageStats =
        serde_json::from_str(r#"{"rms": [0.003, null], "max": [0.1], "npts": [250000.0]}"#)
            .unwrap();
    assert_eq!(stats.rms(), Some(0.003));

    let stats: ImageStats = serde_json::from_str("{}").unwrap();
    assert_eq!(stats.rms(), None);
}

#[cfg(unix)]
#[test]
fn test_stats_with_an_unmeasured_first_region() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let module = mask_module(dir.path());
    // Stands in for a Python running the imstat script: non-finite values
    // must be written as null, and the result goes where the script says.
    let python = dir.path().join("python3");
    std::fs::write(
        &python,
        r#"#!/bin/sh
script="$1"
grep -q "else None for v in" "$script" || exit 2
out=$(sed -n "s/^    with open('\([^']*\)'.*/\1/p" "$script")
echo '{"rms": [null, 0.003]}' > "$out"
"#,
    )
    .unwrap();
    std::fs::set_permissions(&python, std::fs::Permissions::from_mode(0o755)).unwrap();

    let engine = CasaEngine::new(CasaFlavour::Modular, Some(python), &module).unwrap();
    let stats = engine
        .image_stats(&StatsRequest {
            image: Path::new("a.image"),
            chans: "0~30",
        })
        .unwrap();
    assert_eq!(stats.rms(), None);
    assert_eq!(stats.rms.len(), 2);
}

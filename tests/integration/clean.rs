// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests against the clean subcommand.

use crate::*;

#[test]
fn test_dry_run() {
    let (_dir, base) = make_base();
    let cmd = aatau_clean()
        .args(["clean", "--dry-run", "--no-progress-bars", "--base", &path_arg(&base)])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Cleaning 9 lines of 3 datasets"));
    assert!(stdout.contains("Dry run"));
    // Nothing was made.
    assert!(!base.join("aatau-alma-analysis").exists());
}

#[test]
fn test_dry_run_with_selection_and_saved_args() {
    let (dir, base) = make_base();
    let saved = dir.path().join("saved.toml");
    let cmd = aatau_clean()
        .args([
            "clean",
            "--dry-run",
            "--save-toml",
            &path_arg(&saved),
            "--base",
            &path_arg(&base),
            "--molecules",
            "HCN",
            "13CO",
        ])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Cleaning 2 lines of 2 datasets"));

    // The saved arguments reproduce the run.
    let saved_args = std::fs::read_to_string(&saved).unwrap();
    assert!(saved_args.contains("HCN"));
    let cmd = aatau_clean()
        .args(["clean", "--dry-run", &path_arg(&saved)])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Cleaning 2 lines of 2 datasets"));
}

#[test]
fn test_missing_base_is_an_error() {
    let dir = TempDir::new().unwrap();
    let cmd = aatau_clean()
        .args([
            "clean",
            "--dry-run",
            "--base",
            &path_arg(&dir.path().join("nowhere")),
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.starts_with("Error: "), "{stderr}");
    assert!(stderr.contains("isn't a directory"), "{stderr}");
}

#[test]
fn test_unknown_molecule_is_an_error() {
    let (_dir, base) = make_base();
    let cmd = aatau_clean()
        .args(["clean", "--dry-run", "--base", &path_arg(&base), "--molecules", "CO"])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("CO"), "{stderr}");
}

#[test]
fn test_missing_casa_fails_every_line() {
    let (dir, base) = make_base();
    let report = dir.path().join("report.json");
    let cmd = aatau_clean()
        .args([
            "clean",
            "--no-progress-bars",
            "--base",
            &path_arg(&base),
            "--casa",
            &path_arg(&dir.path().join("no_casa_here")),
            "--report",
            &path_arg(&report),
        ])
        .ok();
    assert!(cmd.is_err());
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stdout.contains("Cleaned 0/9 lines"), "{stdout}");
    assert!(stderr.contains("9 of 9 lines failed"), "{stderr}");

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    let outcomes = report["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 9);
    for outcome in outcomes {
        assert_eq!(outcome["status"], "failed");
        assert_eq!(outcome["step"], "dirty-pass");
    }
    // Failed lines leave nothing behind.
    let images_dir = base.join("aatau-alma-analysis").join("casa_images");
    assert_eq!(std::fs::read_dir(images_dir).unwrap().count(), 0);
}

/// A shell script stands in for CASA. It reads the task out of the script it's
/// given and makes the images the task would have made.
#[cfg(unix)]
#[test]
fn test_failing_casa_fails_only_its_lines() {
    use std::os::unix::fs::PermissionsExt;

    let (dir, base) = make_base();
    let casa = dir.path().join("casa");
    // The script is the last argument. Images are empty directories. Every
    // exportfits call fails, and anything to do with HCO+ fails earlier.
    std::fs::write(
        &casa,
        r#"#!/bin/sh
for script; do :; done
if grep -q "HCO+" "$script"; then
    echo "SEVERE tclean::task_tclean exception" >&2
    exit 1
fi
if grep -q "^    tclean(" "$script"; then
    imagename=$(sed -n "s/.*imagename='\([^']*\)'.*/\1/p" "$script")
    mkdir -p "$imagename.image" "$imagename.residual"
    exit 0
fi
if grep -q "make_mask(" "$script"; then
    image=$(sed -n "s/.*make_mask(image='\([^']*\)\.image'.*/\1/p" "$script")
    mkdir -p "$image.mask.image"
    exit 0
fi
if grep -q "^    stats = imstat(" "$script"; then
    out=$(sed -n "s/^    with open('\([^']*\)'.*/\1/p" "$script")
    echo '{"rms": [0.003]}' > "$out"
    exit 0
fi
echo "exportfits isn't available here" >&2
exit 1
"#,
    )
    .unwrap();
    std::fs::set_permissions(&casa, std::fs::Permissions::from_mode(0o755)).unwrap();

    let report = dir.path().join("report.json");
    let cmd = aatau_clean()
        .args([
            "clean",
            "--no-progress-bars",
            "--base",
            &path_arg(&base),
            "--casa",
            &path_arg(&casa),
            "--datasets",
            "2013_SG1",
            "--report",
            &path_arg(&report),
        ])
        .ok();
    assert!(cmd.is_err());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Cleaned 0/2 lines"), "{stdout}");

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    let outcomes = report["outcomes"].as_array().unwrap();
    assert_eq!(outcomes[0]["molecule"], "HCN");
    assert_eq!(outcomes[0]["step"], "export");
    assert!(outcomes[0]["reason"]
        .as_str()
        .unwrap()
        .contains("exportfits isn't available here"));
    assert_eq!(outcomes[1]["molecule"], "HCO+");
    assert_eq!(outcomes[1]["step"], "dirty-pass");
    assert!(outcomes[1]["reason"]
        .as_str()
        .unwrap()
        .contains("SEVERE tclean::task_tclean exception"));
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod catalog;
mod clean;

use std::{
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};
use tempfile::TempDir;

use aatau_clean::Catalog;

fn aatau_clean() -> Command {
    Command::cargo_bin("aatau-clean").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

/// A base directory with every visibility set of the built-in catalog (as
/// empty measurement-set directories) and a mask module.
fn make_base() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("couldn't make tmp dir");
    let base = dir.path().join("AATau");
    let catalog = Catalog::builtin();
    for (dataset, line) in catalog.lines() {
        std::fs::create_dir_all(dataset.vis_file(&base, line)).unwrap();
    }
    std::fs::write(
        base.join("keplerian_mask.py"),
        "def make_mask(image, restfreqs, **kwargs):\n    pass\n",
    )
    .unwrap();
    (dir, base)
}

fn path_arg(p: &Path) -> String {
    p.display().to_string()
}

#[test]
fn test_help_is_correct() {
    let mut stdouts = vec![];

    // First with --help
    let cmd = aatau_clean().arg("--help").ok();
    assert!(cmd.is_ok());
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty());
    stdouts.push(stdout);

    // Then with -h
    let cmd = aatau_clean().arg("-h").ok();
    assert!(cmd.is_ok());
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty());
    stdouts.push(stdout);

    for stdout in stdouts {
        assert!(stdout.contains("clean"));
        assert!(stdout.contains("catalog"));
        assert!(stdout.contains("Two-pass CASA imaging"));
    }
}

#[test]
fn test_clean_help_lists_casa_flavours() {
    let cmd = aatau_clean().args(["clean", "--help"]).ok();
    assert!(cmd.is_ok());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("--casa-flavour"));
    assert!(stdout.contains("monolithic, modular"));
    assert!(stdout.contains("--keep-failed-products"));
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests against the catalog subcommand.

use crate::*;

#[test]
fn test_builtin_catalog_is_printed() {
    let cmd = aatau_clean().args(["catalog", "--no-progress-bars"]).ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);

    assert!(stdout.contains("9 lines in 3 datasets"));
    for molecule in [
        "N2H+", "DCO+", "H2CO", "HCN", "HCO+", "CN_SPW1", "CN_SPW3", "C18O", "13CO",
    ] {
        assert!(stdout.contains(molecule), "{molecule} is missing");
    }
    assert!(stdout.contains("contsub_2015"));
    assert!(stdout.contains("contsub_2013SG2"));
}

#[test]
fn test_catalog_with_base_marks_missing_visibilities() {
    let (_dir, base) = make_base();
    std::fs::remove_dir_all(base.join("contsub_2013SG1")).unwrap();

    let cmd = aatau_clean()
        .args(["catalog", "--base", &path_arg(&base)])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    // HCN and HCO+.
    assert_eq!(stdout.matches("(missing)").count(), 2);
}

#[test]
fn test_catalog_toml_can_be_read_back() {
    let dir = TempDir::new().unwrap();
    let cmd = aatau_clean().args(["catalog", "--toml"]).ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("[[datasets]]"));

    // Logging goes to stdout too; keep only the TOML.
    let toml = stdout[stdout.find("[[datasets]]").unwrap()..]
        .lines()
        .take_while(|l| !l.contains("aatau-clean catalog complete"))
        .collect::<Vec<_>>()
        .join("\n");
    let file = dir.path().join("catalog.toml");
    std::fs::write(&file, toml).unwrap();

    let cmd = aatau_clean()
        .args(["catalog", "--catalog", &path_arg(&file)])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));
}

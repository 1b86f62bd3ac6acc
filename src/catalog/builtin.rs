// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The AA Tau ALMA datasets.

use vec1::{vec1, Vec1};

use super::{Catalog, DatasetSpec, LineSpec};

fn line(spw: u32, molecule: &str, line_freq_ghz: f64, restfreqs_ghz: Vec1<f64>) -> LineSpec {
    LineSpec {
        spw,
        molecule: molecule.to_string(),
        line_freq_ghz,
        restfreqs_ghz,
    }
}

impl Catalog {
    /// The catalog of AA Tau lines imaged by default.
    pub fn builtin() -> Catalog {
        Catalog {
            datasets: vec![
                DatasetSpec {
                    name: "2013_SG2".to_string(),
                    vis_template: "AA_Tau_2013_SG2.spw{spw}.selfcal.ms.contsub_fit1".to_string(),
                    width: "0.3km/s".to_string(),
                    contsub_dir: None,
                    lines: vec![
                        line(0, "N2H+", 279.5117491, vec1![279.5117491]),
                        line(2, "DCO+", 288.1438583, vec1![288.1438583]),
                        line(6, "H2CO", 290.623405, vec1![290.623405]),
                    ],
                },
                DatasetSpec {
                    name: "2013_SG1".to_string(),
                    vis_template: "AA_Tau_2013_SG1.spw{spw}.selfcal.ms.contsub_fit1".to_string(),
                    width: "0.2km/s".to_string(),
                    contsub_dir: None,
                    lines: vec![
                        // Hyperfine components.
                        line(
                            0,
                            "HCN",
                            265.8864343,
                            vec1![
                                265.8848912,
                                265.8861886,
                                265.8864339,
                                265.8864343,
                                265.8864999,
                                265.8885221
                            ],
                        ),
                        line(1, "HCO+", 267.5576259, vec1![267.5576259]),
                    ],
                },
                DatasetSpec {
                    name: "2015_SG1".to_string(),
                    vis_template: "AA_Tau_2015_SG1.spw{spw}.selfcal.ms.contsub_fit1".to_string(),
                    width: "0.2km/s".to_string(),
                    // Not "contsub_2015SG1".
                    contsub_dir: Some("contsub_2015".to_string()),
                    lines: vec![
                        line(
                            1,
                            "CN_SPW1",
                            340.24777,
                            vec1![340.24777, 340.248544, 340.2617734, 340.264949, 340.2791201],
                        ),
                        line(
                            3,
                            "CN_SPW3",
                            340.0315494,
                            vec1![340.0081263, 340.0196255, 340.0315494, 340.035408],
                        ),
                        line(5, "C18O", 329.3305525, vec1![329.3305525]),
                        line(6, "13CO", 330.5879653, vec1![330.5879653]),
                    ],
                },
            ],
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::builtin()
    }
}

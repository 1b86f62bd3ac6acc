// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from imaging engines.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Couldn't execute '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("CASA task {task} failed ({status}):\n{output_tail}")]
    TaskFailed {
        task: &'static str,
        status: String,
        output_tail: String,
    },

    #[error("Couldn't write a CASA script: {0}")]
    Script(std::io::Error),

    #[error("Couldn't read the statistics written by imstat: {0}")]
    StatsRead(std::io::Error),

    #[error("Couldn't decode the statistics written by imstat: {0}")]
    StatsDecode(#[from] serde_json::Error),

    #[error("The Keplerian mask module {0} doesn't exist")]
    MaskModuleMissing(PathBuf),

    #[error("The Keplerian mask module {0} doesn't have a usable Python module name")]
    MaskModuleName(PathBuf),

    /// An error from an engine that isn't CASA.
    #[error("{0}")]
    Other(String),
}

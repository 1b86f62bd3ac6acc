// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Drive CASA to do the imaging.
//!
//! Every task call becomes a small Python script that is run by a fresh CASA
//! process. Python exceptions are turned into a non-zero exit code, and
//! `imstat` hands its results back as JSON.

mod python;
#[cfg(test)]
mod tests;

use std::{
    io::Write,
    path::{Path, PathBuf},
    process::Command,
};

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use self::python::{render_call, Kwargs, PyValue};
use super::{
    DeconvolveRequest, Deconvolver, EngineError, ExportRequest, FitsExporter, ImageStatistics,
    ImageStats, MaskMaker, MaskRequest, StatsRequest,
};
use crate::{
    constants::{DEFAULT_CASA_EXECUTABLE, DEFAULT_CASA_PYTHON},
    misc::expensive_op,
    params::ImagingParams,
};

/// How many lines of a failed task's output are kept in the error.
const OUTPUT_TAIL_LINES: usize = 20;

/// The kind of CASA installation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
pub enum CasaFlavour {
    /// A monolithic CASA installation, run as
    /// `casa --nologger --nogui --agg -c <script>`.
    #[strum(serialize = "monolithic")]
    #[serde(rename = "monolithic")]
    Monolithic,

    /// `casatasks` installed into a Python environment, run as
    /// `python3 <script>`.
    #[strum(serialize = "modular")]
    #[serde(rename = "modular")]
    Modular,
}

impl CasaFlavour {
    fn default_executable(self) -> &'static str {
        match self {
            CasaFlavour::Monolithic => DEFAULT_CASA_EXECUTABLE,
            CasaFlavour::Modular => DEFAULT_CASA_PYTHON,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CasaEngine {
    flavour: CasaFlavour,
    executable: PathBuf,

    /// The directory containing the Keplerian mask module; it's put on
    /// Python's path.
    mask_module_dir: PathBuf,

    /// The name `make_mask` is imported from.
    mask_module_name: String,
}

impl CasaEngine {
    /// Set up CASA. `mask_module` is the Python file providing `make_mask`. If
    /// `executable` isn't given, the flavour's usual executable is found on
    /// `PATH`.
    pub fn new(
        flavour: CasaFlavour,
        executable: Option<PathBuf>,
        mask_module: &Path,
    ) -> Result<CasaEngine, EngineError> {
        if !mask_module.is_file() {
            return Err(EngineError::MaskModuleMissing(mask_module.to_path_buf()));
        }
        let mask_module_name = mask_module
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| is_python_identifier(s))
            .ok_or_else(|| EngineError::MaskModuleName(mask_module.to_path_buf()))?
            .to_string();
        let mask_module_dir = match mask_module.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Ok(CasaEngine {
            flavour,
            executable: executable.unwrap_or_else(|| flavour.default_executable().into()),
            mask_module_dir,
            mask_module_name,
        })
    }

    pub fn flavour(&self) -> CasaFlavour {
        self.flavour
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Wrap the body of a task call into a complete script.
    fn script(&self, task: &'static str, body: &str) -> String {
        let imports = match self.flavour {
            // Tasks are builtins of a CASA session.
            CasaFlavour::Monolithic => "",
            CasaFlavour::Modular => "from casatasks import tclean, imstat, exportfits\n",
        };
        let body = body
            .lines()
            .map(|l| format!("    {l}\n"))
            .collect::<String>();
        format!(
            "import sys\nimport json\nimport math\n{imports}\ntry:\n{body}except Exception as e:\n    sys.stderr.write('aatau-clean: {task} raised %r\\n' % (e,))\n    sys.exit(1)\n"
        )
    }

    fn run(&self, task: &'static str, body: &str) -> Result<(), EngineError> {
        let contents = self.script(task, body);
        trace!("CASA script for {task}:\n{contents}");

        let mut script = tempfile::Builder::new()
            .prefix("aatau_clean_")
            .suffix(".py")
            .tempfile()
            .map_err(EngineError::Script)?;
        script
            .write_all(contents.as_bytes())
            .and_then(|_| script.flush())
            .map_err(EngineError::Script)?;
        // Close our handle; the file is deleted when `script` is dropped.
        let script = script.into_temp_path();

        let mut command = Command::new(&self.executable);
        if self.flavour == CasaFlavour::Monolithic {
            command.args(["--nologger", "--nogui", "--agg", "-c"]);
        }
        command.arg(script.as_os_str());
        debug!("Running {task}: {command:?}");

        let output = expensive_op(|| command.output(), &format!("Still running {task}"))
            .map_err(|source| EngineError::Spawn {
                program: self.executable.display().to_string(),
                source,
            })?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        trace!("{task} stdout:\n{stdout}");
        trace!("{task} stderr:\n{stderr}");

        if !output.status.success() {
            return Err(EngineError::TaskFailed {
                task,
                status: output.status.to_string(),
                output_tail: output_tail(&stderr, &stdout),
            });
        }
        Ok(())
    }
}

impl Deconvolver for CasaEngine {
    fn deconvolve(&self, request: &DeconvolveRequest) -> Result<(), EngineError> {
        self.run("tclean", &render_call("tclean", &tclean_kwargs(request)))
    }
}

impl ImageStatistics for CasaEngine {
    fn image_stats(&self, request: &StatsRequest) -> Result<ImageStats, EngineError> {
        let json = tempfile::Builder::new()
            .prefix("aatau_clean_imstat_")
            .suffix(".json")
            .tempfile()
            .map_err(EngineError::Script)?
            .into_temp_path();

        let mut kwargs = Kwargs::new();
        kwargs.insert("imagename", PyValue::path(request.image));
        kwargs.insert("chans", request.chans.into());
        // Non-finite values can't be represented in JSON, so they become null.
        // They keep their place; each entry belongs to a region.
        let body = format!(
            "stats = {}\nout = {{}}\nif stats:\n    for key in ('rms', 'max', 'npts'):\n        if key in stats:\n            out[key] = [float(v) if math.isfinite(float(v)) else None for v in list(stats[key])]\nwith open({}, 'w') as f:\n    json.dump(out, f)",
            render_call("imstat", &kwargs),
            PyValue::path(&json),
        );
        self.run("imstat", &body)?;

        let contents = std::fs::read_to_string(&json).map_err(EngineError::StatsRead)?;
        let stats: ImageStats = serde_json::from_str(&contents)?;
        debug!("imstat on {}: {stats:?}", request.image.display());
        Ok(stats)
    }
}

impl MaskMaker for CasaEngine {
    fn make_mask(&self, request: &MaskRequest) -> Result<(), EngineError> {
        let body = format!(
            "sys.path.insert(0, {})\nfrom {} import make_mask\n{}",
            PyValue::path(&self.mask_module_dir),
            self.mask_module_name,
            render_call("make_mask", &make_mask_kwargs(request)),
        );
        self.run("make_mask", &body)
    }
}

impl FitsExporter for CasaEngine {
    fn export_fits(&self, request: &ExportRequest) -> Result<(), EngineError> {
        let mut kwargs = Kwargs::new();
        kwargs.insert("imagename", PyValue::path(request.image));
        kwargs.insert("fitsimage", PyValue::path(request.fits));
        kwargs.insert("overwrite", request.overwrite.into());
        kwargs.insert("dropstokes", request.drop_stokes.into());
        self.run("exportfits", &render_call("exportfits", &kwargs))
    }
}

fn tclean_kwargs(request: &DeconvolveRequest) -> Kwargs {
    let DeconvolveRequest {
        vis,
        imagename,
        restfreq,
        width,
        threshold,
        niter,
        mask,
        imaging,
    } = request;

    let mut kwargs = Kwargs::new();
    kwargs.insert("vis", PyValue::path(vis));
    kwargs.insert("imagename", PyValue::path(imagename));
    if let Some(mask) = mask {
        kwargs.insert("mask", PyValue::path(mask));
    }
    kwargs.insert("width", (*width).into());
    kwargs.insert("restfreq", restfreq.as_str().into());
    kwargs.insert("threshold", threshold.as_str().into());
    kwargs.insert("niter", (*niter).into());

    let ImagingParams {
        deconvolver,
        scales,
        specmode,
        start,
        nchan,
        outframe,
        interactive,
        imsize,
        cell,
        weighting,
        robust,
        uvtaper,
        restoringbeam,
    } = imaging;
    kwargs.insert("deconvolver", deconvolver.as_str().into());
    kwargs.insert(
        "scales",
        PyValue::List(scales.iter().map(|&s| s.into()).collect()),
    );
    kwargs.insert("specmode", specmode.as_str().into());
    kwargs.insert("start", start.as_str().into());
    kwargs.insert("nchan", (*nchan).into());
    kwargs.insert("outframe", outframe.as_str().into());
    kwargs.insert("interactive", (*interactive).into());
    kwargs.insert(
        "imsize",
        PyValue::List(imsize.iter().map(|&s| s.into()).collect()),
    );
    kwargs.insert("cell", cell.as_str().into());
    kwargs.insert("weighting", weighting.as_str().into());
    kwargs.insert("robust", (*robust).into());
    kwargs.insert("uvtaper", PyValue::str_list(uvtaper));
    kwargs.insert("restoringbeam", restoringbeam.as_str().into());
    kwargs
}

fn make_mask_kwargs(request: &MaskRequest) -> Kwargs {
    let p = request.params;
    let mut kwargs = Kwargs::new();
    kwargs.insert("image", PyValue::path(request.image));
    kwargs.insert(
        "restfreqs",
        PyValue::List(request.restfreqs_hz.iter().map(|&f| f.into()).collect()),
    );
    // `make_mask`'s own keyword names.
    kwargs.insert("inc", p.inc.into());
    kwargs.insert("PA", p.pa.into());
    kwargs.insert("mstar", p.mstar.into());
    kwargs.insert("dist", p.dist.into());
    kwargs.insert("vlsr", p.vlsr.into());
    kwargs.insert("dx0", p.dx0.into());
    kwargs.insert("dy0", p.dy0.into());
    kwargs.insert("nbeams", p.nbeams.into());
    kwargs.insert("dV0", p.dv0.into());
    kwargs.insert("dVq", p.dvq.into());
    kwargs
}

fn is_python_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// The last few lines of a failed task's output, preferring stderr.
fn output_tail(stderr: &str, stdout: &str) -> String {
    let output = if !stderr.trim().is_empty() {
        stderr
    } else if !stdout.trim().is_empty() {
        stdout
    } else {
        return "<no output>".to_string();
    };
    let lines: Vec<&str> = output.trim_end().lines().collect();
    lines[lines.len().saturating_sub(OUTPUT_TAIL_LINES)..].join("\n")
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.


use std::{
    borrow::Cow,
    path::{Path, PathBuf},
    str::FromStr,
};

use clap::Parser;
use itertools::Itertools;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use super::common::{
    display_warnings, InfoPrinter, Warn, ARG_FILE_HELP, CASA_FLAVOUR_HELP, CATALOG_FILE_HELP,
};
use crate::{
    catalog::{read_catalog_file, Catalog, CatalogFile},
    constants::DEFAULT_MASK_MODULE,
    engine::{CasaEngine, CasaFlavour},
    params::{BatchParams, ImagingParams, MaskParams, OutputLayout},
    report::BatchReport,
    AatauCleanError,
};

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct CleanArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    /// The directory containing the continuum-subtracted visibilities (the
    /// "contsub_*" directories). Outputs are written beneath it too. Default:
    /// the current directory.
    #[clap(short, long, parse(from_os_str), help_heading = "INPUT DATA")]
    pub(super) base: Option<PathBuf>,

    #[clap(long, help = CATALOG_FILE_HELP.as_str(), parse(from_os_str), help_heading = "INPUT DATA")]
    pub(super) catalog: Option<PathBuf>,

    /// Only clean lines of these datasets (e.g. 2013_SG1).
    #[clap(long, multiple_values(true), help_heading = "INPUT DATA")]
    pub(super) datasets: Option<Vec<String>>,

    /// Only clean these molecules (e.g. HCO+ 13CO).
    #[clap(long, multiple_values(true), help_heading = "INPUT DATA")]
    pub(super) molecules: Option<Vec<String>>,

    /// Where to write the CASA images. Default:
    /// <base>/aatau-alma-analysis/casa_images
    #[clap(long, parse(from_os_str), help_heading = "OUTPUTS")]
    pub(super) images_dir: Option<PathBuf>,

    /// Where to write the FITS exports. Default:
    /// <base>/aatau-alma-analysis/fits_products
    #[clap(long, parse(from_os_str), help_heading = "OUTPUTS")]
    pub(super) fits_dir: Option<PathBuf>,

    /// Write a JSON report of every line's outcome to this file.
    #[clap(long, parse(from_os_str), help_heading = "OUTPUTS")]
    pub(super) report: Option<PathBuf>,

    /// Leave the images of lines that failed on disk. By default they're
    /// removed.
    #[clap(long, help_heading = "OUTPUTS")]
    #[serde(default)]
    pub(super) keep_failed_products: bool,

    /// Don't open the exported FITS files to check them.
    #[clap(long, help_heading = "OUTPUTS")]
    #[serde(default)]
    pub(super) no_fits_check: bool,

    /// The CASA executable (or, for a modular installation, the Python
    /// interpreter). Default: "casa" or "python3", found on PATH.
    #[clap(long, parse(from_os_str), help_heading = "CASA")]
    pub(super) casa: Option<PathBuf>,

    #[clap(long, help = CASA_FLAVOUR_HELP.as_str(), help_heading = "CASA")]
    pub(super) casa_flavour: Option<String>,

    /// The Python file providing make_mask. Default: <base>/keplerian_mask.py
    #[clap(long, parse(from_os_str), help_heading = "CASA")]
    pub(super) mask_module: Option<PathBuf>,
}

/// Parsed `clean` arguments.
#[derive(Debug)]
pub(super) struct CleanParams {
    pub(super) batch: BatchParams,
    pub(super) flavour: CasaFlavour,
    pub(super) casa: Option<PathBuf>,
    pub(super) mask_module: PathBuf,
    pub(super) report: Option<PathBuf>,
}

impl CleanArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified into
    /// a single struct. Where applicable, it will prefer CLI parameters over
    /// those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<CleanArgs, AatauCleanError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Read in the file arguments. Ensure all of the file args are
            // accounted for by pattern matching.
            let CleanArgs {
                args_file: _,
                base,
                catalog,
                datasets,
                molecules,
                images_dir,
                fits_dir,
                report,
                keep_failed_products,
                no_fits_check,
                casa,
                casa_flavour,
                mask_module,
            } = unpack_arg_file!(arg_file);

            // Merge all the arguments, preferring the CLI args when available.
            Ok(CleanArgs {
                args_file: None,
                base: cli_args.base.or(base),
                catalog: cli_args.catalog.or(catalog),
                datasets: cli_args.datasets.or(datasets),
                molecules: cli_args.molecules.or(molecules),
                images_dir: cli_args.images_dir.or(images_dir),
                fits_dir: cli_args.fits_dir.or(fits_dir),
                report: cli_args.report.or(report),
                keep_failed_products: cli_args.keep_failed_products || keep_failed_products,
                no_fits_check: cli_args.no_fits_check || no_fits_check,
                casa: cli_args.casa.or(casa),
                casa_flavour: cli_args.casa_flavour.or(casa_flavour),
                mask_module: cli_args.mask_module.or(mask_module),
            })
        } else {
            Ok(cli_args)
        }
    }

    pub(super) fn parse(self) -> Result<CleanParams, AatauCleanError> {
        debug!("{:#?}", self);

        let Self {
            args_file: _,
            base,
            catalog,
            datasets,
            molecules,
            images_dir,
            fits_dir,
            report,
            keep_failed_products,
            no_fits_check,
            casa,
            casa_flavour,
            mask_module,
        } = self;

        let base = base.unwrap_or_else(|| PathBuf::from("."));
        if !base.is_dir() {
            return Err(CleanArgsError::BaseNotADir(base).into());
        }

        let (catalog, imaging, mask) = match catalog {
            Some(file) => {
                let CatalogFile {
                    datasets,
                    imaging,
                    mask,
                } = read_catalog_file(&file)?;
                info!("Using the catalog in {}", file.display());
                (
                    Catalog { datasets },
                    imaging.unwrap_or_default(),
                    mask.unwrap_or_default(),
                )
            }
            None => (
                Catalog::builtin(),
                ImagingParams::default(),
                MaskParams::default(),
            ),
        };
        let catalog = if datasets.is_some() || molecules.is_some() {
            catalog.select(datasets.as_deref(), molecules.as_deref())?
        } else {
            catalog
        };

        let mut layout = OutputLayout::from_base(&base);
        if let Some(images_dir) = images_dir {
            layout.images_dir = images_dir;
        }
        if let Some(fits_dir) = fits_dir {
            layout.fits_dir = fits_dir;
        }

        let flavour = match casa_flavour {
            Some(f) => CasaFlavour::from_str(&f.to_lowercase())
                .map_err(|_| CleanArgsError::InvalidCasaFlavour(f))?,
            None => CasaFlavour::Monolithic,
        };
        let mask_module = mask_module.unwrap_or_else(|| base.join(DEFAULT_MASK_MODULE));

        let params = CleanParams {
            batch: BatchParams {
                base,
                layout,
                catalog,
                imaging,
                mask,
                keep_failed_products,
                check_fits: !no_fits_check,
            },
            flavour,
            casa,
            mask_module,
            report,
        };
        params.display();
        display_warnings();

        Ok(params)
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), AatauCleanError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        params.run()
    }
}

impl CleanParams {
    /// Print what's going to happen, and warn about anything that looks like it
    /// will fail.
    fn display(&self) {
        let batch = &self.batch;

        let mut printer = InfoPrinter::new(
            format!(
                "Cleaning {} lines of {} datasets",
                batch.catalog.num_lines(),
                batch.catalog.datasets.len()
            )
            .into(),
        );
        printer.push_line(format!("Base directory: {}", batch.base.display()).into());
        for dataset in &batch.catalog.datasets {
            let missing = dataset
                .lines
                .iter()
                .filter(|l| !dataset.vis_file(&batch.base, l).exists())
                .map(|l| l.molecule.as_str())
                .collect::<Vec<_>>();
            if !missing.is_empty() {
                format!(
                    "{}: no visibilities in {} for {}; these lines will fail",
                    dataset.name,
                    batch.base.join(dataset.contsub_dir().as_ref()).display(),
                    missing.join(", ")
                )
                .warn();
            }

            printer.push_block(vec![
                format!("{} ({})", dataset.name, dataset.contsub_dir()).into(),
                format!("width {}", dataset.width).into(),
                dataset
                    .lines
                    .iter()
                    .map(|l| format!("{} (spw {})", l.molecule, l.spw))
                    .join(", ")
                    .into(),
            ]);
        }
        printer.push_block(vec![
            format!("CASA images: {}", batch.layout.images_dir.display()).into(),
            format!("FITS files:  {}", batch.layout.fits_dir.display()).into(),
        ]);
        let mut casa_block: Vec<Cow<'static, str>> =
            vec![format!("CASA: {} installation", self.flavour).into()];
        if let Some(casa) = &self.casa {
            casa_block.push(format!("executable: {}", casa.display()).into());
        }
        casa_block.push(format!("mask module: {}", self.mask_module.display()).into());
        printer.push_block(casa_block);
        printer.display();

        if !self.mask_module.is_file() {
            format!(
                "The mask module {} doesn't exist; nothing can be cleaned without it",
                self.mask_module.display()
            )
            .warn();
        }
        if batch.keep_failed_products {
            "Images of lines that fail will be left on disk".warn();
        }
    }

    fn run(self) -> Result<(), AatauCleanError> {
        let CleanParams {
            batch,
            flavour,
            casa,
            mask_module,
            report: report_file,
        } = self;

        let engine = CasaEngine::new(flavour, casa, &mask_module)?;
        debug!(
            "Running {} CASA tasks with {}",
            engine.flavour(),
            engine.executable().display()
        );
        let report = batch.run(&engine)?;
        report.display();
        display_warnings();

        if let Some(file) = report_file {
            write_report(&report, &file)?;
            info!("Wrote the report to {}", file.display());
        }

        let failed = report.num_failed();
        if failed > 0 {
            return Err(AatauCleanError::LinesFailed {
                failed,
                total: report.outcomes.len(),
            });
        }
        Ok(())
    }
}

fn write_report(report: &BatchReport, file: &Path) -> Result<(), CleanArgsError> {
    report
        .write_json(file)
        .map_err(|source| CleanArgsError::Report {
            file: file.to_path_buf(),
            source,
        })
}

#[derive(thiserror::Error, Debug)]
pub(super) enum CleanArgsError {
    #[error("The base directory {0} doesn't exist or isn't a directory")]
    BaseNotADir(PathBuf),

    #[error("'{0}' isn't a CASA flavour; expected 'monolithic' or 'modular'")]
    InvalidCasaFlavour(String),

    #[error("Couldn't write the report to {file}: {source}")]
    Report {
        file: PathBuf,
        source: std::io::Error,
    },
}

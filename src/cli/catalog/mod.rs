// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.


use std::{borrow::Cow, path::PathBuf};

use clap::Parser;
use itertools::Itertools;
use log::debug;

use super::common::{InfoPrinter, CATALOG_FILE_HELP};
use crate::{
    catalog::{read_catalog_file, Catalog, CatalogFile},
    AatauCleanError,
};

#[derive(Parser, Debug, Clone, Default)]
pub(super) struct CatalogArgs {
    #[clap(long, help = CATALOG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) catalog: Option<PathBuf>,

    /// Also show where each line's visibilities are expected under this
    /// directory, and whether they're there.
    #[clap(short, long, parse(from_os_str))]
    pub(super) base: Option<PathBuf>,

    /// Print the catalog as a catalog file (TOML), with the imaging and mask
    /// parameters. This is a good starting point for a custom catalog.
    #[clap(long)]
    pub(super) toml: bool,
}

impl CatalogArgs {
    pub(super) fn run(self) -> Result<(), AatauCleanError> {
        let CatalogArgs {
            catalog,
            base,
            toml,
        } = self;

        let catalog_file = match catalog {
            Some(file) => read_catalog_file(&file)?,
            None => CatalogFile {
                datasets: Catalog::builtin().datasets,
                imaging: None,
                mask: None,
            },
        };

        if toml {
            // Not logged; this is meant to be redirected into a file.
            println!("{}", catalog_toml(catalog_file)?);
            return Ok(());
        }

        let catalog = Catalog {
            datasets: catalog_file.datasets,
        };
        let mut printer = InfoPrinter::new(
            format!(
                "{} lines in {} datasets",
                catalog.num_lines(),
                catalog.datasets.len()
            )
            .into(),
        );
        for dataset in &catalog.datasets {
            let mut block: Vec<Cow<'static, str>> = vec![format!(
                "{}: {} ({}), width {}",
                dataset.name,
                dataset.contsub_dir(),
                dataset.vis_template,
                dataset.width
            )
            .into()];
            for line in &dataset.lines {
                let mut description = format!(
                    "  spw {} {}: {}",
                    line.spw,
                    line.molecule,
                    line.restfreq_str()
                );
                if line.is_blended() {
                    description.push_str(&format!(
                        " (rest frequencies {} GHz)",
                        line.restfreqs_ghz.iter().join(", ")
                    ));
                }
                if let Some(base) = base.as_deref() {
                    let vis = dataset.vis_file(base, line);
                    let missing = if vis.exists() { "" } else { " (missing)" };
                    description.push_str(&format!("\n    {}{missing}", vis.display()));
                }
                block.push(description.into());
            }
            printer.push_block(block);
        }
        printer.display();

        Ok(())
    }
}

/// Render a catalog file, filling in the default imaging and mask parameters
/// where they weren't given.
fn catalog_toml(catalog_file: CatalogFile) -> Result<String, AatauCleanError> {
    debug!("Serialising the catalog to toml");
    let catalog_file = CatalogFile {
        imaging: Some(catalog_file.imaging.unwrap_or_default()),
        mask: Some(catalog_file.mask.unwrap_or_default()),
        ..catalog_file
    };
    toml::to_string(&catalog_file)
        .map_err(|e| AatauCleanError::Generic(format!("Couldn't write the catalog as toml: {e}")))
}

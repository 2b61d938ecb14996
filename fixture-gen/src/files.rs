// SPDX-FileCopyrightText: fixture-gen contributors
//
// SPDX-License-Identifier: MIT

use log::info;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use variants::{VARIANTS, Variant};

use crate::render::{RenderError, RenderOptions, render};

/// A template and the naming scheme of the files rendered from it.
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub file: &'static str,
    prefix: &'static str,
    extension: &'static str,
}

impl Template {
    pub fn output_name(&self, variant: &Variant) -> String {
        format!("{}{}.{}", self.prefix, variant.name(), self.extension)
    }
}

pub const TEMPLATES: [Template; 3] = [
    Template {
        file: "integration.bats.template",
        prefix: "",
        extension: "bats",
    },
    Template {
        file: "BasicTestMountSPC.yaml.template",
        prefix: "BasicTestMountSPC-",
        extension: "yaml",
    },
    Template {
        file: "BasicTestMount.yaml.template",
        prefix: "BasicTestMount-",
        extension: "yaml",
    },
];

/// Names of every file [`generate_all`] writes, grouped by template.
pub fn generated_files() -> Vec<String> {
    TEMPLATES
        .iter()
        .flat_map(|t| VARIANTS.iter().map(|v| t.output_name(v)))
        .collect()
}

/// Renders every template for every variant, in matrix order.
pub fn generate_all(
    template_dir: &Path,
    output_dir: &Path,
    options: &RenderOptions,
) -> Result<Vec<PathBuf>, RenderError> {
    let mut generated = Vec::with_capacity(TEMPLATES.len() * VARIANTS.len());
    for variant in &VARIANTS {
        info!("Generating files for {}...", variant.name());
        for template in &TEMPLATES {
            let output_path = output_dir.join(template.output_name(variant));
            render(
                &template_dir.join(template.file),
                &output_path,
                variant,
                options,
            )?;
            info!("  Generated: {}", output_path.display());
            generated.push(output_path);
        }
    }
    Ok(generated)
}

/// Removes previously generated files from `dir`. Files that are already
/// gone are skipped.
pub fn cleanup_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut removed = vec![];
    for name in generated_files() {
        let path = dir.join(name);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Removed {}", path.display());
                removed.push(path);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }
    info!("Generated files cleaned up");
    Ok(removed)
}

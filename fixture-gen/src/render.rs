// SPDX-FileCopyrightText: fixture-gen contributors
//
// SPDX-License-Identifier: MIT

use log::debug;
use std::{fs, io, path::Path, path::PathBuf};
use variants::Variant;

use crate::snippets;

/// How the generated suites install the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Install through the EKS addon instead of Helm plus the provider manifest.
    pub addon: bool,
    pub addon_version: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to read template {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Every `{{KEY}}` token known for `variant`, paired with its replacement.
/// Variant attributes come first, then the computed shell blocks.
pub fn placeholders(variant: &Variant, options: &RenderOptions) -> Vec<(String, String)> {
    let computed = [
        ("AUTH_SETUP", snippets::auth_setup(variant)),
        ("INSTALL_METHOD", snippets::install_method(variant, options)),
        ("TEARDOWN_CLEANUP", snippets::teardown_cleanup(variant)),
        ("POD_IDENTITY_PARAM", snippets::pod_identity_param(variant)),
        ("PRIVREPO_CHECK", snippets::privrepo_check(options)),
        (
            "INSTALL_PROVIDER_TEST",
            snippets::install_provider_test(variant, options),
        ),
    ];

    variant
        .attributes()
        .into_iter()
        .chain(computed)
        .map(|(key, value)| (format!("{{{{{key}}}}}"), value))
        .collect()
}

/// Literal substitution; tokens without a replacement are left as they are.
pub fn render_str(template: &str, variant: &Variant, options: &RenderOptions) -> String {
    placeholders(variant, options)
        .iter()
        .fold(template.to_string(), |content, (token, value)| {
            content.replace(token, value)
        })
}

pub fn render(
    template_path: &Path,
    output_path: &Path,
    variant: &Variant,
    options: &RenderOptions,
) -> Result<(), RenderError> {
    let template = fs::read_to_string(template_path).map_err(|source| RenderError::Read {
        path: template_path.to_path_buf(),
        source,
    })?;

    let content = render_str(&template, variant, options);

    fs::write(output_path, content).map_err(|source| RenderError::Write {
        path: output_path.to_path_buf(),
        source,
    })?;
    debug!(
        "Rendered {} to {}",
        template_path.display(),
        output_path.display()
    );
    Ok(())
}

// SPDX-FileCopyrightText: fixture-gen contributors
//
// SPDX-License-Identifier: MIT

use anyhow::Result;
use clap::{Parser, ValueEnum};
use env_logger::Env;
use fixture_gen::{RenderOptions, cleanup_files, generate_all};
use log::info;
use provisioner::aws::AwsBackend;
use provisioner::resources::{DEFAULT_FAILOVER_REGION, DEFAULT_REGION};
use provisioner::{Action, Regions, image, manage_all};
use std::path::PathBuf;

const USAGE: &str = "\x1b[36mUsage:
  fixture-gen                 # Generate files and create secrets
  fixture-gen --addon         # Generate files with EKS addon installation
  fixture-gen --addon --version v2.1.1-eksbuild.1  # Generate with specific addon version
  fixture-gen generate-files  # Generate files only
  fixture-gen create-secrets  # Create secrets only
  fixture-gen cleanup-secrets # Cleanup secrets only
  fixture-gen cleanup-files   # Cleanup generated files only
  fixture-gen validate-image  # Validate ECR image from PRIVREPO env var\x1b[0m";

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Command {
    /// Create secrets and parameters, then generate files
    Default,
    CreateSecrets,
    CleanupSecrets,
    /// Generate files without touching AWS
    #[value(alias = "generate-only")]
    GenerateFiles,
    CleanupFiles,
    /// Check that the image in PRIVREPO exists
    ValidateImage,
}

// No automatic --version: the flag names the addon version.
#[derive(Parser, Debug)]
#[command(author, about, long_about = None)]
struct Args {
    #[arg(value_enum, default_value_t = Command::Default)]
    action: Command,

    /// Install the provider through the EKS addon instead of Helm
    #[arg(long)]
    addon: bool,

    /// Addon version to install, e.g. v2.1.1-eksbuild.1
    #[arg(long)]
    version: Option<String>,

    /// Directory holding the *.template files
    #[arg(long, default_value = ".")]
    template_dir: PathBuf,

    /// Directory the generated files are written to and cleaned from
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    #[arg(long, env = "REGION", default_value = DEFAULT_REGION)]
    region: String,

    #[arg(long, env = "FAILOVERREGION", default_value = DEFAULT_FAILOVER_REGION)]
    failover_region: String,

    /// Private provider image, checked by validate-image
    #[arg(long, env = "PRIVREPO")]
    privrepo: Option<String>,
}

async fn manage_secrets(regions: &Regions, action: Action) -> Result<()> {
    let backend = AwsBackend::new(regions).await;
    manage_all(&backend, regions, action).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let regions = Regions::new(&args.region, &args.failover_region);

    match args.action {
        Command::ValidateImage => {
            let validated = image::validate_uri(args.privrepo.as_deref()).await?;
            println!("{validated}");
            return Ok(());
        }
        Command::CleanupFiles => {
            cleanup_files(&args.output_dir)?;
            return Ok(());
        }
        Command::CreateSecrets => return manage_secrets(&regions, Action::Create).await,
        Command::CleanupSecrets => return manage_secrets(&regions, Action::Cleanup).await,
        Command::GenerateFiles => {}
        Command::Default => manage_secrets(&regions, Action::Create).await?,
    }

    let options = RenderOptions {
        addon: args.addon,
        addon_version: args.version,
    };
    generate_all(&args.template_dir, &args.output_dir, &options)?;

    info!("All test files generated successfully");
    println!("{USAGE}");
    Ok(())
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use experiment_deploy_core::{
    ClientGlue, DeployConfig, DeployService, ManifestScripts, PackageManifest, ProvisionOptions,
    ResourceGroup,
};
use log::{error, info, warn};

mod output;
mod prompt;

use prompt::TerminalConfirmer;

const EXIT_SUCCESS: i32 = 0;
/// A branch or teardown step failed.
const EXIT_FAILURE: i32 = 1;
/// Nothing was attempted: bad arguments, project or configuration.
const EXIT_USAGE: i32 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "experiment-deploy",
    version,
    about = "Provision and decommission the AWS resources behind an experiment project",
    long_about = "Creates (or deletes) a public static-website bucket for the experiment and a \
separate uploads bucket that browsers write to with anonymous, write-only Cognito credentials."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// AWS region (defaults to the configured region, then us-east-2)
    #[arg(long, global = true, env = "AWS_REGION")]
    region: Option<String>,

    /// Named AWS credentials profile
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Project directory containing package.json
    #[arg(long, global = true, default_value = ".")]
    project_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the website bucket, uploads bucket, identity pool and upload role
    Provision {
        /// Base application name (defaults to the package.json name)
        #[arg(long)]
        app_name: Option<String>,

        /// Delete the resources of a branch that fails part way through
        #[arg(long)]
        rollback_on_failure: bool,
    },

    /// Delete the resources created by `provision`
    Decommission {
        /// Base application name (defaults to the package.json name)
        #[arg(long)]
        app_name: Option<String>,

        /// Confirm every destructive group without prompting
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            EXIT_USAGE
        }
    };
    std::process::exit(code);
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    let config = DeployConfig::new(cli.region, cli.profile);

    match cli.command {
        Command::Provision {
            app_name,
            rollback_on_failure,
        } => {
            let manifest = load_manifest(&cli.project_dir, app_name.is_some()).await?;
            let app_name = resolve_app_name(app_name, manifest.as_ref())?;
            let options = ProvisionOptions {
                rollback_on_failure,
            };
            provision(&config, &cli.project_dir, &app_name, manifest, options).await
        }
        Command::Decommission { app_name, yes } => {
            let manifest = load_manifest(&cli.project_dir, app_name.is_some()).await?;
            let app_name = resolve_app_name(app_name, manifest.as_ref())?;
            decommission(&config, &app_name, manifest, yes).await
        }
    }
}

/// The manifest is only optional when the app name was given explicitly.
async fn load_manifest(project_dir: &Path, has_app_name: bool) -> Result<Option<PackageManifest>> {
    match PackageManifest::load(project_dir).await {
        Ok(manifest) => Ok(Some(manifest)),
        Err(e) if has_app_name => {
            warn!("{}; project scripts will not be updated", e);
            Ok(None)
        }
        Err(e) => Err(e).context("Could not determine the application name; pass --app-name"),
    }
}

fn resolve_app_name(
    app_name: Option<String>,
    manifest: Option<&PackageManifest>,
) -> Result<String> {
    if let Some(name) = app_name {
        return Ok(name);
    }
    manifest
        .and_then(PackageManifest::name)
        .map(str::to_string)
        .context("package.json has no \"name\"; pass --app-name")
}

async fn provision(
    config: &DeployConfig,
    project_dir: &Path,
    app_name: &str,
    manifest: Option<PackageManifest>,
    options: ProvisionOptions,
) -> Result<i32> {
    let service = DeployService::from_config(config)
        .await
        .context("Failed to initialize AWS clients")?;

    let report = service.provision(app_name, options).await;
    let mut side_effects_ok = true;

    if let Ok(uploads) = &report.uploads.outcome {
        if let Err(e) = ClientGlue::new(&report.region, uploads)
            .write_to(project_dir)
            .await
        {
            error!("Failed to write the upload client: {}", e);
            side_effects_ok = false;
        }
    }

    if let Some(mut manifest) = manifest {
        let scripts = ManifestScripts::for_app(app_name);
        let mut groups = Vec::new();
        if report.website.is_success() {
            groups.push(ResourceGroup::Website);
        }
        if report.uploads.is_success() {
            groups.push(ResourceGroup::Uploads);
        }

        if !groups.is_empty() {
            let updated = groups
                .into_iter()
                .try_for_each(|group| manifest.merge_scripts(group, &scripts));
            let saved = match updated {
                Ok(()) => manifest.save().await,
                Err(e) => Err(e),
            };
            match saved {
                Ok(()) => info!("Updated scripts in {}", manifest.path().display()),
                Err(e) => {
                    error!("Failed to update {}: {}", manifest.path().display(), e);
                    side_effects_ok = false;
                }
            }
        }
    }

    output::print_provision_report(&report);

    Ok(if report.is_success() && side_effects_ok {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    })
}

async fn decommission(
    config: &DeployConfig,
    app_name: &str,
    manifest: Option<PackageManifest>,
    yes: bool,
) -> Result<i32> {
    let service = DeployService::from_config(config)
        .await
        .context("Failed to initialize AWS clients")?;

    let confirmer = TerminalConfirmer::new(yes);
    let report = service.decommission(app_name, &confirmer).await;
    let mut side_effects_ok = true;

    if let Some(mut manifest) = manifest {
        let mut removed = 0;
        if report.website.is_complete() {
            removed += manifest.remove_scripts(ResourceGroup::Website);
        }
        if report.uploads.is_complete() {
            removed += manifest.remove_scripts(ResourceGroup::Uploads);
        }
        if removed > 0 {
            if let Err(e) = manifest.save().await {
                error!("Failed to update {}: {}", manifest.path().display(), e);
                side_effects_ok = false;
            }
        }
    }

    output::print_decommission_report(&report);

    Ok(if report.is_success() && side_effects_ok {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    })
}

//! chartvend - vendor upstream Helm charts and carry local customizations forward

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use chartvend_core::SystemRunner;
use chartvend_repo::{ClientSettings, HelmRepoClient};

mod commands;
mod display;
mod error;
mod exit_codes;

use error::Result;

#[derive(Parser)]
#[command(name = "chartvend")]
#[command(author = "chartvend Contributors")]
#[command(version)]
#[command(
    about = "Vendor upstream Helm charts and carry local customizations across version bumps",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Repository configuration file
    #[arg(long, global = true, env = "CHARTVEND_REPOSITORY_CONFIG")]
    repository_config: Option<PathBuf>,

    /// Directory for cached repository indexes
    #[arg(long, global = true, env = "CHARTVEND_REPOSITORY_CACHE")]
    repository_cache: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Pull an upstream chart version and re-apply local customizations
    Pull {
        /// Chart name
        #[arg(short, long)]
        chart: String,

        /// Upstream chart version to pull
        #[arg(short, long)]
        version: String,

        /// Chart repository URL (http(s)://, file:// or a local path)
        #[arg(short, long)]
        repo: String,

        /// Charts root directory
        #[arg(short, long)]
        dir: PathBuf,

        /// Version directory to vendor into (defaults to --version)
        #[arg(short, long)]
        target_version: Option<String>,

        /// Keep a pristine copy of the upstream chart and a provenance record
        #[arg(short = 'u', long, default_value_t = true, action = ArgAction::Set)]
        upstream_provenance: bool,

        /// Carry customizations from an earlier version onto the pulled one
        #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
        patch: bool,

        /// Version to take customizations from (defaults to the closest lower version)
        #[arg(short = 's', long)]
        patch_version: Option<String>,
    },

    /// Apply a patch file to a vendored chart version
    Patch {
        /// Chart name
        #[arg(short, long)]
        chart: String,

        /// Chart version to patch
        #[arg(short, long)]
        version: String,

        /// Charts root directory
        #[arg(short, long)]
        dir: PathBuf,

        /// Patch file to apply
        #[arg(short = 'f', long)]
        patch_file: PathBuf,
    },

    /// Write the customization patch of a vendored chart version
    Diff {
        /// Chart name
        #[arg(short, long)]
        chart: String,

        /// Chart version to compare with its upstream copy
        #[arg(short, long)]
        version: String,

        /// Charts root directory
        #[arg(short, long)]
        dir: PathBuf,
    },
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}

fn client_settings(config: Option<PathBuf>, cache: Option<PathBuf>) -> Result<ClientSettings> {
    if let (Some(config), Some(cache)) = (&config, &cache) {
        return Ok(ClientSettings::new(config, cache));
    }
    let defaults = ClientSettings::default_paths()?;
    Ok(ClientSettings::new(
        config.unwrap_or(defaults.repository_config),
        cache.unwrap_or(defaults.repository_cache),
    ))
}

async fn run(cli: Cli) -> Result<()> {
    let runner = SystemRunner;

    match cli.command {
        Commands::Pull {
            chart,
            version,
            repo,
            dir,
            target_version,
            upstream_provenance,
            patch,
            patch_version,
        } => {
            let args = commands::pull::PullArgs {
                chart,
                version,
                repo,
                dir,
                target_version,
                upstream_provenance,
                patch,
                patch_version,
            };
            let settings = client_settings(cli.repository_config, cli.repository_cache)?;
            let client = HelmRepoClient::new(settings)?;
            commands::pull::run(&args, &client, &runner).await
        }

        Commands::Patch {
            chart,
            version,
            dir,
            patch_file,
        } => commands::patch::run(&chart, &version, &dir, &patch_file, &runner),

        Commands::Diff {
            chart,
            version,
            dir,
        } => commands::diff::run(&chart, &version, &dir, &runner),
    }
}

#[tokio::main]
async fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_pull_flags() {
        let cli = Cli::try_parse_from([
            "chartvend", "pull", "-c", "keycloak", "-v", "18.4.0", "-r",
            "https://codecentric.github.io/helm-charts", "-d", "charts", "-u", "false",
        ])
        .unwrap();

        match cli.command {
            Commands::Pull {
                upstream_provenance,
                patch,
                target_version,
                ..
            } => {
                assert!(!upstream_provenance);
                assert!(patch);
                assert!(target_version.is_none());
            }
            _ => panic!("expected pull"),
        }
    }

    #[test]
    fn test_pull_requires_repo() {
        let result = Cli::try_parse_from([
            "chartvend", "pull", "-c", "keycloak", "-v", "18.4.0", "-d", "charts",
        ]);
        assert!(result.is_err());
    }
}

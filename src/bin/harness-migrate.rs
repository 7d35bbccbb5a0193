//! # Harness Migrate CLI
//!
//! Command-line entry point: migrates configuration from a source Harness
//! account to a destination account, or lists and exports it in dry-run mode.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use harness_migrate::config::MigrationConfig;
use harness_migrate::logging::init_logging;
use harness_migrate::runner::MigrationRunner;
use harness_migrate::scheduler::{select_phases, validate_phase_order, PHASES};

#[derive(Parser, Debug)]
#[command(name = "harness-migrate")]
#[command(about = "Migrate configuration between Harness accounts")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration file path (default: ./harness-migrate.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Source account API key
    #[arg(long)]
    source_api_key: Option<String>,

    /// Source account identifier
    #[arg(long)]
    source_account_id: Option<String>,

    /// Destination account API key (not needed with --dry-run)
    #[arg(long)]
    dest_api_key: Option<String>,

    /// Destination account identifier (not needed with --dry-run)
    #[arg(long)]
    dest_account_id: Option<String>,

    /// API gateway base URL for both accounts
    #[arg(long)]
    base_url: Option<String>,

    /// Only migrate resources of this organization
    #[arg(long)]
    org_identifier: Option<String>,

    /// Only migrate resources of this project (requires --org-identifier)
    #[arg(long)]
    project_identifier: Option<String>,

    /// Resource types to migrate, comma separated (default: all)
    #[arg(long, value_delimiter = ',')]
    resource_types: Vec<String>,

    /// Resource types to leave out, comma separated
    #[arg(long, value_delimiter = ',')]
    exclude_resource_types: Vec<String>,

    /// List and export resources without writing to the destination
    #[arg(long)]
    dry_run: bool,

    /// Directory for exported resource definitions
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Do not write exported resource definitions
    #[arg(long)]
    no_export: bool,

    /// Delay after every write and page fetch, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Exit with status 1 when any resource failed
    #[arg(long)]
    fail_on_errors: bool,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the phase execution order
    ListPhases,
    /// Write a configuration file with default settings
    InitConfig {
        /// Where to write the file
        #[arg(default_value = "harness-migrate.toml")]
        path: PathBuf,
    },
}

impl Cli {
    /// Flags override file and environment settings
    fn apply_to(&self, config: &mut MigrationConfig) {
        if let Some(key) = &self.source_api_key {
            config.source.api_key = key.clone();
        }
        if let Some(account) = &self.source_account_id {
            config.source.account_id = account.clone();
        }
        if let Some(key) = &self.dest_api_key {
            config.destination.api_key = key.clone();
        }
        if let Some(account) = &self.dest_account_id {
            config.destination.account_id = account.clone();
        }
        if let Some(url) = &self.base_url {
            config.source.base_url = url.clone();
            config.destination.base_url = url.clone();
        }
        if self.org_identifier.is_some() {
            config.run.org_identifier = self.org_identifier.clone();
        }
        if self.project_identifier.is_some() {
            config.run.project_identifier = self.project_identifier.clone();
        }
        if !self.resource_types.is_empty() {
            config.run.resource_types = self.resource_types.clone();
        }
        if !self.exclude_resource_types.is_empty() {
            config.run.exclude_resource_types = self.exclude_resource_types.clone();
        }
        if self.dry_run {
            config.run.dry_run = true;
        }
        if let Some(dir) = &self.export_dir {
            config.run.export_dir = dir.clone();
        }
        if self.no_export {
            config.run.export_enabled = false;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.run.delay_ms = delay_ms;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Some(Commands::ListPhases) => {
            for (index, phase) in PHASES.iter().enumerate() {
                let levels: Vec<String> = phase.scope_levels.iter().map(ToString::to_string).collect();
                println!("{:>2}. {:<36} [{}]", index + 1, phase.name(), levels.join(", "));
            }
            return Ok(ExitCode::SUCCESS);
        }
        Some(Commands::InitConfig { path }) => {
            MigrationConfig::default()
                .save_to_file(path)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote default configuration to {}", path.display());
            return Ok(ExitCode::SUCCESS);
        }
        None => {}
    }

    let mut config = match &cli.config {
        Some(path) => MigrationConfig::load_with_file(path)?,
        None => MigrationConfig::load()?,
    };
    cli.apply_to(&mut config);

    validate_phase_order().context("built-in phase order is inconsistent")?;
    let phases = select_phases(&config.run.resource_types, &config.run.exclude_resource_types)?;

    info!(
        source_account = %config.source.account_id,
        destination_account = %config.destination.account_id,
        dry_run = config.run.dry_run,
        phases = phases.len(),
        "Harness migration starting"
    );

    let mut runner = MigrationRunner::from_config(&config).context("invalid migration configuration")?;
    let report = runner.run(&phases).await;

    println!("{report}");

    if cli.fail_on_errors && report.has_failures() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

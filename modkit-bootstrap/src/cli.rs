//! `modkit-seed` command line.

use crate::logging::LogFormat;
use crate::{BootstrapReport, Bootstrapper};
use clap::Parser;
use modkit_core::{BootstrapOptions, ConfigError, ModkitError, SeedConfig};
use modkit_storage::snapshot::{self, SnapshotError};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "modkit-seed")]
#[command(about = "Load the default tracker configuration into an empty store")]
pub struct SeedArgs {
    /// JSON store snapshot; created if missing.
    #[arg(long)]
    pub store: PathBuf,

    /// Seed configuration file (TOML).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Locale for role, priority and query names. Defaults to the config value.
    #[arg(long)]
    pub locale: Option<String>,

    /// Skip workflow transition generation.
    #[arg(long)]
    pub no_workflow: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Run the bootstrap without writing the snapshot back.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Bootstrap(#[from] ModkitError),
}

/// Result of one invocation.
#[derive(Debug)]
pub enum SeedOutcome {
    Seeded(BootstrapReport),
    AlreadyConfigured,
}

/// Load the snapshot, bootstrap it and save it back.
///
/// The snapshot lock is held from load through save, so concurrent runs
/// against one file see each other's writes.
pub fn run(args: &SeedArgs) -> Result<SeedOutcome, SeedError> {
    let config = SeedConfig::load(args.config.as_deref())?;
    let locale = args.locale.clone().unwrap_or_else(|| config.locale.clone());
    let options = if args.no_workflow {
        BootstrapOptions::without_workflow()
    } else {
        BootstrapOptions::default()
    };

    let _lock = snapshot::lock(&args.store)?;
    let store = snapshot::load(&args.store)?;
    let result = Bootstrapper::new(&store)
        .with_config(config)
        .bootstrap(&locale, options);

    match result {
        Ok(report) => {
            if args.dry_run {
                tracing::info!(path = %args.store.display(), "dry run, snapshot not written");
            } else {
                snapshot::save(&args.store, &store)?;
            }
            Ok(SeedOutcome::Seeded(report))
        }
        Err(ModkitError::AlreadyBootstrapped) => Ok(SeedOutcome::AlreadyConfigured),
        Err(e) => Err(e.into()),
    }
}

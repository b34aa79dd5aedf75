use clap::Parser;
use modkit_bootstrap::cli::{self, SeedArgs, SeedOutcome};
use modkit_bootstrap::logging;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = SeedArgs::parse();
    if let Err(e) = logging::init(args.log_format) {
        eprintln!("failed to initialise logging: {}", e);
    }

    match cli::run(&args) {
        Ok(SeedOutcome::Seeded(report)) => {
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::warn!(error = %e, "could not render report"),
            }
            ExitCode::SUCCESS
        }
        Ok(SeedOutcome::AlreadyConfigured) => {
            tracing::info!("store already configured, nothing to do");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "bootstrap failed");
            ExitCode::FAILURE
        }
    }
}

use clap::Parser;
use flux_reconcile::cli::Cli;
use flux_reconcile::command::run;
use reconcile_framework::tracing::setup_tracing;
use std::process::ExitCode;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    // Setup tracing once for the entire application
    setup_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(done) => {
            match done.revision {
                Some(revision) => println!("fetched revision {revision}"),
                None => println!("{} reconciled", done.key),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Reconciliation failed");
            eprintln!("✗ {e}");
            ExitCode::FAILURE
        }
    }
}

//! Binder CLI
//!
//! Inspect how service binding references resolve against a cluster.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use binder_cli::Cli;
use binder_common::telemetry::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(cli.log_format) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let retryable = e.is_retryable();
            error!(error = %e, retryable, "command failed");
            eprintln!("error: {e}");
            if retryable {
                eprintln!("note: this failure is transient, retrying may succeed");
            } else {
                eprintln!("note: this failure will not go away on retry");
            }
            ExitCode::FAILURE
        }
    }
}

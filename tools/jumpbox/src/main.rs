use std::process::ExitCode;

use clap::Parser;
use common::{
    command::command_runner,
    preflight::APT_GET,
    procedure::ProcedureFailure,
    success,
    tracing::{exit_fatal, init_tracing},
};
use jumpbox::{cli::Cli, inputs::JumpboxInputs, provision, PROCEDURE, VALIDATE_INPUT};

#[tokio::main]
async fn main() -> ExitCode {
    #[cfg(not(unix))]
    panic!("Cannot run jumpbox on non-unix platform");

    let cli = Cli::parse();

    if let Err(e) = init_tracing(&cli.execution.rust_log, &cli.log_file) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    tracing::debug!("Cli args: {:?}", cli);

    // Validate before touching the package manager
    let inputs = match JumpboxInputs::new(&cli.username, &cli.ssh_key) {
        Ok(inputs) => inputs,
        Err(e) => {
            return exit_fatal(&ProcedureFailure::before_start(
                PROCEDURE,
                VALIDATE_INPUT,
                e.into(),
            ))
        }
    };

    if let Err(e) = cli.execution.preflight(&[APT_GET]) {
        return exit_fatal(&ProcedureFailure::before_start(PROCEDURE, "preflight", e.into()));
    }

    tracing::info!(
        "Provisioning jumpbox for '{}', logging to {}",
        inputs.username(),
        cli.log_file.display()
    );

    let runner = command_runner(cli.execution.dry_run);

    match provision(inputs, cli.settings(), runner).await {
        Ok(report) => {
            success!("{}", report.summary());
            ExitCode::SUCCESS
        }
        Err(failure) => exit_fatal(&failure),
    }
}

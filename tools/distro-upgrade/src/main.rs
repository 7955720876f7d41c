use std::{path::Path, process::ExitCode};

use clap::Parser;
use common::{
    command::command_runner,
    preflight::{RPM, ZYPPER},
    procedure::ProcedureFailure,
    success,
    tracing::{exit_fatal, init_tracing},
};
use distro_upgrade::{
    cli::Cli,
    os_release::{read_version_id, OS_RELEASE_PATH},
    run, PROCEDURE,
};

#[tokio::main]
async fn main() -> ExitCode {
    #[cfg(not(unix))]
    panic!("Cannot run distro-upgrade on non-unix platform");

    let cli = Cli::parse();

    if let Err(e) = init_tracing(&cli.execution.rust_log, &cli.log_file) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    tracing::debug!("Cli args: {:?}", cli);

    if let Err(e) = cli.execution.preflight(&[ZYPPER, RPM]) {
        return exit_fatal(&ProcedureFailure::before_start(PROCEDURE, "preflight", e.into()));
    }

    let settings = cli.settings();

    let host_release = match read_version_id(Path::new(OS_RELEASE_PATH)) {
        Ok(release) => release,
        Err(e) => {
            tracing::warn!("Failed to read {OS_RELEASE_PATH}: {e}");
            None
        }
    };

    for warning in settings.compatibility_warnings(host_release.as_deref()) {
        tracing::warn!("{warning}");
    }

    tracing::info!(
        "Upgrading from {} through {}, logging to {}",
        settings.from_release,
        settings.target_releases.join(" -> "),
        cli.log_file.display()
    );

    let runner = command_runner(cli.execution.dry_run);

    match run(settings, runner).await {
        Ok(report) => {
            success!("{}", report.summary());
            ExitCode::SUCCESS
        }
        Err(failure) => exit_fatal(&failure),
    }
}

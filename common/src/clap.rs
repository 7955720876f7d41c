use clap::Args;

use crate::{preflight::ExternalDependency, system};

/// Execution options shared by every bootstrap tool.
#[derive(Args, Clone, Debug)]
pub struct ExecutionArgs {
    /// Log every external command instead of running it. Generated files are still written.
    #[clap(long, env = "BOOTSTRAP_DRY_RUN")]
    pub dry_run: bool,
    /// Skip checking that external binaries exist and that we are running as root
    #[clap(long)]
    pub skip_preflight_checks: bool,
    /// Default log directive, used when RUST_LOG is not set.
    /// See more: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
    #[clap(long, default_value = "info")]
    pub rust_log: String,
}

impl ExecutionArgs {
    pub fn preflight(&self, dependencies: &[ExternalDependency]) -> Result<(), crate::Error> {
        if self.skip_preflight_checks {
            tracing::warn!("Skipping preflight checks");
            return Ok(());
        }

        crate::preflight::external_dependency_preflight_check(dependencies)?;

        if self.dry_run {
            tracing::info!("Dry run, not checking for root");
        } else {
            system::ensure_root()?;
        }

        Ok(())
    }
}

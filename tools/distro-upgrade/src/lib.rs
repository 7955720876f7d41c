//! Sequential openSUSE Leap distribution upgrade followed by installing a software pattern
//! from a third party repository.

use std::sync::Arc;

use common::{
    command::CommandRunner,
    procedure::{run_stages, ProcedureFailure, ProcedureReport},
};

pub mod cli;
pub mod os_release;
pub mod repos;
pub mod settings;
pub mod stages;
pub mod zypper;

use settings::UpgradeSettings;
use stages::{UpgradeContext, UpgradeStage};

pub const PROCEDURE: &str = "distro-upgrade";

pub async fn run(
    settings: UpgradeSettings,
    runner: Arc<dyn CommandRunner>,
) -> Result<ProcedureReport, ProcedureFailure> {
    settings
        .validate()
        .map_err(|e| ProcedureFailure::before_start(PROCEDURE, "validate-settings", e.into()))?;

    let stages = UpgradeStage::plan(&settings);
    let ctx = UpgradeContext { runner, settings };

    run_stages(PROCEDURE, &stages, &ctx).await
}

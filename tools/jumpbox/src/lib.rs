//! Provisions a jumpbox: prerequisites are installed with apt, then a generated ansible
//! playbook creates the user, authorizes their SSH key and installs the Google Cloud CLI and Docker.

use std::sync::Arc;

use common::{
    command::CommandRunner,
    procedure::{run_stages, ProcedureFailure, ProcedureReport},
};

pub mod ansible;
pub mod cli;
pub mod inputs;
pub mod prerequisites;
pub mod stages;

use inputs::JumpboxInputs;
use stages::{JumpboxContext, JumpboxSettings, JumpboxStage};

pub const PROCEDURE: &str = "jumpbox";
pub const VALIDATE_INPUT: &str = "validate-input";

/// Validate the positional parameters then provision. Nothing is run if validation fails.
pub async fn run(
    username: &str,
    ssh_key: &str,
    settings: JumpboxSettings,
    runner: Arc<dyn CommandRunner>,
) -> Result<ProcedureReport, ProcedureFailure> {
    let inputs = JumpboxInputs::new(username, ssh_key)
        .map_err(|e| ProcedureFailure::before_start(PROCEDURE, VALIDATE_INPUT, e.into()))?;

    provision(inputs, settings, runner).await
}

pub async fn provision(
    inputs: JumpboxInputs,
    settings: JumpboxSettings,
    runner: Arc<dyn CommandRunner>,
) -> Result<ProcedureReport, ProcedureFailure> {
    let ctx = JumpboxContext {
        runner,
        settings,
        inputs,
    };

    run_stages(PROCEDURE, &JumpboxStage::all(), &ctx).await
}

use serde::Serialize;

use common::command::HostCommand;

use super::artifacts::ArtifactPaths;
use crate::inputs::JumpboxInputs;

pub const ANSIBLE_PLAYBOOK: &str = "ansible-playbook";

/// Variables handed to ansible on the command line. Passed as a JSON object so that values
/// containing spaces, such as public keys, arrive unchanged.
#[derive(Debug, Serialize)]
pub struct ExtraVars<'a> {
    pub username: &'a str,
    pub ssh_key: &'a str,
}

impl<'a> From<&'a JumpboxInputs> for ExtraVars<'a> {
    fn from(inputs: &'a JumpboxInputs) -> Self {
        Self {
            username: inputs.username(),
            ssh_key: inputs.ssh_key(),
        }
    }
}

pub fn ansible_playbook_command(
    paths: &ArtifactPaths,
    inputs: &JumpboxInputs,
) -> anyhow::Result<HostCommand> {
    let extra_vars = serde_json::to_string(&ExtraVars::from(inputs))?;

    Ok(HostCommand::new(ANSIBLE_PLAYBOOK)
        .env("ANSIBLE_NOCOLOR", "1")
        .arg("-i")
        .arg(paths.inventory.to_string_lossy())
        .arg(paths.playbook.to_string_lossy())
        .arg("--extra-vars")
        .arg(extra_vars))
}

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use async_trait::async_trait;
use strum::{Display, EnumIter, IntoEnumIterator};

use common::{command::CommandRunner, procedure::Stage};

use crate::{
    ansible::{ansible_playbook_command, write_artifacts, ArtifactPaths, PlaybookBundle},
    inputs::JumpboxInputs,
    prerequisites::{configure_locale, install_packages, refresh_package_index, PREREQUISITE_PACKAGES},
};

#[derive(Clone, Debug)]
pub struct JumpboxSettings {
    pub work_dir: PathBuf,
    pub locale: String,
}

pub struct JumpboxContext {
    pub runner: Arc<dyn CommandRunner>,
    pub settings: JumpboxSettings,
    pub inputs: JumpboxInputs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum JumpboxStage {
    InstallPrerequisites,
    ConfigureLocale,
    GeneratePlaybook,
    RunPlaybook,
}

impl JumpboxStage {
    pub fn all() -> Vec<JumpboxStage> {
        JumpboxStage::iter().collect()
    }
}

#[async_trait]
impl Stage for JumpboxStage {
    type Context = JumpboxContext;

    fn name(&self) -> String {
        self.to_string()
    }

    async fn execute(&self, ctx: &JumpboxContext) -> anyhow::Result<()> {
        match self {
            JumpboxStage::InstallPrerequisites => {
                ctx.runner
                    .run(&refresh_package_index())
                    .await
                    .context("Failed to refresh the package index")?;

                ctx.runner
                    .run(&install_packages(&PREREQUISITE_PACKAGES))
                    .await
                    .context("Failed to install prerequisite packages")?;
            }
            JumpboxStage::ConfigureLocale => {
                for command in configure_locale(&ctx.settings.locale) {
                    ctx.runner
                        .run(&command)
                        .await
                        .with_context(|| format!("Failed to configure locale {}", ctx.settings.locale))?;
                }
            }
            JumpboxStage::GeneratePlaybook => {
                write_artifacts(&ctx.settings.work_dir, &PlaybookBundle::jumpbox())?;
            }
            JumpboxStage::RunPlaybook => {
                let paths = ArtifactPaths::new(&ctx.settings.work_dir);
                let command = ansible_playbook_command(&paths, &ctx.inputs)?;

                tracing::info!(
                    "Applying playbook for user '{}', ssh key {}",
                    ctx.inputs.username(),
                    if ctx.inputs.has_ssh_key() {
                        "provided"
                    } else {
                        "not provided, skipping key installation"
                    }
                );

                ctx.runner
                    .run(&command)
                    .await
                    .context("ansible-playbook reported failure")?;
            }
        }

        Ok(())
    }
}

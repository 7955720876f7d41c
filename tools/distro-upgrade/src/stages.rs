use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;

use common::{command::CommandRunner, procedure::Stage};

use crate::{repos::rewrite_repo_files, settings::UpgradeSettings, zypper};

pub struct UpgradeContext {
    pub runner: Arc<dyn CommandRunner>,
    pub settings: UpgradeSettings,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpgradeStage {
    UpdateCurrentRelease,
    DistributionUpgrade { from: String, to: String },
    AddThirdPartyRepository,
    InstallPattern,
}

impl UpgradeStage {
    pub fn plan(settings: &UpgradeSettings) -> Vec<UpgradeStage> {
        let mut stages = vec![UpgradeStage::UpdateCurrentRelease];

        stages.extend(
            settings
                .boundaries()
                .into_iter()
                .map(|(from, to)| UpgradeStage::DistributionUpgrade { from, to }),
        );

        stages.push(UpgradeStage::AddThirdPartyRepository);
        stages.push(UpgradeStage::InstallPattern);
        stages
    }
}

#[async_trait]
impl Stage for UpgradeStage {
    type Context = UpgradeContext;

    fn name(&self) -> String {
        match self {
            UpgradeStage::UpdateCurrentRelease => "update-current-release".to_string(),
            UpgradeStage::DistributionUpgrade { to, .. } => format!("upgrade-to-{to}"),
            UpgradeStage::AddThirdPartyRepository => "add-third-party-repository".to_string(),
            UpgradeStage::InstallPattern => "install-pattern".to_string(),
        }
    }

    async fn execute(&self, ctx: &UpgradeContext) -> anyhow::Result<()> {
        let runner = &ctx.runner;
        let settings = &ctx.settings;

        match self {
            UpgradeStage::UpdateCurrentRelease => {
                runner
                    .run(&zypper::refresh())
                    .await
                    .context("Failed to refresh repositories")?;
                runner
                    .run(&zypper::update())
                    .await
                    .context("Failed to update the current release")?;
            }
            UpgradeStage::DistributionUpgrade { from, to } => {
                let pinned = [settings.third_party_repo_file()];
                let summary = rewrite_repo_files(&settings.repos_dir, from, to, &pinned)?;
                tracing::info!(
                    "Rewrote {} repository file(s) from {from} to {to}, {} already up to date",
                    summary.rewritten.len(),
                    summary.unchanged.len()
                );

                runner
                    .run(&zypper::refresh_for_release(to))
                    .await
                    .with_context(|| format!("Failed to refresh repositories for {to}"))?;
                runner
                    .run(&zypper::dist_upgrade(to))
                    .await
                    .with_context(|| format!("Distribution upgrade to {to} failed"))?;
            }
            UpgradeStage::AddThirdPartyRepository => {
                let repository = &settings.third_party;

                runner
                    .run(&zypper::import_signing_key(&repository.signing_key_url()))
                    .await
                    .context("Failed to import the repository signing key")?;

                if settings.third_party_repo_file().exists() {
                    tracing::info!(
                        "Repository '{}' already registered, not adding it again",
                        repository.alias
                    );
                } else {
                    runner
                        .run(&zypper::add_repository(&repository.url, &repository.alias))
                        .await
                        .with_context(|| format!("Failed to add repository '{}'", repository.alias))?;
                }

                runner
                    .run(&zypper::refresh_importing_keys())
                    .await
                    .context("Failed to refresh repositories")?;
            }
            UpgradeStage::InstallPattern => {
                runner
                    .run(&zypper::install_pattern(&settings.pattern))
                    .await
                    .with_context(|| format!("Failed to install pattern '{}'", settings.pattern))?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::settings::tests::leap_settings;

    #[test]
    fn plan_crosses_each_release_in_order() {
        let stages = UpgradeStage::plan(&leap_settings(PathBuf::new()));

        let names = stages.iter().map(|stage| stage.name()).collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                "update-current-release",
                "upgrade-to-15.5",
                "upgrade-to-15.6",
                "add-third-party-repository",
                "install-pattern"
            ]
        );
    }
}

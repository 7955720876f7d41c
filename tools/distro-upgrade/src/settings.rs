use std::path::PathBuf;

use thiserror::Error;

use crate::repos::REPO_FILE_EXTENSION;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Release versions cannot be empty")]
    EmptyRelease,
    #[error("Cannot upgrade from release {0} to itself")]
    SameRelease(String),
    #[error("Third party repository URL is empty")]
    EmptyRepositoryUrl,
}

/// A package repository outside the distribution, pinned to a release of its own.
#[derive(Clone, Debug)]
pub struct ThirdPartyRepository {
    pub url: String,
    pub alias: String,
    pub release: String,
}

impl ThirdPartyRepository {
    /// `template` may contain `{release}` which is replaced with the pinned release
    pub fn from_template(template: &str, alias: &str, release: &str) -> Self {
        Self {
            url: template.replace("{release}", release),
            alias: alias.to_string(),
            release: release.to_string(),
        }
    }

    pub fn signing_key_url(&self) -> String {
        format!("{}/repodata/repomd.xml.key", self.url.trim_end_matches('/'))
    }
}

#[derive(Clone, Debug)]
pub struct UpgradeSettings {
    pub from_release: String,
    pub target_releases: Vec<String>,
    pub repos_dir: PathBuf,
    pub third_party: ThirdPartyRepository,
    pub pattern: String,
}

impl UpgradeSettings {
    /// Each release boundary crossed, in order, e.g. `[(15.4, 15.5), (15.5, 15.6)]`
    pub fn boundaries(&self) -> Vec<(String, String)> {
        let mut from = self.from_release.clone();

        self.target_releases
            .iter()
            .map(|to| {
                let boundary = (from.clone(), to.clone());
                from = to.clone();
                boundary
            })
            .collect()
    }

    /// Where zypper keeps the third party repository definition once it has been added
    pub fn third_party_repo_file(&self) -> PathBuf {
        self.repos_dir
            .join(format!("{}.{REPO_FILE_EXTENSION}", self.third_party.alias))
    }

    pub fn final_release(&self) -> &str {
        self.target_releases
            .last()
            .unwrap_or(&self.from_release)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.from_release.trim().is_empty()
            || self.target_releases.iter().any(|r| r.trim().is_empty())
        {
            return Err(SettingsError::EmptyRelease);
        }

        if let Some((from, _)) = self.boundaries().into_iter().find(|(from, to)| from == to) {
            return Err(SettingsError::SameRelease(from));
        }

        if self.third_party.url.trim().is_empty() {
            return Err(SettingsError::EmptyRepositoryUrl);
        }

        Ok(())
    }

    /// Things we cannot verify but carry on regardless of
    pub fn compatibility_warnings(&self, host_release: Option<&str>) -> Vec<String> {
        let mut warnings = Vec::new();

        match host_release {
            Some(host) if host != self.from_release => warnings.push(format!(
                "Host reports release {host} but the upgrade starts from {}",
                self.from_release
            )),
            None => warnings.push("Could not determine the host release".to_string()),
            _ => {}
        }

        if self.third_party.release != self.final_release() {
            warnings.push(format!(
                "Repository '{}' is pinned to release {} while the host will end on {}, assuming it is compatible",
                self.third_party.alias,
                self.third_party.release,
                self.final_release()
            ));
        }

        warnings
    }
}

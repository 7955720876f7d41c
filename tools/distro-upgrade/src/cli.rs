use std::path::PathBuf;

use clap::Parser;
use common::clap::ExecutionArgs;

use crate::settings::{ThirdPartyRepository, UpgradeSettings};

pub const DEFAULT_LOG_FILE: &str = "/var/log/distro-upgrade.log";
pub const DEFAULT_THIRD_PARTY_REPO_URL: &str =
    "https://download.opensuse.org/repositories/systemsmanagement:/Uyuni:/Stable/openSUSE_Leap_{release}/";

/// Upgrade an openSUSE Leap host one release at a time, then install a software pattern
/// from a third party repository.
#[derive(Parser, Debug)]
#[command(name = "distro-upgrade", version)]
pub struct Cli {
    /// The release the host is currently on
    #[clap(long, env = "DISTRO_UPGRADE_FROM_RELEASE", default_value = "15.4")]
    pub from_release: String,
    /// Releases to upgrade through, in order
    #[clap(
        long,
        env = "DISTRO_UPGRADE_TARGET_RELEASES",
        value_delimiter = ',',
        default_values = ["15.5", "15.6"]
    )]
    pub target_releases: Vec<String>,
    /// Directory holding the zypper repository definitions
    #[clap(long, default_value = "/etc/zypp/repos.d")]
    pub repos_dir: PathBuf,
    /// Release the third party repository is pinned to
    #[clap(long, default_value = "15.5")]
    pub third_party_release: String,
    /// Third party repository URL, `{release}` is replaced with --third-party-release
    #[clap(long, default_value = DEFAULT_THIRD_PARTY_REPO_URL)]
    pub third_party_repo_url: String,
    #[clap(long, default_value = "uyuni-stable")]
    pub third_party_repo_alias: String,
    /// Software pattern to install from the third party repository once upgraded
    #[clap(long, default_value = "uyuni_server")]
    pub pattern: String,
    /// Every log line is appended here as well as printed to the console
    #[clap(long, env = "DISTRO_UPGRADE_LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,
    #[clap(flatten)]
    pub execution: ExecutionArgs,
}

impl Cli {
    pub fn settings(&self) -> UpgradeSettings {
        UpgradeSettings {
            from_release: self.from_release.clone(),
            target_releases: self.target_releases.clone(),
            repos_dir: self.repos_dir.clone(),
            third_party: ThirdPartyRepository::from_template(
                &self.third_party_repo_url,
                &self.third_party_repo_alias,
                &self.third_party_release,
            ),
            pattern: self.pattern.clone(),
        }
    }
}

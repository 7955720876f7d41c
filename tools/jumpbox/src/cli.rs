use std::path::PathBuf;

use clap::Parser;
use common::clap::ExecutionArgs;

use crate::stages::JumpboxSettings;

pub const DEFAULT_WORK_DIR: &str = "/opt/jumpbox-ansible";
pub const DEFAULT_LOG_FILE: &str = "/var/log/jumpbox-setup.log";

/// Provision this machine as a jumpbox: create a user with SSH access and install
/// the Google Cloud CLI and Docker using a generated ansible playbook.
#[derive(Parser, Debug)]
#[command(name = "jumpbox", version)]
pub struct Cli {
    /// Account to create on the jumpbox
    #[clap(default_value = "")]
    pub username: String,
    /// Public key allowed to log in as the user, e.g. "ssh-ed25519 AAAA... carl@host".
    /// Key installation is skipped when empty.
    #[clap(default_value = "")]
    pub ssh_key: String,
    /// Directory the ansible inventory, playbook and roles are generated in
    #[clap(long, env = "JUMPBOX_WORK_DIR", default_value = DEFAULT_WORK_DIR)]
    pub work_dir: PathBuf,
    /// Every log line is appended here as well as printed to the console
    #[clap(long, env = "JUMPBOX_LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,
    /// System locale to generate and set as the default
    #[clap(long, env = "JUMPBOX_LOCALE", default_value = "en_US.UTF-8")]
    pub locale: String,
    #[clap(flatten)]
    pub execution: ExecutionArgs,
}

impl Cli {
    pub fn settings(&self) -> JumpboxSettings {
        JumpboxSettings {
            work_dir: self.work_dir.clone(),
            locale: self.locale.clone(),
        }
    }
}

use serde::Serialize;
use strum::{Display, EnumIter, IntoEnumIterator};

use super::task::{
    var, Apt, AptRepository, AptUpgrade, Copy, File, FileState, GetUrl, Module, PackageState,
    ServiceState, SystemdService, Task, User,
};

/// Name of the ansible variable holding the account to create
pub const USERNAME_VAR: &str = "username";
/// Name of the ansible variable holding the public key text, may be empty
pub const SSH_KEY_VAR: &str = "ssh_key";

pub const AUXILIARY_TOOLS: [&str; 7] = [
    "git",
    "vim",
    "htop",
    "tmux",
    "jq",
    "unzip",
    "apt-transport-https",
];

const GOOGLE_CLOUD_KEY_URL: &str = "https://packages.cloud.google.com/apt/doc/apt-key.gpg";
const GOOGLE_CLOUD_KEYRING: &str = "/usr/share/keyrings/cloud.google.asc";

const DOCKER_KEY_URL: &str = "https://download.docker.com/linux/ubuntu/gpg";
const DOCKER_KEYRING: &str = "/etc/apt/keyrings/docker.asc";

pub const DOCKER_PACKAGES: [&str; 5] = [
    "docker-ce",
    "docker-ce-cli",
    "containerd.io",
    "docker-buildx-plugin",
    "docker-compose-plugin",
];

/// The stages of the jumpbox playbook, in the order they are applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    UpdateSystem,
    CreateUser,
    InstallTools,
    InstallDocker,
}

impl Role {
    pub fn all() -> Vec<Role> {
        Role::iter().collect()
    }

    pub fn tasks(&self) -> Vec<Task> {
        match self {
            Role::UpdateSystem => update_system_tasks(),
            Role::CreateUser => create_user_tasks(),
            Role::InstallTools => install_tools_tasks(),
            Role::InstallDocker => install_docker_tasks(),
        }
    }
}

/// Key installation is decided by ansible at apply time, not when generating the playbook
pub fn has_ssh_key_condition() -> String {
    format!("{SSH_KEY_VAR} | length > 0")
}

fn ssh_dir() -> String {
    format!("/home/{}/.ssh", var(USERNAME_VAR))
}

fn update_system_tasks() -> Vec<Task> {
    vec![
        Task::new(
            "Refresh the apt package index",
            Module::Apt(Apt {
                update_cache: Some(true),
                cache_valid_time: Some(3600),
                ..Default::default()
            }),
        ),
        Task::new(
            "Upgrade all packages",
            Module::Apt(Apt {
                upgrade: Some(AptUpgrade::Dist),
                ..Default::default()
            }),
        ),
        Task::new(
            "Remove packages that are no longer required",
            Module::Apt(Apt {
                autoremove: Some(true),
                ..Default::default()
            }),
        ),
    ]
}

fn create_user_tasks() -> Vec<Task> {
    let user = var(USERNAME_VAR);

    vec![
        Task::new(
            "Create the jumpbox user",
            Module::User(User {
                name: user.clone(),
                shell: "/bin/bash".to_string(),
                create_home: true,
                groups: Some(vec!["sudo".to_string()]),
                append: Some(true),
            }),
        ),
        Task::new(
            "Create the user's .ssh directory",
            Module::File(File {
                path: ssh_dir(),
                state: FileState::Directory,
                owner: user.clone(),
                group: user.clone(),
                mode: "0700".to_string(),
            }),
        )
        .when(has_ssh_key_condition()),
        Task::new(
            "Install the user's authorized key",
            Module::Copy(Copy {
                dest: format!("{}/authorized_keys", ssh_dir()),
                content: var(SSH_KEY_VAR),
                owner: user.clone(),
                group: user,
                mode: "0600".to_string(),
            }),
        )
        .when(has_ssh_key_condition()),
    ]
}

fn install_tools_tasks() -> Vec<Task> {
    vec![
        Task::new(
            "Install auxiliary tools",
            Module::Apt(Apt::install(AUXILIARY_TOOLS)),
        ),
        Task::new(
            "Fetch the Google Cloud apt signing key",
            Module::GetUrl(GetUrl {
                url: GOOGLE_CLOUD_KEY_URL.to_string(),
                dest: GOOGLE_CLOUD_KEYRING.to_string(),
                mode: "0644".to_string(),
            }),
        ),
        Task::new(
            "Add the Google Cloud SDK repository",
            Module::AptRepository(AptRepository {
                repo: format!(
                    "deb [signed-by={GOOGLE_CLOUD_KEYRING}] https://packages.cloud.google.com/apt cloud-sdk main"
                ),
                filename: "google-cloud-sdk".to_string(),
                state: PackageState::Present,
            }),
        ),
        Task::new(
            "Install the Google Cloud CLI",
            Module::Apt(Apt::install(["google-cloud-cli"])),
        ),
    ]
}

fn install_docker_tasks() -> Vec<Task> {
    vec![
        Task::new(
            "Create the apt keyrings directory",
            Module::File(File {
                path: "/etc/apt/keyrings".to_string(),
                state: FileState::Directory,
                owner: "root".to_string(),
                group: "root".to_string(),
                mode: "0755".to_string(),
            }),
        ),
        Task::new(
            "Fetch the Docker apt signing key",
            Module::GetUrl(GetUrl {
                url: DOCKER_KEY_URL.to_string(),
                dest: DOCKER_KEYRING.to_string(),
                mode: "0644".to_string(),
            }),
        ),
        Task::new(
            "Add the Docker repository",
            Module::AptRepository(AptRepository {
                repo: format!(
                    "deb [signed-by={DOCKER_KEYRING}] https://download.docker.com/linux/ubuntu {} stable",
                    var("ansible_distribution_release")
                ),
                filename: "docker".to_string(),
                state: PackageState::Present,
            }),
        ),
        Task::new(
            "Install the Docker engine",
            Module::Apt(Apt::install(DOCKER_PACKAGES)),
        ),
        Task::new(
            "Enable and start Docker",
            Module::SystemdService(SystemdService {
                name: "docker".to_string(),
                state: ServiceState::Started,
                enabled: true,
            }),
        ),
        Task::new(
            "Add the jumpbox user to the docker group",
            Module::User(User {
                name: var(USERNAME_VAR),
                shell: "/bin/bash".to_string(),
                create_home: true,
                groups: Some(vec!["docker".to_string()]),
                append: Some(true),
            }),
        ),
    ]
}

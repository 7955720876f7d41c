//! A typed subset of the ansible modules used by the jumpbox roles.
//!
//! Each task serializes to the usual ansible shape, a map with the task name, the fully
//! qualified module name as the key for the module parameters, and an optional `when` guard:
//!
//! ```yaml
//! - name: Install authorized key
//!   ansible.builtin.copy:
//!     dest: /home/{{ username }}/.ssh/authorized_keys
//!     content: '{{ ssh_key }}'
//!   when: ssh_key | length > 0
//! ```

use serde::{ser::SerializeMap, Serialize, Serializer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageState {
    Present,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AptUpgrade {
    Dist,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileState {
    Directory,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Started,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Apt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<PackageState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_cache: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_valid_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade: Option<AptUpgrade>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autoremove: Option<bool>,
}

impl Apt {
    pub fn install<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: Some(packages.into_iter().map(Into::into).collect()),
            state: Some(PackageState::Present),
            update_cache: Some(true),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct User {
    pub name: String,
    pub shell: String,
    pub create_home: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub append: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct File {
    pub path: String,
    pub state: FileState,
    pub owner: String,
    pub group: String,
    pub mode: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Copy {
    pub dest: String,
    pub content: String,
    pub owner: String,
    pub group: String,
    pub mode: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GetUrl {
    pub url: String,
    pub dest: String,
    pub mode: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AptRepository {
    pub repo: String,
    pub filename: String,
    pub state: PackageState,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SystemdService {
    pub name: String,
    pub state: ServiceState,
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Module {
    Apt(Apt),
    User(User),
    File(File),
    Copy(Copy),
    GetUrl(GetUrl),
    AptRepository(AptRepository),
    SystemdService(SystemdService),
}

impl Module {
    pub fn fully_qualified_name(&self) -> &'static str {
        match self {
            Module::Apt(_) => "ansible.builtin.apt",
            Module::User(_) => "ansible.builtin.user",
            Module::File(_) => "ansible.builtin.file",
            Module::Copy(_) => "ansible.builtin.copy",
            Module::GetUrl(_) => "ansible.builtin.get_url",
            Module::AptRepository(_) => "ansible.builtin.apt_repository",
            Module::SystemdService(_) => "ansible.builtin.systemd_service",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    pub name: String,
    pub module: Module,
    pub when: Option<String>,
}

impl Task {
    pub fn new(name: impl Into<String>, module: Module) -> Self {
        Self {
            name: name.into(),
            module,
            when: None,
        }
    }

    pub fn when(mut self, condition: impl Into<String>) -> Self {
        self.when = Some(condition.into());
        self
    }
}

impl Serialize for Task {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("name", &self.name)?;

        let key = self.module.fully_qualified_name();
        match &self.module {
            Module::Apt(params) => map.serialize_entry(key, params)?,
            Module::User(params) => map.serialize_entry(key, params)?,
            Module::File(params) => map.serialize_entry(key, params)?,
            Module::Copy(params) => map.serialize_entry(key, params)?,
            Module::GetUrl(params) => map.serialize_entry(key, params)?,
            Module::AptRepository(params) => map.serialize_entry(key, params)?,
            Module::SystemdService(params) => map.serialize_entry(key, params)?,
        }

        if let Some(when) = &self.when {
            map.serialize_entry("when", when)?;
        }

        map.end()
    }
}

/// Render a jinja reference to an ansible variable, e.g. `{{ username }}`
pub fn var(name: &str) -> String {
    format!("{{{{ {name} }}}}")
}

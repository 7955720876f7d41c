use serde::Serialize;

use super::{inventory::AnsibleInventory, roles::Role, task::Task};

#[derive(Debug, Serialize)]
pub struct Play {
    pub name: String,
    pub hosts: String,
    #[serde(rename = "become")]
    pub become_root: bool,
    pub gather_facts: bool,
    pub roles: Vec<Role>,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct Playbook(pub Vec<Play>);

/// Everything needed to write the ansible project to disk.
#[derive(Debug)]
pub struct PlaybookBundle {
    pub inventory: AnsibleInventory,
    pub playbook: Playbook,
    pub role_tasks: Vec<(Role, Vec<Task>)>,
}

impl PlaybookBundle {
    pub fn jumpbox() -> Self {
        let roles = Role::all();

        let playbook = Playbook(vec![Play {
            name: "Configure jumpbox".to_string(),
            hosts: "all".to_string(),
            become_root: true,
            gather_facts: true,
            roles: roles.clone(),
        }]);

        let role_tasks = roles.into_iter().map(|role| (role, role.tasks())).collect();

        Self {
            inventory: AnsibleInventory::localhost(),
            playbook,
            role_tasks,
        }
    }
}

mod artifacts;
mod engine;
mod inventory;
mod playbook;
mod roles;
mod task;

pub use artifacts::{write_artifacts, ArtifactPaths};
pub use engine::{ansible_playbook_command, ExtraVars, ANSIBLE_PLAYBOOK};
pub use inventory::{AnsibleInventory, InventoryGroup, InventoryHostVars};
pub use playbook::{Play, Playbook, PlaybookBundle};
pub use roles::{has_ssh_key_condition, Role, SSH_KEY_VAR, USERNAME_VAR};
pub use task::{Module, Task};

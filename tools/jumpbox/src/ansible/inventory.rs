// all:
//     hosts:
//         localhost:
//             ansible_connection: local
//             ansible_python_interpreter: /usr/bin/python3

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct InventoryHostVars {
    pub ansible_connection: &'static str,
    pub ansible_python_interpreter: &'static str,
}

#[derive(Debug, Serialize)]
pub struct InventoryGroup {
    pub hosts: BTreeMap<String, InventoryHostVars>,
}

#[derive(Debug, Serialize)]
pub struct AnsibleInventory {
    pub all: InventoryGroup,
}

impl AnsibleInventory {
    /// The jumpbox configures itself, so the inventory is a single local host.
    pub fn localhost() -> Self {
        let mut hosts = BTreeMap::new();
        hosts.insert(
            "localhost".to_string(),
            InventoryHostVars {
                ansible_connection: "local",
                ansible_python_interpreter: "/usr/bin/python3",
            },
        );

        Self {
            all: InventoryGroup { hosts },
        }
    }
}

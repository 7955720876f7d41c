use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Serialize;

use super::{playbook::PlaybookBundle, roles::Role};

const GENERATED_HEADER: &str = "# Generated by jumpbox, changes will be overwritten\n";

/// Where each generated file lives inside the work directory.
#[derive(Clone, Debug)]
pub struct ArtifactPaths {
    pub work_dir: PathBuf,
    pub inventory: PathBuf,
    pub playbook: PathBuf,
    pub roles_dir: PathBuf,
}

impl ArtifactPaths {
    pub fn new(work_dir: &Path) -> Self {
        Self {
            work_dir: work_dir.to_owned(),
            inventory: work_dir.join("inventory.yml"),
            playbook: work_dir.join("site.yml"),
            roles_dir: work_dir.join("roles"),
        }
    }

    pub fn role_tasks(&self, role: Role) -> PathBuf {
        self.roles_dir
            .join(role.to_string())
            .join("tasks")
            .join("main.yml")
    }
}

fn write_yaml<T>(path: &Path, value: &T) -> anyhow::Result<()>
where
    T: Serialize,
{
    let yaml = serde_yaml::to_string(value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;

    fs::write(path, format!("{GENERATED_HEADER}{yaml}"))
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

/// Write the inventory, the playbook and one task list per role under `work_dir`.
///
/// Existing files are overwritten, generating twice produces identical output.
pub fn write_artifacts(work_dir: &Path, bundle: &PlaybookBundle) -> anyhow::Result<ArtifactPaths> {
    let paths = ArtifactPaths::new(work_dir);

    fs::create_dir_all(&paths.work_dir)
        .with_context(|| format!("Failed to create {}", paths.work_dir.display()))?;

    write_yaml(&paths.inventory, &bundle.inventory)?;
    write_yaml(&paths.playbook, &bundle.playbook)?;

    for (role, tasks) in &bundle.role_tasks {
        let path = paths.role_tasks(*role);

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        write_yaml(&path, tasks)?;
    }

    tracing::info!("Generated ansible project in {}", paths.work_dir.display());

    Ok(paths)
}

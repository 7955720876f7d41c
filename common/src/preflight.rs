use std::process::Command;

use crate::Error;

#[derive(Debug, Hash)]
pub struct ExternalDependency {
    pub binary: &'static str,
    pub install_advice: &'static str,
}

impl ExternalDependency {
    pub const fn new(binary: &'static str, install_advice: &'static str) -> Self {
        Self {
            binary,
            install_advice,
        }
    }
}

pub const APT_GET: ExternalDependency = ExternalDependency::new(
    "apt-get",
    "The jumpbox provisioner only supports Debian based distributions such as Ubuntu",
);

pub const ZYPPER: ExternalDependency = ExternalDependency::new(
    "zypper",
    "The distribution upgrader only supports openSUSE Leap",
);

pub const RPM: ExternalDependency = ExternalDependency::new(
    "rpm",
    "You will need to search for platform specific installation instructions",
);

/// Check that every binary is on the `PATH`, reporting all missing binaries before failing.
pub fn external_dependency_preflight_check(dependencies: &[ExternalDependency]) -> Result<(), Error> {
    check_with("which", dependencies)
}

fn check_with(which: &str, dependencies: &[ExternalDependency]) -> Result<(), Error> {
    let mut missing = Vec::new();

    for dep in dependencies {
        let found = Command::new(which).arg(dep.binary).output()?.status.success();

        if !found {
            tracing::error!(
                "Binary '{}' not found or not executable. {}",
                dep.binary,
                dep.install_advice
            );
            missing.push(dep.binary);
        } else {
            tracing::debug!("Found binary '{}'", dep.binary);
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingDependencies(missing))
    }
}

use common::command::HostCommand;

fn zypper() -> HostCommand {
    HostCommand::new("zypper").arg("--non-interactive")
}

pub fn refresh() -> HostCommand {
    zypper().arg("refresh")
}

pub fn update() -> HostCommand {
    zypper().arg("update")
}

pub fn refresh_for_release(release: &str) -> HostCommand {
    zypper().args(["--releasever", release, "refresh"])
}

pub fn dist_upgrade(release: &str) -> HostCommand {
    zypper().args(["--releasever", release, "dist-upgrade", "--allow-vendor-change"])
}

pub fn import_signing_key(key_url: &str) -> HostCommand {
    HostCommand::new("rpm").args(["--import", key_url])
}

pub fn add_repository(url: &str, alias: &str) -> HostCommand {
    zypper().args(["addrepo", "--refresh", url, alias])
}

pub fn refresh_importing_keys() -> HostCommand {
    zypper().args(["--gpg-auto-import-keys", "refresh"])
}

pub fn install_pattern(pattern: &str) -> HostCommand {
    zypper().args(["install", "-t", "pattern", pattern])
}

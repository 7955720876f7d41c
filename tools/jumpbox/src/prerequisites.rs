use common::command::HostCommand;

/// Installed before ansible takes over
pub const PREREQUISITE_PACKAGES: [&str; 8] = [
    "software-properties-common",
    "ansible",
    "python3",
    "python3-apt",
    "locales",
    "curl",
    "gnupg",
    "ca-certificates",
];

fn apt_get() -> HostCommand {
    HostCommand::new("apt-get").env("DEBIAN_FRONTEND", "noninteractive")
}

pub fn refresh_package_index() -> HostCommand {
    apt_get().arg("update")
}

pub fn install_packages(packages: &[&str]) -> HostCommand {
    apt_get().args(["install", "-y"]).args(packages.iter().copied())
}

pub fn configure_locale(locale: &str) -> [HostCommand; 2] {
    [
        HostCommand::new("locale-gen").arg(locale),
        HostCommand::new("update-locale")
            .arg(format!("LANG={locale}"))
            .arg(format!("LC_ALL={locale}")),
    ]
}

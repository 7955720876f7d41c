use std::{fs, path::Path, sync::Arc};

use common::test_utils::RecordingCommandRunner;
use distro_upgrade::{
    run,
    settings::{ThirdPartyRepository, UpgradeSettings},
};
use tempfile::tempdir;

const OSS_REPO: &str = "[repo-oss]
name=Main Repository
enabled=1
autorefresh=1
baseurl=http://download.opensuse.org/distribution/leap/15.4/repo/oss/
type=rpm-md
";

fn settings(repos_dir: &Path) -> UpgradeSettings {
    UpgradeSettings {
        from_release: "15.4".to_string(),
        target_releases: vec!["15.5".to_string(), "15.6".to_string()],
        repos_dir: repos_dir.to_owned(),
        third_party: ThirdPartyRepository::from_template(
            "https://download.opensuse.org/repositories/systemsmanagement:/Uyuni:/Stable/openSUSE_Leap_{release}/",
            "uyuni-stable",
            "15.5",
        ),
        pattern: "uyuni_server".to_string(),
    }
}

fn subcommands(runner: &RecordingCommandRunner) -> Vec<String> {
    runner
        .commands()
        .iter()
        .map(|c| {
            c.args
                .iter()
                .filter(|a| *a != "--non-interactive")
                .take(3)
                .cloned()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

#[tokio::test]
async fn upgrades_one_release_at_a_time_then_installs_the_pattern() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("repo-oss.repo"), OSS_REPO).unwrap();
    let runner = Arc::new(RecordingCommandRunner::new());

    let report = run(settings(dir.path()), runner.clone())
        .await
        .expect("Upgrade");

    assert_eq!(
        report.stage_names(),
        vec![
            "update-current-release",
            "upgrade-to-15.5",
            "upgrade-to-15.6",
            "add-third-party-repository",
            "install-pattern"
        ]
    );

    assert_eq!(
        runner.programs(),
        vec!["zypper", "zypper", "zypper", "zypper", "zypper", "zypper", "rpm", "zypper", "zypper", "zypper"]
    );
    assert_eq!(
        subcommands(&runner),
        vec![
            "refresh",
            "update",
            "--releasever 15.5 refresh",
            "--releasever 15.5 dist-upgrade",
            "--releasever 15.6 refresh",
            "--releasever 15.6 dist-upgrade",
            "--import https://download.opensuse.org/repositories/systemsmanagement:/Uyuni:/Stable/openSUSE_Leap_15.5/repodata/repomd.xml.key",
            "addrepo --refresh https://download.opensuse.org/repositories/systemsmanagement:/Uyuni:/Stable/openSUSE_Leap_15.5/",
            "--gpg-auto-import-keys refresh",
            "install -t pattern",
        ]
    );

    let install = runner.commands().pop().unwrap();
    assert_eq!(install.args.last().unwrap(), "uyuni_server");

    let repo = fs::read_to_string(dir.path().join("repo-oss.repo")).unwrap();
    assert!(repo.contains("leap/15.6/repo/oss/"));
    assert!(!repo.contains("15.4"));
}

#[tokio::test]
async fn rerunning_leaves_rewritten_repositories_alone() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("repo-oss.repo");
    fs::write(&path, OSS_REPO).unwrap();

    run(settings(dir.path()), Arc::new(RecordingCommandRunner::new()))
        .await
        .expect("First run");
    let after_first_run = fs::read_to_string(&path).unwrap();

    run(settings(dir.path()), Arc::new(RecordingCommandRunner::new()))
        .await
        .expect("Second run");

    assert_eq!(fs::read_to_string(&path).unwrap(), after_first_run);
}

#[tokio::test]
async fn rerunning_keeps_the_third_party_repository_on_its_pinned_release() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("repo-oss.repo"), OSS_REPO).unwrap();

    run(settings(dir.path()), Arc::new(RecordingCommandRunner::new()))
        .await
        .expect("First run");

    // zypper addrepo would have written this during the first run
    let pinned = dir.path().join("uyuni-stable.repo");
    let pinned_definition = "[uyuni-stable]
enabled=1
baseurl=https://download.opensuse.org/repositories/systemsmanagement:/Uyuni:/Stable/openSUSE_Leap_15.5/
";
    fs::write(&pinned, pinned_definition).unwrap();

    let runner = Arc::new(RecordingCommandRunner::new());
    run(settings(dir.path()), runner.clone())
        .await
        .expect("Second run");

    assert_eq!(fs::read_to_string(&pinned).unwrap(), pinned_definition);
    assert!(!runner.commands().iter().any(|c| c.has_arg("addrepo")));
}

#[tokio::test]
async fn registered_repository_is_not_added_again() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("uyuni-stable.repo"), "[uyuni-stable]\nenabled=1\n").unwrap();
    let runner = Arc::new(RecordingCommandRunner::new());

    run(settings(dir.path()), runner.clone())
        .await
        .expect("Upgrade");

    assert!(!runner.commands().iter().any(|c| c.has_arg("addrepo")));
    assert!(runner.commands().iter().any(|c| c.program == "rpm"));
}

#[tokio::test]
async fn failed_dist_upgrade_stops_before_the_third_party_repository() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("repo-oss.repo"), OSS_REPO).unwrap();
    let runner = Arc::new(RecordingCommandRunner::new().failing_with_arg("zypper", "dist-upgrade", 8));

    let failure = run(settings(dir.path()), runner.clone())
        .await
        .expect_err("dist-upgrade fails");

    assert_eq!(failure.failed_stage, "upgrade-to-15.5");
    assert_eq!(failure.completed, vec!["update-current-release"]);
    assert!(failure.to_string().contains("Distribution upgrade to 15.5 failed"));
    assert!(!runner.commands().iter().any(|c| c.program == "rpm"));
    assert!(!runner.commands().iter().any(|c| c.has_arg("15.6")));
}

#[tokio::test]
async fn invalid_settings_fail_before_any_command() {
    let dir = tempdir().unwrap();
    let runner = Arc::new(RecordingCommandRunner::new());
    let mut settings = settings(dir.path());
    settings.target_releases = vec!["15.4".to_string()];

    let failure = run(settings, runner.clone())
        .await
        .expect_err("Same release rejected");

    assert_eq!(failure.failed_stage, "validate-settings");
    assert!(runner.commands().is_empty());
}

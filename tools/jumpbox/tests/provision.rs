use std::{fs, path::Path, sync::Arc};

use common::test_utils::RecordingCommandRunner;
use jumpbox::{
    ansible::{ArtifactPaths, Role},
    run,
    stages::JumpboxSettings,
};
use serde_yaml::Value;
use tempfile::tempdir;

fn settings(work_dir: &Path) -> JumpboxSettings {
    JumpboxSettings {
        work_dir: work_dir.to_owned(),
        locale: "en_US.UTF-8".to_string(),
    }
}

fn read_yaml(path: &Path) -> Value {
    serde_yaml::from_str(&fs::read_to_string(path).expect("Read generated file"))
        .expect("Parse generated file")
}

#[tokio::test]
async fn empty_username_fails_before_any_command() {
    let dir = tempdir().unwrap();
    let runner = Arc::new(RecordingCommandRunner::new());

    let failure = run("", "ssh-ed25519 AAAA carl@host", settings(dir.path()), runner.clone())
        .await
        .expect_err("Empty username is rejected");

    assert_eq!(failure.failed_stage, "validate-input");
    assert!(failure.to_string().contains("A username is required"));
    assert!(runner.commands().is_empty());
    assert!(!ArtifactPaths::new(dir.path()).playbook.exists());
}

#[tokio::test]
async fn carl_scenario_generates_four_ordered_roles_and_passes_variables_verbatim() {
    let dir = tempdir().unwrap();
    let runner = Arc::new(RecordingCommandRunner::new());
    let key = "ssh-ed25519 AAAA... carl@host";

    let report = run("carl", key, settings(dir.path()), runner.clone())
        .await
        .expect("Provision");

    assert_eq!(
        report.stage_names(),
        vec![
            "install-prerequisites",
            "configure-locale",
            "generate-playbook",
            "run-playbook"
        ]
    );

    // apt runs before ansible is used
    assert_eq!(
        runner.programs(),
        vec!["apt-get", "apt-get", "locale-gen", "update-locale", "ansible-playbook"]
    );

    let paths = ArtifactPaths::new(dir.path());
    let playbook = read_yaml(&paths.playbook);
    let roles = playbook[0]["roles"]
        .as_sequence()
        .unwrap()
        .iter()
        .map(|r| r.as_str().unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(
        roles,
        vec!["update_system", "create_user", "install_tools", "install_docker"]
    );

    for role in Role::all() {
        assert!(paths.role_tasks(role).exists(), "{role} tasks written");
    }

    let ansible = runner.commands().pop().unwrap();
    let extra_vars_index = ansible
        .args
        .iter()
        .position(|a| a == "--extra-vars")
        .expect("--extra-vars passed");
    let extra_vars: serde_json::Value =
        serde_json::from_str(&ansible.args[extra_vars_index + 1]).unwrap();

    assert_eq!(extra_vars["username"], "carl");
    assert_eq!(extra_vars["ssh_key"], key);
    assert_eq!(extra_vars.as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn empty_key_keeps_guarded_key_installation() {
    let dir = tempdir().unwrap();
    let runner = Arc::new(RecordingCommandRunner::new());

    run("carl", "", settings(dir.path()), runner.clone())
        .await
        .expect("Provision without a key");

    let tasks = read_yaml(&ArtifactPaths::new(dir.path()).role_tasks(Role::CreateUser));
    let tasks = tasks.as_sequence().unwrap();

    let key_tasks = tasks
        .iter()
        .filter(|t| {
            t.get("ansible.builtin.copy").is_some() || t.get("ansible.builtin.file").is_some()
        })
        .collect::<Vec<_>>();

    assert!(!key_tasks.is_empty());
    for task in key_tasks {
        assert_eq!(task["when"], "ssh_key | length > 0");
    }

    let ansible = runner.commands().pop().unwrap();
    assert_eq!(
        ansible.args.last().unwrap(),
        r#"{"username":"carl","ssh_key":""}"#
    );
}

#[tokio::test]
async fn failing_playbook_is_fatal() {
    let dir = tempdir().unwrap();
    let runner = Arc::new(RecordingCommandRunner::new().failing("ansible-playbook", 2));

    let failure = run("carl", "", settings(dir.path()), runner.clone())
        .await
        .expect_err("ansible fails");

    assert_eq!(failure.failed_stage, "run-playbook");
    assert_eq!(
        failure.completed,
        vec!["install-prerequisites", "configure-locale", "generate-playbook"]
    );
    assert!(failure
        .to_string()
        .starts_with("jumpbox failed at stage 'run-playbook': ansible-playbook reported failure"));
}

#[tokio::test]
async fn failing_package_install_stops_before_generating_playbook() {
    let dir = tempdir().unwrap();
    let runner = Arc::new(RecordingCommandRunner::new().failing_with_arg("apt-get", "install", 100));

    let failure = run("carl", "", settings(dir.path()), runner.clone())
        .await
        .expect_err("apt fails");

    assert_eq!(failure.failed_stage, "install-prerequisites");
    assert!(failure.completed.is_empty());
    assert_eq!(runner.programs(), vec!["apt-get", "apt-get"]);
    assert!(!ArtifactPaths::new(dir.path()).playbook.exists());
    assert!(format!("{:#}", failure.cause).contains("exit code 100"));
}

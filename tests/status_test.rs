use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn status_reports_resolved_paths_and_config() {
    let tmp = tempdir().expect("tempdir");
    let vault = tmp.path().join("vault");
    fs::create_dir_all(vault.join("Journal")).expect("mkdir daily");
    let config = tmp.path().join("config.toml");
    fs::write(
        &config,
        "[vault]\npath = \"ignored\"\ndaily_notes_dir = \"Journal\"\narchive_dir = \"Archive\"\n\n[todo]\nheading = \"### Tasks\"\nindent = \"tab\"\n",
    )
    .expect("write config");

    assert_cmd::cargo::cargo_bin_cmd!("vault-upkeep")
        .current_dir(tmp.path())
        .env("VAULT_UPKEEP_HOME", tmp.path())
        .env_remove("VAULT_UPKEEP_TODO_HEADING")
        .env_remove("VAULT_UPKEEP_INDENT")
        .env_remove("VAULT_UPKEEP_DAILY_NOTES_DIR")
        .env_remove("VAULT_UPKEEP_ARCHIVE_DIR")
        .arg("--config")
        .arg(&config)
        .arg("--vault-path")
        .arg(&vault)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("status: ok"))
        .stdout(predicate::str::contains("todo.heading=### Tasks"))
        .stdout(predicate::str::contains("todo.indent=tab"))
        .stdout(predicate::str::contains("Journal"));
}

#[test]
fn status_flags_missing_vault() {
    let tmp = tempdir().expect("tempdir");

    assert_cmd::cargo::cargo_bin_cmd!("vault-upkeep")
        .current_dir(tmp.path())
        .env("VAULT_UPKEEP_HOME", tmp.path())
        .env("VAULT_UPKEEP_CONFIG_PATH", tmp.path().join("absent.toml"))
        .arg("--vault-path")
        .arg(tmp.path().join("nowhere"))
        .arg("status")
        .assert()
        .failure()
        .stdout(predicate::str::contains("issue: missing vault root"));
}

#[test]
fn explicit_missing_config_is_an_error() {
    let tmp = tempdir().expect("tempdir");

    assert_cmd::cargo::cargo_bin_cmd!("vault-upkeep")
        .current_dir(tmp.path())
        .env("VAULT_UPKEEP_HOME", tmp.path())
        .arg("--config")
        .arg(tmp.path().join("nope.toml"))
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config"));
}

#[test]
fn status_lists_environment_overrides_in_effect() {
    let tmp = tempdir().expect("tempdir");
    let vault = tmp.path().join("vault");
    fs::create_dir_all(vault.join("Daily notes")).expect("mkdir daily");

    assert_cmd::cargo::cargo_bin_cmd!("vault-upkeep")
        .current_dir(tmp.path())
        .env("VAULT_UPKEEP_HOME", tmp.path())
        .env("VAULT_UPKEEP_CONFIG_PATH", tmp.path().join("absent.toml"))
        .env("VAULT_UPKEEP_INDENT", "4")
        .env_remove("VAULT_UPKEEP_DAILY_NOTES_DIR")
        .arg("--vault-path")
        .arg(&vault)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("todo.indent=4 spaces"))
        .stdout(predicate::str::contains("env.VAULT_UPKEEP_INDENT=4"))
        .stdout(predicate::str::contains("env.VAULT_UPKEEP_HOME="));
}

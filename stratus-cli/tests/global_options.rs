//! Integration tests for global flags, help output and argument errors.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    let env = TestEnv::new();

    env.command()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("reconcile"))
        .stdout(predicate::str::contains("cpi"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_version_flag() {
    let env = TestEnv::new();

    env.command()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stratus"));
}

#[test]
fn test_unknown_subcommand_is_usage_error() {
    let env = TestEnv::new();

    env.command().arg("reserve").assert().code(2);
}

#[test]
fn test_invalid_output_format() {
    let env = TestEnv::new();
    let desired = env.write_file("desired.yaml", "[]");

    env.command()
        .arg("reconcile")
        .arg("--desired")
        .arg(&desired)
        .arg("--format")
        .arg("csv")
        .assert()
        .failure();
}

#[test]
fn test_output_format_from_environment() {
    let env = TestEnv::new();
    let desired = env.write_file("desired.yaml", "- network: default\n  type: dynamic\n");

    env.command()
        .env("STRATUS_OUTPUT_FORMAT", "JSON")
        .arg("reconcile")
        .arg("--desired")
        .arg(&desired)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("["));
}

#[test]
fn test_verbose_logs_cpi_call() {
    let env = TestEnv::new();
    #[cfg(unix)]
    {
        let cpi = env.write_provider(r#"{"result":{"stemcell_formats":["raw"]},"error":null,"log":""}"#);
        let config = env.write_config(&cpi, 1);

        env.command()
            .arg("--verbose")
            .arg("--config")
            .arg(&config)
            .arg("cpi")
            .arg("info")
            .assert()
            .success()
            .stdout(predicate::str::contains("stemcell_formats"))
            .stderr(predicate::str::contains("Calling 'info'"));
    }
}

#[test]
fn test_log_mode_from_config_file() {
    let env = TestEnv::new();
    #[cfg(unix)]
    {
        let cpi = env.write_provider(r#"{"result":{"stemcell_formats":["raw"]},"error":null,"log":""}"#);
        let config = env.write_file(
            "director.yaml",
            &format!(
                "director_uuid: fake-director-uuid\ncpi:\n  path: {}\n  api_version: 1\nlog_mode: verbose\n",
                cpi.display()
            ),
        );

        env.command()
            .arg("--config")
            .arg(&config)
            .arg("cpi")
            .arg("info")
            .assert()
            .success()
            .stderr(predicate::str::contains("Calling 'info'"));

        env.command()
            .arg("--quiet")
            .arg("--config")
            .arg(&config)
            .arg("cpi")
            .arg("info")
            .assert()
            .success()
            .stderr(predicate::str::contains("Calling 'info'").not());
    }
}

#[test]
fn test_global_flags_after_subcommand() {
    let env = TestEnv::new();
    let desired = env.write_file("desired.yaml", "- network: default\n  type: dynamic\n");

    env.command()
        .arg("reconcile")
        .arg("--desired")
        .arg(&desired)
        .arg("--quiet")
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

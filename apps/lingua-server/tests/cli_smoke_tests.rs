#![allow(clippy::unwrap_used, clippy::expect_used)]

//! CLI smoke tests for the lingua-server binary: help, version, config
//! validation and the migrate command.

use std::process::{Command, Stdio};

use tempfile::TempDir;

fn run_lingua_server(args: &[&str], envs: &[(&str, &str)]) -> std::process::Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_lingua-server"));
    cmd.args(args)
        .env_remove("RUST_LOG")
        .env_remove("ConnectionStrings__DefaultConnection")
        .env_remove("ConnectionStrings__Lingua")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (k, v) in envs {
        cmd.env(k, v);
    }
    cmd.output().expect("Failed to execute lingua-server")
}

fn write_config(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write config file");
    path.to_str().unwrap().to_owned()
}

#[test]
fn help_lists_subcommands_and_options() {
    let output = run_lingua_server(&["--help"], &[]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    for needle in ["run", "check", "migrate", "--config", "--port", "--mock"] {
        assert!(stdout.contains(needle), "help should mention {needle}: {stdout}");
    }
}

#[test]
fn version_prints_binary_name() {
    let output = run_lingua_server(&["--version"], &[]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("lingua-server"));
    assert!(stdout.chars().any(|c| c.is_ascii_digit()));
}

#[test]
fn unknown_subcommand_fails() {
    let output = run_lingua_server(&["invalid-command"], &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"), "{stderr}");
}

#[test]
fn missing_config_file_is_reported() {
    let output = run_lingua_server(&["--config", "/nonexistent/lingua.yaml", "check"], &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not exist"), "{stderr}");
}

#[test]
fn malformed_yaml_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "invalid.yaml", "server: [unclosed");
    let output = run_lingua_server(&["--config", &path, "check"], &[]);
    assert!(!output.status.success());
}

#[test]
fn unknown_keys_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "typo.yaml", "server:\n  bind_adr: \"127.0.0.1:9000\"\n");
    let output = run_lingua_server(&["--config", &path, "check"], &[]);
    assert!(!output.status.success());
}

#[test]
fn invalid_module_section_fails_check() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "module.yaml",
        "modules:\n  i18n:\n    default_page_size: 500\n    max_page_size: 100\n",
    );
    let output = run_lingua_server(&["--config", &path, "check"], &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("default_page_size"), "{stderr}");
}

#[test]
fn valid_config_passes_check_with_layered_overrides() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "valid.yaml",
        r#"
server:
  bind_addr: "127.0.0.1:9000"
database:
  dsn: "sqlite::memory:"
logging:
  level: "warn"
auth:
  tokens:
    - subject: "translator"
      token: "super-secret-token"
modules:
  i18n:
    default_page_size: 20
    seed_cultures:
      - code: "en-US"
        name: "English (United States)"
"#,
    );

    let output = run_lingua_server(
        &["--config", &path, "--port", "9100", "check"],
        &[("APP__MODULES__I18N__MAX_PAGE_SIZE", "50")],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stdout: {stdout}\nstderr: {stderr}");
    assert!(stdout.contains("Configuration is valid"));
    assert!(stdout.contains("127.0.0.1:9100"), "{stdout}");
    assert!(stdout.contains("max_page_size: 50"), "{stdout}");
    assert!(!stdout.contains("super-secret-token"), "token must be redacted");
}

#[test]
fn print_config_exits_without_serving() {
    let output = run_lingua_server(&["--mock", "--print-config"], &[]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Effective configuration"));
    assert!(stdout.contains("sqlite::memory:"));
}

#[test]
fn migrate_applies_schema_once() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("lingua.db");
    let dsn = format!("sqlite://{}?mode=rwc", db_path.display());

    let first = run_lingua_server(&["migrate"], &[("APP__DATABASE__DSN", &dsn)]);
    let stdout = String::from_utf8_lossy(&first.stdout);
    assert!(
        first.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&first.stderr)
    );
    assert!(stdout.contains("Applied 1 migration(s)"), "{stdout}");
    assert!(stdout.contains("m20240101_000001_create_i18n_tables"));

    let second = run_lingua_server(&["migrate"], &[("APP__DATABASE__DSN", &dsn)]);
    assert!(second.status.success());
    assert!(String::from_utf8_lossy(&second.stdout).contains("Applied 0 migration(s)"));
}

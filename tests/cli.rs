use assert_cmd::Command;
use predicates::prelude::*;
use qms::api::auth::JwtAuth;
use qms_lib::{CredentialVerifier, Role};
use tempfile::TempDir;

const ENV_VARS: [&str; 6] = [
    "QMS_CONFIG",
    "QMS_BIND",
    "PORT",
    "QMS_JWT_SECRET",
    "QMS_TOKEN_TTL_HOURS",
    "QMS_SEED",
];

fn qms_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("qms").expect("qms binary");
    cmd.current_dir(dir.path());
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn version_short_prints_bare_version() {
    let dir = TempDir::new().unwrap();
    qms_cmd(&dir)
        .args(["version", "--short"])
        .assert()
        .success()
        .stdout(format!("{}\n", env!("CARGO_PKG_VERSION")));
}

#[test]
fn version_names_binary() {
    let dir = TempDir::new().unwrap();
    qms_cmd(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("qms version "));
}

#[test]
fn token_for_seeded_user() {
    let dir = TempDir::new().unwrap();
    let output = qms_cmd(&dir)
        .args(["-q", "token", "qualityuser"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let token = String::from_utf8(output).unwrap();
    assert_eq!(token.trim().split('.').count(), 3);
}

#[test]
fn token_uses_secret_from_config_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("qms.yaml"),
        "auth:\n  jwt_secret: file-secret\n",
    )
    .unwrap();

    let output = qms_cmd(&dir)
        .args(["-q", "token", "admin"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let token = String::from_utf8(output).unwrap();
    let claims = JwtAuth::new(b"file-secret", 1)
        .verify(token.trim())
        .unwrap();
    assert_eq!(claims.role, Some(Role::Admin));
}

#[test]
fn env_secret_overrides_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("qms.yaml"),
        "auth:\n  jwt_secret: file-secret\n",
    )
    .unwrap();

    let output = qms_cmd(&dir)
        .env("QMS_JWT_SECRET", "env-secret")
        .args(["-q", "token", "user"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let token = String::from_utf8(output).unwrap();
    assert!(JwtAuth::new(b"env-secret", 1).verify(token.trim()).is_ok());
    assert!(JwtAuth::new(b"file-secret", 1).verify(token.trim()).is_err());
}

#[test]
fn token_for_unknown_user_fails() {
    let dir = TempDir::new().unwrap();
    qms_cmd(&dir)
        .args(["-q", "token", "nobody"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot issue token"));

    qms_cmd(&dir)
        .args(["-q", "token", "admin", "--no-seed"])
        .assert()
        .failure();
}

#[test]
fn missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    qms_cmd(&dir)
        .args(["--config", "absent.yaml", "token", "admin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
}

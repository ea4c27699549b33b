#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

use assert_cmd::Command;
use predicates::prelude::*;

/// 入力変数を持たないコマンド
fn shipyard() -> Command {
    let mut cmd = Command::cargo_bin("shipyard").unwrap();
    cmd.env_clear();
    cmd
}

fn with_required(cmd: &mut Command) -> &mut Command {
    cmd.env("INPUT_ACCESS_KEY_ID", "AKIAEXAMPLE")
        .env("INPUT_SECRET_ACCESS_KEY", "secret")
        .env("INPUT_ECR_URI", "123456789012.dkr.ecr.us-east-1.amazonaws.com")
        .env("GITHUB_REPOSITORY", "acme/widget")
        .env("GITHUB_REF", "refs/heads/main")
        .env("GITHUB_SHA", "abc123")
}

/// CLIヘルプが正しく表示されることを確認
#[test]
fn test_cli_help() {
    shipyard()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ECR"))
        .stdout(predicate::str::contains("--ecr-uri"))
        .stdout(predicate::str::contains("--registries"))
        .stdout(predicate::str::contains("--unit-test"))
        .stdout(predicate::str::contains("--healthcheck"))
        .stdout(predicate::str::contains("--github-sha").not());
}

/// バージョン表示が正しく動作することを確認
#[test]
fn test_cli_version() {
    shipyard()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("shipyard"));
}

/// 必須入力が欠けている場合は 1 で終了
#[test]
fn test_missing_inputs_exit_1() {
    shipyard()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--access-key-id"));
}

/// 真偽値として解釈できない入力は 1 で終了
#[test]
fn test_invalid_boolean_exit_1() {
    let mut cmd = shipyard();
    with_required(&mut cmd)
        .env("INPUT_DEPLOY", "yes")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("yes"));
}

/// ポートなしのヘルスチェックはコンテナエンジンに触れる前に失敗する
#[test]
fn test_healthcheck_without_port_exit_1() {
    let mut cmd = shipyard();
    with_required(&mut cmd)
        .env("INPUT_HEALTHCHECK", "/health")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("::error::"))
        .stdout(predicate::str::contains("/health"));
}

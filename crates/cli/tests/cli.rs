//! Drives the `omnicalc` binary end to end. No test here touches the network.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Command with an isolated config directory and a clean environment.
fn omnicalc(config_home: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_omnicalc"));
    cmd.env("HOME", config_home.path())
        .env("XDG_CONFIG_HOME", config_home.path())
        .env("NO_COLOR", "1");
    for var in [
        "OMNICALC_PRECISION",
        "OMNICALC_HISTORY_LIMIT",
        "OMNICALC_BASE_CURRENCY",
        "OMNICALC_TARGET_CURRENCY",
        "OMNICALC_RATE_TIMEOUT",
        "OMNICALC_RATES_URL",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn run(args: &[&str]) -> Output {
    let home = TempDir::new().unwrap();
    omnicalc(&home).args(args).output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_eval_joins_arguments() {
    let out = run(&["eval", "4", "×", "5", "-", "2"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(stdout(&out), "18\n");
}

#[test]
fn test_eval_error_exits_nonzero() {
    let out = run(&["eval", "1 ÷ 0"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stderr(&out), "error: division by zero\n");
    assert!(stdout(&out).is_empty());
}

#[test]
fn test_eval_json() {
    let out = run(&["--json", "eval", "pow(2, 0.5"]);
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["display"], "1.4142135624");
    assert_eq!(value["expression"], "pow(2, 0.5");
}

#[test]
fn test_keys_with_history() {
    let out = run(&["keys", "--history", "6 × 7 =", "+", "8", "="]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(stdout(&out), "6 × 7 = 42\n42 + 8 = 50\n50\n");
}

#[test]
fn test_keys_shows_pending_expression() {
    let out = run(&["keys", "1", "2", "+", "3"]);
    assert_eq!(stdout(&out), "12 + 3\n");
}

#[test]
fn test_keys_unknown_key() {
    let out = run(&["keys", "7", "plus", "3"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stderr(&out), "error: unknown key 'plus'\n");
}

#[test]
fn test_keys_json() {
    let out = run(&["-j", "keys", "1", "0", "M+", "3", "="]);
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["display"], "3");
    assert_eq!(value["memory"], 10.0);
    assert!(value.get("history").is_none());
}

#[test]
fn test_precision_flag_beats_env() {
    let home = TempDir::new().unwrap();
    let out = omnicalc(&home)
        .env("OMNICALC_PRECISION", "6")
        .args(["eval", "2 ÷ 3"])
        .output()
        .unwrap();
    assert_eq!(stdout(&out), "0.666667\n");

    let out = omnicalc(&home)
        .env("OMNICALC_PRECISION", "6")
        .args(["-p", "2", "eval", "2 ÷ 3"])
        .output()
        .unwrap();
    assert_eq!(stdout(&out), "0.67\n");
}

#[test]
fn test_config_file_is_read() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("omnicalc").join("config.toml");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "precision = 3\n").unwrap();

    let out = omnicalc(&home).args(["eval", "1 ÷ 7"]).output().unwrap();
    if cfg!(target_os = "linux") {
        assert_eq!(stdout(&out), "0.143\n");
    } else {
        // Config directory is not under XDG_CONFIG_HOME on this platform.
        assert!(out.status.success());
    }
}

#[test]
fn test_emi_table() {
    let out = run(&[
        "emi", "--amount", "250000", "--rate", "6", "--tenure", "20", "--unit", "years",
    ]);
    assert!(out.status.success(), "{}", stderr(&out));
    let lines: Vec<_> = stdout(&out).lines().map(str::to_string).collect();
    assert_eq!(lines[0], "Monthly EMI     $1,791");
    assert_eq!(lines[1], "Principal       $250,000");
    assert_eq!(lines[3], "Total payment   $429,859");
}

#[test]
fn test_emi_strict() {
    let out = run(&["emi", "--amount", "0"]);
    assert!(out.status.success());
    assert!(stdout(&out).starts_with("Monthly EMI     $0\n"));

    let out = run(&["emi", "--amount", "0", "--strict"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stderr(&out), "error: loan amount must be greater than zero\n");
}

#[test]
fn test_emi_bad_unit() {
    let out = run(&["emi", "--unit", "weeks"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("unknown tenure unit 'weeks'"));
}

#[test]
fn test_currencies_search() {
    let out = run(&["currencies", "krona"]);
    assert_eq!(stdout(&out), "SEK  kr   Swedish Krona\n");

    let out = run(&["currencies", "doubloon"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn test_currencies_json() {
    let out = run(&["--json", "currencies", "yen"]);
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(
        value,
        serde_json::json!([{ "code": "JPY", "name": "Japanese Yen", "symbol": "¥" }])
    );
}

#[test]
fn test_convert_unreachable_provider() {
    let home = TempDir::new().unwrap();
    let out = omnicalc(&home)
        .env("OMNICALC_RATES_URL", "http://127.0.0.1:9/v6/latest")
        .env("OMNICALC_RATE_TIMEOUT", "2")
        .args(["convert", "100", "USD", "EUR"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(
        stderr(&out).starts_with("error: failed to reach exchange rate service"),
        "{}",
        stderr(&out)
    );
}

#[test]
fn test_repl_reads_stdin() {
    let home = TempDir::new().unwrap();
    let mut child = omnicalc(&home)
        .arg("repl")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all("9 √\n+ 1 =\n:history\n:quit\n1 2 3\n".as_bytes())
        .unwrap();
    let out = child.wait_with_output().unwrap();

    assert!(out.status.success());
    assert_eq!(stdout(&out), "3\n4\n  0  3 + 1 = 4\n");
}

#[test]
fn test_config_path_and_init() {
    let home = TempDir::new().unwrap();
    let out = omnicalc(&home).arg("--config-path").output().unwrap();
    let path = stdout(&out).trim().to_string();
    assert!(path.ends_with("config.toml"), "{path}");

    let out = omnicalc(&home).arg("--config-init").output().unwrap();
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(std::path::Path::new(&path).exists());

    let out = omnicalc(&home).arg("--config-init").output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Config file already exists"));
}

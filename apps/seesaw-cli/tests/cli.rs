use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_tmp_dir(prefix: &str) -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    std::env::temp_dir().join(format!("seesaw_cli_{prefix}_{}_{}", std::process::id(), now))
}

fn seesaw(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_seesaw"))
        .args(args)
        .env("SEESAW_LOG", "warn")
        .output()
        .expect("run seesaw")
}

fn write_fixture(dir: &Path, extra: &str) -> PathBuf {
    fs::create_dir_all(dir).expect("create fixture dir");
    fs::write(
        dir.join("a.csv"),
        "Date,Open,High,Low,Close\n\
31-01-2024,99,101,98,100\n\
29-02-2024,100,111,99,110\n\
28-03-2024,110,112,97,99\n\
30-04-2024,99,106,98,105\n",
    )
    .expect("write a.csv");
    fs::write(
        dir.join("b.csv"),
        "Date,Open,Close\n\
2024-01-31,100,100\n\
2024-02-29,100,105\n\
2024-03-29,105,110\n\
2024-04-30,110,108\n",
    )
    .expect("write b.csv");

    let config = format!(
        r#"[run]
run_id = "cli_run"
initial_capital = 1000.0

[assets.a]
name = "NIFTY"
path = "{a}"

[assets.b]
name = "GOLD"
path = "{b}"

[strategy]
selection = "momentum"
signal = "concurrent"

[benchmark]
kind = "blend"
weight_a = 0.5

[paths]
out_dir = "{out}"

{extra}
"#,
        a = dir.join("a.csv").display(),
        b = dir.join("b.csv").display(),
        out = dir.join("runs").display(),
    );
    let path = dir.join("config.toml");
    fs::write(&path, config).expect("write config");
    path
}

#[test]
fn backtest_then_report_round_trip() {
    let dir = unique_tmp_dir("backtest");
    let config = write_fixture(&dir, "[report]\nhtml = true");

    let output = seesaw(&["backtest", "--config", config.to_str().expect("utf8 path")]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("rotation: final="));
    assert!(stdout.contains("excess_return:"));

    let run_dir = dir.join("runs").join("cli_run");
    for name in [
        "equity.csv",
        "summary.json",
        "summary.html",
        "dashboard.html",
        "logs.jsonl",
        "config_snapshot.toml",
    ] {
        assert!(run_dir.join(name).exists(), "missing {name}");
    }
    let equity = fs::read_to_string(run_dir.join("equity.csv")).expect("equity");
    assert_eq!(equity.lines().count(), 4);

    let before: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(run_dir.join("summary.json")).expect("summary"))
            .expect("summary json");

    fs::remove_file(run_dir.join("summary.json")).expect("remove summary");
    let output = seesaw(&["report", "--input", run_dir.to_str().expect("utf8 path")]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let after: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(run_dir.join("summary.json")).expect("summary"))
            .expect("summary json");
    assert_eq!(before["switches"], after["switches"]);
    assert_eq!(before["meta"]["config_hash"], after["meta"]["config_hash"]);
}

#[test]
fn validate_writes_json_report() {
    let dir = unique_tmp_dir("validate");
    let config = write_fixture(&dir, "");
    let out = dir.join("validate.json");

    let output = seesaw(&[
        "validate",
        "--config",
        config.to_str().expect("utf8 path"),
        "--strict",
        "--out",
        out.to_str().expect("utf8 path"),
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).expect("report")).expect("report json");
    assert_eq!(report["overlap"]["months"], 4);
    assert_eq!(report["strict"], true);
}

#[test]
fn missing_price_file_exits_with_error() {
    let dir = unique_tmp_dir("missing");
    let config = write_fixture(&dir, "");
    fs::remove_file(dir.join("b.csv")).expect("remove b.csv");

    let output = seesaw(&["backtest", "--config", config.to_str().expect("utf8 path")]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("b.csv"));
}

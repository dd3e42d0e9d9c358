use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use rate_impact_sim::config::StudyConfig;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rate-impact"))
        .args(args)
        .output()
        .expect("rate-impact process should run")
}

fn run_ok(args: &[&str]) -> String {
    let output = run(args);
    assert!(
        output.status.success(),
        "run failed for {args:?}: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout should be valid UTF-8")
}

fn parse_dollars(stdout: &str, label: &str) -> f64 {
    let line = stdout
        .lines()
        .find(|line| line.trim_start().starts_with(label))
        .unwrap_or_else(|| panic!("missing line `{label}` in output: {stdout}"));

    let raw = line
        .split_once(':')
        .map(|(_, right)| right.trim())
        .unwrap_or_else(|| panic!("invalid format for line `{line}`"));
    let value = raw
        .trim_start_matches('$')
        .split_whitespace()
        .next()
        .unwrap_or_else(|| panic!("missing value in line `{line}`"));
    value
        .parse::<f64>()
        .unwrap_or_else(|e| panic!("invalid number `{value}` in line `{line}`: {e}"))
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("rate-impact-{}-{name}", std::process::id()))
}

#[test]
fn scenario_files_match_builtin_presets() {
    for name in StudyConfig::PRESETS {
        let path = PathBuf::from(format!("scenarios/{name}.toml"));
        let from_file = StudyConfig::from_toml_file(&path)
            .unwrap_or_else(|e| panic!("{}: {e}", path.display()));
        let preset = StudyConfig::from_preset(name).expect("preset");
        assert_eq!(from_file, preset, "{name}");
        assert!(from_file.validate().is_empty(), "{name}");
    }
}

#[test]
fn scenario_files_run_via_cli_and_differ_by_market() {
    let mut firm_increase = Vec::new();
    for name in StudyConfig::PRESETS {
        let path = format!("scenarios/{name}.toml");
        let stdout = run_ok(&["--config", &path]);

        let baseline = parse_dollars(&stdout, "Baseline final bill:");
        let firm = parse_dollars(&stdout, "Firm final bill:");
        let dispatchable = parse_dollars(&stdout, "Dispatchable final:");
        assert!(
            dispatchable <= firm,
            "{name}: dispatchable={dispatchable:.2} firm={firm:.2}"
        );
        assert!(stdout.contains("--- Revenue Adequacy ---"), "{name}");
        firm_increase.push((name, firm - baseline));
    }

    for pair in firm_increase.windows(2) {
        let ((a, da), (b, db)) = (pair[0], pair[1]);
        assert!(
            (da - db).abs() > 0.01,
            "expected {a} and {b} firm impacts to differ: {da:.3} vs {db:.3}"
        );
    }
}

#[test]
fn json_output_parses() {
    let stdout = run_ok(&["--preset", "miso", "--years", "10", "--json"]);
    let doc: serde_json::Value = serde_json::from_str(&stdout).expect("stdout should be JSON");

    for key in ["baseline", "firm", "flexible", "dispatchable"] {
        assert_eq!(
            doc["trajectories"][key].as_array().map(Vec::len),
            Some(11),
            "{key}"
        );
    }
    assert!(doc["summary"]["final_year_bills"]["baseline"].is_number());
}

#[test]
fn csv_export_written() {
    let out = temp_path("trajectories.csv");
    let out_str = out.to_string_lossy().into_owned();
    run_ok(&["--years", "5", "--csv-out", &out_str]);

    let content = fs::read_to_string(&out).expect("csv should exist");
    let _ = fs::remove_file(&out);
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("scenario,year,year_index,monthly_bill,annual_bill,dc_online,dc_impact,residential_allocation,effective_peak_mw")
    );
    assert_eq!(lines.count(), 4 * 6);
}

#[test]
fn invalid_config_exits_with_field_path() {
    let path = temp_path("invalid.toml");
    fs::write(&path, "[utility]\nsystem_peak_mw = 0.0\n").expect("write temp config");
    let output = run(&["--config", &path.to_string_lossy()]);
    let _ = fs::remove_file(&path);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("utility.system_peak_mw"), "stderr={stderr}");
}

#[test]
fn unknown_preset_fails() {
    let output = run(&["--preset", "caiso"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown preset"));
}

#[test]
fn catalog_utility_runs_via_cli() {
    let stdout = run_ok(&["--utility", "georgia-power", "--years", "10"]);
    let baseline = parse_dollars(&stdout, "Baseline final bill:");
    assert!((baseline - 153.0 * 1.045_f64.powi(10)).abs() < 0.01, "{baseline}");
}

#[test]
fn list_utilities_groups_by_region() {
    let stdout = run_ok(&["--list-utilities"]);
    assert!(stdout.lines().any(|l| l == "Southeast"));
    assert!(stdout.lines().any(|l| l == "Other"));
    assert!(stdout.contains("dominion-virginia"));
    assert!(!stdout.contains("Baseline final bill:"));
}

use std::process::Command;

#[test]
fn cli_runs_builtin_scenario() {
    let output = Command::new(env!("CARGO_BIN_EXE_garden-defence"))
        .args(["--ticks", "120", "--dt-ms", "50"])
        .output()
        .expect("failed to run garden-defence");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Welcome to Garden Defence."));
    assert!(stdout.contains("ticks simulated: 120"));
}

#[test]
fn cli_rejects_scenario_with_runaway_escalation() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let scenario = dir.path().join("scenario.toml");
    std::fs::write(&scenario, "[world]\nescalation_factor = -0.5\n").expect("write scenario");

    let output = Command::new(env!("CARGO_BIN_EXE_garden-defence"))
        .arg("--scenario")
        .arg(&scenario)
        .args(["--ticks", "10"])
        .output()
        .expect("failed to run garden-defence");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("escalation factor"), "{stderr}");
}

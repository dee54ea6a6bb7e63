use std::process::Command;

fn xtask(arg: &str) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_xtask"))
        .arg(arg)
        .output()
        .expect("run xtask")
}

#[test]
fn xtask_help_runs() {
    let output = xtask("help");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("xtask commands"));
}

#[test]
fn explain_coverage_passes() {
    let output = xtask("explain-coverage");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("codes have explanations"));
}

#[test]
fn report_fixtures_conform() {
    let output = xtask("conform");
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("identity_and_audit.json checked"));
}

#[test]
fn unknown_command_fails() {
    let output = xtask("frobnicate");
    assert!(!output.status.success());
}

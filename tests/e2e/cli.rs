//! The compiled `attest` binary: exit codes and printed output

use super::helpers::*;
use std::fs;

#[test]
fn test_no_subcommand_prints_welcome() {
    let project = Project::new().unwrap();
    let output = run_attest(project.root(), &[]).unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Available commands:"));
    assert!(stdout.contains("attest run"));
}

#[test]
fn test_run_exits_nonzero_on_fail_and_creates_default_config() {
    let project = Project::new().unwrap();

    let output = run_attest(project.root(), &["run", "--timeout", "1"]).unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("VERIFICATION REPORT"));
    assert!(stdout.contains("OVERALL STATUS: FAIL"));
    assert!(project.config_path().exists());
    assert!(project.evidence_dir().join("verification.log").exists());
}

#[test]
fn test_run_exits_zero_on_pass() {
    let project = Project::new().unwrap();
    project.write_file("main.py", "").unwrap();
    project.create_database("app.db", &["users"]).unwrap();

    let mut spec = empty_spec("Passing");
    spec.file_structure.required_files.insert("main.py".to_string());
    spec.database.connector = "sqlite:///app.db".to_string();
    spec.database.required_tables.insert("users".to_string());
    project.write_spec(&spec).unwrap();

    let output = run_attest(project.root(), &["run", "--sequential"]).unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "{stdout}");
    assert!(stdout.contains("SUMMARY: 3/3 checks passed"));
}

#[test]
fn test_malformed_config_exits_nonzero_without_report() {
    let project = Project::new().unwrap();
    fs::write(project.config_path(), "{ broken").unwrap();

    let output = run_attest(project.root(), &["run"]).unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(!String::from_utf8_lossy(&output.stdout).contains("VERIFICATION REPORT"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("not valid JSON"));
}

#[test]
fn test_chat_message_help_and_report() {
    let project = Project::new().unwrap();
    project.write_spec(&empty_spec("Chat")).unwrap();

    let help = run_attest(project.root(), &["chat", "--message", "hello"]).unwrap();
    assert!(help.status.success());
    assert!(String::from_utf8_lossy(&help.stdout).contains("'Run verification' - Execute verification"));

    let report = run_attest(project.root(), &["chat", "-m", "Please RUN Verification"]).unwrap();
    assert!(report.status.success());
    assert!(String::from_utf8_lossy(&report.stdout).contains("VERIFICATION REPORT"));
}

#[test]
fn test_evidence_verify_flags_tampering() {
    let project = Project::new().unwrap();
    project.write_spec(&empty_spec("Tamper")).unwrap();
    run_attest(project.root(), &["run"]).unwrap();

    let manifest = project
        .evidence_files()
        .into_iter()
        .find(|name| name.starts_with("run_"))
        .unwrap();
    let manifest_path = project.evidence_dir().join(&manifest);
    let manifest_arg = manifest_path.to_string_lossy().to_string();

    let intact = run_attest(project.root(), &["evidence", "verify", &manifest_arg]).unwrap();
    assert!(intact.status.success());

    let report = project
        .evidence_files()
        .into_iter()
        .find(|name| name.starts_with("verification_report_"))
        .unwrap();
    fs::write(project.evidence_dir().join(report), "rewritten").unwrap();

    let tampered = run_attest(project.root(), &["evidence", "verify", &manifest_arg]).unwrap();
    assert_eq!(tampered.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&tampered.stdout).contains("modified"));

    let listing = run_attest(project.root(), &["evidence", "list"]).unwrap();
    assert!(listing.status.success());
    assert!(String::from_utf8_lossy(&listing.stdout).contains(&manifest));
}

#[test]
fn test_evidence_verify_from_another_directory() {
    let project = Project::new().unwrap();
    project.write_spec(&empty_spec("Elsewhere")).unwrap();
    run_attest(project.root(), &["run"]).unwrap();

    let manifest = project
        .evidence_files()
        .into_iter()
        .find(|name| name.starts_with("run_"))
        .unwrap();
    let manifest_path = project.evidence_dir().join(&manifest);

    let elsewhere = tempfile::TempDir::new().unwrap();
    let output = run_attest(
        elsewhere.path(),
        &["evidence", "verify", &manifest_path.to_string_lossy()],
    )
    .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "{stdout}");
    assert!(!stdout.contains("missing"));

    // Relative manifest path, resolved from the project root
    let relative = format!("verification_evidence/{manifest}");
    let output = run_attest(project.root(), &["evidence", "verify", &relative]).unwrap();
    assert!(output.status.success());
}

#[test]
fn test_init_and_doctor() {
    let project = Project::new().unwrap();

    let doctor_before = run_attest(project.root(), &["doctor"]).unwrap();
    assert_eq!(doctor_before.status.code(), Some(1));

    let init = run_attest(project.root(), &["init"]).unwrap();
    assert!(init.status.success());
    assert!(project.config_path().exists());

    let again = run_attest(project.root(), &["init"]).unwrap();
    assert_eq!(again.status.code(), Some(1));

    let doctor_after = run_attest(project.root(), &["doctor"]).unwrap();
    assert!(doctor_after.status.success());
}

#[test]
fn test_completions_for_bash() {
    let project = Project::new().unwrap();
    let output = run_attest(project.root(), &["completions", "bash"]).unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("attest"));
}

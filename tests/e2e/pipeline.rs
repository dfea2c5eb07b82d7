//! Full runs through the engine against temp projects

use super::helpers::*;
use attest::checks::Status;
use attest::engine::{Engine, RunOptions};
use attest::evidence::verify_manifest;
use attest::report::without_timestamp;
use httpmock::prelude::*;
use std::fs;

fn engine_for(project: &Project, spec: attest::Specification) -> Engine {
    Engine::new(spec, RunOptions::rooted_at(project.root())).unwrap()
}

#[test]
fn test_missing_file_with_empty_database_reports_two_of_three() {
    let project = Project::new().unwrap();
    let db = project.root().join("empty.db");
    fs::write(&db, b"").unwrap();

    let mut spec = empty_spec("Scenario");
    spec.file_structure.required_files.insert("a.txt".to_string());
    spec.database.connector = format!("sqlite:///{}", db.display());

    let mut engine = engine_for(&project, spec);
    let report = engine.run_verification("phase2").unwrap();

    let results = engine.results();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].component(), "File Structure");
    assert_eq!(results[0].status(), Status::Fail);
    assert_eq!(results[1].component(), "Database Schema");
    assert_eq!(results[1].status(), Status::Pass);
    assert_eq!(results[2].component(), "API Endpoints");
    assert_eq!(results[2].status(), Status::Pass);

    assert!(report.text.contains("SUMMARY: 2/3 checks passed"));
    assert!(report.text.contains("OVERALL STATUS: FAIL"));
    assert_eq!(report.overall, Status::Fail);

    let evidence: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(results[0].evidence().unwrap()).unwrap()).unwrap();
    assert_eq!(evidence["missing_files"], serde_json::json!(["a.txt"]));
}

#[test]
fn test_corrupt_database_does_not_stop_other_checks() {
    let project = Project::new().unwrap();
    project.write_file("main.py", "print('hi')").unwrap();
    project
        .write_file("broken.db", &"this is not a sqlite database ".repeat(20))
        .unwrap();

    let server = MockServer::start();
    let health = server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(200).body("ok");
    });

    let mut spec = empty_spec("Partial");
    spec.file_structure.required_files.insert("main.py".to_string());
    spec.database.connector = "sqlite:///broken.db".to_string();
    spec.database.required_tables.insert("users".to_string());
    spec.api.base_url = server.base_url();
    spec.api.endpoints = vec!["/health".to_string()];

    let mut engine = engine_for(&project, spec);
    let report = engine.run_verification("phase2").unwrap();

    health.assert();
    let results = engine.results();
    assert!(results[0].is_pass());
    assert_eq!(results[1].status(), Status::Fail);
    assert!(results[1].details().starts_with("Error checking database"));
    let error_artifact = results[1].evidence().unwrap();
    assert!(error_artifact
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("database_error_"));
    assert!(results[2].is_pass());
    assert!(report.text.contains("SUMMARY: 2/3 checks passed"));
}

#[test]
fn test_satisfied_project_passes_and_manifest_verifies() {
    let project = Project::new().unwrap();
    project.write_file("main.py", "").unwrap();
    project.write_file("requirements.txt", "").unwrap();
    project.create_dir("src").unwrap();
    project.create_database("app.db", &["users", "conversations", "models"]).unwrap();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(200);
    });
    // 404 still counts as reachable
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/models");
        then.status(404);
    });

    let mut spec = empty_spec("Complete");
    spec.file_structure.required_files = ["main.py", "requirements.txt"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    spec.file_structure.required_dirs.insert("src/".to_string());
    spec.database.connector = "app.db".to_string();
    spec.database.required_tables = ["users", "models"].iter().map(|s| s.to_string()).collect();
    spec.api.base_url = server.base_url();
    spec.api.endpoints = vec!["/health".to_string(), "/api/v1/models".to_string()];

    let mut engine = engine_for(&project, spec);
    let report = engine.run_verification("phase2").unwrap();
    assert!(report.is_pass(), "{}", report.text);
    assert!(report.text.contains("SUMMARY: 3/3 checks passed"));

    let manifest = project
        .evidence_files()
        .into_iter()
        .find(|name| name.starts_with("run_"))
        .unwrap();
    let checks = verify_manifest(&project.evidence_dir().join(manifest)).unwrap();
    assert_eq!(checks.len(), 4);
    assert!(checks.iter().all(|c| c.is_intact()));
}

#[test]
fn test_sequential_and_concurrent_runs_agree() {
    let project = Project::new().unwrap();
    project.write_file("present.txt", "").unwrap();

    let mut spec = empty_spec("Modes");
    spec.file_structure.required_files = ["present.txt", "absent.txt"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    spec.database.connector = project.root().join("none.db").display().to_string();

    let mut concurrent = engine_for(&project, spec.clone());
    let sequential_options = RunOptions {
        parallel: false,
        ..RunOptions::rooted_at(project.root())
    };
    let mut sequential = Engine::new(spec, sequential_options).unwrap();

    let a = concurrent.run_verification("phase2").unwrap();
    let b = sequential.run_verification("phase2").unwrap();

    let stable = |text: &str| -> Vec<String> {
        without_timestamp(text)
            .lines()
            .filter(|l| !l.contains("Evidence:"))
            .map(str::to_string)
            .collect()
    };
    assert_eq!(stable(&a.text), stable(&b.text));
    assert_eq!(a.passed, 1);
}

#[test]
fn test_rapid_runs_never_overwrite_evidence() {
    let project = Project::new().unwrap();
    let mut engine = engine_for(&project, empty_spec("Rapid"));

    for _ in 0..5 {
        engine.run_verification("phase2").unwrap();
    }

    // Per run: three check artifacts, one report, one manifest
    assert_eq!(project.evidence_files().len(), 25);
}

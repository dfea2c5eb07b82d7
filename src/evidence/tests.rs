use super::*;
use crate::checks::VerificationResult;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

#[test]
fn test_open_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("nested").join("evidence");

    let store = EvidenceStore::open(&dir).unwrap();

    assert!(dir.is_dir());
    assert_eq!(store.dir(), dir.as_path());
    assert_eq!(store.log_path(), dir.join(LOG_FILE_NAME));
}

#[test]
fn test_open_fails_when_path_is_a_file() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("evidence");
    fs::write(&blocker, "not a directory").unwrap();

    assert!(EvidenceStore::open(&blocker).is_err());
}

#[test]
fn test_write_json_records_digest() {
    let temp_dir = TempDir::new().unwrap();
    let store = EvidenceStore::open(temp_dir.path()).unwrap();

    let evidence = store
        .write_json("file_structure", &json!({ "missing_files": ["a.txt"] }))
        .unwrap();

    let content = fs::read(&evidence.path).unwrap();
    assert_eq!(evidence.bytes, content.len() as u64);
    assert_eq!(evidence.sha256, sha256_hex(&content));
    let name = evidence.path.file_name().unwrap().to_string_lossy();
    assert!(name.starts_with("file_structure_"));
    assert!(name.ends_with(".json"));

    let parsed: serde_json::Value = serde_json::from_slice(&content).unwrap();
    assert_eq!(parsed["missing_files"][0], "a.txt");
}

#[test]
fn test_rapid_writes_never_collide() {
    let temp_dir = TempDir::new().unwrap();
    let store = EvidenceStore::open(temp_dir.path()).unwrap();

    let paths: HashSet<_> = (0..50)
        .map(|i| store.write_json("api_endpoints", &json!({ "i": i })).unwrap().path)
        .collect();

    assert_eq!(paths.len(), 50);
    assert_eq!(store.list().unwrap().len(), 50);
}

#[test]
fn test_two_stores_on_one_directory_do_not_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let first = EvidenceStore::open(temp_dir.path()).unwrap();
    let second = EvidenceStore::open(temp_dir.path()).unwrap();

    // Both counters start at zero, so the second write hits an existing name
    let a = first.write_text("verification_report", "first").unwrap();
    let b = second.write_text("verification_report", "second").unwrap();

    assert_ne!(a.path, b.path);
    assert_eq!(fs::read_to_string(&a.path).unwrap(), "first");
    assert_eq!(fs::read_to_string(&b.path).unwrap(), "second");
}

#[test]
fn test_concurrent_writers_get_distinct_files() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(EvidenceStore::open(temp_dir.path()).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                (0..10)
                    .map(|i| {
                        store
                            .write_json("database_schema", &json!({ "t": t, "i": i }))
                            .unwrap()
                            .path
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut all = HashSet::new();
    for handle in handles {
        all.extend(handle.join().unwrap());
    }
    assert_eq!(all.len(), 80);
}

#[test]
fn test_list_is_sorted_and_skips_directories() {
    let temp_dir = TempDir::new().unwrap();
    let store = EvidenceStore::open(temp_dir.path()).unwrap();
    store.write_text("b_kind", "x").unwrap();
    store.write_text("a_kind", "yy").unwrap();
    fs::create_dir(temp_dir.path().join("subdir")).unwrap();

    let files = store.list().unwrap();

    assert_eq!(files.len(), 2);
    assert!(files[0].name.starts_with("a_kind_"));
    assert_eq!(files[0].bytes, 2);
    assert!(files[1].name.starts_with("b_kind_"));
}

#[test]
fn test_manifest_detects_tampering_and_removal() {
    let temp_dir = TempDir::new().unwrap();
    let store = EvidenceStore::open(temp_dir.path()).unwrap();

    let fs_evidence = store.write_json("file_structure", &json!({ "ok": true })).unwrap();
    let db_evidence = store.write_json("database_schema", &json!({ "ok": true })).unwrap();
    let report = store.write_text("verification_report", "report").unwrap();

    let results = vec![
        VerificationResult::passed("File Structure", "ok", Some(fs_evidence.clone())),
        VerificationResult::failed("Database Schema", "bad", Some(db_evidence.clone())),
        VerificationResult::passed("API Endpoints", "ok", None),
    ];
    let manifest = RunManifest::build("run-1", "phase2", "Demo", Utc::now(), &results, &report);
    assert_eq!(manifest.overall, crate::checks::Status::Fail);
    assert_eq!(manifest.artifacts.len(), 3);

    let manifest_ref = manifest.persist(&store).unwrap();
    assert!(verify_manifest(&manifest_ref.path)
        .unwrap()
        .iter()
        .all(ArtifactCheck::is_intact));

    fs::write(&fs_evidence.path, "{}").unwrap();
    fs::remove_file(&report.path).unwrap();

    let checks = verify_manifest(&manifest_ref.path).unwrap();
    assert!(matches!(checks[0].state, ArtifactState::Modified { .. }));
    assert_eq!(checks[1].state, ArtifactState::Intact);
    assert_eq!(checks[2].state, ArtifactState::Missing);

    let loaded = RunManifest::load(&manifest_ref.path).unwrap();
    assert_eq!(loaded.results, results);
}

#[test]
fn test_manifest_paths_are_relative_to_evidence_dir() {
    let temp_dir = TempDir::new().unwrap();
    let store = EvidenceStore::open(temp_dir.path().join("evidence")).unwrap();
    let artifact = store.write_json("file_structure", &json!({ "ok": true })).unwrap();
    let report = store.write_text("verification_report", "report").unwrap();
    let results = vec![VerificationResult::passed("File Structure", "ok", Some(artifact.clone()))];

    let manifest = RunManifest::build("run-1", "phase2", "Demo", Utc::now(), &results, &report);

    assert_eq!(manifest.artifacts[0].path, artifact.path.file_name().map(PathBuf::from).unwrap());
    assert_eq!(manifest.artifacts[0].sha256, artifact.sha256);
    assert!(manifest.artifacts.iter().all(|a| a.path.is_relative()));

    // Moving the whole directory keeps the manifest verifiable
    let manifest_ref = manifest.persist(&store).unwrap();
    let moved = temp_dir.path().join("archived");
    fs::rename(store.dir(), &moved).unwrap();
    let checks = verify_manifest(&moved.join(manifest_ref.path.file_name().unwrap())).unwrap();
    assert_eq!(checks.len(), 2);
    assert!(checks.iter().all(ArtifactCheck::is_intact));
}

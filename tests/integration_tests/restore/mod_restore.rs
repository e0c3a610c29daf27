use bson::doc;
use mongoba::cli::{ScriptedPrompter, restore_flow};
use mongoba::errors::{BackupError, FormatError};
use mongoba::pipeline::{RunTracker, Stage, load_backup, run_restore};
use mongoba::{DocumentSet, MemoryStore, serializer};
use std::fs;
use tempfile::tempdir;

fn write_backup(dir: &std::path::Path, name: &str, data: &[DocumentSet]) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, serializer::serialize(data, false).unwrap()).unwrap();
    path
}

#[test]
fn test_load_backup_rejects_encrypted_suffix_with_hint() {
    let dir = tempdir().unwrap();
    let p = dir.path().join("b.json.enc");
    fs::write(&p, "4d475042").unwrap();
    let err = load_backup(&p).unwrap_err();
    assert!(matches!(err, BackupError::Format(FormatError::EncryptedInput(_))));
    assert!(err.to_string().contains("mongoba decrypt"));
}

#[test]
fn test_load_backup_rejects_other_suffix() {
    let dir = tempdir().unwrap();
    let p = dir.path().join("b.bson");
    fs::write(&p, "[]").unwrap();
    assert!(matches!(load_backup(&p), Err(BackupError::Format(FormatError::NotJson(_)))));
}

#[test]
fn test_load_backup_detects_encrypted_content_under_json_name() {
    let dir = tempdir().unwrap();
    let p = dir.path().join("b.json");
    let ct = mongoba::crypto::encrypt_with("[]", "k", &super::support::fast_kdf()).unwrap();
    fs::write(&p, ct).unwrap();
    assert!(matches!(load_backup(&p), Err(BackupError::Format(FormatError::EncryptedInput(_)))));
}

#[test]
fn test_load_backup_reads_legacy_plain_json() {
    let dir = tempdir().unwrap();
    let p = dir.path().join("legacy.json");
    fs::write(
        &p,
        r#"[{"db":"app","collections":[{"collection":"users","documents":[{"_id":"5f43a1b2c3d4e5f601234567","n":1}]}]}]"#,
    )
    .unwrap();
    let data = load_backup(&p).unwrap();
    assert_eq!(data[0].collections[0].documents[0].get_str("_id").unwrap(), "5f43a1b2c3d4e5f601234567");
}

#[test]
fn test_load_backup_malformed_json() {
    let dir = tempdir().unwrap();
    let p = dir.path().join("bad.json");
    fs::write(&p, "{\"db\": ").unwrap();
    assert!(matches!(load_backup(&p), Err(BackupError::Format(FormatError::InvalidJson(_)))));
}

#[tokio::test]
async fn test_restore_ordered_stops_at_duplicate_sibling_continues() {
    let store = MemoryStore::new().with_collection("app", "users", vec![doc! {"_id": "d2", "existing": true}]);
    let data = vec![
        DocumentSet::new("app")
            .with_collection("users", vec![doc! {"_id": "d1"}, doc! {"_id": "d2"}, doc! {"_id": "d3"}])
            .with_collection("orders", vec![doc! {"_id": 1}, doc! {"_id": 2}]),
    ];
    let mut tracker = RunTracker::new("restore");
    let report = run_restore(&store, &data, &["app".to_string()], &mut tracker).await.unwrap();

    assert_eq!(tracker.current(), Stage::Done);
    let ids: Vec<_> = store.documents("app", "users").iter().map(|d| d.get_str("_id").unwrap().to_string()).collect();
    assert_eq!(ids, ["d2", "d1"], "d3 is never attempted after the duplicate");
    assert_eq!(store.documents("app", "orders").len(), 2);
    let failed: Vec<_> = report.failed().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!((failed[0].inserted, failed[0].attempted), (1, 3));
    assert_eq!(report.inserted(), 3);
}

#[tokio::test]
async fn test_restore_flow_end_to_end_with_summary() {
    let dir = tempdir().unwrap();
    let data = vec![
        DocumentSet::new("app").with_collection("users", vec![doc! {"_id": 1}, doc! {"_id": 2}]),
        DocumentSet::new("other").with_collection("x", vec![doc! {"_id": 1}]),
    ];
    let path = write_backup(dir.path(), "b.json", &data);
    let store = MemoryStore::new().with_collection("app", "users", vec![doc! {"_id": 2}]);
    // action, path, databases (only app), confirm
    let mut p = ScriptedPrompter::new(["1", path.to_str().unwrap(), "1", ""]);
    let mut tracker = RunTracker::new("restore");

    restore_flow(&store, &mut p, &mut tracker).await.unwrap();

    assert!(!store.has_collection("other", "x"));
    assert_eq!(store.documents("app", "users").len(), 2);
    assert!(p.output.iter().any(|l| l.starts_with("[!] app.users: inserted 1 of 2")));
}

#[tokio::test]
async fn test_restore_flow_marks_unknown_stop_point_as_lower_bound() {
    let dir = tempdir().unwrap();
    let docs = (1..=5_i32).map(|i| doc! {"_id": i}).collect();
    let path = write_backup(dir.path(), "b.json", &[DocumentSet::new("logsdb").with_collection("events", docs)]);
    let store = MemoryStore::new().fail_insert_after("logsdb", "events", 3);
    let mut p = ScriptedPrompter::new(["1", path.to_str().unwrap(), "", ""]);
    let mut tracker = RunTracker::new("restore");

    restore_flow(&store, &mut p, &mut tracker).await.unwrap();

    assert_eq!(tracker.current(), Stage::Done);
    assert_eq!(store.documents("logsdb", "events").len(), 3);
    assert!(p.output.iter().any(|l| l.starts_with("[!] logsdb.events: inserted at least 3 of 5")));
}

#[tokio::test]
async fn test_restore_flow_declined_confirmation_writes_nothing() {
    let dir = tempdir().unwrap();
    let data = vec![DocumentSet::new("app").with_collection("users", vec![doc! {"_id": 1}])];
    let path = write_backup(dir.path(), "b.json", &data);
    let store = MemoryStore::new();
    let mut p = ScriptedPrompter::new(["1", path.to_str().unwrap(), "", "n"]);
    let mut tracker = RunTracker::new("restore");
    restore_flow(&store, &mut p, &mut tracker).await.unwrap();
    assert_eq!(tracker.current(), Stage::Cancelled);
    assert!(!store.has_collection("app", "users"));
}

#[tokio::test]
async fn test_restore_round_trips_backup_output() {
    let source = super::support::shop_store();
    let sel = super::support::selection(&[("shopdb", &["users", "orders"])]);
    let data = mongoba::fetch::fetch_all(&source, &sel).await.unwrap();
    let text = serializer::serialize(&data, true).unwrap();

    let target = MemoryStore::new();
    let parsed = serializer::deserialize(&text).unwrap();
    let report = mongoba::restore::restore(&target, &parsed).await;
    assert!(report.is_complete());
    assert_eq!(target.documents("shopdb", "users"), super::support::users());
}

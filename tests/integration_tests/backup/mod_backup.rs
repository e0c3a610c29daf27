use super::support::{events, fast_kdf, selection, shop_store, test_config, users};
use mongoba::cli::{ScriptedPrompter, backup_flow};
use mongoba::errors::BackupError;
use mongoba::pipeline::{BackupPlan, Outcome, RunTracker, Stage, run_backup};
use mongoba::{MemoryStore, serializer};
use std::fs;
use tempfile::tempdir;
use zeroize::Zeroizing;

#[tokio::test]
async fn test_backup_flow_shopdb_logsdb_end_to_end() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("backup.json");
    let store = shop_store();
    // dbs (defaults: logsdb + shopdb), logsdb colls, shopdb colls, path, pretty, encrypt
    let mut p = ScriptedPrompter::new(["", "", "", out.to_str().unwrap(), "n", "n"]);
    let mut tracker = RunTracker::new("backup");

    backup_flow(&store, &mut p, &test_config(), &mut tracker).await.unwrap();

    assert_eq!(tracker.current(), Stage::Done);
    assert_eq!(p.remaining(), 0);
    let data = serializer::deserialize(&fs::read_to_string(&out).unwrap()).unwrap();
    let layout: Vec<_> = data
        .iter()
        .flat_map(|set| set.collections.iter().map(move |c| (set.db.as_str(), c.collection.as_str(), c.documents.len())))
        .collect();
    assert_eq!(layout, [("logsdb", "events", 5), ("shopdb", "users", 2)], "empty orders must be dropped");
    assert_eq!(data[0].collections[0].documents, events());
    assert_eq!(data[1].collections[0].documents, users());
    assert!(p.output.iter().any(|l| l.contains("7 documents from 2 collections in 2 databases")));
}

#[tokio::test]
async fn test_backup_drops_database_whose_collections_are_all_empty() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("b.json");
    let store = MemoryStore::new()
        .with_collection("shopdb", "users", users())
        .with_collection("emptydb", "a", vec![])
        .with_collection("emptydb", "b", vec![]);
    let plan = BackupPlan {
        selection: selection(&[("emptydb", &["a", "b"]), ("shopdb", &["users"])]),
        output: out.clone(),
        pretty: false,
        password: None,
        kdf: fast_kdf(),
    };
    let mut tracker = RunTracker::new("backup");
    let result = run_backup(&store, &plan, &mut tracker, |_| Ok(false)).await.unwrap();
    assert_eq!(result.stats.databases, 1);
    let data = serializer::deserialize(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0].db, "shopdb");
}

#[tokio::test]
async fn test_backup_flow_admin_is_unchecked_by_default() {
    let store = shop_store();
    let mut p = ScriptedPrompter::new(["none"]);
    let mut tracker = RunTracker::new("backup");
    backup_flow(&store, &mut p, &test_config(), &mut tracker).await.unwrap();
    assert_eq!(tracker.current(), Stage::Cancelled);
    assert!(p.output.iter().any(|l| l.contains("Nothing selected")));
}

#[tokio::test]
async fn test_backup_flow_rejects_non_json_name_and_reasks() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("b.json");
    let bad = dir.path().join("b.txt");
    let store = shop_store();
    let mut p = ScriptedPrompter::new(["3", "", bad.to_str().unwrap(), out.to_str().unwrap(), "", "n"]);
    let mut tracker = RunTracker::new("backup");
    backup_flow(&store, &mut p, &test_config(), &mut tracker).await.unwrap();
    assert!(out.exists());
    assert!(!bad.exists());
    assert!(p.output.iter().any(|l| l.contains(".json")));
}

#[tokio::test]
async fn test_backup_flow_encrypted_output_gets_enc_suffix() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("b.json");
    let store = shop_store();
    let mut p = ScriptedPrompter::new(["3", "", out.to_str().unwrap(), "n", "y", "secret", "secret"]);
    let mut tracker = RunTracker::new("backup");
    backup_flow(&store, &mut p, &test_config(), &mut tracker).await.unwrap();

    let enc = dir.path().join("b.json.enc");
    assert!(!out.exists());
    let text = fs::read_to_string(&enc).unwrap();
    assert!(mongoba::crypto::is_encrypted(&text));
    let plain = mongoba::crypto::decrypt(&text, "secret").unwrap();
    assert_eq!(serializer::deserialize(&plain).unwrap()[0].db, "shopdb");
    assert!(p.asked.iter().any(|q| q.contains("Repeat")));
}

#[tokio::test]
async fn test_backup_existing_file_not_overwritten_on_no() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("backup.json");
    fs::write(&out, "previous contents").unwrap();
    let store = shop_store();
    let mut p = ScriptedPrompter::new(["3", "", out.to_str().unwrap(), "n", "n", "n"]);
    let mut tracker = RunTracker::new("backup");

    backup_flow(&store, &mut p, &test_config(), &mut tracker).await.unwrap();

    assert_eq!(fs::read_to_string(&out).unwrap(), "previous contents");
    assert_eq!(tracker.current(), Stage::Cancelled);
    assert!(p.asked.last().unwrap().contains("already exists"));
    assert!(p.output.iter().any(|l| l == "Backup file not written."));
}

#[tokio::test]
async fn test_run_backup_overwrites_when_confirmed() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("backup.json");
    fs::write(&out, "old").unwrap();
    let plan = BackupPlan {
        selection: selection(&[("shopdb", &["users"])]),
        output: out.clone(),
        pretty: true,
        password: None,
        kdf: fast_kdf(),
    };
    let mut tracker = RunTracker::new("backup");
    let result = run_backup(&shop_store(), &plan, &mut tracker, |_| Ok(true)).await.unwrap();
    assert_eq!(result.outcome, Outcome::Written(out.clone()));
    assert_eq!(result.stats.documents, 2);
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("[\n  {"), "pretty output uses two-space indent");
    assert!(text.contains("\"$numberInt\""));
}

#[tokio::test]
async fn test_run_backup_fetch_failure_writes_nothing() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("backup.json");
    let store = MemoryStore::new()
        .with_collection("a", "x", vec![bson::doc! {"_id": 1}])
        .with_collection("a", "y", vec![bson::doc! {"_id": 1}])
        .fail_find_on("a", "y");
    let plan = BackupPlan {
        selection: selection(&[("a", &["x", "y"])]),
        output: out.clone(),
        pretty: false,
        password: Some(Zeroizing::new("k".into())),
        kdf: fast_kdf(),
    };
    let mut tracker = RunTracker::new("backup");
    let err = run_backup(&store, &plan, &mut tracker, |_| Ok(true)).await.unwrap_err();
    assert!(matches!(err, BackupError::Fetch { .. }));
    assert_eq!(tracker.current(), Stage::Failed);
    assert!(!out.exists());
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_run_backup_stage_history() {
    let dir = tempdir().unwrap();
    let plan = BackupPlan {
        selection: selection(&[("shopdb", &["users"])]),
        output: dir.path().join("h.json"),
        pretty: false,
        password: Some(Zeroizing::new("k".into())),
        kdf: fast_kdf(),
    };
    let mut tracker = RunTracker::new("backup");
    run_backup(&shop_store(), &plan, &mut tracker, |_| Ok(false)).await.unwrap();
    assert_eq!(
        tracker.history(),
        [Stage::Idle, Stage::Fetching, Stage::Serializing, Stage::Encrypting, Stage::Persisting, Stage::Done]
    );
}

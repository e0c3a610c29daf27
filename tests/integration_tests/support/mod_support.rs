use bson::{Document, doc};
use mongoba::config::{AppConfig, KdfConfig};
use mongoba::crypto::PbeKdfParams;
use mongoba::{MemoryStore, Selection};

pub fn fast_kdf() -> PbeKdfParams {
    PbeKdfParams { t_cost: 1, m_cost_kib: 1024, lanes: 1 }
}

/// Config with a cheap KDF so encrypted runs stay fast.
pub fn test_config() -> AppConfig {
    AppConfig {
        kdf: KdfConfig { t_cost: Some(1), m_cost_kib: Some(1024), lanes: Some(1) },
        ..AppConfig::default()
    }
}

pub fn users() -> Vec<Document> {
    vec![doc! {"_id": 1, "name": "ann", "tags": ["a", "b"]}, doc! {"_id": 2, "name": "bob", "age": 41_i64}]
}

pub fn events() -> Vec<Document> {
    (1..=5_i32).map(|i| doc! {"_id": i, "kind": "login", "seq": i64::from(i)}).collect()
}

/// shopdb: users (2 docs), orders (empty); logsdb: events (5 docs); admin: system.version.
pub fn shop_store() -> MemoryStore {
    MemoryStore::new()
        .with_collection("shopdb", "users", users())
        .with_collection("shopdb", "orders", vec![])
        .with_collection("logsdb", "events", events())
        .with_collection("admin", "system.version", vec![doc! {"_id": "featureCompatibilityVersion"}])
}

pub fn selection(pairs: &[(&str, &[&str])]) -> Selection {
    pairs.iter().map(|(d, c)| (d.to_string(), c.iter().map(|s| s.to_string()).collect())).collect()
}

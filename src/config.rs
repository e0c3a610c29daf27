//! Optional TOML file holding prompt defaults. Never holds secrets.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::crypto::PbeKdfParams;
use crate::errors::BackupError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct KdfConfig {
    pub t_cost: Option<u32>,
    pub m_cost_kib: Option<u32>,
    pub lanes: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub auth_database: Option<String>,
    pub scheme: Option<String>,
    pub pretty: Option<bool>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_retention: Option<u32>,
    #[serde(default)]
    pub kdf: KdfConfig,
}

impl AppConfig {
    /// Fill every unset field from `other`.
    fn merge_from(&mut self, other: Self) {
        self.host = self.host.take().or(other.host);
        self.port = self.port.or(other.port);
        self.username = self.username.take().or(other.username);
        self.auth_database = self.auth_database.take().or(other.auth_database);
        self.scheme = self.scheme.take().or(other.scheme);
        self.pretty = self.pretty.or(other.pretty);
        self.log_dir = self.log_dir.take().or(other.log_dir);
        self.log_level = self.log_level.take().or(other.log_level);
        self.log_retention = self.log_retention.or(other.log_retention);
        self.kdf.t_cost = self.kdf.t_cost.or(other.kdf.t_cost);
        self.kdf.m_cost_kib = self.kdf.m_cost_kib.or(other.kdf.m_cost_kib);
        self.kdf.lanes = self.kdf.lanes.or(other.kdf.lanes);
    }

    #[must_use]
    pub fn kdf_params(&self) -> PbeKdfParams {
        let d = PbeKdfParams::default();
        PbeKdfParams {
            t_cost: self.kdf.t_cost.unwrap_or(d.t_cost),
            m_cost_kib: self.kdf.m_cost_kib.unwrap_or(d.m_cost_kib),
            lanes: self.kdf.lanes.unwrap_or(d.lanes),
        }
    }
}

/// Config merged from every file found, plus notices for the operator.
#[derive(Debug, Default)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub sources: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

/// Search order: explicit path, `<config dir>/mongoba/config.toml`, `./mongoba.toml`.
#[must_use]
pub fn config_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(p) = explicit {
        paths.push(p.to_path_buf());
    }
    if let Some(dir) = dirs_next::config_dir() {
        paths.push(dir.join("mongoba").join("config.toml"));
    }
    if let Ok(cur) = std::env::current_dir() {
        paths.push(cur.join("mongoba.toml"));
    }
    paths
}

fn is_secret_key(key: &str) -> bool {
    let k = key.to_ascii_lowercase();
    k.contains("password") || k.contains("passwd") || k.contains("secret") || k.contains("token")
}

fn scan_for_secret_keys(val: &toml::Value) -> Vec<String> {
    let mut secrets = Vec::new();
    let mut q = VecDeque::new();
    q.push_back((String::new(), val));
    while let Some((prefix, v)) = q.pop_front() {
        if let toml::Value::Table(map) = v {
            for (k, vv) in map {
                let full = if prefix.is_empty() { k.clone() } else { format!("{prefix}.{k}") };
                if is_secret_key(k) {
                    secrets.push(full.clone());
                }
                q.push_back((full, vv));
            }
        }
    }
    secrets
}

/// Parse one config file. Secret-looking keys are reported and never read.
///
/// # Errors
/// `Config` if the file is not valid TOML, a field has the wrong type, or the
/// `[kdf]` table is outside the range encryption accepts.
pub fn parse_config(text: &str, origin: &Path) -> Result<(AppConfig, Vec<String>), BackupError> {
    let table: toml::Table =
        toml::from_str(text).map_err(|e| BackupError::Config(format!("{}: {e}", origin.display())))?;
    let value = toml::Value::Table(table);
    let warnings = scan_for_secret_keys(&value)
        .into_iter()
        .map(|k| format!("{}: ignoring secret-looking key '{k}'; secrets are only ever prompted for", origin.display()))
        .collect();
    let config: AppConfig =
        value.try_into().map_err(|e| BackupError::Config(format!("{}: {e}", origin.display())))?;
    check_kdf(&config, &origin.display().to_string())?;
    Ok((config, warnings))
}

fn check_kdf(config: &AppConfig, origin: &str) -> Result<(), BackupError> {
    config.kdf_params().check().map_err(|m| BackupError::Config(format!("{origin}: [kdf] {m}")))
}

/// Load and merge config files; earlier paths win field by field.
///
/// # Errors
/// `Config` when an explicitly named file is missing or any found file is invalid.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig, BackupError> {
    if let Some(p) = explicit
        && !p.is_file()
    {
        return Err(BackupError::Config(format!("config file not found: {}", p.display())));
    }
    let mut loaded = LoadedConfig::default();
    for path in config_paths(explicit) {
        if !path.is_file() || loaded.sources.contains(&path) {
            continue;
        }
        let text = std::fs::read_to_string(&path)?;
        let (cfg, warnings) = parse_config(&text, &path)?;
        loaded.config.merge_from(cfg);
        loaded.warnings.extend(warnings);
        loaded.sources.push(path);
    }
    check_kdf(&loaded.config, "merged config")?;
    Ok(loaded)
}

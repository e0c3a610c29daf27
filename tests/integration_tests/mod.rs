// Integration suites, one folder per area
#[path = "support/mod_support.rs"]
pub mod support;

#[path = "backup/mod_backup.rs"]
mod backup;
#[path = "cli/mod_cli.rs"]
mod cli;
#[path = "decrypt/mod_decrypt.rs"]
mod decrypt;
#[path = "purge/mod_purge.rs"]
mod purge;
#[path = "restore/mod_restore.rs"]
mod restore;

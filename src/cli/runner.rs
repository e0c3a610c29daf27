use super::command::Command;
use super::flows::{backup_flow, decrypt_flow, purge_flow, resolve_connection, restore_flow};
use super::prompt::Prompter;
use crate::config::AppConfig;
use crate::connection::ConnectionDescriptor;
use crate::errors::BackupError;
use crate::pipeline::{RunTracker, Stage};
use crate::store::MongoStore;

async fn connect<P: Prompter + ?Sized>(
    prompter: &mut P,
    config: &AppConfig,
    uri: Option<&str>,
    tracker: &mut RunTracker,
) -> Result<MongoStore, BackupError> {
    let descriptor = match uri {
        Some(raw) => ConnectionDescriptor::from_uri(raw)?,
        None => {
            prompter.say("Let's connect to your MongoDB server first.");
            prompter.say("Please authenticate as a user with admin privileges.");
            resolve_connection(prompter, config)?
        }
    };
    tracker.enter(Stage::Connecting)?;
    let store = MongoStore::connect(&descriptor).await?;
    tracker.enter(Stage::Connected)?;
    prompter.say(&format!("Connected to {}", descriptor.redacted()));
    Ok(store)
}

/// Run one subcommand to completion.
///
/// # Errors
/// Any fatal error of the run; soft cancellations return `Ok`.
pub async fn run<P: Prompter + ?Sized>(command: Command, prompter: &mut P, config: &AppConfig) -> Result<(), BackupError> {
    let name = command.name();
    let mut tracker = RunTracker::new(name);
    let result = match command {
        Command::Decrypt { input, output } => decrypt_flow(prompter, config, &mut tracker, input, output),
        Command::Backup { uri } => match connect(prompter, config, uri.as_deref(), &mut tracker).await {
            Ok(store) => {
                let result = backup_flow(&store, prompter, config, &mut tracker).await;
                store.close().await;
                result
            }
            Err(e) => Err(e),
        },
        Command::Restore { uri } => match connect(prompter, config, uri.as_deref(), &mut tracker).await {
            Ok(store) => {
                let result = restore_flow(&store, prompter, &mut tracker).await;
                store.close().await;
                result
            }
            Err(e) => Err(e),
        },
        Command::Purge { uri } => match connect(prompter, config, uri.as_deref(), &mut tracker).await {
            Ok(store) => {
                let result = purge_flow(&store, prompter, &mut tracker).await;
                store.close().await;
                result
            }
            Err(e) => Err(e),
        },
    };
    let result = tracker.settle(result);
    log::info!("{name}: finished as {}", tracker.current());
    result
}

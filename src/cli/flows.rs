//! The interactive sequences behind each subcommand.
//!
//! Flows only gather answers and report results; the work happens in
//! [`crate::pipeline`].

use chrono::Utc;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

use super::prompt::Prompter;
use crate::catalog::{self, Flow};
use crate::config::AppConfig;
use crate::connection::{
    ConnectionDescriptor, Credentials, DEFAULT_AUTH_DATABASE, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SCHEME, parse_port,
};
use crate::errors::BackupError;
use crate::model::{BackupStats, Selection};
use crate::paths::{self, BackupKind};
use crate::pipeline::{self, BackupPlan, DecryptPlan, Outcome, RunTracker, Stage};
use crate::store::DocumentStore;

fn overwrite_question(path: &Path) -> String {
    format!("{} already exists. Do you want to overwrite it?", path.display())
}

/// Ask how to reach the server and build the descriptor.
///
/// # Errors
/// Prompt failures, or `InvalidConnection` for an unusable URI or host.
pub fn resolve_connection<P: Prompter + ?Sized>(
    prompter: &mut P,
    config: &AppConfig,
) -> Result<ConnectionDescriptor, BackupError> {
    let method = prompter.select(
        "Which entry method would you like to use?",
        &["Enter host, port and credentials", "Paste a connection string"],
        0,
    )?;
    if method == 1 {
        let uri = prompter.input("What is the URI of the database?", None)?;
        return ConnectionDescriptor::from_uri(&uri);
    }

    let host = prompter.input(
        "What is the IP of the MongoDB server?",
        Some(config.host.as_deref().unwrap_or(DEFAULT_HOST)),
    )?;
    let default_port = config.port.unwrap_or(DEFAULT_PORT).to_string();
    let port = loop {
        let answer = prompter.input("What is the port of the MongoDB server?", Some(default_port.as_str()))?;
        match parse_port(&answer) {
            Ok(p) => break p,
            Err(e) => prompter.say(&e.to_string()),
        }
    };
    let credentials = if prompter.confirm("Does the MongoDB server require authentication?", true)? {
        let username = prompter.input(
            "What is the username of the MongoDB server?",
            Some(config.username.as_deref().unwrap_or("admin")),
        )?;
        let password = prompter.password("What is the password of the MongoDB server?")?;
        let auth_database = prompter.input(
            "What is the authentication database of the MongoDB server?",
            Some(config.auth_database.as_deref().unwrap_or(DEFAULT_AUTH_DATABASE)),
        )?;
        Some(Credentials { username, password: password.to_string(), auth_database })
    } else {
        None
    };
    let scheme = config.scheme.as_deref().unwrap_or(DEFAULT_SCHEME);
    ConnectionDescriptor::from_fields_with_scheme(scheme, &host, port, credentials)
}

/// Offer to type a path or pick a matching file from the current directory.
fn choose_file<P: Prompter + ?Sized>(
    prompter: &mut P,
    message: &str,
    default: &str,
    kinds: &[BackupKind],
) -> Result<PathBuf, BackupError> {
    if prompter.select("Select an action", &["Type a file path", "Search the current directory"], 0)? == 1 {
        let found = paths::list_backups(Path::new("."), kinds)?;
        if found.is_empty() {
            prompter.say("No matching files in the current directory.");
        } else {
            let names: Vec<String> = found.iter().map(|p| p.display().to_string()).collect();
            let options: Vec<&str> = names.iter().map(String::as_str).collect();
            let i = prompter.select(message, &options, 0)?;
            return Ok(found[i].clone());
        }
    }
    Ok(PathBuf::from(prompter.input(message, Some(default))?))
}

fn new_password<P: Prompter + ?Sized>(prompter: &mut P) -> Result<Zeroizing<String>, BackupError> {
    loop {
        let first = prompter.password("What is the password you want to encrypt the backup file with?")?;
        if first.is_empty() {
            prompter.say("The password must not be empty.");
            continue;
        }
        let second = prompter.password("Repeat the password")?;
        if *first == *second {
            return Ok(first);
        }
        prompter.say("The passwords do not match.");
    }
}

/// Ask for collections of each database and keep the non-empty answers.
async fn select_collections<S, P>(
    store: &S,
    prompter: &mut P,
    databases: &[String],
    question: impl Fn(&str) -> String,
) -> Result<Selection, BackupError>
where
    S: DocumentStore + ?Sized,
    P: Prompter + ?Sized,
{
    let listing = catalog::list_collections(store, databases).await?;
    let mut selection = Selection::new();
    for (db, names) in listing {
        if names.is_empty() {
            prompter.say(&format!("'{db}' has no collections."));
            continue;
        }
        let choices = catalog::collection_choices(&names);
        let picked = prompter.multi_select(&question(&db), &choices)?;
        if !picked.is_empty() {
            selection.insert(db, picked.into_iter().map(|i| choices[i].name.clone()).collect());
        }
    }
    Ok(selection)
}

async fn select_databases<S, P>(store: &S, prompter: &mut P, flow: Flow, question: &str) -> Result<Vec<String>, BackupError>
where
    S: DocumentStore + ?Sized,
    P: Prompter + ?Sized,
{
    let entries = catalog::list_databases(store).await?;
    let choices = catalog::database_choices(entries.iter().map(|e| e.name.as_str()), flow);
    if choices.is_empty() {
        return Ok(Vec::new());
    }
    let picked = prompter.multi_select(question, &choices)?;
    Ok(picked.into_iter().map(|i| choices[i].name.clone()).collect())
}

fn summary_line(stats: &BackupStats) -> String {
    format!("{} documents from {} collections in {} databases", stats.documents, stats.collections, stats.databases)
}

/// # Errors
/// Enumeration, fetch, encryption and write failures.
pub async fn backup_flow<S, P>(
    store: &S,
    prompter: &mut P,
    config: &AppConfig,
    tracker: &mut RunTracker,
) -> Result<(), BackupError>
where
    S: DocumentStore + ?Sized,
    P: Prompter + ?Sized,
{
    tracker.enter(Stage::Selecting)?;
    let databases = select_databases(store, prompter, Flow::Backup, "Which databases do you want to back up?").await?;
    let selection = select_collections(store, prompter, &databases, |db| {
        format!("Which collections do you want to back up from the '{db}' database?")
    })
    .await?;
    if selection.is_empty() {
        prompter.say("Nothing selected; no backup written.");
        tracker.cancel();
        return Ok(());
    }

    let default_name = paths::default_backup_name(Utc::now()).display().to_string();
    let output = loop {
        let answer = prompter.input("Where do you want to save the backup file?", Some(default_name.as_str()))?;
        let path = PathBuf::from(answer);
        match paths::ensure_backup_target(&path) {
            Ok(()) => break path,
            Err(e) => prompter.say(&e.to_string()),
        }
    };
    let pretty = prompter.confirm(
        "Do you want to format the backup file? (This may increase the file size)",
        config.pretty.unwrap_or(false),
    )?;
    let password = if prompter.confirm("Do you want to encrypt the backup file?", false)? {
        Some(new_password(prompter)?)
    } else {
        None
    };
    let encrypted = password.is_some();
    let plan = BackupPlan { selection, output, pretty, password, kdf: config.kdf_params() };

    let result = pipeline::run_backup(store, &plan, tracker, |p| prompter.confirm(&overwrite_question(p), false)).await?;
    match result.outcome {
        Outcome::Written(path) => {
            prompter.say(&format!("Backup file written to {}", path.display()));
            prompter.say(&format!("Backed up {}.", summary_line(&result.stats)));
            if result.stats.documents == 0 {
                prompter.say("[!] The selected collections contain no documents.");
            }
            if encrypted {
                prompter.say("[!] To decrypt, use `mongoba decrypt`.");
            }
        }
        Outcome::Cancelled => prompter.say("Backup file not written."),
    }
    Ok(())
}

/// # Errors
/// Unusable backup files, plus stage errors; insert failures are only reported.
pub async fn restore_flow<S, P>(store: &S, prompter: &mut P, tracker: &mut RunTracker) -> Result<(), BackupError>
where
    S: DocumentStore + ?Sized,
    P: Prompter + ?Sized,
{
    let path = choose_file(prompter, "Enter the path to the backup file", "./backup.json", &[BackupKind::Plain])?;
    tracker.enter(Stage::Reading)?;
    let data = pipeline::load_backup(&path)?;
    if data.is_empty() {
        prompter.say("The backup file contains no databases.");
        tracker.cancel();
        return Ok(());
    }

    tracker.enter(Stage::Selecting)?;
    let choices = catalog::database_choices(data.iter().map(|s| s.db.as_str()), Flow::Restore);
    let picked = prompter.multi_select("Select the databases to restore", &choices)?;
    let databases: Vec<String> = picked.into_iter().map(|i| choices[i].name.clone()).collect();
    if databases.is_empty() || !prompter.confirm("Are you sure you want to restore the selected databases?", true)? {
        prompter.say("Restore cancelled.");
        tracker.cancel();
        return Ok(());
    }

    let report = pipeline::run_restore(store, &data, &databases, tracker).await?;
    prompter.say(&format!(
        "Restored {} documents into {} collections.",
        report.inserted(),
        report.collections.len()
    ));
    for failed in report.failed() {
        let reason = failed.error.as_ref().map(ToString::to_string).unwrap_or_default();
        let bound = if failed.exact { "" } else { "at least " };
        prompter.say(&format!(
            "[!] {}.{}: inserted {bound}{} of {} documents, stopped at: {reason}",
            failed.db, failed.collection, failed.inserted, failed.attempted
        ));
    }
    Ok(())
}

/// # Errors
/// `ReservedDatabase`, enumeration failures and the first failed drop.
pub async fn purge_flow<S, P>(store: &S, prompter: &mut P, tracker: &mut RunTracker) -> Result<(), BackupError>
where
    S: DocumentStore + ?Sized,
    P: Prompter + ?Sized,
{
    tracker.enter(Stage::Selecting)?;
    prompter.say("This tool drops whole collections, including their indexes.");
    if !prompter.confirm("Purging cannot be undone. Are you sure you want to continue?", false)? {
        prompter.say("Purge cancelled.");
        tracker.cancel();
        return Ok(());
    }
    let databases =
        select_databases(store, prompter, Flow::Purge, "Select the databases you want to purge anything from").await?;
    let selection =
        select_collections(store, prompter, &databases, |db| format!("Select the collections you want to purge from {db}"))
            .await?;
    if selection.is_empty() {
        prompter.say("Nothing selected; nothing purged.");
        tracker.cancel();
        return Ok(());
    }

    prompter.say("The following entries will be purged:");
    for (db, collections) in &selection {
        prompter.say(&format!("- {db}"));
        for c in collections {
            prompter.say(&format!("   - {c}"));
        }
    }
    if !prompter.confirm("Are you sure you want to continue?", false)? {
        prompter.say("Purge cancelled.");
        tracker.cancel();
        return Ok(());
    }

    let report = pipeline::run_purge(store, &selection, tracker).await?;
    prompter.say(&format!("Purged {} collections.", report.dropped.len()));
    Ok(())
}

/// # Errors
/// `Decryption` for a wrong password, format and I/O failures.
pub fn decrypt_flow<P: Prompter + ?Sized>(
    prompter: &mut P,
    config: &AppConfig,
    tracker: &mut RunTracker,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<(), BackupError> {
    tracker.enter(Stage::Selecting)?;
    let input = match input {
        Some(p) => p,
        None => choose_file(
            prompter,
            "What is the path to the file you want to decrypt?",
            "./backup.json.enc",
            &[BackupKind::Encrypted],
        )?,
    };
    let password = prompter.password("What is the key you have encrypted the file with?")?;
    let output = match output {
        Some(p) => p,
        None => {
            let default = paths::decrypted_path(&input).display().to_string();
            PathBuf::from(prompter.input("Where do you want to save the decrypted file?", Some(default.as_str()))?)
        }
    };
    let pretty = prompter.confirm(
        "Do you want to format the decrypted file? (This may increase the file size)",
        config.pretty.unwrap_or(false),
    )?;

    let plan = DecryptPlan { input, output, password, pretty };
    match pipeline::run_decrypt(&plan, tracker, |p| prompter.confirm(&overwrite_question(p), false))? {
        Outcome::Written(path) => prompter.say(&format!("Decrypted file written to {}", path.display())),
        Outcome::Cancelled => prompter.say("Decrypted file not written."),
    }
    Ok(())
}

use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

use super::{Outcome, RunTracker, Stage, persist};
use crate::crypto;
use crate::errors::BackupError;
use crate::serializer;

#[derive(Clone)]
pub struct DecryptPlan {
    pub input: PathBuf,
    pub output: PathBuf,
    pub password: Zeroizing<String>,
    pub pretty: bool,
}

/// read → decrypt → validate JSON → persist.
///
/// Nothing is written unless decryption and JSON validation both succeed.
///
/// # Errors
/// `Decryption` for a wrong password or tampered file, `Format` for a malformed
/// envelope or non-JSON payload, `Io` for file failures.
pub fn run_decrypt<F>(plan: &DecryptPlan, tracker: &mut RunTracker, confirm_overwrite: F) -> Result<Outcome, BackupError>
where
    F: FnOnce(&Path) -> Result<bool, BackupError>,
{
    let result = decrypt_inner(plan, tracker, confirm_overwrite);
    tracker.settle(result)
}

fn decrypt_inner<F>(plan: &DecryptPlan, tracker: &mut RunTracker, confirm_overwrite: F) -> Result<Outcome, BackupError>
where
    F: FnOnce(&Path) -> Result<bool, BackupError>,
{
    tracker.enter(Stage::Reading)?;
    let envelope = std::fs::read_to_string(&plan.input)?;

    tracker.enter(Stage::Decrypting)?;
    let plaintext = Zeroizing::new(crypto::decrypt(envelope.trim(), &plan.password)?);
    let text = serializer::reformat(&plaintext, plan.pretty)?;

    tracker.enter(Stage::Persisting)?;
    let outcome = persist(&plan.output, &text, false, confirm_overwrite)?;
    match &outcome {
        Outcome::Written(path) => {
            log::info!(target: "mongoba::audit", "decrypt {} -> {}", plan.input.display(), path.display());
        }
        Outcome::Cancelled => tracker.cancel(),
    }
    Ok(outcome)
}

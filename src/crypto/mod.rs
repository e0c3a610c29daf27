//! Password-based encryption of backup payloads.
//!
//! Argon2id derives an AES-256-GCM key from the operator's password; the
//! resulting envelope is hex text so an encrypted backup is still a text file.

// Shared format version for the envelope header
pub(crate) const VERSION: u8 = 1;

pub mod pbe;

pub use pbe::{PbeKdfParams, decrypt, encrypt, encrypt_with, is_encrypted};

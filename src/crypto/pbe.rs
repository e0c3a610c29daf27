use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit, Payload},
};
use zeroize::Zeroizing;

use crate::errors::{BackupError, FormatError};

const PBE_MAGIC: &[u8; 4] = b"MGPB"; // Mongoba Password-Based encryption
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
// MAGIC | VERSION | salt(16) | t_cost(u32) | m_cost_kib(u32) | lanes(u32) | nonce(12)
const HEADER_LEN: usize = 4 + 1 + SALT_LEN + 12 + NONCE_LEN;
// Accepted Argon2 cost range, checked on encrypt and on every header read.
pub const MAX_T_COST: u32 = 64;
pub const MAX_M_COST_KIB: u32 = 1024 * 1024;
pub const MAX_LANES: u32 = 16;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PbeKdfParams {
    pub t_cost: u32,     // iterations
    pub m_cost_kib: u32, // memory in KiB
    pub lanes: u32,
}

impl Default for PbeKdfParams {
    fn default() -> Self {
        Self { t_cost: 3, m_cost_kib: 64 * 1024, lanes: 1 }
    }
}

impl PbeKdfParams {
    /// Check the parameters against the range [`decrypt`] accepts.
    ///
    /// # Errors
    /// A message naming the first parameter out of range.
    pub fn check(&self) -> Result<(), &'static str> {
        if !(1..=MAX_T_COST).contains(&self.t_cost) {
            return Err("t_cost must be between 1 and 64");
        }
        if !(1..=MAX_LANES).contains(&self.lanes) {
            return Err("lanes must be between 1 and 16");
        }
        // argon2 needs at least 8 KiB per lane
        if self.m_cost_kib < 8 * self.lanes || self.m_cost_kib > MAX_M_COST_KIB {
            return Err("m_cost_kib must be between 8 KiB per lane and 1 GiB");
        }
        Ok(())
    }
}

fn derive_key(
    password: &str,
    salt: &[u8],
    params: &PbeKdfParams,
) -> Result<Zeroizing<[u8; 32]>, BackupError> {
    use argon2::{Algorithm, Argon2, Params, Version};
    let p = Params::new(params.m_cost_kib, params.t_cost, params.lanes, Some(32))
        .map_err(|e| BackupError::Encryption(format!("argon2 params: {e}")))?;
    let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, p);
    let mut out: Zeroizing<[u8; 32]> = Zeroizing::new([0u8; 32]);
    argon
        .hash_password_into(password.as_bytes(), salt, &mut *out)
        .map_err(|e| BackupError::Encryption(format!("argon2: {e}")))?;
    Ok(out)
}

fn random_bytes<const N: usize>() -> Result<[u8; N], BackupError> {
    let mut buf = [0u8; N];
    getrandom::fill(&mut buf).map_err(|e| BackupError::Encryption(format!("rng: {e}")))?;
    Ok(buf)
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&bytes[at..at + 4]);
    u32::from_be_bytes(b)
}

/// Encrypt text with the default KDF cost.
///
/// # Errors
/// Returns `Encryption` if key derivation or the cipher fails.
pub fn encrypt(plaintext: &str, password: &str) -> Result<String, BackupError> {
    encrypt_with(plaintext, password, &PbeKdfParams::default())
}

/// Encrypt text with explicit Argon2id parameters. The output is hex text; the
/// parameters, salt and nonce travel in the authenticated header.
///
/// # Errors
/// Returns `Encryption` for parameters outside [`PbeKdfParams::check`], or if
/// key derivation or the cipher fails.
pub fn encrypt_with(
    plaintext: &str,
    password: &str,
    params: &PbeKdfParams,
) -> Result<String, BackupError> {
    params.check().map_err(|m| BackupError::Encryption(format!("argon2 params: {m}")))?;
    let salt = random_bytes::<SALT_LEN>()?;
    let nonce_bytes = random_bytes::<NONCE_LEN>()?;
    let key = derive_key(password, &salt, params)?;
    let cipher = Aes256Gcm::new_from_slice(&*key)
        .map_err(|e| BackupError::Encryption(format!("aes key: {e}")))?;

    let mut out = Vec::with_capacity(HEADER_LEN + plaintext.len() + 16);
    out.extend_from_slice(PBE_MAGIC);
    out.push(super::VERSION);
    out.extend_from_slice(&salt);
    out.extend_from_slice(&params.t_cost.to_be_bytes());
    out.extend_from_slice(&params.m_cost_kib.to_be_bytes());
    out.extend_from_slice(&params.lanes.to_be_bytes());
    out.extend_from_slice(&nonce_bytes);

    let ct = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), Payload { msg: plaintext.as_bytes(), aad: &out })
        .map_err(|e| BackupError::Encryption(format!("encrypt: {e}")))?;
    out.extend_from_slice(&ct);
    Ok(hex::encode(out))
}

/// Decrypt text produced by [`encrypt`]. A wrong password fails with
/// `Decryption`; it never yields altered plaintext.
///
/// # Errors
/// Returns `Format` for malformed input and `Decryption` on authentication failure.
pub fn decrypt(ciphertext: &str, password: &str) -> Result<String, BackupError> {
    let bytes = hex::decode(ciphertext.trim()).map_err(|_| FormatError::InvalidHex)?;
    if bytes.len() < HEADER_LEN {
        return Err(FormatError::BadHeader("too short").into());
    }
    let (header, ct) = bytes.split_at(HEADER_LEN);
    if &header[..4] != PBE_MAGIC {
        return Err(FormatError::BadHeader("bad magic").into());
    }
    if header[4] != super::VERSION {
        return Err(FormatError::BadHeader("unsupported version").into());
    }
    let salt = &header[5..5 + SALT_LEN];
    let params = PbeKdfParams {
        t_cost: read_u32(header, 21),
        m_cost_kib: read_u32(header, 25),
        lanes: read_u32(header, 29),
    };
    params.check().map_err(FormatError::BadHeader)?;
    let nonce_bytes = &header[33..33 + NONCE_LEN];

    let key = derive_key(password, salt, &params)
        .map_err(|_| FormatError::BadHeader("invalid key derivation parameters"))?;
    let cipher = Aes256Gcm::new_from_slice(&*key)
        .map_err(|e| BackupError::Encryption(format!("aes key: {e}")))?;
    let pt = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), Payload { msg: ct, aad: header })
        .map_err(|_| BackupError::Decryption)?;
    String::from_utf8(pt).map_err(|_| BackupError::Decryption)
}

/// Quick probe for the envelope magic at the start of hex text.
#[must_use]
pub fn is_encrypted(text: &str) -> bool {
    let probe = text.trim_start();
    probe.len() >= 8 && probe.as_bytes()[..8].eq_ignore_ascii_case(hex::encode(PBE_MAGIC).as_bytes())
}

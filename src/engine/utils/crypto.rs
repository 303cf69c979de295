// src/engine/utils/crypto.rs
// Content envelope (seal/open) and one-way credential hashing.

use crate::error::ShareError;
use crate::utils::rng;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

/// PBKDF2 rounds for both envelope key derivation and credential hashing.
pub const KDF_ITERATIONS: u32 = 100_000;
pub const SALT_LEN: usize = 16;
pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;
const KEY_LEN: usize = 32;
const FIELD_SEPARATOR: char = '$';

/// Derives a fresh AES-256 key from the master secret and a per-call salt.
/// Keys are never reused across seal operations.
fn derive_key(master_secret: &str, salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(master_secret.as_bytes(), salt, KDF_ITERATIONS, &mut key);
    key
}

/// Seals inline text into a self-describing envelope:
/// `salt $ nonce $ tag $ ciphertext`, each field hex-encoded.
///
/// Every call draws a fresh salt and nonce, so sealing the same plaintext
/// twice never produces identical output.
pub fn seal(master_secret: &str, plaintext: &str) -> Result<String, ShareError> {
    let salt = rng::random_bytes::<SALT_LEN>();
    let nonce_bytes = rng::random_bytes::<NONCE_LEN>();
    let key = derive_key(master_secret, &salt);

    let cipher = Aes256Gcm::new(&key.into());
    let mut sealed = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
        .map_err(|_| ShareError::Internal("AES-GCM encryption failed".to_string()))?;

    // aes-gcm appends the 16-byte tag to the ciphertext; keep it as its own field
    let tag = sealed.split_off(sealed.len() - TAG_LEN);
    Ok(format!(
        "{}{sep}{}{sep}{}{sep}{}",
        hex::encode(salt),
        hex::encode(nonce_bytes),
        hex::encode(tag),
        hex::encode(sealed),
        sep = FIELD_SEPARATOR,
    ))
}

/// Opens a sealed envelope. Malformed envelopes are rejected before any
/// cryptographic work; authentication failure (tampering or a wrong master
/// secret) surfaces as `EnvelopeCorrupted`, never as partial plaintext.
pub fn open(master_secret: &str, envelope: &str) -> Result<String, ShareError> {
    let (salt, nonce, tag, ciphertext) = parse_envelope(envelope)?;
    let key = derive_key(master_secret, &salt);
    let cipher = Aes256Gcm::new(&key.into());

    let mut sealed = ciphertext;
    sealed.extend_from_slice(&tag);
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce), sealed.as_slice())
        .map_err(|_| {
            ShareError::EnvelopeCorrupted(
                "authentication failed (tampered envelope or wrong master secret)".to_string(),
            )
        })?;

    String::from_utf8(plaintext)
        .map_err(|_| ShareError::EnvelopeCorrupted("payload is not valid UTF-8".to_string()))
}

/// Shape heuristic for the mixed-mode migration window: does this text look
/// like a sealed envelope? Not a security boundary; `open` still performs
/// full validation and authentication.
pub fn looks_sealed(text: &str) -> bool {
    let parts: Vec<&str> = text.split(FIELD_SEPARATOR).collect();
    parts.len() == 4
        && parts[0].len() == SALT_LEN * 2
        && parts[1].len() == NONCE_LEN * 2
        && parts[2].len() == TAG_LEN * 2
        && parts[3].len() % 2 == 0
        && parts
            .iter()
            .all(|p| p.chars().all(|c| c.is_ascii_hexdigit()))
}

fn parse_envelope(
    envelope: &str,
) -> Result<(Vec<u8>, Vec<u8>, Vec<u8>, Vec<u8>), ShareError> {
    let parts: Vec<&str> = envelope.split(FIELD_SEPARATOR).collect();
    if parts.len() != 4 {
        return Err(ShareError::EnvelopeCorrupted(format!(
            "expected 4 envelope fields, found {}",
            parts.len()
        )));
    }
    if parts[0].len() != SALT_LEN * 2
        || parts[1].len() != NONCE_LEN * 2
        || parts[2].len() != TAG_LEN * 2
    {
        return Err(ShareError::EnvelopeCorrupted(
            "envelope field lengths are invalid".to_string(),
        ));
    }
    let decode = |field: &str| {
        hex::decode(field)
            .map_err(|_| ShareError::EnvelopeCorrupted("envelope field is not hex".to_string()))
    };
    Ok((
        decode(parts[0])?,
        decode(parts[1])?,
        decode(parts[2])?,
        decode(parts[3])?,
    ))
}

/// One-way, salted, cost-adaptive hash for passwords and quiz answers.
/// Stored as `salt $ digest`, both hex.
pub fn hash_credential(secret: &str) -> String {
    let salt = rng::random_bytes::<SALT_LEN>();
    let mut digest = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(secret.as_bytes(), &salt, KDF_ITERATIONS, &mut digest);
    format!(
        "{}{}{}",
        hex::encode(salt),
        FIELD_SEPARATOR,
        hex::encode(digest)
    )
}

/// Verifies a supplied secret against a stored credential hash. Malformed
/// stored values simply fail verification.
pub fn verify_credential(secret: &str, stored: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once(FIELD_SEPARATOR) else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(digest_hex) else {
        return false;
    };
    if expected.len() != KEY_LEN {
        return false;
    }
    let mut digest = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(secret.as_bytes(), &salt, KDF_ITERATIONS, &mut digest);
    digest[..] == expected[..]
}

/// Quiz answers are compared case-insensitively with surrounding whitespace
/// ignored; normalize before hashing and before verification.
pub fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

// src/engine/utils/rng.rs
use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// Generates a public identifier candidate from the 62-symbol alphanumeric
/// alphabet. Uniqueness is the store's responsibility, not this function's;
/// two concurrent calls may legitimately produce the same candidate.
pub fn short_code(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Fresh random bytes for salts, nonces and tokens.
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    thread_rng().fill(&mut bytes[..]);
    bytes
}

/// Mints the owner capability token returned once to the creator.
pub fn generate_owner_token() -> String {
    hex::encode(random_bytes::<16>())
}

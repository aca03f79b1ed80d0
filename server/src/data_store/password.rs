//! Salted password hashing for user accounts, based on PBKDF2-HMAC-SHA256
//!
//! Hashes are stored as a single string of the form
//! `pbkdf2-sha256$<iterations>$<salt>$<derived key>`, with salt and key encoded in base64.

use crate::data_store::StoreError;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use ring::rand::SecureRandom;
use ring::{pbkdf2, rand};
use std::num::NonZeroU32;

static ALGORITHM: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;
const ALGORITHM_NAME: &str = "pbkdf2-sha256";
const ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Valid hash of an arbitrary password with the regular number of iterations. Checking a password
/// against it takes as long as checking it against a real user's hash.
const DUMMY_PASSWORD_HASH: &str =
    "pbkdf2-sha256$100000$cm9vbXJlcy1uby11c2VyIQ$DoSV4nSaLqc2oIw/5OFXAejujdycgEvIE6NWE5KZ/wI";

/// Create a new salted hash of the given password.
pub fn hash_password(password: &str) -> Result<String, StoreError> {
    let mut salt = [0u8; SALT_LEN];
    rand::SystemRandom::new().fill(&mut salt).map_err(|_| {
        StoreError::InvalidInputData("Could not generate random salt for password".to_owned())
    })?;
    let iterations = NonZeroU32::new(ITERATIONS).unwrap_or(NonZeroU32::MIN);
    let mut key = [0u8; KEY_LEN];
    pbkdf2::derive(ALGORITHM, iterations, &salt, password.as_bytes(), &mut key);
    Ok(format!(
        "{}${}${}${}",
        ALGORITHM_NAME,
        iterations,
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(key)
    ))
}

/// Check if the given password matches the stored hash, created by [hash_password].
///
/// Malformed hashes never match.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let mut parts = password_hash.split('$');
    let (Some(ALGORITHM_NAME), Some(iterations), Some(salt), Some(key), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    let Some(iterations) = iterations.parse::<u32>().ok().and_then(NonZeroU32::new) else {
        return false;
    };
    let (Ok(salt), Ok(key)) = (STANDARD_NO_PAD.decode(salt), STANDARD_NO_PAD.decode(key)) else {
        return false;
    };
    pbkdf2::verify(ALGORITHM, iterations, &salt, password.as_bytes(), &key).is_ok()
}

/// Do the work of [verify_password] for a login attempt with an unknown email address, so that
/// the response time does not reveal whether the email address is registered.
pub fn verify_password_of_unknown_user(password: &str) {
    verify_password(password, DUMMY_PASSWORD_HASH);
}

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use password_hash::{PasswordHash, SaltString};

use crate::{
    error::{ApiError, StoreError},
    models::User,
    repository::RepositoryState,
};

/// CredentialFailure
///
/// Why a presented username/password pair did not verify. `NotFound` and
/// `InvalidCredential` are distinct so the boundary can surface distinct statuses.
#[derive(Debug)]
pub enum CredentialFailure {
    /// No identity exists under the presented username.
    NotFound,
    /// The identity exists but the presented secret did not match.
    InvalidCredential,
    /// The identity store itself failed.
    Store(StoreError),
}

impl From<CredentialFailure> for ApiError {
    fn from(failure: CredentialFailure) -> Self {
        match failure {
            CredentialFailure::NotFound => ApiError::NotFound,
            CredentialFailure::InvalidCredential => ApiError::InvalidCredential,
            CredentialFailure::Store(e) => e.into(),
        }
    }
}

/// hash_password
///
/// Produces a salted Argon2 PHC string for storage. Plaintext never reaches the
/// repository; this is called once at registration.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|_| ApiError::Store)?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|_| ApiError::Store)?;

    let argon2 = Argon2::default();
    let phc = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| ApiError::Store)?
        .to_string();
    Ok(phc)
}

/// verify_password
///
/// Compares a presented secret against a stored PHC string. Argon2 verification
/// recomputes the hash over the stored salt and compares in constant time; raw
/// string equality is never used here.
pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// verify
///
/// The credential verifier: looks up the identity by exact username and checks the
/// presented secret against the stored salted hash. Read-only; no lockouts, no
/// counters.
pub async fn verify(
    repo: &RepositoryState,
    username: &str,
    password: &str,
) -> Result<User, CredentialFailure> {
    let user = repo
        .find_user_by_username(username)
        .await
        .map_err(CredentialFailure::Store)?
        .ok_or(CredentialFailure::NotFound)?;

    if !verify_password(&user.password_hash, password) {
        return Err(CredentialFailure::InvalidCredential);
    }

    Ok(user)
}

/// parse_basic
///
/// Extracts the username/password pair from an HTTP Basic `Authorization` header
/// value. Returns None for anything that is not well-formed Basic material.
pub fn parse_basic(header_value: &str) -> Option<(String, String)> {
    let encoded = header_value.strip_prefix("Basic ")?;
    let decoded = BASE64.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

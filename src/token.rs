use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Claims
///
/// The payload structure carried inside every bearer token. Signed with the
/// server's symmetric secret and validated on every authenticated request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the UUID of the user the token asserts.
    pub sub: Uuid,
    /// Expiration Time (exp): timestamp after which the token must not be accepted.
    pub exp: usize,
    /// Issued At (iat): timestamp when the token was created.
    pub iat: usize,
}

/// TokenError
///
/// The three ways a presented token can fail. Signature integrity is checked
/// before expiry, so a tampered-but-expired token reports `BadSignature`, never
/// `Expired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// The token could not be parsed as a JWT at all.
    Malformed,
    /// The signature did not verify against the server secret.
    BadSignature,
    /// Signature valid, but `exp` is in the past.
    Expired,
}

fn unix_now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or(0)
}

/// issue
///
/// Creates a signed, time-limited assertion of identity. Tokens are stateless:
/// there is no server-side record and no revocation list, so the compromise
/// window equals the TTL.
pub fn issue(secret: &str, subject: Uuid, ttl_secs: u64) -> Result<String, TokenError> {
    let now = unix_now();
    let claims = Claims {
        sub: subject,
        iat: now,
        exp: now + ttl_secs as usize,
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).map_err(|_| TokenError::Malformed)
}

/// validate
///
/// Verifies a presented token and recovers the identity reference it encodes.
/// Validation order matters: the signature is verified before the expiry check.
/// Expiry is strict (`exp > now`): the token dies the moment the clock reaches
/// the second it names, so a zero-TTL token is never accepted.
pub fn validate(secret: &str, token: &str) -> Result<Uuid, TokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.leeway = 0;

    match decode::<Claims>(token, &key, &validation) {
        Ok(data) => {
            // The library keeps a token live through the whole second `exp`
            // names; the contract here is strict inequality.
            if data.claims.exp <= unix_now() {
                return Err(TokenError::Expired);
            }
            Ok(data.claims.sub)
        }
        Err(e) => match e.kind() {
            ErrorKind::ExpiredSignature => Err(TokenError::Expired),
            ErrorKind::InvalidSignature => Err(TokenError::BadSignature),
            // Structural failures: not three segments, bad base64, bad JSON, etc.
            _ => Err(TokenError::Malformed),
        },
    }
}

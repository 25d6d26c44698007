use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::policy::DenyReason;
use crate::token::TokenError;

/// StoreError
///
/// A persistence failure. Carries the underlying driver message for logging; the
/// boundary only ever reveals a generic 500. This is the one failure class a
/// caller may reasonably retry.
#[derive(Debug)]
pub struct StoreError(pub String);

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "store error: {}", self.0)
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self(err.to_string())
    }
}

/// ApiError
///
/// The full failure taxonomy of the service. Every component returns these as
/// typed values; this module is the single point translating them into HTTP
/// responses, so no failure is silently swallowed and none terminates the process.
#[derive(Debug, PartialEq, Eq)]
pub enum ApiError {
    /// No usable credential accompanied a request that needs one.
    Unauthenticated,
    /// A credential was presented but did not verify.
    InvalidCredential,
    /// The bearer token's signature verified but its lifetime has lapsed.
    Expired,
    /// The bearer token's signature did not verify against the server secret.
    BadSignature,
    /// The bearer token could not be parsed at all.
    Malformed,
    /// The identity is authenticated but lacks the admin privilege.
    Forbidden,
    /// The identity is authenticated but does not own the resource.
    NotOwner,
    /// The referenced entity does not exist (or is not visible).
    NotFound,
    /// A uniqueness constraint was violated (e.g., duplicate username).
    Conflict,
    /// The request payload failed validation (bad rating, non-image upload).
    BadRequest,
    /// The data store failed; the only retryable class.
    Store,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated
            | Self::InvalidCredential
            | Self::Expired
            | Self::BadSignature
            | Self::Malformed => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::NotOwner => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Store => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "You are not authenticated!",
            Self::InvalidCredential => "Username or password is incorrect!",
            Self::Expired => "Your token has expired!",
            Self::BadSignature => "Token signature could not be verified!",
            Self::Malformed => "Token is malformed!",
            Self::Forbidden => "You are not authorized to perform this operation!",
            Self::NotOwner => "You are not the owner of this resource!",
            Self::NotFound => "Resource not found",
            Self::Conflict => "Resource already exists!",
            Self::BadRequest => "Invalid request payload!",
            Self::Store => "Internal data store error",
        }
    }
}

impl From<DenyReason> for ApiError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::Unauthenticated => Self::Unauthenticated,
            DenyReason::Forbidden => Self::Forbidden,
            DenyReason::NotOwner => Self::NotOwner,
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => Self::Expired,
            TokenError::BadSignature => Self::BadSignature,
            TokenError::Malformed => Self::Malformed,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        // The driver detail is logged here, once, and never leaks to the client.
        tracing::error!("repository failure: {}", err.0);
        Self::Store
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.message() }));
        (status, body).into_response()
    }
}

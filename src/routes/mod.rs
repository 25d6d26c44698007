//! Router Module Index
//!
//! Organizes the application's routing logic into security-segregated modules.
//! Access control is applied explicitly at the module level (via Axum layers),
//! preventing accidental exposure of protected endpoints.

/// Routes accessible to all clients (anonymous, read-only, plus the identity
/// entry points: signup, login, logout).
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware.
/// Requires a resolved identity (session, bearer token, or basic credentials).
pub mod authenticated;

/// Routes whose handlers additionally enforce the admin flag through the
/// authorization policy.
pub mod admin;

use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints that are unauthenticated and accessible to any client. Read-only
/// listing and detail endpoints land here, together with the identity entry
/// points (signup, login, logout). The authorization policy allows every one of
/// these reads unconditionally (rule 1), so no extractor runs on this router.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated probe for monitors and load balancers.
        .route("/health", get(handlers::health))
        // --- Identity entry points ---
        // POST /users/signup — register a new identity (never admin).
        .route("/users/signup", post(handlers::register))
        // POST /users/login — Basic credentials in, bearer token + session cookie out.
        .route("/users/login", post(handlers::login))
        // GET /users/logout — destroys the server-side session named by the cookie.
        .route("/users/logout", get(handlers::logout))
        // --- Campsites (read-only) ---
        .route("/campsites", get(handlers::get_campsites))
        .route("/campsites/featured", get(handlers::get_featured_campsites))
        .route("/campsites/{id}", get(handlers::get_campsite))
        .route("/campsites/{id}/comments", get(handlers::get_comments))
        .route(
            "/campsites/{id}/comments/{comment_id}",
            get(handlers::get_comment),
        )
        // --- Promotions (read-only) ---
        .route("/promotions", get(handlers::get_promotions))
        .route(
            "/promotions/featured",
            get(handlers::get_featured_promotions),
        )
        .route("/promotions/{id}", get(handlers::get_promotion))
        // --- Partners (read-only) ---
        .route("/partners", get(handlers::get_partners))
        .route("/partners/featured", get(handlers::get_featured_partners))
        .route("/partners/{id}", get(handlers::get_partner))
}

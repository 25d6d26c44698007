use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router Module
///
/// Routes for any caller who passed identity resolution. Every handler here
/// receives the resolved `AuthUser` and runs its operation through the
/// authorization policy; comment edits and deletes additionally carry the
/// stored author reference for the ownership check.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        // The caller's own profile, as resolved by the gate.
        .route("/me", get(handlers::get_me))
        // POST /campsites/{id}/comments
        // Posts a comment; the author reference is fixed to the caller at creation.
        .route("/campsites/{id}/comments", post(handlers::add_comment))
        // PUT/DELETE /campsites/{id}/comments/{comment_id}
        // Owner-only mutation of an existing comment. Admins delete through the
        // admin-override operation; ownership stays strict for everyone else.
        .route(
            "/campsites/{id}/comments/{comment_id}",
            put(handlers::update_comment).delete(handlers::delete_comment),
        )
}

use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, post, put},
};

/// Admin Router Module
///
/// Mutations over the publicly readable collections (campsites, promotions,
/// partners), the comment moderation sweep, the image upload pipeline, and the
/// user listing. The routes live on their natural resource paths; the admin
/// check itself happens inside each handler through the authorization policy,
/// after the surrounding auth layer has resolved an identity.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // --- Campsite moderation ---
        // POST /campsites — add a listing; DELETE /campsites — remove every listing.
        .route(
            "/campsites",
            post(handlers::create_campsite).delete(handlers::delete_campsites),
        )
        .route(
            "/campsites/{id}",
            put(handlers::update_campsite).delete(handlers::delete_campsite),
        )
        // DELETE /campsites/{id}/comments
        // Clears every comment on one campsite.
        .route("/campsites/{id}/comments", delete(handlers::clear_comments))
        // --- Promotions ---
        .route("/promotions", post(handlers::create_promotion))
        .route(
            "/promotions/{id}",
            put(handlers::update_promotion).delete(handlers::delete_promotion),
        )
        // --- Partners ---
        .route("/partners", post(handlers::create_partner))
        .route(
            "/partners/{id}",
            put(handlers::update_partner).delete(handlers::delete_partner),
        )
        // POST /imageUpload
        // Multipart image upload (jpg/jpeg/png/gif), stored via the storage service.
        .route("/imageUpload", post(handlers::upload_image))
        // GET /users
        // Lists every registered identity.
        .route("/users", axum::routing::get(handlers::list_users))
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Canonical identity record stored in the `users` table. The stored credential is
/// an Argon2 PHC string and is never serialized into responses.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    // Globally unique login name.
    pub username: String,
    // Salted Argon2 hash of the password. Excluded from every JSON payload.
    #[serde(skip_serializing)]
    #[ts(skip)]
    #[schema(ignore)]
    pub password_hash: String,
    // The RBAC flag: false for regular users, true for administrators.
    pub admin: bool,
    pub display_name: Option<String>,
}

/// Campsite
///
/// A campground listing from the `campsites` table. Comments are stored in their
/// own table and fetched through the nested comment endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Campsite {
    pub id: Uuid,
    // Unique display name of the campsite.
    pub name: String,
    pub description: String,
    // Path or URL of the campsite image.
    pub image: String,
    pub elevation: i32,
    // Nightly cost in the site currency.
    pub cost: f64,
    pub featured: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Comment
///
/// A review comment on a campsite. `author_id` is fixed at creation to the identity
/// that submitted it and never changes afterwards; it is the ownership fact the
/// authorization policy checks for edits and deletes.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Comment {
    pub id: Uuid,
    pub campsite_id: Uuid,
    pub author_id: Uuid,
    // Star rating, 1 through 5.
    pub rating: i32,
    pub text: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    // Loaded via a JOIN with the users table.
    #[sqlx(default)]
    pub author_username: Option<String>,
}

/// Promotion
///
/// A promotional offer from the `promotions` table. Admin-managed, publicly readable.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Promotion {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub featured: bool,
    pub cost: f64,
    pub description: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Partner
///
/// A partner organisation from the `partners` table. Admin-managed, publicly readable.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Partner {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub featured: bool,
    pub description: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// RegisterRequest
///
/// Input payload for the public registration endpoint (POST /users/signup).
/// The password is hashed immediately and only the hash is persisted.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// CreateCampsiteRequest
///
/// Input payload for submitting a new campsite (POST /campsites, admin).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCampsiteRequest {
    pub name: String,
    pub description: String,
    pub image: String,
    pub elevation: i32,
    pub cost: f64,
    #[serde(default)]
    pub featured: bool,
}

/// UpdateCampsiteRequest
///
/// Partial update payload for PUT /campsites/{id}. Uses `Option<T>` throughout so
/// only provided fields are written.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateCampsiteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

/// CreateCommentRequest
///
/// Input payload for posting a new comment. The author is never taken from the
/// body; it is fixed to the authenticated caller by the handler.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCommentRequest {
    pub rating: i32,
    pub text: String,
}

/// UpdateCommentRequest
///
/// Partial update for a comment; rating and text can be changed independently.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateCommentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// CreatePromotionRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePromotionRequest {
    pub name: String,
    pub image: String,
    pub cost: f64,
    pub description: String,
    #[serde(default)]
    pub featured: bool,
}

/// UpdatePromotionRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdatePromotionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

/// CreatePartnerRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePartnerRequest {
    pub name: String,
    pub image: String,
    pub description: String,
    #[serde(default)]
    pub featured: bool,
}

/// UpdatePartnerRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdatePartnerRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

// --- Auth & Profile Schemas (Output) ---

/// LoginResponse
///
/// Output of a successful login: a bearer token for stateless clients, alongside
/// the session cookie set on the response.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginResponse {
    pub status: String,
    pub access_token: String,
    // Seconds until the bearer token expires.
    pub expires_in: u64,
}

/// UserProfile
///
/// Output schema for the authenticated user's profile (GET /me).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub admin: bool,
    pub display_name: Option<String>,
}

/// UploadResponse
///
/// Output of a successful image upload: where the file landed and how big it was.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UploadResponse {
    pub filename: String,
    pub path: String,
    pub size: usize,
}

use crate::{
    AppState, credentials,
    error::ApiError,
    gate::{self, AuthUser},
    models::{
        Campsite, Comment, CreateCampsiteRequest, CreateCommentRequest, CreatePartnerRequest,
        CreatePromotionRequest, LoginResponse, Partner, Promotion, RegisterRequest,
        UpdateCampsiteRequest, UpdateCommentRequest, UpdatePartnerRequest,
        UpdatePromotionRequest, UploadResponse, UserProfile,
    },
    policy::{Operation, OperationKind},
    session::SESSION_COOKIE,
    token,
};
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use uuid::Uuid;

fn profile_of(user: &crate::models::User) -> UserProfile {
    UserProfile {
        id: user.id,
        username: user.username.clone(),
        admin: user.admin,
        display_name: user.display_name.clone(),
    }
}

// --- Identity handlers ---

/// register
///
/// [Public Route] Creates a new identity. The presented password is hashed with
/// Argon2 before anything is persisted; new users never start as admin.
#[utoipa::path(
    post,
    path = "/users/signup",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = UserProfile),
        (status = 409, description = "Username taken")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest);
    }

    let password_hash = credentials::hash_password(&payload.password)?;

    let user = state
        .repo
        .create_user(&payload.username, &password_hash, payload.display_name)
        .await?
        // None means the unique username constraint fired.
        .ok_or(ApiError::Conflict)?;

    tracing::info!(username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(profile_of(&user))))
}

/// login
///
/// [Public Route] Verifies Basic credentials and, on success, issues both proofs
/// of identity: a stateless bearer token and a server-side session referenced by
/// the `session-id` cookie.
#[utoipa::path(
    post,
    path = "/users/login",
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Bad credentials"),
        (status = 404, description = "Unknown username")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthenticated)?;

    let (username, password) =
        credentials::parse_basic(auth_header).ok_or(ApiError::Unauthenticated)?;

    let user = credentials::verify(&state.repo, &username, &password)
        .await
        .map_err(ApiError::from)?;

    let access_token = token::issue(&state.config.jwt_secret, user.id, state.config.token_ttl_secs)
        .map_err(ApiError::from)?;
    let session_id = state.sessions.create(user.id).await?;

    tracing::info!(username = %user.username, "login succeeded");

    let cookie = format!("{SESSION_COOKIE}={session_id}; HttpOnly; Path=/");
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            status: "You are successfully logged in!".to_string(),
            access_token,
            expires_in: state.config.token_ttl_secs,
        }),
    ))
}

/// logout
///
/// [Public Route] Destroys the server-side session named by the `session-id`
/// cookie and clears the cookie. Bearer tokens are stateless and keep working
/// until they expire; only the session dies here.
#[utoipa::path(
    get,
    path = "/users/logout",
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "No live session")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let session_id =
        gate::cookie_value(&headers, SESSION_COOKIE).ok_or(ApiError::Unauthenticated)?;

    if !state.sessions.destroy(&session_id).await {
        return Err(ApiError::Unauthenticated);
    }

    let cleared = format!("{SESSION_COOKIE}=; Max-Age=0; HttpOnly; Path=/");
    Ok(([(header::SET_COOKIE, cleared)], "You are logged out!"))
}

/// get_me
///
/// [Authenticated Route] The caller's own profile, as resolved by the gate.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Profile", body = UserProfile))
)]
pub async fn get_me(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, ApiError> {
    gate::enforce(user.principal(), &Operation::new(OperationKind::ViewProfile))?;

    // The gate already proved the row exists; re-read it for the full profile.
    let record = state
        .repo
        .get_user(user.id)
        .await?
        .ok_or(ApiError::Unauthenticated)?;
    Ok(Json(profile_of(&record)))
}

/// list_users
///
/// [Admin Route] Lists every registered identity. Password hashes never leave
/// the repository layer in serialized form.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users", body = [UserProfile]),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_users(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    gate::enforce(user.principal(), &Operation::new(OperationKind::ListUsers))?;

    let users = state.repo.list_users().await?;
    Ok(Json(users.iter().map(profile_of).collect()))
}

// --- Campsite handlers ---

/// get_campsites
///
/// [Public Route] Lists every campsite. Read-only, no identity required.
#[utoipa::path(
    get,
    path = "/campsites",
    responses((status = 200, description = "All campsites", body = [Campsite]))
)]
pub async fn get_campsites(
    State(state): State<AppState>,
) -> Result<Json<Vec<Campsite>>, ApiError> {
    Ok(Json(state.repo.get_campsites().await?))
}

/// get_featured_campsites
///
/// [Public Route] Lists campsites flagged as featured.
#[utoipa::path(
    get,
    path = "/campsites/featured",
    responses((status = 200, description = "Featured campsites", body = [Campsite]))
)]
pub async fn get_featured_campsites(
    State(state): State<AppState>,
) -> Result<Json<Vec<Campsite>>, ApiError> {
    Ok(Json(state.repo.get_featured_campsites().await?))
}

/// get_campsite
///
/// [Public Route] A single campsite by ID.
#[utoipa::path(
    get,
    path = "/campsites/{id}",
    params(("id" = Uuid, Path, description = "Campsite ID")),
    responses(
        (status = 200, description = "Found", body = Campsite),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_campsite(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Campsite>, ApiError> {
    let campsite = state.repo.get_campsite(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(campsite))
}

/// create_campsite
///
/// [Admin Route] Adds a new campsite listing.
#[utoipa::path(
    post,
    path = "/campsites",
    request_body = CreateCampsiteRequest,
    responses(
        (status = 201, description = "Created", body = Campsite),
        (status = 403, description = "Not an admin"),
        (status = 409, description = "Name taken")
    )
)]
pub async fn create_campsite(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCampsiteRequest>,
) -> Result<(StatusCode, Json<Campsite>), ApiError> {
    gate::enforce(user.principal(), &Operation::new(OperationKind::CreateCampsite))?;

    let campsite = state
        .repo
        .create_campsite(payload)
        .await?
        .ok_or(ApiError::Conflict)?;
    tracing::info!(campsite = %campsite.name, "campsite created");
    Ok((StatusCode::CREATED, Json(campsite)))
}

/// update_campsite
///
/// [Admin Route] Partially updates a campsite; unset fields are left unchanged.
#[utoipa::path(
    put,
    path = "/campsites/{id}",
    params(("id" = Uuid, Path, description = "Campsite ID")),
    request_body = UpdateCampsiteRequest,
    responses(
        (status = 200, description = "Updated", body = Campsite),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_campsite(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCampsiteRequest>,
) -> Result<Json<Campsite>, ApiError> {
    gate::enforce(user.principal(), &Operation::new(OperationKind::UpdateCampsite))?;

    let campsite = state
        .repo
        .update_campsite(id, payload)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(campsite))
}

/// delete_campsite
///
/// [Admin Route] Removes a campsite (and, via the schema's cascade, its comments).
#[utoipa::path(
    delete,
    path = "/campsites/{id}",
    params(("id" = Uuid, Path, description = "Campsite ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_campsite(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    gate::enforce(user.principal(), &Operation::new(OperationKind::RemoveCampsite))?;

    if state.repo.delete_campsite(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

/// delete_campsites
///
/// [Admin Route] Removes every campsite in the system.
#[utoipa::path(
    delete,
    path = "/campsites",
    responses((status = 200, description = "All campsites deleted"))
)]
pub async fn delete_campsites(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    gate::enforce(user.principal(), &Operation::new(OperationKind::ClearCampsites))?;

    let deleted = state.repo.delete_campsites().await?;
    tracing::warn!(deleted, "all campsites deleted");
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}

// --- Comment handlers (nested under campsites) ---

/// get_comments
///
/// [Public Route] All comments on a campsite, oldest first. 404 if the campsite
/// itself does not exist.
#[utoipa::path(
    get,
    path = "/campsites/{id}/comments",
    params(("id" = Uuid, Path, description = "Campsite ID")),
    responses(
        (status = 200, description = "Comments", body = [Comment]),
        (status = 404, description = "Campsite not found")
    )
)]
pub async fn get_comments(
    State(state): State<AppState>,
    Path(campsite_id): Path<Uuid>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    state
        .repo
        .get_campsite(campsite_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(state.repo.get_comments(campsite_id).await?))
}

/// get_comment
///
/// [Public Route] One comment, addressed through its parent campsite.
#[utoipa::path(
    get,
    path = "/campsites/{id}/comments/{comment_id}",
    params(
        ("id" = Uuid, Path, description = "Campsite ID"),
        ("comment_id" = Uuid, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Found", body = Comment),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_comment(
    State(state): State<AppState>,
    Path((campsite_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Comment>, ApiError> {
    let comment = state
        .repo
        .get_comment(comment_id)
        .await?
        .filter(|c| c.campsite_id == campsite_id)
        .ok_or(ApiError::NotFound)?;
    Ok(Json(comment))
}

/// add_comment
///
/// [Authenticated Route] Posts a new comment on a campsite. The author reference
/// is taken from the resolved identity, never from the payload, and is immutable
/// from this point on.
#[utoipa::path(
    post,
    path = "/campsites/{id}/comments",
    params(("id" = Uuid, Path, description = "Campsite ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment added", body = Comment),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Campsite not found")
    )
)]
pub async fn add_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(campsite_id): Path<Uuid>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    gate::enforce(user.principal(), &Operation::new(OperationKind::AddComment))?;

    if !(1..=5).contains(&payload.rating) {
        return Err(ApiError::BadRequest);
    }

    state
        .repo
        .get_campsite(campsite_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let comment = state
        .repo
        .add_comment(campsite_id, user.id, payload.rating, &payload.text)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// update_comment
///
/// [Authenticated Route] Edits a comment's rating and/or text. Owner-only: the
/// policy compares the comment's fixed author reference against the caller.
#[utoipa::path(
    put,
    path = "/campsites/{id}/comments/{comment_id}",
    params(
        ("id" = Uuid, Path, description = "Campsite ID"),
        ("comment_id" = Uuid, Path, description = "Comment ID")
    ),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Updated", body = Comment),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path((campsite_id, comment_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<Json<Comment>, ApiError> {
    if let Some(rating) = payload.rating {
        if !(1..=5).contains(&rating) {
            return Err(ApiError::BadRequest);
        }
    }

    // The ownership fact comes from the stored comment, not the request.
    let existing = state
        .repo
        .get_comment(comment_id)
        .await?
        .filter(|c| c.campsite_id == campsite_id)
        .ok_or(ApiError::NotFound)?;

    gate::enforce(
        user.principal(),
        &Operation::owned(OperationKind::EditComment, existing.author_id),
    )?;

    let comment = state
        .repo
        .update_comment(comment_id, payload)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(comment))
}

/// delete_comment
///
/// [Authenticated Route] Deletes a comment, with two tiers of authorization:
/// admins go through the admin-override operation and may remove any comment,
/// everyone else must own it.
#[utoipa::path(
    delete,
    path = "/campsites/{id}/comments/{comment_id}",
    params(
        ("id" = Uuid, Path, description = "Campsite ID"),
        ("comment_id" = Uuid, Path, description = "Comment ID")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path((campsite_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let existing = state
        .repo
        .get_comment(comment_id)
        .await?
        .filter(|c| c.campsite_id == campsite_id)
        .ok_or(ApiError::NotFound)?;

    let operation = if user.admin {
        Operation::new(OperationKind::RemoveAnyComment)
    } else {
        Operation::owned(OperationKind::RemoveComment, existing.author_id)
    };
    gate::enforce(user.principal(), &operation)?;

    if state.repo.delete_comment(comment_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

/// clear_comments
///
/// [Admin Route] Removes every comment on one campsite.
#[utoipa::path(
    delete,
    path = "/campsites/{id}/comments",
    params(("id" = Uuid, Path, description = "Campsite ID")),
    responses(
        (status = 200, description = "Comments cleared"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Campsite not found")
    )
)]
pub async fn clear_comments(
    user: AuthUser,
    State(state): State<AppState>,
    Path(campsite_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    gate::enforce(user.principal(), &Operation::new(OperationKind::ClearComments))?;

    state
        .repo
        .get_campsite(campsite_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let deleted = state.repo.delete_comments(campsite_id).await?;
    tracing::info!(%campsite_id, deleted, "comments cleared");
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}

// --- Promotion handlers ---

/// get_promotions
///
/// [Public Route] Lists every promotion.
#[utoipa::path(
    get,
    path = "/promotions",
    responses((status = 200, description = "All promotions", body = [Promotion]))
)]
pub async fn get_promotions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Promotion>>, ApiError> {
    Ok(Json(state.repo.get_promotions().await?))
}

/// get_featured_promotions
///
/// [Public Route] Lists promotions flagged as featured.
#[utoipa::path(
    get,
    path = "/promotions/featured",
    responses((status = 200, description = "Featured promotions", body = [Promotion]))
)]
pub async fn get_featured_promotions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Promotion>>, ApiError> {
    Ok(Json(state.repo.get_featured_promotions().await?))
}

/// get_promotion
///
/// [Public Route] A single promotion by ID.
#[utoipa::path(
    get,
    path = "/promotions/{id}",
    params(("id" = Uuid, Path, description = "Promotion ID")),
    responses(
        (status = 200, description = "Found", body = Promotion),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_promotion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Promotion>, ApiError> {
    let promotion = state.repo.get_promotion(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(promotion))
}

/// create_promotion
///
/// [Admin Route] Adds a new promotion.
#[utoipa::path(
    post,
    path = "/promotions",
    request_body = CreatePromotionRequest,
    responses(
        (status = 201, description = "Created", body = Promotion),
        (status = 409, description = "Name taken")
    )
)]
pub async fn create_promotion(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePromotionRequest>,
) -> Result<(StatusCode, Json<Promotion>), ApiError> {
    gate::enforce(user.principal(), &Operation::new(OperationKind::CreatePromotion))?;

    let promotion = state
        .repo
        .create_promotion(payload)
        .await?
        .ok_or(ApiError::Conflict)?;
    Ok((StatusCode::CREATED, Json(promotion)))
}

/// update_promotion
///
/// [Admin Route] Partially updates a promotion.
#[utoipa::path(
    put,
    path = "/promotions/{id}",
    params(("id" = Uuid, Path, description = "Promotion ID")),
    request_body = UpdatePromotionRequest,
    responses(
        (status = 200, description = "Updated", body = Promotion),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_promotion(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePromotionRequest>,
) -> Result<Json<Promotion>, ApiError> {
    gate::enforce(user.principal(), &Operation::new(OperationKind::UpdatePromotion))?;

    let promotion = state
        .repo
        .update_promotion(id, payload)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(promotion))
}

/// delete_promotion
///
/// [Admin Route] Removes a promotion.
#[utoipa::path(
    delete,
    path = "/promotions/{id}",
    params(("id" = Uuid, Path, description = "Promotion ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_promotion(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    gate::enforce(user.principal(), &Operation::new(OperationKind::RemovePromotion))?;

    if state.repo.delete_promotion(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

// --- Partner handlers ---

/// get_partners
///
/// [Public Route] Lists every partner organisation.
#[utoipa::path(
    get,
    path = "/partners",
    responses((status = 200, description = "All partners", body = [Partner]))
)]
pub async fn get_partners(
    State(state): State<AppState>,
) -> Result<Json<Vec<Partner>>, ApiError> {
    Ok(Json(state.repo.get_partners().await?))
}

/// get_featured_partners
///
/// [Public Route] Lists partners flagged as featured.
#[utoipa::path(
    get,
    path = "/partners/featured",
    responses((status = 200, description = "Featured partners", body = [Partner]))
)]
pub async fn get_featured_partners(
    State(state): State<AppState>,
) -> Result<Json<Vec<Partner>>, ApiError> {
    Ok(Json(state.repo.get_featured_partners().await?))
}

/// get_partner
///
/// [Public Route] A single partner by ID.
#[utoipa::path(
    get,
    path = "/partners/{id}",
    params(("id" = Uuid, Path, description = "Partner ID")),
    responses(
        (status = 200, description = "Found", body = Partner),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_partner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Partner>, ApiError> {
    let partner = state.repo.get_partner(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(partner))
}

/// create_partner
///
/// [Admin Route] Adds a new partner.
#[utoipa::path(
    post,
    path = "/partners",
    request_body = CreatePartnerRequest,
    responses(
        (status = 201, description = "Created", body = Partner),
        (status = 409, description = "Name taken")
    )
)]
pub async fn create_partner(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePartnerRequest>,
) -> Result<(StatusCode, Json<Partner>), ApiError> {
    gate::enforce(user.principal(), &Operation::new(OperationKind::CreatePartner))?;

    let partner = state
        .repo
        .create_partner(payload)
        .await?
        .ok_or(ApiError::Conflict)?;
    Ok((StatusCode::CREATED, Json(partner)))
}

/// update_partner
///
/// [Admin Route] Partially updates a partner.
#[utoipa::path(
    put,
    path = "/partners/{id}",
    params(("id" = Uuid, Path, description = "Partner ID")),
    request_body = UpdatePartnerRequest,
    responses(
        (status = 200, description = "Updated", body = Partner),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_partner(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePartnerRequest>,
) -> Result<Json<Partner>, ApiError> {
    gate::enforce(user.principal(), &Operation::new(OperationKind::UpdatePartner))?;

    let partner = state
        .repo
        .update_partner(id, payload)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(partner))
}

/// delete_partner
///
/// [Admin Route] Removes a partner.
#[utoipa::path(
    delete,
    path = "/partners/{id}",
    params(("id" = Uuid, Path, description = "Partner ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_partner(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    gate::enforce(user.principal(), &Operation::new(OperationKind::RemovePartner))?;

    if state.repo.delete_partner(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

// --- Upload handler ---

/// upload_image
///
/// [Admin Route] Accepts a multipart upload whose `imageFile` part must be a
/// jpg/jpeg/png/gif and stores it through the storage service. Returns the
/// stored path for use in campsite/promotion/partner records.
#[utoipa::path(
    post,
    path = "/imageUpload",
    responses(
        (status = 200, description = "Stored", body = UploadResponse),
        (status = 400, description = "Not an image"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn upload_image(
    user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    gate::enforce(user.principal(), &Operation::new(OperationKind::UploadImage))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest)?
    {
        if field.name() != Some("imageFile") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or(ApiError::BadRequest)?;

        if !crate::storage::is_allowed_image(&filename) {
            return Err(ApiError::BadRequest);
        }

        let bytes = field.bytes().await.map_err(|_| ApiError::BadRequest)?;
        let size = bytes.len();

        let path = state
            .storage
            .store_image(&filename, &bytes)
            .await
            .map_err(|e| {
                tracing::error!("image store failed: {e}");
                ApiError::Store
            })?;

        return Ok(Json(UploadResponse {
            filename,
            path,
            size,
        }));
    }

    // No imageFile part arrived at all.
    Err(ApiError::BadRequest)
}

// --- Misc ---

/// Health probe; used by monitors and load balancers.
pub async fn health() -> &'static str {
    "ok"
}

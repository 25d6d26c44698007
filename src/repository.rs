use crate::error::StoreError;
use crate::models::{
    Campsite, Comment, CreateCampsiteRequest, CreatePartnerRequest, CreatePromotionRequest,
    Partner, Promotion, UpdateCampsiteRequest, UpdateCommentRequest, UpdatePartnerRequest,
    UpdatePromotionRequest, User,
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// The abstract contract for all persistence operations. Handlers talk to this
/// trait only, never to the driver, so the Postgres implementation can be swapped
/// for the in-memory one used in tests.
///
/// Every method returns `Result<_, StoreError>`: a store failure is the one
/// failure class the boundary reports as retryable (500), and it must propagate
/// as a typed value rather than be swallowed. "Not found" is modelled as
/// `Ok(None)` / `Ok(false)`, not as an error.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users / identities ---
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    /// Inserts a new identity. Returns Ok(None) when the username is taken.
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        display_name: Option<String>,
    ) -> Result<Option<User>, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    // --- Campsites ---
    async fn get_campsites(&self) -> Result<Vec<Campsite>, StoreError>;
    async fn get_featured_campsites(&self) -> Result<Vec<Campsite>, StoreError>;
    async fn get_campsite(&self, id: Uuid) -> Result<Option<Campsite>, StoreError>;
    /// Inserts a new campsite. Returns Ok(None) when the name is taken.
    async fn create_campsite(
        &self,
        req: CreateCampsiteRequest,
    ) -> Result<Option<Campsite>, StoreError>;
    async fn update_campsite(
        &self,
        id: Uuid,
        req: UpdateCampsiteRequest,
    ) -> Result<Option<Campsite>, StoreError>;
    async fn delete_campsite(&self, id: Uuid) -> Result<bool, StoreError>;
    /// Admin sweep: removes every campsite. Returns the number deleted.
    async fn delete_campsites(&self) -> Result<u64, StoreError>;

    // --- Comments (nested under campsites) ---
    async fn get_comments(&self, campsite_id: Uuid) -> Result<Vec<Comment>, StoreError>;
    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>, StoreError>;
    /// The author reference is fixed here, at creation, and never updated after.
    async fn add_comment(
        &self,
        campsite_id: Uuid,
        author_id: Uuid,
        rating: i32,
        text: &str,
    ) -> Result<Comment, StoreError>;
    async fn update_comment(
        &self,
        id: Uuid,
        req: UpdateCommentRequest,
    ) -> Result<Option<Comment>, StoreError>;
    async fn delete_comment(&self, id: Uuid) -> Result<bool, StoreError>;
    /// Admin sweep: removes every comment on one campsite. Returns the number deleted.
    async fn delete_comments(&self, campsite_id: Uuid) -> Result<u64, StoreError>;

    // --- Promotions ---
    async fn get_promotions(&self) -> Result<Vec<Promotion>, StoreError>;
    async fn get_featured_promotions(&self) -> Result<Vec<Promotion>, StoreError>;
    async fn get_promotion(&self, id: Uuid) -> Result<Option<Promotion>, StoreError>;
    /// Inserts a new promotion. Returns Ok(None) when the name is taken.
    async fn create_promotion(
        &self,
        req: CreatePromotionRequest,
    ) -> Result<Option<Promotion>, StoreError>;
    async fn update_promotion(
        &self,
        id: Uuid,
        req: UpdatePromotionRequest,
    ) -> Result<Option<Promotion>, StoreError>;
    async fn delete_promotion(&self, id: Uuid) -> Result<bool, StoreError>;

    // --- Partners ---
    async fn get_partners(&self) -> Result<Vec<Partner>, StoreError>;
    async fn get_featured_partners(&self) -> Result<Vec<Partner>, StoreError>;
    async fn get_partner(&self, id: Uuid) -> Result<Option<Partner>, StoreError>;
    /// Inserts a new partner. Returns Ok(None) when the name is taken.
    async fn create_partner(
        &self,
        req: CreatePartnerRequest,
    ) -> Result<Option<Partner>, StoreError>;
    async fn update_partner(
        &self,
        id: Uuid,
        req: UpdatePartnerRequest,
    ) -> Result<Option<Partner>, StoreError>;
    async fn delete_partner(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
/// All queries are runtime-bound (`query_as::<_, T>` + `bind`), so the crate
/// builds without a live database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CAMPSITE_COLS: &str =
    "id, name, description, image, elevation, cost, featured, created_at, updated_at";
const COMMENT_COLS: &str =
    "c.id, c.campsite_id, c.author_id, c.rating, c.text, c.created_at, c.updated_at, \
     u.username as author_username";
const PROMOTION_COLS: &str =
    "id, name, image, featured, cost, description, created_at, updated_at";
const PARTNER_COLS: &str = "id, name, image, featured, description, created_at, updated_at";

/// Postgres unique-violation SQLSTATE; used to turn duplicate inserts into Ok(None).
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- Users ---

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, admin, display_name FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, admin, display_name \
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// create_user
    ///
    /// New identities always start with `admin = false`; the flag is only ever
    /// raised through a direct administrative mutation, never at registration.
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        display_name: Option<String>,
    ) -> Result<Option<User>, StoreError> {
        let result = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, password_hash, admin, display_name) \
             VALUES ($1, $2, $3, false, $4) \
             RETURNING id, username, password_hash, admin, display_name",
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(Some(user)),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, admin, display_name \
             FROM users ORDER BY username ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    // --- Campsites ---

    async fn get_campsites(&self) -> Result<Vec<Campsite>, StoreError> {
        let rows = sqlx::query_as::<_, Campsite>(&format!(
            "SELECT {CAMPSITE_COLS} FROM campsites ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_featured_campsites(&self) -> Result<Vec<Campsite>, StoreError> {
        let rows = sqlx::query_as::<_, Campsite>(&format!(
            "SELECT {CAMPSITE_COLS} FROM campsites WHERE featured = true \
             ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_campsite(&self, id: Uuid) -> Result<Option<Campsite>, StoreError> {
        let row = sqlx::query_as::<_, Campsite>(&format!(
            "SELECT {CAMPSITE_COLS} FROM campsites WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_campsite(
        &self,
        req: CreateCampsiteRequest,
    ) -> Result<Option<Campsite>, StoreError> {
        let result = sqlx::query_as::<_, Campsite>(&format!(
            "INSERT INTO campsites (id, name, description, image, elevation, cost, featured, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW()) \
             RETURNING {CAMPSITE_COLS}"
        ))
        .bind(Uuid::new_v4())
        .bind(req.name)
        .bind(req.description)
        .bind(req.image)
        .bind(req.elevation)
        .bind(req.cost)
        .bind(req.featured)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(Some(row)),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// update_campsite
    ///
    /// COALESCE keeps existing column values for every field the request left unset.
    async fn update_campsite(
        &self,
        id: Uuid,
        req: UpdateCampsiteRequest,
    ) -> Result<Option<Campsite>, StoreError> {
        let row = sqlx::query_as::<_, Campsite>(&format!(
            "UPDATE campsites SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                image = COALESCE($4, image), \
                elevation = COALESCE($5, elevation), \
                cost = COALESCE($6, cost), \
                featured = COALESCE($7, featured), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {CAMPSITE_COLS}"
        ))
        .bind(id)
        .bind(req.name)
        .bind(req.description)
        .bind(req.image)
        .bind(req.elevation)
        .bind(req.cost)
        .bind(req.featured)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_campsite(&self, id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM campsites WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_campsites(&self) -> Result<u64, StoreError> {
        let res = sqlx::query("DELETE FROM campsites").execute(&self.pool).await?;
        Ok(res.rows_affected())
    }

    // --- Comments ---

    async fn get_comments(&self, campsite_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        let rows = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLS} FROM comments c \
             JOIN users u ON c.author_id = u.id \
             WHERE c.campsite_id = $1 \
             ORDER BY c.created_at ASC"
        ))
        .bind(campsite_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        let row = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLS} FROM comments c \
             JOIN users u ON c.author_id = u.id \
             WHERE c.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn add_comment(
        &self,
        campsite_id: Uuid,
        author_id: Uuid,
        rating: i32,
        text: &str,
    ) -> Result<Comment, StoreError> {
        // CTE so the insert and the author join happen in one round trip.
        let row = sqlx::query_as::<_, Comment>(
            "WITH inserted AS ( \
                INSERT INTO comments (id, campsite_id, author_id, rating, text, \
                                      created_at, updated_at) \
                VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) \
                RETURNING id, campsite_id, author_id, rating, text, created_at, updated_at \
             ) \
             SELECT i.id, i.campsite_id, i.author_id, i.rating, i.text, \
                    i.created_at, i.updated_at, u.username as author_username \
             FROM inserted i JOIN users u ON i.author_id = u.id",
        )
        .bind(Uuid::new_v4())
        .bind(campsite_id)
        .bind(author_id)
        .bind(rating)
        .bind(text)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// update_comment
    ///
    /// Only rating and text are updatable. The author column is deliberately
    /// absent from the SET list; ownership is immutable.
    async fn update_comment(
        &self,
        id: Uuid,
        req: UpdateCommentRequest,
    ) -> Result<Option<Comment>, StoreError> {
        let row = sqlx::query_as::<_, Comment>(
            "WITH updated AS ( \
                UPDATE comments SET \
                    rating = COALESCE($2, rating), \
                    text = COALESCE($3, text), \
                    updated_at = NOW() \
                WHERE id = $1 \
                RETURNING id, campsite_id, author_id, rating, text, created_at, updated_at \
             ) \
             SELECT d.id, d.campsite_id, d.author_id, d.rating, d.text, \
                    d.created_at, d.updated_at, u.username as author_username \
             FROM updated d JOIN users u ON d.author_id = u.id",
        )
        .bind(id)
        .bind(req.rating)
        .bind(req.text)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_comments(&self, campsite_id: Uuid) -> Result<u64, StoreError> {
        let res = sqlx::query("DELETE FROM comments WHERE campsite_id = $1")
            .bind(campsite_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    // --- Promotions ---

    async fn get_promotions(&self) -> Result<Vec<Promotion>, StoreError> {
        let rows = sqlx::query_as::<_, Promotion>(&format!(
            "SELECT {PROMOTION_COLS} FROM promotions ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_featured_promotions(&self) -> Result<Vec<Promotion>, StoreError> {
        let rows = sqlx::query_as::<_, Promotion>(&format!(
            "SELECT {PROMOTION_COLS} FROM promotions WHERE featured = true \
             ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_promotion(&self, id: Uuid) -> Result<Option<Promotion>, StoreError> {
        let row = sqlx::query_as::<_, Promotion>(&format!(
            "SELECT {PROMOTION_COLS} FROM promotions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_promotion(
        &self,
        req: CreatePromotionRequest,
    ) -> Result<Option<Promotion>, StoreError> {
        let result = sqlx::query_as::<_, Promotion>(&format!(
            "INSERT INTO promotions (id, name, image, featured, cost, description, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW()) \
             RETURNING {PROMOTION_COLS}"
        ))
        .bind(Uuid::new_v4())
        .bind(req.name)
        .bind(req.image)
        .bind(req.featured)
        .bind(req.cost)
        .bind(req.description)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(Some(row)),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_promotion(
        &self,
        id: Uuid,
        req: UpdatePromotionRequest,
    ) -> Result<Option<Promotion>, StoreError> {
        let row = sqlx::query_as::<_, Promotion>(&format!(
            "UPDATE promotions SET \
                name = COALESCE($2, name), \
                image = COALESCE($3, image), \
                cost = COALESCE($4, cost), \
                description = COALESCE($5, description), \
                featured = COALESCE($6, featured), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PROMOTION_COLS}"
        ))
        .bind(id)
        .bind(req.name)
        .bind(req.image)
        .bind(req.cost)
        .bind(req.description)
        .bind(req.featured)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_promotion(&self, id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM promotions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    // --- Partners ---

    async fn get_partners(&self) -> Result<Vec<Partner>, StoreError> {
        let rows = sqlx::query_as::<_, Partner>(&format!(
            "SELECT {PARTNER_COLS} FROM partners ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_featured_partners(&self) -> Result<Vec<Partner>, StoreError> {
        let rows = sqlx::query_as::<_, Partner>(&format!(
            "SELECT {PARTNER_COLS} FROM partners WHERE featured = true \
             ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_partner(&self, id: Uuid) -> Result<Option<Partner>, StoreError> {
        let row = sqlx::query_as::<_, Partner>(&format!(
            "SELECT {PARTNER_COLS} FROM partners WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_partner(
        &self,
        req: CreatePartnerRequest,
    ) -> Result<Option<Partner>, StoreError> {
        let result = sqlx::query_as::<_, Partner>(&format!(
            "INSERT INTO partners (id, name, image, featured, description, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) \
             RETURNING {PARTNER_COLS}"
        ))
        .bind(Uuid::new_v4())
        .bind(req.name)
        .bind(req.image)
        .bind(req.featured)
        .bind(req.description)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(Some(row)),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_partner(
        &self,
        id: Uuid,
        req: UpdatePartnerRequest,
    ) -> Result<Option<Partner>, StoreError> {
        let row = sqlx::query_as::<_, Partner>(&format!(
            "UPDATE partners SET \
                name = COALESCE($2, name), \
                image = COALESCE($3, image), \
                description = COALESCE($4, description), \
                featured = COALESCE($5, featured), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PARTNER_COLS}"
        ))
        .bind(id)
        .bind(req.name)
        .bind(req.image)
        .bind(req.description)
        .bind(req.featured)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_partner(&self, id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM partners WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

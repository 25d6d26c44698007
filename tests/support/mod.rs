#![allow(dead_code)]

use async_trait::async_trait;
use campsite_api::{
    AppState, MockStorageService, SessionStore,
    config::{AppConfig, Env},
    credentials,
    error::StoreError,
    models::{
        Campsite, Comment, CreateCampsiteRequest, CreatePartnerRequest, CreatePromotionRequest,
        Partner, Promotion, UpdateCampsiteRequest, UpdateCommentRequest, UpdatePartnerRequest,
        UpdatePromotionRequest, User,
    },
    repository::Repository,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";

/// InMemoryRepository
///
/// A functional, map-backed implementation of the `Repository` trait so router
/// level tests can assert post-state (e.g., the comment list really is empty
/// after an admin sweep) without a database.
#[derive(Default)]
pub struct InMemoryRepository {
    pub users: RwLock<HashMap<Uuid, User>>,
    pub campsites: RwLock<HashMap<Uuid, Campsite>>,
    pub comments: RwLock<HashMap<Uuid, Comment>>,
    pub promotions: RwLock<HashMap<Uuid, Promotion>>,
    pub partners: RwLock<HashMap<Uuid, Partner>>,
}

impl InMemoryRepository {
    pub fn seed_user(&self, username: &str, password: &str, admin: bool) -> User {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: credentials::hash_password(password).unwrap(),
            admin,
            display_name: None,
        };
        self.users.write().unwrap().insert(user.id, user.clone());
        user
    }

    pub fn seed_campsite(&self, name: &str) -> Campsite {
        let now = Utc::now();
        let campsite = Campsite {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: "A lovely riverside spot".to_string(),
            image: "public/images/react-lake.jpg".to_string(),
            elevation: 877,
            cost: 65.0,
            featured: false,
            created_at: now,
            updated_at: now,
        };
        self.campsites
            .write()
            .unwrap()
            .insert(campsite.id, campsite.clone());
        campsite
    }

    pub fn seed_comment(&self, campsite_id: Uuid, author: &User, text: &str) -> Comment {
        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            campsite_id,
            author_id: author.id,
            rating: 4,
            text: text.to_string(),
            created_at: now,
            updated_at: now,
            author_username: Some(author.username.clone()),
        };
        self.comments
            .write()
            .unwrap()
            .insert(comment.id, comment.clone());
        comment
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    // --- Users ---

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().unwrap().get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        display_name: Option<String>,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().unwrap();
        if users.values().any(|u| u.username == username) {
            return Ok(None);
        }
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            admin: false,
            display_name,
        };
        users.insert(user.id, user.clone());
        Ok(Some(user))
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.users.read().unwrap().values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    // --- Campsites ---

    async fn get_campsites(&self) -> Result<Vec<Campsite>, StoreError> {
        Ok(self.campsites.read().unwrap().values().cloned().collect())
    }

    async fn get_featured_campsites(&self) -> Result<Vec<Campsite>, StoreError> {
        Ok(self
            .campsites
            .read()
            .unwrap()
            .values()
            .filter(|c| c.featured)
            .cloned()
            .collect())
    }

    async fn get_campsite(&self, id: Uuid) -> Result<Option<Campsite>, StoreError> {
        Ok(self.campsites.read().unwrap().get(&id).cloned())
    }

    async fn create_campsite(
        &self,
        req: CreateCampsiteRequest,
    ) -> Result<Option<Campsite>, StoreError> {
        let mut campsites = self.campsites.write().unwrap();
        if campsites.values().any(|c| c.name == req.name) {
            return Ok(None);
        }
        let now = Utc::now();
        let campsite = Campsite {
            id: Uuid::new_v4(),
            name: req.name,
            description: req.description,
            image: req.image,
            elevation: req.elevation,
            cost: req.cost,
            featured: req.featured,
            created_at: now,
            updated_at: now,
        };
        campsites.insert(campsite.id, campsite.clone());
        Ok(Some(campsite))
    }

    async fn update_campsite(
        &self,
        id: Uuid,
        req: UpdateCampsiteRequest,
    ) -> Result<Option<Campsite>, StoreError> {
        let mut campsites = self.campsites.write().unwrap();
        let Some(campsite) = campsites.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = req.name {
            campsite.name = name;
        }
        if let Some(description) = req.description {
            campsite.description = description;
        }
        if let Some(image) = req.image {
            campsite.image = image;
        }
        if let Some(elevation) = req.elevation {
            campsite.elevation = elevation;
        }
        if let Some(cost) = req.cost {
            campsite.cost = cost;
        }
        if let Some(featured) = req.featured {
            campsite.featured = featured;
        }
        campsite.updated_at = Utc::now();
        Ok(Some(campsite.clone()))
    }

    async fn delete_campsite(&self, id: Uuid) -> Result<bool, StoreError> {
        let removed = self.campsites.write().unwrap().remove(&id).is_some();
        if removed {
            self.comments
                .write()
                .unwrap()
                .retain(|_, c| c.campsite_id != id);
        }
        Ok(removed)
    }

    async fn delete_campsites(&self) -> Result<u64, StoreError> {
        let mut campsites = self.campsites.write().unwrap();
        let count = campsites.len() as u64;
        campsites.clear();
        self.comments.write().unwrap().clear();
        Ok(count)
    }

    // --- Comments ---

    async fn get_comments(&self, campsite_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        let mut comments: Vec<Comment> = self
            .comments
            .read()
            .unwrap()
            .values()
            .filter(|c| c.campsite_id == campsite_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        Ok(self.comments.read().unwrap().get(&id).cloned())
    }

    async fn add_comment(
        &self,
        campsite_id: Uuid,
        author_id: Uuid,
        rating: i32,
        text: &str,
    ) -> Result<Comment, StoreError> {
        let author_username = self
            .users
            .read()
            .unwrap()
            .get(&author_id)
            .map(|u| u.username.clone());
        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            campsite_id,
            author_id,
            rating,
            text: text.to_string(),
            created_at: now,
            updated_at: now,
            author_username,
        };
        self.comments
            .write()
            .unwrap()
            .insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update_comment(
        &self,
        id: Uuid,
        req: UpdateCommentRequest,
    ) -> Result<Option<Comment>, StoreError> {
        let mut comments = self.comments.write().unwrap();
        let Some(comment) = comments.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(rating) = req.rating {
            comment.rating = rating;
        }
        if let Some(text) = req.text {
            comment.text = text;
        }
        comment.updated_at = Utc::now();
        Ok(Some(comment.clone()))
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.comments.write().unwrap().remove(&id).is_some())
    }

    async fn delete_comments(&self, campsite_id: Uuid) -> Result<u64, StoreError> {
        let mut comments = self.comments.write().unwrap();
        let before = comments.len();
        comments.retain(|_, c| c.campsite_id != campsite_id);
        Ok((before - comments.len()) as u64)
    }

    // --- Promotions ---

    async fn get_promotions(&self) -> Result<Vec<Promotion>, StoreError> {
        Ok(self.promotions.read().unwrap().values().cloned().collect())
    }

    async fn get_featured_promotions(&self) -> Result<Vec<Promotion>, StoreError> {
        Ok(self
            .promotions
            .read()
            .unwrap()
            .values()
            .filter(|p| p.featured)
            .cloned()
            .collect())
    }

    async fn get_promotion(&self, id: Uuid) -> Result<Option<Promotion>, StoreError> {
        Ok(self.promotions.read().unwrap().get(&id).cloned())
    }

    async fn create_promotion(
        &self,
        req: CreatePromotionRequest,
    ) -> Result<Option<Promotion>, StoreError> {
        let mut promotions = self.promotions.write().unwrap();
        if promotions.values().any(|p| p.name == req.name) {
            return Ok(None);
        }
        let now = Utc::now();
        let promotion = Promotion {
            id: Uuid::new_v4(),
            name: req.name,
            image: req.image,
            featured: req.featured,
            cost: req.cost,
            description: req.description,
            created_at: now,
            updated_at: now,
        };
        promotions.insert(promotion.id, promotion.clone());
        Ok(Some(promotion))
    }

    async fn update_promotion(
        &self,
        id: Uuid,
        req: UpdatePromotionRequest,
    ) -> Result<Option<Promotion>, StoreError> {
        let mut promotions = self.promotions.write().unwrap();
        let Some(promotion) = promotions.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = req.name {
            promotion.name = name;
        }
        if let Some(image) = req.image {
            promotion.image = image;
        }
        if let Some(cost) = req.cost {
            promotion.cost = cost;
        }
        if let Some(description) = req.description {
            promotion.description = description;
        }
        if let Some(featured) = req.featured {
            promotion.featured = featured;
        }
        promotion.updated_at = Utc::now();
        Ok(Some(promotion.clone()))
    }

    async fn delete_promotion(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.promotions.write().unwrap().remove(&id).is_some())
    }

    // --- Partners ---

    async fn get_partners(&self) -> Result<Vec<Partner>, StoreError> {
        Ok(self.partners.read().unwrap().values().cloned().collect())
    }

    async fn get_featured_partners(&self) -> Result<Vec<Partner>, StoreError> {
        Ok(self
            .partners
            .read()
            .unwrap()
            .values()
            .filter(|p| p.featured)
            .cloned()
            .collect())
    }

    async fn get_partner(&self, id: Uuid) -> Result<Option<Partner>, StoreError> {
        Ok(self.partners.read().unwrap().get(&id).cloned())
    }

    async fn create_partner(
        &self,
        req: CreatePartnerRequest,
    ) -> Result<Option<Partner>, StoreError> {
        let mut partners = self.partners.write().unwrap();
        if partners.values().any(|p| p.name == req.name) {
            return Ok(None);
        }
        let now = Utc::now();
        let partner = Partner {
            id: Uuid::new_v4(),
            name: req.name,
            image: req.image,
            featured: req.featured,
            description: req.description,
            created_at: now,
            updated_at: now,
        };
        partners.insert(partner.id, partner.clone());
        Ok(Some(partner))
    }

    async fn update_partner(
        &self,
        id: Uuid,
        req: UpdatePartnerRequest,
    ) -> Result<Option<Partner>, StoreError> {
        let mut partners = self.partners.write().unwrap();
        let Some(partner) = partners.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = req.name {
            partner.name = name;
        }
        if let Some(image) = req.image {
            partner.image = image;
        }
        if let Some(description) = req.description {
            partner.description = description;
        }
        if let Some(featured) = req.featured {
            partner.featured = featured;
        }
        partner.updated_at = Utc::now();
        Ok(Some(partner.clone()))
    }

    async fn delete_partner(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.partners.write().unwrap().remove(&id).is_some())
    }
}

/// Builds an AppState around the given repository, with the test secret and the
/// requested environment.
pub fn app_state(repo: Arc<InMemoryRepository>, env: Env) -> AppState {
    let mut config = AppConfig::default();
    config.env = env;
    config.jwt_secret = TEST_JWT_SECRET.to_string();

    AppState {
        repo,
        storage: Arc::new(MockStorageService::new()),
        sessions: Arc::new(SessionStore::new(3600)),
        config,
    }
}

/// Same as `app_state`, but every storage write fails.
pub fn app_state_with_failing_storage(repo: Arc<InMemoryRepository>, env: Env) -> AppState {
    let mut state = app_state(repo, env);
    state.storage = Arc::new(MockStorageService::new_failing());
    state
}

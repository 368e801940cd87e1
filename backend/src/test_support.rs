//! In-memory adapters and deterministic doubles for integration tests.
//!
//! Compiled only with the `test-support` feature. The adapters honour the
//! same contracts as the production ones: unique emails, recipe ownership,
//! cascading deletes and the documented ordering of paged reads.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use pagination::PageWindow;
use sha2::{Digest, Sha256};

use crate::domain::ports::{
    CredentialError, ImageUploadError, ImageUploader, PasswordHasher, RecipePersistenceError,
    RecipeRepository, TokenError, TokenIssuer, UploadReceipt, UserPersistenceError,
    UserRepository,
};
use crate::domain::{
    AvatarPayload, AvatarUrl, DisplayName, Email, PasswordHash, PlainPassword, Recipe, RecipeId,
    RecipePatch, RecipeDirectoryService, Role, SessionToken, StoredUser, TokenClaims, User,
    UserDirectoryService, UserId, UserPatch,
};
use crate::inbound::http::state::HttpState;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn window_slice<T: Clone>(items: &[T], window: PageWindow) -> Vec<T> {
    let start = usize::try_from(window.offset()).unwrap_or(usize::MAX);
    let rows = items.iter().skip(start);
    match window.limit() {
        Some(limit) => rows.take(limit as usize).cloned().collect(),
        None => rows.cloned().collect(),
    }
}

#[derive(Default)]
struct Tables {
    users: Vec<StoredUser>,
    recipes: Vec<Recipe>,
}

impl Tables {
    fn user_mut(&mut self, id: &UserId) -> Option<&mut StoredUser> {
        self.users.iter_mut().find(|row| row.user.id() == id)
    }

    fn email_taken_by_other(&self, email: &Email, id: &UserId) -> bool {
        self.users
            .iter()
            .any(|row| row.user.email() == email && row.user.id() != id)
    }

    fn sorted_users(&self) -> Vec<StoredUser> {
        let mut rows = self.users.clone();
        rows.sort_by(|left, right| {
            (left.user.created_at(), left.user.id().as_uuid())
                .cmp(&(right.user.created_at(), right.user.id().as_uuid()))
        });
        rows
    }

    fn sorted_recipes(&self, owner: Option<&UserId>) -> Vec<Recipe> {
        let mut rows: Vec<Recipe> = self
            .recipes
            .iter()
            .filter(|recipe| owner.is_none_or(|owner| &recipe.user_id == owner))
            .cloned()
            .collect();
        rows.sort_by(|left, right| {
            right
                .created_at
                .cmp(&left.created_at)
                .then_with(|| left.id.as_uuid().cmp(right.id.as_uuid()))
        });
        rows
    }
}

/// Shared user and recipe tables behind a mutex.
///
/// Implements both repository ports so foreign-key and cascade behaviour
/// match the PostgreSQL schema.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub fn user_count(&self) -> usize {
        lock(&self.tables).users.len()
    }

    /// Number of stored recipes.
    pub fn recipe_count(&self) -> usize {
        lock(&self.tables).recipes.len()
    }

    /// Stored password hash for the account with this email.
    pub fn password_hash_for(&self, email: &str) -> Option<String> {
        lock(&self.tables)
            .users
            .iter()
            .find(|row| row.user.email().as_ref() == email)
            .map(|row| row.password_hash.as_str().to_owned())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut tables = lock(&self.tables);
        if tables.email_taken_by_other(user.email(), user.id()) {
            return Err(UserPersistenceError::duplicate_email(user.email().as_ref()));
        }
        tables.users.push(StoredUser {
            user: user.clone(),
            password_hash: password_hash.clone(),
        });
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<StoredUser>, UserPersistenceError> {
        Ok(lock(&self.tables)
            .users
            .iter()
            .find(|row| row.user.id() == id)
            .cloned())
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredUser>, UserPersistenceError> {
        Ok(lock(&self.tables)
            .users
            .iter()
            .find(|row| row.user.email() == email)
            .cloned())
    }

    async fn find_by_name(
        &self,
        name: &DisplayName,
    ) -> Result<Vec<StoredUser>, UserPersistenceError> {
        Ok(lock(&self.tables)
            .sorted_users()
            .into_iter()
            .filter(|row| row.user.name() == name)
            .collect())
    }

    async fn find_page(
        &self,
        window: PageWindow,
    ) -> Result<(Vec<StoredUser>, u64), UserPersistenceError> {
        let rows = lock(&self.tables).sorted_users();
        Ok((window_slice(&rows, window), rows.len() as u64))
    }

    async fn update_profile(
        &self,
        id: &UserId,
        patch: &UserPatch,
    ) -> Result<u64, UserPersistenceError> {
        let mut tables = lock(&self.tables);
        if let Some(email) = patch.email.as_ref() {
            if tables.email_taken_by_other(email, id) {
                return Err(UserPersistenceError::duplicate_email(email.as_ref()));
            }
        }
        let Some(row) = tables.user_mut(id) else {
            return Ok(0);
        };
        let current = &row.user;
        row.user = User::builder(
            current.id().clone(),
            patch.name.clone().unwrap_or_else(|| current.name().clone()),
            patch.email.clone().unwrap_or_else(|| current.email().clone()),
        )
        .avatar(current.avatar().cloned())
        .role(current.role())
        .created_at(current.created_at())
        .build();
        Ok(1)
    }

    async fn update_role(&self, id: &UserId, role: Role) -> Result<u64, UserPersistenceError> {
        let mut tables = lock(&self.tables);
        let Some(row) = tables.user_mut(id) else {
            return Ok(0);
        };
        let current = &row.user;
        row.user = User::builder(
            current.id().clone(),
            current.name().clone(),
            current.email().clone(),
        )
        .avatar(current.avatar().cloned())
        .role(role)
        .created_at(current.created_at())
        .build();
        Ok(1)
    }

    async fn update_avatar(
        &self,
        id: &UserId,
        avatar: &AvatarUrl,
    ) -> Result<u64, UserPersistenceError> {
        let mut tables = lock(&self.tables);
        let Some(row) = tables.user_mut(id) else {
            return Ok(0);
        };
        row.user = row.user.clone().with_avatar(avatar.clone());
        Ok(1)
    }

    async fn delete(&self, id: &UserId) -> Result<u64, UserPersistenceError> {
        let mut tables = lock(&self.tables);
        let before = tables.users.len();
        tables.users.retain(|row| row.user.id() != id);
        let removed = (before - tables.users.len()) as u64;
        if removed > 0 {
            tables.recipes.retain(|recipe| &recipe.user_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl RecipeRepository for InMemoryStore {
    async fn insert(&self, recipe: &Recipe) -> Result<(), RecipePersistenceError> {
        let mut tables = lock(&self.tables);
        if !tables.users.iter().any(|row| row.user.id() == &recipe.user_id) {
            return Err(RecipePersistenceError::missing_owner(
                recipe.user_id.to_string(),
            ));
        }
        tables.recipes.push(recipe.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &RecipeId) -> Result<Option<Recipe>, RecipePersistenceError> {
        Ok(lock(&self.tables)
            .recipes
            .iter()
            .find(|recipe| &recipe.id == id)
            .cloned())
    }

    async fn find_page(
        &self,
        window: PageWindow,
    ) -> Result<(Vec<Recipe>, u64), RecipePersistenceError> {
        let rows = lock(&self.tables).sorted_recipes(None);
        Ok((window_slice(&rows, window), rows.len() as u64))
    }

    async fn find_page_by_owner(
        &self,
        user_id: &UserId,
        window: PageWindow,
    ) -> Result<(Vec<Recipe>, u64), RecipePersistenceError> {
        let rows = lock(&self.tables).sorted_recipes(Some(user_id));
        Ok((window_slice(&rows, window), rows.len() as u64))
    }

    async fn update(
        &self,
        id: &RecipeId,
        patch: &RecipePatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Recipe>, RecipePersistenceError> {
        let mut tables = lock(&self.tables);
        let Some(recipe) = tables.recipes.iter_mut().find(|recipe| &recipe.id == id) else {
            return Ok(None);
        };
        if let Some(title) = patch.title.clone() {
            recipe.title = title;
        }
        if let Some(description) = patch.description.clone() {
            recipe.description = description;
        }
        if let Some(ingredients) = patch.ingredients.clone() {
            recipe.ingredients = ingredients;
        }
        if let Some(instructions) = patch.instructions.clone() {
            recipe.instructions = instructions;
        }
        if let Some(minutes) = patch.cook_time_minutes {
            recipe.cook_time_minutes = Some(minutes);
        }
        recipe.updated_at = updated_at;
        Ok(Some(recipe.clone()))
    }

    async fn delete(&self, id: &RecipeId) -> Result<u64, RecipePersistenceError> {
        let mut tables = lock(&self.tables);
        let before = tables.recipes.len();
        tables.recipes.retain(|recipe| &recipe.id != id);
        Ok((before - tables.recipes.len()) as u64)
    }
}

/// Fast, deterministic stand-in for bcrypt.
///
/// Hashes are salted with a fixed prefix so stored values never equal the
/// plaintext.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestPasswordHasher;

const DIGEST_PREFIX: &str = "sha256$";

fn digest(password: &PlainPassword) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"test-support-salt:");
    hasher.update(password.expose().as_bytes());
    format!("{DIGEST_PREFIX}{}", hex::encode(hasher.finalize()))
}

#[async_trait]
impl PasswordHasher for DigestPasswordHasher {
    async fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, CredentialError> {
        Ok(PasswordHash::new(digest(password)))
    }

    async fn verify(
        &self,
        password: &PlainPassword,
        hash: &PasswordHash,
    ) -> Result<bool, CredentialError> {
        if !hash.as_str().starts_with(DIGEST_PREFIX) {
            return Err(CredentialError::hashing("unrecognised hash format"));
        }
        Ok(digest(password) == hash.as_str())
    }
}

const TOKEN_PREFIX: &str = "fixture";
const TOKEN_TTL_SECS: i64 = 3_600;

/// Token issuer producing readable `fixture:<id>:<role>:<email>` tokens.
///
/// Verified claims always expire an hour from now; tokens carry the role at
/// issue time like real ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureTokenIssuer;

impl FixtureTokenIssuer {
    /// Token the issuer would hand out for `user`.
    pub fn token_for(user: &User) -> String {
        format!(
            "{TOKEN_PREFIX}:{}:{}:{}",
            user.id(),
            user.role().as_str(),
            user.email()
        )
    }
}

impl TokenIssuer for FixtureTokenIssuer {
    fn issue(&self, user: &User) -> Result<SessionToken, TokenError> {
        Ok(SessionToken::bearer(Self::token_for(user), TOKEN_TTL_SECS.unsigned_abs()))
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut parts = token.splitn(4, ':');
        let (Some(TOKEN_PREFIX), Some(id), Some(role), Some(email)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::invalid("unrecognised token layout"));
        };
        let user_id = UserId::new(id).map_err(|err| TokenError::invalid(err.to_string()))?;
        let role = role
            .parse::<Role>()
            .map_err(|err| TokenError::invalid(err.to_string()))?;
        let email = Email::new(email).map_err(|err| TokenError::invalid(err.to_string()))?;
        Ok(TokenClaims {
            user_id,
            email,
            role,
            expires_at: Utc::now() + TimeDelta::seconds(TOKEN_TTL_SECS),
        })
    }
}

/// Image host double recording what it was sent.
pub struct RecordingUploader {
    failure: Option<ImageUploadError>,
    omit_created_at: bool,
    sources: Mutex<Vec<String>>,
}

impl RecordingUploader {
    /// Uploader that accepts every payload.
    pub fn accepting() -> Self {
        Self {
            failure: None,
            omit_created_at: false,
            sources: Mutex::new(Vec::new()),
        }
    }

    /// Uploader that fails every upload with `error`.
    pub fn failing(error: ImageUploadError) -> Self {
        Self {
            failure: Some(error),
            ..Self::accepting()
        }
    }

    /// Uploader whose receipts lack a creation timestamp.
    pub fn without_timestamps() -> Self {
        Self {
            omit_created_at: true,
            ..Self::accepting()
        }
    }

    /// Upload sources received so far.
    pub fn sources(&self) -> Vec<String> {
        lock(&self.sources).clone()
    }
}

#[async_trait]
impl ImageUploader for RecordingUploader {
    async fn upload(&self, payload: &AvatarPayload) -> Result<UploadReceipt, ImageUploadError> {
        if let Some(error) = self.failure.clone() {
            return Err(error);
        }
        let mut sources = lock(&self.sources);
        sources.push(payload.as_upload_source().to_owned());
        Ok(UploadReceipt {
            secure_url: format!("https://images.example.test/avatars/{}.png", sources.len()),
            created_at: (!self.omit_created_at).then(Utc::now),
        })
    }
}

/// Clock that only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward.
    pub fn advance_seconds(&self, seconds: i64) {
        *lock(&self.0) += TimeDelta::seconds(seconds);
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0)
    }
}

/// Fully wired HTTP state over the in-memory adapters.
pub struct TestBackend {
    /// Shared tables.
    pub store: Arc<InMemoryStore>,
    /// Image host double.
    pub uploader: Arc<RecordingUploader>,
    /// Time source for both directories.
    pub clock: Arc<MutableClock>,
    /// State to register with the app.
    pub state: HttpState,
}

impl TestBackend {
    /// Backend whose image host accepts every upload.
    pub fn new() -> Self {
        Self::with_uploader(RecordingUploader::accepting())
    }

    /// Backend using a specific image host double.
    pub fn with_uploader(uploader: RecordingUploader) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let uploader = Arc::new(uploader);
        let clock = Arc::new(MutableClock::new(
            Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53)
                .single()
                .unwrap_or_else(Utc::now),
        ));
        let tokens = Arc::new(FixtureTokenIssuer);
        let users = UserDirectoryService::new(
            Arc::clone(&store),
            Arc::new(DigestPasswordHasher),
            Arc::clone(&tokens),
            Arc::clone(&uploader),
            clock.clone(),
        );
        let recipes = RecipeDirectoryService::new(Arc::clone(&store), clock.clone());
        let state = HttpState::new(Arc::new(users), Arc::new(recipes), tokens);
        Self {
            store,
            uploader,
            clock,
            state,
        }
    }
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new()
    }
}

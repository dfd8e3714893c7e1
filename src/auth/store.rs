use cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use super::{User, UserRole};
use crate::config::CookieConfig;

// Cookie names the gate reads back on every request.
pub const AUTH_TOKEN_COOKIE: &str = "auth-token";
pub const USER_ID_COOKIE: &str = "user-id";

/// Snapshot of the store written to durable storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedAuth {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_authenticated: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("auth storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("auth storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable backing for the auth store.
pub trait AuthStorage: Send + Sync {
    fn save(&self, state: &PersistedAuth) -> Result<(), StoreError>;
    fn load(&self) -> Result<Option<PersistedAuth>, StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// JSON file persistence.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AuthStorage for JsonFileStorage {
    fn save(&self, state: &PersistedAuth) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<PersistedAuth>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn clear(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// In-memory persistence, for tests and ephemeral embedders.
#[derive(Default)]
pub struct MemoryStorage {
    state: Mutex<Option<PersistedAuth>>,
}

impl AuthStorage for MemoryStorage {
    fn save(&self, state: &PersistedAuth) -> Result<(), StoreError> {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = Some(state.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<PersistedAuth>, StoreError> {
        Ok(self.state.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

/// Shallow patch applied over the current user profile.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
}

/// Client-side auth state: the signed-in user and bearer token, persisted
/// across reloads.
///
/// Cookie synchronization is an explicit step rather than a side effect of
/// the mutators: call [`AuthStore::publish_to_cookies`] after a mutation
/// (or after [`AuthStore::rehydrate`]) to obtain the cookies the gate reads
/// on subsequent requests.
pub struct AuthStore {
    user: Option<User>,
    token: Option<String>,
    cookies: CookieConfig,
    storage: Box<dyn AuthStorage>,
}

impl AuthStore {
    pub fn new(storage: Box<dyn AuthStorage>, cookies: CookieConfig) -> Self {
        Self {
            user: None,
            token: None,
            cookies,
            storage,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    /// Record a successful sign-in or sign-up.
    pub fn set_auth(&mut self, user: User, token: String) -> Result<(), StoreError> {
        self.user = Some(user);
        self.token = Some(token);
        self.persist()
    }

    /// Sign out: drop memory state and the persisted snapshot.
    pub fn clear_auth(&mut self) -> Result<(), StoreError> {
        self.user = None;
        self.token = None;
        self.storage.clear()
    }

    /// Shallow-merge a patch into the current user. No-op when signed out.
    pub fn update_user(&mut self, patch: UserPatch) -> Result<(), StoreError> {
        let Some(user) = self.user.as_mut() else {
            return Ok(());
        };

        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(username) = patch.username {
            user.username = username;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }

        self.persist()
    }

    /// Reload persisted state, the process-start equivalent of a page
    /// reload. Publish cookies afterwards so cookie state cannot drift from
    /// what was persisted.
    pub fn rehydrate(&mut self) -> Result<(), StoreError> {
        if let Some(state) = self.storage.load()? {
            self.user = state.user;
            self.token = state.token;
        }
        Ok(())
    }

    /// The explicit cookie synchronization step. Authenticated state yields
    /// the `auth-token` and `user-id` cookies; signed-out state yields their
    /// removals.
    pub fn publish_to_cookies(&self) -> Vec<Cookie<'static>> {
        match (&self.user, &self.token) {
            (Some(user), Some(token)) => vec![
                self.build_cookie(AUTH_TOKEN_COOKIE, token.clone()),
                self.build_cookie(USER_ID_COOKIE, user.id.clone()),
            ],
            _ => vec![
                self.removal_cookie(AUTH_TOKEN_COOKIE),
                self.removal_cookie(USER_ID_COOKIE),
            ],
        }
    }

    fn build_cookie(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .secure(self.cookies.secure)
            .same_site(SameSite::Strict)
            .max_age(CookieDuration::days(self.cookies.ttl_days))
            .build()
    }

    fn removal_cookie(&self, name: &'static str) -> Cookie<'static> {
        Cookie::build((name, ""))
            .path("/")
            .secure(self.cookies.secure)
            .same_site(SameSite::Strict)
            .max_age(CookieDuration::ZERO)
            .build()
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.storage.save(&PersistedAuth {
            user: self.user.clone(),
            token: self.token.clone(),
            is_authenticated: self.is_authenticated(),
        })
    }
}

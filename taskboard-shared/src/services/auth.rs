/// Registration, login and identity lookup
///
/// # Flow
///
/// ```text
/// register: uniqueness (store constraint) → hash → insert → {id, email}
/// login:    lookup → verify → issue token  → {access_token}
/// ```
///
/// Login never says which half of the credentials was wrong. When the email
/// is unknown the password is still verified, against a dummy hash, so both
/// failure paths cost the same.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    auth::{jwt::TokenIssuer, password},
    error::{ServiceError, ServiceResult},
    models::user::{CreateUser, Role, UserProfile},
    store::Store,
};

/// Result of a successful registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registered {
    pub id: Uuid,
    pub email: String,
}

/// Result of a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
}

/// All identities plus per-role counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDirectory {
    pub total: usize,
    pub admins: usize,
    pub users: usize,
    pub items: Vec<UserProfile>,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    tokens: TokenIssuer,
    bootstrap_first_admin: bool,
}

/// Runs a CPU-heavy Argon2 call off the async workers
async fn blocking<T, F>(f: F) -> ServiceResult<T>
where
    F: FnOnce() -> Result<T, password::PasswordError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServiceError::Internal(format!("password task failed: {}", e)))?
        .map_err(ServiceError::from)
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, tokens: TokenIssuer) -> Self {
        Self {
            store,
            tokens,
            bootstrap_first_admin: false,
        }
    }

    /// Grants `admin` to the very first registered identity
    pub fn with_first_user_admin(mut self, enabled: bool) -> Self {
        self.bootstrap_first_admin = enabled;
        self
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Creates a new identity with role `user`
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty name, malformed email or empty password
    /// - `Conflict` if the email is already registered
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> ServiceResult<Registered> {
        let name = name.trim();
        let email = email.trim();

        if name.is_empty() {
            return Err(ServiceError::invalid("name", "Name is required"));
        }
        if !looks_like_email(email) {
            return Err(ServiceError::invalid("email", "Invalid email format"));
        }

        if self.store.find_user_by_email(email).await?.is_some() {
            debug!("Registration rejected: email taken");
            return Err(ServiceError::Conflict("Email already exists".to_string()));
        }

        let plaintext = password.to_string();
        let password_hash = blocking(move || password::hash_password(&plaintext)).await?;

        // The store's unique constraint still catches a concurrent duplicate.
        let user = self
            .store
            .insert_user(CreateUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
                role: Role::User,
                promote_if_first: self.bootstrap_first_admin,
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, "User registered");

        Ok(Registered {
            id: user.id,
            email: user.email,
        })
    }

    /// Verifies credentials and issues a token
    ///
    /// # Errors
    ///
    /// `Unauthorized` for an unknown email and for a wrong password alike.
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<AccessToken> {
        let user = self.store.find_user_by_email(email.trim()).await?;

        let stored_hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| password::dummy_hash().to_string());
        let plaintext = password.to_string();
        let valid = blocking(move || password::verify_password(&plaintext, &stored_hash)).await;

        let user = match (user, valid) {
            (Some(user), Ok(true)) => user,
            (Some(user), Err(e)) => {
                warn!(user_id = %user.id, error = %e, "Stored password hash is unusable");
                return Err(ServiceError::Unauthorized);
            }
            _ => {
                debug!("Login rejected");
                return Err(ServiceError::Unauthorized);
            }
        };

        let access_token = self.tokens.issue(user.id, &user.email, user.role)?;

        info!(user_id = %user.id, "User logged in");
        Ok(AccessToken { access_token })
    }

    /// Public profile of an identity
    pub async fn profile(&self, user_id: Uuid) -> ServiceResult<UserProfile> {
        self.store
            .find_user_by_id(user_id)
            .await?
            .map(|user| UserProfile::from(&user))
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    /// Every identity, newest first, with role counts
    pub async fn list_users(&self) -> ServiceResult<UserDirectory> {
        let items: Vec<UserProfile> = self
            .store
            .list_users()
            .await?
            .iter()
            .map(UserProfile::from)
            .collect();

        let admins = items.iter().filter(|u| u.role == Role::Admin).count();

        Ok(UserDirectory {
            total: items.len(),
            admins,
            users: items.len() - admins,
            items,
        })
    }
}

/// Cheap structural check; the API layer runs the full validator first
fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: HS256 token issuing and verification
/// - [`middleware`]: Axum bearer-token guard and role checks
///
/// # Example
///
/// ```no_run
/// use chrono::Duration;
/// use taskboard_shared::auth::{jwt::TokenIssuer, password::{hash_password, verify_password}};
/// use taskboard_shared::models::user::Role;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("secret123")?;
/// assert!(verify_password("secret123", &hash)?);
///
/// let issuer = TokenIssuer::new("a-secret-that-is-at-least-32-bytes!", Duration::hours(24));
/// let token = issuer.issue(Uuid::new_v4(), "ana@x.com", Role::User)?;
/// let claims = issuer.verify(&token)?;
/// assert_eq!(claims.email, "ana@x.com");
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;

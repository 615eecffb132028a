//! Taskboard client library
//!
//! - [`token_store`]: where the access token lives between runs
//! - [`session`]: the explicit, decoded view of the current login
//! - [`api`]: typed HTTP client for every API endpoint
//! - [`config`]: environment-driven client settings

pub mod api;
pub mod config;
pub mod session;
pub mod token_store;
pub mod types;

pub use api::{ApiClient, ClientError};
pub use session::{Role, Session, SessionClaims};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};

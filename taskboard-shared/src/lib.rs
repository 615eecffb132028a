//! # Taskboard Shared Library
//!
//! Domain types, storage and business logic used by the Taskboard API
//! server.
//!
//! ## Module Organization
//!
//! - `models`: users and tasks, with their SQL operations
//! - `db`: connection pool and embedded migrations
//! - `store`: storage trait with PostgreSQL and in-memory backends
//! - `auth`: password hashing, tokens, request guard
//! - `services`: auth and task services
//! - `error`: service error taxonomy

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Business logic over a [`Store`](crate::store::Store)
///
/// - [`auth::AuthService`]: registration, login, identity lookup
/// - [`tasks::TaskService`]: owner-scoped task CRUD

pub mod auth;
pub mod tasks;

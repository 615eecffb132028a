/// Database models
///
/// - `user`: identities, roles and the public profile view
/// - `task`: owner-scoped tasks and their status
///
/// Each model carries its own PostgreSQL queries as associated functions
/// taking a `&PgPool`; [`PgStore`](crate::store::postgres::PgStore) wires
/// them into the [`Store`](crate::store::Store) trait.

pub mod task;
pub mod user;

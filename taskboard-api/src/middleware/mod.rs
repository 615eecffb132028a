/// Middleware modules for the API server
///
/// Authentication lives in `taskboard_shared::auth::middleware`; this crate
/// only adds response hardening.

pub mod security;

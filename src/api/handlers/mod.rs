//! API request handlers.

/// Admin-only handlers.
pub mod admin;
/// Registration, login, logout and refresh.
pub mod auth;
/// Market data lookup.
pub mod market;
/// Current-user handlers.
pub mod user;

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server is running", body = String)
    ),
    tag = "health"
)]
pub async fn health() -> &'static str {
    "OK"
}

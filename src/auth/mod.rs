//! Authentication for the Aurum API.
//!
//! # Module Structure
//!
//! - [`auth::validation`](crate::auth::validation) - username, email and password rules
//! - [`auth::password`](crate::auth::password) - Argon2id password hashing
//! - [`auth::jwt`](crate::auth::jwt) - session token issue, verification and refresh
//! - [`auth::clock`](crate::auth::clock) - time source used for token expiry
//! - [`auth::cookie`](crate::auth::cookie) - the `access_token` cookie and token extraction
//! - [`auth::service`](crate::auth::service) - registration, login and refresh flows
//! - [`auth::middleware`](crate::auth::middleware) - route gates and the [`Session`] extractor
//!
//! # Sessions
//!
//! Tokens are HS256-signed and valid for 60 minutes by default. Clients
//! receive them in an HTTP-only `access_token` cookie; requests may also
//! present them as `Authorization: Bearer <token>`. The cookie wins when both
//! are present.
//!
//! ```ignore
//! async fn me(session: Session) -> String {
//!     format!("Hello, {}!", session.username)
//! }
//! ```
//!
//! # Configuration
//!
//! Configure via `aurum.toml`:
//! ```toml
//! [auth]
//! jwt_secret_env = "JWT_SIGNING_KEY"  # env var holding the HMAC secret
//! token_ttl_secs = 3600
//! secure_cookies = true
//! ```

/// Time source for token issuance and expiry.
pub mod clock;
/// Session cookie construction and token extraction.
pub mod cookie;
/// Session token signing and verification.
pub mod jwt;
/// Authentication middleware and extractors for protected routes.
pub mod middleware;
/// Password hashing.
pub mod password;
/// Registration, login and refresh orchestration.
pub mod service;
/// Credential validation rules.
pub mod validation;

pub use middleware::{Admin, Session};
pub use service::{AuthService, LoginOutcome};

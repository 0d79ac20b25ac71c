//! HTTP API Handlers and Routes
//!
//! # Module Structure
//!
//! - [`api::extract`](crate::api::extract) - JSON body extractor with API-shaped rejections
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//! - [`api::openapi`](crate::api::openapi) - OpenAPI document
//!
//! # API Endpoints
//!
//! ## Public
//! - `GET /health` - Liveness check, plain `OK`
//! - `POST /api/register` - Register a new user
//! - `POST /api/login` - Login and receive the session cookie
//! - `POST /api/logout` - Clear the session cookie
//! - `POST /api/refresh` - Replace the session token with a fresh one
//! - `GET /api/openapi.json` - This API's OpenAPI document
//!
//! ## Session required
//! - `GET /api/me` - Current user
//! - `GET /api/stock?type=<instrument>` - Daily prices for an instrument
//!
//! ## Admin only
//! - `GET /api/admin/users/{id}` - Any user by id
//!
//! # Authentication
//!
//! Protected endpoints accept the `access_token` cookie set by login, or the
//! same token in the `Authorization` header:
//! ```text
//! Authorization: Bearer <token>
//! ```

/// Request extractors.
pub mod extract;
/// Request and response handlers for all API endpoints.
pub mod handlers;
/// OpenAPI document.
pub mod openapi;
/// Router configuration and route definitions.
pub mod routes;

//! # Aurum
//!
//! A small HTTP backend: user registration and login, stateless cookie/JWT
//! sessions with refresh, and a read-only price lookup for precious metals
//! backed by CSV files.
//!
//! Aurum can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `aurum-server` binary
//! 2. **As a library** - Build an [`AppState`] and mount [`api::routes::app`]
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use aurum::{AppState, AurumConfig, MarketData};
//! use aurum::auth::clock::SystemClock;
//! use aurum::db::DatabaseProvider;
//! use std::sync::Arc;
//!
//! let config = AurumConfig::default();
//! let store = DatabaseProvider::Memory.create_client().await?;
//! let market = MarketData::load(&config.market.assets_dir, &config.market.instruments)?;
//! let state = AppState::new(config, "signing-secret", store, Arc::new(SystemClock), market)?;
//!
//! let app = aurum::api::routes::app(state);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `local-db` | Local SQLite database (default) |
//! | `turso` | Remote Turso database |
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers and routes
//! - [`auth`] - Validation, hashing, session tokens and middleware
//! - [`db`] - User store abstraction (SQLite, Turso)
//! - [`market`] - CSV-backed market data
//! - [`types`] - Common types and error handling

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Authentication: validation, hashing, tokens and middleware.
pub mod auth;
/// Command line parsing and output.
pub mod cli;
/// User store abstraction and libsql implementation.
pub mod db;
/// Read-only market price series.
pub mod market;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use db::TursoClient;
pub use market::MarketData;
pub use types::{AppError, Result};
pub use utils::toml_config::AurumConfig;

use crate::auth::clock::Clock;
use crate::auth::jwt::TokenService;
use crate::auth::password::Argon2Hasher;
use crate::auth::AuthService;
use crate::db::UserStore;
use axum::extract::FromRef;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone, FromRef)]
pub struct AppState {
    /// TOML-based server configuration
    pub config: Arc<AurumConfig>,
    /// Session token signing and verification
    pub tokens: Arc<TokenService>,
    /// Registration, login and refresh flows
    pub auth: Arc<AuthService>,
    /// Price series loaded at startup
    pub market: Arc<MarketData>,
}

impl AppState {
    /// Wire the services together. Every collaborator is passed in explicitly.
    pub fn new(
        config: AurumConfig,
        secret: &str,
        store: Arc<dyn UserStore>,
        clock: Arc<dyn Clock>,
        market: MarketData,
    ) -> Result<Self> {
        let tokens = Arc::new(TokenService::new(secret, config.token_ttl(), clock));
        let hasher = Argon2Hasher::new(config.auth.hash_memory_kib, config.auth.hash_iterations)?;
        let auth = Arc::new(AuthService::new(store, tokens.clone(), hasher));

        Ok(Self {
            config: Arc::new(config),
            tokens,
            auth,
            market: Arc::new(market),
        })
    }
}

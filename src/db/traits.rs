//! Database abstraction traits
//!
//! This module provides the `UserStore` trait that abstracts over the
//! storage backends (in-memory SQLite, file-based SQLite, remote Turso).
//!
//! # Example
//!
//! ```rust,ignore
//! use aurum::db::DatabaseProvider;
//!
//! // Use in-memory database (default for development/testing)
//! let store = DatabaseProvider::Memory.create_client().await?;
//!
//! // Use file-based SQLite
//! let store = DatabaseProvider::SQLite { path: "data.db".into() }.create_client().await?;
//! ```

use crate::types::{NewUser, Result, User};
use async_trait::async_trait;
use std::sync::Arc;

/// Database provider configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DatabaseProvider {
    /// In-memory SQLite database (ephemeral, lost on restart)
    #[default]
    Memory,
    /// File-based SQLite database
    SQLite {
        /// Path to the SQLite database file
        path: String,
    },
    /// Remote Turso database (requires network access)
    #[cfg(feature = "turso")]
    Turso {
        /// The Turso database URL (e.g., `libsql://your-db.turso.io`)
        url: String,
        /// Authentication token for the Turso database
        auth_token: String,
    },
}

impl DatabaseProvider {
    /// Create a user store from this provider configuration
    pub async fn create_client(&self) -> Result<Arc<dyn UserStore>> {
        match self {
            DatabaseProvider::Memory => {
                let client = super::turso::TursoClient::new_memory().await?;
                Ok(Arc::new(client))
            }
            DatabaseProvider::SQLite { path } => {
                let client = super::turso::TursoClient::new_local(path).await?;
                Ok(Arc::new(client))
            }
            #[cfg(feature = "turso")]
            DatabaseProvider::Turso { url, auth_token } => {
                let client =
                    super::turso::TursoClient::new_remote(url.clone(), auth_token.clone()).await?;
                Ok(Arc::new(client))
            }
        }
    }

    /// Pick a provider from a configured database URL.
    ///
    /// `:memory:` (or an empty string) selects the in-memory store, anything
    /// else is treated as a file path.
    pub fn from_url(url: &str) -> Self {
        if url.is_empty() || url == ":memory:" {
            DatabaseProvider::Memory
        } else {
            DatabaseProvider::SQLite {
                path: url.to_string(),
            }
        }
    }
}

/// Persistence contract for user records.
///
/// Implementations are the final authority on username and email uniqueness:
/// `save` must fail with `AppError::UsernameTaken` or `AppError::EmailTaken`
/// when a unique key is already present, whatever callers checked beforehand.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user and return it with its assigned identifier
    async fn save(&self, user: NewUser) -> Result<User>;

    /// Find a user whose username or email equals `identifier`
    async fn find_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;

    /// Find a user by identifier
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;
}

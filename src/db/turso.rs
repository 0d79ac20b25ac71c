use crate::db::traits::UserStore;
use crate::types::{AppError, NewUser, Result, Role, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Builder, Connection, Database, Row, Value};

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at, last_login";

/// libsql-backed user store (in-memory, local file or remote Turso).
pub struct TursoClient {
    /// Owning handle for the database behind `conn`; dropped with the client.
    _db: Database,
    conn: Connection,
}

impl TursoClient {
    /// Open an ephemeral in-memory database.
    pub async fn new_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open in-memory database: {}", e)))?;

        Self::from_database(db).await
    }

    /// Open (or create) a SQLite database file.
    pub async fn new_local(path: &str) -> Result<Self> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Database(format!("Failed to create database directory: {}", e))
                })?;
            }
        }

        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database {}: {}", path, e)))?;

        Self::from_database(db).await
    }

    /// Connect to a remote Turso database.
    pub async fn new_remote(url: String, auth_token: String) -> Result<Self> {
        let db = Builder::new_remote(url, auth_token)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Turso: {}", e)))?;

        Self::from_database(db).await
    }

    async fn from_database(db: Database) -> Result<Self> {
        // In-memory databases live as long as the connection, so one is kept
        // for the lifetime of the client and cloned per operation.
        let conn = db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))?;

        let client = Self { _db: db, conn };
        client.initialize_schema().await?;

        Ok(client)
    }

    pub fn connection(&self) -> Connection {
        self.conn.clone()
    }

    async fn initialize_schema(&self) -> Result<()> {
        let conn = self.connection();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'user',
                created_at INTEGER NOT NULL,
                last_login INTEGER
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create users table: {}", e)))?;

        Ok(())
    }

    async fn query_one(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Option<User>> {
        let conn = self.connection();

        let mut rows = conn
            .query(sql, params)
            .await
            .map_err(|e| AppError::Database(format!("Failed to query user: {}", e)))?;

        match rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(row) => Ok(Some(user_from_row(&row)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl UserStore for TursoClient {
    async fn save(&self, user: NewUser) -> Result<User> {
        let now = Utc::now().timestamp();
        let sql = format!(
            "INSERT INTO users (username, email, password_hash, role, created_at)
             VALUES (?, ?, ?, ?, ?)
             RETURNING {}",
            USER_COLUMNS
        );

        let mut rows = self
            .connection()
            .query(
                &sql,
                (
                    user.username.as_str(),
                    user.email.as_str(),
                    user.password_hash.as_str(),
                    user.role.as_str(),
                    now,
                ),
            )
            .await
            .map_err(map_write_error)?;

        let row = rows
            .next()
            .await
            .map_err(map_write_error)?
            .ok_or_else(|| AppError::Database("Insert returned no row".to_string()))?;

        user_from_row(&row)
    }

    async fn find_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE username = ? OR email = ? LIMIT 1",
            USER_COLUMNS
        );
        self.query_one(&sql, (identifier, identifier)).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = ? LIMIT 1", USER_COLUMNS);
        self.query_one(&sql, [id]).await
    }
}

/// Translate unique-key violations into the user-facing duplicate errors.
fn map_write_error(e: libsql::Error) -> AppError {
    let message = e.to_string();
    if message.contains("UNIQUE constraint failed") {
        if message.contains("users.username") {
            return AppError::UsernameTaken;
        }
        if message.contains("users.email") {
            return AppError::EmailTaken;
        }
    }
    AppError::Database(format!("Failed to create user: {}", message))
}

fn user_from_row(row: &Row) -> Result<User> {
    let role: String = row.get(4).map_err(|e| AppError::Database(e.to_string()))?;
    let created_at: i64 = row.get(5).map_err(|e| AppError::Database(e.to_string()))?;
    let last_login = match row
        .get_value(6)
        .map_err(|e| AppError::Database(e.to_string()))?
    {
        Value::Null => None,
        Value::Integer(secs) => Some(secs),
        other => {
            return Err(AppError::Database(format!(
                "Unexpected last_login value: {:?}",
                other
            )))
        }
    };

    Ok(User {
        id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
        username: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
        email: row.get(2).map_err(|e| AppError::Database(e.to_string()))?,
        password_hash: row.get(3).map_err(|e| AppError::Database(e.to_string()))?,
        role: role.parse::<Role>()?,
        created_at: timestamp(created_at)?,
        last_login: last_login.map(timestamp).transpose()?,
    })
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| AppError::Database(format!("Invalid timestamp {}", secs)))
}

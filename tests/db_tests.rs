//! User store integration tests
//!
//! Exercise TursoClient against in-memory and file-backed SQLite.

use aurum::{
    db::{DatabaseProvider, TursoClient, UserStore},
    types::{AppError, NewUser, Role},
};
use std::sync::Arc;

/// Test helper to create a TursoClient with in-memory database
async fn create_test_client() -> TursoClient {
    TursoClient::new_memory()
        .await
        .expect("Failed to create in-memory database")
}

fn new_user(username: &str, email: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$v=19$m=1024,t=1,p=1$c2FsdA$aGFzaA".to_string(),
        role: Role::User,
    }
}

#[tokio::test]
async fn test_save_and_find() {
    let client = create_test_client().await;

    let saved = client
        .save(new_user("alice", "alice@example.com"))
        .await
        .expect("should save");

    assert_eq!(saved.username, "alice");
    assert_eq!(saved.role, Role::User);
    assert!(saved.last_login.is_none());

    let found = client.find_by_id(saved.id).await.unwrap().unwrap();
    assert_eq!(found.email, "alice@example.com");
    assert_eq!(found.password_hash, saved.password_hash);
    assert_eq!(found.created_at, saved.created_at);
}

#[tokio::test]
async fn test_lookup_is_exact_match() {
    let client = create_test_client().await;
    client.save(new_user("alice", "alice@example.com")).await.unwrap();

    assert!(client.find_by_username_or_email("ali").await.unwrap().is_none());
    assert!(client
        .find_by_username_or_email("alice@example")
        .await
        .unwrap()
        .is_none());
    assert!(client.find_by_username_or_email("").await.unwrap().is_none());
}

#[tokio::test]
async fn test_admin_role_persists() {
    let client = create_test_client().await;
    let mut admin = new_user("root", "root@example.com");
    admin.role = Role::Admin;

    let saved = client.save(admin).await.unwrap();
    let found = client.find_by_username_or_email("root").await.unwrap().unwrap();

    assert_eq!(saved.role, Role::Admin);
    assert_eq!(found.role, Role::Admin);
}

#[tokio::test]
async fn test_unknown_role_in_storage_is_an_error() {
    let client = create_test_client().await;
    let saved = client.save(new_user("alice", "alice@example.com")).await.unwrap();

    client
        .connection()
        .execute("UPDATE users SET role = 'superuser' WHERE id = ?", [saved.id])
        .await
        .unwrap();

    assert!(matches!(
        client.find_by_id(saved.id).await,
        Err(AppError::Database(_))
    ));
}

#[tokio::test]
async fn test_concurrent_duplicate_saves() {
    let client = Arc::new(create_test_client().await);

    let a = {
        let client = client.clone();
        tokio::spawn(async move { client.save(new_user("racer", "a@example.com")).await })
    };
    let b = {
        let client = client.clone();
        tokio::spawn(async move { client.save(new_user("racer", "b@example.com")).await })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(AppError::UsernameTaken))));
}

#[tokio::test]
async fn test_file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("aurum.db");
    let path = path.to_str().unwrap();

    let id = {
        let client = TursoClient::new_local(path).await.expect("should open");
        client
            .save(new_user("alice", "alice@example.com"))
            .await
            .unwrap()
            .id
    };

    let reopened = TursoClient::new_local(path).await.expect("should reopen");
    let found = reopened.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(found.username, "alice");

    // Uniqueness holds across sessions.
    assert!(matches!(
        reopened.save(new_user("alice", "other@example.com")).await,
        Err(AppError::UsernameTaken)
    ));
}

#[tokio::test]
async fn test_provider_creates_working_store() {
    let store = DatabaseProvider::from_url(":memory:")
        .create_client()
        .await
        .expect("should create store");

    let saved = store.save(new_user("bob", "bob@example.com")).await.unwrap();
    assert!(store.find_by_id(saved.id).await.unwrap().is_some());
}

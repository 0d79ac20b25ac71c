use crate::auth::jwt::TokenService;
use crate::auth::password::Argon2Hasher;
use crate::auth::validation::{validate_email, validate_password, validate_username};
use crate::db::traits::UserStore;
use crate::types::{
    AppError, NewUser, PublicUser, RegisterRequest, Result, Role, ValidationError,
    ValidationErrors,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: PublicUser,
    pub token: String,
}

/// Orchestrates registration, login and session refresh.
pub struct AuthService {
    store: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
    hasher: Argon2Hasher,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, tokens: Arc<TokenService>, hasher: Argon2Hasher) -> Self {
        Self {
            store,
            tokens,
            hasher,
        }
    }

    /// Register a new account.
    ///
    /// Every field is checked before anything else happens and all failures are
    /// reported together. The username/email pre-check only gives a friendlier
    /// answer; the store's unique keys decide when two registrations race.
    pub async fn register(&self, req: &RegisterRequest) -> Result<PublicUser> {
        let mut errors = ValidationErrors::new();
        errors.record(validate_username(&req.username));
        errors.record(validate_email(&req.email));
        errors.record(validate_password(&req.password));
        if let Some(confirmation) = &req.password2 {
            if confirmation != &req.password {
                errors.push(ValidationError::new("password2", "mismatch"));
            }
        }
        errors.into_result()?;

        if self
            .store
            .find_by_username_or_email(&req.username)
            .await?
            .is_some()
        {
            return Err(AppError::UsernameTaken);
        }
        if self
            .store
            .find_by_username_or_email(&req.email)
            .await?
            .is_some()
        {
            return Err(AppError::EmailTaken);
        }

        let password_hash = self.hasher.hash_password(&req.password)?;

        let user = self
            .store
            .save(NewUser {
                username: req.username.clone(),
                email: req.email.clone(),
                password_hash,
                role: Role::default(),
            })
            .await?;

        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(PublicUser::from(&user))
    }

    /// Authenticate with a username or email and issue a session token.
    ///
    /// Unknown identifiers and wrong passwords yield the same error.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<LoginOutcome> {
        let mut errors = ValidationErrors::new();
        if identifier.trim().is_empty() {
            errors.push(ValidationError::new("identifier", "required"));
        }
        if password.is_empty() {
            errors.push(ValidationError::new("password", "required"));
        }
        errors.into_result()?;

        let Some(user) = self.store.find_by_username_or_email(identifier).await? else {
            debug!("login attempt for unknown identifier");
            return Err(AppError::InvalidCredentials);
        };

        if !self.hasher.verify_password(password, &user.password_hash)? {
            debug!(user_id = user.id, "login attempt with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(user.id, &user.username, user.role)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        info!(user_id = user.id, "user logged in");
        Ok(LoginOutcome {
            user: PublicUser::from(&user),
            token,
        })
    }

    /// Exchange a valid session token for one with a fresh expiry.
    ///
    /// The account must still exist and still hold the role named in the token.
    pub async fn refresh_token(&self, token: &str) -> Result<String> {
        let claims = self.tokens.verify(token).map_err(|e| {
            debug!(error = %e, "refresh rejected");
            AppError::Unauthorized
        })?;

        match self.store.find_by_id(claims.id).await? {
            Some(user) if user.role == claims.role => {}
            Some(user) => {
                warn!(
                    user_id = user.id,
                    claimed = %claims.role,
                    current = %user.role,
                    "refresh rejected: role changed since issuance"
                );
                return Err(AppError::Unauthorized);
            }
            None => {
                warn!(user_id = claims.id, "refresh rejected: user no longer exists");
                return Err(AppError::Unauthorized);
            }
        }

        self.tokens
            .refresh(&claims)
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    /// Look up the public view of a user.
    pub async fn find_user(&self, id: i64) -> Result<PublicUser> {
        self.store
            .find_by_id(id)
            .await?
            .map(|user| PublicUser::from(&user))
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::clock::ManualClock;
    use crate::db::traits::MockUserStore;
    use crate::db::TursoClient;
    use crate::types::User;
    use chrono::{Duration, Utc};

    const STRONG: &str = "Xk9#mQ2$vL7!pR4&";

    struct Fixture {
        service: AuthService,
        store: Arc<TursoClient>,
        tokens: Arc<TokenService>,
        clock: Arc<ManualClock>,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(TursoClient::new_memory().await.unwrap());
        let clock = Arc::new(ManualClock::starting_now());
        let tokens = Arc::new(TokenService::new(
            "test-secret-key-that-is-at-least-32-chars",
            Duration::hours(1),
            clock.clone(),
        ));
        let service = AuthService::new(
            store.clone(),
            tokens.clone(),
            Argon2Hasher::new(1024, 1).unwrap(),
        );
        Fixture {
            service,
            store,
            tokens,
            clock,
        }
    }

    fn register_request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            password2: None,
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let f = fixture().await;

        let user = f
            .service
            .register(&register_request("alice", "alice@example.com", STRONG))
            .await
            .expect("should register");
        assert_eq!(user.username, "alice");

        let by_name = f.service.login("alice", STRONG).await.expect("login by username");
        let by_email = f
            .service
            .login("alice@example.com", STRONG)
            .await
            .expect("login by email");

        assert_eq!(by_name.user, user);
        assert_eq!(by_email.user, user);
        let claims = f.tokens.verify(&by_name.token).unwrap();
        assert_eq!(claims.id, user.user_id);
        assert_eq!(claims.role, Role::User);
    }

    #[tokio::test]
    async fn test_password_is_stored_hashed() {
        let f = fixture().await;
        f.service
            .register(&register_request("alice", "alice@example.com", STRONG))
            .await
            .unwrap();

        let stored = f.store.find_by_username_or_email("alice").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, STRONG);
        assert!(stored.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_register_aggregates_all_failures() {
        let f = fixture().await;
        let mut req = register_request("ab", "not-an-email", "password");
        req.password2 = Some("different".to_string());

        let err = f.service.register(&req).await.expect_err("should fail");
        let AppError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };

        let pairs: Vec<(&str, &str)> = errors
            .iter()
            .map(|e| (e.field.as_str(), e.code.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("username", "too_short"),
                ("email", "invalid_format"),
                ("password", "weak_password"),
                ("password2", "mismatch"),
            ]
        );
        assert!(f.store.find_by_username_or_email("ab").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_duplicates() {
        let f = fixture().await;
        f.service
            .register(&register_request("alice", "alice@example.com", STRONG))
            .await
            .unwrap();

        let same_name = f
            .service
            .register(&register_request("alice", "other@example.com", STRONG))
            .await;
        assert!(matches!(same_name, Err(AppError::UsernameTaken)));

        let same_email = f
            .service
            .register(&register_request("alice2", "alice@example.com", STRONG))
            .await;
        assert!(matches!(same_email, Err(AppError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_concurrent_registration_single_winner() {
        let f = fixture().await;
        let a = register_request("racer", "racer-a@example.com", STRONG);
        let b = register_request("racer", "racer-b@example.com", STRONG);

        let (ra, rb) = tokio::join!(f.service.register(&a), f.service.register(&b));

        let results = [ra, rb];
        let wins = results.iter().filter(|r| r.is_ok()).count();
        let taken = results
            .iter()
            .filter(|r| matches!(r, Err(AppError::UsernameTaken)))
            .count();
        assert_eq!(wins, 1);
        assert_eq!(taken, 1);
    }

    #[tokio::test]
    async fn test_login_does_not_reveal_which_part_failed() {
        let f = fixture().await;
        f.service
            .register(&register_request("alice", "alice@example.com", STRONG))
            .await
            .unwrap();

        let wrong_password = f.service.login("alice", "not-the-password").await.unwrap_err();
        let unknown_user = f.service.login("mallory", STRONG).await.unwrap_err();

        assert!(matches!(wrong_password, AppError::InvalidCredentials));
        assert!(matches!(unknown_user, AppError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let f = fixture().await;

        let err = f.service.login("  ", "").await.unwrap_err();
        let AppError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_token() {
        let f = fixture().await;
        f.service
            .register(&register_request("alice", "alice@example.com", STRONG))
            .await
            .unwrap();
        let login = f.service.login("alice", STRONG).await.unwrap();

        f.clock.advance(Duration::minutes(45));
        let refreshed = f.service.refresh_token(&login.token).await.expect("should refresh");

        f.clock.advance(Duration::minutes(30));
        assert!(f.tokens.verify(&login.token).is_err());
        assert!(f.tokens.verify(&refreshed).is_ok());
    }

    #[tokio::test]
    async fn test_refresh_rejects_invalid_and_expired_tokens() {
        let f = fixture().await;
        f.service
            .register(&register_request("alice", "alice@example.com", STRONG))
            .await
            .unwrap();
        let login = f.service.login("alice", STRONG).await.unwrap();

        assert!(matches!(
            f.service.refresh_token("garbage").await,
            Err(AppError::Unauthorized)
        ));

        f.clock.advance(Duration::minutes(61));
        assert!(matches!(
            f.service.refresh_token(&login.token).await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_refresh_rechecks_user_and_role() {
        let f = fixture().await;
        let user = f
            .service
            .register(&register_request("alice", "alice@example.com", STRONG))
            .await
            .unwrap();

        // Token claiming a role the account does not hold.
        let escalated = f.tokens.issue(user.user_id, "alice", Role::Admin).unwrap();
        assert!(matches!(
            f.service.refresh_token(&escalated).await,
            Err(AppError::Unauthorized)
        ));

        // Token for an account that does not exist.
        let ghost = f.tokens.issue(9_999, "ghost", Role::User).unwrap();
        assert!(matches!(
            f.service.refresh_token(&ghost).await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_find_user() {
        let f = fixture().await;
        let user = f
            .service
            .register(&register_request("alice", "alice@example.com", STRONG))
            .await
            .unwrap();

        assert_eq!(f.service.find_user(user.user_id).await.unwrap(), user);
        assert!(matches!(
            f.service.find_user(user.user_id + 1).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut store = MockUserStore::new();
        store
            .expect_find_by_username_or_email()
            .returning(|_| Ok(None));
        store
            .expect_save()
            .times(1)
            .returning(|_| Err(AppError::Database("disk I/O error".to_string())));

        let clock = Arc::new(ManualClock::starting_now());
        let tokens = Arc::new(TokenService::new("secret", Duration::hours(1), clock));
        let service = AuthService::new(
            Arc::new(store),
            tokens,
            Argon2Hasher::new(1024, 1).unwrap(),
        );

        let result = service
            .register(&register_request("alice", "alice@example.com", STRONG))
            .await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_store_race_reported_as_taken() {
        // Pre-check passes, then the store's unique key rejects the insert.
        let mut store = MockUserStore::new();
        store
            .expect_find_by_username_or_email()
            .returning(|_| Ok(None));
        store
            .expect_save()
            .returning(|_| Err(AppError::UsernameTaken));

        let clock = Arc::new(ManualClock::starting_now());
        let tokens = Arc::new(TokenService::new("secret", Duration::hours(1), clock));
        let service = AuthService::new(
            Arc::new(store),
            tokens,
            Argon2Hasher::new(1024, 1).unwrap(),
        );

        let result = service
            .register(&register_request("alice", "alice@example.com", STRONG))
            .await;
        assert!(matches!(result, Err(AppError::UsernameTaken)));
    }

    #[tokio::test]
    async fn test_login_with_mocked_store() {
        let hasher = Argon2Hasher::new(1024, 1).unwrap();
        let hash = hasher.hash_password(STRONG).unwrap();

        let mut store = MockUserStore::new();
        store
            .expect_find_by_username_or_email()
            .withf(|identifier| identifier == "root")
            .returning(move |_| {
                Ok(Some(User {
                    id: 1,
                    username: "root".to_string(),
                    email: "root@example.com".to_string(),
                    password_hash: hash.clone(),
                    role: Role::Admin,
                    created_at: Utc::now(),
                    last_login: None,
                }))
            });

        let clock = Arc::new(ManualClock::starting_now());
        let tokens = Arc::new(TokenService::new("secret", Duration::hours(1), clock));
        let service = AuthService::new(Arc::new(store), tokens.clone(), hasher);

        let outcome = service.login("root", STRONG).await.unwrap();
        assert_eq!(tokens.verify(&outcome.token).unwrap().role, Role::Admin);
    }
}

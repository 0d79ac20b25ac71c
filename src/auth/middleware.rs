use crate::auth::cookie::extract_token;
use crate::auth::jwt::TokenService;
use crate::types::{AppError, Claims, Role};
use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

/// The authenticated caller of a request.
///
/// Handlers take this as an argument instead of reading untyped request
/// context; if the request carries no valid session the handler never runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.id,
            username: claims.username,
            role: claims.role,
        }
    }
}

fn session_from_parts(parts: &Parts, tokens: &TokenService) -> Result<Session, AppError> {
    let token = extract_token(&parts.headers).ok_or(AppError::Unauthorized)?;

    let claims = tokens.verify(&token).map_err(|e| {
        debug!(error = %e, path = %parts.uri.path(), "rejected session token");
        AppError::Unauthorized
    })?;

    Ok(Session::from(claims))
}

impl<S> FromRequestParts<S> for Session
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Set by `authenticate` when the route sits behind the gate.
        if let Some(session) = parts.extensions.get::<Session>() {
            return Ok(session.clone());
        }

        let tokens = Arc::<TokenService>::from_ref(state);
        let session = session_from_parts(parts, &tokens)?;
        parts.extensions.insert(session.clone());
        Ok(session)
    }
}

/// A session whose role is `admin`.
#[derive(Debug, Clone)]
pub struct Admin(pub Session);

impl<S> FromRequestParts<S> for Admin
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        if !session.is_admin() {
            debug!(user_id = session.user_id, "admin route refused");
            return Err(AppError::Forbidden);
        }
        Ok(Admin(session))
    }
}

/// Authentication gate: rejects the request with 401 unless it carries a
/// valid session token, and makes the [`Session`] available downstream.
pub async fn authenticate(
    State(tokens): State<Arc<TokenService>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();
    let session = session_from_parts(&parts, &tokens)?;
    parts.extensions.insert(session);

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Admin gate: 401 without a session, 403 when the session is not an admin.
pub async fn require_admin(_admin: Admin, req: Request, next: Next) -> Response {
    next.run(req).await
}

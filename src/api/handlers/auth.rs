use crate::{
    api::extract::ApiJson,
    auth::cookie::{clear_session_cookie, extract_token, session_cookie},
    types::{AppError, LoginRequest, MessageResponse, PublicUser, RegisterRequest, Result},
    AppState,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = MessageResponse),
        (status = 400, description = "Malformed body, validation failed, or username/email already taken")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse> {
    state.auth.register(&payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// Login with username or email
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = PublicUser),
        (status = 400, description = "Malformed body, missing fields or invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse> {
    let outcome = state
        .auth
        .login(&payload.identifier, &payload.password)
        .await?;

    let cookie = session_cookie(
        &outcome.token,
        state.tokens.ttl(),
        state.config.auth.secure_cookies,
    );

    Ok((
        [(header::SET_COOKIE, cookie.to_string())],
        Json(outcome.user),
    ))
}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/api/logout",
    responses(
        (status = 204, description = "Session cookie cleared")
    ),
    tag = "auth"
)]
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = clear_session_cookie(state.config.auth.secure_cookies);
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, cookie.to_string())],
    )
}

/// Exchange the current session token for a fresh one
#[utoipa::path(
    post,
    path = "/api/refresh",
    responses(
        (status = 200, description = "Token refreshed, session cookie replaced", body = MessageResponse),
        (status = 401, description = "Missing, invalid or expired session")
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let token = extract_token(&headers).ok_or(AppError::Unauthorized)?;
    let refreshed = state.auth.refresh_token(&token).await?;

    let cookie = session_cookie(
        &refreshed,
        state.tokens.ttl(),
        state.config.auth.secure_cookies,
    );

    Ok((
        [(header::SET_COOKIE, cookie.to_string())],
        Json(MessageResponse::new("Token refreshed")),
    ))
}

use crate::api::handlers;
use crate::types::{
    LoginRequest, MessageResponse, PublicUser, RegisterRequest, Role, ValidationError,
    ValidationErrors,
};
use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Aurum API",
        description = "Accounts, cookie/JWT sessions and precious-metals prices"
    ),
    paths(
        handlers::health,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::refresh_token,
        handlers::user::me,
        handlers::market::stock,
        handlers::admin::get_user,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        MessageResponse,
        PublicUser,
        Role,
        ValidationError,
        ValidationErrors,
    )),
    tags(
        (name = "health", description = "Liveness"),
        (name = "auth", description = "Registration and sessions"),
        (name = "user", description = "Current user"),
        (name = "market", description = "Market data"),
        (name = "admin", description = "Administration"),
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

use crate::api::handlers::{admin, auth, health, market, user};
use crate::api::openapi;
use crate::auth::middleware::{authenticate, require_admin};
use crate::AppState;
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

/// Routes under `/api`.
pub fn create_router(state: &AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        // Reads the token itself so it can answer 401 for a missing session.
        .route("/refresh", post(auth::refresh_token))
        .route("/openapi.json", get(openapi::openapi_json));

    let protected_routes = Router::new()
        .route("/me", get(user::me))
        .route("/stock", get(market::stock))
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            authenticate,
        ));

    let admin_routes = Router::new()
        .route("/admin/users/{id}", get(admin::get_user))
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            require_admin,
        ));

    public_routes.merge(protected_routes).merge(admin_routes)
}

/// The full application: `/health`, `/api/*`, request tracing and CORS.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/health", get(health))
        .nest("/api", create_router(&state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Any origin when `origins` is empty; otherwise only the listed origins, with credentials.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

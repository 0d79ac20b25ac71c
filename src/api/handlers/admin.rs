use crate::{
    auth::Admin,
    types::{PublicUser, Result},
    AppState,
};
use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

/// Look up any user by id (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    params(
        ("id" = i64, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "The user", body = PublicUser),
        (status = 401, description = "Missing, invalid or expired session"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such user")
    ),
    tag = "admin"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Admin(admin): Admin,
    Path(id): Path<i64>,
) -> Result<Json<PublicUser>> {
    info!(admin_id = admin.user_id, user_id = id, "admin user lookup");
    let user = state.auth.find_user(id).await?;
    Ok(Json(user))
}

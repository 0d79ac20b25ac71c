use crate::{
    auth::Session,
    types::{PublicUser, Result},
    AppState,
};
use axum::{extract::State, Json};

/// Current user's profile
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "The authenticated user", body = PublicUser),
        (status = 401, description = "Missing, invalid or expired session"),
        (status = 404, description = "The session's user no longer exists")
    ),
    tag = "user"
)]
pub async fn me(State(state): State<AppState>, session: Session) -> Result<Json<PublicUser>> {
    let user = state.auth.find_user(session.user_id).await?;
    Ok(Json(user))
}

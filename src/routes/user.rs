use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::user::{CreateUserRequest, UserSummary},
    error::AppError,
    services::user_service,
    state::SharedState,
};

/// Routes handling user management.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route("/users/{id}", get(get_user).delete(delete_user))
}

/// Create a new user.
#[utoipa::path(
    post,
    path = "/users",
    tag = "user",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = UserSummary),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn create_user(
    State(state): State<SharedState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<UserSummary>, AppError> {
    let summary = user_service::create_user(&state, payload).await?;
    Ok(Json(summary))
}

/// List every user.
#[utoipa::path(
    get,
    path = "/users",
    tag = "user",
    responses((status = 200, description = "All users", body = [UserSummary]))
)]
pub async fn list_users(
    State(state): State<SharedState>,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    let summaries = user_service::list_users(&state).await?;
    Ok(Json(summaries))
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "user",
    params(("id" = Uuid, Path, description = "User identifier")),
    responses(
        (status = 200, description = "The user", body = UserSummary),
        (status = 404, description = "Unknown user")
    )
)]
pub async fn get_user(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserSummary>, AppError> {
    let summary = user_service::get_user(&state, id).await?;
    Ok(Json(summary))
}

/// Delete one user.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "user",
    params(("id" = Uuid, Path, description = "User identifier")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "Unknown user")
    )
)]
pub async fn delete_user(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    user_service::delete_user(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

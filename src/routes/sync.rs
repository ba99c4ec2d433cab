use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
};
use uuid::Uuid;

use crate::{
    dto::user::{RegisterPlatformLinkRequest, UserSummary},
    error::AppError,
    services::{platform_service, sync_service},
    state::SharedState,
};

/// Routes handling platform links and synchronization.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/users/{id}/platforms/{platform}",
            put(register_platform_link).delete(deregister_platform_link),
        )
        .route("/users/{id}/sync", post(sync_user))
}

/// Link a platform account to a user.
#[utoipa::path(
    put,
    path = "/users/{id}/platforms/{platform}",
    tag = "sync",
    params(
        ("id" = Uuid, Path, description = "User identifier"),
        ("platform" = String, Path, description = "Platform name, e.g. `steam`")
    ),
    request_body = RegisterPlatformLinkRequest,
    responses(
        (status = 200, description = "Link stored", body = UserSummary),
        (status = 400, description = "Unrecognized platform")
    )
)]
pub async fn register_platform_link(
    State(state): State<SharedState>,
    Path((id, platform)): Path<(Uuid, String)>,
    Json(payload): Json<RegisterPlatformLinkRequest>,
) -> Result<Json<UserSummary>, AppError> {
    let summary = platform_service::register(&state, id, platform, payload).await?;
    Ok(Json(summary))
}

/// Remove a user's link for one platform.
#[utoipa::path(
    delete,
    path = "/users/{id}/platforms/{platform}",
    tag = "sync",
    params(
        ("id" = Uuid, Path, description = "User identifier"),
        ("platform" = String, Path, description = "Platform name, e.g. `steam`")
    ),
    responses(
        (status = 200, description = "Link cleared", body = UserSummary),
        (status = 400, description = "Unrecognized platform")
    )
)]
pub async fn deregister_platform_link(
    State(state): State<SharedState>,
    Path((id, platform)): Path<(Uuid, String)>,
) -> Result<Json<UserSummary>, AppError> {
    let summary = platform_service::deregister(&state, id, platform).await?;
    Ok(Json(summary))
}

/// Pull remote state for every linked platform of a user.
///
/// Platforms whose API is unavailable are skipped after logging; the request
/// succeeds for the platforms that could be reconciled.
#[utoipa::path(
    post,
    path = "/users/{id}/sync",
    tag = "sync",
    params(("id" = Uuid, Path, description = "User identifier")),
    responses(
        (status = 204, description = "Synchronization finished"),
        (status = 404, description = "Unknown user")
    )
)]
pub async fn sync_user(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    sync_service::sync(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

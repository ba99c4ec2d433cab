use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::achievement::AchievementSummary, error::AppError, services::achievement_service,
    state::SharedState,
};

/// Routes exposing tracked achievements.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/achievements", get(list_achievements))
        .route(
            "/achievements/{id}",
            get(get_achievement).delete(delete_achievement),
        )
}

/// List every tracked achievement.
#[utoipa::path(
    get,
    path = "/achievements",
    tag = "achievement",
    responses((status = 200, description = "All achievements", body = [AchievementSummary]))
)]
pub async fn list_achievements(
    State(state): State<SharedState>,
) -> Result<Json<Vec<AchievementSummary>>, AppError> {
    let summaries = achievement_service::list_achievements(&state).await?;
    Ok(Json(summaries))
}

/// Fetch one achievement.
#[utoipa::path(
    get,
    path = "/achievements/{id}",
    tag = "achievement",
    params(("id" = Uuid, Path, description = "Achievement identifier")),
    responses(
        (status = 200, description = "The achievement", body = AchievementSummary),
        (status = 404, description = "Unknown achievement")
    )
)]
pub async fn get_achievement(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AchievementSummary>, AppError> {
    let summary = achievement_service::get_achievement(&state, id).await?;
    Ok(Json(summary))
}

/// Delete one achievement.
#[utoipa::path(
    delete,
    path = "/achievements/{id}",
    tag = "achievement",
    params(("id" = Uuid, Path, description = "Achievement identifier")),
    responses(
        (status = 204, description = "Achievement deleted"),
        (status = 404, description = "Unknown achievement")
    )
)]
pub async fn delete_achievement(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    achievement_service::delete_achievement(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{dto::game::GameSummary, error::AppError, services::game_service, state::SharedState};

/// Routes exposing tracked games.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", get(list_games))
        .route("/games/{id}", get(get_game).delete(delete_game))
}

/// List every tracked game.
#[utoipa::path(
    get,
    path = "/games",
    tag = "game",
    responses((status = 200, description = "All games", body = [GameSummary]))
)]
pub async fn list_games(
    State(state): State<SharedState>,
) -> Result<Json<Vec<GameSummary>>, AppError> {
    let summaries = game_service::list_games(&state).await?;
    Ok(Json(summaries))
}

/// Fetch one game.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "game",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "The game", body = GameSummary),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameSummary>, AppError> {
    let summary = game_service::get_game(&state, id).await?;
    Ok(Json(summary))
}

/// Delete one game.
#[utoipa::path(
    delete,
    path = "/games/{id}",
    tag = "game",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 204, description = "Game deleted"),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    game_service::delete_game(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

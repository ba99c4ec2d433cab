//! Game read and delete operations.
//!
//! Games are created and updated exclusively by the sync path; the manual
//! surface is read and delete only. Deleting a game never cascades into the
//! users or achievements that reference it.

use uuid::Uuid;

use crate::{dto::game::GameSummary, error::ServiceError, state::SharedState};

/// List every tracked game.
pub async fn list_games(state: &SharedState) -> Result<Vec<GameSummary>, ServiceError> {
    let store = state.require_entity_store().await?;
    let games = store.list_games().await?;
    Ok(games.into_iter().map(Into::into).collect())
}

/// Fetch one game by id.
pub async fn get_game(state: &SharedState, id: Uuid) -> Result<GameSummary, ServiceError> {
    let store = state.require_entity_store().await?;
    let game = store
        .find_game(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game `{id}` not found")))?;
    Ok(game.into())
}

/// Delete one game by id.
pub async fn delete_game(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_entity_store().await?;
    if !store.delete_game(id).await? {
        return Err(ServiceError::NotFound(format!("game `{id}` not found")));
    }
    Ok(())
}

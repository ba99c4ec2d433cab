//! Achievement read and delete operations.

use uuid::Uuid;

use crate::{dto::achievement::AchievementSummary, error::ServiceError, state::SharedState};

/// List every tracked achievement.
pub async fn list_achievements(
    state: &SharedState,
) -> Result<Vec<AchievementSummary>, ServiceError> {
    let store = state.require_entity_store().await?;
    let achievements = store.list_achievements().await?;
    Ok(achievements.into_iter().map(Into::into).collect())
}

/// Fetch one achievement by id.
pub async fn get_achievement(
    state: &SharedState,
    id: Uuid,
) -> Result<AchievementSummary, ServiceError> {
    let store = state.require_entity_store().await?;
    let achievement = store
        .find_achievement(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("achievement `{id}` not found")))?;
    Ok(achievement.into())
}

/// Delete one achievement by id. Game links pointing at it are left as-is.
pub async fn delete_achievement(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_entity_store().await?;
    if !store.delete_achievement(id).await? {
        return Err(ServiceError::NotFound(format!("achievement `{id}` not found")));
    }
    Ok(())
}

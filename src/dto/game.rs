use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dao::models::GameEntity;

/// Public view of a tracked game.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameSummary {
    /// Stable identifier.
    pub id: Uuid,
    /// Owning platform name.
    pub platform: String,
    /// Platform-specific key (e.g. Steam app id).
    pub key: String,
    /// Display name; empty until the first successful achievement fetch.
    pub name: String,
    /// Fraction of linked achievements unlocked, in `0.0..=1.0`.
    pub completion: f64,
    /// Total recorded playtime in minutes.
    pub playtime_forever: u64,
    /// Optional icon URL.
    pub icon_url: Option<String>,
    /// Linked achievements, by id.
    pub achievement_ids: Vec<Uuid>,
}

impl From<GameEntity> for GameSummary {
    fn from(game: GameEntity) -> Self {
        Self {
            id: game.id,
            platform: game.platform,
            key: game.key,
            name: game.name,
            completion: game.completion,
            playtime_forever: game.playtime_forever,
            icon_url: game.icon_url,
            achievement_ids: game.achievement_ids,
        }
    }
}

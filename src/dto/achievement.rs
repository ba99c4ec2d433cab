use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{dao::models::AchievementEntity, dto::format_system_time};

/// Public view of an achievement.
#[derive(Debug, Serialize, ToSchema)]
pub struct AchievementSummary {
    /// Stable identifier.
    pub id: Uuid,
    /// Provider-assigned key.
    pub key: String,
    /// Human-readable name.
    pub name: String,
    /// Optional icon URL.
    pub icon_url: Option<String>,
    /// Fraction of the player population that unlocked it.
    pub rarity: Option<f64>,
    /// RFC 3339 unlock timestamp; absent while the achievement is locked.
    pub completion_time: Option<String>,
}

impl From<AchievementEntity> for AchievementSummary {
    fn from(achievement: AchievementEntity) -> Self {
        Self {
            id: achievement.id,
            key: achievement.key,
            name: achievement.name,
            icon_url: achievement.icon_url,
            rarity: achievement.rarity,
            completion_time: achievement.completion_time.map(format_system_time),
        }
    }
}

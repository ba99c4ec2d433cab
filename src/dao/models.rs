use std::time::SystemTime;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Game tracked for one platform, shared across users that own it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameEntity {
    /// Stable identifier for the game.
    pub id: Uuid,
    /// Platform the game belongs to (e.g. `steam`).
    pub platform: String,
    /// Platform-specific key, e.g. the Steam app id. Unique per platform.
    pub key: String,
    /// Display name. Empty until the first achievement fetch reveals it.
    pub name: String,
    /// Fraction of linked achievements currently unlocked, in `0.0..=1.0`.
    pub completion: f64,
    /// Total recorded playtime in minutes, as reported by the platform.
    pub playtime_forever: u64,
    /// Optional icon URL.
    pub icon_url: Option<String>,
    /// Achievements linked to this game, by id. Treated as a set.
    pub achievement_ids: Vec<Uuid>,
}

impl GameEntity {
    /// Create a fresh game shell for a `(platform, key)` pair.
    ///
    /// The display name stays empty until the per-game achievement payload
    /// provides it.
    pub fn new(platform: impl Into<String>, key: impl Into<String>, playtime_forever: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            platform: platform.into(),
            key: key.into(),
            name: String::new(),
            completion: 0.0,
            playtime_forever,
            icon_url: None,
            achievement_ids: Vec::new(),
        }
    }
}

/// Single achievement, identified by its provider-assigned key.
///
/// Keys are globally unique: the same key never appears under two games.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AchievementEntity {
    /// Stable identifier for the achievement.
    pub id: Uuid,
    /// Provider-assigned key (Steam `apiname`). Globally unique.
    pub key: String,
    /// Human-readable name. Falls back to the key when the API offers none.
    pub name: String,
    /// Optional icon URL.
    pub icon_url: Option<String>,
    /// Fraction of the player population that unlocked it, in `0.0..=1.0`.
    pub rarity: Option<f64>,
    /// Unlock instant. Present if and only if the achievement is unlocked.
    pub completion_time: Option<SystemTime>,
}

impl AchievementEntity {
    /// Create an achievement from its key and optional unlock instant.
    pub fn new(key: impl Into<String>, completion_time: Option<SystemTime>) -> Self {
        let key = key.into();
        Self {
            id: Uuid::new_v4(),
            name: key.clone(),
            key,
            icon_url: None,
            rarity: None,
            completion_time,
        }
    }
}

/// Account tracked by the service, with its external platform links.
///
/// Invariant: whenever a platform has a token, the matching account-id entry
/// is set as well. Link management writes both fields together to keep it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserEntity {
    /// Stable identifier for the user.
    pub id: Uuid,
    /// Unique username.
    pub username: String,
    /// Arithmetic mean of owned games' completion ratios.
    pub global_completion: f64,
    /// Platform name to the user's account id on that platform.
    pub platform_accounts: IndexMap<String, Option<String>>,
    /// Platform name to the API token used to query it.
    pub platform_tokens: IndexMap<String, Option<String>>,
    /// Games owned by this user, by id. Treated as a set.
    pub game_ids: Vec<Uuid>,
}

impl UserEntity {
    /// Create a user with no platform links and no games.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            global_completion: 0.0,
            platform_accounts: IndexMap::new(),
            platform_tokens: IndexMap::new(),
            game_ids: Vec::new(),
        }
    }
}

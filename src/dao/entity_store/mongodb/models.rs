use indexmap::IndexMap;
use mongodb::bson::{Binary, DateTime, Document, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{AchievementEntity, GameEntity, UserEntity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    platform: String,
    key: String,
    name: String,
    completion: f64,
    playtime_forever: u64,
    icon_url: Option<String>,
    #[serde(default)]
    achievement_ids: Vec<Uuid>,
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id,
            platform: value.platform,
            key: value.key,
            name: value.name,
            completion: value.completion,
            playtime_forever: value.playtime_forever,
            icon_url: value.icon_url,
            achievement_ids: value.achievement_ids,
        }
    }
}

impl From<MongoGameDocument> for GameEntity {
    fn from(value: MongoGameDocument) -> Self {
        Self {
            id: value.id,
            platform: value.platform,
            key: value.key,
            name: value.name,
            completion: value.completion,
            playtime_forever: value.playtime_forever,
            icon_url: value.icon_url,
            achievement_ids: value.achievement_ids,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoAchievementDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    key: String,
    name: String,
    icon_url: Option<String>,
    rarity: Option<f64>,
    completion_time: Option<DateTime>,
}

impl From<AchievementEntity> for MongoAchievementDocument {
    fn from(value: AchievementEntity) -> Self {
        Self {
            id: value.id,
            key: value.key,
            name: value.name,
            icon_url: value.icon_url,
            rarity: value.rarity,
            completion_time: value.completion_time.map(DateTime::from_system_time),
        }
    }
}

impl From<MongoAchievementDocument> for AchievementEntity {
    fn from(value: MongoAchievementDocument) -> Self {
        Self {
            id: value.id,
            key: value.key,
            name: value.name,
            icon_url: value.icon_url,
            rarity: value.rarity,
            completion_time: value.completion_time.map(DateTime::to_system_time),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoUserDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    username: String,
    global_completion: f64,
    #[serde(default)]
    platform_accounts: IndexMap<String, Option<String>>,
    #[serde(default)]
    platform_tokens: IndexMap<String, Option<String>>,
    #[serde(default)]
    game_ids: Vec<Uuid>,
}

impl From<UserEntity> for MongoUserDocument {
    fn from(value: UserEntity) -> Self {
        Self {
            id: value.id,
            username: value.username,
            global_completion: value.global_completion,
            platform_accounts: value.platform_accounts,
            platform_tokens: value.platform_tokens,
            game_ids: value.game_ids,
        }
    }
}

impl From<MongoUserDocument> for UserEntity {
    fn from(value: MongoUserDocument) -> Self {
        Self {
            id: value.id,
            username: value.username,
            global_completion: value.global_completion,
            platform_accounts: value.platform_accounts,
            platform_tokens: value.platform_tokens,
            game_ids: value.game_ids,
        }
    }
}

pub fn uuid_as_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.into_bytes().to_vec(),
    }
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_binary(id)}
}

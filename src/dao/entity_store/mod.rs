pub mod memory;
pub mod mongodb;

use std::time::SystemTime;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::{
    models::{AchievementEntity, GameEntity, UserEntity},
    storage::StorageResult,
};

/// Abstraction over the persistence layer for users, games and achievements.
///
/// Every mutation is a single-document atomic operation; callers compose them
/// without multi-document transactions. Field updates target documents by id,
/// while `find_*_by_*` lookups resolve the natural keys used for upserts.
pub trait EntityStore: Send + Sync {
    /// Insert a new user. Fails with a duplicate error when the username is taken.
    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    fn find_user_by_username(
        &self,
        username: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>>;
    /// Delete a user, reporting whether a document was removed.
    fn delete_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    /// Atomically set both link fields for one platform on a user document.
    ///
    /// Passing `None` for both clears the link. Returns `false` when the user
    /// does not exist.
    fn set_platform_link(
        &self,
        user_id: Uuid,
        platform: String,
        account_id: Option<String>,
        token: Option<String>,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Add a game to a user's owned set. Duplicate-safe.
    fn add_user_game(&self, user_id: Uuid, game_id: Uuid)
    -> BoxFuture<'static, StorageResult<()>>;
    fn set_global_completion(
        &self,
        user_id: Uuid,
        global_completion: f64,
    ) -> BoxFuture<'static, StorageResult<()>>;

    /// Insert a new game. Fails with a duplicate error when `(platform, key)` is taken.
    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Resolve a game by its `(platform, key)` natural key.
    fn find_game_by_key(
        &self,
        platform: String,
        key: String,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Fetch the games whose ids appear in `ids`. Missing ids are skipped.
    fn find_games_by_ids(
        &self,
        ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    fn set_game_playtime(
        &self,
        id: Uuid,
        playtime_forever: u64,
    ) -> BoxFuture<'static, StorageResult<()>>;
    fn set_game_name(&self, id: Uuid, name: String) -> BoxFuture<'static, StorageResult<()>>;
    fn set_game_completion(
        &self,
        id: Uuid,
        completion: f64,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Link an achievement into a game's achievement set. Duplicate-safe.
    fn link_achievement(
        &self,
        game_id: Uuid,
        achievement_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<()>>;

    /// Insert a new achievement. Fails with a duplicate error when the key is taken.
    fn insert_achievement(
        &self,
        achievement: AchievementEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    fn find_achievement(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<AchievementEntity>>>;
    /// Resolve an achievement by its globally unique provider key.
    fn find_achievement_by_key(
        &self,
        key: String,
    ) -> BoxFuture<'static, StorageResult<Option<AchievementEntity>>>;
    fn list_achievements(&self) -> BoxFuture<'static, StorageResult<Vec<AchievementEntity>>>;
    fn delete_achievement(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    /// Set or clear the unlock instant of an achievement.
    fn set_achievement_unlock(
        &self,
        id: Uuid,
        completion_time: Option<SystemTime>,
    ) -> BoxFuture<'static, StorageResult<()>>;

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

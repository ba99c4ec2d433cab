//! In-memory [`EntityStore`] backend.
//!
//! Selected with `STORE_BACKEND=memory`, useful for local runs without a
//! MongoDB instance and as the storage double in unit tests.

use std::{collections::HashMap, sync::Arc, time::SystemTime};

use futures::future::BoxFuture;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::{
    entity_store::EntityStore,
    models::{AchievementEntity, GameEntity, UserEntity},
    storage::{StorageError, StorageResult},
};

/// Hash-map backed store with the same atomicity guarantees as the real
/// backends: every trait method takes the write lock once.
#[derive(Clone, Default)]
pub struct MemoryEntityStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, UserEntity>,
    games: HashMap<Uuid, GameEntity>,
    achievements: HashMap<Uuid, AchievementEntity>,
}

impl MemoryEntityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntityStore for MemoryEntityStore {
    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let mut inner = store.inner.write().await;
            if inner.users.values().any(|u| u.username == user.username) {
                return Err(StorageError::duplicate("user", user.username));
            }
            inner.users.insert(user.id, user);
            Ok(())
        })
    }

    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.read().await.users.get(&id).cloned()) })
    }

    fn find_user_by_username(
        &self,
        username: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let inner = store.inner.read().await;
            Ok(inner
                .users
                .values()
                .find(|u| u.username == username)
                .cloned())
        })
    }

    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.read().await.users.values().cloned().collect()) })
    }

    fn delete_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.write().await.users.remove(&id).is_some()) })
    }

    fn set_platform_link(
        &self,
        user_id: Uuid,
        platform: String,
        account_id: Option<String>,
        token: Option<String>,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let mut inner = store.inner.write().await;
            let Some(user) = inner.users.get_mut(&user_id) else {
                return Ok(false);
            };
            user.platform_accounts.insert(platform.clone(), account_id);
            user.platform_tokens.insert(platform, token);
            Ok(true)
        })
    }

    fn add_user_game(
        &self,
        user_id: Uuid,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let mut inner = store.inner.write().await;
            if let Some(user) = inner.users.get_mut(&user_id)
                && !user.game_ids.contains(&game_id)
            {
                user.game_ids.push(game_id);
            }
            Ok(())
        })
    }

    fn set_global_completion(
        &self,
        user_id: Uuid,
        global_completion: f64,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let mut inner = store.inner.write().await;
            if let Some(user) = inner.users.get_mut(&user_id) {
                user.global_completion = global_completion;
            }
            Ok(())
        })
    }

    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let mut inner = store.inner.write().await;
            if inner
                .games
                .values()
                .any(|g| g.platform == game.platform && g.key == game.key)
            {
                return Err(StorageError::duplicate(
                    "game",
                    format!("{}/{}", game.platform, game.key),
                ));
            }
            inner.games.insert(game.id, game);
            Ok(())
        })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.read().await.games.get(&id).cloned()) })
    }

    fn find_game_by_key(
        &self,
        platform: String,
        key: String,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let inner = store.inner.read().await;
            Ok(inner
                .games
                .values()
                .find(|g| g.platform == platform && g.key == key)
                .cloned())
        })
    }

    fn find_games_by_ids(
        &self,
        ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let inner = store.inner.read().await;
            Ok(ids
                .into_iter()
                .filter_map(|id| inner.games.get(&id).cloned())
                .collect())
        })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.read().await.games.values().cloned().collect()) })
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.write().await.games.remove(&id).is_some()) })
    }

    fn set_game_playtime(
        &self,
        id: Uuid,
        playtime_forever: u64,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let mut inner = store.inner.write().await;
            if let Some(game) = inner.games.get_mut(&id) {
                game.playtime_forever = playtime_forever;
            }
            Ok(())
        })
    }

    fn set_game_name(&self, id: Uuid, name: String) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let mut inner = store.inner.write().await;
            if let Some(game) = inner.games.get_mut(&id) {
                game.name = name;
            }
            Ok(())
        })
    }

    fn set_game_completion(
        &self,
        id: Uuid,
        completion: f64,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let mut inner = store.inner.write().await;
            if let Some(game) = inner.games.get_mut(&id) {
                game.completion = completion;
            }
            Ok(())
        })
    }

    fn link_achievement(
        &self,
        game_id: Uuid,
        achievement_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let mut inner = store.inner.write().await;
            if let Some(game) = inner.games.get_mut(&game_id)
                && !game.achievement_ids.contains(&achievement_id)
            {
                game.achievement_ids.push(achievement_id);
            }
            Ok(())
        })
    }

    fn insert_achievement(
        &self,
        achievement: AchievementEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let mut inner = store.inner.write().await;
            if inner
                .achievements
                .values()
                .any(|a| a.key == achievement.key)
            {
                return Err(StorageError::duplicate("achievement", achievement.key));
            }
            inner.achievements.insert(achievement.id, achievement);
            Ok(())
        })
    }

    fn find_achievement(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<AchievementEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.read().await.achievements.get(&id).cloned()) })
    }

    fn find_achievement_by_key(
        &self,
        key: String,
    ) -> BoxFuture<'static, StorageResult<Option<AchievementEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let inner = store.inner.read().await;
            Ok(inner.achievements.values().find(|a| a.key == key).cloned())
        })
    }

    fn list_achievements(&self) -> BoxFuture<'static, StorageResult<Vec<AchievementEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .inner
                .read()
                .await
                .achievements
                .values()
                .cloned()
                .collect())
        })
    }

    fn delete_achievement(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.write().await.achievements.remove(&id).is_some()) })
    }

    fn set_achievement_unlock(
        &self,
        id: Uuid,
        completion_time: Option<SystemTime>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let mut inner = store.inner.write().await;
            if let Some(achievement) = inner.achievements.get_mut(&id) {
                achievement.completion_time = completion_time;
            }
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_user_rejects_duplicate_username() {
        let store = MemoryEntityStore::new();
        store.insert_user(UserEntity::new("ada")).await.unwrap();

        let err = store.insert_user(UserEntity::new("ada")).await.unwrap_err();
        assert!(matches!(err, StorageError::Duplicate { entity: "user", .. }));
    }

    #[tokio::test]
    async fn link_achievement_is_duplicate_safe() {
        let store = MemoryEntityStore::new();
        let game = GameEntity::new("steam", "100", 0);
        let game_id = game.id;
        store.insert_game(game).await.unwrap();

        let achievement_id = Uuid::new_v4();
        store.link_achievement(game_id, achievement_id).await.unwrap();
        store.link_achievement(game_id, achievement_id).await.unwrap();

        let game = store.find_game(game_id).await.unwrap().unwrap();
        assert_eq!(game.achievement_ids, vec![achievement_id]);
    }

    #[tokio::test]
    async fn add_user_game_is_duplicate_safe() {
        let store = MemoryEntityStore::new();
        let user = UserEntity::new("ada");
        let user_id = user.id;
        store.insert_user(user).await.unwrap();

        let game_id = Uuid::new_v4();
        store.add_user_game(user_id, game_id).await.unwrap();
        store.add_user_game(user_id, game_id).await.unwrap();

        let user = store.find_user(user_id).await.unwrap().unwrap();
        assert_eq!(user.game_ids, vec![game_id]);
    }
}

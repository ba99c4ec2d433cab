use std::{sync::Arc, time::SystemTime};

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database,
    bson::{Bson, DateTime, Document, doc},
    options::IndexOptions,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult, is_duplicate_key},
    models::{
        MongoAchievementDocument, MongoGameDocument, MongoUserDocument, doc_id, uuid_as_binary,
    },
};
use crate::dao::{
    entity_store::EntityStore,
    models::{AchievementEntity, GameEntity, UserEntity},
    storage::StorageResult,
};

const USER_COLLECTION_NAME: &str = "users";
const GAME_COLLECTION_NAME: &str = "games";
const ACHIEVEMENT_COLLECTION_NAME: &str = "achievements";

/// MongoDB-backed [`EntityStore`] implementation.
#[derive(Clone)]
pub struct MongoEntityStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
}

struct MongoState {
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }
}

impl MongoEntityStore {
    /// Establish a connection to MongoDB and ensure the natural-key indexes
    /// are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;

        let unique_index = |keys: Document, name: &str| {
            mongodb::IndexModel::builder()
                .keys(keys)
                .options(
                    IndexOptions::builder()
                        .name(Some(name.to_owned()))
                        .unique(Some(true))
                        .build(),
                )
                .build()
        };

        database
            .collection::<Document>(USER_COLLECTION_NAME)
            .create_index(unique_index(doc! {"username": 1}, "user_username_idx"))
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: USER_COLLECTION_NAME,
                index: "username",
                source,
            })?;

        database
            .collection::<Document>(GAME_COLLECTION_NAME)
            .create_index(unique_index(
                doc! {"platform": 1, "key": 1},
                "game_platform_key_idx",
            ))
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: GAME_COLLECTION_NAME,
                index: "platform,key",
                source,
            })?;

        database
            .collection::<Document>(ACHIEVEMENT_COLLECTION_NAME)
            .create_index(unique_index(doc! {"key": 1}, "achievement_key_idx"))
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: ACHIEVEMENT_COLLECTION_NAME,
                index: "key",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn users(&self) -> Collection<MongoUserDocument> {
        self.database()
            .await
            .collection::<MongoUserDocument>(USER_COLLECTION_NAME)
    }

    async fn games(&self) -> Collection<MongoGameDocument> {
        self.database()
            .await
            .collection::<MongoGameDocument>(GAME_COLLECTION_NAME)
    }

    async fn achievements(&self) -> Collection<MongoAchievementDocument> {
        self.database()
            .await
            .collection::<MongoAchievementDocument>(ACHIEVEMENT_COLLECTION_NAME)
    }

    async fn insert_user(&self, user: UserEntity) -> MongoResult<()> {
        let id = user.id;
        let username = user.username.clone();
        let document: MongoUserDocument = user.into();
        self.users()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| {
                if is_duplicate_key(&source) {
                    MongoDaoError::DuplicateKey {
                        entity: "user",
                        key: username,
                    }
                } else {
                    MongoDaoError::Insert {
                        entity: "user",
                        id,
                        source,
                    }
                }
            })?;
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> MongoResult<Option<UserEntity>> {
        let document = self
            .users()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Load {
                entity: "user",
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn find_user_by_username(&self, username: &str) -> MongoResult<Option<UserEntity>> {
        let document = self
            .users()
            .await
            .find_one(doc! {"username": username})
            .await
            .map_err(|source| MongoDaoError::Load {
                entity: "user",
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn list_users(&self) -> MongoResult<Vec<UserEntity>> {
        let documents: Vec<MongoUserDocument> = self
            .users()
            .await
            .find(doc! {})
            .await
            .map_err(|source| MongoDaoError::List {
                entity: "users",
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::List {
                entity: "users",
                source,
            })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn delete_user(&self, id: Uuid) -> MongoResult<bool> {
        let result = self
            .users()
            .await
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Delete {
                entity: "user",
                id,
                source,
            })?;
        Ok(result.deleted_count > 0)
    }

    async fn set_platform_link(
        &self,
        user_id: Uuid,
        platform: &str,
        account_id: Option<String>,
        token: Option<String>,
    ) -> MongoResult<bool> {
        let mut set = Document::new();
        set.insert(
            format!("platform_accounts.{platform}"),
            account_id.map_or(Bson::Null, Bson::String),
        );
        set.insert(
            format!("platform_tokens.{platform}"),
            token.map_or(Bson::Null, Bson::String),
        );

        let result = self
            .users()
            .await
            .update_one(doc_id(user_id), doc! {"$set": set})
            .await
            .map_err(|source| MongoDaoError::Update {
                entity: "user",
                id: user_id,
                source,
            })?;
        Ok(result.matched_count > 0)
    }

    async fn update_user(&self, user_id: Uuid, update: Document) -> MongoResult<()> {
        self.users()
            .await
            .update_one(doc_id(user_id), update)
            .await
            .map_err(|source| MongoDaoError::Update {
                entity: "user",
                id: user_id,
                source,
            })?;
        Ok(())
    }

    async fn insert_game(&self, game: GameEntity) -> MongoResult<()> {
        let id = game.id;
        let natural_key = format!("{}/{}", game.platform, game.key);
        let document: MongoGameDocument = game.into();
        self.games()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| {
                if is_duplicate_key(&source) {
                    MongoDaoError::DuplicateKey {
                        entity: "game",
                        key: natural_key,
                    }
                } else {
                    MongoDaoError::Insert {
                        entity: "game",
                        id,
                        source,
                    }
                }
            })?;
        Ok(())
    }

    async fn find_game(&self, id: Uuid) -> MongoResult<Option<GameEntity>> {
        let document = self
            .games()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Load {
                entity: "game",
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn find_game_by_key(&self, platform: &str, key: &str) -> MongoResult<Option<GameEntity>> {
        let document = self
            .games()
            .await
            .find_one(doc! {"platform": platform, "key": key})
            .await
            .map_err(|source| MongoDaoError::Load {
                entity: "game",
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn find_games_by_ids(&self, ids: Vec<Uuid>) -> MongoResult<Vec<GameEntity>> {
        let ids: Vec<Bson> = ids
            .into_iter()
            .map(|id| Bson::Binary(uuid_as_binary(id)))
            .collect();
        let documents: Vec<MongoGameDocument> = self
            .games()
            .await
            .find(doc! {"_id": {"$in": ids}})
            .await
            .map_err(|source| MongoDaoError::List {
                entity: "games",
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::List {
                entity: "games",
                source,
            })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn list_games(&self) -> MongoResult<Vec<GameEntity>> {
        let documents: Vec<MongoGameDocument> = self
            .games()
            .await
            .find(doc! {})
            .await
            .map_err(|source| MongoDaoError::List {
                entity: "games",
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::List {
                entity: "games",
                source,
            })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn delete_game(&self, id: Uuid) -> MongoResult<bool> {
        let result = self
            .games()
            .await
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Delete {
                entity: "game",
                id,
                source,
            })?;
        Ok(result.deleted_count > 0)
    }

    async fn update_game(&self, id: Uuid, update: Document) -> MongoResult<()> {
        self.games()
            .await
            .update_one(doc_id(id), update)
            .await
            .map_err(|source| MongoDaoError::Update {
                entity: "game",
                id,
                source,
            })?;
        Ok(())
    }

    async fn insert_achievement(&self, achievement: AchievementEntity) -> MongoResult<()> {
        let id = achievement.id;
        let key = achievement.key.clone();
        let document: MongoAchievementDocument = achievement.into();
        self.achievements()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| {
                if is_duplicate_key(&source) {
                    MongoDaoError::DuplicateKey {
                        entity: "achievement",
                        key,
                    }
                } else {
                    MongoDaoError::Insert {
                        entity: "achievement",
                        id,
                        source,
                    }
                }
            })?;
        Ok(())
    }

    async fn find_achievement(&self, id: Uuid) -> MongoResult<Option<AchievementEntity>> {
        let document = self
            .achievements()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Load {
                entity: "achievement",
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn find_achievement_by_key(&self, key: &str) -> MongoResult<Option<AchievementEntity>> {
        let document = self
            .achievements()
            .await
            .find_one(doc! {"key": key})
            .await
            .map_err(|source| MongoDaoError::Load {
                entity: "achievement",
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn list_achievements(&self) -> MongoResult<Vec<AchievementEntity>> {
        let documents: Vec<MongoAchievementDocument> = self
            .achievements()
            .await
            .find(doc! {})
            .await
            .map_err(|source| MongoDaoError::List {
                entity: "achievements",
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::List {
                entity: "achievements",
                source,
            })?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn delete_achievement(&self, id: Uuid) -> MongoResult<bool> {
        let result = self
            .achievements()
            .await
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Delete {
                entity: "achievement",
                id,
                source,
            })?;
        Ok(result.deleted_count > 0)
    }

    async fn update_achievement(&self, id: Uuid, update: Document) -> MongoResult<()> {
        self.achievements()
            .await
            .update_one(doc_id(id), update)
            .await
            .map_err(|source| MongoDaoError::Update {
                entity: "achievement",
                id,
                source,
            })?;
        Ok(())
    }
}

impl EntityStore for MongoEntityStore {
    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_user(user).await.map_err(Into::into) })
    }

    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_user(id).await.map_err(Into::into) })
    }

    fn find_user_by_username(
        &self,
        username: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_user_by_username(&username)
                .await
                .map_err(Into::into)
        })
    }

    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_users().await.map_err(Into::into) })
    }

    fn delete_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_user(id).await.map_err(Into::into) })
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
            store
                .set_platform_link(user_id, &platform, account_id, token)
                .await
                .map_err(Into::into)
        })
    }

    fn add_user_game(
        &self,
        user_id: Uuid,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_user(
                    user_id,
                    doc! {"$addToSet": {"game_ids": uuid_as_binary(game_id)}},
                )
                .await
                .map_err(Into::into)
        })
    }

    fn set_global_completion(
        &self,
        user_id: Uuid,
        global_completion: f64,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_user(user_id, doc! {"$set": {"global_completion": global_completion}})
                .await
                .map_err(Into::into)
        })
    }

    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_game(game).await.map_err(Into::into) })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game(id).await.map_err(Into::into) })
    }

    fn find_game_by_key(
        &self,
        platform: String,
        key: String,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_game_by_key(&platform, &key)
                .await
                .map_err(Into::into)
        })
    }

    fn find_games_by_ids(
        &self,
        ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_games_by_ids(ids).await.map_err(Into::into) })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_games().await.map_err(Into::into) })
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_game(id).await.map_err(Into::into) })
    }

    fn set_game_playtime(
        &self,
        id: Uuid,
        playtime_forever: u64,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_game(
                    id,
                    doc! {"$set": {"playtime_forever": playtime_forever as i64}},
                )
                .await
                .map_err(Into::into)
        })
    }

    fn set_game_name(&self, id: Uuid, name: String) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_game(id, doc! {"$set": {"name": name}})
                .await
                .map_err(Into::into)
        })
    }

    fn set_game_completion(
        &self,
        id: Uuid,
        completion: f64,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_game(id, doc! {"$set": {"completion": completion}})
                .await
                .map_err(Into::into)
        })
    }

    fn link_achievement(
        &self,
        game_id: Uuid,
        achievement_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_game(
                    game_id,
                    doc! {"$addToSet": {"achievement_ids": uuid_as_binary(achievement_id)}},
                )
                .await
                .map_err(Into::into)
        })
    }

    fn insert_achievement(
        &self,
        achievement: AchievementEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_achievement(achievement).await.map_err(Into::into) })
    }

    fn find_achievement(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<AchievementEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_achievement(id).await.map_err(Into::into) })
    }

    fn find_achievement_by_key(
        &self,
        key: String,
    ) -> BoxFuture<'static, StorageResult<Option<AchievementEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_achievement_by_key(&key)
                .await
                .map_err(Into::into)
        })
    }

    fn list_achievements(&self) -> BoxFuture<'static, StorageResult<Vec<AchievementEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_achievements().await.map_err(Into::into) })
    }

    fn delete_achievement(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_achievement(id).await.map_err(Into::into) })
    }

    fn set_achievement_unlock(
        &self,
        id: Uuid,
        completion_time: Option<SystemTime>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let value = completion_time.map_or(Bson::Null, |time| {
                Bson::DateTime(DateTime::from_system_time(time))
            });
            store
                .update_achievement(id, doc! {"$set": {"completion_time": value}})
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }
}

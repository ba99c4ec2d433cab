//! Steam reconciliation pass.

pub mod api;

use std::{
    collections::HashSet,
    sync::Arc,
    time::{Duration, UNIX_EPOCH},
};

use futures::future::BoxFuture;
use tracing::{debug, info};
use uuid::Uuid;

use self::api::{OwnedGameEntry, SteamWebApi};
use crate::{
    dao::{
        entity_store::EntityStore,
        models::{AchievementEntity, GameEntity},
    },
    platform::{LinkContext, PlatformProcessor, SyncError},
};

/// Canonical platform name for registry lookups and game natural keys.
pub const PLATFORM: &str = "steam";

/// [`PlatformProcessor`] for Steam.
///
/// Games are processed sequentially in the order the owned-games endpoint
/// returned them; a failed per-game achievements call aborts the whole pass.
/// Upserts already performed stay in place, so an aborted pass can leave a
/// game shell without a name or achievements until the next sync fills it.
pub struct SteamProcessor {
    api: Arc<dyn SteamWebApi>,
}

impl SteamProcessor {
    /// Create a processor over the given API transport.
    pub fn new(api: Arc<dyn SteamWebApi>) -> Self {
        Self { api }
    }

    async fn reconcile_game(
        &self,
        store: &Arc<dyn EntityStore>,
        ctx: &LinkContext,
        entry: &OwnedGameEntry,
    ) -> Result<(), SyncError> {
        let key = entry.appid.to_string();
        let game = match store.find_game_by_key(PLATFORM.into(), key.clone()).await? {
            Some(game) => {
                store
                    .set_game_playtime(game.id, entry.playtime_forever)
                    .await?;
                game
            }
            None => {
                // Name is unknown until the achievements payload reveals it.
                let game = GameEntity::new(PLATFORM, key, entry.playtime_forever);
                store.insert_game(game.clone()).await?;
                game
            }
        };
        store.add_user_game(ctx.user_id, game.id).await?;

        let stats = self
            .api
            .player_achievements(&ctx.account_id, &ctx.token, entry.appid)
            .await?;
        store.set_game_name(game.id, stats.game_name.clone()).await?;

        let mut linked: HashSet<Uuid> = game.achievement_ids.iter().copied().collect();
        let total = stats.achievements.len();
        let mut achieved_count = 0usize;

        for raw in &stats.achievements {
            let completion_time = raw
                .is_achieved()
                .then(|| UNIX_EPOCH + Duration::from_secs(raw.unlocktime));
            if raw.is_achieved() {
                achieved_count += 1;
            }

            match store.find_achievement_by_key(raw.apiname.clone()).await? {
                Some(existing) => {
                    // Keys are globally unique: an existing achievement that
                    // is not linked to this game means two games claim the
                    // same key, which is corrupted state.
                    if !linked.contains(&existing.id) {
                        return Err(SyncError::Invariant(format!(
                            "achievement `{}` already exists but is not linked to game {}/{}",
                            raw.apiname, PLATFORM, game.key
                        )));
                    }
                    store
                        .set_achievement_unlock(existing.id, completion_time)
                        .await?;
                }
                None => {
                    let achievement = AchievementEntity::new(raw.apiname.clone(), completion_time);
                    let achievement_id = achievement.id;
                    store.insert_achievement(achievement).await?;
                    store.link_achievement(game.id, achievement_id).await?;
                    linked.insert(achievement_id);
                }
            }
        }

        let completion = if total == 0 {
            0.0
        } else {
            achieved_count as f64 / total as f64
        };
        store.set_game_completion(game.id, completion).await?;

        debug!(
            game = %stats.game_name,
            achievements = total,
            achieved = achieved_count,
            "reconciled game"
        );
        Ok(())
    }
}

impl PlatformProcessor for SteamProcessor {
    fn platform(&self) -> &'static str {
        PLATFORM
    }

    fn process(
        &self,
        store: Arc<dyn EntityStore>,
        ctx: LinkContext,
    ) -> BoxFuture<'_, Result<(), SyncError>> {
        Box::pin(async move {
            let owned = self.api.owned_games(&ctx.account_id, &ctx.token).await?;
            info!(games = owned.games.len(), "fetched owned games");

            for entry in &owned.games {
                self.reconcile_game(&store, &ctx, entry).await?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use reqwest::StatusCode;

    use super::{
        api::{OwnedGames, PlayerStats, RawAchievement, RemoteError},
        *,
    };
    use crate::dao::{entity_store::memory::MemoryEntityStore, models::UserEntity};

    enum Scripted<T> {
        Ok(T),
        Status(u16, &'static str),
    }

    impl<T: Clone> Scripted<T> {
        fn resolve(&self, endpoint: &'static str) -> Result<T, RemoteError> {
            match self {
                Scripted::Ok(value) => Ok(value.clone()),
                Scripted::Status(code, body) => Err(RemoteError::Status {
                    endpoint,
                    status: StatusCode::from_u16(*code).unwrap(),
                    body: (*body).to_owned(),
                }),
            }
        }
    }

    struct FakeSteamApi {
        owned: Scripted<OwnedGames>,
        stats: HashMap<u64, Scripted<PlayerStats>>,
    }

    impl SteamWebApi for FakeSteamApi {
        fn owned_games(
            &self,
            _account_id: &str,
            _token: &str,
        ) -> BoxFuture<'static, Result<OwnedGames, RemoteError>> {
            let result = self.owned.resolve("owned-games");
            Box::pin(async move { result })
        }

        fn player_achievements(
            &self,
            _account_id: &str,
            _token: &str,
            app_id: u64,
        ) -> BoxFuture<'static, Result<PlayerStats, RemoteError>> {
            let result = match self.stats.get(&app_id) {
                Some(scripted) => scripted.resolve("player-achievements"),
                None => Err(RemoteError::Status {
                    endpoint: "player-achievements",
                    status: StatusCode::BAD_REQUEST,
                    body: format!("unscripted app {app_id}"),
                }),
            };
            Box::pin(async move { result })
        }
    }

    fn entry(appid: u64, playtime_forever: u64) -> OwnedGameEntry {
        OwnedGameEntry {
            appid,
            playtime_forever,
        }
    }

    fn raw(apiname: &str, achieved: u8, unlocktime: u64) -> RawAchievement {
        RawAchievement {
            apiname: apiname.to_owned(),
            achieved,
            unlocktime,
        }
    }

    fn stats(game_name: &str, achievements: Vec<RawAchievement>) -> PlayerStats {
        PlayerStats {
            game_name: game_name.to_owned(),
            achievements,
        }
    }

    async fn store_with_user() -> (Arc<dyn EntityStore>, Uuid) {
        let store: Arc<dyn EntityStore> = Arc::new(MemoryEntityStore::new());
        let user = UserEntity::new("ada");
        let user_id = user.id;
        store.insert_user(user).await.unwrap();
        (store, user_id)
    }

    fn ctx(user_id: Uuid) -> LinkContext {
        LinkContext {
            user_id,
            account_id: "76561198000000000".to_owned(),
            token: "steam-token".to_owned(),
        }
    }

    async fn run(
        api: FakeSteamApi,
        store: &Arc<dyn EntityStore>,
        user_id: Uuid,
    ) -> Result<(), SyncError> {
        let processor = SteamProcessor::new(Arc::new(api));
        processor.process(store.clone(), ctx(user_id)).await
    }

    #[tokio::test]
    async fn partial_failure_keeps_earlier_games_and_aborts_pass() {
        let (store, user_id) = store_with_user().await;
        let api = FakeSteamApi {
            owned: Scripted::Ok(OwnedGames {
                games: vec![entry(100, 30), entry(200, 5)],
            }),
            stats: HashMap::from([
                (
                    100,
                    Scripted::Ok(stats(
                        "Half-Life",
                        vec![raw("HL_FIRST", 1, 1_700_000_000), raw("HL_LAST", 0, 0)],
                    )),
                ),
                (200, Scripted::Status(503, "service unavailable")),
            ]),
        };

        let result = run(api, &store, user_id).await;
        assert!(matches!(result, Err(SyncError::Remote(_))));

        let game = store
            .find_game_by_key("steam".into(), "100".into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(game.name, "Half-Life");
        assert_eq!(game.playtime_forever, 30);
        assert_eq!(game.completion, 0.5);
        assert_eq!(game.achievement_ids.len(), 2);

        let unlocked = store
            .find_achievement_by_key("HL_FIRST".into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            unlocked.completion_time,
            Some(UNIX_EPOCH + Duration::from_secs(1_700_000_000))
        );
        let locked = store
            .find_achievement_by_key("HL_LAST".into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(locked.completion_time, None);

        // The failed game keeps its placeholder shell from the upsert step.
        let shell = store
            .find_game_by_key("steam".into(), "200".into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(shell.name, "");
        assert!(shell.achievement_ids.is_empty());
        assert_eq!(shell.completion, 0.0);

        let user = store.find_user(user_id).await.unwrap().unwrap();
        assert!(user.game_ids.contains(&game.id));
        assert!(user.game_ids.contains(&shell.id));
    }

    #[tokio::test]
    async fn resync_is_idempotent() {
        let (store, user_id) = store_with_user().await;
        let script = || FakeSteamApi {
            owned: Scripted::Ok(OwnedGames {
                games: vec![entry(100, 30)],
            }),
            stats: HashMap::from([(
                100,
                Scripted::Ok(stats(
                    "Half-Life",
                    vec![raw("HL_FIRST", 1, 1_700_000_000), raw("HL_LAST", 0, 0)],
                )),
            )]),
        };

        run(script(), &store, user_id).await.unwrap();
        let games_before = store.list_games().await.unwrap();
        let achievements_before = store.list_achievements().await.unwrap();

        run(script(), &store, user_id).await.unwrap();
        let games_after = store.list_games().await.unwrap();
        let achievements_after = store.list_achievements().await.unwrap();

        assert_eq!(games_before, games_after);
        assert_eq!(achievements_before.len(), 2);
        assert_eq!(achievements_after.len(), 2);

        let user = store.find_user(user_id).await.unwrap().unwrap();
        assert_eq!(user.game_ids.len(), 1);
    }

    #[tokio::test]
    async fn unlock_flips_completion_time_and_ratio() {
        let (store, user_id) = store_with_user().await;
        let script = |achieved: u8, unlocktime: u64| FakeSteamApi {
            owned: Scripted::Ok(OwnedGames {
                games: vec![entry(100, 30)],
            }),
            stats: HashMap::from([(
                100,
                Scripted::Ok(stats("Half-Life", vec![raw("HL_FIRST", achieved, unlocktime)])),
            )]),
        };

        run(script(0, 0), &store, user_id).await.unwrap();
        let achievement = store
            .find_achievement_by_key("HL_FIRST".into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(achievement.completion_time, None);

        run(script(1, 1_234_567), &store, user_id).await.unwrap();
        let achievement = store
            .find_achievement_by_key("HL_FIRST".into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            achievement.completion_time,
            Some(UNIX_EPOCH + Duration::from_secs(1_234_567))
        );

        let game = store
            .find_game_by_key("steam".into(), "100".into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(game.completion, 1.0);
    }

    #[tokio::test]
    async fn owned_games_failure_leaves_store_untouched() {
        let (store, user_id) = store_with_user().await;
        let api = FakeSteamApi {
            owned: Scripted::Status(500, "internal server error"),
            stats: HashMap::new(),
        };

        let result = run(api, &store, user_id).await;
        assert!(matches!(result, Err(SyncError::Remote(_))));

        assert!(store.list_games().await.unwrap().is_empty());
        assert!(store.list_achievements().await.unwrap().is_empty());
        let user = store.find_user(user_id).await.unwrap().unwrap();
        assert!(user.game_ids.is_empty());
    }

    #[tokio::test]
    async fn achievement_key_reused_across_games_violates_invariant() {
        let (store, user_id) = store_with_user().await;
        let api = FakeSteamApi {
            owned: Scripted::Ok(OwnedGames {
                games: vec![entry(100, 30), entry(200, 5)],
            }),
            stats: HashMap::from([
                (
                    100,
                    Scripted::Ok(stats("Half-Life", vec![raw("SHARED", 1, 10)])),
                ),
                (
                    200,
                    Scripted::Ok(stats("Portal", vec![raw("SHARED", 0, 0)])),
                ),
            ]),
        };

        let result = run(api, &store, user_id).await;
        match result {
            Err(SyncError::Invariant(message)) => assert!(message.contains("SHARED")),
            other => panic!("expected invariant violation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn game_without_achievements_keeps_zero_completion() {
        let (store, user_id) = store_with_user().await;
        let api = FakeSteamApi {
            owned: Scripted::Ok(OwnedGames {
                games: vec![entry(300, 120)],
            }),
            stats: HashMap::from([(300, Scripted::Ok(stats("Proving Grounds", vec![])))]),
        };

        run(api, &store, user_id).await.unwrap();

        let game = store
            .find_game_by_key("steam".into(), "300".into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(game.name, "Proving Grounds");
        assert_eq!(game.completion, 0.0);
        assert!(game.achievement_ids.is_empty());
    }
}

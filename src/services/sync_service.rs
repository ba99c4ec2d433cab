//! Synchronization orchestrator.
//!
//! Iterates a user's platform links and runs the matching processor for each
//! one in sequence. A platform whose API is unavailable is logged and skipped;
//! the remaining platforms still run and the request reports success for them.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::{entity_store::EntityStore, models::GameEntity},
    error::ServiceError,
    platform::{LinkContext, SyncError},
    state::SharedState,
};

/// Reconcile every linked platform for `user_id`, then refresh the user's
/// global completion from the owned games.
pub async fn sync(state: &SharedState, user_id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_entity_store().await?;

    // One sync per user at a time; different users proceed independently.
    let gate = state.sync_gate(user_id);
    let _guard = gate.lock().await;

    let user = store
        .find_user(user_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("user `{user_id}` not found")))?;

    for (platform, token) in &user.platform_tokens {
        let Some(token) = token else { continue };

        let Some(processor) = state.platforms().get(platform) else {
            return Err(ServiceError::UnrecognizedPlatform(platform.clone()));
        };

        // Link management writes the account id and token together, so a
        // token without an account id means the document was corrupted.
        let account_id = user
            .platform_accounts
            .get(platform)
            .cloned()
            .flatten()
            .ok_or_else(|| {
                ServiceError::Invariant(format!(
                    "user `{user_id}` has a token for `{platform}` but no account id"
                ))
            })?;

        let ctx = LinkContext {
            user_id,
            account_id,
            token: token.clone(),
        };
        match processor.process(store.clone(), ctx).await {
            Ok(()) => info!(%user_id, platform, "platform sync completed"),
            Err(SyncError::Remote(err)) => {
                warn!(%user_id, platform, error = %err, "platform sync aborted");
            }
            Err(other) => return Err(other.into()),
        }
    }

    refresh_global_completion(&store, user_id).await
}

/// Recompute the user's global completion as the arithmetic mean of owned
/// games' completion ratios and persist it together with the grown game set.
async fn refresh_global_completion(
    store: &Arc<dyn EntityStore>,
    user_id: Uuid,
) -> Result<(), ServiceError> {
    let user = store
        .find_user(user_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("user `{user_id}` not found")))?;

    let games = store.find_games_by_ids(user.game_ids).await?;
    let global = global_completion(&games);
    store.set_global_completion(user_id, global).await?;
    Ok(())
}

fn global_completion(games: &[GameEntity]) -> f64 {
    if games.is_empty() {
        return 0.0;
    }
    games.iter().map(|game| game.completion).sum::<f64>() / games.len() as f64
}

#[cfg(test)]
mod tests {
    use futures::future::BoxFuture;
    use reqwest::StatusCode;

    use super::*;
    use crate::{
        dao::{entity_store::memory::MemoryEntityStore, models::UserEntity},
        platform::{PlatformProcessor, PlatformRegistry, steam::api::RemoteError},
        state::AppState,
    };

    struct StubProcessor {
        name: &'static str,
        completions: Vec<f64>,
        fail_remote: bool,
    }

    impl StubProcessor {
        fn succeeding(name: &'static str, completions: Vec<f64>) -> Self {
            Self {
                name,
                completions,
                fail_remote: false,
            }
        }

        fn failing(name: &'static str) -> Self {
            Self {
                name,
                completions: Vec::new(),
                fail_remote: true,
            }
        }
    }

    impl PlatformProcessor for StubProcessor {
        fn platform(&self) -> &'static str {
            self.name
        }

        fn process(
            &self,
            store: Arc<dyn EntityStore>,
            ctx: LinkContext,
        ) -> BoxFuture<'_, Result<(), SyncError>> {
            Box::pin(async move {
                if self.fail_remote {
                    return Err(SyncError::Remote(RemoteError::Status {
                        endpoint: "owned-games",
                        status: StatusCode::INTERNAL_SERVER_ERROR,
                        body: "boom".into(),
                    }));
                }
                for (index, completion) in self.completions.iter().enumerate() {
                    let mut game = GameEntity::new(self.name, index.to_string(), 0);
                    game.completion = *completion;
                    let game_id = game.id;
                    store.insert_game(game).await?;
                    store.add_user_game(ctx.user_id, game_id).await?;
                }
                Ok(())
            })
        }
    }

    async fn state_with(processors: Vec<StubProcessor>) -> SharedState {
        let mut registry = PlatformRegistry::new();
        for processor in processors {
            registry.register(Arc::new(processor));
        }
        let state = AppState::new(registry);
        state
            .install_entity_store(Arc::new(MemoryEntityStore::new()))
            .await;
        state
    }

    async fn linked_user(state: &SharedState, platforms: &[&str]) -> Uuid {
        let store = state.require_entity_store().await.unwrap();
        let user = UserEntity::new("ada");
        let user_id = user.id;
        store.insert_user(user).await.unwrap();
        for platform in platforms {
            store
                .set_platform_link(
                    user_id,
                    (*platform).to_owned(),
                    Some(format!("{platform}-account")),
                    Some(format!("{platform}-token")),
                )
                .await
                .unwrap();
        }
        user_id
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let state = state_with(vec![]).await;
        let err = sync(&state, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn unknown_platform_fails_the_whole_sync() {
        let state = state_with(vec![StubProcessor::succeeding("test", vec![])]).await;
        let user_id = linked_user(&state, &["gog"]).await;

        let err = sync(&state, user_id).await.unwrap_err();
        match err {
            ServiceError::UnrecognizedPlatform(platform) => assert_eq!(platform, "gog"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn token_without_account_id_is_invariant_violation() {
        let state = state_with(vec![StubProcessor::succeeding("test", vec![])]).await;
        let store = state.require_entity_store().await.unwrap();
        let user = UserEntity::new("ada");
        let user_id = user.id;
        store.insert_user(user).await.unwrap();
        store
            .set_platform_link(user_id, "test".into(), None, Some("token".into()))
            .await
            .unwrap();

        let err = sync(&state, user_id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Invariant(_)));
    }

    #[tokio::test]
    async fn remote_failure_skips_platform_but_keeps_the_rest() {
        let state = state_with(vec![
            StubProcessor::failing("broken"),
            StubProcessor::succeeding("test", vec![1.0, 0.5]),
        ])
        .await;
        let user_id = linked_user(&state, &["broken", "test"]).await;

        sync(&state, user_id).await.unwrap();

        let store = state.require_entity_store().await.unwrap();
        let user = store.find_user(user_id).await.unwrap().unwrap();
        assert_eq!(user.game_ids.len(), 2);
        assert_eq!(user.global_completion, 0.75);
    }

    #[tokio::test]
    async fn global_completion_is_mean_of_owned_games() {
        let state =
            state_with(vec![StubProcessor::succeeding("test", vec![1.0, 0.0, 0.5])]).await;
        let user_id = linked_user(&state, &["test"]).await;

        sync(&state, user_id).await.unwrap();

        let store = state.require_entity_store().await.unwrap();
        let user = store.find_user(user_id).await.unwrap().unwrap();
        assert_eq!(user.global_completion, 0.5);
    }

    #[tokio::test]
    async fn user_without_links_gets_zero_completion() {
        let state = state_with(vec![]).await;
        let user_id = linked_user(&state, &[]).await;

        sync(&state, user_id).await.unwrap();

        let store = state.require_entity_store().await.unwrap();
        let user = store.find_user(user_id).await.unwrap().unwrap();
        assert_eq!(user.global_completion, 0.0);
        assert!(user.game_ids.is_empty());
    }
}

//! Platform link management.

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::entity_store::EntityStore,
    dto::user::{RegisterPlatformLinkRequest, UserSummary},
    error::ServiceError,
    state::SharedState,
};

/// Link a platform account to a user by storing its account id and token.
///
/// Unconditional beyond platform validation: an existing link is overwritten.
pub async fn register(
    state: &SharedState,
    user_id: Uuid,
    platform: String,
    request: RegisterPlatformLinkRequest,
) -> Result<UserSummary, ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(format!("validation failed: {err}")))?;

    if !state.platforms().contains(&platform) {
        return Err(ServiceError::UnrecognizedPlatform(platform));
    }

    let store = state.require_entity_store().await?;
    let updated = store
        .set_platform_link(
            user_id,
            platform,
            Some(request.platform_account_id),
            Some(request.token),
        )
        .await?;
    if !updated {
        return Err(ServiceError::NotFound(format!("user `{user_id}` not found")));
    }

    load_summary(&store, user_id).await
}

/// Clear a user's link for one platform. Both fields are nulled together.
pub async fn deregister(
    state: &SharedState,
    user_id: Uuid,
    platform: String,
) -> Result<UserSummary, ServiceError> {
    if !state.platforms().contains(&platform) {
        return Err(ServiceError::UnrecognizedPlatform(platform));
    }

    let store = state.require_entity_store().await?;
    let updated = store.set_platform_link(user_id, platform, None, None).await?;
    if !updated {
        return Err(ServiceError::NotFound(format!("user `{user_id}` not found")));
    }

    load_summary(&store, user_id).await
}

async fn load_summary(
    store: &Arc<dyn EntityStore>,
    user_id: Uuid,
) -> Result<UserSummary, ServiceError> {
    let user = store
        .find_user(user_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("user `{user_id}` not found")))?;
    Ok(user.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::{entity_store::memory::MemoryEntityStore, models::UserEntity},
        platform::{PlatformProcessor, PlatformRegistry, SyncError, steam::api::RemoteError},
        state::AppState,
    };
    use futures::future::BoxFuture;

    struct NoopProcessor;

    impl PlatformProcessor for NoopProcessor {
        fn platform(&self) -> &'static str {
            "test"
        }

        fn process(
            &self,
            _store: Arc<dyn EntityStore>,
            _ctx: crate::platform::LinkContext,
        ) -> BoxFuture<'_, Result<(), SyncError>> {
            Box::pin(async {
                Err(SyncError::Remote(RemoteError::Status {
                    endpoint: "owned-games",
                    status: reqwest::StatusCode::NOT_IMPLEMENTED,
                    body: String::new(),
                }))
            })
        }
    }

    async fn state_with_user() -> (SharedState, Uuid) {
        let mut registry = PlatformRegistry::new();
        registry.register(Arc::new(NoopProcessor));
        let state = AppState::new(registry);
        state
            .install_entity_store(Arc::new(MemoryEntityStore::new()))
            .await;

        let store = state.require_entity_store().await.unwrap();
        let user = UserEntity::new("ada");
        let user_id = user.id;
        store.insert_user(user).await.unwrap();
        (state, user_id)
    }

    fn link_request() -> RegisterPlatformLinkRequest {
        RegisterPlatformLinkRequest {
            platform_account_id: "account-1".into(),
            token: "token-1".into(),
        }
    }

    #[tokio::test]
    async fn register_unknown_platform_leaves_user_unchanged() {
        let (state, user_id) = state_with_user().await;
        let store = state.require_entity_store().await.unwrap();
        let before = store.find_user(user_id).await.unwrap().unwrap();

        let err = register(&state, user_id, "gog".into(), link_request())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UnrecognizedPlatform(_)));

        let after = store.find_user(user_id).await.unwrap().unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn register_then_deregister_clears_both_fields() {
        let (state, user_id) = state_with_user().await;

        let summary = register(&state, user_id, "test".into(), link_request())
            .await
            .unwrap();
        assert_eq!(summary.registered_platforms, vec!["test".to_owned()]);
        assert_eq!(
            summary.platform_accounts.get("test"),
            Some(&Some("account-1".to_owned()))
        );

        let summary = deregister(&state, user_id, "test".into()).await.unwrap();
        assert!(summary.registered_platforms.is_empty());
        assert_eq!(summary.platform_accounts.get("test"), Some(&None));

        let store = state.require_entity_store().await.unwrap();
        let user = store.find_user(user_id).await.unwrap().unwrap();
        assert_eq!(user.platform_tokens.get("test"), Some(&None));
    }

    #[tokio::test]
    async fn register_missing_user_is_not_found() {
        let (state, _user_id) = state_with_user().await;
        let err = register(&state, Uuid::new_v4(), "test".into(), link_request())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn register_rejects_empty_fields() {
        let (state, user_id) = state_with_user().await;
        let request = RegisterPlatformLinkRequest {
            platform_account_id: String::new(),
            token: "token-1".into(),
        };

        let err = register(&state, user_id, "test".into(), request)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}

//! User management.

use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::UserEntity,
    dto::user::{CreateUserRequest, UserSummary},
    error::ServiceError,
    state::SharedState,
};

/// Create a user with a unique username.
pub async fn create_user(
    state: &SharedState,
    request: CreateUserRequest,
) -> Result<UserSummary, ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(format!("validation failed: {err}")))?;

    let store = state.require_entity_store().await?;
    let user = UserEntity::new(request.username);
    let summary: UserSummary = user.clone().into();
    store.insert_user(user).await?;
    Ok(summary)
}

/// List every user.
pub async fn list_users(state: &SharedState) -> Result<Vec<UserSummary>, ServiceError> {
    let store = state.require_entity_store().await?;
    let users = store.list_users().await?;
    Ok(users.into_iter().map(Into::into).collect())
}

/// Fetch one user by id.
pub async fn get_user(state: &SharedState, id: Uuid) -> Result<UserSummary, ServiceError> {
    let store = state.require_entity_store().await?;
    let user = store
        .find_user(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("user `{id}` not found")))?;
    Ok(user.into())
}

/// Delete one user by id. Owned games and achievements stay in place.
pub async fn delete_user(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_entity_store().await?;
    if !store.delete_user(id).await? {
        return Err(ServiceError::NotFound(format!("user `{id}` not found")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        dao::entity_store::memory::MemoryEntityStore, platform::PlatformRegistry, state::AppState,
    };

    async fn fresh_state() -> SharedState {
        let state = AppState::new(PlatformRegistry::new());
        state
            .install_entity_store(Arc::new(MemoryEntityStore::new()))
            .await;
        state
    }

    #[tokio::test]
    async fn create_and_fetch_roundtrip() {
        let state = fresh_state().await;
        let created = create_user(
            &state,
            CreateUserRequest {
                username: "ada".into(),
            },
        )
        .await
        .unwrap();

        let fetched = get_user(&state, created.id).await.unwrap();
        assert_eq!(fetched.username, "ada");
        assert_eq!(fetched.global_completion, 0.0);
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let state = fresh_state().await;
        let request = || CreateUserRequest {
            username: "ada".into(),
        };
        create_user(&state, request()).await.unwrap();

        let err = create_user(&state, request()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn invalid_username_is_rejected() {
        let state = fresh_state().await;
        let err = create_user(
            &state,
            CreateUserRequest {
                username: "Not Valid".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn delete_missing_user_is_not_found() {
        let state = fresh_state().await;
        let err = delete_user(&state, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}

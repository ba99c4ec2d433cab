use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{dao::models::UserEntity, dto::validation::validate_username};

/// Payload used to create a new user.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateUserRequest {
    /// Unique username for the new user.
    #[validate(custom(function = validate_username))]
    pub username: String,
}

/// Payload used to link a platform account to a user.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterPlatformLinkRequest {
    /// The user's identifier on the external platform (e.g. Steam ID).
    #[validate(length(min = 1, message = "platform account id must not be empty"))]
    pub platform_account_id: String,
    /// API token used to query the platform on the user's behalf.
    #[validate(length(min = 1, message = "token must not be empty"))]
    pub token: String,
}

/// Public view of a user. API tokens are never exposed.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserSummary {
    /// Stable identifier.
    pub id: Uuid,
    /// Unique username.
    pub username: String,
    /// Arithmetic mean of owned games' completion ratios.
    pub global_completion: f64,
    /// Platforms with an active link (an API token is stored).
    pub registered_platforms: Vec<String>,
    /// Platform name to linked account id.
    #[schema(value_type = Object)]
    pub platform_accounts: IndexMap<String, Option<String>>,
    /// Games owned by this user, by id.
    pub game_ids: Vec<Uuid>,
}

impl From<UserEntity> for UserSummary {
    fn from(user: UserEntity) -> Self {
        let registered_platforms = user
            .platform_tokens
            .iter()
            .filter(|(_, token)| token.is_some())
            .map(|(platform, _)| platform.clone())
            .collect();
        Self {
            id: user.id,
            username: user.username,
            global_completion: user.global_completion,
            registered_platforms,
            platform_accounts: user.platform_accounts,
            game_ids: user.game_ids,
        }
    }
}

use utoipa::OpenApi;

/// Aggregated OpenAPI specification for Trophy Hub Back.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::user::create_user,
        crate::routes::user::list_users,
        crate::routes::user::get_user,
        crate::routes::user::delete_user,
        crate::routes::sync::register_platform_link,
        crate::routes::sync::deregister_platform_link,
        crate::routes::sync::sync_user,
        crate::routes::game::list_games,
        crate::routes::game::get_game,
        crate::routes::game::delete_game,
        crate::routes::achievement::list_achievements,
        crate::routes::achievement::get_achievement,
        crate::routes::achievement::delete_achievement,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::user::CreateUserRequest,
            crate::dto::user::RegisterPlatformLinkRequest,
            crate::dto::user::UserSummary,
            crate::dto::game::GameSummary,
            crate::dto::achievement::AchievementSummary,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "user", description = "User management"),
        (name = "sync", description = "Platform links and synchronization"),
        (name = "game", description = "Tracked games"),
        (name = "achievement", description = "Tracked achievements"),
    )
)]
pub struct ApiDoc;

/// Achievement read and delete operations.
pub mod achievement_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Game read and delete operations.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Platform link registration and removal.
pub mod platform_service;
/// Synchronization orchestrator pulling platform state into the store.
pub mod sync_service;
/// User management operations.
pub mod user_service;

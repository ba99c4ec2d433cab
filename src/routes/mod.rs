use axum::Router;

use crate::state::SharedState;

pub mod achievement;
pub mod docs;
pub mod game;
pub mod health;
pub mod sync;
pub mod user;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(user::router())
        .merge(sync::router())
        .merge(game::router())
        .merge(achievement::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}

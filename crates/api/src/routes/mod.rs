pub mod assets;
pub mod health;
pub mod risk;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(risk::router())
        .merge(assets::router())
        .with_state(state)
}

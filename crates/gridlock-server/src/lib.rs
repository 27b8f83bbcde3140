pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod rate_limit;
pub mod registry;
pub mod scheduler;
pub mod state;
pub mod ws;

use axum::Router;

use config::ServerConfig;
use state::AppState;

/// Build the Axum router and application state from a config.
pub fn build_app(config: ServerConfig) -> (Router, AppState) {
    let state = AppState::new(config);
    let app = Router::new()
        .route("/ws", axum::routing::get(ws::ws_handler))
        .with_state(state.clone());
    (app, state)
}

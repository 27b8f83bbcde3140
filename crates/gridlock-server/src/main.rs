use tracing_subscriber::EnvFilter;

use gridlock_server::config::ServerConfig;
use gridlock_server::{build_app, scheduler};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match ServerConfig::load("gridlock.toml") {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        },
    };
    let listen_addr = config.listen_addr.clone();
    let (app, state) = build_app(config);

    scheduler::spawn_tick_loop(state.clone());
    scheduler::spawn_idle_sweep(state);

    let listener = match tokio::net::TcpListener::bind(&listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %listen_addr, error = %e, "Failed to bind");
            std::process::exit(1);
        },
    };
    tracing::info!(addr = %listen_addr, "Gridlock server listening");
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server exited with error");
    }
}

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

mod config;
mod error;
mod poller;
mod routes;
mod service;
mod state;
mod store;
mod types;
mod views;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Configuration
    let config = Config::parse();
    info!(endpoint = %config.api_endpoint, "Initializing application state");

    // 2. State, owned here and shared with the poller and the routes
    let state = Arc::new(AppState::new(config.api_endpoint.clone()));

    // 3. Poll loop
    let state_clone_poll = state.clone();
    let every = config.poll_interval();
    tokio::spawn(async move {
        poller::run(&state_clone_poll.store, &state_clone_poll.service, every).await;
    });

    // 4. HTTP server
    let (addr, server) =
        warp::serve(routes::routes(state)).try_bind_ephemeral(([0, 0, 0, 0], config.port))?;
    for route in routes::Route::ALL {
        info!(route = route.name(), path = route.path());
    }
    info!("Server running at http://{}", addr);
    server.await;

    Ok(())
}

//! Application initialization: state construction and route setup.

pub mod routes;
pub mod server;

use std::sync::Arc;

use axum::Router;
use mediapress_core::Config;

use crate::state::AppState;

/// Build the application state and router from configuration.
pub fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router), anyhow::Error> {
    let state = Arc::new(AppState::from_config(config)?);
    let router = routes::setup_routes(state.clone())?;
    Ok((state, router))
}

use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::sync::Mutex;

use crate::{api, config, error, types::CallbackOutcome};

/// Binds the local callback server on `SERVER_ADDRESS` and serves the
/// `/callback` and `/health` routes until the process exits. The shared
/// state is how the callback handler hands the authorization outcome to
/// the waiting launcher.
pub async fn start_api_server(state: Arc<Mutex<Option<CallbackOutcome>>>) {
    let app = Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(state)));

    let addr = match SocketAddr::from_str(&config::server_addr()) {
        Ok(addr) => addr,
        Err(e) => error!("Failed to parse server address: {}", e),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

//! Authenticated admin HTTP API over the lottery service.
//!
//! # Routes
//! ```text
//! GET  /admin/status                 service status
//! GET  /admin/contract               lottery contract snapshot
//! GET  /admin/balance                lottery contract balance
//! GET  /admin/address/{address}      account information
//! GET  /admin/participants/{index}   participant of the current round
//! GET  /admin/winners/{round}        winner record of a round
//! GET  /admin/wallet                 keeper wallet address
//! POST /admin/draw                   draw a winner now
//! POST /admin/round                  start a new round
//! POST /admin/nft                    set the NFT collection contract
//! ```
//!
//! Every route requires `Authorization: Bearer <api_key>`.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::config::AdminConfig;
use crate::lifecycle::ShutdownSignal;
use crate::lottery::LotteryService;

/// Shared state handed to every admin handler.
#[derive(Clone)]
pub struct AdminState {
    pub service: LotteryService,
    pub api_key: Arc<str>,
    pub lottery_address: Arc<str>,
}

impl AdminState {
    pub fn new(service: LotteryService, api_key: &str, lottery_address: &str) -> Self {
        Self {
            service,
            api_key: Arc::from(api_key),
            lottery_address: Arc::from(lottery_address),
        }
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/contract", get(get_contract))
        .route("/admin/balance", get(get_balance))
        .route("/admin/address/{address}", get(get_address))
        .route("/admin/participants/{index}", get(get_participant))
        .route("/admin/winners/{round}", get(get_winner))
        .route("/admin/wallet", get(get_wallet))
        .route("/admin/draw", post(post_draw))
        .route("/admin/round", post(post_round))
        .route("/admin/nft", post(post_nft))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the admin listener when the API is enabled.
pub async fn bind_admin(config: &AdminConfig) -> std::io::Result<Option<TcpListener>> {
    if !config.enabled {
        return Ok(None);
    }
    TcpListener::bind(&config.bind_address).await.map(Some)
}

/// Serve the admin API until the shutdown signal fires.
pub async fn serve_admin(
    listener: TcpListener,
    state: AdminState,
    signal: ShutdownSignal,
) -> std::io::Result<()> {
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Admin API listening");

    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(async move { signal.cancelled().await })
        .await?;

    tracing::info!("Admin API stopped");
    Ok(())
}

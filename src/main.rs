//! Lottery keeper daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!   config.toml ──▶ config ──▶ LotteryService ──┬──▶ auto-draw scheduler
//!                                               │         │
//!                                               │         ▼
//!   admin API ──────────────────────────────────┤   check_and_draw
//!   (axum, bearer auth)                         │         │
//!                                               ▼         ▼
//!                                   Wallet (sign) ──▶ LedgerClient ──▶ ledger JSON API
//!                                                         ▲
//!                                                         │
//!                                               ConfirmationMonitor
//! ```
//!
//! SIGINT/SIGTERM stops the admin server, cancels in-flight waits and
//! joins the scheduler before exit.

use clap::Parser;
use std::path::PathBuf;

use lottery_keeper::admin::{bind_admin, serve_admin, AdminState};
use lottery_keeper::config::load_config;
use lottery_keeper::lifecycle::signals::wait_for_shutdown_signal;
use lottery_keeper::lifecycle::Shutdown;
use lottery_keeper::observability::{logging, metrics};
use lottery_keeper::LotteryService;

#[derive(Parser)]
#[command(name = "lottery-keeper")]
#[command(about = "Keeper daemon for the on-chain NFT lottery", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "keeper.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {}", args.config.display(), e);
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "lottery-keeper starting");

    tracing::info!(
        network = %config.ledger.network,
        lottery = %config.contracts.lottery_address,
        auto_draw = config.draw.auto_draw,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let admin_config = config.admin.clone();
    let lottery_address = config.contracts.lottery_address.clone();

    let service = LotteryService::new(config)?;
    tracing::info!(wallet = %service.get_wallet_address(), "Keeper wallet loaded");

    // Bind before starting so a bind failure leaves nothing running.
    let admin_listener = bind_admin(&admin_config).await?;

    service.start().await?;

    let admin_shutdown = Shutdown::new();
    let admin_task = admin_listener.map(|listener| {
        let state = AdminState::new(service.clone(), &admin_config.api_key, &lottery_address);
        tokio::spawn(serve_admin(listener, state, admin_shutdown.subscribe()))
    });

    wait_for_shutdown_signal().await;
    tracing::info!("Shutdown signal received");

    admin_shutdown.trigger();
    service.stop().await;

    if let Some(task) = admin_task {
        match task.await {
            Ok(Err(e)) => tracing::error!(error = %e, "Admin API exited with error"),
            Err(e) => tracing::error!(error = %e, "Admin API task panicked"),
            Ok(Ok(())) => {}
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

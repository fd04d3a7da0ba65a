//! Lottery service: scheduling, eligibility and draw submission.
//!
//! # Responsibilities
//! - Own the service lifecycle (`start`/`stop`) and the auto-draw scheduler task
//! - Decide whether the current contract state warrants a draw
//! - Build, submit and confirm draw, new-round and NFT-contract messages
//! - Expose read-only passthroughs that are safe to call at any time
//!
//! # Design Decisions
//! - Preconditions are checked against a snapshot fetched immediately before building
//! - One `Shutdown` token per lifecycle cancels the scheduler and every wait it started
//! - Runtime state sits behind a read/write lock that is never held across an
//!   await; `start`/`stop` are serialized by a separate lifecycle mutex, so
//!   status reads stay responsive while `stop` joins the scheduler
//! - The wallet's sequence counter is independent of both locks

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::blockchain::{
    AddressInfo, BlockchainError, ConfirmationMonitor, LedgerClient, LotteryContractInfo,
    LotteryResult, Participant, SignedTransaction, TxStatus, Wallet,
};
use crate::config::KeeperConfig;
use crate::lifecycle::{Shutdown, ShutdownSignal};
use crate::lottery::types::{
    DrawDecision, DrawReceipt, LotteryError, LotteryServiceResult, NftContractUpdate,
    ServiceStatus, TxReceipt,
};
use crate::observability::metrics;

/// Handle to the lottery keeper. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct LotteryService {
    core: Arc<ServiceCore>,
    runtime: Arc<RwLock<RuntimeState>>,
    lifecycle: Arc<Mutex<()>>,
}

/// Everything the scheduler task needs, shared with foreground calls.
struct ServiceCore {
    config: Arc<KeeperConfig>,
    client: LedgerClient,
    wallet: Wallet,
    monitor: ConfirmationMonitor,
}

struct RuntimeState {
    running: bool,
    shutdown: Shutdown,
    scheduler: Option<JoinHandle<()>>,
}

impl LotteryService {
    /// Create the service: ledger client, wallet and confirmation monitor.
    pub fn new(config: KeeperConfig) -> LotteryServiceResult<Self> {
        let client = LedgerClient::new(config.ledger.clone())?;
        let wallet = Wallet::from_credentials(&config.wallet)?;
        let monitor = ConfirmationMonitor::new(client.clone(), &config.confirmation);

        Ok(Self::from_parts(config, client, wallet, monitor))
    }

    /// Assemble the service from already-built components.
    pub fn from_parts(
        config: KeeperConfig,
        client: LedgerClient,
        wallet: Wallet,
        monitor: ConfirmationMonitor,
    ) -> Self {
        Self {
            core: Arc::new(ServiceCore {
                config: Arc::new(config),
                client,
                wallet,
                monitor,
            }),
            runtime: Arc::new(RwLock::new(RuntimeState {
                running: false,
                shutdown: Shutdown::new(),
                scheduler: None,
            })),
            lifecycle: Arc::new(Mutex::new(())),
        }
    }

    /// Start the service, spawning the scheduler when auto-draw is enabled.
    pub async fn start(&self) -> LotteryServiceResult<()> {
        let _lifecycle = self.lifecycle.lock().await;
        let mut state = self.runtime.write().await;
        if state.running {
            return Err(LotteryError::AlreadyRunning);
        }

        let draw = &self.core.config.draw;
        tracing::info!(
            auto_draw = draw.auto_draw,
            draw_interval_secs = draw.interval_secs,
            max_participants = draw.max_participants,
            "Lottery service starting"
        );

        if state.shutdown.is_triggered() {
            state.shutdown = Shutdown::new();
        }

        if draw.auto_draw {
            let core = self.core.clone();
            let signal = state.shutdown.subscribe();
            state.scheduler = Some(tokio::spawn(core.auto_draw_loop(signal)));
        }

        state.running = true;
        metrics::set_running(true);
        tracing::info!("Lottery service started");
        Ok(())
    }

    /// Stop the service and wait for the scheduler to exit. No-op when stopped.
    ///
    /// Concurrent callers wait for the first stop to finish.
    pub async fn stop(&self) {
        let _lifecycle = self.lifecycle.lock().await;

        let scheduler = {
            let mut state = self.runtime.write().await;
            if !state.running {
                return;
            }
            tracing::info!("Lottery service stopping");
            state.shutdown.trigger();
            state.scheduler.take()
        };

        if let Some(handle) = scheduler {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Scheduler task ended abnormally");
            }
        }

        let mut state = self.runtime.write().await;
        state.running = false;
        state.shutdown = Shutdown::new();
        metrics::set_running(false);
        tracing::info!("Lottery service stopped");
    }

    /// Whether the service is started.
    pub async fn is_running(&self) -> bool {
        self.runtime.read().await.running
    }

    /// Run one eligibility check, drawing if the threshold is reached.
    pub async fn check_and_draw(&self) -> LotteryServiceResult<DrawDecision> {
        let signal = self.signal().await;
        self.core.check_and_draw(&signal).await
    }

    /// Draw a winner now, provided the lottery is active with enough players.
    pub async fn send_draw_winner(&self) -> LotteryServiceResult<DrawReceipt> {
        let signal = self.signal().await;
        metrics::record_draw_attempt("manual");
        self.core.draw_winner(&signal).await
    }

    /// Start a new round; the current one must be finished.
    pub async fn send_start_new_round(&self) -> LotteryServiceResult<TxReceipt> {
        let signal = self.signal().await;
        self.core.start_new_round(&signal).await
    }

    /// Point the lottery at the configured NFT collection.
    pub async fn send_set_nft_contract(&self) -> LotteryServiceResult<NftContractUpdate> {
        let signal = self.signal().await;
        self.core.set_nft_contract(&signal).await
    }

    /// Fresh snapshot of the lottery contract.
    pub async fn get_contract_info(&self) -> LotteryServiceResult<LotteryContractInfo> {
        let signal = self.signal().await;
        self.core.fetch_info(&signal).await
    }

    /// Participant of the current round by index.
    pub async fn get_participant(&self, index: u32) -> LotteryServiceResult<Participant> {
        let signal = self.signal().await;
        Ok(self
            .core
            .client
            .get_participant(self.core.lottery_address(), index, &signal)
            .await?)
    }

    /// Winner record of a round.
    pub async fn get_winner(&self, round: u64) -> LotteryServiceResult<LotteryResult> {
        let signal = self.signal().await;
        Ok(self
            .core
            .client
            .get_winner(self.core.lottery_address(), round, &signal)
            .await?)
    }

    /// Lottery contract balance in nano units.
    pub async fn get_contract_balance(&self) -> LotteryServiceResult<u64> {
        let signal = self.signal().await;
        Ok(self
            .core
            .client
            .get_contract_balance(self.core.lottery_address(), &signal)
            .await?)
    }

    /// Account information for any address.
    pub async fn get_address_information(&self, address: &str) -> LotteryServiceResult<AddressInfo> {
        let signal = self.signal().await;
        Ok(self.core.client.get_address_information(address, &signal).await?)
    }

    /// Address of the keeper wallet.
    pub fn get_wallet_address(&self) -> &str {
        self.core.wallet.address()
    }

    /// Running flag plus a configuration echo.
    pub async fn get_status(&self) -> ServiceStatus {
        let running = self.runtime.read().await.running;
        let config = &self.core.config;

        ServiceStatus {
            running,
            auto_draw: config.draw.auto_draw,
            draw_interval_secs: config.draw.interval_secs,
            max_participants: config.draw.max_participants,
            min_participants: config.draw.min_participants,
            entry_fee: config.draw.entry_fee,
            wallet_address: self.core.wallet.address().to_string(),
        }
    }

    async fn signal(&self) -> ShutdownSignal {
        self.runtime.read().await.shutdown.subscribe()
    }
}

impl std::fmt::Debug for LotteryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LotteryService")
            .field("lottery_address", &self.core.lottery_address())
            .field("wallet", &self.core.wallet)
            .finish()
    }
}

impl ServiceCore {
    fn lottery_address(&self) -> &str {
        &self.config.contracts.lottery_address
    }

    async fn auto_draw_loop(self: Arc<Self>, signal: ShutdownSignal) {
        let period = Duration::from_secs(self.config.draw.interval_secs);
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval_secs = period.as_secs(), "Auto-draw scheduler started");

        loop {
            tokio::select! {
                biased;
                _ = signal.cancelled() => {
                    tracing::info!("Auto-draw scheduler stopped");
                    break;
                }
                _ = ticker.tick() => {
                    tracing::debug!("Auto-draw check triggered");
                    match self.check_and_draw(&signal).await {
                        Ok(decision) => tracing::debug!(?decision, "Auto-draw check complete"),
                        Err(e) if e.is_cancelled() => {
                            tracing::debug!("Auto-draw check cancelled");
                        }
                        Err(e) => {
                            metrics::record_scheduler_error();
                            tracing::error!(error = %e, "Auto-draw check failed");
                        }
                    }
                }
            }
        }
    }

    async fn fetch_info(&self, signal: &ShutdownSignal) -> LotteryServiceResult<LotteryContractInfo> {
        Ok(self.client.get_lottery_info(self.lottery_address(), signal).await?)
    }

    async fn check_and_draw(&self, signal: &ShutdownSignal) -> LotteryServiceResult<DrawDecision> {
        tracing::debug!("Checking draw conditions");
        let info = self.fetch_info(signal).await?;
        let draw = &self.config.draw;

        if !info.lottery_active {
            tracing::debug!("Lottery inactive, skipping");
            return Ok(DrawDecision::Inactive);
        }

        if info.participant_count < draw.min_participants {
            tracing::debug!(
                current = info.participant_count,
                required = draw.min_participants,
                "Not enough participants, skipping"
            );
            return Ok(DrawDecision::InsufficientParticipants {
                current: info.participant_count,
                required: draw.min_participants,
            });
        }

        if info.participant_count >= draw.max_participants {
            tracing::info!(
                participants = info.participant_count,
                round = info.current_round,
                "Participant threshold reached, drawing"
            );
            metrics::record_draw_attempt("scheduler");
            let receipt = self.draw_winner(signal).await?;
            return Ok(DrawDecision::Drawn(receipt));
        }

        tracing::debug!(
            current = info.participant_count,
            threshold = draw.max_participants,
            "Below draw threshold"
        );
        Ok(DrawDecision::BelowThreshold {
            current: info.participant_count,
            threshold: draw.max_participants,
        })
    }

    async fn draw_winner(&self, signal: &ShutdownSignal) -> LotteryServiceResult<DrawReceipt> {
        tracing::info!("Sending draw transaction");

        let info = self.fetch_info(signal).await?;
        if !info.lottery_active {
            return Err(LotteryError::LotteryNotActive);
        }
        let required = self.config.draw.min_participants;
        if info.participant_count < required {
            return Err(LotteryError::InsufficientParticipants {
                current: info.participant_count,
                required,
            });
        }

        let tx = self.wallet.build_draw_winner(self.lottery_address())?;
        let receipt = self.submit_and_confirm(tx, signal).await?;

        tracing::info!(hash = %receipt.hash, round = info.current_round, "Draw succeeded");

        let winner = match self
            .client
            .get_winner(self.lottery_address(), info.current_round, signal)
            .await
        {
            Ok(winner) => {
                tracing::info!(
                    winner = %winner.winner,
                    nft_id = winner.nft_id,
                    round = info.current_round,
                    "Winner drawn"
                );
                Some(winner)
            }
            Err(e) => {
                tracing::warn!(error = %e, round = info.current_round, "Could not fetch winner record");
                None
            }
        };

        Ok(DrawReceipt {
            transaction: receipt,
            round: info.current_round,
            winner,
        })
    }

    async fn start_new_round(&self, signal: &ShutdownSignal) -> LotteryServiceResult<TxReceipt> {
        tracing::info!("Starting new round");

        let info = self.fetch_info(signal).await?;
        if info.lottery_active {
            return Err(LotteryError::RoundInProgress);
        }

        let tx = self.wallet.build_start_new_round(self.lottery_address())?;
        let receipt = self.submit_and_confirm(tx, signal).await?;

        tracing::info!(
            hash = %receipt.hash,
            new_round = info.current_round + 1,
            "New round started"
        );
        Ok(receipt)
    }

    async fn set_nft_contract(&self, signal: &ShutdownSignal) -> LotteryServiceResult<NftContractUpdate> {
        let nft_address = &self.config.contracts.nft_address;
        let info = self.fetch_info(signal).await?;

        if info.nft_contract.as_deref() == Some(nft_address.as_str()) {
            tracing::info!(nft = %nft_address, "NFT contract already set");
            return Ok(NftContractUpdate::AlreadySet);
        }

        let tx = self
            .wallet
            .build_set_nft_contract(self.lottery_address(), nft_address)?;
        let receipt = self.submit_and_confirm(tx, signal).await?;

        tracing::info!(hash = %receipt.hash, nft = %nft_address, "NFT contract updated");
        Ok(NftContractUpdate::Updated(receipt))
    }

    async fn submit_and_confirm(
        &self,
        tx: SignedTransaction,
        signal: &ShutdownSignal,
    ) -> LotteryServiceResult<TxReceipt> {
        let kind = tx.kind();

        let hash = match self.client.send_transaction(&tx, signal).await {
            Ok(hash) => hash,
            Err(e) => {
                metrics::record_transaction(kind, "rejected");
                return Err(e.into());
            }
        };

        let retries = self.config.confirmation.retry_count;
        match self
            .monitor
            .wait_for_confirmation_with_retry(&hash, retries, signal)
            .await
        {
            Ok(confirmation) => {
                metrics::record_transaction(kind, "success");
                Ok(TxReceipt {
                    hash,
                    seqno: tx.seqno(),
                    attempts: confirmation.attempts,
                })
            }
            Err(BlockchainError::Cancelled) => {
                metrics::record_transaction(kind, "cancelled");
                tracing::warn!(hash = %hash, kind = kind, "Confirmation wait cancelled; transaction stays submitted");
                Err(BlockchainError::Cancelled.into())
            }
            Err(e) => {
                metrics::record_transaction(kind, "failed");
                let status = match &e {
                    BlockchainError::ConfirmationExhausted { last_status, .. } => *last_status,
                    BlockchainError::TransactionFailed(_) => TxStatus::Failed,
                    _ => TxStatus::Pending,
                };
                Err(LotteryError::TransactionFailed {
                    hash,
                    status,
                    reason: e.to_string(),
                })
            }
        }
    }
}

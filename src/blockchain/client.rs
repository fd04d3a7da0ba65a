//! Ledger JSON API client with deadlines and cancellation.
//!
//! # Responsibilities
//! - Issue contract reads (`runGetMethod`, `getAddressInformation`)
//! - Submit signed transactions (`sendBoc`) and query their status (`getTransactions`)
//! - Collapse the `{ok, result, error}` envelope into a `Result` immediately
//! - Decode results into domain types, keeping schema errors distinct from transport errors

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use crate::blockchain::transaction::SignedTransaction;
use crate::blockchain::types::{
    AddressInfo, ApiEnvelope, BlockchainError, BlockchainResult, LedgerConfig,
    LotteryContractInfo, LotteryResult, Participant, TxStatus,
};
use crate::lifecycle::ShutdownSignal;
use crate::resilience::{with_deadline, Interrupted};

/// Longest response excerpt carried in a transport error.
const MAX_ERROR_BODY: usize = 200;

/// Stateless client for the ledger's JSON API.
#[derive(Clone)]
pub struct LedgerClient {
    http: reqwest::Client,
    base_url: Url,
    config: LedgerConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl LedgerClient {
    /// Create a new ledger client.
    pub fn new(config: LedgerConfig) -> BlockchainResult<Self> {
        let mut endpoint = config.api_endpoint.clone();
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }
        let base_url = Url::parse(&endpoint).map_err(|e| {
            BlockchainError::Configuration(format!(
                "Invalid API endpoint '{}': {}",
                config.api_endpoint, e
            ))
        })?;

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| BlockchainError::Configuration(format!("HTTP client: {}", e)))?;

        tracing::info!(
            api_endpoint = %base_url,
            network = %config.network,
            "Ledger client initialized"
        );

        Ok(Self {
            http,
            base_url,
            timeout_duration: Duration::from_secs(config.request_timeout_secs),
            config,
        })
    }

    /// Execute a read-only contract method.
    pub async fn run_get_method(
        &self,
        address: &str,
        method: &str,
        stack: Vec<Value>,
        signal: &ShutdownSignal,
    ) -> BlockchainResult<Value> {
        tracing::debug!(address = %address, method = %method, "Running get method");

        let body = json!({
            "address": address,
            "method": method,
            "stack": stack,
        });
        let result = self
            .request(Method::POST, "runGetMethod", &[], Some(body), signal)
            .await?;

        tracing::debug!(method = %method, "Get method succeeded");
        Ok(result)
    }

    /// Get account-level information for an address.
    pub async fn get_address_information(
        &self,
        address: &str,
        signal: &ShutdownSignal,
    ) -> BlockchainResult<AddressInfo> {
        let result = self
            .request(
                Method::GET,
                "getAddressInformation",
                &[("address", address)],
                None,
                signal,
            )
            .await?;
        let info: AddressInfo = decode("address information", result)?;

        tracing::debug!(
            address = %info.address,
            balance = %info.balance,
            state = %info.state,
            "Address information fetched"
        );
        Ok(info)
    }

    /// Submit a signed transaction and return its hash.
    pub async fn send_transaction(
        &self,
        transaction: &SignedTransaction,
        signal: &ShutdownSignal,
    ) -> BlockchainResult<String> {
        tracing::debug!(
            seqno = transaction.seqno(),
            kind = transaction.kind(),
            "Submitting transaction"
        );

        let body = json!({ "boc": transaction.to_hex() });
        let result = self
            .request(Method::POST, "sendBoc", &[], Some(body), signal)
            .await?;

        let hash = result
            .get("hash")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                BlockchainError::MalformedResponse("missing or non-string transaction hash".to_string())
            })?
            .to_string();

        tracing::info!(hash = %hash, kind = transaction.kind(), "Transaction submitted");
        Ok(hash)
    }

    /// Query the status of a submitted transaction.
    pub async fn get_transaction_status(
        &self,
        hash: &str,
        signal: &ShutdownSignal,
    ) -> BlockchainResult<TxStatus> {
        let result = self
            .request(Method::GET, "getTransactions", &[("hash", hash)], None, signal)
            .await?;
        let records: Vec<Value> = decode("transaction list", result)?;

        let status = match records.first() {
            None => TxStatus::Pending,
            Some(record) => match record.get("success").and_then(Value::as_bool) {
                Some(true) => TxStatus::Success,
                Some(false) => TxStatus::Failed,
                None => {
                    tracing::warn!(hash = %hash, "Transaction record without success flag");
                    TxStatus::Pending
                }
            },
        };

        tracing::debug!(hash = %hash, status = %status, "Transaction status fetched");
        Ok(status)
    }

    /// Fetch a fresh snapshot of the lottery contract.
    pub async fn get_lottery_info(
        &self,
        contract_address: &str,
        signal: &ShutdownSignal,
    ) -> BlockchainResult<LotteryContractInfo> {
        let result = self
            .run_get_method(contract_address, "getContractInfo", Vec::new(), signal)
            .await?;
        let info: LotteryContractInfo = decode("contract info", result)?;

        tracing::debug!(
            round = info.current_round,
            active = info.lottery_active,
            participants = info.participant_count,
            "Lottery state fetched"
        );
        Ok(info)
    }

    /// Fetch a participant of the current round by index.
    pub async fn get_participant(
        &self,
        contract_address: &str,
        index: u32,
        signal: &ShutdownSignal,
    ) -> BlockchainResult<Participant> {
        let result = self
            .run_get_method(contract_address, "getParticipant", vec![json!(index)], signal)
            .await?;
        decode("participant", result)
    }

    /// Fetch the winner record of a round.
    pub async fn get_winner(
        &self,
        contract_address: &str,
        round: u64,
        signal: &ShutdownSignal,
    ) -> BlockchainResult<LotteryResult> {
        let result = self
            .run_get_method(contract_address, "getWinner", vec![json!(round)], signal)
            .await?;
        let winner: LotteryResult = decode("winner record", result)?;

        tracing::debug!(winner = %winner.winner, nft_id = winner.nft_id, "Winner record fetched");
        Ok(winner)
    }

    /// Fetch the contract balance in nano units.
    pub async fn get_contract_balance(
        &self,
        contract_address: &str,
        signal: &ShutdownSignal,
    ) -> BlockchainResult<u64> {
        let result = self
            .run_get_method(contract_address, "getBalance", Vec::new(), signal)
            .await?;
        decode("balance", result)
    }

    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
        signal: &ShutdownSignal,
    ) -> BlockchainResult<Value> {
        let url = self.base_url.join(endpoint).map_err(|e| {
            BlockchainError::Configuration(format!("Invalid endpoint '{}': {}", endpoint, e))
        })?;

        let mut builder = self.http.request(method, url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let exchange = async {
            let response = builder
                .send()
                .await
                .map_err(|e| BlockchainError::Transport(e.to_string()))?;
            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| BlockchainError::Transport(e.to_string()))?;
            Ok::<_, BlockchainError>((status, text))
        };

        let (status, text) = match with_deadline(self.timeout_duration, signal, exchange).await {
            Ok(res) => res?,
            Err(Interrupted::Cancelled) => {
                tracing::debug!(endpoint = %endpoint, "Request cancelled");
                return Err(BlockchainError::Cancelled);
            }
            Err(Interrupted::TimedOut) => {
                tracing::warn!(endpoint = %endpoint, "Request timed out");
                return Err(BlockchainError::Timeout(self.config.request_timeout_secs));
            }
        };

        let envelope: ApiEnvelope = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(BlockchainError::Transport(format!(
                    "HTTP {}: {}",
                    status,
                    excerpt(&text)
                )));
            }
            Err(e) => {
                return Err(BlockchainError::MalformedResponse(format!(
                    "invalid envelope from {}: {}",
                    endpoint, e
                )));
            }
        };

        envelope.into_result()
    }
}

impl std::fmt::Debug for LedgerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerClient")
            .field("api_endpoint", &self.base_url.as_str())
            .field("network", &self.config.network)
            .field("timeout_secs", &self.config.request_timeout_secs)
            .finish()
    }
}

fn decode<T: DeserializeOwned>(what: &'static str, value: Value) -> BlockchainResult<T> {
    serde_json::from_value(value).map_err(|e| BlockchainError::SchemaMismatch {
        what,
        reason: e.to_string(),
    })
}

fn excerpt(text: &str) -> &str {
    match text.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

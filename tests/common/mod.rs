//! Shared utilities for integration testing: a programmable mock ledger.
#![allow(dead_code)]

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use lottery_keeper::KeeperConfig;

/// Test seed; any 32 bytes work.
pub const TEST_SEED: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";
pub const LOTTERY_ADDRESS: &str = "EQLotteryTest123";
pub const NFT_ADDRESS: &str = "EQNFTTest456";

/// What the mock answers to one status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusReply {
    /// Empty record list.
    #[default]
    Pending,
    Success,
    Failed,
    /// HTTP 500 with a plain-text body.
    HttpError,
    /// `{"ok": false, "error": ...}`
    ApiError,
}

#[derive(Default)]
struct LedgerState {
    contract_info: Value,
    balance: u64,
    winner: Option<Value>,
    status_script: VecDeque<StatusReply>,
    default_status: StatusReply,
    submissions: Vec<String>,
    status_queries: usize,
    reject_submissions: bool,
    submission_body: Option<String>,
}

/// Handle to a running mock ledger.
#[derive(Clone)]
pub struct MockLedger {
    pub url: String,
    state: Arc<Mutex<LedgerState>>,
}

impl MockLedger {
    /// Start the mock on an ephemeral port with an active, empty round.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(LedgerState {
            contract_info: contract_info(true, 0, 1),
            balance: 5_000_000_000,
            ..Default::default()
        }));

        let app = Router::new()
            .route("/runGetMethod", post(run_get_method))
            .route("/sendBoc", post(send_boc))
            .route("/getTransactions", get(get_transactions))
            .route("/getAddressInformation", get(get_address_information))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}/", addr),
            state,
        }
    }

    pub fn set_contract_info(&self, info: Value) {
        self.state.lock().unwrap().contract_info = info;
    }

    pub fn set_winner(&self, winner: Value) {
        self.state.lock().unwrap().winner = Some(winner);
    }

    /// Replies consumed in order by status queries before falling back to the default.
    pub fn script_statuses(&self, replies: &[StatusReply]) {
        self.state.lock().unwrap().status_script.extend(replies.iter().copied());
    }

    pub fn set_default_status(&self, reply: StatusReply) {
        self.state.lock().unwrap().default_status = reply;
    }

    pub fn reject_submissions(&self) {
        self.state.lock().unwrap().reject_submissions = true;
    }

    /// Answer `sendBoc` with this raw body and HTTP 200.
    pub fn set_submission_body(&self, body: &str) {
        self.state.lock().unwrap().submission_body = Some(body.to_string());
    }

    /// Hex payloads received by `sendBoc`, in order.
    pub fn submissions(&self) -> Vec<String> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn status_queries(&self) -> usize {
        self.state.lock().unwrap().status_queries
    }
}

/// Contract snapshot as the ledger returns it.
pub fn contract_info(active: bool, participants: u32, round: u64) -> Value {
    json!({
        "owner": "EQOwner",
        "entry_fee": 100_000_000u64,
        "max_participants": 10,
        "current_round": round,
        "lottery_active": active,
        "participant_count": participants,
    })
}

/// Manual-mode config pointed at the mock with fast confirmation settings.
pub fn keeper_config(ledger_url: &str) -> KeeperConfig {
    let mut config = KeeperConfig::default();
    config.ledger.api_endpoint = ledger_url.to_string();
    config.ledger.request_timeout_secs = 5;
    config.contracts.lottery_address = LOTTERY_ADDRESS.to_string();
    config.contracts.nft_address = NFT_ADDRESS.to_string();
    config.wallet.private_key = Some(TEST_SEED.to_string());
    config.draw.auto_draw = false;
    config.draw.min_participants = 2;
    config.draw.max_participants = 10;
    config.confirmation.poll_interval_ms = 20;
    config.confirmation.timeout_secs = 2;
    config.confirmation.retry_count = 3;
    config.confirmation.retry_delay_ms = 10;
    config
}

fn ok(result: Value) -> Response {
    Json(json!({ "ok": true, "result": result })).into_response()
}

fn api_error(message: &str) -> Response {
    Json(json!({ "ok": false, "error": message })).into_response()
}

#[derive(Deserialize)]
struct GetMethodRequest {
    method: String,
    #[serde(default)]
    stack: Vec<Value>,
}

async fn run_get_method(
    State(state): State<Arc<Mutex<LedgerState>>>,
    Json(req): Json<GetMethodRequest>,
) -> Response {
    let state = state.lock().unwrap();
    match req.method.as_str() {
        "getContractInfo" => ok(state.contract_info.clone()),
        "getBalance" => ok(json!(state.balance)),
        "getWinner" => match &state.winner {
            Some(winner) => ok(winner.clone()),
            None => api_error("winner not found"),
        },
        "getParticipant" => {
            let index = req.stack.first().and_then(Value::as_u64).unwrap_or(0);
            ok(json!({
                "address": format!("EQPlayer{}", index),
                "amount": 100_000_000u64,
                "timestamp": 1_700_000_000u64 + index,
            }))
        }
        other => api_error(&format!("unknown method {}", other)),
    }
}

#[derive(Deserialize)]
struct SendBocRequest {
    boc: String,
}

async fn send_boc(
    State(state): State<Arc<Mutex<LedgerState>>>,
    Json(req): Json<SendBocRequest>,
) -> Response {
    let mut state = state.lock().unwrap();
    if state.reject_submissions {
        return api_error("seqno mismatch");
    }
    state.submissions.push(req.boc);
    if let Some(body) = &state.submission_body {
        return (StatusCode::OK, body.clone()).into_response();
    }
    ok(json!({ "hash": format!("tx-{}", state.submissions.len()) }))
}

async fn get_transactions(
    State(state): State<Arc<Mutex<LedgerState>>>,
    Query(_params): Query<HashMap<String, String>>,
) -> Response {
    let mut state = state.lock().unwrap();
    state.status_queries += 1;
    let reply = state
        .status_script
        .pop_front()
        .unwrap_or(state.default_status);

    match reply {
        StatusReply::Pending => ok(json!([])),
        StatusReply::Success => ok(json!([{ "success": true }])),
        StatusReply::Failed => ok(json!([{ "success": false }])),
        StatusReply::HttpError => {
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        }
        StatusReply::ApiError => api_error("rate limited"),
    }
}

async fn get_address_information(Query(params): Query<HashMap<String, String>>) -> Response {
    let address = params.get("address").cloned().unwrap_or_default();
    ok(json!({
        "address": address,
        "balance": "1000000000",
        "state": "active",
    }))
}

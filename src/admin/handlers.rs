use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::admin::AdminState;
use crate::blockchain::{AddressInfo, BlockchainError, LotteryContractInfo, LotteryResult, Participant};
use crate::lottery::{
    DrawReceipt, LotteryError, NftContractUpdate, ServiceStatus, TxReceipt,
};

#[derive(Serialize)]
pub struct BalanceResponse {
    pub address: String,
    pub balance: u64,
}

#[derive(Serialize)]
pub struct WalletResponse {
    pub address: String,
}

/// Service error rendered as `{"error": ...}` with a mapped status code.
pub struct ApiError(LotteryError);

impl From<LotteryError> for ApiError {
    fn from(err: LotteryError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            e if e.is_precondition() => StatusCode::CONFLICT,
            e if e.is_cancelled() => StatusCode::SERVICE_UNAVAILABLE,
            LotteryError::TransactionFailed { .. } => StatusCode::BAD_GATEWAY,
            LotteryError::Blockchain(e) => match e {
                BlockchainError::Transport(_)
                | BlockchainError::RemoteApi(_)
                | BlockchainError::MalformedResponse(_)
                | BlockchainError::SchemaMismatch { .. }
                | BlockchainError::Timeout(_)
                | BlockchainError::TransactionFailed(_)
                | BlockchainError::ConfirmationTimeout { .. }
                | BlockchainError::ConfirmationExhausted { .. } => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, status = status.as_u16(), "Admin request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

pub async fn get_status(State(state): State<AdminState>) -> Json<ServiceStatus> {
    Json(state.service.get_status().await)
}

pub async fn get_contract(State(state): State<AdminState>) -> ApiResult<LotteryContractInfo> {
    Ok(Json(state.service.get_contract_info().await?))
}

pub async fn get_balance(State(state): State<AdminState>) -> ApiResult<BalanceResponse> {
    let balance = state.service.get_contract_balance().await?;
    Ok(Json(BalanceResponse {
        address: state.lottery_address.to_string(),
        balance,
    }))
}

pub async fn get_address(
    State(state): State<AdminState>,
    Path(address): Path<String>,
) -> ApiResult<AddressInfo> {
    Ok(Json(state.service.get_address_information(&address).await?))
}

pub async fn get_participant(
    State(state): State<AdminState>,
    Path(index): Path<u32>,
) -> ApiResult<Participant> {
    Ok(Json(state.service.get_participant(index).await?))
}

pub async fn get_winner(
    State(state): State<AdminState>,
    Path(round): Path<u64>,
) -> ApiResult<LotteryResult> {
    Ok(Json(state.service.get_winner(round).await?))
}

pub async fn get_wallet(State(state): State<AdminState>) -> Json<WalletResponse> {
    Json(WalletResponse {
        address: state.service.get_wallet_address().to_string(),
    })
}

pub async fn post_draw(State(state): State<AdminState>) -> ApiResult<DrawReceipt> {
    tracing::info!("Manual draw requested via admin API");
    Ok(Json(state.service.send_draw_winner().await?))
}

pub async fn post_round(State(state): State<AdminState>) -> ApiResult<TxReceipt> {
    tracing::info!("New round requested via admin API");
    Ok(Json(state.service.send_start_new_round().await?))
}

pub async fn post_nft(State(state): State<AdminState>) -> ApiResult<NftContractUpdate> {
    tracing::info!("NFT contract update requested via admin API");
    Ok(Json(state.service.send_set_nft_contract().await?))
}

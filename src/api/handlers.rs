//! REST API handlers for wallet operations

use crate::api::websocket::WsBroadcaster;
use crate::engine::{EventRecord, Proposal, QuorumEngine, TransferLedger, WalletError};
use crate::storage::Storage;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<RwLock<QuorumEngine>>,
    pub ledger: Arc<RwLock<TransferLedger>>,
    pub storage: Arc<Storage>,
    pub ws_broadcaster: Arc<WsBroadcaster>,
}

/// Handler result: JSON body or status code plus error body
type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct WalletInfo {
    pub scheme: String,
    pub principals: usize,
    pub quorum: usize,
    pub balance: u64,
    pub proposals: usize,
    pub pending: usize,
    pub executed: usize,
}

#[derive(Serialize)]
pub struct PrincipalsResponse {
    pub principals: Vec<String>,
    pub quorum: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProposalInfo {
    pub id: u64,
    pub target: String,
    pub value: u64,
    pub payload: String,
    pub executed: bool,
    pub confirmation_count: usize,
    pub confirmed_by: Vec<String>,
    pub submitted_by: String,
    pub submitted_at: String,
    pub executed_at: Option<String>,
}

impl From<&Proposal> for ProposalInfo {
    fn from(proposal: &Proposal) -> Self {
        Self {
            id: proposal.id,
            target: proposal.target.clone(),
            value: proposal.value,
            payload: hex::encode(&proposal.payload),
            executed: proposal.executed,
            confirmation_count: proposal.confirmation_count,
            confirmed_by: proposal
                .confirmed_by()
                .into_iter()
                .map(String::from)
                .collect(),
            submitted_by: proposal.submitted_by.clone(),
            submitted_at: proposal.submitted_at.to_rfc3339(),
            executed_at: proposal.executed_at.map(|at| at.to_rfc3339()),
        }
    }
}

#[derive(Serialize)]
pub struct ConfirmationsResponse {
    pub id: u64,
    pub confirmation_count: usize,
    pub quorum: usize,
    pub confirmed_by: Vec<String>,
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub balance: u64,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct ApiError {
    pub error: String,
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct DepositRequest {
    pub from: String,
    pub amount: u64,
}

#[derive(Deserialize)]
pub struct SubmitRequest {
    pub caller: String,
    pub target: String,
    pub value: u64,
    /// Hex-encoded action payload
    pub payload: Option<String>,
}

#[derive(Deserialize)]
pub struct ActionRequest {
    pub caller: String,
}

#[derive(Deserialize)]
pub struct QuorumChangeRequest {
    pub caller: String,
    pub new_quorum: usize,
}

// ============================================================================
// Error mapping
// ============================================================================

fn wallet_error(e: &WalletError) -> (StatusCode, Json<ApiError>) {
    let status = match e {
        WalletError::NotFound(_) | WalletError::OutOfRange { .. } => StatusCode::NOT_FOUND,
        WalletError::NotAuthorized(_) => StatusCode::FORBIDDEN,
        WalletError::AlreadyExecuted(_)
        | WalletError::AlreadyConfirmed { .. }
        | WalletError::NotConfirmed { .. } => StatusCode::CONFLICT,
        WalletError::ExecutionFailed { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::BAD_REQUEST,
    };
    (status, Json(ApiError {
        error: e.to_string(),
    }))
}

fn bad_request(message: String) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(ApiError { error: message }))
}

/// Persist the wallet after a committed mutation
async fn persist(state: &ApiState) {
    let engine = state.engine.read().await;
    let ledger = state.ledger.read().await;
    if let Err(e) = state.storage.save(&engine, &ledger) {
        log::error!("Failed to save wallet: {}", e);
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health - Liveness check
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /api/wallet - Wallet status summary
pub async fn get_wallet_info(State(state): State<ApiState>) -> Json<WalletInfo> {
    let engine = state.engine.read().await;

    Json(WalletInfo {
        scheme: engine.description(),
        principals: engine.principal_count(),
        quorum: engine.quorum(),
        balance: engine.balance(),
        proposals: engine.proposal_count(),
        pending: engine.pending_proposals().len(),
        executed: engine.executed_count(),
    })
}

/// GET /api/principals - List principals and the quorum
pub async fn get_principals(State(state): State<ApiState>) -> Json<PrincipalsResponse> {
    let engine = state.engine.read().await;

    Json(PrincipalsResponse {
        principals: engine.principals().to_vec(),
        quorum: engine.quorum(),
    })
}

/// GET /api/proposals - List all proposals
pub async fn list_proposals(State(state): State<ApiState>) -> Json<Vec<ProposalInfo>> {
    let engine = state.engine.read().await;
    Json(engine.proposals().map(ProposalInfo::from).collect())
}

/// GET /api/proposals/:id - Get proposal detail
pub async fn get_proposal(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
) -> ApiResult<ProposalInfo> {
    let engine = state.engine.read().await;
    let proposal = engine.proposal(id).map_err(|e| wallet_error(&e))?;
    Ok(Json(ProposalInfo::from(proposal)))
}

/// GET /api/proposals/:id/confirmations - Confirmation status
pub async fn get_confirmations(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
) -> ApiResult<ConfirmationsResponse> {
    let engine = state.engine.read().await;
    let proposal = engine.proposal(id).map_err(|e| wallet_error(&e))?;

    Ok(Json(ConfirmationsResponse {
        id,
        confirmation_count: proposal.confirmation_count,
        quorum: engine.quorum(),
        confirmed_by: proposal
            .confirmed_by()
            .into_iter()
            .map(String::from)
            .collect(),
    }))
}

/// GET /api/events - The recorded audit stream
pub async fn get_events(State(state): State<ApiState>) -> Json<Vec<EventRecord>> {
    let engine = state.engine.read().await;
    Json(engine.events().to_vec())
}

/// POST /api/deposit - Receive value from outside
pub async fn post_deposit(
    State(state): State<ApiState>,
    Json(req): Json<DepositRequest>,
) -> Json<BalanceResponse> {
    let balance = {
        let mut engine = state.engine.write().await;
        engine.deposit(&req.from, req.amount);
        engine.balance()
    };
    persist(&state).await;

    Json(BalanceResponse { balance })
}

/// POST /api/proposals - Submit a new proposal
pub async fn submit_proposal(
    State(state): State<ApiState>,
    Json(req): Json<SubmitRequest>,
) -> ApiResult<ProposalInfo> {
    let payload = match &req.payload {
        Some(h) => hex::decode(h).map_err(|e| bad_request(format!("invalid payload hex: {}", e)))?,
        None => Vec::new(),
    };

    let info = {
        let mut engine = state.engine.write().await;
        let mut ledger = state.ledger.write().await;
        let id = engine
            .submit(&req.caller, &req.target, req.value, payload, &mut *ledger)
            .map_err(|e| wallet_error(&e))?;
        ProposalInfo::from(engine.proposal(id).map_err(|e| wallet_error(&e))?)
    };
    persist(&state).await;

    Ok(Json(info))
}

/// POST /api/proposals/:id/confirm - Confirm a proposal
pub async fn confirm_proposal(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
    Json(req): Json<ActionRequest>,
) -> ApiResult<ProposalInfo> {
    let info = {
        let mut engine = state.engine.write().await;
        let mut ledger = state.ledger.write().await;
        engine
            .confirm(&req.caller, id, &mut *ledger)
            .map_err(|e| wallet_error(&e))?;
        ProposalInfo::from(engine.proposal(id).map_err(|e| wallet_error(&e))?)
    };
    persist(&state).await;

    Ok(Json(info))
}

/// POST /api/proposals/:id/revoke - Withdraw a confirmation
pub async fn revoke_proposal(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
    Json(req): Json<ActionRequest>,
) -> ApiResult<ProposalInfo> {
    let info = {
        let mut engine = state.engine.write().await;
        engine
            .revoke(&req.caller, id)
            .map_err(|e| wallet_error(&e))?;
        ProposalInfo::from(engine.proposal(id).map_err(|e| wallet_error(&e))?)
    };
    persist(&state).await;

    Ok(Json(info))
}

/// POST /api/proposals/:id/execute - Execute a quorum-satisfying proposal
pub async fn execute_proposal(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
    Json(req): Json<ActionRequest>,
) -> ApiResult<ProposalInfo> {
    let info = {
        let mut engine = state.engine.write().await;
        let mut ledger = state.ledger.write().await;
        engine
            .execute(&req.caller, id, &mut *ledger)
            .map_err(|e| wallet_error(&e))?;
        ProposalInfo::from(engine.proposal(id).map_err(|e| wallet_error(&e))?)
    };
    persist(&state).await;

    Ok(Json(info))
}

/// POST /api/quorum - Submit a self-governed quorum change proposal
pub async fn change_quorum(
    State(state): State<ApiState>,
    Json(req): Json<QuorumChangeRequest>,
) -> ApiResult<ProposalInfo> {
    let info = {
        let mut engine = state.engine.write().await;
        let mut ledger = state.ledger.write().await;
        let id = engine
            .submit_quorum_change(&req.caller, req.new_quorum, &mut *ledger)
            .map_err(|e| wallet_error(&e))?;
        ProposalInfo::from(engine.proposal(id).map_err(|e| wallet_error(&e))?)
    };
    persist(&state).await;

    Ok(Json(info))
}

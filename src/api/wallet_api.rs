//! 钱包 API
//!
//! GET 接口的查询参数、POST 接口的 JSON 对象原样作为上游参数转发；
//! 带 `amounts` 的请求在服务层统一规范精度。

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Extension, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    api::{
        extract::{ApiJson, ApiQuery},
        middleware::TraceId,
        response::{success_response, ApiResult},
    },
    app_state::AppState,
    domain::{ParameterSet, Transaction, WalletError},
    error::AppError,
    service::{
        multisig_service::MAX_SIGNERS, AddressInfo, BalanceInfo, MultiSigService,
        WithdrawalSummary,
    },
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/balance", get(balance))
        .route("/addresses", get(list_addresses).post(create_address))
        .route("/addresses/balance", get(address_balance))
        .route("/addresses/by-label", get(address_by_label))
        .route("/addresses/archive", post(archive_addresses))
        .route("/addresses/unarchive", post(unarchive_addresses))
        .route("/addresses/archived", get(archived_addresses))
        .route("/fee-estimate", post(network_fee_estimate))
        .route("/withdrawals", post(withdraw))
        .route("/withdrawals/from-addresses", post(withdraw_from_addresses))
        .route("/withdrawals/from-labels", post(withdraw_from_labels))
        .route("/transactions", get(transactions))
        .route("/prices", get(current_price))
        .route("/green/addresses", get(is_green_address))
        .route("/green/transactions", get(is_green_transaction))
        .route("/pending", get(pending_receipts))
        .route("/pending/amount", get(expected_pending_amount))
        .route("/multisig", post(create_multisig_address))
        .route("/multisig/by-label", get(dtrust_info_by_label))
        .route("/multisig/withdrawals", post(multi_withdraw))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 余额 / 地址
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// GET /api/wallet/balance
pub async fn balance(
    State(state): State<Arc<AppState>>,
    Extension(trace): Extension<TraceId>,
) -> ApiResult<BalanceInfo> {
    let info = state
        .wallet_service
        .balance_info()
        .await
        .map_err(|e| trace.attach(e))?;
    success_response(info)
}

#[derive(Debug, Deserialize)]
pub struct ListAddressesQuery {
    #[serde(default = "default_true")]
    pub with_balances: bool,
}

fn default_true() -> bool {
    true
}

/// GET /api/wallet/addresses?with_balances=false
///
/// 地址数超过 2500 时建议关闭余额，改用 `/addresses/balance` 分批查询
pub async fn list_addresses(
    State(state): State<Arc<AppState>>,
    Extension(trace): Extension<TraceId>,
    ApiQuery(query): ApiQuery<ListAddressesQuery>,
) -> ApiResult<Value> {
    let service = &state.wallet_service;
    let data = if query.with_balances {
        service.addresses_info().await
    } else {
        service.addresses_info_without_balances().await
    }
    .map_err(|e| trace.attach(e))?;
    success_response(data)
}

/// POST /api/wallet/addresses  body: {"label": "shibe1"}
pub async fn create_address(
    State(state): State<Arc<AppState>>,
    Extension(trace): Extension<TraceId>,
    ApiJson(params): ApiJson<ParameterSet>,
) -> ApiResult<AddressInfo> {
    let info = state
        .wallet_service
        .create_address(params)
        .await
        .map_err(|e| trace.attach(e))?;
    tracing::info!(address = %info.address, label = ?info.label, "address_created");
    success_response(info)
}

/// GET /api/wallet/addresses/balance?addresses=A,B 或 ?labels=l1,l2
pub async fn address_balance(
    State(state): State<Arc<AppState>>,
    Extension(trace): Extension<TraceId>,
    ApiQuery(params): ApiQuery<ParameterSet>,
) -> ApiResult<Value> {
    require_any(&params, &["addresses", "labels", "user_ids"]).map_err(|e| trace.attach(e))?;
    let data = state
        .wallet_service
        .address_balance(params)
        .await
        .map_err(|e| trace.attach(e))?;
    success_response(data)
}

/// GET /api/wallet/addresses/by-label?label=shibe1
pub async fn address_by_label(
    State(state): State<Arc<AppState>>,
    Extension(trace): Extension<TraceId>,
    ApiQuery(params): ApiQuery<ParameterSet>,
) -> ApiResult<AddressInfo> {
    require_any(&params, &["label"]).map_err(|e| trace.attach(e))?;
    let info = state
        .wallet_service
        .address_by_label(params)
        .await
        .map_err(|e| trace.attach(e))?;
    success_response(info)
}

/// POST /api/wallet/addresses/archive
pub async fn archive_addresses(
    State(state): State<Arc<AppState>>,
    Extension(trace): Extension<TraceId>,
    ApiJson(params): ApiJson<ParameterSet>,
) -> ApiResult<Value> {
    require_any(&params, &["addresses", "labels"]).map_err(|e| trace.attach(e))?;
    let data = state
        .wallet_service
        .archive_addresses(params)
        .await
        .map_err(|e| trace.attach(e))?;
    success_response(data)
}

/// POST /api/wallet/addresses/unarchive
pub async fn unarchive_addresses(
    State(state): State<Arc<AppState>>,
    Extension(trace): Extension<TraceId>,
    ApiJson(params): ApiJson<ParameterSet>,
) -> ApiResult<Value> {
    require_any(&params, &["addresses", "labels"]).map_err(|e| trace.attach(e))?;
    let data = state
        .wallet_service
        .unarchive_addresses(params)
        .await
        .map_err(|e| trace.attach(e))?;
    success_response(data)
}

/// GET /api/wallet/addresses/archived
pub async fn archived_addresses(
    State(state): State<Arc<AppState>>,
    Extension(trace): Extension<TraceId>,
) -> ApiResult<Value> {
    let data = state
        .wallet_service
        .archived_addresses()
        .await
        .map_err(|e| trace.attach(e))?;
    success_response(data)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 手续费 / 提现
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// POST /api/wallet/fee-estimate  body: {"amounts": "1.5", "to_addresses": "..."}
pub async fn network_fee_estimate(
    State(state): State<Arc<AppState>>,
    Extension(trace): Extension<TraceId>,
    ApiJson(params): ApiJson<ParameterSet>,
) -> ApiResult<Value> {
    let data = state
        .wallet_service
        .network_fee_estimate(params)
        .await
        .map_err(|e| trace.attach(e))?;
    success_response(data)
}

/// POST /api/wallet/withdrawals  body: {"amounts": "1,2.5", "to_addresses": "A,B"}
pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    Extension(trace): Extension<TraceId>,
    ApiJson(params): ApiJson<ParameterSet>,
) -> ApiResult<WithdrawalSummary> {
    require_any(&params, &["amounts"]).map_err(|e| trace.attach(e))?;
    let summary = state
        .wallet_service
        .withdraw(params)
        .await
        .map_err(|e| trace.attach(e))?;
    log_withdrawal("withdraw", &summary);
    success_response(summary)
}

/// POST /api/wallet/withdrawals/from-addresses
pub async fn withdraw_from_addresses(
    State(state): State<Arc<AppState>>,
    Extension(trace): Extension<TraceId>,
    ApiJson(params): ApiJson<ParameterSet>,
) -> ApiResult<WithdrawalSummary> {
    require_any(&params, &["amounts"]).map_err(|e| trace.attach(e))?;
    require_any(&params, &["from_addresses"]).map_err(|e| trace.attach(e))?;
    let summary = state
        .wallet_service
        .withdraw_from_addresses(params)
        .await
        .map_err(|e| trace.attach(e))?;
    log_withdrawal("withdraw_from_addresses", &summary);
    success_response(summary)
}

/// POST /api/wallet/withdrawals/from-labels
pub async fn withdraw_from_labels(
    State(state): State<Arc<AppState>>,
    Extension(trace): Extension<TraceId>,
    ApiJson(params): ApiJson<ParameterSet>,
) -> ApiResult<WithdrawalSummary> {
    require_any(&params, &["amounts"]).map_err(|e| trace.attach(e))?;
    require_any(&params, &["from_labels"]).map_err(|e| trace.attach(e))?;
    let summary = state
        .wallet_service
        .withdraw_from_labels(params)
        .await
        .map_err(|e| trace.attach(e))?;
    log_withdrawal("withdraw_from_labels", &summary);
    success_response(summary)
}

fn log_withdrawal(kind: &str, summary: &WithdrawalSummary) {
    tracing::info!(
        kind,
        txid = %summary.txid,
        amount_sent = %summary.amount_sent,
        network_fee = %summary.network_fee,
        "withdrawal_submitted"
    );
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 交易 / 价格 / 绿色地址
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// GET /api/wallet/transactions?type=received&before_tx=...
pub async fn transactions(
    State(state): State<Arc<AppState>>,
    Extension(trace): Extension<TraceId>,
    ApiQuery(params): ApiQuery<ParameterSet>,
) -> ApiResult<Value> {
    require_any(&params, &["type"]).map_err(|e| trace.attach(e))?;
    let data = state
        .wallet_service
        .transactions(params)
        .await
        .map_err(|e| trace.attach(e))?;
    success_response(data)
}

/// GET /api/wallet/prices?price_base=USD
pub async fn current_price(
    State(state): State<Arc<AppState>>,
    Extension(trace): Extension<TraceId>,
    ApiQuery(params): ApiQuery<ParameterSet>,
) -> ApiResult<Value> {
    let data = state
        .wallet_service
        .current_price(params)
        .await
        .map_err(|e| trace.attach(e))?;
    success_response(data)
}

/// GET /api/wallet/green/addresses?addresses=A,B
pub async fn is_green_address(
    State(state): State<Arc<AppState>>,
    Extension(trace): Extension<TraceId>,
    ApiQuery(params): ApiQuery<ParameterSet>,
) -> ApiResult<Value> {
    require_any(&params, &["addresses"]).map_err(|e| trace.attach(e))?;
    let data = state
        .wallet_service
        .is_green_address(params)
        .await
        .map_err(|e| trace.attach(e))?;
    success_response(data)
}

/// GET /api/wallet/green/transactions?transaction_ids=t1,t2
pub async fn is_green_transaction(
    State(state): State<Arc<AppState>>,
    Extension(trace): Extension<TraceId>,
    ApiQuery(params): ApiQuery<ParameterSet>,
) -> ApiResult<Value> {
    require_any(&params, &["transaction_ids"]).map_err(|e| trace.attach(e))?;
    let data = state
        .wallet_service
        .is_green_transaction(params)
        .await
        .map_err(|e| trace.attach(e))?;
    success_response(data)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 待确认收款
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    pub address: String,
    pub threshold: f64,
    /// 只累加发给 `address` 的收款
    #[serde(default)]
    pub recipient_only: bool,
}

#[derive(Debug, Serialize)]
pub struct PendingAmountResponse {
    pub address: String,
    pub threshold: f64,
    pub recipient_only: bool,
    pub amount: Decimal,
}

/// GET /api/wallet/pending?address=...&threshold=0.9
pub async fn pending_receipts(
    State(state): State<Arc<AppState>>,
    Extension(trace): Extension<TraceId>,
    ApiQuery(query): ApiQuery<PendingQuery>,
) -> ApiResult<Vec<Transaction>> {
    let pending = state
        .confidence_aggregator
        .pending_receipts(&query.address, query.threshold)
        .await
        .map_err(|e| trace.attach(e))?;
    success_response(pending)
}

/// GET /api/wallet/pending/amount?address=...&threshold=0.9&recipient_only=true
pub async fn expected_pending_amount(
    State(state): State<Arc<AppState>>,
    Extension(trace): Extension<TraceId>,
    ApiQuery(query): ApiQuery<PendingQuery>,
) -> ApiResult<PendingAmountResponse> {
    let aggregator = &state.confidence_aggregator;
    let amount = if query.recipient_only {
        aggregator
            .expected_pending_amount_for_recipient(&query.address, query.threshold)
            .await
    } else {
        aggregator
            .expected_pending_amount(&query.address, query.threshold)
            .await
    }
    .map_err(|e| trace.attach(e))?;

    success_response(PendingAmountResponse {
        address: query.address,
        threshold: query.threshold,
        recipient_only: query.recipient_only,
        amount,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 多签（dTrust）
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// 多签地址创建请求
///
/// `passphrases` 依次对应第 1..=4 个参与方，口令不会写入日志
#[derive(Deserialize)]
pub struct CreateMultisigRequest {
    pub label: String,
    pub required_signatures: u32,
    pub passphrases: Vec<String>,
}

/// 口令列表 -> 固定 4 个槽位
fn signer_slots(passphrases: &[String]) -> Result<[Option<&str>; MAX_SIGNERS], WalletError> {
    if passphrases.len() > MAX_SIGNERS {
        return Err(WalletError::InvalidParameter(format!(
            "at most {} passphrases are supported, got {}",
            MAX_SIGNERS,
            passphrases.len()
        )));
    }
    let mut slots = [None; MAX_SIGNERS];
    for (slot, passphrase) in slots.iter_mut().zip(passphrases) {
        *slot = Some(passphrase.as_str());
    }
    Ok(slots)
}

fn multisig(state: &AppState) -> Result<&Arc<MultiSigService>, AppError> {
    state
        .multisig_service
        .as_ref()
        .ok_or_else(AppError::multisig_unavailable)
}

/// POST /api/wallet/multisig
pub async fn create_multisig_address(
    State(state): State<Arc<AppState>>,
    Extension(trace): Extension<TraceId>,
    ApiJson(req): ApiJson<CreateMultisigRequest>,
) -> ApiResult<Value> {
    let service = multisig(&state).map_err(|e| trace.attach(e))?;
    let slots = signer_slots(&req.passphrases).map_err(|e| trace.attach(e))?;
    let data = service
        .create_multisig_address(&req.label, req.required_signatures, slots)
        .await
        .map_err(|e| trace.attach(e))?;
    success_response(data)
}

/// GET /api/wallet/multisig/by-label?label=...
pub async fn dtrust_info_by_label(
    State(state): State<Arc<AppState>>,
    Extension(trace): Extension<TraceId>,
    ApiQuery(params): ApiQuery<ParameterSet>,
) -> ApiResult<Value> {
    let service = multisig(&state).map_err(|e| trace.attach(e))?;
    require_any(&params, &["label"]).map_err(|e| trace.attach(e))?;
    let data = service
        .dtrust_info_by_label(params)
        .await
        .map_err(|e| trace.attach(e))?;
    success_response(data)
}

/// POST /api/wallet/multisig/withdrawals
///
/// 返回待签名的提现请求，签名在宿主应用中完成
pub async fn multi_withdraw(
    State(state): State<Arc<AppState>>,
    Extension(trace): Extension<TraceId>,
    ApiJson(params): ApiJson<ParameterSet>,
) -> ApiResult<Value> {
    let service = multisig(&state).map_err(|e| trace.attach(e))?;
    let data = service
        .multi_withdraw(params)
        .await
        .map_err(|e| trace.attach(e))?;
    success_response(data)
}

/// 至少包含其中一个非空参数
fn require_any(params: &ParameterSet, keys: &[&str]) -> Result<(), WalletError> {
    let present = keys
        .iter()
        .any(|k| params.get(k).is_some_and(|v| !v.trim().is_empty()));
    if present {
        Ok(())
    } else {
        Err(WalletError::InvalidParameter(format!(
            "one of [{}] is required",
            keys.join(", ")
        )))
    }
}

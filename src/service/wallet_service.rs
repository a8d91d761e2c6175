//! 钱包服务
//!
//! Block.io 接口的透传封装：余额、地址管理、手续费预估、提现、归档、价格、绿色地址。
//! 带 `amounts` 的请求（手续费预估与三种提现）转发前统一规范为 8 位小数。

use std::{str::FromStr, sync::Arc};

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::{
    domain::{normalize_amounts, ParameterSet, WalletError, WalletResult},
    service::wallet_gateway::{WalletGateway, WalletMethod},
};

/// 账户余额
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceInfo {
    pub network: String,
    pub available_balance: Decimal,
    pub pending_received_balance: Decimal,
}

impl BalanceInfo {
    pub fn from_data(data: &Value) -> WalletResult<Self> {
        Ok(Self {
            network: required_str(data, "network")?.to_string(),
            available_balance: required_decimal(data, "available_balance")?,
            pending_received_balance: required_decimal(data, "pending_received_balance")?,
        })
    }
}

/// 地址信息（新建地址 / 按标签查询的返回）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressInfo {
    pub address: String,
    pub label: Option<String>,
    pub user_id: Option<i64>,
}

impl AddressInfo {
    pub fn from_data(data: &Value) -> WalletResult<Self> {
        Ok(Self {
            address: required_str(data, "address")?.to_string(),
            label: data.get("label").and_then(Value::as_str).map(str::to_string),
            user_id: data.get("user_id").and_then(Value::as_i64),
        })
    }
}

/// 提现结果摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithdrawalSummary {
    pub txid: String,
    pub amount_withdrawn: Decimal,
    pub amount_sent: Decimal,
    pub network_fee: Decimal,
    pub blockio_fee: Decimal,
}

impl WithdrawalSummary {
    pub fn from_data(data: &Value) -> WalletResult<Self> {
        Ok(Self {
            txid: required_str(data, "txid")?.to_string(),
            amount_withdrawn: required_decimal(data, "amount_withdrawn")?,
            amount_sent: required_decimal(data, "amount_sent")?,
            network_fee: required_decimal(data, "network_fee")?,
            blockio_fee: required_decimal(data, "blockio_fee")?,
        })
    }
}

fn required_str<'a>(data: &'a Value, field: &str) -> WalletResult<&'a str> {
    data.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| WalletError::MalformedResponse(format!("missing field `{}`", field)))
}

fn required_decimal(data: &Value, field: &str) -> WalletResult<Decimal> {
    let raw = match data.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            return Err(WalletError::MalformedResponse(format!(
                "missing field `{}`",
                field
            )))
        }
    };
    Decimal::from_str(raw.trim())
        .map_err(|_| WalletError::MalformedResponse(format!("field `{}` is not a decimal", field)))
}

pub struct WalletService {
    gateway: Arc<dyn WalletGateway>,
}

impl WalletService {
    pub fn new(gateway: Arc<dyn WalletGateway>) -> Self {
        Self { gateway }
    }

    /// 透传调用；带金额的方法先规范精度
    pub async fn call(&self, method: WalletMethod, params: ParameterSet) -> WalletResult<Value> {
        let params = if method.carries_amounts() {
            normalize_amounts(params)?
        } else {
            params
        };
        tracing::debug!(method = %method, fields = params.len(), "wallet_call");
        self.gateway.call(method, params).await
    }

    // ---------- 余额 ----------

    pub async fn balance_info(&self) -> WalletResult<BalanceInfo> {
        let data = self.call(WalletMethod::GetBalance, ParameterSet::new()).await?;
        BalanceInfo::from_data(&data)
    }

    pub async fn network(&self) -> WalletResult<String> {
        Ok(self.balance_info().await?.network)
    }

    pub async fn available_balance(&self) -> WalletResult<Decimal> {
        Ok(self.balance_info().await?.available_balance)
    }

    pub async fn pending_received_balance(&self) -> WalletResult<Decimal> {
        Ok(self.balance_info().await?.pending_received_balance)
    }

    // ---------- 地址 ----------

    /// 新建地址，例如 `label=USER1`
    pub async fn create_address(&self, params: ParameterSet) -> WalletResult<AddressInfo> {
        let data = self.call(WalletMethod::GetNewAddress, params).await?;
        AddressInfo::from_data(&data)
    }

    /// 账户下所有未归档地址（含余额）。地址超过 2500 个时请改用 `address_balance`
    pub async fn addresses_info(&self) -> WalletResult<Value> {
        self.call(WalletMethod::GetMyAddresses, ParameterSet::new())
            .await
    }

    pub async fn addresses_info_without_balances(&self) -> WalletResult<Value> {
        self.call(WalletMethod::GetMyAddressesWithoutBalances, ParameterSet::new())
            .await
    }

    pub async fn addresses(&self) -> WalletResult<Vec<Value>> {
        let data = self.addresses_info().await?;
        address_list(&data)
    }

    pub async fn addresses_without_balances(&self) -> WalletResult<Vec<Value>> {
        let data = self.addresses_info_without_balances().await?;
        address_list(&data)
    }

    /// 按 `addresses` 或 `labels` 查询余额，也可以查询账户外地址
    pub async fn address_balance(&self, params: ParameterSet) -> WalletResult<Value> {
        self.call(WalletMethod::GetAddressBalance, params).await
    }

    pub async fn address_by_label(&self, params: ParameterSet) -> WalletResult<AddressInfo> {
        let data = self.call(WalletMethod::GetAddressByLabel, params).await?;
        AddressInfo::from_data(&data)
    }

    /// 归档地址（单次最多 100 个，按 `addresses` 或 `labels`）
    pub async fn archive_addresses(&self, params: ParameterSet) -> WalletResult<Value> {
        self.call(WalletMethod::ArchiveAddresses, params).await
    }

    pub async fn unarchive_addresses(&self, params: ParameterSet) -> WalletResult<Value> {
        self.call(WalletMethod::UnarchiveAddresses, params).await
    }

    pub async fn archived_addresses(&self) -> WalletResult<Value> {
        self.call(WalletMethod::GetMyArchivedAddresses, ParameterSet::new())
            .await
    }

    // ---------- 手续费 / 提现 ----------

    pub async fn network_fee_estimate(&self, params: ParameterSet) -> WalletResult<Value> {
        self.call(WalletMethod::GetNetworkFeeEstimate, params).await
    }

    /// 从账户任意地址提现到最多 2500 个目标地址
    pub async fn withdraw(&self, params: ParameterSet) -> WalletResult<WithdrawalSummary> {
        let data = self.call(WalletMethod::Withdraw, params).await?;
        WithdrawalSummary::from_data(&data)
    }

    pub async fn withdraw_from_addresses(
        &self,
        params: ParameterSet,
    ) -> WalletResult<WithdrawalSummary> {
        let data = self.call(WalletMethod::WithdrawFromAddresses, params).await?;
        WithdrawalSummary::from_data(&data)
    }

    pub async fn withdraw_from_labels(
        &self,
        params: ParameterSet,
    ) -> WalletResult<WithdrawalSummary> {
        let data = self.call(WalletMethod::WithdrawFromLabels, params).await?;
        WithdrawalSummary::from_data(&data)
    }

    // ---------- 交易 / 价格 / 绿色地址 ----------

    /// `type=sent|received`，可选 `before_tx`、`addresses`、`user_ids`、`labels`
    pub async fn transactions(&self, params: ParameterSet) -> WalletResult<Value> {
        self.call(WalletMethod::GetTransactions, params).await
    }

    pub async fn current_price(&self, params: ParameterSet) -> WalletResult<Value> {
        self.call(WalletMethod::GetCurrentPrice, params).await
    }

    pub async fn is_green_address(&self, params: ParameterSet) -> WalletResult<Value> {
        self.call(WalletMethod::IsGreenAddress, params).await
    }

    pub async fn is_green_transaction(&self, params: ParameterSet) -> WalletResult<Value> {
        self.call(WalletMethod::IsGreenTransaction, params).await
    }
}

fn address_list(data: &Value) -> WalletResult<Vec<Value>> {
    data.get("addresses")
        .and_then(Value::as_array)
        .cloned()
        .ok_or_else(|| WalletError::MalformedResponse("missing data.addresses".into()))
}

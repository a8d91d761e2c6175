//! 收款交易模型
//!
//! 从 `get_transactions` 返回的 `data.txs` 解析。
//! 缺少 `confidence` 或 `amounts_received` 的记录直接报错，不跳过：
//! 少算待确认金额比报错更危险。

use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use super::errors::{WalletError, WalletResult};

/// 单笔收款（收款地址 + 金额）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    pub recipient: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub txid: String,
    /// 网络置信度 0.0 - 1.0，双花时降为 0.0
    pub confidence: f64,
    pub amounts_received: Vec<Receipt>,
    pub confirmations: Option<u64>,
    pub propagated_by_nodes: Option<u64>,
    pub from_green_address: Option<bool>,
    pub time: Option<DateTime<Utc>>,
}

impl Transaction {
    /// 本交易全部收款之和
    pub fn total_received(&self) -> WalletResult<Decimal> {
        self.checked_sum(self.amounts_received.iter())
    }

    /// 指定地址的收款之和
    pub fn received_by(&self, recipient: &str) -> WalletResult<Decimal> {
        self.checked_sum(
            self.amounts_received
                .iter()
                .filter(|r| r.recipient == recipient),
        )
    }

    /// 金额来自上游，溢出按数据异常处理
    fn checked_sum<'a>(
        &self,
        mut receipts: impl Iterator<Item = &'a Receipt>,
    ) -> WalletResult<Decimal> {
        receipts.try_fold(Decimal::ZERO, |acc, r| {
            acc.checked_add(r.amount)
                .ok_or_else(|| WalletError::malformed_tx(&self.txid, "receipt amounts overflow"))
        })
    }

    pub fn from_value(value: &Value) -> WalletResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| WalletError::malformed_tx("?", "transaction is not an object"))?;

        let txid = obj
            .get("txid")
            .and_then(Value::as_str)
            .unwrap_or("?")
            .to_string();

        let confidence = obj
            .get("confidence")
            .and_then(number_like)
            .ok_or_else(|| WalletError::malformed_tx(&txid, "missing or invalid confidence"))?;
        if !confidence.is_finite() {
            return Err(WalletError::malformed_tx(&txid, "confidence is not finite"));
        }

        let amounts_received = obj
            .get("amounts_received")
            .and_then(Value::as_array)
            .ok_or_else(|| WalletError::malformed_tx(&txid, "missing amounts_received"))?
            .iter()
            .map(|r| parse_receipt(&txid, r))
            .collect::<WalletResult<Vec<_>>>()?;

        Ok(Self {
            txid,
            confidence,
            amounts_received,
            confirmations: obj.get("confirmations").and_then(Value::as_u64),
            propagated_by_nodes: obj.get("propagated_by_nodes").and_then(Value::as_u64),
            from_green_address: obj.get("from_green_address").and_then(Value::as_bool),
            time: obj
                .get("time")
                .and_then(Value::as_i64)
                .and_then(|ts| Utc.timestamp_opt(ts, 0).single()),
        })
    }

    /// 解析 `get_transactions` 的 `data` 对象（含 `txs` 数组）
    pub fn list_from_data(data: &Value) -> WalletResult<Vec<Self>> {
        data.get("txs")
            .and_then(Value::as_array)
            .ok_or_else(|| WalletError::MalformedResponse("missing data.txs".into()))?
            .iter()
            .map(Self::from_value)
            .collect()
    }
}

fn parse_receipt(txid: &str, value: &Value) -> WalletResult<Receipt> {
    let recipient = value
        .get("recipient")
        .and_then(Value::as_str)
        .ok_or_else(|| WalletError::malformed_tx(txid, "receipt without recipient"))?
        .to_string();

    let amount = match value.get("amount") {
        Some(Value::String(s)) => Decimal::from_str(s.trim()).ok(),
        // 数字按其 JSON 文本解析，避免经过 f64
        Some(Value::Number(n)) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
    .ok_or_else(|| WalletError::malformed_tx(txid, "receipt amount is missing or invalid"))?;

    Ok(Receipt { recipient, amount })
}

fn number_like(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// 置信度阈值，取值 [0.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ConfidenceThreshold(f64);

impl ConfidenceThreshold {
    pub fn new(value: f64) -> WalletResult<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(WalletError::InvalidConfidenceThreshold(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// 严格小于阈值才算“待确认”
    pub fn is_pending(self, tx: &Transaction) -> bool {
        tx.confidence < self.0
    }
}

//! 待确认收款汇总
//!
//! 按置信度阈值筛选某地址的收款交易（严格小于阈值视为待确认），
//! 并用 Decimal 精确累加金额。单次上游调用，不重试、不缓存。

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::{
    domain::{ConfidenceThreshold, Transaction, WalletError, WalletResult},
    service::wallet_gateway::WalletGateway,
};

/// 筛选出置信度低于阈值的交易，保持上游返回顺序
pub fn filter_pending(txs: Vec<Transaction>, threshold: ConfidenceThreshold) -> Vec<Transaction> {
    txs.into_iter().filter(|tx| threshold.is_pending(tx)).collect()
}

/// 所有交易全部收款之和（不区分收款地址）
pub fn sum_receipts(txs: &[Transaction]) -> WalletResult<Decimal> {
    checked_total(txs, Transaction::total_received)
}

/// 只累加发给 `recipient` 的收款
pub fn sum_receipts_for(txs: &[Transaction], recipient: &str) -> WalletResult<Decimal> {
    checked_total(txs, |tx| tx.received_by(recipient))
}

fn checked_total(
    txs: &[Transaction],
    per_tx: impl Fn(&Transaction) -> WalletResult<Decimal>,
) -> WalletResult<Decimal> {
    txs.iter().try_fold(Decimal::ZERO, |acc, tx| {
        acc.checked_add(per_tx(tx)?)
            .ok_or_else(|| WalletError::malformed_tx(&tx.txid, "pending total overflows"))
    })
}

pub struct ConfidenceAggregator {
    gateway: Arc<dyn WalletGateway>,
}

impl ConfidenceAggregator {
    pub fn new(gateway: Arc<dyn WalletGateway>) -> Self {
        Self { gateway }
    }

    /// 地址上置信度 < threshold 的收款交易
    pub async fn pending_receipts(
        &self,
        address: &str,
        threshold: f64,
    ) -> WalletResult<Vec<Transaction>> {
        let threshold = ConfidenceThreshold::new(threshold)?;
        let txs = self.gateway.received_transactions(address, None).await?;
        let fetched = txs.len();
        let pending = filter_pending(txs, threshold);

        tracing::debug!(
            address = %address,
            threshold = threshold.value(),
            fetched,
            pending = pending.len(),
            "pending_receipts_filtered"
        );

        Ok(pending)
    }

    /// 待确认交易的预期到账总额
    ///
    /// 累加每笔待确认交易的全部收款，包括发往其他地址的部分，
    /// 只统计本地址请使用 [`Self::expected_pending_amount_for_recipient`]。
    pub async fn expected_pending_amount(
        &self,
        address: &str,
        threshold: f64,
    ) -> WalletResult<Decimal> {
        let pending = self.pending_receipts(address, threshold).await?;
        let total = sum_receipts(&pending)?;

        tracing::info!(
            address = %address,
            threshold,
            pending = pending.len(),
            total = %total,
            "expected_pending_amount"
        );

        Ok(total)
    }

    pub async fn expected_pending_amount_for_recipient(
        &self,
        address: &str,
        threshold: f64,
    ) -> WalletResult<Decimal> {
        let pending = self.pending_receipts(address, threshold).await?;
        sum_receipts_for(&pending, address)
    }
}

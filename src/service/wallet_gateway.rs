//! 钱包 API 能力接口
//!
//! 服务层只依赖这个 trait：生产环境由 `infrastructure::upstream::BlockIoClient` 实现，
//! 测试中用内存假实现替换，无需真实网络。

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{ParameterSet, Transaction, WalletResult};

/// Block.io 支持的接口方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletMethod {
    GetBalance,
    GetNewAddress,
    GetMyAddresses,
    GetMyAddressesWithoutBalances,
    GetAddressBalance,
    GetAddressByLabel,
    GetNetworkFeeEstimate,
    Withdraw,
    WithdrawFromAddresses,
    WithdrawFromLabels,
    ArchiveAddresses,
    UnarchiveAddresses,
    GetMyArchivedAddresses,
    GetTransactions,
    GetCurrentPrice,
    IsGreenAddress,
    IsGreenTransaction,
    GetNewDtrustAddress,
    GetDtrustAddressByLabel,
    WithdrawFromDtrustAddress,
}

impl WalletMethod {
    pub const ALL: [WalletMethod; 20] = [
        Self::GetBalance,
        Self::GetNewAddress,
        Self::GetMyAddresses,
        Self::GetMyAddressesWithoutBalances,
        Self::GetAddressBalance,
        Self::GetAddressByLabel,
        Self::GetNetworkFeeEstimate,
        Self::Withdraw,
        Self::WithdrawFromAddresses,
        Self::WithdrawFromLabels,
        Self::ArchiveAddresses,
        Self::UnarchiveAddresses,
        Self::GetMyArchivedAddresses,
        Self::GetTransactions,
        Self::GetCurrentPrice,
        Self::IsGreenAddress,
        Self::IsGreenTransaction,
        Self::GetNewDtrustAddress,
        Self::GetDtrustAddressByLabel,
        Self::WithdrawFromDtrustAddress,
    ];

    /// 上游 URL 路径中的方法名
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetBalance => "get_balance",
            Self::GetNewAddress => "get_new_address",
            Self::GetMyAddresses => "get_my_addresses",
            Self::GetMyAddressesWithoutBalances => "get_my_addresses_without_balances",
            Self::GetAddressBalance => "get_address_balance",
            Self::GetAddressByLabel => "get_address_by_label",
            Self::GetNetworkFeeEstimate => "get_network_fee_estimate",
            Self::Withdraw => "withdraw",
            Self::WithdrawFromAddresses => "withdraw_from_addresses",
            Self::WithdrawFromLabels => "withdraw_from_labels",
            Self::ArchiveAddresses => "archive_addresses",
            Self::UnarchiveAddresses => "unarchive_addresses",
            Self::GetMyArchivedAddresses => "get_my_archived_addresses",
            Self::GetTransactions => "get_transactions",
            Self::GetCurrentPrice => "get_current_price",
            Self::IsGreenAddress => "is_green_address",
            Self::IsGreenTransaction => "is_green_transaction",
            Self::GetNewDtrustAddress => "get_new_dtrust_address",
            Self::GetDtrustAddressByLabel => "get_dtrust_address_by_label",
            Self::WithdrawFromDtrustAddress => "withdraw_from_dtrust_address",
        }
    }

    /// 请求中带 `amounts` 列表，转发前需要规范精度
    pub fn carries_amounts(self) -> bool {
        matches!(
            self,
            Self::GetNetworkFeeEstimate
                | Self::Withdraw
                | Self::WithdrawFromAddresses
                | Self::WithdrawFromLabels
        )
    }

    /// 动用资金的接口需要 PIN
    pub fn requires_pin(self) -> bool {
        matches!(
            self,
            Self::Withdraw
                | Self::WithdrawFromAddresses
                | Self::WithdrawFromLabels
                | Self::WithdrawFromDtrustAddress
        )
    }

    /// 只读接口，上游失败时可以安全重试
    pub fn is_read_only(self) -> bool {
        !self.requires_pin()
            && !matches!(
                self,
                Self::GetNewAddress
                    | Self::ArchiveAddresses
                    | Self::UnarchiveAddresses
                    | Self::GetNewDtrustAddress
            )
    }
}

impl std::fmt::Display for WalletMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait WalletGateway: Send + Sync {
    /// 查询某地址收到的交易（最近一页，`before_tx` 用于向前翻页）
    async fn received_transactions(
        &self,
        address: &str,
        before_tx: Option<&str>,
    ) -> WalletResult<Vec<Transaction>>;

    /// 通用透传调用，返回响应中的 `data` 对象
    async fn call(&self, method: WalletMethod, params: ParameterSet) -> WalletResult<Value>;
}

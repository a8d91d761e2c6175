pub mod confidence_aggregator; // 待确认收款汇总
pub mod multisig_service; // dTrust 多签地址
pub mod wallet_gateway; // 上游能力接口
pub mod wallet_service;

pub use confidence_aggregator::ConfidenceAggregator;
pub use multisig_service::{KeyDeriver, MultiSigService};
pub use wallet_gateway::{WalletGateway, WalletMethod};
pub use wallet_service::{AddressInfo, BalanceInfo, WalletService, WithdrawalSummary};

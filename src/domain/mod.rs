//! Domain 模块
//!
//! 金额、参数集合、交易等领域模型，不依赖网络

pub mod amount;
pub mod errors;
pub mod parameters;
pub mod transaction;

// 重新导出常用类型
pub use amount::{format_amount, normalize_amounts, parse_amount, render_amount, AMOUNT_SCALE};
pub use errors::{WalletError, WalletResult};
pub use parameters::{ParameterSet, AMOUNTS_FIELD};
pub use transaction::{ConfidenceThreshold, Receipt, Transaction};

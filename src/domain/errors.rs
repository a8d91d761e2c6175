//! 钱包领域错误
//!
//! 服务层统一返回 `WalletError`，在 API 边界转换为 `AppError`

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("invalid amount format: {value:?}")]
    InvalidAmountFormat { value: String },

    #[error("confidence threshold must be within [0.0, 1.0], got {0}")]
    InvalidConfidenceThreshold(f64),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("wallet api unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("wallet api rejected {method}: {message}")]
    UpstreamRejected { method: String, message: String },

    #[error("malformed wallet api response: {0}")]
    MalformedResponse(String),

    #[error("malformed transaction data (txid={txid}): {reason}")]
    MalformedTransactionData { txid: String, reason: String },

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),
}

impl WalletError {
    pub fn invalid_amount(value: impl Into<String>) -> Self {
        Self::InvalidAmountFormat {
            value: value.into(),
        }
    }

    pub fn malformed_tx(txid: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTransactionData {
            txid: txid.into(),
            reason: reason.into(),
        }
    }

    /// 是否为上游临时故障（可由调用方决定是否重试）
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable(_))
    }
}

pub type WalletResult<T> = std::result::Result<T, WalletError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = WalletError::invalid_amount("1e5");
        assert_eq!(err.to_string(), "invalid amount format: \"1e5\"");

        let err = WalletError::malformed_tx("abc", "missing confidence");
        assert_eq!(
            err.to_string(),
            "malformed transaction data (txid=abc): missing confidence"
        );
    }

    #[test]
    fn test_is_transient() {
        assert!(WalletError::UpstreamUnavailable("timeout".into()).is_transient());
        assert!(!WalletError::InvalidParameter("x".into()).is_transient());
    }
}

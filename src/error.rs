use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::WalletError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppErrorCode {
    // HTTP 基础错误码
    BadRequest,

    // 业务错误码
    InvalidAmount,
    InvalidParameter,
    UpstreamUnavailable,
    UpstreamRejected,
    MalformedResponse,
    MalformedTransactionData,
    KeyDerivationFailed,
    MultisigUnavailable,
}

impl AppErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppErrorCode::BadRequest => "bad_request",

            AppErrorCode::InvalidAmount => "invalid_amount",
            AppErrorCode::InvalidParameter => "invalid_parameter",
            AppErrorCode::UpstreamUnavailable => "upstream_unavailable",
            AppErrorCode::UpstreamRejected => "upstream_rejected",
            AppErrorCode::MalformedResponse => "malformed_response",
            AppErrorCode::MalformedTransactionData => "malformed_transaction_data",
            AppErrorCode::KeyDerivationFailed => "key_derivation_failed",
            AppErrorCode::MultisigUnavailable => "multisig_unavailable",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppError {
    pub code: AppErrorCode,
    pub message: String,
    pub status: StatusCode,
    pub trace_id: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
    trace_id: Option<&'a str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code.as_str(),
            message: &self.message,
            trace_id: self.trace_id.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    fn new(code: AppErrorCode, status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            status,
            trace_id: None,
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(AppErrorCode::BadRequest, StatusCode::BAD_REQUEST, msg)
    }

    /// 设置追踪ID
    pub fn with_trace_id(mut self, trace_id: String) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        Self::new(AppErrorCode::InvalidAmount, StatusCode::BAD_REQUEST, msg)
    }

    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::new(AppErrorCode::InvalidParameter, StatusCode::BAD_REQUEST, msg)
    }

    pub fn upstream_unavailable(msg: impl Into<String>) -> Self {
        Self::new(
            AppErrorCode::UpstreamUnavailable,
            StatusCode::SERVICE_UNAVAILABLE,
            msg,
        )
    }

    /// 未配置 KeyDeriver 时多签接口不可用
    pub fn multisig_unavailable() -> Self {
        Self::new(
            AppErrorCode::MultisigUnavailable,
            StatusCode::SERVICE_UNAVAILABLE,
            "multisig key derivation is not configured",
        )
    }
}

// 领域错误 -> HTTP 错误
impl From<WalletError> for AppError {
    fn from(err: WalletError) -> Self {
        let message = err.to_string();
        match err {
            WalletError::InvalidAmountFormat { .. } => Self::invalid_amount(message),
            WalletError::InvalidConfidenceThreshold(_) | WalletError::InvalidParameter(_) => {
                Self::invalid_parameter(message)
            }
            WalletError::UpstreamUnavailable(_) => Self::upstream_unavailable(message),
            WalletError::UpstreamRejected { .. } => Self::new(
                AppErrorCode::UpstreamRejected,
                StatusCode::BAD_GATEWAY,
                message,
            ),
            WalletError::MalformedResponse(_) => Self::new(
                AppErrorCode::MalformedResponse,
                StatusCode::BAD_GATEWAY,
                message,
            ),
            WalletError::MalformedTransactionData { .. } => Self::new(
                AppErrorCode::MalformedTransactionData,
                StatusCode::BAD_GATEWAY,
                message,
            ),
            WalletError::KeyDerivation(_) => Self::new(
                AppErrorCode::KeyDerivationFailed,
                StatusCode::INTERNAL_SERVER_ERROR,
                message,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_error_status_mapping() {
        let cases = [
            (WalletError::invalid_amount("abc"), StatusCode::BAD_REQUEST),
            (
                WalletError::InvalidConfidenceThreshold(1.5),
                StatusCode::BAD_REQUEST,
            ),
            (
                WalletError::UpstreamUnavailable("timeout".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                WalletError::UpstreamRejected {
                    method: "withdraw".into(),
                    message: "Insufficient funds".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                WalletError::MalformedResponse("no status".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                WalletError::malformed_tx("t1", "missing confidence"),
                StatusCode::BAD_GATEWAY,
            ),
            (
                WalletError::KeyDerivation("bad hex".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status, status);
        }
    }

    #[test]
    fn test_error_code_and_message() {
        let err = AppError::from(WalletError::invalid_amount("1e5")).with_trace_id("t-1".into());
        assert_eq!(err.code, AppErrorCode::InvalidAmount);
        assert_eq!(err.code.as_str(), "invalid_amount");
        assert!(err.message.contains("1e5"));
        assert_eq!(err.trace_id.as_deref(), Some("t-1"));
    }
}

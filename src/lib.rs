//! blockio-gateway - Block.io 钱包 API 适配服务
//!
//! 金额精度规范、按置信度汇总待确认收款、多签口令到公钥的组装，
//! 其余接口透传到上游钱包服务

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod service;

// 重新导出常用类型
pub use app_state::AppState;
pub use error::{AppError, AppErrorCode};

pub mod prelude {
    pub use crate::{
        app_state::AppState,
        domain::{ParameterSet, Transaction, WalletError, WalletResult},
        error::{AppError, AppErrorCode},
        service::{
            ConfidenceAggregator, KeyDeriver, MultiSigService, WalletGateway, WalletMethod,
            WalletService,
        },
    };
}

//! 测试辅助模块
//! 内存版 WalletGateway / KeyDeriver，无需真实网络

#![allow(dead_code)]

use std::{
    collections::HashMap,
    str::FromStr,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use blockio_gateway::{
    app_state::AppState,
    config::{BlockIoConfig, Config, LoggingConfig, ServerConfig},
    domain::{ParameterSet, Receipt, Transaction, WalletError, WalletResult},
    service::{KeyDeriver, WalletGateway, WalletMethod},
};
use rust_decimal::Decimal;
use serde_json::Value;

/// 记录所有调用并返回预置响应的假网关
#[derive(Default)]
pub struct FakeGateway {
    responses: Mutex<HashMap<WalletMethod, Value>>,
    received: Mutex<Vec<Transaction>>,
    failure: Mutex<Option<String>>,
    pub calls: Mutex<Vec<(WalletMethod, ParameterSet)>>,
    pub received_queries: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, method: WalletMethod, data: Value) {
        self.responses.lock().unwrap().insert(method, data);
    }

    pub fn set_received(&self, txs: Vec<Transaction>) {
        *self.received.lock().unwrap() = txs;
    }

    /// 之后所有调用返回 UpstreamUnavailable
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len() + self.received_queries.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Option<(WalletMethod, ParameterSet)> {
        self.calls.lock().unwrap().last().cloned()
    }

    fn check_failure(&self) -> WalletResult<()> {
        match self.failure.lock().unwrap().as_ref() {
            Some(message) => Err(WalletError::UpstreamUnavailable(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl WalletGateway for FakeGateway {
    async fn received_transactions(
        &self,
        address: &str,
        _before_tx: Option<&str>,
    ) -> WalletResult<Vec<Transaction>> {
        self.received_queries
            .lock()
            .unwrap()
            .push(address.to_string());
        self.check_failure()?;
        Ok(self.received.lock().unwrap().clone())
    }

    async fn call(&self, method: WalletMethod, params: ParameterSet) -> WalletResult<Value> {
        self.calls.lock().unwrap().push((method, params));
        self.check_failure()?;
        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(&method)
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default())))
    }
}

/// 公钥 = "pub:" + 口令十六进制
pub struct FakeKeyDeriver;

impl KeyDeriver for FakeKeyDeriver {
    fn public_key_from_passphrase(&self, passphrase_hex: &str) -> WalletResult<String> {
        Ok(format!("pub:{}", passphrase_hex))
    }
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// 构造一笔收款交易，receipts 为 (地址, 金额)
pub fn tx(txid: &str, confidence: f64, receipts: &[(&str, &str)]) -> Transaction {
    Transaction {
        txid: txid.to_string(),
        confidence,
        amounts_received: receipts
            .iter()
            .map(|(recipient, amount)| Receipt {
                recipient: recipient.to_string(),
                amount: dec(amount),
            })
            .collect(),
        confirmations: None,
        propagated_by_nodes: None,
        from_green_address: None,
        time: None,
    }
}

pub fn test_config() -> Config {
    Config {
        blockio: BlockIoConfig {
            api_key: "test-api-key".into(),
            pin: "test-pin".into(),
            version: 2,
            base_url: "http://127.0.0.1:9".into(),
            timeout_ms: 1_000,
            retries: 0,
        },
        server: ServerConfig {
            bind_addr: "127.0.0.1:0".into(),
        },
        logging: LoggingConfig {
            level: "debug".into(),
            format: "text".into(),
            enable_file_logging: false,
            log_file_path: None,
        },
    }
}

/// 使用假网关的应用状态（含多签）
pub fn test_state(gateway: Arc<FakeGateway>) -> Arc<AppState> {
    Arc::new(
        AppState::with_gateway(gateway, Arc::new(test_config()))
            .with_key_deriver(Arc::new(FakeKeyDeriver)),
    )
}

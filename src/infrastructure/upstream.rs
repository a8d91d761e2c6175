//! Block.io 上游客户端：带超时/重试的最小 JSON 透传实现
//!
//! 请求形如 `GET {base_url}/api/v{version}/{method}/?api_key=...&<params>`，
//! 动用资金的接口额外带 `pin`。响应信封：
//! - `{"status":"success","data":{...}}` -> 返回 `data`
//! - `{"status":"fail","data":{"error_message":"..."}}` -> `UpstreamRejected`
//!
//! 只读接口在连接失败/超时/5xx 时按指数回退重试，提现类接口绝不重试。

use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;

use crate::{
    config::BlockIoConfig,
    domain::{ParameterSet, Transaction, WalletError, WalletResult},
    service::wallet_gateway::{WalletGateway, WalletMethod},
};

#[derive(Clone)]
pub struct BlockIoClient {
    base_url: String,
    version: u32,
    api_key: String,
    pin: String,
    retries: usize,
    http: reqwest::Client,
}

impl BlockIoClient {
    pub fn new(config: &BlockIoConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("blockio-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            version: config.version,
            api_key: config.api_key.clone(),
            pin: config.pin.clone(),
            retries: config.retries,
            http,
        })
    }

    fn endpoint(&self, method: WalletMethod) -> String {
        format!("{}/api/v{}/{}/", self.base_url, self.version, method.as_str())
    }

    /// 查询参数：api_key 在前，调用方参数按原顺序，`pin` 只随提现类方法发送。
    /// 调用方传入的 api_key / pin 一律忽略
    fn query_pairs<'a>(
        &'a self,
        method: WalletMethod,
        params: &'a ParameterSet,
    ) -> Vec<(&'a str, &'a str)> {
        let mut query = Vec::with_capacity(params.len() + 2);
        query.push(("api_key", self.api_key.as_str()));
        query.extend(params.iter().filter(|(k, _)| *k != "api_key" && *k != "pin"));
        if method.requires_pin() {
            query.push(("pin", self.pin.as_str()));
        }
        query
    }

    /// 调用上游并解开响应信封
    pub async fn request(&self, method: WalletMethod, params: &ParameterSet) -> WalletResult<Value> {
        let query = self.query_pairs(method, params);

        let max_attempts = if method.is_read_only() {
            self.retries + 1
        } else {
            1
        };

        let mut attempt = 0usize;
        loop {
            attempt += 1;
            let start = Instant::now();
            let result = self.send_once(method, &query).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(data) => {
                    tracing::debug!(method = %method, attempt, elapsed_ms, "blockio_call_ok");
                    return Ok(data);
                }
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    tracing::warn!(
                        method = %method,
                        attempt,
                        elapsed_ms,
                        error = %e,
                        "blockio_call_retrying"
                    );
                    let backoff = 50u64 * (1 << attempt.min(5)); // 简单指数回退，最大 ~1600ms
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                }
                Err(e) => {
                    tracing::error!(
                        method = %method,
                        attempt,
                        elapsed_ms,
                        error = %e,
                        "blockio_call_failed"
                    );
                    return Err(e);
                }
            }
        }
    }

    async fn send_once(&self, method: WalletMethod, query: &[(&str, &str)]) -> WalletResult<Value> {
        let response = self
            .http
            .get(self.endpoint(method))
            .query(query)
            .send()
            .await
            // URL 中含 api_key，错误信息里去掉
            .map_err(|e| WalletError::UpstreamUnavailable(e.without_url().to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(WalletError::UpstreamUnavailable(format!(
                "{} returned HTTP {}",
                method, status
            )));
        }

        // 4xx 时 Block.io 仍返回 fail 信封，先尝试解析
        let body: Value = response.json().await.map_err(|e| {
            WalletError::MalformedResponse(format!(
                "{} returned HTTP {} with non-JSON body: {}",
                method,
                status,
                e.without_url()
            ))
        })?;

        unwrap_envelope(method, body)
    }
}

/// 解开 `{status, data}` 信封
pub fn unwrap_envelope(method: WalletMethod, body: Value) -> WalletResult<Value> {
    let status = body.get("status").and_then(Value::as_str);
    match status {
        Some("success") => body
            .get("data")
            .cloned()
            .ok_or_else(|| WalletError::MalformedResponse(format!("{} response without data", method))),
        Some("fail") => {
            let message = body
                .pointer("/data/error_message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            Err(WalletError::UpstreamRejected {
                method: method.as_str().to_string(),
                message,
            })
        }
        _ => Err(WalletError::MalformedResponse(format!(
            "{} response without status",
            method
        ))),
    }
}

#[async_trait]
impl WalletGateway for BlockIoClient {
    async fn received_transactions(
        &self,
        address: &str,
        before_tx: Option<&str>,
    ) -> WalletResult<Vec<Transaction>> {
        let mut params = ParameterSet::new()
            .with("type", "received")
            .with("addresses", address);
        if let Some(txid) = before_tx {
            params.insert("before_tx", txid);
        }

        let data = self.request(WalletMethod::GetTransactions, &params).await?;
        Transaction::list_from_data(&data)
    }

    async fn call(&self, method: WalletMethod, params: ParameterSet) -> WalletResult<Value> {
        self.request(method, &params).await
    }
}

//! 多签（dTrust）地址服务
//!
//! 最多四方口令 -> 十六进制 -> 公钥，拼成 `public_keys` 后请求上游创建多签地址。
//! 口令到公钥的推导由 `KeyDeriver` 提供，本服务不实现密码学。

use std::sync::Arc;

use serde_json::Value;

use crate::{
    domain::{ParameterSet, WalletError, WalletResult},
    service::wallet_gateway::{WalletGateway, WalletMethod},
};

/// 最多参与方数量
pub const MAX_SIGNERS: usize = 4;

/// 口令（十六进制）到公钥的推导能力，由宿主应用注入
pub trait KeyDeriver: Send + Sync {
    fn public_key_from_passphrase(&self, passphrase_hex: &str) -> WalletResult<String>;
}

pub struct MultiSigService {
    gateway: Arc<dyn WalletGateway>,
    deriver: Arc<dyn KeyDeriver>,
}

/// 口令转十六进制（UTF-8 字节，小写）
pub fn passphrase_to_hex(passphrase: &str) -> String {
    hex::encode(passphrase.as_bytes())
}

impl MultiSigService {
    pub fn new(gateway: Arc<dyn WalletGateway>, deriver: Arc<dyn KeyDeriver>) -> Self {
        Self { gateway, deriver }
    }

    /// 按 s4, s3, s2, s1 的顺序推导公钥（与上游 SDK 的组装顺序一致）
    pub fn derive_public_keys(&self, signers: [Option<&str>; MAX_SIGNERS]) -> WalletResult<Vec<String>> {
        signers
            .iter()
            .rev()
            .flatten()
            .map(|passphrase| {
                self.deriver
                    .public_key_from_passphrase(&passphrase_to_hex(passphrase))
            })
            .collect()
    }

    /// 创建多签地址
    pub async fn create_multisig_address(
        &self,
        label: &str,
        required_signatures: u32,
        signers: [Option<&str>; MAX_SIGNERS],
    ) -> WalletResult<Value> {
        if label.trim().is_empty() {
            return Err(WalletError::InvalidParameter("label must not be empty".into()));
        }

        let keys = self.derive_public_keys(signers)?;
        if keys.is_empty() {
            return Err(WalletError::InvalidParameter(
                "at least one passphrase is required".into(),
            ));
        }
        if required_signatures == 0 || required_signatures as usize > keys.len() {
            return Err(WalletError::InvalidParameter(format!(
                "required_signatures must be between 1 and {}, got {}",
                keys.len(),
                required_signatures
            )));
        }

        tracing::info!(
            label = %label,
            signers = keys.len(),
            required_signatures,
            "creating_multisig_address"
        );

        let params = ParameterSet::new()
            .with("label", label)
            .with("public_keys", keys.join(","))
            .with("required_signatures", required_signatures.to_string());

        self.gateway.call(WalletMethod::GetNewDtrustAddress, params).await
    }

    pub async fn dtrust_info_by_label(&self, params: ParameterSet) -> WalletResult<Value> {
        self.gateway
            .call(WalletMethod::GetDtrustAddressByLabel, params)
            .await
    }

    pub async fn multi_withdraw(&self, params: ParameterSet) -> WalletResult<Value> {
        self.gateway
            .call(WalletMethod::WithdrawFromDtrustAddress, params)
            .await
    }
}

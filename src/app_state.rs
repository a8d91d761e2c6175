use std::sync::Arc;

use crate::{
    config::Config,
    infrastructure::upstream::BlockIoClient,
    service::{ConfidenceAggregator, KeyDeriver, MultiSigService, WalletGateway, WalletService},
};

/// 应用状态
/// 包含所有共享资源
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn WalletGateway>,
    pub wallet_service: Arc<WalletService>,
    pub confidence_aggregator: Arc<ConfidenceAggregator>,
    /// 未注入 `KeyDeriver` 时为 None，多签接口返回 503
    pub multisig_service: Option<Arc<MultiSigService>>,
    pub config: Arc<Config>,
}

impl AppState {
    /// 使用 Block.io HTTP 客户端创建应用状态
    pub fn new(config: Arc<Config>) -> anyhow::Result<Self> {
        let client = BlockIoClient::new(&config.blockio)?;
        tracing::info!(
            base_url = %config.blockio.base_url,
            version = config.blockio.version,
            "blockio_client_initialized"
        );
        Ok(Self::with_gateway(Arc::new(client), config))
    }

    /// 使用任意 `WalletGateway` 创建（测试或宿主应用自带客户端）
    pub fn with_gateway(gateway: Arc<dyn WalletGateway>, config: Arc<Config>) -> Self {
        Self {
            wallet_service: Arc::new(WalletService::new(gateway.clone())),
            confidence_aggregator: Arc::new(ConfidenceAggregator::new(gateway.clone())),
            multisig_service: None,
            gateway,
            config,
        }
    }

    /// 注入口令到公钥的推导实现，启用多签服务
    pub fn with_key_deriver(mut self, deriver: Arc<dyn KeyDeriver>) -> Self {
        self.multisig_service = Some(Arc::new(MultiSigService::new(
            self.gateway.clone(),
            deriver,
        )));
        self
    }
}

//! 应用共享状态

use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::anonymizer::IpAnonymizer;
use crate::services::likes::build_like_store;
use crate::services::stock::ProxyQuoteFetcher;
use crate::services::stock_service::StockQueryService;

pub struct AppState {
    pub stock_service: StockQueryService,
    /// 错误响应是否返回 detail
    pub expose_error_detail: bool,
    /// 客户端地址是否取自转发头
    pub trust_forwarded: bool,
}

impl AppState {
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let fetcher = ProxyQuoteFetcher::new(&config.proxy)?;
        let likes = build_like_store(&config.store).await;
        let anonymizer = IpAnonymizer::new(config.privacy.ip_salt.clone());

        Ok(Self {
            stock_service: StockQueryService::new(Arc::new(fetcher), likes, anonymizer),
            expose_error_detail: config.api.expose_error_detail,
            trust_forwarded: config.server.trust_forwarded,
        })
    }
}

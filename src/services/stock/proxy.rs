//! 报价代理接口实现
//!
//! 对接 `{PROXY_URL}/v1/stock/<symbol>/quote`。部分部署对末尾斜杠的路由不一致，
//! 因此按顺序尝试两个候选路径，全部失败时返回最后一个错误。

use futures::future::BoxFuture;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use super::QuoteSource;
use crate::config::ProxyConfig;
use crate::error::QuoteError;
use crate::models::{normalize_symbol, Quote};

/// 错误信息中保留的响应体长度
const EXCERPT_LEN: usize = 200;

/// 报价代理客户端
pub struct ProxyQuoteFetcher {
    client: Client,
    base_url: Url,
}

impl ProxyQuoteFetcher {
    pub fn new(config: &ProxyConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(config.url.trim())?;
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self { client, base_url })
    }

    /// 获取报价，依次尝试候选路径
    pub async fn get_quote(&self, raw_symbol: &str) -> Result<Quote, QuoteError> {
        let symbol = normalize_symbol(raw_symbol);
        let mut last_err = None;

        for path in candidate_paths(&symbol) {
            let url = self.base_url.join(&path)?;
            match self.fetch_candidate(&url).await {
                Ok(quote) => return Ok(quote),
                Err(e) => {
                    log::warn!("获取 {} 报价失败: {}", symbol, e);
                    last_err = Some(Box::new(e));
                }
            }
        }

        Err(QuoteError::Unavailable {
            symbol,
            source: last_err,
        })
    }

    async fn fetch_candidate(&self, url: &Url) -> Result<Quote, QuoteError> {
        let request_error = |source| QuoteError::Request {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QuoteError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        let text = response.text().await.map_err(request_error)?;
        parse_quote(&text).ok_or_else(|| QuoteError::Malformed {
            url: url.to_string(),
            excerpt: excerpt(&text),
        })
    }
}

impl QuoteSource for ProxyQuoteFetcher {
    fn fetch_quote<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, Result<Quote, QuoteError>> {
        Box::pin(self.get_quote(symbol))
    }
}

/// 候选请求路径：先标准路径，再带末尾斜杠的路径
fn candidate_paths(symbol: &str) -> [String; 2] {
    let encoded: String = url::form_urlencoded::byte_serialize(symbol.as_bytes()).collect();
    [
        format!("/v1/stock/{}/quote", encoded),
        format!("/v1/stock/{}/quote/", encoded),
    ]
}

/// 解析代理响应，要求 symbol 为非空字符串、latestPrice 为非负数
fn parse_quote(body: &str) -> Option<Quote> {
    let data: Value = serde_json::from_str(body).ok()?;

    let symbol = data["symbol"].as_str().filter(|s| !s.trim().is_empty())?;
    let price = data["latestPrice"]
        .as_f64()
        .filter(|p| p.is_finite() && *p >= 0.0)?;

    Some(Quote {
        symbol: normalize_symbol(symbol),
        price,
    })
}

fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_LEN).collect()
}

//! 股票报价服务模块
//!
//! 报价来源抽象为 `QuoteSource`，默认实现为外部报价代理

pub mod proxy;

use futures::future::BoxFuture;

use crate::error::QuoteError;
use crate::models::Quote;

pub use proxy::ProxyQuoteFetcher;

/// 报价来源
pub trait QuoteSource: Send + Sync {
    /// 根据股票代码获取报价，返回的代码为大写
    fn fetch_quote<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, Result<Quote, QuoteError>>;
}

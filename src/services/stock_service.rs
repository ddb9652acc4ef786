//! 股票查询服务
//!
//! 组合地址匿名化、报价获取和点赞存储，处理单股查询和双股对比

use futures::future::try_join;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::{
    IdentityToken, RelativeStockData, StockData, StockDataPayload, StockPricesQuery,
};
use crate::services::anonymizer::IpAnonymizer;
use crate::services::likes::LikeStore;
use crate::services::stock::QuoteSource;

pub struct StockQueryService {
    quotes: Arc<dyn QuoteSource>,
    likes: Arc<dyn LikeStore>,
    anonymizer: IpAnonymizer,
}

impl StockQueryService {
    pub fn new(
        quotes: Arc<dyn QuoteSource>,
        likes: Arc<dyn LikeStore>,
        anonymizer: IpAnonymizer,
    ) -> Self {
        Self {
            quotes,
            likes,
            anonymizer,
        }
    }

    /// 处理一次查询
    ///
    /// # 参数
    /// - query: 已校验的查询参数
    /// - client_addr: 客户端原始地址，只用于生成匿名身份
    pub async fn query(
        &self,
        query: &StockPricesQuery,
        client_addr: &str,
    ) -> Result<StockDataPayload, AppError> {
        let token = self.anonymizer.anonymize(client_addr);

        match query.symbols.as_slice() {
            [symbol] => self
                .single(symbol, &token, query.like)
                .await
                .map(StockDataPayload::Single),
            [first, second] => self
                .pair(first, second, &token, query.like)
                .await
                .map(StockDataPayload::Pair),
            symbols => Err(AppError::Validation(format!(
                "需要 1 或 2 只股票，收到 {} 只",
                symbols.len()
            ))),
        }
    }

    async fn single(
        &self,
        symbol: &str,
        token: &IdentityToken,
        like: bool,
    ) -> Result<StockData, AppError> {
        let quote = self.quotes.fetch_quote(symbol).await?;
        let count = self.likes.register_view(&quote.symbol, token, like).await?;
        log::debug!("{} 报价 {}，点赞数 {}", count.symbol, quote.price, count.likes);

        Ok(StockData {
            stock: quote.symbol,
            price: quote.price,
            likes: count.likes,
        })
    }

    async fn pair(
        &self,
        first: &str,
        second: &str,
        token: &IdentityToken,
        like: bool,
    ) -> Result<[RelativeStockData; 2], AppError> {
        // 任一报价失败则整个请求失败，此时不会写入点赞
        let (a, b) = try_join(
            self.quotes.fetch_quote(first),
            self.quotes.fetch_quote(second),
        )
        .await?;

        let (likes_a, likes_b) = try_join(
            self.likes.register_view(&a.symbol, token, like),
            self.likes.register_view(&b.symbol, token, like),
        )
        .await?;

        let rel_likes = relative_likes(likes_a.likes, likes_b.likes);

        Ok([
            RelativeStockData {
                stock: a.symbol,
                price: a.price,
                rel_likes,
            },
            RelativeStockData {
                stock: b.symbol,
                price: b.price,
                rel_likes: -rel_likes,
            },
        ])
    }
}

/// 本股点赞数减去另一只的点赞数
fn relative_likes(this: u64, other: u64) -> i64 {
    let this = i64::try_from(this).unwrap_or(i64::MAX);
    let other = i64::try_from(other).unwrap_or(i64::MAX);
    this - other
}

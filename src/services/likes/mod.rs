//! 点赞存储
//!
//! `LikeStore` 是唯一的共享可变状态。每个实现都必须保证“检查是否投过票 + 计数加一”
//! 对同一股票是原子的：不同身份的并发点赞全部计入，同一身份的并发点赞只计一次。
//!
//! - `MemoryLikeStore`: 进程内存储
//! - `RedisLikeStore`: 持久化存储
//! - `FallbackLikeStore`: 持久化存储不可用时自动退回内存

pub mod fallback;
pub mod memory;
pub mod redis_store;

use futures::future::BoxFuture;
use std::sync::Arc;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::models::{IdentityToken, LikeCount};

pub use fallback::FallbackLikeStore;
pub use memory::MemoryLikeStore;
pub use redis_store::RedisLikeStore;

/// 点赞存储接口
pub trait LikeStore: Send + Sync {
    /// 当前点赞数，从未出现过的股票返回 0，不产生任何写入
    fn likes<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, Result<u64, StoreError>>;

    /// 点赞，同一身份对同一股票只计一次，返回点赞后的计数
    fn vote<'a>(
        &'a self,
        symbol: &'a str,
        token: &'a IdentityToken,
    ) -> BoxFuture<'a, Result<u64, StoreError>>;

    /// 记录一次浏览，`wants_like` 为真时同时点赞
    fn register_view<'a>(
        &'a self,
        symbol: &'a str,
        token: &'a IdentityToken,
        wants_like: bool,
    ) -> BoxFuture<'a, Result<LikeCount, StoreError>> {
        Box::pin(async move {
            let likes = if wants_like {
                self.vote(symbol, token).await?
            } else {
                self.likes(symbol).await?
            };
            Ok(LikeCount {
                symbol: symbol.to_string(),
                likes,
            })
        })
    }
}

/// 根据配置选择点赞存储
///
/// 未配置 Redis 或启动时连接失败都使用内存存储
pub async fn build_like_store(config: &StoreConfig) -> Arc<dyn LikeStore> {
    let Some(url) = config.redis_url.as_deref() else {
        log::info!("未配置 Redis，点赞使用内存存储");
        return Arc::new(MemoryLikeStore::new());
    };

    match RedisLikeStore::connect(url, config.timeout()).await {
        Ok(store) => {
            log::info!("Redis 连接成功，点赞使用持久化存储");
            Arc::new(FallbackLikeStore::new(store))
        }
        Err(e) => {
            log::warn!("{}，点赞退回内存存储", e);
            Arc::new(MemoryLikeStore::new())
        }
    }
}

//! 带内存兜底的点赞存储
//!
//! 主存储返回错误时记录告警并改由内存存储应答，请求本身不会因为存储故障而失败

use futures::future::BoxFuture;

use super::{LikeStore, MemoryLikeStore};
use crate::error::StoreError;
use crate::models::IdentityToken;

pub struct FallbackLikeStore<P> {
    primary: P,
    fallback: MemoryLikeStore,
}

impl<P: LikeStore> FallbackLikeStore<P> {
    pub fn new(primary: P) -> Self {
        Self {
            primary,
            fallback: MemoryLikeStore::new(),
        }
    }
}

impl<P: LikeStore> LikeStore for FallbackLikeStore<P> {
    fn likes<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, Result<u64, StoreError>> {
        Box::pin(async move {
            match self.primary.likes(symbol).await {
                Ok(likes) => Ok(likes),
                Err(e) => {
                    log::warn!("读取 {} 点赞数失败，改用内存存储: {}", symbol, e);
                    self.fallback.likes(symbol).await
                }
            }
        })
    }

    fn vote<'a>(
        &'a self,
        symbol: &'a str,
        token: &'a IdentityToken,
    ) -> BoxFuture<'a, Result<u64, StoreError>> {
        Box::pin(async move {
            match self.primary.vote(symbol, token).await {
                Ok(likes) => Ok(likes),
                Err(e) => {
                    log::warn!("记录 {} 点赞失败，改用内存存储: {}", symbol, e);
                    self.fallback.vote(symbol, token).await
                }
            }
        })
    }
}

//! 内存点赞存储
//!
//! symbol -> StockRecord，整个检查加计数过程在同一次加锁内完成

use futures::future::{self, BoxFuture, FutureExt};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::LikeStore;
use crate::error::StoreError;
use crate::models::{IdentityToken, StockRecord};

#[derive(Debug, Default)]
pub struct MemoryLikeStore {
    records: Mutex<HashMap<String, StockRecord>>,
}

impl MemoryLikeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<String, StockRecord>> {
        // 锁内没有会 panic 的逻辑，中毒后数据依然一致
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub fn contains(&self, symbol: &str) -> bool {
        self.records().contains_key(symbol)
    }
}

impl LikeStore for MemoryLikeStore {
    fn likes<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, Result<u64, StoreError>> {
        let likes = self.records().get(symbol).map_or(0, |record| record.likes);
        future::ready(Ok(likes)).boxed()
    }

    fn vote<'a>(
        &'a self,
        symbol: &'a str,
        token: &'a IdentityToken,
    ) -> BoxFuture<'a, Result<u64, StoreError>> {
        let mut records = self.records();
        let record = records
            .entry(symbol.to_string())
            .or_insert_with(|| StockRecord::new(symbol));
        let likes = record.register_vote(token);
        log::debug!("{} 点赞数 {}（内存）", record.symbol, likes);
        drop(records);

        future::ready(Ok(likes)).boxed()
    }
}

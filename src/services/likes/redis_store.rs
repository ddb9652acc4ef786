//! Redis 点赞存储
//!
//! - 点赞数: 哈希 `stock:likes`，field 为股票代码
//! - 投票身份: 集合 `stock:voters:<symbol>`
//!
//! 点赞通过 Lua 脚本完成，`SADD` 成功才执行 `HINCRBY`，Redis 端串行执行保证原子性。
//! 所有操作都有超时，超时或出错统一视为存储不可用。

use futures::future::BoxFuture;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisResult, Script};
use std::future::Future;
use std::time::Duration;

use super::LikeStore;
use crate::error::StoreError;
use crate::models::IdentityToken;

const LIKES_KEY: &str = "stock:likes";

const VOTE_SCRIPT: &str = r#"
if redis.call('SADD', KEYS[2], ARGV[2]) == 1 then
    return redis.call('HINCRBY', KEYS[1], ARGV[1], 1)
end
return tonumber(redis.call('HGET', KEYS[1], ARGV[1]) or '0')
"#;

fn voters_key(symbol: &str) -> String {
    format!("stock:voters:{}", symbol)
}

pub struct RedisLikeStore {
    connection: ConnectionManager,
    vote_script: Script,
    timeout: Duration,
}

impl RedisLikeStore {
    /// 连接 Redis 并 PING 一次确认可用
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::open(url).map_err(|e| unavailable(e.to_string()))?;
        let mut connection = bounded(timeout, client.get_connection_manager()).await?;
        let _pong: String = bounded(timeout, redis::cmd("PING").query_async(&mut connection)).await?;

        Ok(Self {
            connection,
            vote_script: Script::new(VOTE_SCRIPT),
            timeout,
        })
    }
}

impl LikeStore for RedisLikeStore {
    fn likes<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, Result<u64, StoreError>> {
        Box::pin(async move {
            let mut connection = self.connection.clone();
            let likes: Option<u64> =
                bounded(self.timeout, connection.hget(LIKES_KEY, symbol)).await?;
            Ok(likes.unwrap_or(0))
        })
    }

    fn vote<'a>(
        &'a self,
        symbol: &'a str,
        token: &'a IdentityToken,
    ) -> BoxFuture<'a, Result<u64, StoreError>> {
        Box::pin(async move {
            let mut connection = self.connection.clone();
            let mut invocation = self.vote_script.prepare_invoke();
            invocation
                .key(LIKES_KEY)
                .key(voters_key(symbol))
                .arg(symbol)
                .arg(token.as_str());

            let likes: u64 = bounded(self.timeout, invocation.invoke_async(&mut connection)).await?;
            Ok(likes)
        })
    }
}

fn unavailable(message: String) -> StoreError {
    StoreError::Unavailable(format!("Redis: {}", message))
}

/// 为 Redis 操作加上超时
async fn bounded<T, F>(limit: Duration, operation: F) -> Result<T, StoreError>
where
    F: Future<Output = RedisResult<T>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(unavailable(e.to_string())),
        Err(_) => Err(unavailable(format!("操作超时 ({} ms)", limit.as_millis()))),
    }
}

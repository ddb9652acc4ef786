//! 股票数据模型
//!
//! 定义报价、点赞记录以及 /api/stock-prices 的请求与响应结构

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::AppError;

/// 单个股票代码的最大长度
const MAX_SYMBOL_LEN: usize = 12;

/// 一次查询最多允许的股票数量
const MAX_SYMBOLS_PER_QUERY: usize = 2;

/// 规范化股票代码：去除首尾空白并转为大写
pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// 校验规范化后的股票代码
pub fn validate_symbol(symbol: &str) -> Result<(), AppError> {
    if symbol.is_empty() {
        return Err(AppError::Validation("股票代码不能为空".to_string()));
    }
    if symbol.chars().count() > MAX_SYMBOL_LEN {
        return Err(AppError::Validation(format!(
            "股票代码 {} 超过 {} 个字符",
            symbol, MAX_SYMBOL_LEN
        )));
    }
    let allowed = |c: char| c.is_ascii_uppercase() || c.is_ascii_digit() || ".-^=".contains(c);
    if !symbol.chars().all(allowed) {
        return Err(AppError::Validation(format!("股票代码 {} 含有非法字符", symbol)));
    }
    Ok(())
}

/// 上游代理返回的报价
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// 股票代码（大写）
    pub symbol: String,
    /// 最新价格
    pub price: f64,
}

/// 匿名化后的客户端身份
///
/// 由盐值与截断后的地址哈希得到，原始地址不会被保存
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityToken(String);

impl IdentityToken {
    pub fn new(digest: String) -> Self {
        Self(digest)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 单个股票的点赞记录
#[derive(Debug, Clone, Default)]
pub struct StockRecord {
    /// 股票代码
    pub symbol: String,
    /// 点赞数
    pub likes: u64,
    /// 已经点过赞的身份
    pub voter_tokens: HashSet<String>,
}

impl StockRecord {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            ..Self::default()
        }
    }

    /// 登记一次点赞，同一身份只计一次，返回当前点赞数
    pub fn register_vote(&mut self, token: &IdentityToken) -> u64 {
        if self.voter_tokens.insert(token.as_str().to_string()) {
            self.likes += 1;
        }
        self.likes
    }
}

/// 点赞存储返回的计数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeCount {
    pub symbol: String,
    pub likes: u64,
}

/// 单股查询结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockData {
    pub stock: String,
    pub price: f64,
    pub likes: u64,
}

/// 双股对比结果，rel_likes 为本股点赞数减去另一只的点赞数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelativeStockData {
    pub stock: String,
    pub price: f64,
    pub rel_likes: i64,
}

/// stockData 字段：单股为对象，双股为数组
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StockDataPayload {
    Single(StockData),
    Pair([RelativeStockData; 2]),
}

/// GET /api/stock-prices 响应
#[derive(Debug, Serialize)]
pub struct StockPricesResponse {
    #[serde(rename = "stockData")]
    pub stock_data: StockDataPayload,
}

/// GET /api/stock-prices 查询参数
///
/// `stock` 可以重复出现，因此不走 `web::Query`，而是手动解析查询字符串
#[derive(Debug, Clone, PartialEq)]
pub struct StockPricesQuery {
    /// 规范化后的股票代码，保持请求中的顺序
    pub symbols: Vec<String>,
    /// 是否点赞
    pub like: bool,
}

impl StockPricesQuery {
    pub fn parse(query_string: &str) -> Result<Self, AppError> {
        let mut symbols = Vec::new();
        let mut like = false;

        for (key, value) in url::form_urlencoded::parse(query_string.as_bytes()) {
            match key.as_ref() {
                "stock" => symbols.push(normalize_symbol(&value)),
                "like" => like = matches!(value.as_ref(), "true" | "1"),
                _ => {}
            }
        }

        if symbols.is_empty() {
            return Err(AppError::Validation("缺少 stock 查询参数".to_string()));
        }
        if symbols.len() > MAX_SYMBOLS_PER_QUERY {
            return Err(AppError::Validation(format!(
                "最多同时查询 {} 只股票，收到 {} 只",
                MAX_SYMBOLS_PER_QUERY,
                symbols.len()
            )));
        }
        for symbol in &symbols {
            validate_symbol(symbol)?;
        }
        if symbols.len() == 2 && symbols[0] == symbols[1] {
            return Err(AppError::Validation(format!(
                "对比查询需要两只不同的股票，收到两次 {}",
                symbols[0]
            )));
        }

        Ok(Self { symbols, like })
    }
}

//! 通用 API 响应模型
//!
//! 错误统一返回 `{ "error": ..., "detail"?: ... }`

use serde::{Deserialize, Serialize};

/// 错误响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误概要
    pub error: String,
    /// 错误详情（生产环境默认不返回）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            error: error.into(),
            detail,
        }
    }
}

/// 健康检查响应
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    /// 响应时间戳（RFC 3339）
    pub timestamp: String,
}

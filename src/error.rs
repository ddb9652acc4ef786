//! 错误类型
//!
//! 报价、点赞存储和请求层各自的错误，最终统一映射为 HTTP 响应

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::error::Error as StdError;
use thiserror::Error;

use crate::models::ErrorResponse;

/// 报价获取错误
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("代理地址无效: {0}")]
    InvalidProxyUrl(#[from] url::ParseError),

    #[error("请求 {url} 失败: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("代理返回 {status} ({url}): {body}")]
    Status { url: String, status: u16, body: String },

    #[error("代理响应格式错误 ({url}): {excerpt}")]
    Malformed { url: String, excerpt: String },

    #[error("无法获取 {symbol} 的报价")]
    Unavailable {
        symbol: String,
        #[source]
        source: Option<Box<QuoteError>>,
    },
}

/// 点赞存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("点赞存储不可用: {0}")]
    Unavailable(String),
}

/// 请求层错误
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    QuoteUnavailable(#[from] QuoteError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Not Found")]
    NotFound,
}

impl AppError {
    /// 对外的错误概要
    pub fn summary(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "Invalid request",
            AppError::QuoteUnavailable(_) => "Quote unavailable",
            AppError::Store(_) => "Like store unavailable",
            AppError::NotFound => "Not Found",
        }
    }

    /// 生成错误响应
    ///
    /// 校验错误的信息总是返回给调用方，其余错误只有在 `expose_detail` 时才带上完整错误链
    pub fn to_response(&self, expose_detail: bool) -> HttpResponse {
        let detail = match self {
            AppError::Validation(message) => Some(message.clone()),
            AppError::NotFound => None,
            _ if expose_detail => Some(error_chain(self)),
            _ => None,
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.summary(), detail))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::QuoteUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.to_response(false)
    }
}

/// 将错误及其来源拼接成一行
pub fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

//! 客户端地址匿名化
//!
//! IPv4 抹掉最后一段，IPv6 只保留第一个冒号之前的部分，再与盐值一起做 SHA-256。
//! 同一 /24 网段（或同一 IPv6 首段）的请求得到相同的身份，原始地址不落盘。

use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

use crate::models::IdentityToken;

fn ipv4_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"([0-9]+)\.([0-9]+)\.([0-9]+)\.([0-9]+)").expect("IPv4 正则无效")
    })
}

/// 截断客户端地址
///
/// 地址可能带有端口或来自代理头的杂质，只要能匹配出 IPv4 就按 IPv4 处理
pub fn coarsen_address(raw: &str) -> String {
    if let Some(caps) = ipv4_pattern().captures(raw) {
        return format!("{}.{}.{}.0", &caps[1], &caps[2], &caps[3]);
    }

    match raw.find(':') {
        Some(idx) if idx > 0 => raw[..=idx].to_string(),
        _ => raw.to_string(),
    }
}

/// 地址匿名化器，盐值在进程启动时确定
#[derive(Debug, Clone)]
pub struct IpAnonymizer {
    salt: String,
}

impl IpAnonymizer {
    pub fn new(salt: impl Into<String>) -> Self {
        Self { salt: salt.into() }
    }

    pub fn anonymize(&self, raw: &str) -> IdentityToken {
        let truncated = coarsen_address(raw);

        let mut hasher = Sha256::new();
        hasher.update(self.salt.as_bytes());
        hasher.update(truncated.as_bytes());

        IdentityToken::new(hex::encode(hasher.finalize()))
    }
}

//! 业务逻辑服务模块
//!
//! 封装报价获取、匿名化和点赞存储

pub mod anonymizer;    // 客户端地址匿名化
pub mod likes;         // 点赞存储
pub mod stock;         // 报价获取
pub mod stock_service; // 股票查询编排

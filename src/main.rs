//! 股票价格查询服务
//!
//! 通过外部报价代理查询股票价格，并记录匿名点赞
//! 点赞按截断后的客户端地址去重，原始地址不保存

mod config;     // 配置加载
mod error;      // 错误类型
mod handlers;   // HTTP 请求处理器
mod models;     // 数据模型定义
mod services;   // 业务逻辑服务
mod state;      // 共享状态

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use crate::config::AppConfig;
use crate::state::AppState;

/// 应用程序入口
///
/// 加载配置、选择点赞存储后启动 HTTP 服务器
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统，默认日志级别为 info
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::load();
    let state = web::Data::new(AppState::from_config(&config).await?);

    log::info!("启动股票价格查询服务，监听 {}", config.bind_addr());
    if config.server.trust_forwarded {
        log::warn!("已信任转发头，客户端地址取自 Forwarded / X-Forwarded-For");
    }

    let mut server = HttpServer::new(move || {
        App::new()
            // 请求日志，不记录客户端地址
            .wrap(Logger::new("\"%r\" %s %b %Dms"))
            .app_data(state.clone())
            .configure(handlers::config)  // 配置路由
            .default_service(web::to(handlers::not_found))
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(config.bind_addr())?.run().await?;
    Ok(())
}

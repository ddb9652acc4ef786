pub mod stock;
pub mod health;

use actix_web::{web, HttpResponse};

use crate::error::AppError;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(health::config)
            .configure(stock::config)
    );
}

/// 未匹配的路由
pub async fn not_found() -> HttpResponse {
    AppError::NotFound.to_response(false)
}

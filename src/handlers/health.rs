use actix_web::{web, HttpResponse, Result};
use chrono::Utc;

use crate::models::HealthStatus;

pub async fn health_check() -> Result<HttpResponse> {
    let response = HealthStatus {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    Ok(HttpResponse::Ok().json(response))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

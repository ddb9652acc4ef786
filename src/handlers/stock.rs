//! 股票价格查询接口
//!
//! - GET /api/stock-prices?stock=GOOG - 单股报价和点赞数
//! - GET /api/stock-prices?stock=GOOG&like=true - 单股报价并点赞
//! - GET /api/stock-prices?stock=GOOG&stock=MSFT[&like=true] - 双股对比，返回相对点赞数

use actix_web::{web, HttpRequest, HttpResponse, Result};

use crate::error::{error_chain, AppError};
use crate::models::{StockPricesQuery, StockPricesResponse};
use crate::state::AppState;

pub async fn get_stock_prices(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let client_addr = resolve_client_addr(&req, state.trust_forwarded);

    let outcome = match StockPricesQuery::parse(req.query_string()) {
        Ok(query) => state.stock_service.query(&query, &client_addr).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(stock_data) => Ok(HttpResponse::Ok().json(StockPricesResponse { stock_data })),
        Err(e) => {
            match &e {
                AppError::Validation(message) => log::warn!("[stock-prices] 参数错误: {}", message),
                _ => log::error!("[stock-prices] {}", error_chain(&e)),
            }
            Ok(e.to_response(state.expose_error_detail))
        }
    }
}

/// 客户端地址，用于生成匿名身份
///
/// 默认只用 TCP 对端地址；转发头可被客户端伪造，只有配置了信任时才取其第一跳
fn resolve_client_addr(req: &HttpRequest, trust_forwarded: bool) -> String {
    if trust_forwarded {
        return req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or_default()
            .to_string();
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_default()
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/stock-prices", web::get().to(get_stock_prices));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers;
    use crate::services::anonymizer::IpAnonymizer;
    use crate::services::likes::{LikeStore, MemoryLikeStore};
    use crate::services::stock_service::tests::StaticQuotes;
    use crate::services::stock_service::StockQueryService;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::Value;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn state(
        quotes: Arc<StaticQuotes>,
        store: Arc<MemoryLikeStore>,
        expose_error_detail: bool,
    ) -> web::Data<AppState> {
        state_with_proxy_trust(quotes, store, expose_error_detail, false)
    }

    fn state_with_proxy_trust(
        quotes: Arc<StaticQuotes>,
        store: Arc<MemoryLikeStore>,
        expose_error_detail: bool,
        trust_forwarded: bool,
    ) -> web::Data<AppState> {
        web::Data::new(AppState {
            stock_service: StockQueryService::new(quotes, store, IpAnonymizer::new("test-salt")),
            expose_error_detail,
            trust_forwarded,
        })
    }

    fn default_quotes() -> Arc<StaticQuotes> {
        Arc::new(StaticQuotes::with(&[("GOOG", 135.5), ("MSFT", 410.25)]))
    }

    /// 以指定对端地址（IP）发起请求
    fn get(uri: &str, client: &str) -> test::TestRequest {
        test::TestRequest::get()
            .uri(uri)
            .peer_addr(format!("{}:40000", client).parse().unwrap())
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data($state)
                    .configure(handlers::config)
                    .default_service(web::to(handlers::not_found)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_view_one_stock() {
        let app = app!(state(default_quotes(), Arc::new(MemoryLikeStore::new()), false));

        let resp = test::call_service(&app, get("/api/stock-prices?stock=goog", "203.0.113.9").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["stockData"]["stock"], "GOOG");
        assert_eq!(body["stockData"]["price"], 135.5);
        assert_eq!(body["stockData"]["likes"], 0);
    }

    #[actix_web::test]
    async fn test_like_twice_from_same_origin() {
        let app = app!(state(default_quotes(), Arc::new(MemoryLikeStore::new()), false));
        let uri = "/api/stock-prices?stock=GOOG&like=true";

        let first: Value =
            test::read_body_json(test::call_service(&app, get(uri, "203.0.113.9").to_request()).await).await;
        let second: Value =
            test::read_body_json(test::call_service(&app, get(uri, "203.0.113.10").to_request()).await).await;

        assert_eq!(first["stockData"]["likes"], 1);
        assert_eq!(second["stockData"]["likes"], first["stockData"]["likes"]);
    }

    #[actix_web::test]
    async fn test_view_two_stocks_with_like() {
        let store = Arc::new(MemoryLikeStore::new());
        let app = app!(state(default_quotes(), store.clone(), false));

        let resp = test::call_service(
            &app,
            get("/api/stock-prices?stock=GOOG&stock=MSFT&like=true", "203.0.113.9").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        let data = body["stockData"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["stock"], "GOOG");
        assert_eq!(data[1]["stock"], "MSFT");
        let rel_a = data[0]["rel_likes"].as_i64().unwrap();
        let rel_b = data[1]["rel_likes"].as_i64().unwrap();
        assert_eq!(rel_a + rel_b, 0);
        assert!(data[0].get("likes").is_none());

        assert_eq!(store.likes("GOOG").await.unwrap(), 1);
        assert_eq!(store.likes("MSFT").await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn test_upstream_failure_leaves_store_untouched() {
        let store = Arc::new(MemoryLikeStore::new());
        let app = app!(state(default_quotes(), store.clone(), false));

        let resp = test::call_service(
            &app,
            get("/api/stock-prices?stock=NOPE&like=true", "203.0.113.9").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Quote unavailable");
        assert!(body.get("detail").is_none());
        assert!(!store.contains("NOPE"));
    }

    #[actix_web::test]
    async fn test_error_detail_when_exposed() {
        let app = app!(state(default_quotes(), Arc::new(MemoryLikeStore::new()), true));

        let resp = test::call_service(&app, get("/api/stock-prices?stock=NOPE", "203.0.113.9").to_request()).await;
        let body: Value = test::read_body_json(resp).await;
        assert!(body["detail"].as_str().unwrap().contains("NOPE"));
    }

    #[actix_web::test]
    async fn test_validation_errors_skip_fetcher() {
        let quotes = default_quotes();
        let app = app!(state(quotes.clone(), Arc::new(MemoryLikeStore::new()), false));

        for uri in [
            "/api/stock-prices",
            "/api/stock-prices?like=true",
            "/api/stock-prices?stock=A&stock=B&stock=C",
            "/api/stock-prices?stock=",
        ] {
            let resp = test::call_service(&app, get(uri, "203.0.113.9").to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["error"], "Invalid request");
            assert!(body["detail"].is_string());
        }
        assert_eq!(quotes.calls.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn test_unknown_route() {
        let app = app!(state(default_quotes(), Arc::new(MemoryLikeStore::new()), false));

        let resp = test::call_service(&app, get("/api/nothing-here", "203.0.113.9").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Not Found");
    }

    #[actix_web::test]
    async fn test_forged_forwarded_header_is_ignored_by_default() {
        let store = Arc::new(MemoryLikeStore::new());
        let app = app!(state(default_quotes(), store.clone(), false));

        for i in 0..5 {
            let req = get("/api/stock-prices?stock=GOOG&like=true", "198.51.100.7")
                .insert_header(("x-forwarded-for", format!("10.{}.0.1", i)))
                .to_request();
            let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
            assert_eq!(body["stockData"]["likes"], 1, "第 {} 次请求", i + 1);
        }
        assert_eq!(store.likes("GOOG").await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn test_forwarded_header_used_when_trusted() {
        let store = Arc::new(MemoryLikeStore::new());
        let app = app!(state_with_proxy_trust(default_quotes(), store.clone(), false, true));

        for (i, origin) in ["10.0.0.1", "10.1.0.1", "10.1.0.2"].iter().enumerate() {
            let req = get("/api/stock-prices?stock=GOOG&like=true", "192.0.2.1")
                .insert_header(("x-forwarded-for", origin.to_string()))
                .to_request();
            let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
            // 10.1.0.1 与 10.1.0.2 同属一个 /24
            let expected = if i == 0 { 1 } else { 2 };
            assert_eq!(body["stockData"]["likes"], expected);
        }
    }

    #[actix_web::test]
    async fn test_health() {
        let app = app!(state(default_quotes(), Arc::new(MemoryLikeStore::new()), false));

        let resp = test::call_service(&app, get("/api/health", "203.0.113.9").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
    }
}

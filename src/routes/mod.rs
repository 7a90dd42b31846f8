use crate::config::{Config, MarketConfig};
use crate::db::ledger_store::LedgerStore;
use crate::error::AppError;
use crate::services::account_service::AccountService;
use actix_web::web;
use std::time::Duration;

pub mod account_routes;
pub mod chat_routes;
pub mod market_routes;
pub mod trade_routes;

pub struct AppState {
    pub accounts: AccountService,
    pub http_client: reqwest::Client,
    pub market: MarketConfig,
}

pub async fn initialize_app_state(store: LedgerStore, config: &Config) -> Result<AppState, AppError> {
    let accounts = AccountService::open(store, config.initial_balance.clone()).await?;
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    Ok(AppState {
        accounts,
        http_client,
        market: config.market.clone(),
    })
}

/// Malformed or mistyped bodies answer 400 `{message}` like any other bad input.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, req| {
            log::warn!("Rejected body for {}: {}", req.path(), err);
            AppError::InvalidInput(err.to_string()).into()
        })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/prices", web::get().to(market_routes::get_prices))
        .route("/api/signup", web::post().to(account_routes::signup))
        .route("/api/users/{username}", web::get().to(account_routes::get_account))
        .route("/api/trade", web::post().to(trade_routes::create_trade))
        .route("/api/chat", web::post().to(chat_routes::chat));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerBackend;
    use crate::db::ledger_store::FileStore;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use bigdecimal::BigDecimal;
    use serde_json::{json, Value};
    use std::path::Path;
    use tempfile::TempDir;

    fn test_config(ledger_path: &Path, market_url: &str) -> Config {
        Config {
            bind_addr: "127.0.0.1".to_string(),
            port: 0,
            backend: LedgerBackend::File { path: ledger_path.to_path_buf() },
            initial_balance: BigDecimal::from(20000),
            market: MarketConfig {
                url: market_url.to_string(),
                vs_currency: "usd".to_string(),
                per_page: 10,
            },
            json_limit: 4096,
        }
    }

    async fn state_at(ledger_path: &Path, market_url: &str) -> web::Data<AppState> {
        let config = test_config(ledger_path, market_url);
        let store = LedgerStore::File(FileStore::new(ledger_path));
        web::Data::new(initialize_app_state(store, &config).await.unwrap())
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(json_config(4096))
                    .app_data($state.clone())
                    .configure(configure),
            )
            .await
        };
    }

    fn post(uri: &str, body: Value) -> test::TestRequest {
        test::TestRequest::post().uri(uri).set_json(body)
    }

    #[actix_web::test]
    async fn signup_returns_user_summary() {
        let dir = TempDir::new().unwrap();
        let state = state_at(&dir.path().join("db.json"), "http://127.0.0.1:9").await;
        let app = app!(state);

        let resp = test::call_service(&app, post("/api/signup", json!({"username": "alice"})).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({"message": "Signup successful", "user": {"username": "alice", "balance": 20000}})
        );
    }

    #[actix_web::test]
    async fn duplicate_signup_is_bad_request() {
        let dir = TempDir::new().unwrap();
        let state = state_at(&dir.path().join("db.json"), "http://127.0.0.1:9").await;
        let app = app!(state);

        test::call_service(&app, post("/api/signup", json!({"username": "alice"})).to_request()).await;
        let resp = test::call_service(&app, post("/api/signup", json!({"username": "alice"})).to_request()).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"message": "User already exists"}));
    }

    #[actix_web::test]
    async fn trade_returns_full_account() {
        let dir = TempDir::new().unwrap();
        let state = state_at(&dir.path().join("db.json"), "http://127.0.0.1:9").await;
        let app = app!(state);

        test::call_service(&app, post("/api/signup", json!({"username": "bob"})).to_request()).await;
        let resp = test::call_service(
            &app,
            post("/api/trade", json!({"username": "bob", "symbol": "BTC", "amount": 500})).to_request(),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Trade completed");
        assert_eq!(body["user"]["username"], "bob");
        assert_eq!(body["user"]["balance"], 19500);
        assert_eq!(body["user"]["trades"][0]["symbol"], "BTC");
        assert_eq!(body["user"]["trades"][0]["amount"], 500);
        assert!(body["user"]["trades"][0]["time"].is_string());
    }

    #[actix_web::test]
    async fn trade_for_unknown_user_is_not_found() {
        let dir = TempDir::new().unwrap();
        let state = state_at(&dir.path().join("db.json"), "http://127.0.0.1:9").await;
        let app = app!(state);

        let resp = test::call_service(
            &app,
            post("/api/trade", json!({"username": "carol", "symbol": "ETH", "amount": 10})).to_request(),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"message": "User not found"}));
    }

    #[actix_web::test]
    async fn malformed_bodies_are_bad_requests() {
        let dir = TempDir::new().unwrap();
        let state = state_at(&dir.path().join("db.json"), "http://127.0.0.1:9").await;
        let app = app!(state);
        test::call_service(&app, post("/api/signup", json!({"username": "bob"})).to_request()).await;

        let cases = vec![
            ("/api/signup", json!({})),
            ("/api/signup", json!({"username": ""})),
            ("/api/trade", json!({"username": "bob", "symbol": "BTC"})),
            ("/api/trade", json!({"username": "bob", "symbol": "BTC", "amount": "lots"})),
            ("/api/trade", json!({"username": "bob", "symbol": "", "amount": 1})),
            ("/api/trade", json!({"username": "bob", "symbol": "BTC", "amount": "1e-200000"})),
            ("/api/trade", json!({"username": "bob", "symbol": "BTC", "amount": "1e-50000000"})),
        ];
        for (uri, body) in cases {
            let resp = test::call_service(&app, post(uri, body.clone()).to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{} {}", uri, body);
            let body: Value = test::read_body_json(resp).await;
            assert!(body["message"].is_string());
        }

        let bob = state.accounts.account("bob").await.unwrap();
        assert!(bob.trades.is_empty());
    }

    #[actix_web::test]
    async fn get_account_returns_trades() {
        let dir = TempDir::new().unwrap();
        let state = state_at(&dir.path().join("db.json"), "http://127.0.0.1:9").await;
        let app = app!(state);
        test::call_service(&app, post("/api/signup", json!({"username": "bob"})).to_request()).await;
        test::call_service(
            &app,
            post("/api/trade", json!({"username": "bob", "symbol": "ETH", "amount": -2.5})).to_request(),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/users/bob").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["balance"], 20002.5);
        assert_eq!(body["trades"][0]["amount"], -2.5);

        let req = test::TestRequest::get().uri("/api/users/nobody").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn storage_failure_is_opaque_internal_error() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("data");
        std::fs::create_dir(&nested).unwrap();
        let state = state_at(&nested.join("db.json"), "http://127.0.0.1:9").await;
        let app = app!(state);
        std::fs::remove_dir_all(&nested).unwrap();

        let resp = test::call_service(&app, post("/api/signup", json!({"username": "alice"})).to_request()).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"message": "Internal server error"}));
        assert!(state.accounts.snapshot().await.is_empty());
    }

    #[actix_web::test]
    async fn chat_replies_by_keyword() {
        let dir = TempDir::new().unwrap();
        let state = state_at(&dir.path().join("db.json"), "http://127.0.0.1:9").await;
        let app = app!(state);

        let resp = test::call_service(&app, post("/api/chat", json!({"message": "Show me my WALLET"})).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({"reply": "Your wallet balance updates automatically after trades."})
        );
    }

    #[actix_web::test]
    async fn prices_proxy_upstream_and_hide_failures() {
        let mut server = mockito::Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let market_url = format!("{}/api/v3/coins/markets", server.url());
        let state = state_at(&dir.path().join("db.json"), &market_url).await;
        let app = app!(state);

        let ok = server
            .mock("GET", "/api/v3/coins/markets")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"symbol":"btc","current_price":67000}]"#)
            .create_async()
            .await;
        let req = test::TestRequest::get().uri("/api/prices").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!([{"symbol": "btc", "current_price": 67000}]));
        ok.remove_async().await;

        server
            .mock("GET", "/api/v3/coins/markets")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;
        let req = test::TestRequest::get().uri("/api/prices").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"error": "Failed to fetch data"}));
    }
}

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use meli_orders_archiver::application::services::order_client::MeliOrderClient;
use meli_orders_archiver::application::services::windowing::{MonthlyWindows, RollingWindow};
use meli_orders_archiver::config::{Config, Credentials, RestApiConfig, WindowMode};
use meli_orders_archiver::error::{AppError, FetchError};
use meli_orders_archiver::session::auth::MeliAuth;
use meli_orders_archiver::storage::config::StorageConfig;
use meli_orders_archiver::storage::sink::RestSink;
use meli_orders_archiver::transport::retry::Sleeper;
use meli_orders_archiver::utils::logger::setup_logger;
use meli_orders_archiver::utils::orders::run_with;
use mockito::{Matcher, Mock, Server, ServerGuard};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct CountingSleeper {
    delays: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Sleeper for CountingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

fn test_config(url: &str) -> Config {
    Config {
        credentials: Credentials {
            client_id: "client_123".to_string(),
            client_secret: "secret_456".to_string(),
            refresh_token: "TG-refresh".to_string(),
        },
        rest_api: RestApiConfig {
            base_url: url.to_string(),
            timeout: 5,
        },
        storage: StorageConfig {
            url: url.to_string(),
            service_key: "sb_service".to_string(),
            table: "raw_orders".to_string(),
        },
        seller_id: "381183837".to_string(),
        window: WindowMode::Rolling { days: 7 },
    }
}

fn page_body(offset: u32, count: u32) -> String {
    let results: Vec<Value> = (0..count).map(|i| json!({"id": 2000000 + offset + i})).collect();
    json!({
        "query": "",
        "results": results,
        "paging": {"total": 100, "offset": offset, "limit": 50}
    })
    .to_string()
}

async fn token_mock(server: &mut ServerGuard) -> Mock {
    server
        .mock("POST", "/oauth/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token": "APP_USR-1", "token_type": "Bearer", "expires_in": 21600}"#)
        .expect(1)
        .create_async()
        .await
}

async fn search_mock(server: &mut ServerGuard, offset: u32, count: u32) -> Mock {
    server
        .mock("GET", "/orders/search")
        .match_header("authorization", "Bearer APP_USR-1")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("seller".into(), "381183837".into()),
            Matcher::UrlEncoded("limit".into(), "50".into()),
            Matcher::UrlEncoded("offset".into(), offset.to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(page_body(offset, count))
        .expect(1)
        .create_async()
        .await
}

#[tokio::test]
async fn test_rolling_run_archives_every_full_page() {
    setup_logger();
    let mut server = Server::new_async().await;
    let token = token_mock(&mut server).await;
    let first = search_mock(&mut server, 0, 50).await;
    let second = search_mock(&mut server, 50, 50).await;
    let last = search_mock(&mut server, 100, 0).await;
    let insert = server
        .mock("POST", "/rest/v1/raw_orders")
        .match_header("apikey", "sb_service")
        .match_header("authorization", "Bearer sb_service")
        .match_query(Matcher::UrlEncoded("prefer".into(), "return=minimal".into()))
        .match_body(Matcher::Regex(r#"^\[\{"payload":\{"#.to_string()))
        .with_status(201)
        .expect(2)
        .create_async()
        .await;

    let config = test_config(&server.url());
    let sleeper = Arc::new(CountingSleeper::default());
    let auth = MeliAuth::new(&config).unwrap();
    let fetcher = MeliOrderClient::new(&config, sleeper.clone()).unwrap();
    let sink = RestSink::new(&config.storage).unwrap();

    let summary = run_with(
        &auth,
        &fetcher,
        &sink,
        sleeper.as_ref(),
        &RollingWindow::new(7),
        Utc::now(),
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(summary.pages_inserted, 2);
    assert_eq!(summary.summary_line(), json!({"orders_pages_inserted": 2}));
    assert_eq!(
        *sleeper.delays.lock().unwrap(),
        vec![Duration::from_millis(200), Duration::from_millis(200)]
    );

    token.assert_async().await;
    first.assert_async().await;
    second.assert_async().await;
    last.assert_async().await;
    insert.assert_async().await;
}

#[tokio::test]
async fn test_non_retryable_search_error_aborts_run() {
    setup_logger();
    let mut server = Server::new_async().await;
    let token = token_mock(&mut server).await;
    let search = server
        .mock("GET", "/orders/search")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"message": "seller not found"}"#)
        .expect(1)
        .create_async()
        .await;
    let insert = server
        .mock("POST", "/rest/v1/raw_orders")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let config = test_config(&server.url());
    let sleeper = Arc::new(CountingSleeper::default());
    let auth = MeliAuth::new(&config).unwrap();
    let fetcher = MeliOrderClient::new(&config, sleeper.clone()).unwrap();
    let sink = RestSink::new(&config.storage).unwrap();

    let result = run_with(
        &auth,
        &fetcher,
        &sink,
        sleeper.as_ref(),
        &RollingWindow::new(7),
        Utc::now(),
        |_| {},
    )
    .await;

    match result {
        Err(AppError::Fetch(FetchError::Status(status, body))) => {
            assert_eq!(status.as_u16(), 404);
            assert!(body.contains("seller not found"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(sleeper.delays.lock().unwrap().is_empty());

    token.assert_async().await;
    search.assert_async().await;
    insert.assert_async().await;
}

#[tokio::test]
async fn test_monthly_run_queries_each_month() {
    setup_logger();
    let mut server = Server::new_async().await;
    let token = token_mock(&mut server).await;
    let march = server
        .mock("GET", "/orders/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded(
                "order.date_created.from".into(),
                "2024-03-01T00:00:00.000+00:00".into(),
            ),
            Matcher::UrlEncoded(
                "order.date_created.to".into(),
                "2024-03-15T10:00:00.000+00:00".into(),
            ),
        ]))
        .with_status(200)
        .with_body(r#"{"results": []}"#)
        .expect(1)
        .create_async()
        .await;
    let february = server
        .mock("GET", "/orders/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded(
                "order.date_created.from".into(),
                "2024-02-01T00:00:00.000+00:00".into(),
            ),
            Matcher::UrlEncoded(
                "order.date_created.to".into(),
                "2024-03-01T00:00:00.000+00:00".into(),
            ),
        ]))
        .with_status(200)
        .with_body(r#"{"results": []}"#)
        .expect(1)
        .create_async()
        .await;

    let config = test_config(&server.url());
    let sleeper = Arc::new(CountingSleeper::default());
    let auth = MeliAuth::new(&config).unwrap();
    let fetcher = MeliOrderClient::new(&config, sleeper.clone()).unwrap();
    let sink = RestSink::new(&config.storage).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
    let mut lines = Vec::new();

    let summary = run_with(
        &auth,
        &fetcher,
        &sink,
        sleeper.as_ref(),
        &MonthlyWindows::new(2),
        now,
        |report| lines.push(report.progress_line()),
    )
    .await
    .unwrap();

    assert_eq!(summary.pages_inserted, 0);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1]["window_from"], "2024-02-01T00:00:00.000+00:00");

    token.assert_async().await;
    march.assert_async().await;
    february.assert_async().await;
}

use hyper::StatusCode;
use serde_json::json;
use sysdig_feishu_relay::{
    config::{Auth, Config, DEFAULT_HOOK_PATH},
    http::{AppState, create_router},
    metrics,
};
use tokio::net::TcpListener;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

// The recorder is process-wide, so everything runs in this one test
#[tokio::test]
async fn test_metrics_endpoint_reports_relays() {
    metrics::register_metrics().unwrap();

    let webhook = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&webhook)
        .await;

    let config = Config {
        auth: Auth::new(Some("s3cret".to_string()), None),
        ..Default::default()
    };
    let app = create_router(&config.http, AppState::new(&config).unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let relay = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::new();
    let hook = format!("{relay}{DEFAULT_HOOK_PATH}");
    let good = json!({ "alert": { "body": "x" }, "customData": { "webhook": webhook.uri() } });

    let response = client
        .post(&hook)
        .header("BASE_KEY", "s3cret")
        .body(good.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.post(&hook).body(good.to_string()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .post(&hook)
        .header("BASE_KEY", "s3cret")
        .body("{")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client.get(format!("{relay}/metrics")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let rendered = response.text().await.unwrap();
    assert!(rendered.contains(r#"relay_requests_total{status="success"} 1"#), "{rendered}");
    assert!(rendered.contains(r#"relay_requests_total{status="failure"} 2"#), "{rendered}");
    assert!(rendered.contains(r#"relay_errors_total{kind="unauthorized"} 1"#), "{rendered}");
    assert!(rendered.contains(r#"relay_errors_total{kind="decode"} 1"#), "{rendered}");
    assert!(rendered.contains(r#"http_requests_total{endpoint="relay"} 3"#), "{rendered}");
    assert!(rendered.contains("last_successful_relay_timestamp"), "{rendered}");
    assert!(rendered.contains("build_info"), "{rendered}");

    assert!(metrics::register_metrics().is_err());
}

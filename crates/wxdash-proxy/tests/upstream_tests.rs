//! Proxy behaviour against a mock weather provider.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wxdash_proxy::UpstreamClient;

fn app_for(server: &MockServer) -> Router {
    let upstream = UpstreamClient::new(format!("{}/data/2.5", server.uri()), "secret-key");
    let (router, _state) = wxdash_proxy::build_app(upstream).unwrap();
    router
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let res = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let body = to_bytes(res.into_body(), 1024 * 1024).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn weather_by_city_relays_body_verbatim() {
    let server = MockServer::start().await;
    let raw = r#"{"name":"London","cod":200,"main":{"temp":11.2,"humidity":81}}"#;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "London"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", "secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(raw, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = get(app_for(&server), "/weather?city=London").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, raw);
}

#[tokio::test]
async fn weather_by_coordinates_forwards_lat_lon_and_unit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "40.7"))
        .and(query_param("lon", "-74"))
        .and(query_param("units", "imperial"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cod": 200, "name": "New York"})))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = get(
        app_for(&server),
        "/weather?lat=40.7&lon=-74&unit=imperial",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["name"], "New York");
}

#[tokio::test]
async fn upstream_error_status_becomes_500() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"cod": "404", "message": "city not found"})),
        )
        .mount(&server)
        .await;

    let (status, body) = get(app_for(&server), "/weather?city=Atlantis").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value, json!({"error": "Failed to fetch weather data"}));
}

#[tokio::test]
async fn malformed_upstream_body_becomes_500() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>oops</html>", "text/html"))
        .mount(&server)
        .await;

    let (status, body) = get(app_for(&server), "/forecast?city=Paris").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value, json!({"error": "Failed to fetch forecast data"}));
}

#[tokio::test]
async fn unreachable_upstream_becomes_500() {
    // nothing listens on the discard port
    let upstream = UpstreamClient::new("http://127.0.0.1:9/data/2.5", "secret-key");
    let (app, _state) = wxdash_proxy::build_app(upstream).unwrap();

    let (status, body) = get(app, "/weather?city=London").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value, json!({"error": "Failed to fetch weather data"}));
}

#[tokio::test]
async fn forecast_relays_upstream_list() {
    let server = MockServer::start().await;
    let upstream_body = json!({
        "cod": "200",
        "list": [
            {"dt_txt": "2024-01-01 09:00:00"},
            {"dt_txt": "2024-01-01 12:00:00"}
        ]
    });

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("q", "Paris"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", "secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream_body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = get(app_for(&server), "/forecast?city=Paris&unit=metric").await;
    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_str(&body).unwrap();
    // the proxy does not filter; the dashboard does
    assert_eq!(value, upstream_body);
}

#[tokio::test]
async fn upstream_failures_are_counted_per_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"cod": "404"})))
        .mount(&server)
        .await;

    let app = app_for(&server);
    let (status, _) = get(app.clone(), "/weather?city=Atlantis").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, text) = get(app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    let failures: Vec<&str> = text
        .lines()
        .filter(|l| l.starts_with("wxdash_upstream_failures_total{"))
        .collect();
    assert_eq!(failures.len(), 1, "{text}");
    assert!(failures[0].contains(r#"endpoint="weather""#));
    assert!(failures[0].ends_with(" 1"));
}

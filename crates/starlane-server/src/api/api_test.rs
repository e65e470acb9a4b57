use std::path::PathBuf;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::Request;
use serde_json::{json, Value};
use starlane_upstream::{Fetcher, RetryPolicy};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn static_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../public"))
}

/// State pointing both clients at mock servers, with no back-off wait.
fn test_state(edsm_uri: &str, inara_uri: &str) -> AppState {
    let policy = RetryPolicy::new(3, Duration::ZERO, Duration::from_secs(5));
    let fetcher = Fetcher::new(policy, "starlane-test/0.1").expect("fetcher");
    AppState {
        edsm: Arc::new(EdsmClient::new(fetcher.clone(), edsm_uri).expect("edsm client")),
        inara: Arc::new(InaraClient::new(fetcher, inara_uri).expect("inara client")),
    }
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).expect("json parse");
    (status, json)
}

#[test]
fn api_error_omits_absent_details() {
    let err = ApiError::bad_request("missing required parameter: systemName");
    let json = serde_json::to_value(&err).expect("serialize");
    assert_eq!(
        json,
        json!({ "error": "missing required parameter: systemName" })
    );
}

#[test]
fn require_param_trims_and_rejects_blank() {
    assert_eq!(require_param(Some("  Sol "), "systemName").unwrap(), "Sol");
    assert!(require_param(Some("   "), "systemName").is_err());
    assert!(require_param(None, "systemName").is_err());
}

#[tokio::test]
async fn health_returns_ok() {
    let app = build_app(
        test_state("http://127.0.0.1:9", "http://127.0.0.1:9"),
        &static_dir(),
    );
    let (status, json) = get_json(app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn sphere_systems_normalizes_bare_record() {
    let edsm = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api-v1/sphere-systems"))
        .and(query_param("systemName", "Sol"))
        .and(query_param("radius", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "name": "Sol" }])))
        .expect(1)
        .mount(&edsm)
        .await;

    let app = build_app(test_state(&edsm.uri(), "http://127.0.0.1:9"), &static_dir());
    let (status, json) = get_json(app, "/api/sphere-systems?systemName=Sol&radius=50").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!([{
            "name": "Sol",
            "economy": "",
            "security": "",
            "allegiance": "Independent",
            "factions": 0,
            "stations": 0,
            "distance": null,
            "direction": null,
            "bodyCount": 0
        }])
    );
}

#[tokio::test]
async fn sphere_systems_applies_default_radii() {
    let edsm = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api-v1/sphere-systems"))
        .and(query_param("radius", "100"))
        .and(query_param("minRadius", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&edsm)
        .await;

    let app = build_app(test_state(&edsm.uri(), "http://127.0.0.1:9"), &static_dir());
    let (status, json) = get_json(app, "/api/sphere-systems?systemName=Sol").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn sphere_systems_rejects_invalid_radius_without_upstream_call() {
    let edsm = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&edsm)
        .await;

    let app = build_app(test_state(&edsm.uri(), "http://127.0.0.1:9"), &static_dir());
    let (status, json) = get_json(app, "/api/sphere-systems?systemName=Sol&radius=far").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("radius"));
}

#[tokio::test]
async fn nearest_systems_without_reference_is_400_and_never_calls_upstream() {
    let inara = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&inara)
        .await;

    let app = build_app(test_state("http://127.0.0.1:9", &inara.uri()), &static_dir());
    let (status, json) = get_json(app, "/api/nearest-systems?anyPopulation=true").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json,
        json!({ "error": "missing required parameter: referenceSystem" })
    );
}

#[tokio::test]
async fn nearest_systems_scrapes_and_normalizes() {
    let inara = MockServer::start().await;
    let page = r#"<table class="tablesortercollapsed"><tbody>
        <tr><td><a href="/s/1">Lave</a></td><td>Agriculture</td><td>High</td><td></td>
            <td>3</td><td>n/a</td><td>108.5 Ly <i style="transform:rotate(45deg)"></i></td></tr>
        <tr><td>short</td><td>row</td></tr>
    </tbody></table>"#;
    Mock::given(method("GET"))
        .and(path("/elite/nearest-starsystems/"))
        .and(query_param("ps1", "Sol"))
        .and(query_param("pi3", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .expect(1)
        .mount(&inara)
        .await;

    let app = build_app(test_state("http://127.0.0.1:9", &inara.uri()), &static_dir());
    let (status, json) = get_json(app, "/api/nearest-systems?referenceSystem=Sol&anyPopulation=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!([{
            "name": "Lave",
            "economy": "Agriculture",
            "security": "High",
            "allegiance": "Independent",
            "factions": 3,
            "stations": 0,
            "distance": 108.5,
            "direction": 45,
            "bodyCount": 0
        }])
    );
}

#[tokio::test]
async fn bodies_exhausted_upstream_is_500_with_cause() {
    let edsm = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api-system-v1/bodies"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&edsm)
        .await;

    let app = build_app(test_state(&edsm.uri(), "http://127.0.0.1:9"), &static_dir());
    let (status, json) = get_json(app, "/api/bodies?systemName=Sol").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "failed to fetch system bodies");
    assert!(
        json["details"].as_str().unwrap().contains("500"),
        "{json}"
    );
}

#[tokio::test]
async fn bodies_blank_system_name_is_400() {
    let app = build_app(
        test_state("http://127.0.0.1:9", "http://127.0.0.1:9"),
        &static_dir(),
    );
    let (status, json) = get_json(app, "/api/bodies?systemName=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json,
        json!({ "error": "missing required parameter: systemName" })
    );
}

#[tokio::test]
async fn repeated_query_key_is_json_400_without_upstream_call() {
    let edsm = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&edsm)
        .await;

    let app = build_app(test_state(&edsm.uri(), "http://127.0.0.1:9"), &static_dir());
    let (status, json) = get_json(app, "/api/bodies?systemName=Sol&systemName=Lave").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid query string");
    assert!(
        json["details"].as_str().unwrap().contains("systemName"),
        "{json}"
    );
}

#[tokio::test]
async fn system_coordinates_pass_through_unmodified() {
    let edsm = MockServer::start().await;
    let payload = json!({
        "name": "Sol",
        "coords": { "x": 0, "y": 0, "z": 0 },
        "coordsLocked": true
    });
    Mock::given(method("GET"))
        .and(path("/api-v1/system"))
        .and(query_param("systemName", "Sol"))
        .and(query_param("showCoordinates", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&payload))
        .expect(1)
        .mount(&edsm)
        .await;

    let app = build_app(test_state(&edsm.uri(), "http://127.0.0.1:9"), &static_dir());
    let (status, json) = get_json(app, "/api/system-coordinates?systemName=Sol").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, payload);
}

#[tokio::test]
async fn responses_carry_request_id_and_cors_headers() {
    let app = build_app(
        test_state("http://127.0.0.1:9", "http://127.0.0.1:9"),
        &static_dir(),
    );
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header("origin", "https://example.com")
                .header(REQUEST_ID_HEADER, "req-42")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-42");
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn unmatched_routes_fall_back_to_static_files() {
    let app = build_app(
        test_state("http://127.0.0.1:9", "http://127.0.0.1:9"),
        &static_dir(),
    );
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    assert!(String::from_utf8_lossy(&body).contains("<title>Starlane</title>"));
}

//! HTTP error mapping at the ingress

use crate::common::{TestPipeline, test_config};
use actix_web::http::StatusCode;
use actix_web::{test, web};
use logflow::server::HttpServer;
use logflow::utils::error::ErrorResponse;

#[actix_web::test]
async fn test_full_buffer_returns_retryable_503() {
    let mut config = test_config();
    config.pipeline.buffer.max_depth = Some(1);
    let fixture = TestPipeline::new(config);
    let app = test::init_service(HttpServer::create_app(web::Data::new(
        fixture.pipeline.app_state(),
    )))
    .await;

    let send = |id: &str| {
        test::TestRequest::post()
            .uri("/ingest")
            .insert_header(("content-type", "application/json"))
            .set_payload(format!(r#"{{"tenant_id":"acme","log_id":"{}"}}"#, id))
            .to_request()
    };

    assert_eq!(
        test::call_service(&app, send("1")).await.status(),
        StatusCode::ACCEPTED
    );
    let resp = test::call_service(&app, send("2")).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(resp.headers().contains_key("retry-after"));
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error.code, "BUFFER_UNAVAILABLE");

    let stats = fixture.pipeline.stats().snapshot();
    assert_eq!(stats.accepted, 1);
    assert_eq!(stats.enqueue_failures, 1);
}

#[actix_web::test]
async fn test_oversized_body_returns_413() {
    let mut config = test_config();
    config.pipeline.server.max_body_size = 64;
    let fixture = TestPipeline::new(config);
    let app = test::init_service(HttpServer::create_app(web::Data::new(
        fixture.pipeline.app_state(),
    )))
    .await;

    let req = test::TestRequest::post()
        .uri("/ingest")
        .insert_header(("content-type", "text/plain"))
        .insert_header(("x-tenant-id", "acme"))
        .set_payload("x".repeat(65))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(fixture.buffer.is_empty());
}

#[actix_web::test]
async fn test_body_that_only_overflows_once_encoded_returns_413() {
    let fixture = TestPipeline::new(test_config());
    let app = test::init_service(HttpServer::create_app(web::Data::new(
        fixture.pipeline.app_state(),
    )))
    .await;

    // under max_body_size as sent, twice the message limit once JSON-escaped
    let req = test::TestRequest::post()
        .uri("/ingest")
        .insert_header(("content-type", "text/plain"))
        .insert_header(("x-tenant-id", "acme"))
        .set_payload("\"".repeat(150_000))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(!resp.headers().contains_key("retry-after"));
    assert!(fixture.buffer.is_empty());

    let stats = fixture.pipeline.stats().snapshot();
    assert_eq!(stats.rejected, 1);
    assert_eq!(stats.enqueue_failures, 0);
}

#[actix_web::test]
async fn test_client_errors_carry_code_and_request_id() {
    let fixture = TestPipeline::new(test_config());
    let app = test::init_service(HttpServer::create_app(web::Data::new(
        fixture.pipeline.app_state(),
    )))
    .await;

    let cases = [
        (
            "application/xml",
            "<log/>",
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "UNSUPPORTED_CONTENT_TYPE",
        ),
        ("application/json", "{oops", StatusCode::BAD_REQUEST, "INVALID_JSON"),
        ("application/json", "[1,2]", StatusCode::BAD_REQUEST, "INVALID_JSON"),
        (
            "application/json",
            r#"{"text":"no tenant"}"#,
            StatusCode::BAD_REQUEST,
            "MISSING_TENANT",
        ),
        (
            "application/json",
            r#"{"tenant_id":"acme","log_id":{"nested":true}}"#,
            StatusCode::BAD_REQUEST,
            "INVALID_RECORD_ID",
        ),
    ];

    for (content_type, body, status, code) in cases {
        let req = test::TestRequest::post()
            .uri("/ingest")
            .insert_header(("content-type", content_type))
            .insert_header(("x-request-id", "req-123"))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), status, "{}", body);

        let error: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(error.error.code, code);
        assert_eq!(error.error.request_id.as_deref(), Some("req-123"));
    }

    assert!(fixture.buffer.is_empty());
    assert_eq!(fixture.pipeline.stats().snapshot().rejected, 5);
}

#[actix_web::test]
async fn test_health_reports_buffer_depth() {
    let fixture = TestPipeline::new(test_config());
    let app = test::init_service(HttpServer::create_app(web::Data::new(
        fixture.pipeline.app_state(),
    )))
    .await;
    fixture.buffer.send_raw("{}").unwrap();

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    let health = &body["data"];
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["buffer"]["backend"], "memory");
    assert_eq!(health["buffer"]["approximate_depth"], 1);
}

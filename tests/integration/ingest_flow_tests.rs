//! HTTP ingress through the buffer into the store

use crate::common::{TestPipeline, tenant, test_config};
use actix_web::http::StatusCode;
use actix_web::{test, web};
use logflow::core::models::RecordId;
use logflow::server::HttpServer;
use logflow::server::routes::ingest::IngestAccepted;
use logflow::storage::{Buffer, RecordStore};
use serde_json::json;

#[actix_web::test]
async fn test_accepted_json_event_lands_in_store() {
    let fixture = TestPipeline::new(test_config());
    let app = test::init_service(HttpServer::create_app(web::Data::new(
        fixture.pipeline.app_state(),
    )))
    .await;

    let req = test::TestRequest::post()
        .uri("/ingest")
        .insert_header(("content-type", "application/json"))
        .set_payload(r#"{"tenant_id":"acme","log_id":"101","text":"User login event"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let body: IngestAccepted = test::read_body_json(resp).await;
    assert_eq!(body.id, "101");

    // nothing is stored before a worker runs
    assert!(fixture.store.is_empty());

    let outcome = fixture.workers().run_once().await.unwrap().unwrap();
    assert_eq!(outcome.succeeded(), 1);

    let item = fixture
        .store
        .get(&tenant("acme"), &RecordId::parse("101").unwrap())
        .await
        .unwrap()
        .expect("item stored under (acme, 101)");
    assert_eq!(item.attribute("text"), Some(json!("User login event")));
    assert_eq!(item.attribute("source"), Some(json!("json_upload")));
    assert_eq!(
        item.attribute("modified_data"),
        Some(json!("User login... [REDACTED]"))
    );
    assert!(fixture.buffer.is_empty());
}

#[actix_web::test]
async fn test_text_event_with_generated_id() {
    let fixture = TestPipeline::new(test_config());
    let app = test::init_service(HttpServer::create_app(web::Data::new(
        fixture.pipeline.app_state(),
    )))
    .await;

    let req = test::TestRequest::post()
        .uri("/ingest")
        .insert_header(("content-type", "text/plain"))
        .insert_header(("x-tenant-id", "globex"))
        .set_payload("kernel: eth0 link down")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let body: IngestAccepted = test::read_body_json(resp).await;

    fixture.workers().run_once().await.unwrap();

    let item = fixture
        .store
        .get(&tenant("globex"), &RecordId::parse(&body.id).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(item.original_text, "kernel: eth0 link down");
    assert_eq!(item.source, "text_upload");
}

#[actix_web::test]
async fn test_rejected_event_never_reaches_buffer() {
    let fixture = TestPipeline::new(test_config());
    let app = test::init_service(HttpServer::create_app(web::Data::new(
        fixture.pipeline.app_state(),
    )))
    .await;

    let req = test::TestRequest::post()
        .uri("/ingest")
        .insert_header(("content-type", "text/plain"))
        .set_payload("no tenant here")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_client_error());
    assert_eq!(fixture.buffer.approximate_depth().await.unwrap(), 0);
    assert!(fixture.workers().run_once().await.unwrap().is_none());
    assert_eq!(fixture.pipeline.stats().snapshot().rejected, 1);
}

#[actix_web::test]
async fn test_gateway_accepts_while_buffer_backs_up() {
    let fixture = TestPipeline::new(test_config());
    let app = test::init_service(HttpServer::create_app(web::Data::new(
        fixture.pipeline.app_state(),
    )))
    .await;

    for i in 0..12 {
        let req = test::TestRequest::post()
            .uri("/ingest")
            .insert_header(("content-type", "application/json"))
            .set_payload(json!({"tenant_id": "acme", "log_id": i, "text": "x"}).to_string())
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::ACCEPTED
        );
    }

    assert_eq!(fixture.buffer.len(), 12);
    let workers = fixture.workers();
    while workers.run_once().await.unwrap().is_some() {}
    assert_eq!(fixture.store.len(), 12);
    assert_eq!(
        fixture.store.query_tenant(&tenant("acme")).await.unwrap().len(),
        12
    );
}

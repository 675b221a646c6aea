//! Records never cross a tenant boundary

use crate::common::{TestPipeline, record, tenant, test_config};
use actix_web::{test, web};
use logflow::core::models::RecordId;
use logflow::server::HttpServer;
use logflow::storage::{Buffer, RecordStore};

#[tokio::test]
async fn test_same_record_id_under_two_tenants() {
    let fixture = TestPipeline::new(test_config());
    fixture
        .buffer
        .send(&record("acme", "42", "acme event"))
        .await
        .unwrap();
    fixture
        .buffer
        .send(&record("globex", "42", "globex event"))
        .await
        .unwrap();

    fixture.workers().run_once().await.unwrap();

    let id = RecordId::parse("42").unwrap();
    let acme = fixture.store.get(&tenant("acme"), &id).await.unwrap().unwrap();
    let globex = fixture.store.get(&tenant("globex"), &id).await.unwrap().unwrap();
    assert_eq!(acme.original_text, "acme event");
    assert_eq!(globex.original_text, "globex event");
    assert_eq!(fixture.store.len(), 2);
}

#[tokio::test]
async fn test_tenant_query_sees_only_its_own_records() {
    let fixture = TestPipeline::new(test_config());
    for (tenant_id, id) in [("acme", "1"), ("globex", "2"), ("acme", "3"), ("initech", "4")] {
        fixture
            .buffer
            .send(&record(tenant_id, id, "event"))
            .await
            .unwrap();
    }
    let workers = fixture.workers();
    while workers.run_once().await.unwrap().is_some() {}

    let acme = fixture.store.query_tenant(&tenant("acme")).await.unwrap();
    let ids: Vec<_> = acme.iter().map(|item| item.record_id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
    assert!(acme.iter().all(|item| item.tenant_id == tenant("acme")));

    assert!(
        fixture
            .store
            .query_tenant(&tenant("umbrella"))
            .await
            .unwrap()
            .is_empty()
    );
}

#[actix_web::test]
async fn test_conflicting_tenant_header_is_rejected() {
    let fixture = TestPipeline::new(test_config());
    let app = test::init_service(HttpServer::create_app(web::Data::new(
        fixture.pipeline.app_state(),
    )))
    .await;

    let req = test::TestRequest::post()
        .uri("/ingest")
        .insert_header(("content-type", "application/json"))
        .insert_header(("x-tenant-id", "globex"))
        .set_payload(r#"{"tenant_id":"acme","text":"spoof attempt"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_client_error());
    assert_eq!(fixture.buffer.approximate_depth().await.unwrap(), 0);
}

#[actix_web::test]
async fn test_header_tenant_fills_in_for_json_body() {
    let fixture = TestPipeline::new(test_config());
    let app = test::init_service(HttpServer::create_app(web::Data::new(
        fixture.pipeline.app_state(),
    )))
    .await;

    let req = test::TestRequest::post()
        .uri("/ingest")
        .insert_header(("content-type", "application/json"))
        .insert_header(("x-tenant-id", "globex"))
        .set_payload(r#"{"log_id":"7","text":"from header"}"#)
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    fixture.workers().run_once().await.unwrap();
    assert_eq!(fixture.store.tenants(), vec![tenant("globex")]);
}

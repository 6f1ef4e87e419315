//! HTTP API integration tests.
//!
//! Drives the full router (layers included) with `tower::ServiceExt::oneshot`
//! against a file-backed service in a temporary directory.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Integration tests can use unwrap/expect
#![allow(clippy::too_many_lines)] // Scenario tests walk through whole flows

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use base64::Engine;
use serde_json::{json, Value};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use ticketgate::{build_router, AppState};
use ticketgate_core::Ledger;
use ticketgate_runtime::{QrCodec, TicketEnvironment, TicketService};
use ticketgate_testing::{
    FakeCodec, InMemoryArtifactStore, InMemoryTicketRepository, SequentialIdGenerator,
};
use tower::ServiceExt;

const MAX_UPLOAD: usize = 10 * 1024 * 1024;

// ============================================================================
// Test Fixtures
// ============================================================================

struct TestServer {
    router: Router,
    tickets_file: PathBuf,
    _dir: TempDir,
}

impl TestServer {
    async fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let tickets_file = dir.path().join("tickets.json");
        let env = TicketEnvironment::production(
            &tickets_file,
            dir.path().join("qr_codes"),
            QrCodec::default(),
        )
        .await
        .unwrap();
        let service = Arc::new(TicketService::open(env).await.unwrap());

        Self {
            router: build_router(AppState::new(service, None), MAX_UPLOAD),
            tickets_file,
            _dir: dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn send_json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn generate(&self) -> String {
        let (status, body) = self.send_json(post_empty("/generate")).await;
        assert_eq!(status, StatusCode::OK);
        body["ticket_id"].as_str().unwrap().to_string()
    }

    async fn download(&self, ticket_id: &str) -> Vec<u8> {
        let (status, png) = self.send(get(&format!("/download/{ticket_id}"))).await;
        assert_eq!(status, StatusCode::OK);
        png
    }

    async fn ledger_file(&self) -> Value {
        serde_json::from_slice(&tokio::fs::read(&self.tickets_file).await.unwrap()).unwrap()
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_file(uri: &str, png: &[u8]) -> Request<Body> {
    let boundary = "ticketgate-test-boundary";
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"ticket.png\"\r\nContent-Type: image/png\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(png);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn blank_png() -> Vec<u8> {
    let mut png = Vec::new();
    image::DynamicImage::ImageLuma8(image::GrayImage::from_pixel(200, 200, image::Luma([255])))
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    png
}

// ============================================================================
// Redemption by id
// ============================================================================

#[tokio::test]
async fn test_issue_and_redeem_scenario() {
    let server = TestServer::start().await;

    // Generate
    let (status, body) = server.send_json(post_empty("/generate")).await;
    assert_eq!(status, StatusCode::OK);
    let id = body["ticket_id"].as_str().unwrap().to_string();
    assert!(uuid::Uuid::parse_str(&id).is_ok());
    assert_eq!(body["qr_code_url"], format!("/download/{id}"));
    assert_eq!(server.ledger_file().await, json!({ id.clone(): { "used": false } }));

    // First redemption
    let (status, body) = server
        .send_json(post_json("/check", &json!({ "ticket_id": id })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "valid");
    assert_eq!(body["message"], "Ticket confirmed!");
    assert_eq!(body["ticket_id"], id.as_str());
    assert_eq!(server.ledger_file().await, json!({ id.clone(): { "used": true } }));

    // Second redemption
    let (status, body) = server
        .send_json(post_json("/check", &json!({ "ticket_id": id })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "used");
    assert_eq!(body["message"], "Ticket has already been used.");
    assert_eq!(server.ledger_file().await, json!({ id.clone(): { "used": true } }));

    // Never-issued ticket
    let (status, body) = server
        .send_json(post_json(
            "/check",
            &json!({ "ticket_id": uuid::Uuid::new_v4().to_string() }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "invalid");
    assert_eq!(body["message"], "Ticket not found.");
}

#[tokio::test]
async fn test_verify_is_an_alias_for_check() {
    let server = TestServer::start().await;
    let id = server.generate().await;

    let (_, body) = server
        .send_json(post_json("/verify", &json!({ "ticket_id": id })))
        .await;
    assert_eq!(body["status"], "valid");

    let (_, body) = server
        .send_json(post_json("/check", &json!({ "ticket_id": id })))
        .await;
    assert_eq!(body["status"], "used");
}

#[tokio::test]
async fn test_non_uuid_ticket_is_invalid() {
    let server = TestServer::start().await;

    let (status, body) = server
        .send_json(post_json("/check", &json!({ "ticket_id": "VIP-0001" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "invalid");
}

#[tokio::test]
async fn test_malformed_check_requests() {
    let server = TestServer::start().await;

    let (status, body) = server.send_json(post_json("/check", &json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let request = Request::post("/check")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let (status, body) = server.send_json(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

// ============================================================================
// Download and status
// ============================================================================

#[tokio::test]
async fn test_download_returns_png_of_the_id() {
    let server = TestServer::start().await;
    let id = server.generate().await;

    let response = server
        .router
        .clone()
        .oneshot(get(&format!("/download/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");

    let png = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let codes = ticketgate_core::environment::CodeCodec::decode(&QrCodec::default(), &png).unwrap();
    assert_eq!(codes, vec![id]);
}

#[tokio::test]
async fn test_download_unknown_ticket_is_404() {
    let server = TestServer::start().await;

    let (status, body) = server
        .send_json(get(&format!("/download/{}", uuid::Uuid::new_v4())))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");

    let (status, _) = server.send(get("/download/not-a-ticket")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ticket_status() {
    let server = TestServer::start().await;
    let id = server.generate().await;

    let (status, body) = server.send_json(get(&format!("/tickets/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ticket_id": id, "state": "unused" }));

    server
        .send(post_json("/check", &json!({ "ticket_id": id })))
        .await;
    let (_, body) = server.send_json(get(&format!("/tickets/{id}"))).await;
    assert_eq!(body["state"], "used");

    let (status, _) = server
        .send(get(&format!("/tickets/{}", uuid::Uuid::new_v4())))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Scanning
// ============================================================================

#[tokio::test]
async fn test_scan_uploaded_qr_code() {
    let server = TestServer::start().await;
    let id = server.generate().await;
    let png = server.download(&id).await;

    let (status, body) = server.send_json(post_file("/scan", &png)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "valid");
    assert_eq!(body["ticket_id"], id.as_str());

    let (_, body) = server.send_json(post_file("/scan", &png)).await;
    assert_eq!(body["status"], "used");
}

#[tokio::test]
async fn test_scan_base64_data_url() {
    let server = TestServer::start().await;
    let id = server.generate().await;
    let png = server.download(&id).await;
    let data_url = format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&png)
    );

    let (status, body) = server
        .send_json(post_json("/scan", &json!({ "image": data_url })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "valid");
}

#[tokio::test]
async fn test_scan_image_without_code_is_422() {
    let server = TestServer::start().await;

    let (status, body) = server.send_json(post_file("/scan", &blank_png())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "DECODE_FAILURE");
}

#[tokio::test]
async fn test_scan_garbage_is_400() {
    let server = TestServer::start().await;

    let (status, body) = server
        .send_json(post_file("/scan", b"this is not an image"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let (status, _) = server.send_json(post_empty("/scan")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_decode_does_not_redeem() {
    let server = TestServer::start().await;
    let id = server.generate().await;
    let png = server.download(&id).await;

    let (status, body) = server.send_json(post_file("/decode", &png)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ticket_id": id }));

    let (_, body) = server.send_json(get(&format!("/tickets/{id}"))).await;
    assert_eq!(body["state"], "unused");
}

// ============================================================================
// Operations
// ============================================================================

#[tokio::test]
async fn test_health_and_readiness() {
    let server = TestServer::start().await;

    let (status, body) = server.send_json(get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = server.send_json(get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Healthy");
}

#[tokio::test]
async fn test_metrics_disabled_is_404() {
    let server = TestServer::start().await;

    let (status, _) = server.send(get("/metrics")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = TestServer::start().await;
    let request = Request::get("/health")
        .header("x-request-id", "gate-3")
        .body(Body::empty())
        .unwrap();

    let response = server.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "gate-3");
}

// ============================================================================
// Storage failures
// ============================================================================

#[tokio::test]
async fn test_failed_save_is_500_and_ticket_stays_unused() {
    let repository = Arc::new(InMemoryTicketRepository::new());
    let env = TicketEnvironment::new(
        repository.clone(),
        Arc::new(InMemoryArtifactStore::new()),
        Arc::new(FakeCodec::default()),
        Arc::new(SequentialIdGenerator::new()),
    );
    let service = Arc::new(TicketService::with_ledger(Ledger::new(), env));
    let router = build_router(AppState::new(Arc::clone(&service), None), MAX_UPLOAD);
    let issued = service.generate().await.unwrap();

    repository.fail_saves(true);
    let response = router
        .clone()
        .oneshot(post_json("/check", &json!({ "ticket_id": issued.id.to_string() })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value =
        serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(body["status"], "error");

    let response = router.oneshot(get("/ready")).await.unwrap();
    let body: Value =
        serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(body["status"], "Degraded");

    assert_eq!(
        service.status(issued.id).await.unwrap(),
        ticketgate_core::TicketState::Unused
    );
}

mod common;

use std::time::Duration;

use common::canned::CannedServer;
use limsmeta::config::default_sequence_numbers;
use limsmeta::errors::LimsError;
use limsmeta::reagents::{LimsClient, LotRequest, ReagentQueue, ReagentService};

fn request(kind: &str, letter: Option<&str>, lot: &str) -> LotRequest {
    LotRequest {
        reagent_type: kind.to_string(),
        set_letter: letter.map(String::from),
        lot_number: lot.to_string(),
        received_date: Some("2025-03-01".to_string()),
        expiry_date: Some("2026-03-01".to_string()),
    }
}

fn service(server: &CannedServer) -> ReagentService {
    ReagentService::with_client(
        LimsClient::new(&server.base_url, "apiuser", "secret"),
        ReagentQueue::new(default_sequence_numbers()),
        Duration::from_secs(60),
    )
}

#[tokio::test]
async fn submit_posts_xml_with_basic_auth() {
    let server = CannedServer::start(vec![(
        "201 Created",
        r#"<lot:reagent-lot limsid="124-900"/>"#.to_string(),
    )]);
    let svc = service(&server);
    svc.add(&request("IDT-Index", Some("B"), "LOT-1")).unwrap();

    let results = svc.submit().await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].success);
    assert_eq!(results[0].lims_id.as_deref(), Some("124-900"));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].request_line, "POST /api/v2/reagentlots HTTP/1.1");
    // base64("apiuser:secret")
    assert_eq!(
        requests[0].header("authorization"),
        Some("Basic YXBpdXNlcjpzZWNyZXQ=")
    );
    let body = &requests[0].body;
    assert!(body.contains("<name>B#46 (192)</name>"));
    assert!(body.contains("<lot-number>LOT-1</lot-number>"));
    assert!(body.contains("<expiry-date>2026-03-01</expiry-date>"));
    assert!(body.contains("/api/v2/reagentkits/302"));
    assert!(body.contains("Created via limsmeta on"));

    let queue = svc.queue();
    assert!(queue.pending().is_empty());
    assert_eq!(queue.base_number("index_B"), 46);
    assert_eq!(svc.preview("IDT-Index", Some("B")).unwrap(), "B#47 (192)");
}

#[tokio::test]
async fn failed_lots_stay_queued() {
    let server = CannedServer::start(vec![
        ("201 Created", r#"<lot limsid="124-901"/>"#.to_string()),
        (
            "400 Bad Request",
            "<exc:exception><message>Lot number already exists</message></exc:exception>"
                .to_string(),
        ),
    ]);
    let svc = service(&server);
    svc.add(&request("Tag-Beads", None, "P-1")).unwrap();
    svc.add(&request("IPB-Buffers", None, "P-2")).unwrap();

    let results = svc.submit().await.unwrap();
    assert!(results[0].success);
    assert!(!results[1].success);
    assert_eq!(
        results[1].message,
        "API error (400): Lot number already exists"
    );

    let queue = svc.queue();
    assert_eq!(queue.pending().len(), 1);
    assert_eq!(queue.pending()[0].lot_number, "P-2");
    assert_eq!(queue.results().len(), 2);
    assert_eq!(queue.base_number("prep"), 29);
}

#[tokio::test]
async fn empty_queue_is_a_validation_error() {
    let server = CannedServer::start(Vec::new());
    let svc = service(&server);
    assert!(matches!(svc.submit().await, Err(LimsError::Validation(_))));
}

#[tokio::test]
async fn unreachable_server_reports_connection_error() {
    // Bind then drop to get a port nobody listens on
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let svc = ReagentService::with_client(
        LimsClient::new(&format!("http://127.0.0.1:{}/api/v2", port), "u", "p"),
        ReagentQueue::new(default_sequence_numbers()),
        Duration::from_secs(60),
    );
    svc.add(&request("PCR-Buffers", None, "X")).unwrap();

    let results = svc.submit().await.unwrap();
    assert!(!results[0].success);
    assert!(results[0].message.starts_with("Connection error:"));
    assert_eq!(svc.queue().pending().len(), 1);
}

#[tokio::test]
async fn connection_status_is_cached() {
    let server = CannedServer::start(vec![
        ("200 OK", "<kits/>".to_string()),
        ("500 Internal Server Error", "boom".to_string()),
    ]);
    let svc = service(&server);

    let first = svc.connection_status().await;
    assert!(first.connected);
    let second = svc.connection_status().await;
    assert!(second.connected);
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn connection_check_reports_http_status() {
    let server = CannedServer::start(vec![("401 Unauthorized", "denied".to_string())]);
    let client = LimsClient::new(&server.base_url, "u", "p");
    let status = tokio::task::spawn_blocking(move || client.test_connection())
        .await
        .unwrap();
    assert!(!status.connected);
    assert_eq!(status.message, "HTTP 401: denied");
}

#[test]
fn missing_expiry_is_rejected() {
    let mut queue = ReagentQueue::new(default_sequence_numbers());
    let mut req = request("IDT-Index", None, "L");
    req.expiry_date = None;
    assert!(matches!(queue.add(&req), Err(LimsError::Validation(_))));

    let mut req = request("IDT-Index", None, "  ");
    req.expiry_date = Some("2026-01-01".to_string());
    assert!(matches!(queue.add(&req), Err(LimsError::Validation(_))));
}

#[tokio::test]
async fn overlapping_submits_create_each_lot_once() {
    let server = CannedServer::start(vec![
        ("201 Created", r#"<lot limsid="124-910"/>"#.to_string()),
        ("201 Created", r#"<lot limsid="124-911"/>"#.to_string()),
    ]);
    let svc = service(&server);
    svc.add(&request("Tag-Beads", None, "P-1")).unwrap();

    let (a, b) = tokio::join!(svc.submit(), svc.submit());
    let created: usize = [&a, &b]
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .map(|results| results.iter().filter(|r| r.success).count())
        .sum();
    assert_eq!(created, 1);
    assert!(
        [&a, &b]
            .iter()
            .any(|r| matches!(r, Err(LimsError::Validation(_))))
    );

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].body.contains("<name>#29 (192)</name>"));

    // Submitting again posts nothing
    assert!(svc.submit().await.is_err());
    assert_eq!(server.requests().len(), 1);
    assert_eq!(svc.preview("Tag-Beads", None).unwrap(), "#30 (192)");
}

//! HTTP submitter tests
//!
//! A one-shot local server stands in for the emissions API.

use carbon_import::error::CarbonImportError;
use carbon_import::submit::{EmissionSubmitter, HttpSubmitter};
use carbon_import_common::{CategoryRegistry, EmissionCandidate};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve one request with a canned response; yields the raw request
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    (base_url, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn candidate() -> EmissionCandidate {
    let registry = CategoryRegistry::tgo();
    EmissionCandidate::new(&registry, "grid_electricity", 500.0, "kwh", 1, 2024).unwrap()
}

#[tokio::test]
async fn test_created_record() {
    let (base_url, server) = serve_once(
        "201 Created",
        r#"{"message": "Emission record added successfully", "record_id": "REC42", "co2_equivalent": 249.95}"#,
    )
    .await;

    let submitter = HttpSubmitter::new(&base_url, "test-token", 5).unwrap();
    let response = submitter.submit(&candidate()).await.unwrap();

    assert!(response.success);
    assert_eq!(response.message, "Emission record added successfully");
    assert_eq!(response.co2_equivalent, Some(249.95));

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/emissions "));
    assert!(request.to_lowercase().contains("authorization: bearer test-token"));

    let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(json["category"], "grid_electricity");
    assert_eq!(json["amount"], 500.0);
    assert_eq!(json["unit"], "kwh");
    assert_eq!(json["month"], 1);
    assert_eq!(json["year"], 2024);
}

#[tokio::test]
async fn test_rejected_record_uses_server_message() {
    let (base_url, server) = serve_once("400 Bad Request", r#"{"message": "Invalid category"}"#).await;

    let submitter = HttpSubmitter::new(&base_url, "test-token", 5).unwrap();
    let response = submitter.submit(&candidate()).await.unwrap();

    assert!(!response.success);
    assert_eq!(response.message, "Invalid category");
    assert_eq!(response.co2_equivalent, None);
    server.await.unwrap();
}

#[tokio::test]
async fn test_rejection_without_body() {
    let (base_url, server) = serve_once("401 Unauthorized", "").await;

    let submitter = HttpSubmitter::new(&base_url, "expired", 5).unwrap();
    let response = submitter.submit(&candidate()).await.unwrap();

    assert!(!response.success);
    assert_eq!(response.message, "HTTP 401 Unauthorized");
    server.await.unwrap();
}

#[tokio::test]
async fn test_unreachable_server() {
    // bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let submitter = HttpSubmitter::new(&base_url, "test-token", 2).unwrap();
    let result = submitter.submit(&candidate()).await;

    assert!(matches!(result, Err(CarbonImportError::ApiCall(_))));
}

/// A 2xx answer that is not JSON fails the row instead of passing without CO2e
#[tokio::test]
async fn test_created_with_unreadable_body() {
    let (base_url, server) = serve_once("201 Created", "not json").await;

    let submitter = HttpSubmitter::new(&base_url, "test-token", 5).unwrap();
    let result = submitter.submit(&candidate()).await;

    match result {
        Err(CarbonImportError::ApiCall(message)) => assert!(message.contains("invalid response body")),
        other => panic!("expected ApiCall error, got {:?}", other),
    }
    server.await.unwrap();
}

/// Valid JSON without a CO2e value is still a created record
#[tokio::test]
async fn test_created_without_co2() {
    let (base_url, server) = serve_once("201 Created", r#"{"message": "Emission record added successfully"}"#).await;

    let submitter = HttpSubmitter::new(&base_url, "test-token", 5).unwrap();
    let response = submitter.submit(&candidate()).await.unwrap();

    assert!(response.success);
    assert_eq!(response.co2_equivalent, None);
    server.await.unwrap();
}

/// Through the pipeline the unreadable answer becomes an API error on its row
#[tokio::test]
async fn test_unreadable_body_is_row_api_error() {
    use carbon_import::pipeline::ImportPipeline;
    use carbon_import_common::{OutcomeStatus, RecordImportValidator};

    let (base_url, server) = serve_once("201 Created", "not json").await;
    let registry = CategoryRegistry::tgo();
    let submitter = HttpSubmitter::new(&base_url, "test-token", 5).unwrap();
    let pipeline = ImportPipeline::new(RecordImportValidator::new(&registry), &submitter);

    let rows = vec![
        vec!["Date".to_string(), "Category".into(), "Amount".into(), "Unit".into()],
        vec!["15/01/2024".to_string(), "grid_electricity".into(), "500".into(), "kwh".into()],
    ];
    let report = pipeline.run("a.csv", &rows).await;

    assert_eq!(report.outcomes[0].status, OutcomeStatus::ApiError);
    assert_eq!(report.outcomes[0].co2_equivalent, None);
    server.await.unwrap();
}

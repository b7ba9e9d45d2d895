//! HTTP transport tests against a one-shot local server.

use kitstore_client::{HttpKitTransport, KitHash, TransportConfig};
use kitstore_core::{KitTransport, TransportError};
use kitstore_test_utils::sample_kit;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve one request with `status` and `body`; yields the request line.
async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();

        let text = String::from_utf8_lossy(&request).to_string();
        text.lines().next().unwrap_or_default().to_string()
    });

    (base_url, handle)
}

#[tokio::test]
async fn test_fetch_kit() {
    let body = serde_json::json!({
        "status": { "code": 0, "name": "OK" },
        "kit_json": sample_kit().as_str(),
    })
    .to_string();
    let (base_url, server) = serve_once("200 OK", body).await;

    let transport = HttpKitTransport::new(&TransportConfig::new(base_url)).unwrap();
    let res = transport
        .get_kit("merkle/pvl", &KitHash::new("abc123"))
        .await
        .unwrap();
    assert!(res.status.is_ok());
    assert_eq!(res.kit_json, sample_kit());

    let request_line = server.await.unwrap();
    assert_eq!(request_line, "GET /merkle/pvl?hash=abc123 HTTP/1.1");
}

#[tokio::test]
async fn test_app_status_error() {
    let body = serde_json::json!({
        "status": { "code": 205, "name": "NOT_FOUND", "desc": "no such kit" },
    })
    .to_string();
    let (base_url, server) = serve_once("200 OK", body).await;

    let transport = HttpKitTransport::new(&TransportConfig::new(base_url)).unwrap();
    let err = transport
        .get_kit("merkle/pvl", &KitHash::new("abc123"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        TransportError::AppStatus {
            endpoint: "merkle/pvl".to_string(),
            code: 205,
            name: "NOT_FOUND".to_string(),
            desc: "no such kit".to_string(),
        }
    );
    server.await.unwrap();
}

#[tokio::test]
async fn test_http_error_status() {
    let (base_url, server) = serve_once("500 Internal Server Error", String::new()).await;

    let transport = HttpKitTransport::new(&TransportConfig::new(base_url)).unwrap();
    let err = transport
        .get_kit("merkle/pvl", &KitHash::new("abc123"))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::HttpStatus { status: 500, .. }));
    server.await.unwrap();
}

#[tokio::test]
async fn test_malformed_body() {
    let (base_url, server) = serve_once("200 OK", "not json".to_string()).await;

    let transport = HttpKitTransport::new(&TransportConfig::new(base_url)).unwrap();
    let err = transport
        .get_kit("merkle/pvl", &KitHash::new("abc123"))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::InvalidResponse { .. }));
    server.await.unwrap();
}

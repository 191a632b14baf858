//! Integration tests for the HTTP gateway client against a local responder

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use otp_core::services::SmsDispatcher;
use otp_infra::sms::HttpSmsGateway;
use otp_shared::SmsGatewayConfig;

/// Serve one canned HTTP response per connection, recording request lines
async fn spawn_responder(
    status_line: &'static str,
    body: &'static str,
    delay: Duration,
) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let seen = seen.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]).to_string();
                if let Some(line) = request.lines().next() {
                    seen.lock().unwrap().push(line.to_string());
                }

                tokio::time::sleep(delay).await;

                let response = format!(
                    "{}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\
                     Connection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{}/api/otp.aspx", addr), requests)
}

fn gateway_config(base_url: String) -> SmsGatewayConfig {
    SmsGatewayConfig {
        base_url,
        user_id: "clinic".to_string(),
        user_pass: "s3cret".to_string(),
        request_timeout_secs: 1,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_accepted_message_is_delivered() {
    let (url, requests) = spawn_responder("HTTP/1.1 200 OK", "100=7781", Duration::ZERO).await;
    let gateway = HttpSmsGateway::new(gateway_config(url)).unwrap();

    let report = gateway.send_sms("9876543210", "Your code is 424242").await;

    assert!(report.success, "{:?}", report);
    assert_eq!(report.raw_response, "100=7781");

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let line = &requests[0];
    assert!(line.starts_with("GET /api/otp.aspx?"));
    for param in [
        "UserID=clinic",
        "UserPass=s3cret",
        "MobileNo=9876543210",
        "GSMID=linQMD",
        "TEMPID=",
        "PEID=",
        "UNICODE=TEXT",
        "Message=Your+code+is+424242",
    ] {
        assert!(line.contains(param), "missing {} in {}", param, line);
    }
}

#[tokio::test]
async fn test_in_band_error_on_200_is_failure() {
    let (url, _) =
        spawn_responder("HTTP/1.1 200 OK", "ERROR: Invalid Template", Duration::ZERO).await;
    let gateway = HttpSmsGateway::new(gateway_config(url)).unwrap();

    let report = gateway.send_sms("9876543210", "Your code is 424242").await;

    assert!(!report.success);
    assert_eq!(report.raw_response, "ERROR: Invalid Template");
    assert_eq!(
        report.reason.as_deref(),
        Some("SMS API error: ERROR: Invalid Template")
    );
}

#[tokio::test]
async fn test_server_error_is_failure() {
    let (url, _) =
        spawn_responder("HTTP/1.1 503 Service Unavailable", "busy", Duration::ZERO).await;
    let gateway = HttpSmsGateway::new(gateway_config(url)).unwrap();

    let report = gateway.send_sms("9876543210", "Your code is 424242").await;

    assert!(!report.success);
    assert_eq!(report.reason.as_deref(), Some("Failed to send OTP. Please try again."));
}

#[tokio::test]
async fn test_slow_gateway_times_out_without_retry() {
    let (url, requests) =
        spawn_responder("HTTP/1.1 200 OK", "100=late", Duration::from_secs(3)).await;
    let gateway = HttpSmsGateway::new(gateway_config(url)).unwrap();

    let report = gateway.send_sms("9876543210", "Your code is 424242").await;

    assert!(!report.success);
    assert_eq!(report.reason.as_deref(), Some("SMS service timeout. Please try again."));
    assert_eq!(requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_connection_refused_is_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let gateway =
        HttpSmsGateway::new(gateway_config(format!("http://{}/api/otp.aspx", addr))).unwrap();
    let report = gateway.send_sms("9876543210", "Your code is 424242").await;

    assert!(!report.success);
    assert_eq!(report.reason.as_deref(), Some("Failed to send OTP. Please try again."));
}

#[tokio::test]
async fn test_closed_gateway_sends_nothing() {
    let (url, requests) = spawn_responder("HTTP/1.1 200 OK", "100=7781", Duration::ZERO).await;
    let gateway = HttpSmsGateway::new(gateway_config(url)).unwrap();

    gateway.close().await;
    assert!(gateway.is_closed());

    let report = gateway.send_sms("9876543210", "Your code is 424242").await;
    assert!(!report.success);
    assert_eq!(report.reason.as_deref(), Some("Failed to send OTP. Please try again."));
    assert!(requests.lock().unwrap().is_empty());

    // Closing twice is harmless
    gateway.close().await;
}

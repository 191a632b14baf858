//! Unit tests for mock SMS dispatcher

use otp_core::services::SmsDispatcher;

use crate::sms::MockSmsGateway;

#[tokio::test]
async fn test_mock_sms_send_success() {
    let gateway = MockSmsGateway::with_options(false, false);
    let report = gateway.send_sms("9876543210", "Your code is 123456").await;

    assert!(report.success);
    assert!(report.raw_response.starts_with("100=mock-"));
    assert_eq!(gateway.get_message_count(), 1);
    assert_eq!(
        gateway.last_message("9876543210"),
        Some("Your code is 123456".to_string())
    );
}

#[tokio::test]
async fn test_mock_sms_simulate_failure() {
    let gateway = MockSmsGateway::with_options(false, true);
    let report = gateway.send_sms("9876543210", "Your code is 123456").await;

    assert!(!report.success);
    assert!(report.reason.is_some());
    assert_eq!(gateway.get_message_count(), 0);
    assert_eq!(gateway.last_message("9876543210"), None);
}

#[tokio::test]
async fn test_mock_sms_counter() {
    let gateway = MockSmsGateway::with_options(false, false);

    for i in 1..=3 {
        gateway.send_sms("9876543210", &format!("Message {}", i)).await;
        assert_eq!(gateway.get_message_count(), i);
    }
    assert_eq!(gateway.last_message("9876543210"), Some("Message 3".to_string()));
}

#[test]
fn test_provider_name() {
    let gateway = MockSmsGateway::new();
    assert_eq!(gateway.provider_name(), "mock");
}

//! Unit tests for SMS dispatcher creation

use otp_shared::{SmsGatewayConfig, SmsProvider};

use crate::sms::create_sms_dispatcher;

#[tokio::test]
async fn test_create_mock_dispatcher() {
    let config = SmsGatewayConfig {
        provider: SmsProvider::Mock,
        ..Default::default()
    };

    let dispatcher = create_sms_dispatcher(&config).unwrap();
    assert_eq!(dispatcher.provider_name(), "mock");
    assert!(dispatcher.is_configured());
}

#[tokio::test]
async fn test_create_gateway_without_credentials_is_unconfigured() {
    let config = SmsGatewayConfig::default();

    let dispatcher = create_sms_dispatcher(&config).unwrap();
    assert_eq!(dispatcher.provider_name(), "gateway");
    assert!(!dispatcher.is_configured());
}

#[tokio::test]
async fn test_create_gateway_with_credentials() {
    let config = SmsGatewayConfig {
        user_id: "clinic".to_string(),
        user_pass: "secret".to_string(),
        ..Default::default()
    };

    let dispatcher = create_sms_dispatcher(&config).unwrap();
    assert!(dispatcher.is_configured());
}

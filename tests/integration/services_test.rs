//! Typed services over HTTP RPC, including the demo-data fallback

use std::time::Duration;

use rdm_sync::client::request::Sourced;
use rdm_sync::client::services::{demo, ApiServices};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{http_request_service, UNREACHABLE_URL};

#[tokio::test]
async fn test_wallet_balance_live() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rpc/wallet/getBalance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"balance": 99.0, "pending": 1.0})))
        .mount(&server)
        .await;

    let api = ApiServices::new(http_request_service(&server.uri()));
    let balance = api.wallet.balance().await;

    assert!(balance.is_live());
    assert_eq!(balance.into_inner().balance, 99.0);
}

#[tokio::test]
async fn test_slow_server_falls_back_to_demo_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rpc/admin/getAnalytics"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "totalPatients": 1, "activePatients": 1, "averageAdherence": 1.0,
                    "tokensDistributed": 1.0, "claimsPending": 0
                }))
                .set_delay(Duration::from_secs(4)),
        )
        .mount(&server)
        .await;

    let api = ApiServices::new(http_request_service(&server.uri()));
    let analytics = api.admin.analytics().await;

    assert_eq!(analytics, Sourced::Fallback(demo::platform_analytics()));
}

#[tokio::test]
async fn test_unreachable_server_falls_back() {
    let api = ApiServices::new(http_request_service(UNREACHABLE_URL));
    assert!(api.goals.list().await.is_fallback());
    assert!(api.notification.list().await.is_fallback());
}

#[tokio::test]
async fn test_write_paths_send_camel_case_input() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rpc/notification/markRead"))
        .and(body_json(json!({"notificationId": "00000000-0000-0000-0000-00000000002a"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiServices::new(http_request_service(&server.uri()));
    crate::assert_ok!(api.notification.mark_read(uuid::Uuid::from_u128(42)).await);
}

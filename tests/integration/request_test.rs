//! Request service over HTTP RPC, error mapping and retries

use assert_matches::assert_matches;
use rdm_sync::client::request::RequestError;
use rdm_sync::client::services::auth::Me;
use rdm_sync::client::services::wallet::GetBalance;
use serde_json::json;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{http_request_service, UNREACHABLE_URL};

#[tokio::test]
async fn test_success_decodes_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rpc/wallet/getBalance"))
        .and(header_exists("x-request-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"balance": 10.0, "pending": 0.5})))
        .expect(1)
        .mount(&server)
        .await;

    let service = http_request_service(&server.uri());
    let balance = crate::assert_ok!(service.call::<GetBalance>(&()).await);
    assert_eq!(balance.balance, 10.0);
}

#[tokio::test]
async fn test_401_is_session_expired_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rpc/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthorized"})))
        .expect(1)
        .mount(&server)
        .await;

    let service = http_request_service(&server.uri());
    let err = service.call::<Me>(&()).await.unwrap_err();
    assert_eq!(err, RequestError::SessionExpired);
    assert_eq!(err.to_string(), "Session expired. Please log in again.");
}

#[tokio::test]
async fn test_structured_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rpc/wallet/getBalance"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"message": "Wallet not provisioned"})))
        .expect(1)
        .mount(&server)
        .await;

    let service = http_request_service(&server.uri());
    let err = service.call::<GetBalance>(&()).await.unwrap_err();
    assert_matches!(err, RequestError::Api { status: 422, ref message } if message == "Wallet not provisioned");
}

#[tokio::test]
async fn test_unknown_procedure_is_configuration_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let service = http_request_service(&server.uri());
    crate::assert_err!(service.call::<Me>(&()).await, RequestError::Configuration(_));
}

#[tokio::test]
async fn test_plain_server_error_uses_full_budget() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rpc/auth/me"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(3)
        .mount(&server)
        .await;

    let service = http_request_service(&server.uri());
    let err = service.call::<Me>(&()).await.unwrap_err();
    assert_eq!(err, RequestError::Unknown("HTTP 500: boom".to_string()));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let service = http_request_service(UNREACHABLE_URL);
    let err = service.call::<Me>(&()).await.unwrap_err();

    assert_matches!(err, RequestError::Network(_));
    assert_eq!(
        err.to_string(),
        "Network error: unable to reach the server. Please check your connection."
    );
}

//! Property-based tests for RPC error classification

use proptest::prelude::*;
use rdm_sync::client::request::classify::{classify, ErrorClass};
use rdm_sync::client::request::RetryPolicy;
use rdm_sync::client::rpc::RpcError;
use serde_json::json;

proptest! {
    #[test]
    fn test_401_always_unauthorized(message in "[a-z ]{0,24}", with_data in any::<bool>()) {
        let error = RpcError::Http {
            status: 401,
            message: message.clone(),
            data: with_data.then(|| json!({"message": message})),
        };
        prop_assert_eq!(classify(&error), ErrorClass::Unauthorized);
    }

    #[test]
    fn test_payload_is_structured_for_other_statuses(
        status in (400u16..600).prop_filter("not 401", |s| *s != 401),
        message in "[a-z]{1,16}",
    ) {
        let error = RpcError::Http {
            status,
            message: message.clone(),
            data: Some(json!({"message": message})),
        };
        prop_assert_eq!(classify(&error), ErrorClass::Structured);
        prop_assert!(!classify(&error).is_retryable());
    }

    #[test]
    fn test_network_variant_is_network(detail in "[a-z]{0,16}") {
        prop_assert_eq!(classify(&RpcError::Network(detail)), ErrorClass::Network);
    }

    #[test]
    fn test_network_backoff_is_linear(attempt in 0u32..50) {
        let policy = RetryPolicy::default();
        prop_assert_eq!(
            policy.delay_for(attempt).as_millis(),
            1000 * (attempt as u128 + 1)
        );
    }
}

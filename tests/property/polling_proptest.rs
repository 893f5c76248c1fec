//! Property-based tests for the keyed polling registry

use std::collections::BTreeSet;
use std::time::Duration;

use proptest::prelude::*;
use rdm_sync::client::polling::{poll_fn, PollingService};

proptest! {
    #[test]
    fn test_stop_only_affects_its_key(
        keys in prop::collection::btree_set("[a-z]{1,8}", 1..8),
        stop_mask in prop::collection::vec(any::<bool>(), 8),
    ) {
        tokio_test::block_on(async {
            let polling = PollingService::new();
            for key in &keys {
                polling.start(key.clone(), poll_fn(|| async { Ok(()) }), Duration::from_secs(60));
            }

            let stopped: BTreeSet<String> = keys
                .iter()
                .zip(stop_mask.iter())
                .filter(|(_, stop)| **stop)
                .map(|(key, _)| key.clone())
                .collect();
            for key in &stopped {
                polling.stop(key);
            }

            for key in &keys {
                prop_assert_eq!(polling.is_polling(key), !stopped.contains(key));
            }
            prop_assert_eq!(polling.is_active(), stopped.len() < keys.len());
            Ok(())
        })?;
    }

    #[test]
    fn test_restart_keeps_one_task_per_key(
        key in "[a-z]{1,8}",
        restarts in 1usize..6,
    ) {
        tokio_test::block_on(async {
            let polling = PollingService::new();
            for n in 0..restarts {
                polling.start(
                    key.clone(),
                    poll_fn(|| async { Ok(()) }),
                    Duration::from_millis(100 * (n as u64 + 1)),
                );
            }

            prop_assert_eq!(polling.active_keys(), vec![key.clone()]);
            prop_assert_eq!(
                polling.interval_of(&key),
                Some(Duration::from_millis(100 * restarts as u64))
            );
            Ok(())
        })?;
    }

    #[test]
    fn test_stop_unknown_key_is_noop(known in "[a-z]{1,8}", unknown in "[A-Z]{1,8}") {
        tokio_test::block_on(async {
            let polling = PollingService::new();
            polling.start(known.clone(), poll_fn(|| async { Ok(()) }), Duration::from_secs(1));
            polling.stop(&unknown);
            polling.stop(&unknown);
            prop_assert!(polling.is_polling(&known));
            Ok(())
        })?;
    }
}

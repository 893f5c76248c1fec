//! Property-based tests for per-key sequence fencing

use std::sync::Arc;

use proptest::prelude::*;
use rdm_sync::client::realtime::{FetchTicket, SequenceFence, Trigger};

proptest! {
    #[test]
    fn test_committed_sequence_only_grows(
        order in Just((0..12usize).collect::<Vec<_>>()).prop_shuffle(),
    ) {
        let fence = Arc::new(SequenceFence::new());
        let tickets: Vec<FetchTicket> = (0..order.len())
            .map(|_| FetchTicket::detached(Trigger::Polling, fence.clone()))
            .collect();

        let mut last = 0;
        for index in order {
            let ticket = &tickets[index];
            let accepted = ticket.try_commit();
            prop_assert_eq!(accepted, ticket.seq() > last);
            if accepted {
                last = ticket.seq();
            }
            prop_assert_eq!(fence.committed(), last);
        }
        prop_assert_eq!(last, 12);
    }
}

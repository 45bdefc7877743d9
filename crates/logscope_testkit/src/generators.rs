//! Property-based test generators using proptest.
//!
//! Strategies produce values that stay inside the ranges the log format
//! can encode.

use crate::fixtures::PayloadBuilder;
use logscope_codec::LogPosition;
use proptest::prelude::*;

/// Strategy for log positions.
pub fn log_position_strategy() -> impl Strategy<Value = LogPosition> {
    (any::<u32>(), any::<u32>()).prop_map(|(file, offset)| LogPosition::new(file, offset))
}

/// Strategy for group flag bits, including unassigned ones.
pub fn group_flags_strategy() -> impl Strategy<Value = i32> {
    0i32..0x1000
}

/// Strategy for transaction numbers across all three compressed widths.
pub fn transaction_id_strategy() -> impl Strategy<Value = Option<i64>> {
    prop_oneof![
        Just(None),
        (0i64..=0x3fff).prop_map(Some),
        (0x4000i64..=0x3fff_ffff).prop_map(Some),
        (0x4000_0000i64..=i64::MAX).prop_map(Some),
    ]
}

/// Strategy for well-formed payloads.
pub fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    (
        group_flags_strategy(),
        transaction_id_strategy(),
        any::<u16>(),
        prop::collection::vec(any::<u8>(), 0..64),
    )
        .prop_map(|(groups, txn, op, body)| {
            let builder = PayloadBuilder::new(op).groups(groups).body(&body);
            match txn {
                Some(id) => builder.transaction(id).build(),
                None => builder.build(),
            }
        })
}

/// Strategy for a sequence of payloads to frame into one log.
pub fn payloads_strategy(max_frames: usize) -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(payload_strategy(), 0..=max_frames)
}

/// Strategy for block sizes used by padded logs.
pub fn block_size_strategy() -> impl Strategy<Value = usize> {
    prop_oneof![Just(1usize), Just(8), Just(16), 2usize..=32]
}
